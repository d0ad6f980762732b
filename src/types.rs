//! Core types used throughout the radar

use crate::error::{RadarError, Result};
use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Size of the Lotto Activo alphabet (0-36 plus the "00" symbol)
pub const DEFAULT_ALPHABET_SIZE: u8 = 38;

/// Display names for the default alphabet, indexed by category value
const ANIMAL_NAMES: [&str; 38] = [
    "Delfin", "Carnero", "Toro", "Ciempies", "Alacran", "Leon", "Rana", "Perico",
    "Raton", "Aguila", "Tigre", "Gato", "Caballo", "Mono", "Paloma", "Zorro", "Oso",
    "Pavo", "Burro", "Chivo", "Cochino", "Gallo", "Camello", "Cebra", "Iguana",
    "Gallina", "Vaca", "Perro", "Zamuro", "Elefante", "Caiman", "Lapa", "Ardilla",
    "Pescado", "Venado", "Jirafa", "Culebra", "Ballena",
];

/// A draw outcome. Identity is the only meaningful relation between categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(u8);

impl Category {
    /// Build a category without alphabet validation (tests, fixed tables)
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Display name when the category belongs to the default alphabet
    pub fn name(self) -> Option<&'static str> {
        ANIMAL_NAMES.get(self.0 as usize).copied()
    }

    /// "31 Lapa", or just "31" outside the named alphabet
    pub fn label(self) -> String {
        match self.name() {
            Some(name) => format!("{} {}", self.0, name),
            None => self.0.to_string(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The finite set of valid categories `[0, size-1]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alphabet {
    size: u8,
}

impl Default for Alphabet {
    fn default() -> Self {
        Self { size: DEFAULT_ALPHABET_SIZE }
    }
}

impl Alphabet {
    pub fn new(size: u8) -> Result<Self> {
        if size < 2 {
            return Err(RadarError::Config(format!(
                "alphabet must hold at least 2 categories, got {}",
                size
            )));
        }
        Ok(Self { size })
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn contains(&self, category: Category) -> bool {
        category.0 < self.size
    }

    /// Value the raw "00" code is remapped to
    pub fn sentinel(&self) -> Category {
        Category(self.size - 1)
    }

    /// Validate an integer category value
    pub fn category(&self, value: i64) -> Result<Category> {
        if value < 0 || value >= self.size as i64 {
            return Err(RadarError::InvalidEvent(format!(
                "category {} outside alphabet [0, {}]",
                value,
                self.size - 1
            )));
        }
        Ok(Category(value as u8))
    }

    /// Parse a category code as found in draw records.
    ///
    /// `"00"` is the sentinel symbol; anything else must be a decimal integer
    /// inside the alphabet.
    pub fn parse_code(&self, code: &str) -> Result<Category> {
        let code = code.trim();
        if code == "00" {
            return Ok(self.sentinel());
        }
        let value: i64 = code
            .parse()
            .map_err(|_| RadarError::InvalidEvent(format!("malformed category code '{}'", code)))?;
        self.category(value)
    }
}

/// A single recorded draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: NaiveDateTime,
    pub category: Category,
}

impl Event {
    pub fn new(timestamp: NaiveDateTime, category: Category) -> Self {
        Self { timestamp, category }
    }

    /// Calendar year the draw belongs to
    pub fn year(&self) -> i32 {
        self.timestamp.year()
    }
}

/// A set of 2 or 3 distinct categories.
///
/// Stored sorted so that equality and hashing are set semantics; serialized
/// as a plain list of integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Vec<Category>", into = "Vec<Category>")]
pub struct Context {
    items: [Category; 3],
    len: u8,
}

impl Context {
    pub const MIN_LEN: usize = 2;
    pub const MAX_LEN: usize = 3;

    /// Build a context from categories in any order
    pub fn new(categories: &[Category]) -> Result<Self> {
        if categories.len() < Self::MIN_LEN || categories.len() > Self::MAX_LEN {
            return Err(RadarError::InvalidRule(format!(
                "context must hold 2 or 3 categories, got {}",
                categories.len()
            )));
        }
        let mut sorted = categories.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != categories.len() {
            return Err(RadarError::InvalidRule(format!(
                "context has repeated categories: {:?}",
                categories.iter().map(|c| c.value()).collect::<Vec<_>>()
            )));
        }
        Ok(Self::from_sorted(&sorted))
    }

    /// Caller guarantees `sorted` is strictly ascending with 2 or 3 items
    pub(crate) fn from_sorted(sorted: &[Category]) -> Self {
        debug_assert!(sorted.len() >= Self::MIN_LEN && sorted.len() <= Self::MAX_LEN);
        debug_assert!(sorted.windows(2).all(|w| w[0] < w[1]));
        let mut items = [Category(0); 3];
        items[..sorted.len()].copy_from_slice(sorted);
        Self { items, len: sorted.len() as u8 }
    }

    pub fn as_slice(&self) -> &[Category] {
        &self.items[..self.len as usize]
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Subset test against a sorted, duplicate-free window set
    pub fn is_contained_in(&self, window_set: &[Category]) -> bool {
        self.as_slice()
            .iter()
            .all(|c| window_set.binary_search(c).is_ok())
    }

    /// "[3 Ciempies, 7 Perico]"
    pub fn labels(&self) -> String {
        let parts: Vec<String> = self.as_slice().iter().map(|c| c.label()).collect();
        format!("[{}]", parts.join(", "))
    }
}

impl TryFrom<Vec<Category>> for Context {
    type Error = RadarError;

    fn try_from(categories: Vec<Category>) -> Result<Self> {
        Context::new(&categories)
    }
}

impl From<Context> for Vec<Category> {
    fn from(context: Context) -> Self {
        context.as_slice().to_vec()
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.as_slice().iter().map(|c| c.to_string()).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}
