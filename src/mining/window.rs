//! Window context extraction and candidate generation

use crate::types::{Category, Context, Event};

/// Sorted, duplicate-free categories of a run of draws
pub fn distinct_categories<I>(categories: I) -> Vec<Category>
where
    I: IntoIterator<Item = Category>,
{
    let mut set: Vec<Category> = categories.into_iter().collect();
    set.sort_unstable();
    set.dedup();
    set
}

/// Distinct categories of the `window` draws preceding `position`.
///
/// `None` when fewer than `window` draws precede the position.
pub fn window_context(events: &[Event], position: usize, window: usize) -> Option<Vec<Category>> {
    if window == 0 || position < window || position > events.len() {
        return None;
    }
    Some(distinct_categories(
        events[position - window..position].iter().map(|e| e.category),
    ))
}

/// Every pair, then every triplet, of a sorted context set in lexicographic order
pub fn candidate_contexts(set: &[Category]) -> Vec<Context> {
    let n = set.len();
    if n < 2 {
        return Vec::new();
    }

    let pairs = n * (n - 1) / 2;
    let triplets = if n >= 3 { n * (n - 1) * (n - 2) / 6 } else { 0 };
    let mut out = Vec::with_capacity(pairs + triplets);

    for i in 0..n {
        for j in i + 1..n {
            out.push(Context::from_sorted(&[set[i], set[j]]));
        }
    }
    for i in 0..n {
        for j in i + 1..n {
            for k in j + 1..n {
                out.push(Context::from_sorted(&[set[i], set[j], set[k]]));
            }
        }
    }
    out
}
