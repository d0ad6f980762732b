//! Tests for rule artifact persistence

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::mining::{RuleSet, ScoredRule};
    use crate::types::{Alphabet, Category, Context};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn rule(target: u8, roi: Decimal) -> ScoredRule {
        ScoredRule {
            window_size: 5,
            context: Context::new(&[Category::new(3), Category::new(12)]).unwrap(),
            target: Category::new(target),
            total_triggers: 120,
            total_wins: 9,
            balance: 150,
            roi_percent: roi,
            years_active: 4,
            years_profitable: 3,
            stability_ratio: 0.75,
            stability: "3/4 (75%)".to_string(),
        }
    }

    fn store_in(dir: &tempfile::TempDir) -> RuleStore {
        RuleStore::new(dir.path().join("rules.jsonl"), Alphabet::default(), &[3, 5, 8])
    }

    #[tokio::test]
    async fn test_save_then_load_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let set = RuleSet::ranked(vec![rule(1, dec!(125)), rule(2, dec!(300))]);

        store.save(&set).await.unwrap();
        let loaded = store.load().await.unwrap();

        assert_eq!(loaded.skipped, 0);
        assert_eq!(loaded.rules, set.rules());
        assert_eq!(loaded.rules[0].target, Category::new(2));
    }

    #[tokio::test]
    async fn test_save_replaces_previous_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save(&RuleSet::ranked(vec![rule(1, dec!(50)), rule(2, dec!(60))])).await.unwrap();
        store.save(&RuleSet::ranked(vec![rule(7, dec!(70))])).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.rules.len(), 1);
        assert_eq!(loaded.rules[0].target, Category::new(7));
    }

    #[test]
    fn test_context_stored_as_integer_list() {
        let line = serde_json::to_string(&rule(1, dec!(50))).unwrap();
        assert!(line.contains("\"context\":[3,12]"));
    }

    #[test]
    fn test_parse_skips_degenerate_records() {
        let store = RuleStore::new("unused.jsonl", Alphabet::default(), &[3, 5, 8]);
        let good = serde_json::to_string(&rule(4, dec!(200))).unwrap();
        let bad_context = good.replace("[3,12]", "[3,3]");
        let bad_target = good.replace("\"target\":4", "\"target\":99");
        let huge_window = good.replace("\"window_size\":5", "\"window_size\":18446744073709551615");
        let unknown_window = good.replace("\"window_size\":5", "\"window_size\":4");
        let text = format!(
            "{}\nnot json\n\n{}\n{}\n{}\n{}\n{}\n",
            good, bad_context, bad_target, huge_window, unknown_window, good
        );

        let loaded = store.parse(&text);
        assert_eq!(loaded.rules.len(), 2);
        assert_eq!(loaded.skipped, 5);
        assert!(loaded.rules.iter().all(|r| r.window_size == 5));
    }

    #[tokio::test]
    async fn test_load_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.load().await.is_err());
        assert!(store.modified().await.is_none());
    }

    #[test]
    fn test_modified_after_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        tokio_test::block_on(store.save(&RuleSet::default())).unwrap();
        assert!(tokio_test::block_on(store.modified()).is_some());
    }
}
