//! End-to-end tests: CSV history → mining → artifact → live matching

#[cfg(test)]
mod tests {
    use crate::config::{DataConfig, MiningConfig};
    use crate::data::load_history_from;
    use crate::mining::Miner;
    use crate::radar::{deploy, Alert, ChainRules, RuleMatcher};
    use crate::storage::RuleStore;
    use crate::types::{Category, Event};
    use chrono::{Duration, NaiveDate};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rust_decimal_macros::dec;
    use std::fmt::Write as _;

    /// Eight-symbol draws, six per day, starting 2021
    fn synthetic_csv(draws: usize, seed: u64) -> String {
        let mut rng = StdRng::seed_from_u64(seed);
        let start = NaiveDate::from_ymd_opt(2021, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let mut csv = String::from("DateTime,Number_Int\n");
        for i in 0..draws {
            let ts = start + Duration::days((i / 6) as i64) + Duration::hours((i % 6) as i64 * 2);
            writeln!(csv, "{},{}", ts.format("%Y-%m-%d %H:%M:%S"), rng.random_range(0..8u8)).unwrap();
        }
        csv
    }

    fn small_mining() -> MiningConfig {
        MiningConfig {
            window_sizes: vec![3, 4],
            min_occurrences: 50,
            ..MiningConfig::default()
        }
    }

    fn events_from(seed: u64, draws: usize) -> Vec<Event> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draws.csv");
        std::fs::write(&path, synthetic_csv(draws, seed)).unwrap();
        let history = tokio_test::block_on(load_history_from(&path, &DataConfig::default())).unwrap();
        history.events().to_vec()
    }

    #[tokio::test]
    async fn test_pipeline_from_csv_to_alerts() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("draws.csv");
        let mut csv = synthetic_csv(6_000, 7);
        csv.push_str("garbage,row\n2024-01-01 08:00:00,99\n");
        std::fs::write(&csv_path, csv).unwrap();

        let data = DataConfig {
            history_file: csv_path.clone(),
            rules_file: dir.path().join("rules.jsonl"),
            ..DataConfig::default()
        };
        let history = load_history_from(&csv_path, &data).await.unwrap();
        assert_eq!(history.len(), 6_000);
        assert_eq!(history.dropped, 2);

        let rule_set = Miner::new(small_mining()).mine(history.events());
        assert!(!rule_set.is_empty());

        let store = RuleStore::new(
            data.rules_file.clone(),
            data.alphabet().unwrap(),
            &small_mining().window_sizes,
        );
        store.save(&rule_set).await.unwrap();
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.skipped, 0);
        assert_eq!(loaded.rules, rule_set.rules());

        // Replaying the best rule's context must raise its alert
        let best = &loaded.rules[0];
        let live = deploy(&loaded.rules, dec!(0));
        let mut matcher = RuleMatcher::new(30, ChainRules::default(), live);
        let filler = Category::new(7);
        let mut draws: Vec<Category> = vec![filler; best.window_size];
        for (slot, c) in draws.iter_mut().zip(best.context.as_slice()) {
            *slot = *c;
        }
        let mut alerts = Vec::new();
        for c in draws {
            alerts = matcher.observe(c);
        }
        assert!(alerts.iter().any(|a| matches!(
            a,
            Alert::Pattern { context, target, .. } if *context == best.context && *target == best.target
        )));
    }

    #[test]
    fn test_mining_is_idempotent() {
        let events = events_from(11, 3_000);
        let miner = Miner::new(small_mining());
        assert_eq!(miner.mine(&events).rules(), miner.mine(&events).rules());
    }

    #[test]
    fn test_stricter_gates_never_admit_more() {
        let events = events_from(5, 3_000);
        let base = small_mining();
        let baseline = Miner::new(base.clone()).mine(&events).len();

        let mut previous = baseline;
        for min_occurrences in [75, 100, 150] {
            let config = MiningConfig { min_occurrences, ..base.clone() };
            let count = Miner::new(config).mine(&events).len();
            assert!(count <= previous);
            previous = count;
        }

        let mut previous = baseline;
        for min_roi in [dec!(50), dec!(100), dec!(200)] {
            let config = MiningConfig { min_roi, ..base.clone() };
            let count = Miner::new(config).mine(&events).len();
            assert!(count <= previous);
            previous = count;
        }

        let mut previous = baseline;
        for min_stability in [0.7, 0.9, 1.0] {
            let config = MiningConfig { min_stability, ..base.clone() };
            let count = Miner::new(config).mine(&events).len();
            assert!(count <= previous);
            previous = count;
        }
    }
}
