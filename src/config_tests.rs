//! Tests for configuration

#[cfg(test)]
mod tests {
    use super::super::config::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn test_mining_config_default() {
        let config = MiningConfig::default();
        assert_eq!(config.window_sizes, vec![3, 5, 8]);
        assert_eq!(config.payout, 30);
        assert_eq!(config.min_occurrences, 100);
        assert_eq!(config.min_roi, dec!(15));
        assert_eq!(config.min_stability, 0.60);
        assert_eq!(config.report_top, 20);
        assert!(config.parallel);
        assert_eq!(config.max_window(), 8);
    }

    #[test]
    fn test_radar_config_default() {
        let config = RadarConfig::default();
        assert_eq!(config.live_roi_floor, dec!(150));
        assert_eq!(config.poll_interval_secs, 300);
        assert_eq!(config.poll_interval().as_secs(), 300);
        assert_eq!(config.history_depth, 30);
        assert_eq!(config.chain_rules.len(), 4);
        assert!(config.chain_rules.contains(&ChainRuleConfig { from: 31, to: 0 }));
        assert!(config.feed_url.is_none());
    }

    #[test]
    fn test_mining_config_defaults_from_empty_toml() {
        let config: MiningConfig = toml::from_str("").unwrap();
        assert_eq!(config.window_sizes, vec![3, 5, 8]);
        assert_eq!(config.min_roi, dec!(15));
    }

    #[test]
    fn test_mining_config_overrides() {
        let toml_str = r#"
window_sizes = [4, 6]
payout = 36
min_occurrences = 50
min_roi = 20.5
min_stability = 0.75
parallel = false
"#;
        let config: MiningConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.window_sizes, vec![4, 6]);
        assert_eq!(config.payout, 36);
        assert_eq!(config.min_occurrences, 50);
        assert_eq!(config.min_roi, dec!(20.5));
        assert_eq!(config.min_stability, 0.75);
        assert!(!config.parallel);
        assert_eq!(config.report_top, 20);
    }

    #[test]
    fn test_radar_config_custom_chains() {
        let toml_str = r#"
live_roi_floor = 200
feed_url = "http://localhost:8080/draws"

[[chain_rules]]
from = 1
to = 2
"#;
        let config: RadarConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.live_roi_floor, dec!(200));
        assert_eq!(config.chain_rules, vec![ChainRuleConfig { from: 1, to: 2 }]);
        assert_eq!(config.feed_url.as_deref(), Some("http://localhost:8080/draws"));
    }

    #[test]
    fn test_data_config_defaults() {
        let config: DataConfig = toml::from_str("").unwrap();
        assert_eq!(config.history_file.to_str(), Some("lotto_activo_clean.csv"));
        assert_eq!(config.rules_file.to_str(), Some("master_patterns.jsonl"));
        assert_eq!(config.timestamp_column, "DateTime");
        assert_eq!(config.category_column, "Number_Int");
        assert_eq!(config.alphabet_size, 38);
        assert_eq!(config.alphabet().unwrap().size(), 38);
    }

    #[test]
    fn test_telegram_config_defaults() {
        let toml_str = r#"
bot_token = "123:abc"
chat_id = "12345"
"#;
        let config: TelegramConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.bot_token, "123:abc");
        assert_eq!(config.chat_id, "12345");
        assert_eq!(config.parse_mode, "Markdown");
    }

    #[test]
    fn test_full_config_without_telegram() {
        let config: Config = toml::from_str("[mining]\npayout = 31\n").unwrap();
        assert_eq!(config.mining.payout, 31);
        assert!(config.telegram.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_windows() {
        let mut config = Config::default();
        config.mining.window_sizes.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_window_of_one() {
        let mut config = Config::default();
        config.mining.window_sizes = vec![1, 3];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_repeated_window() {
        let mut config = Config::default();
        config.mining.window_sizes = vec![3, 5, 3];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("window size 3 listed more than once"));
    }

    #[test]
    fn test_validate_rejects_zero_payout() {
        let mut config = Config::default();
        config.mining.payout = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_stability_out_of_range() {
        let mut config = Config::default();
        config.mining.min_stability = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_chain_outside_alphabet() {
        let mut config = Config::default();
        config.radar.chain_rules.push(ChainRuleConfig { from: 40, to: 1 });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[data]
history_file = "draws.csv"

[mining]
window_sizes = [3]
min_occurrences = 10

[telegram]
bot_token = "t"
chat_id = "c"
"#
        )
        .unwrap();

        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.data.history_file.to_str(), Some("draws.csv"));
        assert_eq!(config.mining.window_sizes, vec![3]);
        assert_eq!(config.mining.min_occurrences, 10);
        assert_eq!(config.mining.payout, 30);
        assert_eq!(config.telegram.unwrap().chat_id, "c");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.mining.window_sizes, vec![3, 5, 8]);
    }
}
