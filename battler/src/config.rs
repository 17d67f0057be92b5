use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tourney_core::{
    DEFAULT_KOMI, Scorer, SprtCalculator, grade::format_grade_value, parse_cutoff, parse_komi,
};

use crate::error::{BattlerError, BattlerResult};

pub const DEFAULT_CONFIG_PATH: &str = "data/sprt.yaml";

/// Everything a test needs before the first game is recorded.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TestConfig {
    pub candidate: String,
    pub baseline: String,
    pub elo0: f64,
    pub elo1: f64,
    pub alpha: f64,
    pub beta: f64,
    /// Grade text, e.g. "G6.0"
    pub cutoff: String,
    /// Komi text, e.g. "G5.75"
    pub komi: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            candidate: "candidate".to_owned(),
            baseline: "baseline".to_owned(),
            elo0: 0.0,
            elo1: 10.0,
            alpha: 0.05,
            beta: 0.05,
            cutoff: format_grade_value(tourney_core::DEFAULT_CUTOFF),
            komi: DEFAULT_KOMI.to_string(),
        }
    }
}

impl TestConfig {
    pub fn validate(&self) -> BattlerResult<()> {
        let in_unit = |x: f64| x > 0.0 && x < 1.0;
        if !in_unit(self.alpha) {
            return Err(BattlerError::InvalidConfig(format!(
                "alpha must be in (0, 1), got {}",
                self.alpha
            )));
        }
        if !in_unit(self.beta) {
            return Err(BattlerError::InvalidConfig(format!(
                "beta must be in (0, 1), got {}",
                self.beta
            )));
        }
        if self.elo0 >= self.elo1 {
            return Err(BattlerError::InvalidConfig(format!(
                "elo0 ({}) must be below elo1 ({})",
                self.elo0, self.elo1
            )));
        }
        if self.candidate == self.baseline {
            return Err(BattlerError::InvalidConfig(format!(
                "candidate and baseline share the name {}",
                self.candidate
            )));
        }
        Ok(())
    }

    /// Unreadable cutoff or komi text falls back to the defaults.
    pub fn scorer(&self) -> Scorer {
        Scorer::new(parse_cutoff(&self.cutoff), parse_komi(&self.komi))
    }

    pub fn sprt(&self) -> SprtCalculator {
        SprtCalculator::new(self.elo0, self.elo1, self.alpha, self.beta)
    }
}

pub fn read_config(path: &Path) -> BattlerResult<TestConfig> {
    let yaml_string = std::fs::read_to_string(path)?;
    let config: TestConfig = serde_yaml::from_str(&yaml_string)?;
    config.validate()?;
    Ok(config)
}

/// The config file stored next to a results file.
pub fn config_path_for(results_path: &Path) -> PathBuf {
    results_path.with_extension("yaml")
}

pub fn write_config(config: &TestConfig, path: &Path) -> BattlerResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let yaml_string = serde_yaml::to_string(config)?;
    std::fs::write(path, yaml_string)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tourney_core::{DEFAULT_CUTOFF, Komi, Side};

    #[test]
    fn test_defaults() {
        let config = TestConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cutoff, "G6.0");
        let scorer = config.scorer();
        assert_eq!(scorer.cutoff, DEFAULT_CUTOFF);
        assert_eq!(scorer.komi, DEFAULT_KOMI);
        assert!(!config.sprt().is_null());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: TestConfig = serde_yaml::from_str("elo1: 5.0\nkomi: -G3.25\n").unwrap();
        assert_eq!(config.elo1, 5.0);
        assert_eq!(config.alpha, 0.05);
        assert_eq!(config.scorer().komi, Komi::new(13, Side::Second).unwrap());
    }

    #[test]
    fn test_bad_grade_text_falls_back() {
        let config = TestConfig {
            cutoff: "twelve".to_owned(),
            komi: "lots".to_owned(),
            ..Default::default()
        };
        let scorer = config.scorer();
        assert_eq!(scorer.cutoff, tourney_core::INITIAL_RESULT.value());
        assert_eq!(scorer.komi, DEFAULT_KOMI);
    }

    #[test]
    fn test_validate_rejects_bad_parameters() {
        let bad = [
            TestConfig {
                alpha: 0.0,
                ..Default::default()
            },
            TestConfig {
                beta: 1.0,
                ..Default::default()
            },
            TestConfig {
                elo0: 10.0,
                elo1: 10.0,
                ..Default::default()
            },
            TestConfig {
                baseline: "candidate".to_owned(),
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(matches!(
                config.validate(),
                Err(BattlerError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_config_file_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sprt.yaml");
        let config = TestConfig {
            elo0: -5.0,
            elo1: 5.0,
            komi: "-G2.25".to_owned(),
            ..Default::default()
        };

        write_config(&config, &path).unwrap();
        assert_eq!(read_config(&path).unwrap(), config);
    }

    #[test]
    fn test_config_path_for_results() {
        assert_eq!(
            config_path_for(Path::new("tmp/sprt-1.csv")),
            PathBuf::from("tmp/sprt-1.yaml")
        );
    }

    #[test]
    fn test_read_config_rejects_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sprt.yaml");
        std::fs::write(&path, "elo0: 10.0\nelo1: 0.0\n").unwrap();
        assert!(matches!(
            read_config(&path),
            Err(BattlerError::InvalidConfig(_))
        ));
        assert!(matches!(
            read_config(&temp_dir.path().join("missing.yaml")),
            Err(BattlerError::Io(_))
        ));
    }
}
