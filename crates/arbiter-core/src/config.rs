//! Run configuration (`arbiter.toml`).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::{SelectionPolicy, Weights, weights_from_raw};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub policy: SelectionPolicy,
    /// Weights committed before any stimulus is applied.
    pub weights: Option<Weights>,
    #[serde(default)]
    pub stimulus: StimulusConfig,
}

/// Randomized-trial parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StimulusConfig {
    pub seed: u64,
    pub trials: u32,
    pub cycles: u32,
    /// Pin ready and valid high for every trial.
    pub force_handshake: bool,
}

impl Default for StimulusConfig {
    fn default() -> Self {
        Self {
            seed: 2,
            trials: 8,
            cycles: 10,
            force_handshake: false,
        }
    }
}

impl RunConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RunConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Scaffold a config with the weighted 2:1:1:2 setup.
    pub fn scaffold(policy: SelectionPolicy) -> anyhow::Result<Self> {
        Ok(RunConfig {
            policy,
            weights: Some(weights_from_raw([2, 1, 1, 2])?),
            stimulus: StimulusConfig::default(),
        })
    }

    /// Apply `SEED`, `TRIALS` and `CYCLES` overrides from a variable lookup.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(seed) = lookup("SEED") {
            self.stimulus.seed = seed.trim().parse()?;
        }
        if let Some(trials) = lookup("TRIALS") {
            self.stimulus.trials = trials.trim().parse()?;
        }
        if let Some(cycles) = lookup("CYCLES") {
            self.stimulus.cycles = cycles.trim().parse()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let config: RunConfig = toml::from_str("").unwrap();
        assert_eq!(config.policy, SelectionPolicy::Strict);
        assert_eq!(config.weights, None);
        assert_eq!(config.stimulus, StimulusConfig::default());
    }

    #[test]
    fn test_parse_full() {
        let toml_str = r#"
policy = "credit"
weights = [2, 1, 1, 2]

[stimulus]
seed = 7
cycles = 40
"#;
        let config: RunConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.policy, SelectionPolicy::Credit);
        assert_eq!(config.weights.unwrap()[3].get(), 2);
        assert_eq!(config.stimulus.seed, 7);
        assert_eq!(config.stimulus.trials, 8);
        assert_eq!(config.stimulus.cycles, 40);
    }

    #[test]
    fn test_rejects_out_of_range_weight() {
        let result = toml::from_str::<RunConfig>("weights = [1, 2, 8, 0]");
        assert!(result.is_err());
    }

    #[test]
    fn test_scaffold_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arbiter.toml");
        let config = RunConfig::scaffold(SelectionPolicy::Credit).unwrap();
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

        let loaded = RunConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = RunConfig::default();
        config
            .apply_env_overrides(|key| match key {
                "SEED" => Some("11".to_string()),
                "CYCLES" => Some(" 25 ".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.stimulus.seed, 11);
        assert_eq!(config.stimulus.trials, 8);
        assert_eq!(config.stimulus.cycles, 25);

        let bad = config.apply_env_overrides(|_| Some("many".to_string()));
        assert!(bad.is_err());
    }
}
