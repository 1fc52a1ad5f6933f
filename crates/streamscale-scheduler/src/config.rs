//! Scheduler configuration.

use serde::Deserialize;

use streamscale_placement::RankWeights;
use streamscale_signal::DEFAULT_SIGNAL_PORT;

/// Tunables for the elasticity engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Number of machines to remove during scale-in.
    pub scale_in_node_count: usize,
    /// Port the signal server listens on.
    pub signal_port: u16,
    /// Ranking weights shared by all strategies.
    pub weights: RankWeights,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            scale_in_node_count: 4,
            signal_port: DEFAULT_SIGNAL_PORT,
            weights: RankWeights::default(),
        }
    }
}

impl SchedulerConfig {
    /// Parse a TOML document; absent keys keep their defaults.
    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let config = SchedulerConfig::default();
        assert_eq!(config.scale_in_node_count, 4);
        assert_eq!(config.signal_port, 5001);
        assert_eq!(config.weights.centrality, 1.0);
    }

    #[test]
    fn toml_overrides_and_defaults_mix() {
        let config = SchedulerConfig::from_toml(
            r#"
            scale_in_node_count = 2

            [weights]
            load = 0.5
            "#,
        )
        .unwrap();

        assert_eq!(config.scale_in_node_count, 2);
        assert_eq!(config.signal_port, 5001);
        assert_eq!(config.weights.load, 0.5);
        assert_eq!(config.weights.centrality, 1.0);
    }

    #[test]
    fn invalid_toml_is_rejected() {
        assert!(SchedulerConfig::from_toml("scale_in_node_count = \"four\"").is_err());
    }
}
