use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::planners::rl::{BuildManagerConfig, FootprintConfig, QLearningConfig};

const DEFAULT_DATA_FILE: &str = "bm_agent_data.json.gz";
const DEFAULT_STEP_DELAY_MS: u64 = 100;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key}={value:?} is not a valid value")]
    Invalid { key: &'static str, value: String },
    #[error("{key}={value} is out of range ({range})")]
    OutOfRange {
        key: &'static str,
        value: f64,
        range: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgentKind {
    #[default]
    BuildManager,
    Simple,
}

impl FromStr for AgentKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bm" | "bm_agent" => Ok(AgentKind::BuildManager),
            "simple" | "simple_agent" => Ok(AgentKind::Simple),
            _ => Err(()),
        }
    }
}

/// Everything the binary reads from the environment
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub agent: AgentKind,
    pub build_manager: BuildManagerConfig,
    pub step_delay: Duration,
    pub replays_folder: Option<PathBuf>,
}

impl AgentConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let agent = parse_var(&lookup, "SCBOT_AGENT")?.unwrap_or_default();

        let data_file = lookup("SCBOT_DATA_FILE")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_DATA_FILE.to_string());

        let defaults = QLearningConfig::default();
        let learning = QLearningConfig {
            learning_rate: in_range(
                "SCBOT_LEARNING_RATE",
                parse_var(&lookup, "SCBOT_LEARNING_RATE")?.unwrap_or(defaults.learning_rate),
                |v| v > 0.0 && v <= 1.0,
                "0 < rate <= 1",
            )?,
            discount: in_range(
                "SCBOT_DISCOUNT",
                parse_var(&lookup, "SCBOT_DISCOUNT")?.unwrap_or(defaults.discount),
                |v| (0.0..=1.0).contains(&v),
                "0 <= discount <= 1",
            )?,
            epsilon: in_range(
                "SCBOT_EPSILON",
                parse_var(&lookup, "SCBOT_EPSILON")?.unwrap_or(defaults.epsilon),
                |v| (0.0..=1.0).contains(&v),
                "0 <= epsilon <= 1",
            )?,
            seed: parse_var(&lookup, "SCBOT_SEED")?,
        };

        let footprint = |key: &'static str, default: f64| -> Result<f64, ConfigError> {
            in_range(
                key,
                parse_var(&lookup, key)?.unwrap_or(default),
                |v| v > 0.0,
                "footprint > 0",
            )
        };
        let default_footprints = FootprintConfig::default();
        let footprints = FootprintConfig {
            supply_depot: footprint("SCBOT_DEPOT_FOOTPRINT", default_footprints.supply_depot)?,
            barracks: footprint("SCBOT_BARRACKS_FOOTPRINT", default_footprints.barracks)?,
            factory: footprint("SCBOT_FACTORY_FOOTPRINT", default_footprints.factory)?,
            starport: footprint("SCBOT_STARPORT_FOOTPRINT", default_footprints.starport)?,
        };

        let step_delay_ms =
            parse_var(&lookup, "SCBOT_STEP_DELAY_MS")?.unwrap_or(DEFAULT_STEP_DELAY_MS);
        let replays_folder = lookup("SCBOT_REPLAYS_FOLDER")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            agent,
            build_manager: BuildManagerConfig {
                data_file: Some(PathBuf::from(data_file)),
                learning,
                footprints,
            },
            step_delay: Duration::from_millis(step_delay_ms),
            replays_folder,
        })
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

fn in_range(
    key: &'static str,
    value: f64,
    valid: impl Fn(f64) -> bool,
    range: &'static str,
) -> Result<f64, ConfigError> {
    if valid(value) {
        Ok(value)
    } else {
        Err(ConfigError::OutOfRange { key, value, range })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AgentConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AgentConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.agent, AgentKind::BuildManager);
        assert_eq!(
            config.build_manager.data_file,
            Some(PathBuf::from("bm_agent_data.json.gz"))
        );
        assert_eq!(config.build_manager.learning.learning_rate, 0.01);
        assert_eq!(config.build_manager.learning.discount, 0.9);
        assert_eq!(config.build_manager.learning.epsilon, 0.9);
        assert_eq!(config.build_manager.learning.seed, None);
        assert_eq!(config.step_delay, Duration::from_millis(100));
        assert!(config.replays_folder.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("SCBOT_AGENT", "simple"),
            ("SCBOT_SEED", "42"),
            ("SCBOT_EPSILON", "1.0"),
            ("SCBOT_BARRACKS_FOOTPRINT", "150"),
            ("SCBOT_STEP_DELAY_MS", "0"),
            ("SCBOT_REPLAYS_FOLDER", "replays"),
        ])
        .unwrap();
        assert_eq!(config.agent, AgentKind::Simple);
        assert_eq!(config.build_manager.learning.seed, Some(42));
        assert_eq!(config.build_manager.learning.epsilon, 1.0);
        assert_eq!(config.build_manager.footprints.barracks, 150.0);
        assert_eq!(config.build_manager.footprints.supply_depot, 69.0);
        assert!(config.step_delay.is_zero());
        assert_eq!(config.replays_folder, Some(PathBuf::from("replays")));
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            config(&[("SCBOT_AGENT", "zerg")]).unwrap_err(),
            ConfigError::Invalid {
                key: "SCBOT_AGENT",
                value: "zerg".to_string()
            }
        );
        assert!(matches!(
            config(&[("SCBOT_EPSILON", "1.5")]),
            Err(ConfigError::OutOfRange { key: "SCBOT_EPSILON", .. })
        ));
        assert!(matches!(
            config(&[("SCBOT_DEPOT_FOOTPRINT", "0")]),
            Err(ConfigError::OutOfRange { .. })
        ));
        assert!(matches!(
            config(&[("SCBOT_SEED", "-1")]),
            Err(ConfigError::Invalid { key: "SCBOT_SEED", .. })
        ));
    }
}
