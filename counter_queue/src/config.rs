//! Scenario configuration.
//!
//! A [`ScenarioConfig`] is the raw, deserializable description of a run. It
//! becomes a [`Scenario`] only through [`ScenarioConfig::validate`], so every
//! simulation is built from parameters that are known to be usable.

use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;

use rand_distr::Exp;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Monitor sampling period in simulated minutes.
pub const DEFAULT_SAMPLE_INTERVAL: f64 = 1.0;

/// Parameters of a multi-counter queueing run. Times are in simulated minutes.
///
/// Missing TOML keys fall back to [`ScenarioConfig::default`].
///
/// ```
/// use counter_queue::ScenarioConfig;
///
/// let config = ScenarioConfig::from_toml_str("num_servers = 3\nrandom_seed = 9").unwrap();
/// assert_eq!(config.num_servers, 3);
/// assert_eq!(config.horizon, 120.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioConfig {
    pub num_servers: usize,
    pub horizon: f64,
    pub mean_interarrival: f64,
    pub mean_service: f64,
    pub random_seed: u64,
    pub sample_interval: f64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        ScenarioConfig {
            num_servers: 2,
            horizon: 120.0,
            mean_interarrival: 2.0,
            mean_service: 3.0,
            random_seed: 1,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
        }
    }
}

impl ScenarioConfig {
    pub fn from_toml_str(text: &str) -> Result<ScenarioConfig, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<ScenarioConfig, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check every parameter and build the distributions the run draws from.
    pub fn validate(&self) -> Result<Scenario, ConfigError> {
        let servers = NonZeroUsize::new(self.num_servers).ok_or(ConfigError::NoServers)?;
        let horizon = positive("horizon", self.horizon)?;
        let sample_interval = positive("sample_interval", self.sample_interval)?;
        let interarrival = exponential("mean_interarrival", self.mean_interarrival)?;
        let service = exponential("mean_service", self.mean_service)?;

        Ok(Scenario {
            servers,
            horizon,
            sample_interval,
            interarrival,
            service,
            seed: self.random_seed,
        })
    }
}

fn positive(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

/// Exponential distribution with the given mean.
fn exponential(field: &'static str, mean: f64) -> Result<Exp<f64>, ConfigError> {
    let mean = positive(field, mean)?;
    Exp::new(1.0 / mean).map_err(|e| ConfigError::Distribution {
        field,
        reason: e.to_string(),
    })
}

/// A validated scenario, ready to be turned into a simulation.
#[derive(Debug, Clone)]
pub struct Scenario {
    servers: NonZeroUsize,
    horizon: f64,
    sample_interval: f64,
    interarrival: Exp<f64>,
    service: Exp<f64>,
    seed: u64,
}

impl Scenario {
    pub fn servers(&self) -> NonZeroUsize {
        self.servers
    }

    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    pub fn sample_interval(&self) -> f64 {
        self.sample_interval
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub(crate) fn interarrival(&self) -> Exp<f64> {
        self.interarrival
    }

    pub(crate) fn service(&self) -> Exp<f64> {
        self.service
    }

    /// Same scenario, different random seed.
    pub fn with_seed(&self, seed: u64) -> Scenario {
        Scenario {
            seed,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_dashboard_defaults() {
        let config = ScenarioConfig::default();
        let scenario = config.validate().unwrap();

        assert_eq!(scenario.servers().get(), 2);
        assert_eq!(scenario.horizon(), 120.0);
        assert_eq!(scenario.sample_interval(), 1.0);
        assert_eq!(scenario.seed(), 1);
    }

    #[test]
    fn zero_servers_rejected() {
        let config = ScenarioConfig {
            num_servers: 0,
            ..ScenarioConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NoServers)));
    }

    #[test]
    fn non_positive_values_rejected_with_field_name() {
        let cases = [
            ("horizon", ScenarioConfig { horizon: 0.0, ..Default::default() }),
            ("mean_interarrival", ScenarioConfig { mean_interarrival: -1.0, ..Default::default() }),
            ("mean_service", ScenarioConfig { mean_service: f64::NAN, ..Default::default() }),
            ("sample_interval", ScenarioConfig { sample_interval: f64::INFINITY, ..Default::default() }),
        ];

        for (expected, config) in cases {
            match config.validate() {
                Err(ConfigError::NonPositive { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected NonPositive for {}, got {:?}", expected, other),
            }
        }
    }

    #[test]
    fn error_message_names_field_and_value() {
        let config = ScenarioConfig {
            mean_service: -2.5,
            ..Default::default()
        };
        let message = config.validate().unwrap_err().to_string();
        assert!(message.contains("mean_service"));
        assert!(message.contains("-2.5"));
    }

    #[test]
    fn toml_overrides_only_given_keys() {
        let config = ScenarioConfig::from_toml_str(
            r#"
            num_servers = 4
            mean_service = 1.5
            "#,
        )
        .unwrap();

        assert_eq!(config.num_servers, 4);
        assert_eq!(config.mean_service, 1.5);
        assert_eq!(config.mean_interarrival, 2.0);
        assert_eq!(config.sample_interval, DEFAULT_SAMPLE_INTERVAL);
    }

    #[test]
    fn unknown_toml_keys_rejected() {
        let result = ScenarioConfig::from_toml_str("num_counters = 4");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn load_reads_file_and_reports_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.toml");
        fs::write(&path, "horizon = 30.0\nrandom_seed = 5\n").unwrap();

        let config = ScenarioConfig::load(&path).unwrap();
        assert_eq!(config.horizon, 30.0);
        assert_eq!(config.random_seed, 5);

        let missing = ScenarioConfig::load(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn with_seed_keeps_everything_else() {
        let scenario = ScenarioConfig::default().validate().unwrap();
        let reseeded = scenario.with_seed(99);

        assert_eq!(reseeded.seed(), 99);
        assert_eq!(reseeded.servers(), scenario.servers());
        assert_eq!(reseeded.horizon(), scenario.horizon());
    }
}
