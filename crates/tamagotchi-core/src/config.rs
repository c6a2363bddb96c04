//! Configuration loading and typed config structures for the pet simulation.
//!
//! The configuration lives in `tamagotchi-config.yaml` next to the binary.
//! This module defines strongly-typed structs that mirror the YAML
//! structure and a loader that reads the file. Every field has a default
//! matching the reference timings, so an empty or missing file yields a
//! fully working configuration.
//!
//! All durations are milliseconds of simulated time.

use std::path::Path;

use serde::Deserialize;
use tamagotchi_types::Vital;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PetConfig {
    /// Tick cadence and time scale.
    #[serde(default)]
    pub clock: ClockConfig,

    /// Per-vital drain, refill, and grace timings.
    #[serde(default)]
    pub vitals: VitalsConfig,

    /// Health decay, experience, and blink timings.
    #[serde(default)]
    pub health: HealthConfig,

    /// Persistence and authentication endpoints.
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PetConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for remote endpoints:
    /// - `TAMAGOTCHI_API_URL` overrides `remote.api_base_url`
    /// - `TAMAGOTCHI_AUTH_URL` overrides `remote.auth_url`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse_yaml(&contents)?;
        config.remote.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config = Self::parse_yaml(yaml)?;
        config.remote.apply_env_overrides();
        Ok(config)
    }

    fn parse_yaml(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes as unit, not as an empty map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// Tick cadence configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClockConfig {
    /// Real-time milliseconds between ticks.
    #[serde(default = "default_tick_period_ms")]
    pub tick_period_ms: u64,

    /// Initial time-scale multiplier. Non-positive values fall back to 1.0.
    #[serde(default = "default_simulation_speed")]
    pub simulation_speed: f64,

    /// Stop after this many ticks (0 = run until stopped).
    #[serde(default)]
    pub max_ticks: u64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: default_tick_period_ms(),
            simulation_speed: default_simulation_speed(),
            max_ticks: 0,
        }
    }
}

/// Timings for one vital.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct VitalConfig {
    /// Time to drain from 100 to 0 while idle.
    pub deplete_ms: f64,

    /// Time to refill from 0 to 100 while replenishing.
    pub refill_ms: f64,

    /// Time a vital may sit at 0 before the pet starts dying of it.
    #[serde(default = "default_grace_ms")]
    pub grace_ms: f64,
}

/// Timings for all three vitals.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VitalsConfig {
    /// Food: drained in 3h, refilled in 15min.
    #[serde(default = "default_food")]
    pub food: VitalConfig,

    /// Stamina: drained in 1h, refilled in 10min.
    #[serde(default = "default_stamina")]
    pub stamina: VitalConfig,

    /// Water: drained in 1h, refilled in 5min.
    #[serde(default = "default_water")]
    pub water: VitalConfig,
}

impl VitalsConfig {
    /// Timings for the given vital.
    pub const fn get(&self, vital: Vital) -> &VitalConfig {
        match vital {
            Vital::Food => &self.food,
            Vital::Stamina => &self.stamina,
            Vital::Water => &self.water,
        }
    }
}

impl Default for VitalsConfig {
    fn default() -> Self {
        Self {
            food: default_food(),
            stamina: default_stamina(),
            water: default_water(),
        }
    }
}

/// Health, experience, and cosmetic timings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthConfig {
    /// Time of continuous distress that takes health from 100 to 0.
    #[serde(default = "default_time_to_die_ms")]
    pub time_to_die_ms: f64,

    /// Distress-free time that earns one experience point.
    #[serde(default = "default_time_for_point_ms")]
    pub time_for_point_ms: f64,

    /// Period of the alternate-icon blink for empty vitals.
    #[serde(default = "default_blink_period_ms")]
    pub blink_period_ms: f64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            time_to_die_ms: default_time_to_die_ms(),
            time_for_point_ms: default_time_for_point_ms(),
            blink_period_ms: default_blink_period_ms(),
        }
    }
}

/// Which persistence backend the engine talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// The REST persistence service.
    #[default]
    Http,
    /// A process-local store, for offline play and tests.
    Memory,
}

/// Persistence and authentication endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteConfig {
    /// Backend selection.
    #[serde(default)]
    pub backend: BackendKind,

    /// Base URL of the persistence service.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Token refresh endpoint.
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    /// Where the current token set is stored between runs.
    #[serde(default = "default_token_file")]
    pub token_file: String,

    /// Real-time milliseconds between credential refreshes.
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,

    /// Per-request timeout for remote calls.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl RemoteConfig {
    /// Override endpoint URLs with environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("TAMAGOTCHI_API_URL") {
            self.api_base_url = val;
        }
        if let Ok(val) = std::env::var("TAMAGOTCHI_AUTH_URL") {
            self.auth_url = val;
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            api_base_url: default_api_base_url(),
            auth_url: default_auth_url(),
            token_file: default_token_file(),
            refresh_interval_ms: default_refresh_interval_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_tick_period_ms() -> u64 {
    250
}

const fn default_simulation_speed() -> f64 {
    1.0
}

const fn default_grace_ms() -> f64 {
    600_000.0
}

const fn default_food() -> VitalConfig {
    VitalConfig {
        deplete_ms: 10_800_000.0,
        refill_ms: 900_000.0,
        grace_ms: default_grace_ms(),
    }
}

const fn default_stamina() -> VitalConfig {
    VitalConfig {
        deplete_ms: 3_600_000.0,
        refill_ms: 600_000.0,
        grace_ms: default_grace_ms(),
    }
}

const fn default_water() -> VitalConfig {
    VitalConfig {
        deplete_ms: 3_600_000.0,
        refill_ms: 300_000.0,
        grace_ms: default_grace_ms(),
    }
}

const fn default_time_to_die_ms() -> f64 {
    900_000.0
}

const fn default_time_for_point_ms() -> f64 {
    60_000.0
}

const fn default_blink_period_ms() -> f64 {
    1_000.0
}

fn default_api_base_url() -> String {
    "https://localhost:32794/".to_owned()
}

fn default_auth_url() -> String {
    "https://localhost:32794/api/User/Refresh".to_owned()
}

fn default_token_file() -> String {
    "tamagotchi-tokens.json".to_owned()
}

const fn default_refresh_interval_ms() -> u64 {
    3_500_000
}

const fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_reference_timings() {
        let config = PetConfig::default();
        assert_eq!(config.clock.tick_period_ms, 250);
        assert!((config.vitals.food.deplete_ms - 10_800_000.0).abs() < f64::EPSILON);
        assert!((config.vitals.water.refill_ms - 300_000.0).abs() < f64::EPSILON);
        assert!((config.vitals.stamina.grace_ms - 600_000.0).abs() < f64::EPSILON);
        assert!((config.health.time_to_die_ms - 900_000.0).abs() < f64::EPSILON);
        assert_eq!(config.remote.refresh_interval_ms, 3_500_000);
        assert_eq!(config.remote.backend, BackendKind::Http);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
clock:
  tick_period_ms: 100
  simulation_speed: 4.0

vitals:
  food:
    deplete_ms: 1000
    refill_ms: 500
    grace_ms: 200
  water:
    deplete_ms: 2000
    refill_ms: 100

health:
  time_to_die_ms: 5000
  time_for_point_ms: 1000
  blink_period_ms: 250

remote:
  backend: memory
  api_base_url: "http://pets.test/"
  token_file: "/tmp/tokens.json"
  refresh_interval_ms: 60000

logging:
  level: "debug"
"#;

        let config = PetConfig::parse_yaml(yaml).unwrap();
        assert_eq!(config.clock.tick_period_ms, 100);
        assert!((config.clock.simulation_speed - 4.0).abs() < f64::EPSILON);
        assert!((config.vitals.food.grace_ms - 200.0).abs() < f64::EPSILON);
        // Grace defaults when a vital section omits it.
        assert!((config.vitals.water.grace_ms - 600_000.0).abs() < f64::EPSILON);
        // Untouched vitals keep their defaults.
        assert!((config.vitals.stamina.deplete_ms - 3_600_000.0).abs() < f64::EPSILON);
        assert!((config.health.blink_period_ms - 250.0).abs() < f64::EPSILON);
        assert_eq!(config.remote.backend, BackendKind::Memory);
        assert_eq!(config.remote.api_base_url, "http://pets.test/");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = PetConfig::parse_yaml("clock:\n  simulation_speed: 2.0\n").unwrap();
        assert!((config.clock.simulation_speed - 2.0).abs() < f64::EPSILON);
        assert_eq!(config.clock.tick_period_ms, 250);
        assert_eq!(config.vitals, VitalsConfig::default());
    }

    #[test]
    fn parse_empty_yaml() {
        let config = PetConfig::parse_yaml("");
        assert!(config.is_ok());
        assert_eq!(config.unwrap(), PetConfig::default());
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let result = PetConfig::parse_yaml("clock: [unterminated");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn vital_lookup_matches_fields() {
        let vitals = VitalsConfig::default();
        assert_eq!(vitals.get(Vital::Water), &vitals.water);
        assert_eq!(vitals.get(Vital::Food), &vitals.food);
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("tamagotchi-config.yaml");
        if path.exists() {
            let config = PetConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
