//! # celldim-model
//!
//! Technology catalog and YAML scenario loading for celldim.
//!
//! This crate provides:
//! - The built-in technology catalog ([`definitions`])
//! - An immutable [`TechnologyRegistry`] with partial profile overrides
//! - Scenario loading and merging from YAML files and strings
//!
//! ## Resolution Order
//!
//! Values are resolved in order (later overrides earlier):
//! 1. Built-in catalog and default antenna heights
//! 2. YAML files, in the order they are loaded
//! 3. Command line flags (applied by the runner)
//!
//! ## Example YAML
//!
//! ```yaml
//! scenario:
//!   surface_total_km2: 100.0
//!   technology: LTE
//!   frequency_mhz: 1800.0
//!   environment: urban
//!   traffic_demand_pct: 50.0
//!   qos_pct: 90.0
//! technologies:
//!   LTE:
//!     tx_power_max_dbm: 43.0
//! ```

pub mod definitions;
pub mod registry;

pub use definitions::{get_profile_def, ProfileDef, ALL_PROFILES};
pub use registry::{ProfileOverride, TechnologyRegistry};

use celldim_common::{Environment, ParseError, Technology};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while building the registry or loading scenarios.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Unknown technology or environment key.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Technology has no profile in the registry.
    #[error("No profile registered for technology {0}")]
    MissingProfile(Technology),

    /// Band name not offered by the technology.
    #[error("Unknown band '{band}' for {technology}")]
    UnknownBand {
        /// Technology searched.
        technology: Technology,
        /// Requested band name.
        band: String,
    },

    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// ============================================================================
// YAML Schema
// ============================================================================

/// Scenario inputs that may be partially specified.
///
/// Every field is optional so files can be layered; the runner reports
/// any required field still missing after all layers are applied.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnresolvedScenario {
    /// Area to cover in km².
    #[serde(default)]
    pub surface_total_km2: Option<f64>,
    #[serde(default)]
    pub technology: Option<Technology>,
    /// Carrier frequency in MHz.
    #[serde(default)]
    pub frequency_mhz: Option<f64>,
    /// Band name of the chosen technology, as an alternative to `frequency_mhz`.
    #[serde(default)]
    pub band: Option<String>,
    #[serde(default)]
    pub environment: Option<Environment>,
    /// Traffic demand in percent.
    #[serde(default)]
    pub traffic_demand_pct: Option<f64>,
    /// Required quality of service in percent.
    #[serde(default)]
    pub qos_pct: Option<f64>,
    #[serde(default)]
    pub base_station_height_m: Option<f64>,
    #[serde(default)]
    pub mobile_height_m: Option<f64>,
}

impl UnresolvedScenario {
    /// Merge a later layer on top of this one.
    pub fn merge(&mut self, other: &UnresolvedScenario) {
        self.surface_total_km2 = other.surface_total_km2.or(self.surface_total_km2);
        self.technology = other.technology.or(self.technology);
        // Frequency and band name select the same carrier
        if other.frequency_mhz.is_some() || other.band.is_some() {
            self.frequency_mhz = other.frequency_mhz;
            self.band = other.band.clone();
        }
        self.environment = other.environment.or(self.environment);
        self.traffic_demand_pct = other.traffic_demand_pct.or(self.traffic_demand_pct);
        self.qos_pct = other.qos_pct.or(self.qos_pct);
        self.base_station_height_m = other.base_station_height_m.or(self.base_station_height_m);
        self.mobile_height_m = other.mobile_height_m.or(self.mobile_height_m);
    }
}

/// Root scenario file structure (YAML schema).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioFileYaml {
    #[serde(default)]
    scenario: UnresolvedScenario,
    /// Partial profile overrides keyed by technology.
    #[serde(default)]
    technologies: BTreeMap<Technology, ProfileOverride>,
}

/// Merged content of one or more scenario files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioConfig {
    /// Scenario inputs.
    pub scenario: UnresolvedScenario,
    /// Profile overrides to apply on top of the built-in catalog.
    pub technologies: BTreeMap<Technology, ProfileOverride>,
}

impl ScenarioConfig {
    /// Built-in registry with this configuration's overrides applied.
    pub fn registry(&self) -> Result<TechnologyRegistry, ModelError> {
        TechnologyRegistry::builtin().with_overrides(&self.technologies)
    }
}

// ============================================================================
// Scenario Loading
// ============================================================================

/// Parse a scenario from a YAML string.
pub fn load_scenario_from_str(yaml_str: &str) -> Result<ScenarioConfig, ModelError> {
    load_scenarios_from_str(&[yaml_str])
}

/// Load and merge multiple scenario files.
///
/// Later files override earlier ones field by field, for both the scenario
/// inputs and the per-technology overrides.
pub fn load_scenarios(paths: &[&Path]) -> Result<ScenarioConfig, ModelError> {
    if paths.is_empty() {
        return Err(ModelError::InvalidConfig("No scenario files provided".to_string()));
    }

    let yaml_strings: Result<Vec<String>, std::io::Error> = paths
        .iter()
        .map(|path| {
            tracing::debug!(path = %path.display(), "reading scenario file");
            std::fs::read_to_string(path)
        })
        .collect();
    let yaml_strings = yaml_strings?;
    let yaml_strs: Vec<&str> = yaml_strings.iter().map(|s| s.as_str()).collect();

    load_scenarios_from_str(&yaml_strs)
}

/// Load and merge multiple scenarios from YAML strings.
///
/// Later strings override earlier ones field by field.
pub fn load_scenarios_from_str(yaml_strs: &[&str]) -> Result<ScenarioConfig, ModelError> {
    if yaml_strs.is_empty() {
        return Err(ModelError::InvalidConfig("No scenario strings provided".to_string()));
    }

    let mut config = ScenarioConfig::default();

    for yaml_str in yaml_strs {
        // An empty document deserializes to unit, not to an empty mapping
        if yaml_str.trim().is_empty() {
            continue;
        }
        let yaml: ScenarioFileYaml = serde_yaml::from_str(yaml_str)?;

        config.scenario.merge(&yaml.scenario);
        for (technology, profile_override) in &yaml.technologies {
            config
                .technologies
                .entry(*technology)
                .or_default()
                .merge(profile_override);
        }
    }

    tracing::debug!(
        layers = yaml_strs.len(),
        overridden_technologies = config.technologies.len(),
        "merged scenario configuration"
    );

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const BASE: &str = r#"
scenario:
  surface_total_km2: 100.0
  technology: LTE
  frequency_mhz: 1800.0
  environment: urban
  traffic_demand_pct: 50.0
  qos_pct: 90.0
"#;

    #[test]
    fn test_load_full_scenario() {
        let config = load_scenario_from_str(BASE).unwrap();
        let s = &config.scenario;
        assert_eq!(s.surface_total_km2, Some(100.0));
        assert_eq!(s.technology, Some(Technology::Lte));
        assert_eq!(s.frequency_mhz, Some(1800.0));
        assert_eq!(s.environment, Some(Environment::Urban));
        assert_eq!(s.traffic_demand_pct, Some(50.0));
        assert_eq!(s.qos_pct, Some(90.0));
        assert_eq!(s.base_station_height_m, None);
        assert!(config.technologies.is_empty());
    }

    #[test]
    fn test_later_layers_override_earlier() {
        let overlay = r#"
scenario:
  technology: gsm
  environment: rural
  base_station_height_m: 45.0
technologies:
  GSM:
    fade_margin_db: 6.0
"#;
        let config = load_scenarios_from_str(&[BASE, overlay]).unwrap();
        assert_eq!(config.scenario.technology, Some(Technology::Gsm));
        assert_eq!(config.scenario.environment, Some(Environment::Rural));
        assert_eq!(config.scenario.surface_total_km2, Some(100.0));
        assert_eq!(config.scenario.base_station_height_m, Some(45.0));

        let registry = config.registry().unwrap();
        assert_eq!(registry.get(Technology::Gsm).unwrap().fade_margin_db, 6.0);
        assert_eq!(registry.get(Technology::Lte).unwrap().fade_margin_db, 8.0);
    }

    #[test]
    fn test_technology_overrides_merge_per_field() {
        let first = "technologies:\n  LTE:\n    tx_power_max_dbm: 40.0\n    body_loss_db: 0.0\n";
        let second = "technologies:\n  lte:\n    tx_power_max_dbm: 44.0\n";
        let config = load_scenarios_from_str(&[first, second]).unwrap();

        let lte = &config.technologies[&Technology::Lte];
        assert_eq!(lte.tx_power_max_dbm, Some(44.0));
        assert_eq!(lte.body_loss_db, Some(0.0));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let yaml = "scenario:\n  surface: 10.0\n";
        assert!(matches!(load_scenario_from_str(yaml), Err(ModelError::Yaml(_))));

        let yaml = "technologies:\n  LTE:\n    gain_dbi: 3.0\n";
        assert!(matches!(load_scenario_from_str(yaml), Err(ModelError::Yaml(_))));
    }

    #[test]
    fn test_non_finite_override_rejected_by_registry() {
        let config = load_scenario_from_str("technologies:\n  LTE:\n    tx_power_max_dbm: .nan\n").unwrap();
        assert!(matches!(config.registry(), Err(ModelError::InvalidConfig(_))));

        let config = load_scenario_from_str("technologies:\n  GSM:\n    rx_sensitivity_dbm: -.inf\n").unwrap();
        assert!(matches!(config.registry(), Err(ModelError::InvalidConfig(_))));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(load_scenario_from_str("scenario:\n  technology: WIMAX\n").is_err());
        assert!(load_scenario_from_str("scenario:\n  environment: indoor\n").is_err());
        assert!(load_scenario_from_str("technologies:\n  NR: {}\n").is_err());
    }

    #[test]
    fn test_empty_inputs() {
        assert!(matches!(load_scenarios_from_str(&[]), Err(ModelError::InvalidConfig(_))));
        assert!(matches!(load_scenarios(&[]), Err(ModelError::InvalidConfig(_))));

        let config = load_scenario_from_str("").unwrap();
        assert_eq!(config, ScenarioConfig::default());
    }

    #[test]
    fn test_load_from_files() {
        let mut base = tempfile::NamedTempFile::new().unwrap();
        base.write_all(BASE.as_bytes()).unwrap();
        let mut overlay = tempfile::NamedTempFile::new().unwrap();
        overlay
            .write_all(b"scenario:\n  band: \"2600\"\n  qos_pct: 70.0\n")
            .unwrap();

        let config = load_scenarios(&[base.path(), overlay.path()]).unwrap();
        assert_eq!(config.scenario.band.as_deref(), Some("2600"));
        assert_eq!(config.scenario.qos_pct, Some(70.0));
        assert_eq!(config.scenario.frequency_mhz, None);
        assert_eq!(config.scenario.surface_total_km2, Some(100.0));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.yaml");
        assert!(matches!(load_scenarios(&[missing.as_path()]), Err(ModelError::Io(_))));
    }
}
