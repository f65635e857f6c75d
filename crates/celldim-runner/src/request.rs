//! Dimensioning inputs, their validation and resolution from layered config.

use crate::{EngineError, RunnerError};
use celldim_common::{
    Environment, Technology, DEFAULT_BASE_STATION_HEIGHT_M, DEFAULT_MOBILE_HEIGHT_M,
};
use celldim_link::LinkGeometry;
use celldim_model::{TechnologyRegistry, UnresolvedScenario};
use serde::Serialize;

/// Radio part of a scenario: what is needed for a link budget or a radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RadioSettings {
    pub technology: Technology,
    /// Carrier frequency in MHz.
    pub frequency_mhz: f64,
    pub environment: Environment,
    /// Antenna heights.
    pub geometry: LinkGeometry,
}

impl RadioSettings {
    /// Resolve the radio settings of a merged scenario.
    ///
    /// A band name is looked up in the registry. Giving both a band and a
    /// frequency in the same layer is rejected.
    pub fn resolve(
        scenario: &UnresolvedScenario,
        registry: &TechnologyRegistry,
    ) -> Result<Self, RunnerError> {
        let technology = require(scenario.technology, "technology")?;
        let environment = require(scenario.environment, "environment")?;

        let frequency_mhz = match (scenario.frequency_mhz, scenario.band.as_deref()) {
            (Some(_), Some(band)) => {
                return Err(RunnerError::ConfigError(format!(
                    "Both a frequency and band '{}' were given, use only one",
                    band
                )))
            }
            (Some(f), None) => f,
            (None, Some(band)) => registry.band_frequency(technology, band)?,
            (None, None) => return Err(missing("frequency_mhz (or band)")),
        };

        let geometry = LinkGeometry::new(
            scenario
                .base_station_height_m
                .unwrap_or(DEFAULT_BASE_STATION_HEIGHT_M),
            scenario.mobile_height_m.unwrap_or(DEFAULT_MOBILE_HEIGHT_M),
        );

        Ok(RadioSettings {
            technology,
            frequency_mhz,
            environment,
            geometry,
        })
    }

    /// Reject non-positive or non-finite frequency and antenna heights.
    pub fn validate(&self) -> Result<(), EngineError> {
        ensure_positive("frequency_mhz", self.frequency_mhz)?;
        ensure_positive("base_station_height_m", self.geometry.hb_m)?;
        ensure_positive("mobile_height_m", self.geometry.hm_m)?;
        Ok(())
    }
}

/// Inputs of one dimensioning run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DimensioningRequest {
    /// Area to cover in km².
    pub surface_total_km2: f64,
    #[serde(flatten)]
    pub radio: RadioSettings,
    /// Traffic demand in percent, 0 to 100.
    pub traffic_demand_pct: f64,
    /// Required quality of service in percent, 0 to 100.
    pub qos_pct: f64,
}

impl DimensioningRequest {
    /// Request with the default antenna heights (30 m and 1.5 m).
    pub fn new(
        surface_total_km2: f64,
        technology: Technology,
        frequency_mhz: f64,
        environment: Environment,
        traffic_demand_pct: f64,
        qos_pct: f64,
    ) -> Self {
        DimensioningRequest {
            surface_total_km2,
            radio: RadioSettings {
                technology,
                frequency_mhz,
                environment,
                geometry: LinkGeometry::default(),
            },
            traffic_demand_pct,
            qos_pct,
        }
    }

    /// Replace the antenna heights.
    pub fn with_geometry(mut self, geometry: LinkGeometry) -> Self {
        self.radio.geometry = geometry;
        self
    }

    /// Resolve a full request from a merged scenario.
    pub fn resolve(
        scenario: &UnresolvedScenario,
        registry: &TechnologyRegistry,
    ) -> Result<Self, RunnerError> {
        let radio = RadioSettings::resolve(scenario, registry)?;
        Ok(DimensioningRequest {
            surface_total_km2: require(scenario.surface_total_km2, "surface_total_km2")?,
            radio,
            traffic_demand_pct: require(scenario.traffic_demand_pct, "traffic_demand_pct")?,
            qos_pct: require(scenario.qos_pct, "qos_pct")?,
        })
    }

    /// Check every input range before running the engine.
    pub fn validate(&self) -> Result<(), EngineError> {
        ensure_positive("surface_total_km2", self.surface_total_km2)?;
        ensure_percent("traffic_demand_pct", self.traffic_demand_pct)?;
        ensure_percent("qos_pct", self.qos_pct)?;
        self.radio.validate()
    }
}

fn require<T>(value: Option<T>, field: &str) -> Result<T, RunnerError> {
    value.ok_or_else(|| missing(field))
}

fn missing(field: &str) -> RunnerError {
    RunnerError::ConfigError(format!(
        "Missing required value '{}' (set it in a --config file or on the command line)",
        field
    ))
}

fn ensure_positive(field: &str, value: f64) -> Result<(), EngineError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(EngineError::Validation(format!(
            "{} must be a positive number, got {}",
            field, value
        )));
    }
    Ok(())
}

fn ensure_percent(field: &str, value: f64) -> Result<(), EngineError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(EngineError::Validation(format!(
            "{} must be between 0 and 100, got {}",
            field, value
        )));
    }
    Ok(())
}
