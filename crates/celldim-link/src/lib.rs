//! # celldim-link
//!
//! Downlink budget and coverage radius for cellular dimensioning.
//!
//! This crate provides:
//! - Antenna geometry ([`LinkGeometry`])
//! - Link budget calculation ([`compute_link_budget`], [`LinkBudgetResult`])
//! - Maximum feasible cell radius search ([`max_feasible_radius`], [`RadiusSolver`])

mod radius;

pub use radius::{max_feasible_radius, RadiusSearch, RadiusSolver};

use celldim_common::{
    Environment, TechnologyProfile, DEFAULT_BASE_STATION_HEIGHT_M, DEFAULT_MOBILE_HEIGHT_M,
    RX_ANTENNA_GAIN_DBI, TX_ANTENNA_GAIN_DBI,
};
use celldim_propagation::{path_loss, PathLossModel, PropagationError};
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during link calculations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinkError {
    /// Path loss could not be evaluated.
    #[error("Propagation error: {0}")]
    Propagation(#[from] PropagationError),

    /// Radius search interval or tolerance is unusable.
    #[error("Invalid radius search interval [{min_km}, {max_km}] km with tolerance {tolerance_km} km")]
    InvalidSearchInterval {
        /// Lower bound in km.
        min_km: f64,
        /// Upper bound in km.
        max_km: f64,
        /// Tolerance in km.
        tolerance_km: f64,
    },
}

// ============================================================================
// Antenna Geometry
// ============================================================================

/// Antenna heights of a base station to mobile link.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinkGeometry {
    /// Base station antenna height in meters.
    pub hb_m: f64,
    /// Mobile antenna height in meters.
    pub hm_m: f64,
}

impl LinkGeometry {
    /// Create a geometry from explicit heights.
    pub fn new(hb_m: f64, hm_m: f64) -> Self {
        LinkGeometry { hb_m, hm_m }
    }
}

impl Default for LinkGeometry {
    fn default() -> Self {
        LinkGeometry {
            hb_m: DEFAULT_BASE_STATION_HEIGHT_M,
            hm_m: DEFAULT_MOBILE_HEIGHT_M,
        }
    }
}

// ============================================================================
// Link Budget
// ============================================================================

/// Full downlink power budget at a given distance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkBudgetResult {
    /// Transmit power in dBm.
    pub tx_power_dbm: f64,
    /// Receiver sensitivity in dBm.
    pub rx_sensitivity_dbm: f64,
    /// Path loss in dB.
    pub path_loss_db: f64,
    /// Fade margin in dB.
    pub fade_margin_db: f64,
    /// Interference margin in dB.
    pub interference_margin_db: f64,
    /// Body loss in dB.
    pub body_loss_db: f64,
    /// Transmit antenna gain in dBi.
    pub tx_antenna_gain_dbi: f64,
    /// Receive antenna gain in dBi.
    pub rx_antenna_gain_dbi: f64,
    /// Power at the receiver in dBm.
    pub received_power_dbm: f64,
    /// Received power minus sensitivity, in dB.
    pub link_margin_db: f64,
    /// True when the link margin is strictly positive.
    pub feasible: bool,
}

impl LinkBudgetResult {
    /// Fade, interference and body losses combined.
    pub fn margins_db(&self) -> f64 {
        self.fade_margin_db + self.interference_margin_db + self.body_loss_db
    }
}

/// Compute the link budget of a technology at a distance.
///
/// Free-space loss is used for [`Environment::FreeSpace`], Okumura-Hata for
/// every other environment. Antenna gains are fixed at 18 dBi (base station)
/// and 0 dBi (mobile).
pub fn compute_link_budget(
    profile: &TechnologyProfile,
    frequency_mhz: f64,
    distance_km: f64,
    hb_m: f64,
    hm_m: f64,
    environment: Environment,
) -> Result<LinkBudgetResult, LinkError> {
    let path_loss_db = path_loss(frequency_mhz, distance_km, hb_m, hm_m, environment)?;

    let received_power_dbm = profile.tx_power_max_dbm + TX_ANTENNA_GAIN_DBI + RX_ANTENNA_GAIN_DBI
        - path_loss_db
        - profile.fade_margin_db
        - profile.interference_margin_db
        - profile.body_loss_db;
    let link_margin_db = received_power_dbm - profile.rx_sensitivity_dbm;

    tracing::trace!(
        technology = %profile.technology,
        model = %PathLossModel::for_environment(environment),
        distance_km,
        path_loss_db,
        link_margin_db,
        "link budget"
    );

    Ok(LinkBudgetResult {
        tx_power_dbm: profile.tx_power_max_dbm,
        rx_sensitivity_dbm: profile.rx_sensitivity_dbm,
        path_loss_db,
        fade_margin_db: profile.fade_margin_db,
        interference_margin_db: profile.interference_margin_db,
        body_loss_db: profile.body_loss_db,
        tx_antenna_gain_dbi: TX_ANTENNA_GAIN_DBI,
        rx_antenna_gain_dbi: RX_ANTENNA_GAIN_DBI,
        received_power_dbm,
        link_margin_db,
        feasible: link_margin_db > 0.0,
    })
}

#[cfg(test)]
pub(crate) mod test_profiles {
    use celldim_common::{FrequencyBand, Technology, TechnologyProfile, UnitCosts};

    pub fn lte() -> TechnologyProfile {
        TechnologyProfile {
            technology: Technology::Lte,
            name: "LTE (4G)".to_string(),
            frequency_bands: vec![
                FrequencyBand::new("800", 800.0),
                FrequencyBand::new("1800", 1800.0),
                FrequencyBand::new("2600", 2600.0),
            ],
            channel_spacing_mhz: 20.0,
            tx_power_max_dbm: 46.0,
            rx_sensitivity_dbm: -120.0,
            noise_figure_db: 6.0,
            fade_margin_db: 8.0,
            interference_margin_db: 4.0,
            body_loss_db: 3.0,
            unit_costs: UnitCosts {
                per_bts_eur: 120_000.0,
                per_channel_eur: 8_000.0,
            },
        }
    }

    pub fn gsm() -> TechnologyProfile {
        TechnologyProfile {
            technology: Technology::Gsm,
            name: "GSM (2G)".to_string(),
            frequency_bands: vec![
                FrequencyBand::new("900", 900.0),
                FrequencyBand::new("1800", 1800.0),
            ],
            channel_spacing_mhz: 0.2,
            tx_power_max_dbm: 43.0,
            rx_sensitivity_dbm: -104.0,
            noise_figure_db: 5.0,
            fade_margin_db: 10.0,
            interference_margin_db: 3.0,
            body_loss_db: 3.0,
            unit_costs: UnitCosts {
                per_bts_eur: 50_000.0,
                per_channel_eur: 2_000.0,
            },
        }
    }
}
