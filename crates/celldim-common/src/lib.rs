//! # celldim-common
//!
//! Common types for the celldim network dimensioning workspace.
//!
//! This crate provides the domain vocabulary shared by every other crate:
//! - Radio technologies ([`Technology`])
//! - Propagation environments ([`Environment`])
//! - Per-technology radio parameters ([`TechnologyProfile`], [`FrequencyBand`])
//! - Antenna defaults and fixed gains used by the link budget

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Constants
// ============================================================================

/// Base station (sector) antenna gain in dBi.
pub const TX_ANTENNA_GAIN_DBI: f64 = 18.0;

/// Mobile handset antenna gain in dBi.
pub const RX_ANTENNA_GAIN_DBI: f64 = 0.0;

/// Default base station antenna height in meters.
pub const DEFAULT_BASE_STATION_HEIGHT_M: f64 = 30.0;

/// Default mobile antenna height in meters.
pub const DEFAULT_MOBILE_HEIGHT_M: f64 = 1.5;

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised when parsing domain keys.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Technology key is not GSM, UMTS or LTE.
    #[error("Unknown technology: '{0}' (expected GSM, UMTS or LTE)")]
    UnknownTechnology(String),

    /// Environment name is not recognized.
    #[error("Unknown environment: '{0}' (expected urban, suburban, rural or free_space)")]
    UnknownEnvironment(String),
}

// ============================================================================
// Technology
// ============================================================================

/// Radio access technology being dimensioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Technology {
    /// GSM (2G), FDMA/TDMA with frequency reuse clusters.
    Gsm,
    /// UMTS (3G), WCDMA with universal reuse.
    Umts,
    /// LTE (4G), OFDMA with universal reuse.
    Lte,
}

impl Technology {
    /// All technologies in catalog order.
    pub const ALL: [Technology; 3] = [Technology::Gsm, Technology::Umts, Technology::Lte];

    /// Registry key for this technology.
    pub fn key(&self) -> &'static str {
        match self {
            Technology::Gsm => "GSM",
            Technology::Umts => "UMTS",
            Technology::Lte => "LTE",
        }
    }
}

impl fmt::Display for Technology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Technology {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Technology::ALL
            .into_iter()
            .find(|t| t.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::UnknownTechnology(s.to_string()))
    }
}

impl TryFrom<String> for Technology {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Technology> for String {
    fn from(value: Technology) -> Self {
        value.key().to_string()
    }
}

// ============================================================================
// Environment
// ============================================================================

/// Propagation environment class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Environment {
    /// Dense urban area (Okumura-Hata without correction).
    Urban,
    /// Suburban area.
    Suburban,
    /// Rural / open area.
    Rural,
    /// Unobstructed line of sight (free-space loss).
    FreeSpace,
}

impl Environment {
    /// All environments.
    pub const ALL: [Environment; 4] = [
        Environment::Urban,
        Environment::Suburban,
        Environment::Rural,
        Environment::FreeSpace,
    ];

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Urban => "urban",
            Environment::Suburban => "suburban",
            Environment::Rural => "rural",
            Environment::FreeSpace => "free_space",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Environment::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::UnknownEnvironment(s.to_string()))
    }
}

impl TryFrom<String> for Environment {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Environment> for String {
    fn from(value: Environment) -> Self {
        value.as_str().to_string()
    }
}

// ============================================================================
// Technology Profile
// ============================================================================

/// A named carrier frequency supported by a technology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyBand {
    /// Band label (e.g. "1800").
    pub name: String,
    /// Carrier frequency in MHz.
    pub frequency_mhz: f64,
}

impl FrequencyBand {
    /// Create a new band.
    pub fn new(name: impl Into<String>, frequency_mhz: f64) -> Self {
        FrequencyBand {
            name: name.into(),
            frequency_mhz,
        }
    }
}

/// Unit costs kept for internal bookkeeping.
///
/// Never serialized: presentation layers must not display them.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UnitCosts {
    /// Cost of one base station in EUR.
    pub per_bts_eur: f64,
    /// Cost of one channel unit in EUR.
    pub per_channel_eur: f64,
}

/// Radio parameters of one technology.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnologyProfile {
    /// Technology this profile describes.
    pub technology: Technology,
    /// Display name (e.g. "LTE (4G)").
    pub name: String,
    /// Named frequency bands, in catalog order.
    pub frequency_bands: Vec<FrequencyBand>,
    /// Channel spacing in MHz.
    pub channel_spacing_mhz: f64,
    /// Maximum transmit power in dBm.
    pub tx_power_max_dbm: f64,
    /// Receiver sensitivity in dBm.
    pub rx_sensitivity_dbm: f64,
    /// Receiver noise figure in dB.
    pub noise_figure_db: f64,
    /// Fade margin in dB.
    pub fade_margin_db: f64,
    /// Interference margin in dB.
    pub interference_margin_db: f64,
    /// Body loss in dB.
    pub body_loss_db: f64,
    /// Unit costs, internal only.
    #[serde(skip_serializing)]
    pub unit_costs: UnitCosts,
}

impl TechnologyProfile {
    /// Look up a named band.
    pub fn band(&self, name: &str) -> Option<&FrequencyBand> {
        self.frequency_bands.iter().find(|b| b.name == name)
    }

    /// Sum of the fixed losses applied on top of path loss.
    pub fn total_margins_db(&self) -> f64 {
        self.fade_margin_db + self.interference_margin_db + self.body_loss_db
    }
}
