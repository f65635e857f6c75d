//! Built-in technology catalog.
//!
//! Each technology is a compile-time constant so the whole catalog can be
//! reviewed in one place. Converting a definition into a
//! [`TechnologyProfile`] is done by the registry at construction time.
//!
//! ## Maintenance Guidelines
//!
//! 1. **Bands are ordered** - The first band is the one offered by default
//!    to users, so keep the preferred carrier first.
//!
//! 2. **Costs are internal** - Unit costs feed the engine's cost estimate
//!    but never leave the process. Do not surface them in `Serialize` impls.

use celldim_common::{FrequencyBand, Technology, TechnologyProfile, UnitCosts};

/// Compile-time description of one technology.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileDef {
    /// Technology key.
    pub technology: Technology,
    /// Display name.
    pub name: &'static str,
    /// Named bands as `(name, MHz)` pairs, in catalog order.
    pub bands: &'static [(&'static str, f64)],
    /// Channel spacing in MHz.
    pub channel_spacing_mhz: f64,
    /// Maximum transmit power in dBm.
    pub tx_power_max_dbm: f64,
    /// Receiver sensitivity in dBm.
    pub rx_sensitivity_dbm: f64,
    /// Noise figure in dB.
    pub noise_figure_db: f64,
    /// Fade margin in dB.
    pub fade_margin_db: f64,
    /// Interference margin in dB.
    pub interference_margin_db: f64,
    /// Body loss in dB.
    pub body_loss_db: f64,
    /// Cost of one base station in EUR.
    pub cost_per_bts_eur: f64,
    /// Cost of one channel unit in EUR.
    pub cost_per_channel_eur: f64,
}

impl ProfileDef {
    /// Build the runtime profile.
    pub fn to_profile(&self) -> TechnologyProfile {
        TechnologyProfile {
            technology: self.technology,
            name: self.name.to_string(),
            frequency_bands: self
                .bands
                .iter()
                .map(|&(name, mhz)| FrequencyBand::new(name, mhz))
                .collect(),
            channel_spacing_mhz: self.channel_spacing_mhz,
            tx_power_max_dbm: self.tx_power_max_dbm,
            rx_sensitivity_dbm: self.rx_sensitivity_dbm,
            noise_figure_db: self.noise_figure_db,
            fade_margin_db: self.fade_margin_db,
            interference_margin_db: self.interference_margin_db,
            body_loss_db: self.body_loss_db,
            unit_costs: UnitCosts {
                per_bts_eur: self.cost_per_bts_eur,
                per_channel_eur: self.cost_per_channel_eur,
            },
        }
    }
}

// ============================================================================
// 2G
// ============================================================================

/// GSM with 200 kHz carriers.
pub const GSM_PROFILE: ProfileDef = ProfileDef {
    technology: Technology::Gsm,
    name: "GSM (2G)",
    bands: &[("900", 900.0), ("1800", 1800.0)],
    channel_spacing_mhz: 0.2,
    tx_power_max_dbm: 43.0,
    rx_sensitivity_dbm: -104.0,
    noise_figure_db: 5.0,
    fade_margin_db: 10.0,
    interference_margin_db: 3.0,
    body_loss_db: 3.0,
    cost_per_bts_eur: 50_000.0,
    cost_per_channel_eur: 2_000.0,
};

// ============================================================================
// 3G
// ============================================================================

/// UMTS with 5 MHz carriers. 2100 MHz is listed before the refarmed 900 MHz band.
pub const UMTS_PROFILE: ProfileDef = ProfileDef {
    technology: Technology::Umts,
    name: "UMTS (3G)",
    bands: &[("2100", 2100.0), ("900", 900.0)],
    channel_spacing_mhz: 5.0,
    tx_power_max_dbm: 43.0,
    rx_sensitivity_dbm: -117.0,
    noise_figure_db: 7.0,
    fade_margin_db: 12.0,
    interference_margin_db: 5.0,
    body_loss_db: 3.0,
    cost_per_bts_eur: 80_000.0,
    cost_per_channel_eur: 5_000.0,
};

// ============================================================================
// 4G
// ============================================================================

/// LTE with 20 MHz carriers.
pub const LTE_PROFILE: ProfileDef = ProfileDef {
    technology: Technology::Lte,
    name: "LTE (4G)",
    bands: &[("800", 800.0), ("1800", 1800.0), ("2600", 2600.0)],
    channel_spacing_mhz: 20.0,
    tx_power_max_dbm: 46.0,
    rx_sensitivity_dbm: -120.0,
    noise_figure_db: 6.0,
    fade_margin_db: 8.0,
    interference_margin_db: 4.0,
    body_loss_db: 3.0,
    cost_per_bts_eur: 120_000.0,
    cost_per_channel_eur: 8_000.0,
};

/// Every built-in definition, in catalog order.
pub const ALL_PROFILES: &[&ProfileDef] = &[&GSM_PROFILE, &UMTS_PROFILE, &LTE_PROFILE];

/// Find the built-in definition of a technology.
pub fn get_profile_def(technology: Technology) -> Option<&'static ProfileDef> {
    ALL_PROFILES
        .iter()
        .copied()
        .find(|def| def.technology == technology)
}
