//! Empirical path loss models for macro-cell planning.
//!
//! This crate provides the two propagation formulas used by the dimensioning
//! engine, both working in MHz and km:
//! - Free-space loss ([`path_loss_free_space`])
//! - Okumura-Hata with suburban/rural corrections ([`path_loss_okumura_hata`])
//!
//! Every function rejects non-positive or non-finite inputs with a
//! [`PropagationError`] before any logarithm is taken, so no result is NaN.
//!
//! # Example
//!
//! ```
//! use celldim_common::Environment;
//! use celldim_propagation::{path_loss, path_loss_free_space};
//!
//! let fspl = path_loss_free_space(900.0, 1.0).unwrap();
//! assert!((fspl - 91.53).abs() < 0.01);
//!
//! let urban = path_loss(900.0, 10.0, 30.0, 1.5, Environment::Urban).unwrap();
//! let rural = path_loss(900.0, 10.0, 30.0, 1.5, Environment::Rural).unwrap();
//! assert!(rural < urban);
//! ```

mod error;
mod types;

pub use error::{PropagationError, PropagationResult};
pub use types::*;

use celldim_common::Environment;
use error::ensure_positive;

/// Free-space constant for MHz and km inputs: 20*log10(4*pi/c) rescaled.
pub const FSPL_CONSTANT_MHZ_KM: f64 = 32.45;

// ============================================================================
// Free Space
// ============================================================================

/// Free-space path loss in dB.
///
/// `32.45 + 20*log10(f) + 20*log10(d)` with `f` in MHz and `d` in km.
pub fn path_loss_free_space(frequency_mhz: f64, distance_km: f64) -> PropagationResult<f64> {
    let f = ensure_positive("frequency_mhz", frequency_mhz)?;
    let d = ensure_positive("distance_km", distance_km)?;

    Ok(FSPL_CONSTANT_MHZ_KM + 20.0 * f.log10() + 20.0 * d.log10())
}

// ============================================================================
// Okumura-Hata
// ============================================================================

/// Mobile antenna height correction `a(hm)` in dB.
///
/// Between 150 and 1500 MHz (inclusive) the small/medium city formula is
/// used. Outside that range the large-city formula is applied unchanged,
/// including for bands such as 2600 MHz where it has not been validated.
pub fn mobile_antenna_correction(frequency_mhz: f64, hm_m: f64) -> PropagationResult<f64> {
    let f = ensure_positive("frequency_mhz", frequency_mhz)?;
    let hm = ensure_positive("hm_m", hm_m)?;

    let correction = match MobileCorrectionBranch::for_frequency(f) {
        MobileCorrectionBranch::SmallMediumCity => {
            (1.1 * f.log10() - 0.7) * hm - (1.56 * f.log10() - 0.8)
        }
        MobileCorrectionBranch::HighFrequency => {
            tracing::trace!(frequency_mhz = f, "using high-frequency a(hm) branch");
            3.2 * (11.75 * hm).log10().powi(2) - 4.97
        }
    };

    Ok(correction)
}

/// Environment correction in dB, to be subtracted from the urban loss.
///
/// Urban and free space carry no correction.
pub fn environment_correction(frequency_mhz: f64, environment: Environment) -> PropagationResult<f64> {
    let f = ensure_positive("frequency_mhz", frequency_mhz)?;

    let correction = match environment {
        Environment::Suburban => 2.0 * (f / 28.0).log10().powi(2) + 5.4,
        Environment::Rural => 4.78 * f.log10().powi(2) - 18.33 * f.log10() + 40.94,
        Environment::Urban | Environment::FreeSpace => 0.0,
    };

    Ok(correction)
}

/// Okumura-Hata path loss in dB.
///
/// # Arguments
///
/// * `frequency_mhz` - Carrier frequency in MHz
/// * `distance_km` - Distance from the base station in km
/// * `hb_m` - Base station antenna height in meters
/// * `hm_m` - Mobile antenna height in meters
/// * `environment` - Correction applied on top of the urban loss
pub fn path_loss_okumura_hata(
    frequency_mhz: f64,
    distance_km: f64,
    hb_m: f64,
    hm_m: f64,
    environment: Environment,
) -> PropagationResult<f64> {
    let f = ensure_positive("frequency_mhz", frequency_mhz)?;
    let d = ensure_positive("distance_km", distance_km)?;
    let hb = ensure_positive("hb_m", hb_m)?;
    let a_hm = mobile_antenna_correction(f, hm_m)?;

    let urban = 69.55 + 26.16 * f.log10() - 13.82 * hb.log10() - a_hm
        + (44.9 - 6.55 * hb.log10()) * d.log10();

    Ok(urban - environment_correction(f, environment)?)
}

// ============================================================================
// Dispatch
// ============================================================================

/// Path loss for an environment: free space for [`Environment::FreeSpace`],
/// Okumura-Hata otherwise.
pub fn path_loss(
    frequency_mhz: f64,
    distance_km: f64,
    hb_m: f64,
    hm_m: f64,
    environment: Environment,
) -> PropagationResult<f64> {
    match PathLossModel::for_environment(environment) {
        PathLossModel::FreeSpace => path_loss_free_space(frequency_mhz, distance_km),
        PathLossModel::OkumuraHata => {
            path_loss_okumura_hata(frequency_mhz, distance_km, hb_m, hm_m, environment)
        }
    }
}
