//! Model selection types.

use celldim_common::Environment;
use std::fmt;

/// Lower bound of the Okumura-Hata small/medium city correction range, MHz.
pub const HATA_LOW_BAND_MIN_MHZ: f64 = 150.0;

/// Upper bound of the Okumura-Hata small/medium city correction range, MHz.
pub const HATA_LOW_BAND_MAX_MHZ: f64 = 1500.0;

/// Path loss formula family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathLossModel {
    /// Friis free-space loss.
    FreeSpace,
    /// Okumura-Hata empirical model with environment correction.
    OkumuraHata,
}

impl PathLossModel {
    /// Formula used for an environment.
    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::FreeSpace => PathLossModel::FreeSpace,
            Environment::Urban | Environment::Suburban | Environment::Rural => {
                PathLossModel::OkumuraHata
            }
        }
    }

    /// Human readable name.
    pub fn name(&self) -> &'static str {
        match self {
            PathLossModel::FreeSpace => "Free Space",
            PathLossModel::OkumuraHata => "Okumura-Hata",
        }
    }
}

impl fmt::Display for PathLossModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which mobile antenna correction branch applies at a frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MobileCorrectionBranch {
    /// 150 to 1500 MHz inclusive.
    SmallMediumCity,
    /// Everything else, including bands above 1500 MHz.
    HighFrequency,
}

impl MobileCorrectionBranch {
    /// Branch selected for a frequency in MHz.
    pub fn for_frequency(frequency_mhz: f64) -> Self {
        if (HATA_LOW_BAND_MIN_MHZ..=HATA_LOW_BAND_MAX_MHZ).contains(&frequency_mhz) {
            MobileCorrectionBranch::SmallMediumCity
        } else {
            MobileCorrectionBranch::HighFrequency
        }
    }
}
