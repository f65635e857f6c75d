//! Technology registry and partial profile overrides.
//!
//! The registry is built once, from the built-in catalog plus any overrides
//! read from YAML, and is read-only afterwards.

use crate::definitions::ALL_PROFILES;
use crate::ModelError;
use celldim_common::{FrequencyBand, Technology, TechnologyProfile};
use serde::Deserialize;
use std::collections::BTreeMap;

// ============================================================================
// Profile Overrides
// ============================================================================

/// Partial technology profile read from YAML.
///
/// Only the fields present replace the built-in values:
///
/// ```yaml
/// technologies:
///   LTE:
///     tx_power_max_dbm: 43.0
///     frequency_bands:
///       - name: "700"
///         frequency_mhz: 700.0
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileOverride {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Replaces the whole band list.
    #[serde(default)]
    pub frequency_bands: Option<Vec<FrequencyBand>>,
    #[serde(default)]
    pub channel_spacing_mhz: Option<f64>,
    #[serde(default)]
    pub tx_power_max_dbm: Option<f64>,
    #[serde(default)]
    pub rx_sensitivity_dbm: Option<f64>,
    #[serde(default)]
    pub noise_figure_db: Option<f64>,
    #[serde(default)]
    pub fade_margin_db: Option<f64>,
    #[serde(default)]
    pub interference_margin_db: Option<f64>,
    #[serde(default)]
    pub body_loss_db: Option<f64>,
    /// Unit cost of a base station in EUR (internal).
    #[serde(default)]
    pub cost_per_bts_eur: Option<f64>,
    /// Unit cost of a channel in EUR (internal).
    #[serde(default)]
    pub cost_per_channel_eur: Option<f64>,
}

impl ProfileOverride {
    /// Merge a later override on top of this one.
    pub fn merge(&mut self, other: &ProfileOverride) {
        if other.name.is_some() {
            self.name = other.name.clone();
        }
        if other.frequency_bands.is_some() {
            self.frequency_bands = other.frequency_bands.clone();
        }
        self.channel_spacing_mhz = other.channel_spacing_mhz.or(self.channel_spacing_mhz);
        self.tx_power_max_dbm = other.tx_power_max_dbm.or(self.tx_power_max_dbm);
        self.rx_sensitivity_dbm = other.rx_sensitivity_dbm.or(self.rx_sensitivity_dbm);
        self.noise_figure_db = other.noise_figure_db.or(self.noise_figure_db);
        self.fade_margin_db = other.fade_margin_db.or(self.fade_margin_db);
        self.interference_margin_db = other.interference_margin_db.or(self.interference_margin_db);
        self.body_loss_db = other.body_loss_db.or(self.body_loss_db);
        self.cost_per_bts_eur = other.cost_per_bts_eur.or(self.cost_per_bts_eur);
        self.cost_per_channel_eur = other.cost_per_channel_eur.or(self.cost_per_channel_eur);
    }

    /// Apply this override to a profile.
    pub fn apply_to(&self, profile: &mut TechnologyProfile) {
        if let Some(name) = &self.name {
            profile.name = name.clone();
        }
        if let Some(bands) = &self.frequency_bands {
            profile.frequency_bands = bands.clone();
        }
        if let Some(v) = self.channel_spacing_mhz {
            profile.channel_spacing_mhz = v;
        }
        if let Some(v) = self.tx_power_max_dbm {
            profile.tx_power_max_dbm = v;
        }
        if let Some(v) = self.rx_sensitivity_dbm {
            profile.rx_sensitivity_dbm = v;
        }
        if let Some(v) = self.noise_figure_db {
            profile.noise_figure_db = v;
        }
        if let Some(v) = self.fade_margin_db {
            profile.fade_margin_db = v;
        }
        if let Some(v) = self.interference_margin_db {
            profile.interference_margin_db = v;
        }
        if let Some(v) = self.body_loss_db {
            profile.body_loss_db = v;
        }
        if let Some(v) = self.cost_per_bts_eur {
            profile.unit_costs.per_bts_eur = v;
        }
        if let Some(v) = self.cost_per_channel_eur {
            profile.unit_costs.per_channel_eur = v;
        }
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Immutable catalog of technology profiles.
#[derive(Debug, Clone, PartialEq)]
pub struct TechnologyRegistry {
    profiles: BTreeMap<Technology, TechnologyProfile>,
}

impl TechnologyRegistry {
    /// Registry holding the built-in GSM, UMTS and LTE profiles.
    pub fn builtin() -> Self {
        TechnologyRegistry {
            profiles: ALL_PROFILES
                .iter()
                .map(|def| (def.technology, def.to_profile()))
                .collect(),
        }
    }

    /// Registry holding exactly the given profiles.
    ///
    /// A later profile for the same technology replaces an earlier one.
    pub fn from_profiles(profiles: impl IntoIterator<Item = TechnologyProfile>) -> Self {
        TechnologyRegistry {
            profiles: profiles.into_iter().map(|p| (p.technology, p)).collect(),
        }
    }

    /// Build a new registry with partial overrides applied.
    ///
    /// Overrides for technologies absent from this registry are rejected, as
    /// are profiles left without any band or with a non-positive band frequency.
    pub fn with_overrides(
        &self,
        overrides: &BTreeMap<Technology, ProfileOverride>,
    ) -> Result<Self, ModelError> {
        let mut profiles = self.profiles.clone();

        for (technology, profile_override) in overrides {
            let profile = profiles
                .get_mut(technology)
                .ok_or(ModelError::MissingProfile(*technology))?;
            profile_override.apply_to(profile);
            validate_profile(profile)?;
            tracing::debug!(technology = %technology, "applied profile override");
        }

        Ok(TechnologyRegistry { profiles })
    }

    /// Profile of a technology.
    pub fn get(&self, technology: Technology) -> Result<&TechnologyProfile, ModelError> {
        self.profiles
            .get(&technology)
            .ok_or(ModelError::MissingProfile(technology))
    }

    /// Profile for a technology key such as `"LTE"` (case-insensitive).
    pub fn lookup(&self, key: &str) -> Result<&TechnologyProfile, ModelError> {
        let technology: Technology = key.parse()?;
        self.get(technology)
    }

    /// Named bands of a technology, in catalog order.
    pub fn frequency_bands(&self, technology: Technology) -> Result<&[FrequencyBand], ModelError> {
        Ok(&self.get(technology)?.frequency_bands)
    }

    /// Carrier frequency in MHz of a named band.
    pub fn band_frequency(&self, technology: Technology, band: &str) -> Result<f64, ModelError> {
        self.get(technology)?
            .band(band)
            .map(|b| b.frequency_mhz)
            .ok_or_else(|| ModelError::UnknownBand {
                technology,
                band: band.to_string(),
            })
    }

    /// Profiles in stable order (GSM, UMTS, LTE).
    pub fn technologies(&self) -> impl Iterator<Item = &TechnologyProfile> {
        self.profiles.values()
    }
}

impl Default for TechnologyRegistry {
    fn default() -> Self {
        TechnologyRegistry::builtin()
    }
}

fn validate_profile(profile: &TechnologyProfile) -> Result<(), ModelError> {
    if profile.frequency_bands.is_empty() {
        return Err(ModelError::InvalidConfig(format!(
            "{} has no frequency band",
            profile.technology
        )));
    }
    if let Some(band) = profile
        .frequency_bands
        .iter()
        .find(|b| !(b.frequency_mhz.is_finite() && b.frequency_mhz > 0.0))
    {
        return Err(ModelError::InvalidConfig(format!(
            "{} band '{}' has invalid frequency {} MHz",
            profile.technology, band.name, band.frequency_mhz
        )));
    }

    let parameters = [
        ("channel_spacing_mhz", profile.channel_spacing_mhz),
        ("tx_power_max_dbm", profile.tx_power_max_dbm),
        ("rx_sensitivity_dbm", profile.rx_sensitivity_dbm),
        ("noise_figure_db", profile.noise_figure_db),
        ("fade_margin_db", profile.fade_margin_db),
        ("interference_margin_db", profile.interference_margin_db),
        ("body_loss_db", profile.body_loss_db),
    ];
    if let Some((parameter, value)) = parameters.iter().find(|(_, v)| !v.is_finite()) {
        return Err(ModelError::InvalidConfig(format!(
            "{} {} must be finite, got {}",
            profile.technology, parameter, value
        )));
    }

    let costs = [
        ("cost_per_bts_eur", profile.unit_costs.per_bts_eur),
        ("cost_per_channel_eur", profile.unit_costs.per_channel_eur),
    ];
    if let Some((parameter, value)) = costs.iter().find(|(_, v)| !(v.is_finite() && *v >= 0.0)) {
        return Err(ModelError::InvalidConfig(format!(
            "{} {} must be finite and non-negative, got {}",
            profile.technology, parameter, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use celldim_common::ParseError;

    #[test]
    fn test_builtin_values() {
        let registry = TechnologyRegistry::builtin();
        assert_eq!(registry.technologies().count(), 3);

        let gsm = registry.get(Technology::Gsm).unwrap();
        assert_eq!(gsm.name, "GSM (2G)");
        assert_eq!(gsm.tx_power_max_dbm, 43.0);
        assert_eq!(gsm.rx_sensitivity_dbm, -104.0);
        assert_eq!(gsm.unit_costs.per_bts_eur, 50_000.0);

        let lte = registry.get(Technology::Lte).unwrap();
        assert_eq!(lte.tx_power_max_dbm, 46.0);
        assert_eq!(lte.rx_sensitivity_dbm, -120.0);
        assert_eq!(lte.channel_spacing_mhz, 20.0);
        assert_eq!(lte.unit_costs.per_channel_eur, 8_000.0);
    }

    #[test]
    fn test_stable_order() {
        let registry = TechnologyRegistry::builtin();
        let order: Vec<Technology> = registry.technologies().map(|p| p.technology).collect();
        assert_eq!(order, vec![Technology::Gsm, Technology::Umts, Technology::Lte]);
    }

    #[test]
    fn test_lookup_by_key() {
        let registry = TechnologyRegistry::builtin();
        assert_eq!(registry.lookup("umts").unwrap().technology, Technology::Umts);
        assert!(matches!(
            registry.lookup("5G"),
            Err(ModelError::Parse(ParseError::UnknownTechnology(_)))
        ));
    }

    #[test]
    fn test_frequency_bands() {
        let registry = TechnologyRegistry::builtin();
        let bands: Vec<f64> = registry
            .frequency_bands(Technology::Lte)
            .unwrap()
            .iter()
            .map(|b| b.frequency_mhz)
            .collect();
        assert_eq!(bands, vec![800.0, 1800.0, 2600.0]);

        assert_eq!(registry.band_frequency(Technology::Gsm, "1800").unwrap(), 1800.0);
        assert!(matches!(
            registry.band_frequency(Technology::Gsm, "2600"),
            Err(ModelError::UnknownBand { technology: Technology::Gsm, .. })
        ));
    }

    #[test]
    fn test_missing_profile() {
        let registry = TechnologyRegistry::from_profiles(vec![crate::definitions::GSM_PROFILE.to_profile()]);
        assert!(registry.get(Technology::Gsm).is_ok());
        assert!(matches!(
            registry.get(Technology::Lte),
            Err(ModelError::MissingProfile(Technology::Lte))
        ));
    }

    #[test]
    fn test_with_overrides_builds_new_registry() {
        let builtin = TechnologyRegistry::builtin();
        let mut overrides = BTreeMap::new();
        overrides.insert(
            Technology::Lte,
            ProfileOverride {
                tx_power_max_dbm: Some(40.0),
                cost_per_bts_eur: Some(1.0),
                ..Default::default()
            },
        );

        let custom = builtin.with_overrides(&overrides).unwrap();
        let lte = custom.get(Technology::Lte).unwrap();
        assert_eq!(lte.tx_power_max_dbm, 40.0);
        assert_eq!(lte.rx_sensitivity_dbm, -120.0);
        assert_eq!(lte.unit_costs.per_bts_eur, 1.0);

        // The source registry is untouched
        assert_eq!(builtin.get(Technology::Lte).unwrap().tx_power_max_dbm, 46.0);
        assert_eq!(
            custom.get(Technology::Gsm).unwrap(),
            builtin.get(Technology::Gsm).unwrap()
        );
    }

    #[test]
    fn test_override_rejects_empty_bands() {
        let mut overrides = BTreeMap::new();
        overrides.insert(
            Technology::Gsm,
            ProfileOverride {
                frequency_bands: Some(Vec::new()),
                ..Default::default()
            },
        );
        assert!(matches!(
            TechnologyRegistry::builtin().with_overrides(&overrides),
            Err(ModelError::InvalidConfig(_))
        ));

        overrides.insert(
            Technology::Gsm,
            ProfileOverride {
                frequency_bands: Some(vec![FrequencyBand::new("bad", -5.0)]),
                ..Default::default()
            },
        );
        assert!(TechnologyRegistry::builtin().with_overrides(&overrides).is_err());
    }

    #[test]
    fn test_override_rejects_non_finite_parameters() {
        let cases = [
            ProfileOverride {
                tx_power_max_dbm: Some(f64::NAN),
                ..Default::default()
            },
            ProfileOverride {
                rx_sensitivity_dbm: Some(f64::NEG_INFINITY),
                ..Default::default()
            },
            ProfileOverride {
                fade_margin_db: Some(f64::INFINITY),
                ..Default::default()
            },
            ProfileOverride {
                body_loss_db: Some(f64::NAN),
                ..Default::default()
            },
            ProfileOverride {
                cost_per_bts_eur: Some(-1.0),
                ..Default::default()
            },
            ProfileOverride {
                cost_per_channel_eur: Some(f64::NAN),
                ..Default::default()
            },
        ];

        for case in cases {
            let mut overrides = BTreeMap::new();
            overrides.insert(Technology::Lte, case.clone());
            assert!(
                matches!(
                    TechnologyRegistry::builtin().with_overrides(&overrides),
                    Err(ModelError::InvalidConfig(_))
                ),
                "accepted {:?}",
                case
            );
        }

        // Finite negative margins and zero costs stay valid
        let mut overrides = BTreeMap::new();
        overrides.insert(
            Technology::Lte,
            ProfileOverride {
                fade_margin_db: Some(-2.0),
                cost_per_channel_eur: Some(0.0),
                ..Default::default()
            },
        );
        assert!(TechnologyRegistry::builtin().with_overrides(&overrides).is_ok());
    }

    #[test]
    fn test_override_merge_later_wins() {
        let mut base = ProfileOverride {
            fade_margin_db: Some(9.0),
            body_loss_db: Some(1.0),
            ..Default::default()
        };
        let later = ProfileOverride {
            fade_margin_db: Some(11.0),
            name: Some("LTE-A".to_string()),
            ..Default::default()
        };
        base.merge(&later);

        assert_eq!(base.fade_margin_db, Some(11.0));
        assert_eq!(base.body_loss_db, Some(1.0));
        assert_eq!(base.name.as_deref(), Some("LTE-A"));
    }
}
