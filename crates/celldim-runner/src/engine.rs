//! Cell dimensioning pipeline.
//!
//! One call runs the whole chain for a request:
//! maximum radius, traffic and QoS adjusted radius, hexagonal cell count,
//! per-cell capacity, reuse pattern, cost estimate and the link budget at
//! the planned radius. Every step is deterministic, so identical requests
//! give bit-identical results.

use crate::capacity::TechnologyExt;
use crate::request::{DimensioningRequest, RadioSettings};
use crate::EngineError;
use celldim_common::{Environment, Technology, TechnologyProfile};
use celldim_link::{compute_link_budget, LinkBudgetResult, RadiusSearch, RadiusSolver};
use celldim_model::TechnologyRegistry;
use celldim_propagation::PathLossModel;
use serde::Serialize;
use std::sync::Arc;

/// Radius reduction applied at full traffic load.
pub const TRAFFIC_RADIUS_REDUCTION: f64 = 0.3;

/// Area of a regular hexagon of circumradius 1.
pub const HEXAGON_AREA_FACTOR: f64 = 2.598_076_211_353_316;

// ============================================================================
// Result Types
// ============================================================================

/// Cost estimate of a deployment, in EUR.
///
/// Kept for planning tools inside the process; never serialized.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CostEstimate {
    /// Base stations.
    pub infrastructure_eur: f64,
    /// Channel equipment.
    pub equipment_eur: f64,
    /// Infrastructure plus equipment.
    pub total_eur: f64,
}

/// Outcome of a dimensioning run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensioningResult {
    /// Technology the network is planned for.
    pub technology: Technology,
    /// Display name of the technology.
    pub technology_name: String,
    /// Carrier frequency in MHz.
    pub frequency_mhz: f64,
    /// Propagation environment.
    pub environment: Environment,
    /// Path loss formula used for the environment.
    pub propagation_model: String,
    /// Largest radius at which the link still closes, in km.
    pub max_radius_km: f64,
    /// False when no probed radius closed the link.
    pub max_radius_confirmed: bool,
    /// True when the link closed up to the end of the search interval.
    pub max_radius_capped: bool,
    /// Planned radius after traffic and QoS adjustment, in km.
    pub optimal_radius_km: f64,
    /// Hexagonal cell area in km².
    pub cell_area_km2: f64,
    /// Cells needed to cover the surface.
    pub cell_count: u64,
    /// Frequency reuse cluster size.
    pub cluster_size: u32,
    /// Co-channel reuse distance in km.
    pub reuse_distance_km: f64,
    /// Users served by one cell.
    pub capacity_per_cell: f64,
    /// Users served by all cells.
    pub total_capacity: f64,
    /// Traffic channels for GSM, equal to the capacity for UMTS and LTE.
    pub channels_per_cell: u32,
    /// Link budget at the planned radius.
    pub link_budget: LinkBudgetResult,
    /// Achieved QoS score in percent.
    pub qos_score: f64,
    #[serde(skip_serializing)]
    costs: CostEstimate,
}

impl DimensioningResult {
    /// Internal cost estimate.
    pub fn costs(&self) -> &CostEstimate {
        &self.costs
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Runs dimensioning requests against a shared, read-only registry.
///
/// The engine holds no mutable state and can be shared across threads.
#[derive(Debug, Clone)]
pub struct DimensioningEngine {
    registry: Arc<TechnologyRegistry>,
    solver: RadiusSolver,
}

impl DimensioningEngine {
    /// Engine using the default radius search interval.
    pub fn new(registry: Arc<TechnologyRegistry>) -> Self {
        DimensioningEngine {
            registry,
            solver: RadiusSolver::default(),
        }
    }

    /// Replace the radius solver.
    pub fn with_solver(mut self, solver: RadiusSolver) -> Self {
        self.solver = solver;
        self
    }

    /// Registry this engine reads profiles from.
    pub fn registry(&self) -> &TechnologyRegistry {
        &self.registry
    }

    fn profile(&self, technology: Technology) -> Result<&TechnologyProfile, EngineError> {
        Ok(self.registry.get(technology)?)
    }

    /// Link budget at a given distance.
    pub fn link_budget(
        &self,
        radio: &RadioSettings,
        distance_km: f64,
    ) -> Result<LinkBudgetResult, EngineError> {
        radio.validate()?;
        let profile = self.profile(radio.technology)?;
        Ok(compute_link_budget(
            profile,
            radio.frequency_mhz,
            distance_km,
            radio.geometry.hb_m,
            radio.geometry.hm_m,
            radio.environment,
        )?)
    }

    /// Maximum feasible radius search.
    pub fn max_radius(&self, radio: &RadioSettings) -> Result<RadiusSearch, EngineError> {
        radio.validate()?;
        let profile = self.profile(radio.technology)?;
        Ok(self.solver.search(
            profile,
            radio.frequency_mhz,
            radio.environment,
            radio.geometry.hb_m,
            radio.geometry.hm_m,
        )?)
    }

    /// Dimension a network for a request.
    pub fn dimension(&self, request: &DimensioningRequest) -> Result<DimensioningResult, EngineError> {
        request.validate()?;

        let radio = &request.radio;
        let technology = radio.technology;
        let profile = self.profile(technology)?;

        let search = self.max_radius(radio)?;
        let max_radius_km = search.radius_km;

        let traffic_factor = (request.traffic_demand_pct / 100.0).min(1.0);
        let qos_factor = request.qos_pct / 100.0;
        let optimal_radius_km = max_radius_km * (1.0 - TRAFFIC_RADIUS_REDUCTION * traffic_factor) * qos_factor;

        let cell_area_km2 = HEXAGON_AREA_FACTOR * optimal_radius_km * optimal_radius_km;
        if !(cell_area_km2.is_finite() && cell_area_km2 > 0.0) {
            return Err(EngineError::DegenerateCell { optimal_radius_km });
        }
        let cell_count = (request.surface_total_km2 / cell_area_km2).ceil() as u64;

        let capacity = technology.cell_capacity(request.traffic_demand_pct);
        let total_capacity = cell_count as f64 * capacity.capacity_per_cell;

        let cluster_size = technology.cluster_size(request.qos_pct);
        let reuse_distance_km = optimal_radius_km * f64::from(3 * cluster_size).sqrt();

        let qos_score = (request.qos_pct * (1.0 - traffic_factor * TRAFFIC_RADIUS_REDUCTION)).min(100.0);

        let costs = estimate_costs(profile, cell_count, capacity.channels_per_cell);

        let link_budget = compute_link_budget(
            profile,
            radio.frequency_mhz,
            optimal_radius_km,
            radio.geometry.hb_m,
            radio.geometry.hm_m,
            radio.environment,
        )?;

        tracing::info!(
            technology = %technology,
            frequency_mhz = radio.frequency_mhz,
            environment = %radio.environment,
            max_radius_km,
            optimal_radius_km,
            cell_count,
            cluster_size,
            "dimensioning complete"
        );

        Ok(DimensioningResult {
            technology,
            technology_name: profile.name.clone(),
            frequency_mhz: radio.frequency_mhz,
            environment: radio.environment,
            propagation_model: PathLossModel::for_environment(radio.environment).to_string(),
            max_radius_km,
            max_radius_confirmed: search.lower_bracket_confirmed,
            max_radius_capped: search.upper_bracket_reached,
            optimal_radius_km,
            cell_area_km2,
            cell_count,
            cluster_size,
            reuse_distance_km,
            capacity_per_cell: capacity.capacity_per_cell,
            total_capacity,
            channels_per_cell: capacity.channels_per_cell,
            link_budget,
            qos_score,
            costs,
        })
    }
}

fn estimate_costs(profile: &TechnologyProfile, cell_count: u64, channels_per_cell: u32) -> CostEstimate {
    let cells = cell_count as f64;
    let infrastructure_eur = cells * profile.unit_costs.per_bts_eur;
    let equipment_eur = if profile.technology.bills_per_channel() {
        cells * f64::from(channels_per_cell) * profile.unit_costs.per_channel_eur
    } else {
        cells * profile.unit_costs.per_channel_eur
    };
    CostEstimate {
        infrastructure_eur,
        equipment_eur,
        total_eur: infrastructure_eur + equipment_eur,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use celldim_link::{max_feasible_radius, LinkGeometry};
    use celldim_model::ProfileOverride;
    use std::collections::BTreeMap;

    fn engine() -> DimensioningEngine {
        DimensioningEngine::new(Arc::new(TechnologyRegistry::builtin()))
    }

    fn reference_request() -> DimensioningRequest {
        DimensioningRequest::new(100.0, Technology::Lte, 1800.0, Environment::Urban, 50.0, 90.0)
    }

    #[test]
    fn test_hexagon_factor() {
        assert!((HEXAGON_AREA_FACTOR - 3.0 * 3f64.sqrt() / 2.0).abs() < 1e-15);
    }

    #[test]
    fn test_reference_scenario() {
        let engine = engine();
        let result = engine.dimension(&reference_request()).unwrap();

        let profile = engine.registry().get(Technology::Lte).unwrap();
        let max = max_feasible_radius(profile, 1800.0, Environment::Urban, 30.0, 1.5).unwrap();
        assert_eq!(result.max_radius_km, max);
        assert!((result.max_radius_km - 9.67).abs() < 0.05);

        let expected_optimal = max * (1.0 - 0.3 * 0.5) * 0.9;
        assert!((result.optimal_radius_km - expected_optimal).abs() < 1e-12);
        assert_eq!(result.cluster_size, 1);
        assert!((result.reuse_distance_km - result.optimal_radius_km * 3f64.sqrt()).abs() < 1e-12);
        assert_eq!(result.capacity_per_cell, 100.0);
        assert_eq!(result.channels_per_cell, 100);
        assert_eq!(result.total_capacity, result.cell_count as f64 * 100.0);
        assert!((result.qos_score - 76.5).abs() < 1e-12);
        assert_eq!(result.technology_name, "LTE (4G)");
        assert_eq!(result.propagation_model, "Okumura-Hata");
        assert!(result.max_radius_confirmed);
        assert!(!result.max_radius_capped);

        // The planned radius is inside the feasible region
        assert!(result.link_budget.feasible);
    }

    #[test]
    fn test_repeatable() {
        let engine = engine();
        let first = engine.dimension(&reference_request()).unwrap();
        let second = engine.dimension(&reference_request()).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_covering_and_radius_order() {
        let engine = engine();
        for technology in Technology::ALL {
            for environment in Environment::ALL {
                for &(traffic, qos) in &[(0.0, 100.0), (50.0, 90.0), (100.0, 40.0), (75.0, 5.0)] {
                    let request = DimensioningRequest::new(
                        250.0, technology, 900.0, environment, traffic, qos,
                    );

                    let r = engine.dimension(&request).unwrap();
                    assert!(r.optimal_radius_km <= r.max_radius_km);
                    assert!(
                        r.cell_count as f64 * r.cell_area_km2 >= 250.0 * (1.0 - 1e-12),
                        "{} cells of {} km² do not cover 250 km²",
                        r.cell_count, r.cell_area_km2
                    );
                    assert!(r.qos_score <= qos);
                }
            }
        }
    }

    #[test]
    fn test_gsm_cluster_follows_qos() {
        let engine = engine();
        let high = DimensioningRequest::new(50.0, Technology::Gsm, 900.0, Environment::Urban, 40.0, 85.0);
        let low = DimensioningRequest { qos_pct: 50.0, ..high };

        let high = engine.dimension(&high).unwrap();
        let low = engine.dimension(&low).unwrap();
        assert_eq!(high.cluster_size, 7);
        assert_eq!(low.cluster_size, 4);
        assert!((high.reuse_distance_km - high.optimal_radius_km * 21f64.sqrt()).abs() < 1e-12);
        assert_eq!(high.channels_per_cell, 4);
        assert!((high.capacity_per_cell - 3.6).abs() < 1e-12);
    }

    #[test]
    fn test_costs_hidden_but_reachable() {
        let engine = engine();
        let gsm = engine
            .dimension(&DimensioningRequest::new(50.0, Technology::Gsm, 900.0, Environment::Rural, 40.0, 85.0))
            .unwrap();
        let cells = gsm.cell_count as f64;
        assert_eq!(gsm.costs().infrastructure_eur, cells * 50_000.0);
        assert_eq!(gsm.costs().equipment_eur, cells * 4.0 * 2_000.0);
        assert_eq!(gsm.costs().total_eur, gsm.costs().infrastructure_eur + gsm.costs().equipment_eur);

        let lte = engine.dimension(&reference_request()).unwrap();
        assert_eq!(lte.costs().equipment_eur, lte.cell_count as f64 * 8_000.0);

        let json = serde_json::to_string(&lte).unwrap();
        assert!(!json.contains("cost"));
        assert!(!json.contains("eur"));
        assert!(json.contains("\"link_budget\""));
    }

    #[test]
    fn test_free_space_saturates() {
        let result = engine()
            .dimension(&DimensioningRequest::new(
                1000.0,
                Technology::Lte,
                1800.0,
                Environment::FreeSpace,
                0.0,
                100.0,
            ))
            .unwrap();
        assert!(result.max_radius_capped);
        assert!(50.0 - result.max_radius_km <= 0.01);
        assert_eq!(result.optimal_radius_km, result.max_radius_km);
        assert_eq!(result.propagation_model, "Free Space");
    }

    #[test]
    fn test_zero_qos_is_degenerate() {
        let request = DimensioningRequest { qos_pct: 0.0, ..reference_request() };
        assert!(matches!(
            engine().dimension(&request),
            Err(EngineError::DegenerateCell { optimal_radius_km }) if optimal_radius_km == 0.0
        ));
    }

    #[test]
    fn test_invalid_request_rejected() {
        let request = DimensioningRequest { surface_total_km2: -1.0, ..reference_request() };
        assert!(matches!(engine().dimension(&request), Err(EngineError::Validation(_))));

        let request = reference_request().with_geometry(LinkGeometry::new(0.0, 1.5));
        assert!(matches!(engine().dimension(&request), Err(EngineError::Validation(_))));
    }

    #[test]
    fn test_missing_technology() {
        let registry = TechnologyRegistry::from_profiles(
            celldim_model::get_profile_def(Technology::Gsm).map(|d| d.to_profile()),
        );
        let engine = DimensioningEngine::new(Arc::new(registry));
        assert!(matches!(
            engine.dimension(&reference_request()),
            Err(EngineError::Model(celldim_model::ModelError::MissingProfile(Technology::Lte)))
        ));
    }

    #[test]
    fn test_overridden_registry() {
        let mut overrides = BTreeMap::new();
        overrides.insert(
            Technology::Lte,
            ProfileOverride {
                tx_power_max_dbm: Some(36.0),
                ..Default::default()
            },
        );
        let weaker = TechnologyRegistry::builtin().with_overrides(&overrides).unwrap();

        let base = engine().dimension(&reference_request()).unwrap();
        let custom = DimensioningEngine::new(Arc::new(weaker))
            .dimension(&reference_request())
            .unwrap();
        assert!(custom.max_radius_km < base.max_radius_km);
        assert!(custom.cell_count >= base.cell_count);
    }

    #[test]
    fn test_link_budget_and_radius_helpers() {
        let engine = engine();
        let radio = reference_request().radio;

        let search = engine.max_radius(&radio).unwrap();
        assert_eq!(search.iterations, 13);

        let at_edge = engine.link_budget(&radio, search.radius_km).unwrap();
        assert!(at_edge.feasible);
        let beyond = engine.link_budget(&radio, search.radius_km + 0.02).unwrap();
        assert!(!beyond.feasible);

        assert!(matches!(
            engine.link_budget(&radio, 0.0),
            Err(EngineError::Link(_))
        ));
    }

    #[test]
    fn test_engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DimensioningEngine>();

        let engine = Arc::new(engine());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || engine.dimension(&reference_request()).unwrap())
            })
            .collect();
        let results: Vec<DimensioningResult> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.windows(2).all(|w| w[0] == w[1]));
    }
}
