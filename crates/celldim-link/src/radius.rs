//! Maximum feasible cell radius search.
//!
//! The radius is found by bisection on the link budget feasibility flag.
//!
//! ## Monotonicity assumption
//!
//! Bisection only finds *the* maximum radius if feasibility is monotonically
//! non-increasing in distance (close links always close, far links eventually
//! fail). Both path loss formulas grow with distance for realistic antenna
//! heights and the environment corrections do not depend on distance, but
//! this is assumed rather than checked. If a parameter set broke it, the
//! search would still terminate and return a boundary near whichever
//! crossing it narrowed onto, which need not be the global maximum. No
//! error is raised in that case.

use crate::{compute_link_budget, LinkError};
use celldim_common::{Environment, TechnologyProfile};

/// Smallest radius considered, in km.
pub const DEFAULT_MIN_RADIUS_KM: f64 = 0.1;

/// Largest radius considered, in km.
pub const DEFAULT_MAX_RADIUS_KM: f64 = 50.0;

/// Bisection stops once the bracket is at most this wide, in km.
pub const DEFAULT_TOLERANCE_KM: f64 = 0.01;

/// Outcome of a radius search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusSearch {
    /// Lower bracket at termination, in km.
    pub radius_km: f64,
    /// Number of link budgets evaluated.
    pub iterations: u32,
    /// At least one probe was feasible. When false, `radius_km` is the
    /// untested lower bound of the interval.
    pub lower_bracket_confirmed: bool,
    /// No probe was infeasible: the link closes across the whole interval
    /// and the true maximum may lie beyond it.
    pub upper_bracket_reached: bool,
}

/// Bisection solver over a distance interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusSolver {
    /// Lower bound of the interval in km.
    pub min_km: f64,
    /// Upper bound of the interval in km.
    pub max_km: f64,
    /// Absolute tolerance in km.
    pub tolerance_km: f64,
}

impl Default for RadiusSolver {
    fn default() -> Self {
        RadiusSolver {
            min_km: DEFAULT_MIN_RADIUS_KM,
            max_km: DEFAULT_MAX_RADIUS_KM,
            tolerance_km: DEFAULT_TOLERANCE_KM,
        }
    }
}

impl RadiusSolver {
    /// Create a solver with a custom interval.
    pub fn new(min_km: f64, max_km: f64, tolerance_km: f64) -> Result<Self, LinkError> {
        let solver = RadiusSolver {
            min_km,
            max_km,
            tolerance_km,
        };
        solver.validate()?;
        Ok(solver)
    }

    fn validate(&self) -> Result<(), LinkError> {
        let finite = self.min_km.is_finite() && self.max_km.is_finite() && self.tolerance_km.is_finite();
        // The bracket must still shrink when its ends are a tolerance apart.
        let resolvable = self.tolerance_km > self.max_km * f64::EPSILON * 4.0;
        if !finite || self.min_km <= 0.0 || self.max_km <= self.min_km || !resolvable {
            return Err(LinkError::InvalidSearchInterval {
                min_km: self.min_km,
                max_km: self.max_km,
                tolerance_km: self.tolerance_km,
            });
        }
        Ok(())
    }

    /// Upper bound on the number of iterations for this interval.
    pub fn max_iterations(&self) -> u32 {
        ((self.max_km - self.min_km) / self.tolerance_km).log2().ceil().max(0.0) as u32
    }

    /// Bisect for the largest distance at which the link budget is feasible.
    ///
    /// Returns the lower bracket, the last distance confirmed feasible,
    /// never the infeasible upper bracket.
    pub fn search(
        &self,
        profile: &TechnologyProfile,
        frequency_mhz: f64,
        environment: Environment,
        hb_m: f64,
        hm_m: f64,
    ) -> Result<RadiusSearch, LinkError> {
        self.validate()?;

        let mut lo = self.min_km;
        let mut hi = self.max_km;
        let mut iterations = 0;
        let mut lower_bracket_confirmed = false;
        let mut upper_bracket_reached = true;

        while hi - lo > self.tolerance_km {
            let mid = (lo + hi) / 2.0;
            let budget = compute_link_budget(profile, frequency_mhz, mid, hb_m, hm_m, environment)?;

            if budget.feasible {
                lo = mid;
                lower_bracket_confirmed = true;
            } else {
                hi = mid;
                upper_bracket_reached = false;
            }
            iterations += 1;

            tracing::debug!(
                iteration = iterations,
                lo,
                hi,
                link_margin_db = budget.link_margin_db,
                "radius bisection"
            );
        }

        if !lower_bracket_confirmed {
            tracing::warn!(
                technology = %profile.technology,
                frequency_mhz,
                environment = %environment,
                radius_km = lo,
                "link never closes in the search interval, returning its lower bound"
            );
        }
        if upper_bracket_reached {
            tracing::warn!(
                technology = %profile.technology,
                frequency_mhz,
                environment = %environment,
                radius_km = lo,
                "link closes across the whole search interval, radius capped at its upper bound"
            );
        }

        Ok(RadiusSearch {
            radius_km: lo,
            iterations,
            lower_bracket_confirmed,
            upper_bracket_reached,
        })
    }
}

/// Maximum feasible cell radius in km with the default interval
/// (0.1 to 50 km, tolerance 0.01 km).
///
/// See the module documentation for the monotonicity assumption this relies on.
pub fn max_feasible_radius(
    profile: &TechnologyProfile,
    frequency_mhz: f64,
    environment: Environment,
    hb_m: f64,
    hm_m: f64,
) -> Result<f64, LinkError> {
    RadiusSolver::default()
        .search(profile, frequency_mhz, environment, hb_m, hm_m)
        .map(|search| search.radius_km)
}
