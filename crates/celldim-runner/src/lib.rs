//! # celldim-runner library
//!
//! Dimensioning engine and the pieces the `celldim` binary is built from.
//!
//! This module re-exports the key types needed to dimension a network
//! programmatically:
//! - [`DimensioningEngine`] runs requests against an immutable registry
//! - [`DimensioningRequest`] holds validated inputs
//! - [`DimensioningResult`] is the serializable outcome
//!
//! ## Pipeline
//!
//! 1. Maximum feasible radius from the link budget (bisection)
//! 2. Radius reduced for traffic load and scaled by the QoS target
//! 3. Hexagonal cell area and the cell count covering the surface
//! 4. Per-technology capacity and reuse cluster
//! 5. Link budget at the planned radius
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use celldim_common::{Environment, Technology};
//! use celldim_model::TechnologyRegistry;
//! use celldim_runner::{DimensioningEngine, DimensioningRequest};
//!
//! let engine = DimensioningEngine::new(Arc::new(TechnologyRegistry::builtin()));
//! let request = DimensioningRequest::new(100.0, Technology::Lte, 1800.0, Environment::Urban, 50.0, 90.0);
//! let result = engine.dimension(&request).unwrap();
//! assert_eq!(result.cluster_size, 1);
//! assert!(result.optimal_radius_km <= result.max_radius_km);
//! ```

pub mod capacity;
pub mod engine;
pub mod request;

pub use capacity::{CellCapacity, TechnologyExt};
pub use engine::{CostEstimate, DimensioningEngine, DimensioningResult};
pub use request::{DimensioningRequest, RadioSettings};

use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while dimensioning.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Registry lookup failed.
    #[error("Model error: {0}")]
    Model(#[from] celldim_model::ModelError),

    /// Link budget or radius search failed.
    #[error("Link error: {0}")]
    Link(#[from] celldim_link::LinkError),

    /// Input out of range.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Planned radius collapsed so no finite cell count exists.
    #[error("Degenerate cell: optimal radius {optimal_radius_km} km gives no usable cell area (is qos_pct 0?)")]
    DegenerateCell {
        /// Planned radius in km.
        optimal_radius_km: f64,
    },
}

/// Errors surfaced by the command-line runner.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Engine error.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Model error.
    #[error("Model error: {0}")]
    Model(#[from] celldim_model::ModelError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
