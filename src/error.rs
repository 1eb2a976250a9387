// src/error.rs

//! # Navigation Errors
//!
//! The per-cycle pipeline never fails: degraded inputs only ever produce
//! saturated commands. Errors are limited to construction of the static
//! configuration and to the vision hand-off queue.

use crate::VisionMeasurement;
use thiserror::Error;

/// Errors reported by the navigation core.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum NavigationError {
    /// A gate table needs at least one gate to fly to.
    #[error("gate table is empty")]
    EmptyGateTable,

    /// The vision queue had no free slot; the measurement was not stored.
    #[error("vision link queue is full, measurement {} dropped", .0.count)]
    VisionLinkFull(VisionMeasurement),
}

/// Result type for navigation operations.
pub type NavigationResult<T> = Result<T, NavigationError>;
