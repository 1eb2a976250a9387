// src/ransac.rs

//! # Vision Drift Estimation Module
//!
//! This module provides the time windowed sample history and the robust
//! linear fit used to estimate how far the dead-reckoned position has
//! drifted from the vision measurements.

pub mod fit;
pub use fit::*;
pub mod window;
pub use window::*;
