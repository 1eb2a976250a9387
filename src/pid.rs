// src/pid.rs

//! # PID Control Module
//!
//! This module provides compute callbacks and control data structures
//! that plug navigation loops into [`piddiy::PidController`].

pub mod heading;
pub use heading::*;
pub mod proportional;
pub use proportional::*;
