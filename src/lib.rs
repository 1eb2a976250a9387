// src/lib.rs

//! # Free Flight Navigation
//!
//! A `no_std`, no-alloc outer-loop navigation pipeline for a small
//! multirotor flying a fixed course of gates. Position is dead-reckoned
//! from attitude alone, a planner sequences the gates, a cascaded
//! controller turns the plan into roll, pitch, heading and altitude
//! commands for the inner stabilizer, and sparse vision fixes are fitted
//! with RANSAC to remove the accumulated position drift.
//!
//! ```
//! use free_flight_navigation::{Attitude, AttitudeSource, MicrosClock, Navigator};
//!
//! struct Level;
//! impl AttitudeSource for Level {
//!     fn attitude(&self) -> Attitude {
//!         Attitude::default()
//!     }
//! }
//!
//! struct Clock(u32);
//! impl MicrosClock for Clock {
//!     fn micros(&self) -> u32 {
//!         self.0
//!     }
//! }
//!
//! let mut navigator = Navigator::default();
//! let output = navigator.step(&Level, &Clock(0));
//! assert_eq!(0, navigator.plan().gate_index);
//! assert!(output.theta_cmd < 0.0);
//! ```

#![no_std]
#![deny(missing_docs)]

pub mod config;
pub mod control;
pub mod corrector;
pub mod error;
pub mod estimator;
pub mod gate;
pub mod navigator;
pub mod pid;
pub mod planner;
pub mod ransac;
pub mod sources;
pub mod vision;

#[doc(inline)]
pub use config::*;
#[doc(inline)]
pub use control::*;
#[doc(inline)]
pub use corrector::*;
#[doc(inline)]
pub use error::*;
#[doc(inline)]
pub use estimator::*;
#[doc(inline)]
pub use gate::*;
#[doc(inline)]
pub use navigator::*;
#[doc(inline)]
pub use planner::*;
#[doc(inline)]
pub use sources::*;
#[doc(inline)]
pub use vision::*;

#[cfg(test)]
mod test_utils;
