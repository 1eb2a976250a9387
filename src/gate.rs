// src/gate.rs

//! # Gate Table
//!
//! The static course the vehicle flies: an ordered, non-empty list of
//! gates, each with a position, target altitude and approach heading.

use crate::config::degrees_to_radians;
use crate::{NavigationError, NavigationResult};

/// One static waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Gate {
    /// Earth-frame x position in meters.
    pub x: f32,
    /// Earth-frame y position in meters.
    pub y: f32,
    /// Target altitude, in the altitude-hold setpoint unit.
    pub alt: f32,
    /// Approach heading in radians.
    pub psi: f32,
}

impl Gate {
    /// Creates a gate.
    pub const fn new(x: f32, y: f32, alt: f32, psi: f32) -> Self {
        Self { x, y, alt, psi }
    }
}

/// The stock square course: x, y in meters, altitude in centimeters.
pub const DEFAULT_GATES: [Gate; 4] = [
    Gate::new(4.0, 0.0, 150.0, 0.0),
    Gate::new(4.0, -2.0, 150.0, degrees_to_radians(90.0)),
    Gate::new(0.0, -2.0, 150.0, 0.0),
    Gate::new(0.0, 0.0, 150.0, 0.0),
];

/// A borrowed, non-empty, ordered sequence of gates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateTable<'a> {
    gates: &'a [Gate],
}

impl<'a> GateTable<'a> {
    /// Wraps a gate list, rejecting an empty one.
    pub fn new(gates: &'a [Gate]) -> NavigationResult<Self> {
        if gates.is_empty() {
            return Err(NavigationError::EmptyGateTable);
        }
        Ok(Self { gates })
    }

    /// Number of gates, always at least one.
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// Always `false`; present for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Index of the final gate.
    pub fn last_index(&self) -> usize {
        self.gates.len() - 1
    }

    /// Returns the gate at `index`, or `None` past the end of the course.
    pub fn get(&self, index: usize) -> Option<&Gate> {
        self.gates.get(index)
    }

    /// Returns the gate at `index`, clamped to the final gate.
    pub fn gate(&self, index: usize) -> &Gate {
        &self.gates[index.min(self.last_index())]
    }

    /// The underlying gate slice.
    pub fn as_slice(&self) -> &'a [Gate] {
        self.gates
    }
}

impl Default for GateTable<'static> {
    fn default() -> Self {
        Self {
            gates: &DEFAULT_GATES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    /// Test that an empty course is rejected.
    #[test]
    fn test_gate_table_rejects_empty() {
        let result = GateTable::new(&[]);
        assert_eq!(
            Err(NavigationError::EmptyGateTable),
            result,
            "Empty gate table should be rejected."
        );
    }

    /// Test that lookups past the end clamp to the final gate.
    #[test]
    fn test_gate_table_clamped_lookup() {
        let table = GateTable::default();
        assert_eq!(4, table.len());
        assert_eq!(3, table.last_index());
        assert_eq!(DEFAULT_GATES[3], *table.gate(17));
        assert!(table.get(4).is_none(), "There is no fifth gate.");
    }

    /// Test the stock course headings.
    #[test]
    fn test_gate_table_default_headings() {
        let table = GateTable::default();
        assert!(
            value_close(core::f32::consts::FRAC_PI_2, table.gate(1).psi),
            "Second gate should be approached at 90 degrees."
        );
    }
}
