//! Local field: the combined pull of external pressure, neighbor coupling
//! and inertia on a single cell.
//!
//! ```text
//! h = B + J · Σ n_i − inertia_term
//! ```
//!
//! The inertia term applies only to a −1 cell whose present neighbors are
//! all −1 (vacuously so for an isolated 1×1 lattice). Subtracting it lowers
//! `h`, which can only reduce the probability of a −1 → +1 flip.

use crate::error::{IsingError, Result};
use crate::lattice::Lattice;

/// Parameters of one simulation run. Immutable for the duration of the run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimParams {
    /// External pressure. Positive favors +1, negative favors −1.
    pub b: f64,
    /// Neighbor coupling strength (≥ 0).
    pub j: f64,
    /// Number of flip attempts.
    pub iter: u64,
    /// Damping against −1 → +1 flips in uniform −1 neighborhoods (≥ 0).
    pub inertia: f64,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            b: 0.0,
            j: 1.0,
            iter: 1000,
            inertia: 0.0,
        }
    }
}

impl SimParams {
    /// Reject non-finite values, negative coupling and negative inertia.
    pub fn validate(&self) -> Result<()> {
        if !self.b.is_finite() {
            return Err(IsingError::invalid("b", format!("must be finite, got {}", self.b)));
        }
        if !self.j.is_finite() || self.j < 0.0 {
            return Err(IsingError::invalid(
                "j",
                format!("must be finite and >= 0, got {}", self.j),
            ));
        }
        if !self.inertia.is_finite() || self.inertia < 0.0 {
            return Err(IsingError::invalid(
                "inertia",
                format!("must be finite and >= 0, got {}", self.inertia),
            ));
        }
        Ok(())
    }
}

/// Inertia contribution for a cell of value `v` with the given neighbors.
pub fn inertia_term(v: i8, neighbors: &[i8], inertia: f64) -> f64 {
    if v < 0 && neighbors.iter().all(|&n| n < 0) {
        inertia
    } else {
        0.0
    }
}

/// Local field from a cell value and its present neighbors.
pub fn field_from_neighbors(v: i8, neighbors: &[i8], params: &SimParams) -> f64 {
    let coupling: i32 = neighbors.iter().map(|&n| n as i32).sum();
    params.b + params.j * coupling as f64 - inertia_term(v, neighbors, params.inertia)
}

/// Local field of cell (row, col) on the current lattice.
pub fn local_field(lattice: &Lattice, row: usize, col: usize, params: &SimParams) -> Result<f64> {
    let v = lattice.get(row, col)?;
    let neighbors = lattice.neighbors(row, col)?;
    Ok(field_from_neighbors(v, &neighbors, params))
}
