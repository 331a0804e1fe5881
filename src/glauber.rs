//! Glauber flip rule: the single state-mutating primitive of the chain.
//!
//! A cell holding `v` under local field `h` flips with probability
//!
//! ```text
//! p = 1 / (1 + exp(2 · h · v))
//! ```
//!
//! so a field opposing the current value favors the flip and a zero field
//! gives p = 1/2. Each decision consumes exactly one uniform variate.

use rand::Rng;

use crate::error::Result;
use crate::field::{local_field, SimParams};
use crate::lattice::Lattice;

/// Glauber flip probability for a cell of value `v` under field `h`.
pub fn flip_probability(h: f64, v: i8) -> f64 {
    let x = 2.0 * h * v as f64;
    // Logistic of −x, written so exp never overflows.
    if x > 0.0 {
        let e = (-x).exp();
        e / (1.0 + e)
    } else {
        1.0 / (1.0 + x.exp())
    }
}

/// Flip (row, col) if the uniform variate `u` falls below its flip probability.
///
/// Returns whether the cell flipped.
pub fn apply_flip_rule(
    lattice: &mut Lattice,
    row: usize,
    col: usize,
    params: &SimParams,
    u: f64,
) -> Result<bool> {
    let v = lattice.get(row, col)?;
    let h = local_field(lattice, row, col, params)?;
    if u < flip_probability(h, v) {
        lattice.flip(row, col)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Draw one uniform variate from `rng` and apply the flip rule to (row, col).
pub fn try_flip<R: Rng>(
    lattice: &mut Lattice,
    row: usize,
    col: usize,
    params: &SimParams,
    rng: &mut R,
) -> Result<bool> {
    let u: f64 = rng.gen();
    apply_flip_rule(lattice, row, col, params, u)
}
