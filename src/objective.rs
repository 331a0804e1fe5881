//! Calibration objective: distance between metric vectors, and the
//! `(B, J) -> distance` adapter handed to a minimizer.
//!
//! The adapter re-runs the whole pipeline (simulate from t1, reduce to
//! metrics, compare with t2) on every evaluation. It reuses one fixed seed,
//! so the function is deterministic and candidate values are comparable.

use crate::error::{IsingError, Result};
use crate::field::SimParams;
use crate::lattice::Lattice;
use crate::metrics::MetricVector;
use crate::simulation::{simulate, SimConfig};

/// Euclidean distance between two metric vectors.
pub fn objective(target: MetricVector, candidate: MetricVector) -> f64 {
    let dc = target.composition - candidate.composition;
    let dt = target.texture - candidate.texture;
    (dc * dc + dt * dt).sqrt()
}

/// Euclidean distance over all layers of two metric sequences.
pub fn objective_stack(target: &[MetricVector], candidate: &[MetricVector]) -> Result<f64> {
    if target.len() != candidate.len() {
        return Err(IsingError::DimensionMismatch {
            expected: format!("{} layers", target.len()),
            found: format!("{} layers", candidate.len()),
        });
    }
    let sq: f64 = target
        .iter()
        .zip(candidate)
        .map(|(t, c)| objective(*t, *c).powi(2))
        .sum();
    Ok(sq.sqrt())
}

/// A scalar function of a parameter vector, as seen by a minimizer.
pub trait Objective {
    fn evaluate(&self, params: &[f64]) -> Result<f64>;
}

impl<F> Objective for F
where
    F: Fn(&[f64]) -> Result<f64>,
{
    fn evaluate(&self, params: &[f64]) -> Result<f64> {
        self(params)
    }
}

/// Distance between the t2 target and a simulation from t1 under `[B, J]`.
#[derive(Debug, Clone)]
pub struct CalibrationObjective {
    initial: Lattice,
    target: MetricVector,
    iter: u64,
    inertia: f64,
    seed: u64,
}

impl CalibrationObjective {
    /// Fails with `DimensionMismatch` if the two maps differ in shape and
    /// with `InvalidParameter` for a negative or non-finite inertia.
    pub fn new(initial: &Lattice, target: &Lattice, iter: u64, inertia: f64, seed: u64) -> Result<Self> {
        if initial.shape() != target.shape() {
            return Err(IsingError::shape_mismatch(initial.shape(), target.shape()));
        }
        SimParams { b: 0.0, j: 0.0, iter, inertia }.validate()?;
        Ok(Self {
            initial: initial.clone(),
            target: MetricVector::of(target),
            iter,
            inertia,
            seed,
        })
    }

    pub fn target(&self) -> MetricVector {
        self.target
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Simulation configuration for a candidate `(B, J)`.
    pub fn config(&self, b: f64, j: f64) -> SimConfig {
        SimConfig {
            params: SimParams {
                b,
                j,
                iter: self.iter,
                inertia: self.inertia,
            },
            seed: self.seed,
        }
    }

    /// Simulated metric vector for a candidate `(B, J)`.
    pub fn candidate_metrics(&self, b: f64, j: f64) -> Result<MetricVector> {
        let simulated = simulate(&self.initial, &self.config(b, j))?;
        Ok(MetricVector::of(&simulated))
    }
}

impl Objective for CalibrationObjective {
    fn evaluate(&self, params: &[f64]) -> Result<f64> {
        let (b, j) = match params {
            [b, j] => (*b, *j),
            _ => {
                return Err(IsingError::invalid(
                    "params",
                    format!("expected [B, J], got {} values", params.len()),
                ))
            }
        };
        Ok(objective(self.target, self.candidate_metrics(b, j)?))
    }
}
