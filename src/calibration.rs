//! Calibration of `(B, J)` against an observed pair of maps.
//!
//! The minimizer is a pluggable strategy behind [`Minimizer`]; it only
//! ever sees an [`Objective`] (parameter vector in, scalar out) and box
//! bounds. The objective is stochastic in its parameters and has no usable
//! gradient, so the bundled strategy is a simulated-annealing search.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{IsingError, Result};
use crate::lattice::Lattice;
use crate::objective::{CalibrationObjective, Objective};

/// Box constraints `lower[i] <= x[i] <= upper[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl Bounds {
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Result<Self> {
        let bounds = Self { lower, upper };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> Result<()> {
        if self.lower.len() != self.upper.len() {
            return Err(IsingError::DimensionMismatch {
                expected: format!("{} upper bounds", self.lower.len()),
                found: format!("{} upper bounds", self.upper.len()),
            });
        }
        for (i, (&lo, &hi)) in self.lower.iter().zip(&self.upper).enumerate() {
            if !lo.is_finite() || !hi.is_finite() || lo > hi {
                return Err(IsingError::invalid(
                    "bounds",
                    format!("dimension {}: need finite lower <= upper, got [{}, {}]", i, lo, hi),
                ));
            }
            if !(hi - lo).is_finite() {
                return Err(IsingError::invalid(
                    "bounds",
                    format!("dimension {}: width of [{}, {}] overflows", i, lo, hi),
                ));
            }
        }
        Ok(())
    }

    /// Number of parameters.
    pub fn dim(&self) -> usize {
        self.lower.len()
    }

    pub fn contains(&self, x: &[f64]) -> bool {
        x.len() == self.dim()
            && x
                .iter()
                .zip(self.lower.iter().zip(&self.upper))
                .all(|(&v, (&lo, &hi))| v >= lo && v <= hi)
    }

    /// Project `x` into the box.
    pub fn clamp(&self, x: &[f64]) -> Vec<f64> {
        x.iter()
            .zip(self.lower.iter().zip(&self.upper))
            .map(|(&v, (&lo, &hi))| v.clamp(lo, hi))
            .collect()
    }

    fn check_point(&self, x: &[f64]) -> Result<()> {
        if x.len() != self.dim() {
            return Err(IsingError::DimensionMismatch {
                expected: format!("{} parameters", self.dim()),
                found: format!("{} parameters", x.len()),
            });
        }
        Ok(())
    }
}

/// Best point found by a minimizer.
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    pub params: Vec<f64>,
    pub value: f64,
    /// Objective evaluations, including the starting point.
    pub evaluations: usize,
    /// Proposals accepted as the new current point.
    pub accepted: usize,
}

/// A derivative-free minimization strategy.
pub trait Minimizer {
    fn minimize(&self, objective: &dyn Objective, start: &[f64], bounds: &Bounds) -> Result<Minimum>;
}

/// Simulated-annealing settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnealingConfig {
    /// Starting temperature (> 0).
    pub initial_temperature: f64,
    /// Geometric cooling factor per iteration, in (0, 1].
    pub cooling_rate: f64,
    /// Proposals to make after the starting point.
    pub max_iterations: usize,
    /// Proposal half-width as a fraction of each bound's width at the
    /// starting temperature, in (0, 1].
    pub step_fraction: f64,
    /// Seed of the proposal/acceptance random source.
    pub seed: u64,
    /// Stop as soon as the best value is at or below this.
    pub target_value: f64,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 1.0,
            cooling_rate: 0.98,
            max_iterations: 500,
            step_fraction: 0.25,
            seed: 42,
            target_value: 0.0,
        }
    }
}

/// Smallest proposal scale relative to the starting one.
const MIN_STEP_SCALE: f64 = 1e-3;

#[derive(Debug, Clone, Default)]
pub struct SimulatedAnnealing {
    pub config: AnnealingConfig,
}

impl SimulatedAnnealing {
    pub fn new(config: AnnealingConfig) -> Result<Self> {
        let c = &config;
        if !(c.initial_temperature.is_finite() && c.initial_temperature > 0.0) {
            return Err(IsingError::invalid(
                "initial_temperature",
                format!("must be finite and > 0, got {}", c.initial_temperature),
            ));
        }
        if !(c.cooling_rate > 0.0 && c.cooling_rate <= 1.0) {
            return Err(IsingError::invalid(
                "cooling_rate",
                format!("must be in (0, 1], got {}", c.cooling_rate),
            ));
        }
        if !(c.step_fraction > 0.0 && c.step_fraction <= 1.0) {
            return Err(IsingError::invalid(
                "step_fraction",
                format!("must be in (0, 1], got {}", c.step_fraction),
            ));
        }
        Ok(Self { config })
    }

    fn propose<R: Rng>(&self, x: &[f64], bounds: &Bounds, scale: f64, rng: &mut R) -> Vec<f64> {
        let candidate: Vec<f64> = x
            .iter()
            .zip(bounds.lower.iter().zip(&bounds.upper))
            .map(|(&v, (&lo, &hi))| {
                let half_width = (hi - lo) * self.config.step_fraction * scale;
                if half_width > 0.0 {
                    v + rng.gen_range(-half_width..=half_width)
                } else {
                    v
                }
            })
            .collect();
        bounds.clamp(&candidate)
    }
}

impl Minimizer for SimulatedAnnealing {
    fn minimize(&self, objective: &dyn Objective, start: &[f64], bounds: &Bounds) -> Result<Minimum> {
        bounds.validate()?;
        bounds.check_point(start)?;
        let cfg = &self.config;
        let mut rng = StdRng::seed_from_u64(cfg.seed);

        let mut current = bounds.clamp(start);
        let mut current_value = objective.evaluate(&current)?;
        let mut best = current.clone();
        let mut best_value = current_value;
        let mut evaluations = 1;
        let mut accepted = 0;
        let mut temperature = cfg.initial_temperature;
        let log_every = (cfg.max_iterations / 10).max(1);

        for it in 0..cfg.max_iterations {
            if best_value <= cfg.target_value {
                debug!("annealing reached target {} after {} iterations", cfg.target_value, it);
                break;
            }

            let scale = (temperature / cfg.initial_temperature).sqrt().max(MIN_STEP_SCALE);
            let candidate = self.propose(&current, bounds, scale, &mut rng);
            let value = objective.evaluate(&candidate)?;
            evaluations += 1;

            let delta = value - current_value;
            if delta <= 0.0 || rng.gen::<f64>() < (-delta / temperature).exp() {
                current = candidate;
                current_value = value;
                accepted += 1;
                if current_value < best_value {
                    best = current.clone();
                    best_value = current_value;
                }
            }

            if (it + 1) % log_every == 0 {
                debug!(
                    "annealing iter {}: T = {:.3e}, current = {:.5}, best = {:.5} at {:?}",
                    it + 1,
                    temperature,
                    current_value,
                    best_value,
                    best
                );
            }
            temperature *= cfg.cooling_rate;
        }

        Ok(Minimum {
            params: best,
            value: best_value,
            evaluations,
            accepted,
        })
    }
}

/// Fixed settings of a `(B, J)` calibration.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationSettings {
    /// Flip attempts per simulated t1 → t2 transition.
    pub iter: u64,
    pub inertia: f64,
    /// Seed shared by every objective evaluation.
    pub seed: u64,
    /// Bounds on `[B, J]`.
    pub bounds: Bounds,
    /// Starting `[B, J]`.
    pub start: [f64; 2],
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            iter: 10_000,
            inertia: 0.0,
            seed: 42,
            bounds: Bounds {
                lower: vec![-2.0, 0.0],
                upper: vec![2.0, 2.0],
            },
            start: [0.0, 0.5],
        }
    }
}

/// Calibrated parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub b: f64,
    pub j: f64,
    pub objective: f64,
    pub evaluations: usize,
}

/// Find `(B, J)` such that simulating from `t1` reproduces the metrics of `t2`.
pub fn calibrate(
    t1: &Lattice,
    t2: &Lattice,
    settings: &CalibrationSettings,
    minimizer: &dyn Minimizer,
) -> Result<Calibration> {
    if settings.bounds.dim() != 2 {
        return Err(IsingError::DimensionMismatch {
            expected: "bounds on [B, J]".to_string(),
            found: format!("{} dimensions", settings.bounds.dim()),
        });
    }
    let objective = CalibrationObjective::new(t1, t2, settings.iter, settings.inertia, settings.seed)?;
    let min = minimizer.minimize(&objective, &settings.start, &settings.bounds)?;
    let (b, j) = match min.params.as_slice() {
        [b, j] => (*b, *j),
        other => {
            return Err(IsingError::DimensionMismatch {
                expected: "2 parameters".to_string(),
                found: format!("{} parameters", other.len()),
            })
        }
    };
    info!(
        "calibrated B = {:.4}, J = {:.4} (objective {:.5}, {} evaluations)",
        b, j, min.value, min.evaluations
    );
    Ok(Calibration {
        b,
        j,
        objective: min.value,
        evaluations: min.evaluations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quadratic(p: &[f64]) -> Result<f64> {
        Ok((p[0] - 1.0).powi(2) + (p[1] + 2.0).powi(2))
    }

    fn square_bounds() -> Bounds {
        Bounds::new(vec![-5.0, -5.0], vec![5.0, 5.0]).unwrap()
    }

    #[test]
    fn test_bounds_validation() {
        assert!(Bounds::new(vec![0.0], vec![1.0, 2.0]).is_err());
        assert!(Bounds::new(vec![1.0], vec![0.0]).is_err());
        assert!(Bounds::new(vec![f64::NAN], vec![0.0]).is_err());
        assert!(Bounds::new(vec![0.5], vec![0.5]).is_ok());
    }

    #[test]
    fn test_bounds_with_overflowing_width_rejected() {
        let err = Bounds::new(vec![-1e308, 0.0], vec![1e308, 1.0]).unwrap_err();
        assert!(matches!(err, IsingError::InvalidParameter { .. }));
        assert!(Bounds::new(vec![-1e307, 0.0], vec![1e307, 1.0]).is_ok());

        // Bounds built by hand still go through validation in `minimize`.
        let wide = Bounds { lower: vec![-1e308, 0.0], upper: vec![1e308, 1.0] };
        let err = SimulatedAnnealing::default()
            .minimize(&quadratic, &[0.0, 0.5], &wide)
            .unwrap_err();
        assert!(matches!(err, IsingError::InvalidParameter { .. }));
    }

    #[test]
    fn test_bounds_clamp_contains() {
        let b = square_bounds();
        assert_eq!(b.clamp(&[-9.0, 2.0]), vec![-5.0, 2.0]);
        assert!(b.contains(&[0.0, 5.0]));
        assert!(!b.contains(&[0.0, 5.1]));
        assert!(!b.contains(&[0.0]));
    }

    #[test]
    fn test_invalid_annealing_config() {
        let bad = |c: AnnealingConfig| SimulatedAnnealing::new(c).is_err();
        let base = AnnealingConfig::default();
        assert!(bad(AnnealingConfig { initial_temperature: 0.0, ..base }));
        assert!(bad(AnnealingConfig { cooling_rate: 1.5, ..base }));
        assert!(bad(AnnealingConfig { step_fraction: 0.0, ..base }));
        assert!(SimulatedAnnealing::new(base).is_ok());
    }

    #[test]
    fn test_annealing_finds_quadratic_minimum() {
        let sa = SimulatedAnnealing::new(AnnealingConfig {
            max_iterations: 3000,
            cooling_rate: 0.997,
            step_fraction: 0.1,
            target_value: f64::NEG_INFINITY,
            ..AnnealingConfig::default()
        })
        .unwrap();
        let min = sa.minimize(&quadratic, &[-4.0, 4.0], &square_bounds()).unwrap();
        assert!(min.value < 0.05, "best value {} at {:?}", min.value, min.params);
        assert!((min.params[0] - 1.0).abs() < 0.25);
        assert!((min.params[1] + 2.0).abs() < 0.25);
        assert_eq!(min.evaluations, 3001);
    }

    #[test]
    fn test_annealing_is_deterministic() {
        let sa = SimulatedAnnealing::default();
        let a = sa.minimize(&quadratic, &[0.0, 0.0], &square_bounds()).unwrap();
        let b = sa.minimize(&quadratic, &[0.0, 0.0], &square_bounds()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_annealing_respects_bounds() {
        let bounds = Bounds::new(vec![2.0, -1.0], vec![3.0, 0.0]).unwrap();
        let sa = SimulatedAnnealing::default();
        let min = sa.minimize(&quadratic, &[10.0, 10.0], &bounds).unwrap();
        assert!(bounds.contains(&min.params));
        // Constrained optimum sits on the corner (2, −1): value 1 + 1
        assert!(min.value <= 2.5);
    }

    #[test]
    fn test_annealing_stops_at_target() {
        let sa = SimulatedAnnealing::new(AnnealingConfig {
            target_value: 10.0,
            ..AnnealingConfig::default()
        })
        .unwrap();
        let min = sa.minimize(&quadratic, &[1.0, -2.0], &square_bounds()).unwrap();
        assert_eq!(min.evaluations, 1);
        assert_eq!(min.value, 0.0);
    }

    #[test]
    fn test_start_dimension_checked() {
        let sa = SimulatedAnnealing::default();
        let err = sa.minimize(&quadratic, &[0.0], &square_bounds()).unwrap_err();
        assert!(matches!(err, IsingError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_objective_errors_propagate() {
        let sa = SimulatedAnnealing::default();
        let failing = |_: &[f64]| -> Result<f64> { Err(IsingError::invalid("j", "negative")) };
        assert!(sa.minimize(&failing, &[0.0, 0.0], &square_bounds()).is_err());
    }

    #[test]
    fn test_calibrate_requires_two_bounds() {
        let lat = Lattice::filled(4, 4, 1).unwrap();
        let settings = CalibrationSettings {
            bounds: Bounds::new(vec![0.0], vec![1.0]).unwrap(),
            ..CalibrationSettings::default()
        };
        let err = calibrate(&lat, &lat, &settings, &SimulatedAnnealing::default()).unwrap_err();
        assert!(matches!(err, IsingError::DimensionMismatch { .. }));
    }
}
