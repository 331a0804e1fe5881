//! Simulation driver: a single-site Glauber Markov chain over lattice states.
//!
//! Each attempt draws a row, then a column, uniformly at random and applies
//! the flip rule to that cell. Every decision depends on the state left by
//! the previous one, so a run is strictly sequential. Independent runs own
//! their own lattice copy and their own `StdRng`, which is what lets
//! [`simulate_ensemble`] fan them out across threads.

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::Result;
use crate::field::SimParams;
use crate::glauber::try_flip;
use crate::lattice::Lattice;

/// Parameters plus the seed of the run's random source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    pub params: SimParams,
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            params: SimParams::default(),
            seed: 42,
        }
    }
}

/// What happened during one flip attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    pub row: usize,
    pub col: usize,
    pub flipped: bool,
}

/// Stepwise driver over a private copy of the initial lattice.
///
/// Hosts that need early termination call [`Simulation::step`] themselves
/// or use [`Simulation::run_until`]; the state between attempts is always
/// a valid lattice.
#[derive(Debug, Clone)]
pub struct Simulation<R: Rng = StdRng> {
    lattice: Lattice,
    params: SimParams,
    rng: R,
    attempts: u64,
    flips: u64,
}

impl Simulation<StdRng> {
    /// Validate the configuration and seed a fresh `StdRng`.
    pub fn new(initial: &Lattice, config: &SimConfig) -> Result<Self> {
        Self::with_rng(initial, &config.params, StdRng::seed_from_u64(config.seed))
    }
}

impl<R: Rng> Simulation<R> {
    /// Validate the parameters and take ownership of a caller-built random source.
    pub fn with_rng(initial: &Lattice, params: &SimParams, rng: R) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            lattice: initial.clone(),
            params: *params,
            rng,
            attempts: 0,
            flips: 0,
        })
    }

    /// Perform one flip attempt. `None` once `iter` attempts have been made.
    pub fn step(&mut self) -> Option<Result<StepOutcome>> {
        if self.is_finished() {
            return None;
        }
        let row = self.rng.gen_range(0..self.lattice.rows());
        let col = self.rng.gen_range(0..self.lattice.cols());
        let flipped = match try_flip(&mut self.lattice, row, col, &self.params, &mut self.rng) {
            Ok(f) => f,
            Err(e) => return Some(Err(e)),
        };
        self.attempts += 1;
        if flipped {
            self.flips += 1;
        }
        Some(Ok(StepOutcome { row, col, flipped }))
    }

    /// Run all remaining attempts.
    pub fn run(&mut self) -> Result<()> {
        while let Some(outcome) = self.step() {
            outcome?;
        }
        debug!(
            "simulation finished: {} attempts, {} flips on {}x{} lattice",
            self.attempts,
            self.flips,
            self.lattice.rows(),
            self.lattice.cols()
        );
        Ok(())
    }

    /// Run until all attempts are made or `stop` returns true after an attempt.
    ///
    /// Returns true if the run was stopped early.
    pub fn run_until<F>(&mut self, mut stop: F) -> Result<bool>
    where
        F: FnMut(&Lattice, &StepOutcome) -> bool,
    {
        while let Some(outcome) = self.step() {
            let outcome = outcome?;
            if stop(&self.lattice, &outcome) {
                debug!("simulation stopped early after {} attempts", self.attempts);
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn is_finished(&self) -> bool {
        self.attempts >= self.params.iter
    }

    /// Flip attempts made so far.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Accepted flips so far.
    pub fn flips(&self) -> u64 {
        self.flips
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    /// Current lattice state.
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn into_lattice(self) -> Lattice {
        self.lattice
    }
}

/// Run the chain from `initial` with a seeded `StdRng`.
///
/// The caller's lattice is never modified. `iter = 0` returns an equal copy.
pub fn simulate(initial: &Lattice, config: &SimConfig) -> Result<Lattice> {
    let mut sim = Simulation::new(initial, config)?;
    sim.run()?;
    Ok(sim.into_lattice())
}

/// Run the chain from `initial` drawing from a caller-owned random source.
pub fn simulate_with_rng<R: Rng>(
    initial: &Lattice,
    params: &SimParams,
    rng: &mut R,
) -> Result<Lattice> {
    let mut sim = Simulation::with_rng(initial, params, rng)?;
    sim.run()?;
    Ok(sim.into_lattice())
}

/// Seeds used by [`simulate_ensemble`]: `seed, seed + 1, ...` (wrapping).
pub fn ensemble_seeds(seed: u64, runs: usize) -> Vec<u64> {
    (0..runs as u64).map(|i| seed.wrapping_add(i)).collect()
}

/// `runs` independent simulations from the same start, one per derived seed.
///
/// Output order follows the seed order, so results do not depend on
/// whether the `parallel` feature is enabled.
#[cfg(feature = "parallel")]
pub fn simulate_ensemble(initial: &Lattice, config: &SimConfig, runs: usize) -> Result<Vec<Lattice>> {
    config.params.validate()?;
    ensemble_seeds(config.seed, runs)
        .into_par_iter()
        .map(|seed| simulate(initial, &SimConfig { seed, ..*config }))
        .collect()
}

/// `runs` independent simulations from the same start, one per derived seed.
#[cfg(not(feature = "parallel"))]
pub fn simulate_ensemble(initial: &Lattice, config: &SimConfig, runs: usize) -> Result<Vec<Lattice>> {
    simulate_ensemble_sequential(initial, config, runs)
}

/// Same runs as [`simulate_ensemble`], always on the calling thread.
pub fn simulate_ensemble_sequential(
    initial: &Lattice,
    config: &SimConfig,
    runs: usize,
) -> Result<Vec<Lattice>> {
    config.params.validate()?;
    ensemble_seeds(config.seed, runs)
        .into_iter()
        .map(|seed| simulate(initial, &SimConfig { seed, ..*config }))
        .collect()
}
