//! # landcover-ising
//!
//! Kinetic Ising (Glauber dynamics) simulation of binary land-cover change,
//! with the pattern metrics and objective needed to calibrate the model
//! against an observed map.
//!
//! A land-cover map at time t1 is a rectangular lattice of ±1 cells. Each
//! flip attempt picks one cell uniformly at random and flips it with the
//! Glauber probability of its local field:
//!
//! ```text
//! h = B + J · Σ neighbors − inertia_term
//! p_flip = 1 / (1 + exp(2 · h · v))
//! ```
//!
//! `B` is the external pressure toward +1 (or −1 when negative), `J` the
//! neighbor coupling, and `inertia` a damping term against spontaneous
//! −1 → +1 flips inside uniform −1 neighborhoods.
//!
//! Calibration searches `(B, J)` so that the simulated t2 map has the same
//! composition and texture indices as the observed t2 map.
//!
//! ## Usage
//!
//! ```no_run
//! use landcover_ising::prelude::*;
//!
//! let t1 = Lattice::checkerboard(32, 32).unwrap();
//! let config = SimConfig { params: SimParams { b: 0.2, j: 0.8, iter: 50_000, inertia: 0.0 }, seed: 7 };
//! let t2 = simulate(&t1, &config).unwrap();
//! let metrics = MetricVector::of(&t2);
//! println!("composition {:.3}, texture {:.3}", metrics.composition, metrics.texture);
//! ```

pub mod error;
pub mod lattice;
pub mod field;
pub mod glauber;
pub mod simulation;
pub mod metrics;
pub mod objective;
pub mod calibration;


pub mod prelude {
    pub use crate::error::*;
    pub use crate::lattice::*;
    pub use crate::field::*;
    pub use crate::glauber::*;
    pub use crate::simulation::*;
    pub use crate::metrics::*;
    pub use crate::objective::*;
    pub use crate::calibration::*;
}
