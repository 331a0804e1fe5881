//! Pattern metrics used to compare land-cover maps.
//!
//! - **Composition index**: mean cell value, in [−1, 1].
//! - **Texture index**: mean local disagreement, in [0, 1].
//!
//! Texture normalization: a cell with value `v` and present neighbors
//! `n_1..n_k` scores `|v − mean(n)| / 2`. The largest possible gap between a
//! ±1 value and a mean of ±1 values is 2, so a strict checkerboard scores
//! exactly 1 and a uniform lattice exactly 0. A cell with no neighbors
//! (only possible on a 1×1 lattice) scores 0. Edges are open, so border
//! cells average over 2 or 3 neighbors.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::lattice::{Lattice, LatticeStack};

/// Texture index of a strict checkerboard.
pub const TEXTURE_MAX: f64 = 1.0;

/// Composition and texture of one layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricVector {
    pub composition: f64,
    pub texture: f64,
}

impl MetricVector {
    pub fn new(composition: f64, texture: f64) -> Self {
        Self {
            composition,
            texture,
        }
    }

    /// Reduce a lattice to its metric vector.
    pub fn of(lattice: &Lattice) -> Self {
        Self {
            composition: composition_index(lattice),
            texture: texture_index(lattice),
        }
    }

    /// Metric vector of every layer, in layer order.
    pub fn of_stack(stack: &LatticeStack) -> Vec<Self> {
        per_layer(stack, Self::of)
    }

    pub fn as_array(&self) -> [f64; 2] {
        [self.composition, self.texture]
    }
}

/// Mean cell value.
pub fn composition_index(lattice: &Lattice) -> f64 {
    lattice.sum() as f64 / lattice.len() as f64
}

/// Local disagreement score of one cell, in [0, 1].
pub fn cell_texture(v: i8, neighbors: &[i8]) -> f64 {
    if neighbors.is_empty() {
        return 0.0;
    }
    let mean = neighbors.iter().map(|&n| n as f64).sum::<f64>() / neighbors.len() as f64;
    (v as f64 - mean).abs() / 2.0
}

/// Mean local disagreement over all cells.
pub fn texture_index(lattice: &Lattice) -> f64 {
    // Hot path of every objective evaluation: walks the raw cells with the
    // same open-boundary rule as `Lattice::neighbors`, without per-cell
    // bounds checks or allocation.
    let (rows, cols) = lattice.shape();
    let values = lattice.values();
    let mut total = 0.0;
    for r in 0..rows {
        for c in 0..cols {
            let v = values[r * cols + c];
            let mut sum = 0i32;
            let mut k = 0u32;
            if r > 0 {
                sum += values[(r - 1) * cols + c] as i32;
                k += 1;
            }
            if c > 0 {
                sum += values[r * cols + c - 1] as i32;
                k += 1;
            }
            if r + 1 < rows {
                sum += values[(r + 1) * cols + c] as i32;
                k += 1;
            }
            if c + 1 < cols {
                sum += values[r * cols + c + 1] as i32;
                k += 1;
            }
            if k > 0 {
                total += (v as f64 - sum as f64 / k as f64).abs() / 2.0;
            }
        }
    }
    total / lattice.len() as f64
}

fn per_layer<T, F>(stack: &LatticeStack, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(&Lattice) -> T + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        stack.layers().par_iter().map(f).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        stack.layers().iter().map(f).collect()
    }
}

impl LatticeStack {
    /// Composition index of every layer.
    pub fn composition_indices(&self) -> Vec<f64> {
        per_layer(self, composition_index)
    }

    /// Texture index of every layer.
    pub fn texture_indices(&self) -> Vec<f64> {
        per_layer(self, texture_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lattice(rows: usize, cols: usize, values: &[i8]) -> Lattice {
        Lattice::from_values(rows, cols, values.to_vec()).unwrap()
    }

    /// Texture computed cell by cell through the lattice neighbor API.
    fn texture_via_neighbors(lat: &Lattice) -> f64 {
        let mut total = 0.0;
        for r in 0..lat.rows() {
            for c in 0..lat.cols() {
                total += cell_texture(lat.get(r, c).unwrap(), &lat.neighbors(r, c).unwrap());
            }
        }
        total / lat.len() as f64
    }

    #[test]
    fn test_composition_uniform() {
        assert_eq!(composition_index(&Lattice::filled(4, 5, 1).unwrap()), 1.0);
        assert_eq!(composition_index(&Lattice::filled(4, 5, -1).unwrap()), -1.0);
    }

    #[test]
    fn test_composition_signed_imbalance() {
        // 3 positive, 1 negative → (3 − 1) / 4
        assert_eq!(composition_index(&lattice(2, 2, &[1, 1, 1, -1])), 0.5);
        assert_eq!(composition_index(&Lattice::checkerboard(4, 4).unwrap()), 0.0);
        // 5x5 checkerboard: 13 positive, 12 negative
        assert!((composition_index(&Lattice::checkerboard(5, 5).unwrap()) - 1.0 / 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_texture_uniform_is_zero() {
        assert_eq!(texture_index(&Lattice::filled(6, 3, 1).unwrap()), 0.0);
        assert_eq!(texture_index(&Lattice::filled(1, 1, -1).unwrap()), 0.0);
    }

    #[test]
    fn test_texture_checkerboard_is_max() {
        for (r, c) in [(2, 2), (4, 4), (5, 7), (1, 6)] {
            let t = texture_index(&Lattice::checkerboard(r, c).unwrap());
            assert!((t - TEXTURE_MAX).abs() < 1e-12, "{}x{} checkerboard texture {}", r, c, t);
        }
    }

    #[test]
    fn test_texture_single_defect() {
        // 3x3 all +1 with the center flipped.
        // center: |−1 − 1| / 2 = 1; each edge-midpoint cell (3 neighbors, one −1):
        // mean = 1/3 → |1 − 1/3| / 2 = 1/3; corners untouched.
        let mut lat = Lattice::filled(3, 3, 1).unwrap();
        lat.set(1, 1, -1).unwrap();
        let expected = (1.0 + 4.0 / 3.0) / 9.0;
        assert!((texture_index(&lat) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_texture_matches_neighbor_api() {
        let lat = lattice(3, 4, &[1, -1, -1, 1, 1, 1, -1, -1, -1, 1, 1, 1]);
        assert!((texture_index(&lat) - texture_via_neighbors(&lat)).abs() < 1e-12);
    }

    #[test]
    fn test_texture_in_unit_interval() {
        let lat = lattice(3, 4, &[1, -1, -1, 1, 1, 1, -1, -1, -1, 1, 1, 1]);
        let t = texture_index(&lat);
        assert!((0.0..=1.0).contains(&t));
    }

    #[test]
    fn test_stack_metrics_per_layer() {
        let stack = LatticeStack::from_layers(vec![
            Lattice::filled(4, 4, 1).unwrap(),
            Lattice::checkerboard(4, 4).unwrap(),
            Lattice::filled(4, 4, -1).unwrap(),
        ])
        .unwrap();
        assert_eq!(stack.composition_indices(), vec![1.0, 0.0, -1.0]);
        let tex = stack.texture_indices();
        assert_eq!(tex.len(), 3);
        assert_eq!(tex[0], 0.0);
        assert!((tex[1] - 1.0).abs() < 1e-12);
        assert_eq!(tex[2], 0.0);

        let sequential: Vec<f64> = stack.layers().iter().map(texture_index).collect();
        assert_eq!(tex, sequential);

        let vectors = MetricVector::of_stack(&stack);
        assert_eq!(vectors[0], MetricVector::new(1.0, 0.0));
        assert_eq!(vectors[2].composition, -1.0);
    }
}
