//! Binary land-cover lattice with open (non-wrapping) boundaries.
//!
//! Cells hold +1 or −1 and are stored row-major as `i8`. Unlike a torus,
//! a cell on the edge simply has fewer neighbors: corner cells have 2,
//! edge cells 3 and interior cells 4. Neighbors are always reported in the
//! order top, left, bottom, right, skipping the ones that fall off the grid.

use std::fmt;

use smallvec::SmallVec;

use crate::error::{IsingError, Result};

/// Values of the present neighbors of a cell (at most 4).
pub type Neighbors = SmallVec<[i8; 4]>;

/// Check that a raw value is one of the two land-cover states.
pub fn check_state(value: i8) -> Result<i8> {
    match value {
        1 | -1 => Ok(value),
        other => Err(IsingError::invalid(
            "cell value",
            format!("must be -1 or +1, got {}", other),
        )),
    }
}

/// A rectangular grid of ±1 cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lattice {
    rows: usize,
    cols: usize,
    cells: Vec<i8>,
}

impl Lattice {
    /// Build a lattice from row-major values, rejecting anything but ±1.
    pub fn from_values(rows: usize, cols: usize, values: Vec<i8>) -> Result<Self> {
        check_shape(rows, cols)?;
        if values.len() != rows * cols {
            return Err(IsingError::DimensionMismatch {
                expected: format!("{} cells ({}x{})", rows * cols, rows, cols),
                found: format!("{} cells", values.len()),
            });
        }
        for &v in &values {
            check_state(v)?;
        }
        Ok(Self {
            rows,
            cols,
            cells: values,
        })
    }

    /// A lattice with every cell set to `value`.
    pub fn filled(rows: usize, cols: usize, value: i8) -> Result<Self> {
        check_shape(rows, cols)?;
        check_state(value)?;
        Ok(Self {
            rows,
            cols,
            cells: vec![value; rows * cols],
        })
    }

    /// A lattice whose cell (r, c) is `f(r, c)`.
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Result<Self>
    where
        F: FnMut(usize, usize) -> i8,
    {
        check_shape(rows, cols)?;
        let mut cells = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                cells.push(check_state(f(r, c))?);
            }
        }
        Ok(Self { rows, cols, cells })
    }

    /// Strict checkerboard: +1 where `row + col` is even.
    pub fn checkerboard(rows: usize, cols: usize) -> Result<Self> {
        Self::from_fn(rows, cols, |r, c| if (r + c) % 2 == 0 { 1 } else { -1 })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false: zero-sized lattices cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Raw row-major cell values (read-only).
    pub fn values(&self) -> &[i8] {
        &self.cells
    }

    fn index(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.rows || col >= self.cols {
            return Err(IsingError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(row * self.cols + col)
    }

    /// Value of cell (row, col).
    pub fn get(&self, row: usize, col: usize) -> Result<i8> {
        Ok(self.cells[self.index(row, col)?])
    }

    /// Overwrite cell (row, col) with a ±1 value.
    pub fn set(&mut self, row: usize, col: usize, value: i8) -> Result<()> {
        let idx = self.index(row, col)?;
        self.cells[idx] = check_state(value)?;
        Ok(())
    }

    /// Negate cell (row, col) and return its new value.
    pub fn flip(&mut self, row: usize, col: usize) -> Result<i8> {
        let idx = self.index(row, col)?;
        self.cells[idx] = -self.cells[idx];
        Ok(self.cells[idx])
    }

    /// Values of the present neighbors of (row, col): top, left, bottom, right.
    pub fn neighbors(&self, row: usize, col: usize) -> Result<Neighbors> {
        self.index(row, col)?;
        let mut out = Neighbors::new();
        if row > 0 {
            out.push(self.cells[(row - 1) * self.cols + col]); // top
        }
        if col > 0 {
            out.push(self.cells[row * self.cols + col - 1]); // left
        }
        if row + 1 < self.rows {
            out.push(self.cells[(row + 1) * self.cols + col]); // bottom
        }
        if col + 1 < self.cols {
            out.push(self.cells[row * self.cols + col + 1]); // right
        }
        Ok(out)
    }

    /// Sum of all cell values.
    pub fn sum(&self) -> i64 {
        self.cells.iter().map(|&v| v as i64).sum()
    }

    /// Number of +1 cells.
    pub fn count_positive(&self) -> usize {
        self.cells.iter().filter(|&&v| v > 0).count()
    }

    /// Number of cells that differ between two lattices of the same shape.
    pub fn hamming_distance(&self, other: &Lattice) -> Result<usize> {
        if self.shape() != other.shape() {
            return Err(IsingError::shape_mismatch(self.shape(), other.shape()));
        }
        Ok(self
            .cells
            .iter()
            .zip(other.cells.iter())
            .filter(|(a, b)| a != b)
            .count())
    }
}

impl fmt::Display for Lattice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.cols) {
            let line: String = row.iter().map(|&v| if v > 0 { '#' } else { '.' }).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

fn check_shape(rows: usize, cols: usize) -> Result<()> {
    if rows == 0 || cols == 0 {
        return Err(IsingError::invalid(
            "shape",
            format!("lattice must have at least one cell, got {}x{}", rows, cols),
        ));
    }
    Ok(())
}

/// Several lattices sharing one shape, e.g. the same area at several dates.
#[derive(Debug, Clone, Default)]
pub struct LatticeStack {
    layers: Vec<Lattice>,
}

impl LatticeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a stack, checking that every layer matches the first one's shape.
    pub fn from_layers(layers: Vec<Lattice>) -> Result<Self> {
        let mut stack = Self::new();
        for layer in layers {
            stack.push(layer)?;
        }
        Ok(stack)
    }

    /// Append a layer; fails if its shape differs from the existing layers.
    pub fn push(&mut self, layer: Lattice) -> Result<()> {
        if let Some(shape) = self.shape() {
            if layer.shape() != shape {
                return Err(IsingError::shape_mismatch(shape, layer.shape()));
            }
        }
        self.layers.push(layer);
        Ok(())
    }

    /// Common shape of all layers, `None` for an empty stack.
    pub fn shape(&self) -> Option<(usize, usize)> {
        self.layers.first().map(Lattice::shape)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn layers(&self) -> &[Lattice] {
        &self.layers
    }

    pub fn layer(&self, idx: usize) -> Option<&Lattice> {
        self.layers.get(idx)
    }
}
