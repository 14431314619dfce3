//! Scan of the bounding grid for non-empty z-columns inside the cutoff.

use nalgebra::{Matrix3, Vector3};

use crate::grid::{FftGrid3, XyGrid};
use crate::gvec::gvec_set::GvecSet;
use crate::gvec::ZColumn;

struct ColumnScan<'a> {
    lattice: &'a Matrix3<f64>,
    vk: &'a Vector3<f64>,
    cutoff: f64,
    grid: &'a FftGrid3,
    reduce: bool,
    columns: Vec<ZColumn>,
    visited: XyGrid<bool>,
}

impl ColumnScan<'_> {
    /// Scan the z-stick at (x, y) and record it if any member of the stick
    /// falls inside the cutoff sphere. With reduction active, the mirror
    /// stick (-x, -y) is marked as covered so only one member of each
    /// inversion pair is kept.
    fn visit(&mut self, x: i32, y: i32) {
        if *self.visited.get(x, y) {
            return;
        }
        // The (0, 0) stick of a reduced set keeps non-negative frequencies
        // only; all other sticks run over the full wrapped frequency range.
        let last_coord = if self.reduce && x == 0 && y == 0 {
            self.grid.limits(2).1 as usize
        } else {
            self.grid.size(2) - 1
        };
        let mut z = Vec::new();
        for coord in 0..=last_coord {
            let freq = self.grid.freq_by_coord(2, coord);
            let gk = self.lattice
                * (Vector3::new(f64::from(x), f64::from(y), f64::from(freq)) + self.vk);
            if gk.norm() <= self.cutoff {
                z.push(freq);
            }
        }
        if !z.is_empty() {
            self.columns.push(ZColumn::new(x, y, z));
            self.visited.set(x, y, true);
            if self.reduce && self.visited.contains(-x, -y) {
                self.visited.set(-x, -y, true);
            }
        }
    }
}

/// Enumerate the non-empty z-columns of the cutoff sphere.
///
/// Columns of `base` are replayed first in their exact order, so the derived
/// set keeps the base layout as a per-rank prefix. The remaining sticks are
/// found by a plain sweep of the grid cross-section; the (0, 0) column is
/// then moved to the front (the zero vector must receive global index 0) and
/// everything after the replayed prefix is ordered by decreasing size, which
/// feeds the greedy distributor longest-first.
pub(crate) fn find_z_columns(
    lattice: &Matrix3<f64>,
    vk: &Vector3<f64>,
    cutoff: f64,
    grid: &FftGrid3,
    reduce: bool,
    base: Option<&GvecSet>,
) -> Vec<ZColumn> {
    let mut scan = ColumnScan {
        lattice,
        vk,
        cutoff,
        grid,
        reduce,
        columns: Vec::new(),
        visited: XyGrid::new(grid, false),
    };

    if let Some(base) = base {
        for column in base.z_columns() {
            scan.visit(column.x, column.y);
        }
    }

    let (x_min, x_max) = grid.limits(0);
    let (y_min, y_max) = grid.limits(1);
    for x in x_min..=x_max {
        for y in y_min..=y_max {
            scan.visit(x, y);
        }
    }

    let mut columns = scan.columns;
    if base.is_none() {
        if let Some(origin) = columns.iter().position(|c| c.x == 0 && c.y == 0) {
            columns.swap(0, origin);
        }
    }

    let prefix = base.map_or(1, GvecSet::num_zcols);
    if prefix < columns.len() {
        columns[prefix..].sort_by(|a, b| b.z.len().cmp(&a.z.len()));
    }
    columns
}
