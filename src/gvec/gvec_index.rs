//! Forward and reverse indexing of the G-vector set.

use anyhow::Error;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::config::{MAX_ZCOLUMN_COUNT, MAX_ZCOLUMN_SIZE};
use crate::grid::{FftGrid3, XyGrid};
use crate::gvec::ZColumn;

/// One entry of the forward index: which column a global G-vector index
/// belongs to and where it sits inside the column's z-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GvecIndexEntry {
    pub column: u32,
    pub z_index: u32,
}

/// Location of a whole column in the global index, stored in the (x, y)
/// reverse table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLocation {
    /// Global index of the column's first G-vector.
    pub first_index: usize,
    /// Number of G-vectors in the column.
    pub size: usize,
    /// Column id in the rank-contiguous column order.
    pub column: usize,
}

/// Build the dense (x, y) reverse table. The capacity ceilings are the
/// contract of the packed on-wire form and of downstream consumers, so they
/// are enforced here once, before anything is stored.
pub(crate) fn build_xy_table(
    columns: &[ZColumn],
    grid: &FftGrid3,
) -> Result<XyGrid<Option<ColumnLocation>>, Error> {
    if columns.len() > MAX_ZCOLUMN_COUNT {
        return Err(Error::msg(format!(
            "too many z-columns: {} exceeds the capacity of {}",
            columns.len(),
            MAX_ZCOLUMN_COUNT
        )));
    }
    let mut table = XyGrid::new(grid, None);
    let mut first_index = 0;
    for (icol, column) in columns.iter().enumerate() {
        if column.len() >= MAX_ZCOLUMN_SIZE {
            return Err(Error::msg(format!(
                "z-column ({}, {}) holds {} entries, capacity is {}",
                column.x,
                column.y,
                column.len(),
                MAX_ZCOLUMN_SIZE
            )));
        }
        table.set(
            column.x,
            column.y,
            Some(ColumnLocation {
                first_index,
                size: column.len(),
                column: icol,
            }),
        );
        first_index += column.len();
    }
    Ok(table)
}

/// Build the forward index: one entry per G-vector, columns in their final
/// rank-contiguous order.
pub(crate) fn build_forward_index(
    columns: &[ZColumn],
    num_gvec: usize,
) -> Result<Vec<GvecIndexEntry>, Error> {
    let mut forward = Vec::with_capacity(num_gvec);
    for (icol, column) in columns.iter().enumerate() {
        for z_index in 0..column.len() {
            forward.push(GvecIndexEntry {
                column: icol as u32,
                z_index: z_index as u32,
            });
        }
    }
    if forward.len() != num_gvec {
        return Err(Error::msg(format!(
            "wrong G-vector count in the forward index: {} indexed, {} expected",
            forward.len(),
            num_gvec
        )));
    }
    Ok(forward)
}

/// Reverse lookup of a G-vector's global index.
///
/// A column's z-list can hold only non-negative frequencies, only negative
/// ones, or wrap around zero; since the list follows the FFT storage order,
/// the offset of `z` inside the column is `z - z[0]`, shifted up by the
/// column size when negative. That single formula covers all three layouts.
pub(crate) fn index_by_gvec(
    g: &Vector3<i32>,
    columns: &[ZColumn],
    table: &XyGrid<Option<ColumnLocation>>,
    reduced: bool,
    num_gvec: usize,
) -> Option<usize> {
    // A reduced set keeps no negative frequencies on the (0, 0) stick.
    if reduced && g.x == 0 && g.y == 0 && g.z < 0 {
        return None;
    }
    if !table.contains(g.x, g.y) {
        return None;
    }
    let location = (*table.get(g.x, g.y))?;
    let column = &columns[location.column];
    let z0 = g.z - column.z[0];
    let offset = if z0 >= 0 {
        z0 as usize
    } else {
        (z0 + location.size as i32) as usize
    };
    let ig = location.first_index + offset;
    assert!(
        ig < num_gvec,
        "G-vector ({}, {}, {}) resolves outside the index range",
        g.x,
        g.y,
        g.z
    );
    Some(ig)
}
