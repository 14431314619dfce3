//! Z-column of G-vectors: fixed (x, y), varying z.

use serde::{Deserialize, Serialize};

/// One stick of G-vectors sharing (x, y). The z-coordinates are kept in the
/// FFT frequency order of the bounding grid (non-negative frequencies first,
/// then negative ones), not in numeric order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZColumn {
    /// X-coordinate, signed.
    pub x: i32,
    /// Y-coordinate, signed.
    pub y: i32,
    /// Z-coordinates of the column members, FFT frequency order.
    pub z: Vec<i32>,
}

impl ZColumn {
    pub fn new(x: i32, y: i32, z: Vec<i32>) -> Self {
        ZColumn { x, y, z }
    }

    pub fn len(&self) -> usize {
        self.z.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z.is_empty()
    }
}
