//! Integer bounding grid of the cutoff sphere and its FFT frequency order.

use anyhow::Error;
use nalgebra::{Matrix3, Vector3};

use crate::config::LATTICE_TOLERANCE;

/// Rectangular integer box guaranteed to contain every G-vector of a cutoff
/// sphere, with the wraparound frequency convention of a 3-D FFT grid:
/// along each axis, coordinates `0..n` map to the frequencies
/// `0, 1, ..., n/2, -(n-(n/2+1)), ..., -1` (positive frequencies first, then
/// negative ones in increasing order).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FftGrid3 {
    dims: [usize; 3],
}

impl FftGrid3 {
    pub fn new(dims: [usize; 3]) -> Result<Self, Error> {
        if dims.iter().any(|&n| n == 0) {
            return Err(Error::msg("FFT grid dimensions must be positive"));
        }
        Ok(FftGrid3 { dims })
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn size(&self, axis: usize) -> usize {
        self.dims[axis]
    }

    /// Inclusive frequency range along one axis.
    pub fn limits(&self, axis: usize) -> (i32, i32) {
        let n = self.dims[axis] as i32;
        (-(n - 1) / 2, n / 2)
    }

    /// Frequency stored at grid coordinate `coord` of one axis.
    pub fn freq_by_coord(&self, axis: usize, coord: usize) -> i32 {
        let n = self.dims[axis] as i32;
        debug_assert!((coord as i32) < n);
        let c = coord as i32;
        if c <= n / 2 {
            c
        } else {
            c - n
        }
    }

    /// Grid coordinate storing frequency `freq` of one axis.
    pub fn coord_by_freq(&self, axis: usize, freq: i32) -> usize {
        let n = self.dims[axis] as i32;
        let (lo, hi) = self.limits(axis);
        debug_assert!(freq >= lo && freq <= hi);
        if freq >= 0 {
            freq as usize
        } else {
            (freq + n) as usize
        }
    }

    /// Whether the (x, y) pair lies inside the grid cross-section.
    pub fn contains_xy(&self, x: i32, y: i32) -> bool {
        let (x0, x1) = self.limits(0);
        let (y0, y1) = self.limits(1);
        x >= x0 && x <= x1 && y >= y0 && y <= y1
    }
}

/// Largest integer translation along each reciprocal lattice direction that
/// can still reach the cutoff sphere. Along direction `i` the bound is the
/// cutoff divided by the spacing of the lattice planes spanned by the other
/// two vectors.
pub fn find_translations(cutoff: f64, lattice: &Matrix3<f64>) -> Result<Vector3<i32>, Error> {
    if cutoff <= 0.0 {
        return Err(Error::msg("cutoff must be positive"));
    }
    let volume = lattice.determinant().abs();
    if volume < LATTICE_TOLERANCE {
        return Err(Error::msg(
            "lattice vectors are singular or too close to zero",
        ));
    }
    let b: [Vector3<f64>; 3] = [
        lattice.column(0).into(),
        lattice.column(1).into(),
        lattice.column(2).into(),
    ];
    let mut t = Vector3::zeros();
    for i in 0..3 {
        let j = (i + 1) % 3;
        let k = (i + 2) % 3;
        t[i] = (cutoff * b[j].cross(&b[k]).norm() / volume) as i32 + 1;
    }
    Ok(t)
}

/// Minimal FFT grid holding the whole cutoff sphere, with one spare layer on
/// each side.
pub fn min_fft_grid(cutoff: f64, lattice: &Matrix3<f64>) -> Result<FftGrid3, Error> {
    let t = find_translations(cutoff, lattice)?;
    FftGrid3::new([
        2 * t[0] as usize + 2,
        2 * t[1] as usize + 2,
        2 * t[2] as usize + 2,
    ])
}
