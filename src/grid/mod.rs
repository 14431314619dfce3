// Grid module: Bounding grids of the cutoff sphere in FFT frequency order

// ======================== MODULE DECLARATIONS ========================
pub mod fft_grid;
pub mod xy_grid;


// ======================== BOUNDING GRID ========================
pub use fft_grid::{
    FftGrid3,          // struct - integer box with FFT frequency<->coordinate maps per axis
    find_translations, // fn(cutoff: f64, lattice: &Matrix3<f64>) -> Result<Vector3<i32>> - per-axis translation bound of the sphere
    min_fft_grid,      // fn(cutoff: f64, lattice: &Matrix3<f64>) -> Result<FftGrid3> - minimal grid holding the whole sphere
};

// FftGrid3 impl methods:
//   new(dims: [usize; 3]) -> Result<Self>             - grid with explicit dimensions
//   dims(&self) -> [usize; 3]                         - grid dimensions
//   size(&self, axis: usize) -> usize                 - dimension of one axis
//   limits(&self, axis: usize) -> (i32, i32)          - inclusive frequency range of one axis
//   freq_by_coord(&self, axis, coord) -> i32          - frequency stored at a grid coordinate
//   coord_by_freq(&self, axis, freq) -> usize         - grid coordinate storing a frequency
//   contains_xy(&self, x: i32, y: i32) -> bool        - (x, y) inside the cross-section

// ======================== CROSS-SECTION TABLE ========================
pub use xy_grid::XyGrid; // struct - dense table keyed by signed (x, y) frequencies
