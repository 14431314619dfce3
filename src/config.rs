// Constants

// Tolerances
pub const SYMMETRY_TOLERANCE: f64 = 1e-6; // For detection of metric-preserving lattice rotations
pub const SHELL_LENGTH_TOLERANCE: f64 = 1e-7; // Maximum length disagreement inside one G-vector shell
pub const SHELL_LENGTH_QUANTUM: f64 = 1e-10; // Quantization step for the length-based shell pass
pub const LATTICE_TOLERANCE: f64 = 1e-10; // For lattice matrix validity checks

// Capacity ceilings of the G-vector index
pub const MAX_ZCOLUMN_SIZE: usize = 4096; // A z-column must hold fewer entries than this
pub const MAX_ZCOLUMN_COUNT: usize = 1 << 20; // Upper bound on the number of z-columns
