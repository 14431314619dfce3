// Symmetries module: Point-group analysis of lattices
// This module finds the integer rotations a G-vector shell classification relies on

// ======================== MODULE DECLARATIONS ========================
pub mod lattice_symmetry;

// Test modules
mod _tests_lattice_symmetry;

// ======================== LATTICE POINT GROUP ========================
pub use lattice_symmetry::find_lattice_symmetries; // fn(lattice: &Matrix3<f64>, tolerance: f64) -> Vec<Matrix3<i32>> - metric-preserving integer rotations
