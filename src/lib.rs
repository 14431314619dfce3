//! Distributed plane-wave G-vector basis
//!
//! This library builds the globally-consistent enumeration of
//! reciprocal-lattice vectors (G-vectors) inside a spherical cutoff that a
//! plane-wave electronic-structure solver works against, partitions it over
//! a group of cooperating ranks, and provides the two relayouts downstream
//! kernels need: an FFT-friendly fat-slab layout and a
//! symmetry-shell-complete layout.
//!
//! Quick reference
//! - Set construction: [`GvecSet::new`], [`GvecSet::with_k_shift`],
//!   [`GvecSet::with_base`], [`GvecSet::solo`]
//! - Indexing: [`GvecSet::gvec`], [`GvecSet::index_by_gvec`],
//!   [`GvecSet::index_of_difference`]
//! - Shells: [`GvecSet::shell`], [`GvecSet::shell_len`]
//! - Relayouts: [`GvecFftPartition`], [`GvecShellRemap`]
//! - Cooperation: [`ProcessGroup`], [`comm::run_local`]
//! - Bounding grids: [`FftGrid3`], [`grid::min_fft_grid`]
//!
//! See submodules for full details: [`gvec`], [`distribution`], [`comm`],
//! [`grid`], [`symmetries`].

// ======================== MODULE DECLARATIONS ========================
pub mod comm;
pub mod config;
pub mod distribution;
pub mod grid;
pub mod gvec;
pub mod symmetries;

// ======================== RE-EXPORTED PUBLIC API (curated) ========================
#[doc(inline)]
pub use gvec::GvecSet;

#[doc(inline)]
pub use gvec::ZColumn;

pub use comm::{ProcessGroup, Serializer};

pub use distribution::{BlockCyclic, BlockDistribution, GvecFftPartition, GvecShellRemap};

pub use grid::FftGrid3;

pub use symmetries::find_lattice_symmetries;

/// Common result type used throughout the library
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
