// Distribution module: Per-rank layouts and relayout views over a G-vector set
// This module owns the distribution descriptors and the two specialized remaps

// ======================== MODULE DECLARATIONS ========================
pub mod block_distribution;
pub mod fft_partition;
pub mod shell_remap;

// Test modules
mod _tests_block_distribution;
mod _tests_shell_remap;

// ======================== DISTRIBUTION DESCRIPTORS ========================
pub use block_distribution::{
    BlockCyclic,       // struct - round-robin owner map (item -> item mod ranks)
    BlockDistribution, // struct - per-rank counts with exclusive prefix-sum offsets
};

// BlockDistribution impl methods:
//   from_counts(counts: Vec<usize>) -> Self          - descriptor with computed offsets
//   num_ranks/count/offset/counts/offsets/total      - bookkeeping accessors

// ======================== FFT SLAB PARTITION ========================
pub use fft_partition::GvecFftPartition; // struct - fat-slab relayout over a 2-D process grid
// GvecFftPartition impl methods:
//   new(gvec: &GvecSet, fft_comm, ortho_comm) -> Result<Self>      - build the relayout, fatal on grid mismatch
//   gvec_count_fft/zcol_count_fft (+ per-rank variants)            - fat-slab sizes
//   idx_zcol_local/idx_zcol_global/idx_gvec                        - permutations into the original layout
//   fft_slab/zcol_offset/rank_at                                   - slab layout details
//   gather_pw_fft/scatter_pw_fft/gather_pw_global                  - payload movement

// ======================== SHELL REMAP ========================
pub use shell_remap::GvecShellRemap; // struct - shell-complete relayout with forward/backward exchange
// GvecShellRemap impl methods:
//   new(gvec: &GvecSet) -> Result<Self>                            - build remap tables, no communication
//   gvec_count_remapped/gvec_remapped/shell_remapped               - shell-complete layout access
//   index_by_gvec(&self, g) -> Option<usize>                       - local hash lookup
//   remap_forward/remap_backward                                   - payload exchange, exact inverses
