// Gvec module: Enumeration, distribution and indexing of the G-vector sphere
// This module builds the immutable G-vector set every downstream kernel works against

// ======================== MODULE DECLARATIONS ========================
pub mod column_builder;
pub mod column_distribution;
pub mod gvec_index;
pub mod gvec_set;
pub mod shell_classifier;
pub mod zcolumn;

mod _tests_gvec_set;

// ======================== Z-COLUMNS ========================
pub use zcolumn::ZColumn; // struct - stick of G-vectors with fixed (x, y), z in FFT frequency order

// ======================== INDEX RECORDS ========================
pub use gvec_index::{
    ColumnLocation, // struct - global position of a whole column (first index, size, column id)
    GvecIndexEntry, // struct - forward index record (column id, position inside the column)
};

// ======================== G-VECTOR SET ========================
pub use gvec_set::GvecSet; // struct - distributed, immutable G-vector enumeration
// GvecSet impl methods:
//   new(lattice, cutoff, comm, reduce) -> Result<Self>             - bare set inside the cutoff sphere
//   with_k_shift(vk, lattice, cutoff, comm, reduce) -> Result<Self> - G+k set
//   with_grid(lattice, cutoff, grid, comm, reduce) -> Result<Self> - bare set over an explicit bounding grid
//   with_base(cutoff, base: &GvecSet) -> Result<Self>              - extended set keeping the base layout as a prefix
//   solo(lattice, cutoff, reduce) -> Result<Self>                  - bare set on a single-rank group
//   num_gvec(&self) -> usize                                       - total number of G-vectors
//   gvec(&self, ig: usize) -> Vector3<i32>                         - G-vector by global index
//   gkvec(&self, ig: usize) -> Vector3<f64>                        - G+k by global index
//   index_by_gvec(&self, g: &Vector3<i32>) -> Option<usize>        - O(1) reverse lookup
//   index_of_difference(&self, g1, g2) -> Result<(usize, bool)>    - conjugate-aware lookup of g1 - g2
//   gvec_cart_local/gvec_cart_global, gkvec_cart_local/gkvec_cart_global - Cartesian coordinates
//   count/offset, gvec_count/gvec_offset, zcol_count/zcol_offset   - distribution descriptors
//   num_zcols/zcol/z_columns                                       - column access
//   num_shells/shell/shell_len/gvec_len                            - shell access (bare sets)
//   base_mapping(&self, igloc_base: usize) -> usize                - local map from a base set's vectors
//   set_lattice_vectors/rebuild_metric_caches                      - metric replacement, explicit cache rebuild
//   pack/unpack/send_recv                                          - flat serialization for rank-to-rank transfer
