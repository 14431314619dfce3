// Comm module: Process group collectives and point-to-point transfer
// This module provides the cooperation layer shared by all distributed parts of the crate

// ======================== MODULE DECLARATIONS ========================
pub mod process_group;
pub mod serializer;

// Test modules
mod _tests_process_group;

// ======================== PROCESS GROUP ========================
pub use process_group::{
    ProcessGroup, // struct - handle of one rank inside a fixed-size group of cooperating ranks
    run_local,    // fn(size: usize, f: Fn(ProcessGroup) -> T) -> Vec<T> - drives a fresh in-process group, one thread per rank
};

// ProcessGroup impl methods:
//   solo() -> Self                                                 - single-rank group
//   local_world(size: usize) -> Vec<ProcessGroup>                  - shared in-process group, one handle per rank
//   rank(&self) -> usize                                           - rank of this handle
//   size(&self) -> usize                                           - number of ranks in the group
//   barrier(&self)                                                 - wait for the whole group
//   all_exchange(&self, value: T) -> Vec<Arc<T>>                   - every rank's contribution in rank order
//   allreduce_sum(&self, data: &mut [T])                           - element-wise sum, replicated result
//   allgatherv(&self, local: &[T]) -> Vec<T>                       - rank-order concatenation, replicated result
//   allgather_in_place(&self, buf: &mut [T], offset, count)        - each rank fills its own slice of a shared layout
//   alltoallv(&self, send, scounts, soffs, recv, rcounts, roffs)   - variable-count all-to-all exchange
//   send_bytes(&self, dest: usize, data: Vec<u8>)                  - point-to-point send
//   recv_bytes(&self, source: usize) -> Vec<u8>                    - blocking point-to-point receive
//   split(&self, color: usize, key: usize) -> ProcessGroup         - sub-group of equal color, ordered by key

// ======================== SERIALIZATION ========================
pub use serializer::Serializer; // struct - flat little-endian field packing for rank-to-rank transfer
