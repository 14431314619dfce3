//! FFT-friendly repartitioning of a G-vector set.
//!
//! An FFT driver usually runs on a smaller "row" group than the one the
//! G-vectors are spread over. The base group is factorized into a row
//! dimension and an orthogonal dimension; the vectors owned by all ranks
//! sharing a row rank are stacked into one "fat slab" so the row group can
//! feed them to the transform:
//!
//! ```text
//! +--------------+      +----+----+----+
//! |    :    :    |      |    |    |    |
//! +--------------+      |....|....|....|
//! |    :    :    |  ->  |    |    |    |
//! +--------------+      |....|....|....|
//! |    :    :    |      |    |    |    |
//! +--------------+      +----+----+----+
//! ```
//!
//! The view borrows the base set and owns only its own remap tables.

use anyhow::Error;
use log::debug;

use crate::comm::ProcessGroup;
use crate::distribution::BlockDistribution;
use crate::gvec::GvecSet;

pub struct GvecFftPartition<'a> {
    gvec: &'a GvecSet,
    /// Row group the FFT driver runs on.
    fft_comm: ProcessGroup,
    /// Group orthogonal to the row group.
    ortho_comm: ProcessGroup,
    /// (row rank, orthogonal rank) -> rank of the base group.
    rank_map: Vec<usize>,
    /// G-vector distribution over the row group.
    gvec_distr_fft: BlockDistribution,
    /// Z-column distribution over the row group.
    zcol_distr_fft: BlockDistribution,
    /// Layout of the calling rank's fat slab, one block per orthogonal rank.
    fft_slab: BlockDistribution,
    /// Storage offset of each column inside its row rank's buffer.
    zcol_offsets: Vec<usize>,
    /// Column permutation: fat-slab order -> original column id.
    idx_zcol: Vec<usize>,
    /// Vector permutation: local fat-slab position -> global G-vector index.
    idx_gvec: Vec<usize>,
}

impl<'a> GvecFftPartition<'a> {
    /// The sizes of `fft_comm` and `ortho_comm` must factorize the base
    /// group exactly; anything else is a topology configuration error.
    pub fn new(
        gvec: &'a GvecSet,
        fft_comm: ProcessGroup,
        ortho_comm: ProcessGroup,
    ) -> Result<Self, Error> {
        let rows = fft_comm.size();
        let ortho = ortho_comm.size();
        if rows * ortho != gvec.comm().size() {
            return Err(Error::msg(format!(
                "wrong process grid: {} x {} does not factorize a group of {}",
                rows,
                ortho,
                gvec.comm().size()
            )));
        }

        // Every rank writes its own entry of the otherwise-zero coordinate
        // table; one sum reduction assembles the complete map.
        let mut rank_map = vec![0usize; rows * ortho];
        rank_map[fft_comm.rank() * ortho + ortho_comm.rank()] = gvec.comm().rank();
        gvec.comm().allreduce_sum(&mut rank_map);

        let map = |row: usize, col: usize| rank_map[row * ortho + col];

        // Aggregate the base distribution over the orthogonal dimension.
        let mut gvec_counts = vec![0usize; rows];
        let mut zcol_counts = vec![0usize; rows];
        for row in 0..rows {
            for col in 0..ortho {
                let rank = map(row, col);
                gvec_counts[row] += gvec.gvec_count(rank);
                zcol_counts[row] += gvec.zcol_count(rank);
            }
        }
        let gvec_distr_fft = BlockDistribution::from_counts(gvec_counts);
        let zcol_distr_fft = BlockDistribution::from_counts(zcol_counts);

        // Column permutation grouped by (row rank, orthogonal rank).
        let mut idx_zcol = Vec::with_capacity(gvec.num_zcols());
        for row in 0..rows {
            for col in 0..ortho {
                let rank = map(row, col);
                for k in 0..gvec.zcol_count(rank) {
                    idx_zcol.push(gvec.zcol_offset(rank) + k);
                }
            }
            debug_assert_eq!(
                idx_zcol.len(),
                zcol_distr_fft.offset(row) + zcol_distr_fft.count(row)
            );
        }
        debug_assert_eq!(idx_zcol.len(), gvec.num_zcols());

        // Storage offsets of the columns inside each row rank's buffer.
        let mut zcol_offsets = vec![0usize; gvec.num_zcols()];
        for row in 0..rows {
            let mut offset = 0;
            for i in 0..zcol_distr_fft.count(row) {
                let icol = idx_zcol[zcol_distr_fft.offset(row) + i];
                zcol_offsets[icol] = offset;
                offset += gvec.zcol(icol).len();
            }
            debug_assert_eq!(offset, gvec_distr_fft.count(row));
        }

        // Layout of the calling rank's fat slab.
        let my_row = fft_comm.rank();
        let slab_counts: Vec<usize> = (0..ortho).map(|col| gvec.gvec_count(map(my_row, col))).collect();
        let fft_slab = BlockDistribution::from_counts(slab_counts);
        debug_assert_eq!(fft_slab.total(), gvec_distr_fft.count(my_row));

        // Vector permutation of the calling rank's fat slab.
        let mut idx_gvec = Vec::with_capacity(fft_slab.total());
        for col in 0..ortho {
            let rank = map(my_row, col);
            for k in 0..gvec.gvec_count(rank) {
                idx_gvec.push(gvec.gvec_offset(rank) + k);
            }
        }

        debug!(
            "FFT partition: {} x {} grid, fat slab of {} vectors on row rank {}",
            rows,
            ortho,
            idx_gvec.len(),
            my_row
        );
        Ok(GvecFftPartition {
            gvec,
            fft_comm,
            ortho_comm,
            rank_map,
            gvec_distr_fft,
            zcol_distr_fft,
            fft_slab,
            zcol_offsets,
            idx_zcol,
            idx_gvec,
        })
    }

    pub fn gvec(&self) -> &GvecSet {
        self.gvec
    }

    pub fn fft_comm(&self) -> &ProcessGroup {
        &self.fft_comm
    }

    pub fn ortho_comm(&self) -> &ProcessGroup {
        &self.ortho_comm
    }

    /// Base-group rank sitting at the given grid coordinate.
    pub fn rank_at(&self, row: usize, col: usize) -> usize {
        self.rank_map[row * self.ortho_comm.size() + col]
    }

    /// Number of G-vectors in the fat slab of a row rank.
    pub fn gvec_count_fft_rank(&self, row: usize) -> usize {
        self.gvec_distr_fft.count(row)
    }

    /// Number of G-vectors in the calling rank's fat slab.
    pub fn gvec_count_fft(&self) -> usize {
        self.gvec_count_fft_rank(self.fft_comm.rank())
    }

    pub fn zcol_count_fft_rank(&self, row: usize) -> usize {
        self.zcol_distr_fft.count(row)
    }

    pub fn zcol_count_fft(&self) -> usize {
        self.zcol_count_fft_rank(self.fft_comm.rank())
    }

    /// Original column id by position in the fat-slab column order, local to
    /// the calling row rank.
    pub fn idx_zcol_local(&self, i: usize) -> usize {
        self.idx_zcol[self.zcol_distr_fft.offset(self.fft_comm.rank()) + i]
    }

    /// Original column id by global position in the fat-slab column order.
    pub fn idx_zcol_global(&self, i: usize) -> usize {
        self.idx_zcol[i]
    }

    /// Global G-vector index by position in the calling rank's fat slab.
    pub fn idx_gvec(&self, local: usize) -> usize {
        self.idx_gvec[local]
    }

    /// Layout of the calling rank's fat slab, one block per orthogonal rank.
    pub fn fft_slab(&self) -> &BlockDistribution {
        &self.fft_slab
    }

    /// Storage offset of a column inside its row rank's buffer.
    pub fn zcol_offset(&self, icol: usize) -> usize {
        self.zcol_offsets[icol]
    }

    // ======================== PAYLOAD MOVEMENT ========================

    /// Collect the scattered per-vector payload of all ranks sharing this
    /// row rank into the fat slab. One all-gather over the orthogonal group.
    pub fn gather_pw_fft<T>(&self, local: &[T], fft_buf: &mut [T])
    where
        T: Clone + Send + Sync + 'static,
    {
        assert_eq!(local.len(), self.gvec.count());
        assert_eq!(fft_buf.len(), self.gvec_count_fft());
        let gathered = self.ortho_comm.allgatherv(local);
        fft_buf.clone_from_slice(&gathered);
    }

    /// Extract the calling rank's scattered payload back out of the fat
    /// slab. The inverse of [`GvecFftPartition::gather_pw_fft`]; purely
    /// local, since a rank's block is a contiguous slice of its fat slab.
    pub fn scatter_pw_fft<T>(&self, fft_buf: &[T], local: &mut [T])
    where
        T: Clone,
    {
        assert_eq!(local.len(), self.gvec.count());
        assert_eq!(fft_buf.len(), self.gvec_count_fft());
        let offset = self.fft_slab.offset(self.ortho_comm.rank());
        local.clone_from_slice(&fft_buf[offset..offset + self.gvec.count()]);
    }

    /// Expand the fat slab into the full global payload array, replicated
    /// on every rank of the base group.
    pub fn gather_pw_global<T>(&self, fft_buf: &[T], global: &mut [T])
    where
        T: Clone + Send + Sync + 'static,
    {
        assert_eq!(fft_buf.len(), self.gvec_count_fft());
        assert_eq!(global.len(), self.gvec.num_gvec());
        let offset = self.fft_slab.offset(self.ortho_comm.rank());
        for ig in 0..self.gvec.count() {
            global[self.gvec.offset() + ig] = fft_buf[offset + ig].clone();
        }
        self.gvec
            .comm()
            .allgather_in_place(global, self.gvec.offset(), self.gvec.count());
    }
}
