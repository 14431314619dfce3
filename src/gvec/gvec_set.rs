//! The distributed G-vector set.
//!
//! A `GvecSet` is the globally-consistent enumeration of all G-vectors
//! inside a cutoff sphere, organized as z-columns, distributed over a
//! process group and indexed both ways (global index -> vector, vector ->
//! global index). Every rank stores the identical global description and in
//! addition caches Cartesian coordinates for its own contiguous index range.
//!
//! Construction runs the same deterministic pipeline on every rank: column
//! scan, greedy distribution, index build with validation, Cartesian caches,
//! shell classification (bare sets only). A set is immutable afterwards,
//! with one exception: the lattice vectors may be replaced wholesale, after
//! which [`GvecSet::rebuild_metric_caches`] must be called to refresh the
//! Cartesian caches and shells. The column layout and the index never depend
//! on the metric, only on the discrete enumeration, so they stay untouched.

use anyhow::Error;
use log::debug;
use nalgebra::{Matrix3, Vector3};

use crate::comm::{ProcessGroup, Serializer};
use crate::distribution::BlockDistribution;
use crate::grid::{min_fft_grid, FftGrid3, XyGrid};
use crate::gvec::column_builder::find_z_columns;
use crate::gvec::column_distribution::distribute_z_columns;
use crate::gvec::gvec_index::{
    build_forward_index, build_xy_table, index_by_gvec, ColumnLocation, GvecIndexEntry,
};
use crate::gvec::shell_classifier::classify_shells;
use crate::gvec::ZColumn;

pub struct GvecSet {
    /// K-point shift of a G+k set; zero for bare sets.
    vk: Vector3<f64>,
    /// Cutoff on |G + k|.
    cutoff: f64,
    /// Reciprocal lattice vectors, column order.
    lattice: Matrix3<f64>,
    comm: ProcessGroup,
    /// True if the set is reduced by inversion symmetry.
    reduced: bool,
    /// True for a set without a k-point shift.
    bare: bool,
    grid: FftGrid3,
    num_gvec: usize,
    /// Non-empty z-columns, contiguous by owning rank.
    columns: Vec<ZColumn>,
    /// Global index -> (column, position inside the column).
    forward: Vec<GvecIndexEntry>,
    /// (x, y) -> column location, O(1).
    by_xy: XyGrid<Option<ColumnLocation>>,
    gvec_distr: BlockDistribution,
    zcol_distr: BlockDistribution,
    /// Shell id per G-vector; empty unless the set is bare.
    shells: Vec<usize>,
    /// Representative length per shell, ascending; empty unless bare.
    shell_len: Vec<f64>,
    /// Local index map from a base set's local vectors into this set; empty
    /// unless the set was derived from a base.
    base_mapping: Vec<usize>,
    /// Cartesian G for the locally owned index range.
    gvec_cart: Vec<Vector3<f64>>,
    /// Cartesian G+k for the locally owned index range.
    gkvec_cart: Vec<Vector3<f64>>,
}

impl GvecSet {
    /// Bare set of G-vectors within `cutoff`.
    pub fn new(
        lattice: Matrix3<f64>,
        cutoff: f64,
        comm: ProcessGroup,
        reduce: bool,
    ) -> Result<Self, Error> {
        let grid = min_fft_grid(cutoff, &lattice)?;
        Self::build(Vector3::zeros(), lattice, cutoff, grid, comm, reduce, true, None)
    }

    /// Set of G+k vectors with |G + k| within `cutoff`.
    pub fn with_k_shift(
        vk: Vector3<f64>,
        lattice: Matrix3<f64>,
        cutoff: f64,
        comm: ProcessGroup,
        reduce: bool,
    ) -> Result<Self, Error> {
        let grid = min_fft_grid(cutoff, &lattice)?;
        Self::build(vk, lattice, cutoff, grid, comm, reduce, false, None)
    }

    /// Bare set over an explicitly provided bounding grid.
    pub fn with_grid(
        lattice: Matrix3<f64>,
        cutoff: f64,
        grid: FftGrid3,
        comm: ProcessGroup,
        reduce: bool,
    ) -> Result<Self, Error> {
        Self::build(Vector3::zeros(), lattice, cutoff, grid, comm, reduce, true, None)
    }

    /// Bare set whose column layout and rank assignment extend those of
    /// `base`. The base columns form a per-rank prefix of the new layout,
    /// which allows local-only copies of coefficients between the two sets
    /// through [`GvecSet::base_mapping`]. The base must use a cutoff not
    /// larger than `cutoff`.
    pub fn with_base(cutoff: f64, base: &GvecSet) -> Result<Self, Error> {
        let grid = min_fft_grid(cutoff, &base.lattice)?;
        Self::build(
            Vector3::zeros(),
            base.lattice,
            cutoff,
            grid,
            base.comm.clone(),
            base.reduced,
            true,
            Some(base),
        )
    }

    /// Bare set owned by the calling rank alone.
    pub fn solo(lattice: Matrix3<f64>, cutoff: f64, reduce: bool) -> Result<Self, Error> {
        Self::new(lattice, cutoff, ProcessGroup::solo(), reduce)
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        vk: Vector3<f64>,
        lattice: Matrix3<f64>,
        cutoff: f64,
        grid: FftGrid3,
        comm: ProcessGroup,
        reduced: bool,
        bare: bool,
        base: Option<&GvecSet>,
    ) -> Result<Self, Error> {
        let columns = find_z_columns(&lattice, &vk, cutoff, &grid, reduced, base);
        if columns.is_empty() {
            return Err(Error::msg(
                "no G-vectors inside the cutoff sphere; check the cutoff and the lattice vectors",
            ));
        }
        let num_gvec: usize = columns.iter().map(ZColumn::len).sum();

        let distributed = distribute_z_columns(columns, num_gvec, comm.size(), base)?;

        // Collective sanity check: the per-rank counts must add up to the
        // redundantly computed global total on every rank.
        let mut total = [distributed.gvec_distr.count(comm.rank())];
        comm.allreduce_sum(&mut total);
        if total[0] != num_gvec {
            return Err(Error::msg(format!(
                "wrong global number of G-vectors: ranks hold {} of {}",
                total[0], num_gvec
            )));
        }

        let by_xy = build_xy_table(&distributed.columns, &grid)?;
        let forward = build_forward_index(&distributed.columns, num_gvec)?;

        let mut set = GvecSet {
            vk,
            cutoff,
            lattice,
            comm,
            reduced,
            bare,
            grid,
            num_gvec,
            columns: distributed.columns,
            forward,
            by_xy,
            gvec_distr: distributed.gvec_distr,
            zcol_distr: distributed.zcol_distr,
            shells: Vec::new(),
            shell_len: Vec::new(),
            base_mapping: Vec::new(),
            gvec_cart: Vec::new(),
            gkvec_cart: Vec::new(),
        };

        // The zero vector must sit at global index 0; never remove this check.
        let g0 = set.gvec(0);
        if g0 != Vector3::new(0, 0, 0) {
            return Err(Error::msg("first G-vector is not the zero vector"));
        }
        // Round-trip validation of the reverse lookup over the full range.
        for ig in 0..set.num_gvec {
            let g = set.gvec(ig);
            if set.index_by_gvec(&g) != Some(ig) {
                return Err(Error::msg(format!(
                    "wrong G-vector index: ig={} G=({}, {}, {})",
                    ig, g.x, g.y, g.z
                )));
            }
        }

        set.init_cartesian_caches();

        if set.bare {
            let classified = classify_shells(&set)?;
            set.shells = classified.shells;
            set.shell_len = classified.shell_len;
        }

        if let Some(base) = base {
            set.base_mapping = set.build_base_mapping(base)?;
        }

        debug!(
            "G-vector set: {} vectors in {} columns over {} ranks, {} shells",
            set.num_gvec,
            set.columns.len(),
            set.comm.size(),
            set.shell_len.len()
        );
        Ok(set)
    }

    /// Base vectors must resolve on the same rank in the derived set; the
    /// resulting map allows local-only copies between the two layouts.
    fn build_base_mapping(&self, base: &GvecSet) -> Result<Vec<usize>, Error> {
        let mut mapping = Vec::with_capacity(base.count());
        for igloc in 0..base.count() {
            let g = base.gvec(base.offset() + igloc);
            let ig = self.index_by_gvec(&g).ok_or_else(|| {
                Error::msg(format!(
                    "base G-vector ({}, {}, {}) is missing from the derived set",
                    g.x, g.y, g.z
                ))
            })?;
            if ig < self.offset() || ig >= self.offset() + self.count() {
                return Err(Error::msg(format!(
                    "base G-vector ({}, {}, {}) is not stored on the same rank in the derived set",
                    g.x, g.y, g.z
                )));
            }
            mapping.push(ig - self.offset());
        }
        Ok(mapping)
    }

    fn init_cartesian_caches(&mut self) {
        let offset = self.offset();
        let count = self.count();
        let lattice = self.lattice;
        let vk = self.vk;

        let cartesian = |igloc: usize| {
            let g = self.gvec(offset + igloc).map(f64::from);
            (lattice * g, lattice * (g + vk))
        };

        #[cfg(feature = "parallel")]
        let (gvec_cart, gkvec_cart) = {
            use rayon::prelude::*;
            (0..count).into_par_iter().map(cartesian).unzip()
        };
        #[cfg(not(feature = "parallel"))]
        let (gvec_cart, gkvec_cart) = (0..count).map(cartesian).unzip();

        self.gvec_cart = gvec_cart;
        self.gkvec_cart = gkvec_cart;
    }

    // ======================== BASIC ACCESSORS ========================

    pub fn comm(&self) -> &ProcessGroup {
        &self.comm
    }

    pub fn vk(&self) -> &Vector3<f64> {
        &self.vk
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    pub fn lattice_vectors(&self) -> &Matrix3<f64> {
        &self.lattice
    }

    pub fn grid(&self) -> &FftGrid3 {
        &self.grid
    }

    pub fn reduced(&self) -> bool {
        self.reduced
    }

    pub fn bare(&self) -> bool {
        self.bare
    }

    /// Total number of G-vectors within the cutoff.
    pub fn num_gvec(&self) -> usize {
        self.num_gvec
    }

    pub fn num_zcols(&self) -> usize {
        self.columns.len()
    }

    pub fn zcol(&self, icol: usize) -> &ZColumn {
        &self.columns[icol]
    }

    pub fn z_columns(&self) -> &[ZColumn] {
        &self.columns
    }

    // ======================== DISTRIBUTION ========================

    /// Number of G-vectors stored by `rank`.
    pub fn gvec_count(&self, rank: usize) -> usize {
        self.gvec_distr.count(rank)
    }

    /// Offset of `rank` in the global G-vector index.
    pub fn gvec_offset(&self, rank: usize) -> usize {
        self.gvec_distr.offset(rank)
    }

    /// Number of G-vectors stored by the calling rank.
    pub fn count(&self) -> usize {
        self.gvec_count(self.comm.rank())
    }

    /// Offset of the calling rank in the global G-vector index.
    pub fn offset(&self) -> usize {
        self.gvec_offset(self.comm.rank())
    }

    pub fn zcol_count(&self, rank: usize) -> usize {
        self.zcol_distr.count(rank)
    }

    pub fn zcol_offset(&self, rank: usize) -> usize {
        self.zcol_distr.offset(rank)
    }

    /// Local starting index when the G = 0 component is skipped.
    pub fn skip_g0(&self) -> usize {
        usize::from(self.comm.rank() == 0)
    }

    // ======================== VECTOR ACCESS ========================

    /// G-vector in lattice coordinates by global index.
    pub fn gvec(&self, ig: usize) -> Vector3<i32> {
        let entry = self.forward[ig];
        let column = &self.columns[entry.column as usize];
        Vector3::new(column.x, column.y, column.z[entry.z_index as usize])
    }

    /// G+k in lattice coordinates by global index.
    pub fn gkvec(&self, ig: usize) -> Vector3<f64> {
        self.gvec(ig).map(f64::from) + self.vk
    }

    /// Cartesian G by global index, computed from the lattice.
    pub fn gvec_cart_global(&self, ig: usize) -> Vector3<f64> {
        self.lattice * self.gvec(ig).map(f64::from)
    }

    /// Cartesian G+k by global index, computed from the lattice.
    pub fn gkvec_cart_global(&self, ig: usize) -> Vector3<f64> {
        self.lattice * self.gkvec(ig)
    }

    /// Cartesian G by local index, from the cache of the calling rank.
    pub fn gvec_cart_local(&self, igloc: usize) -> Vector3<f64> {
        self.gvec_cart[igloc]
    }

    /// Cartesian G+k by local index, from the cache of the calling rank.
    pub fn gkvec_cart_local(&self, igloc: usize) -> Vector3<f64> {
        self.gkvec_cart[igloc]
    }

    /// Global index of a G-vector, `None` if it is not part of the set.
    pub fn index_by_gvec(&self, g: &Vector3<i32>) -> Option<usize> {
        index_by_gvec(g, &self.columns, &self.by_xy, self.reduced, self.num_gvec)
    }

    /// Index of the difference `g1 - g2`, conjugate-aware: when the plain
    /// difference is absent its negative is tried, which is guaranteed to
    /// cover reduced sets where only one member of each inversion pair is
    /// stored. The flag reports whether conjugation was used.
    pub fn index_of_difference(
        &self,
        g1: &Vector3<i32>,
        g2: &Vector3<i32>,
    ) -> Result<(usize, bool), Error> {
        let d = g1 - g2;
        if let Some(ig) = self.index_by_gvec(&d) {
            return Ok((ig, false));
        }
        if let Some(ig) = self.index_by_gvec(&-d) {
            return Ok((ig, true));
        }
        Err(Error::msg(format!(
            "G-vector difference ({}, {}, {}) is not part of the set",
            d.x, d.y, d.z
        )))
    }

    /// Local index in this set of the base set's local vector `igloc_base`.
    /// Only available for sets constructed with [`GvecSet::with_base`].
    pub fn base_mapping(&self, igloc_base: usize) -> usize {
        assert!(
            !self.base_mapping.is_empty(),
            "set was not derived from a base set"
        );
        self.base_mapping[igloc_base]
    }

    // ======================== SHELLS ========================

    /// Number of shells; zero unless the set is bare.
    pub fn num_shells(&self) -> usize {
        self.shell_len.len()
    }

    /// Shell id of a G-vector by global index.
    pub fn shell(&self, ig: usize) -> usize {
        assert!(self.bare, "shells are only defined for bare G-vector sets");
        self.shells[ig]
    }

    /// Representative length of a shell.
    pub fn shell_len(&self, shell: usize) -> f64 {
        assert!(self.bare, "shells are only defined for bare G-vector sets");
        self.shell_len[shell]
    }

    /// Length of a G-vector through its shell.
    pub fn gvec_len(&self, ig: usize) -> f64 {
        self.shell_len(self.shell(ig))
    }

    // ======================== METRIC REPLACEMENT ========================

    /// Replace the reciprocal lattice vectors, keeping the enumeration.
    /// Used by variable-cell relaxation, where the number of G-vectors must
    /// be preserved while the metric changes. The caller must invoke
    /// [`GvecSet::rebuild_metric_caches`] afterwards; until then the
    /// Cartesian caches and shells still describe the old metric.
    pub fn set_lattice_vectors(&mut self, lattice: Matrix3<f64>) {
        self.lattice = lattice;
    }

    /// Recompute everything that depends on the metric: the Cartesian
    /// caches and, for bare sets, the shell classification. The column
    /// layout and the index derive from the discrete enumeration alone and
    /// are left untouched.
    pub fn rebuild_metric_caches(&mut self) -> Result<(), Error> {
        self.init_cartesian_caches();
        if self.bare {
            let classified = classify_shells(self)?;
            self.shells = classified.shells;
            self.shell_len = classified.shell_len;
        }
        Ok(())
    }

    // ======================== SERIALIZATION ========================

    /// Append every persistent field to `s` in fixed order. Derived tables
    /// (the reverse table and the Cartesian caches) are rebuilt on unpack.
    pub fn pack(&self, s: &mut Serializer) {
        for i in 0..3 {
            s.pack_f64(self.vk[i]);
        }
        s.pack_f64(self.cutoff);
        for value in self.lattice.iter() {
            s.pack_f64(*value);
        }
        s.pack_bool(self.reduced);
        s.pack_bool(self.bare);
        let dims = self.grid.dims();
        for d in dims {
            s.pack_usize(d);
        }
        s.pack_usize(self.num_gvec);
        s.pack_usize(self.columns.len());
        for column in &self.columns {
            s.pack_i32(column.x);
            s.pack_i32(column.y);
            s.pack_i32_slice(&column.z);
        }
        s.pack_usize(self.forward.len());
        for entry in &self.forward {
            s.pack_u32(entry.column);
            s.pack_u32(entry.z_index);
        }
        s.pack_usize_slice(self.gvec_distr.counts());
        s.pack_usize_slice(self.zcol_distr.counts());
        s.pack_usize_slice(&self.shells);
        s.pack_f64_slice(&self.shell_len);
        s.pack_usize_slice(&self.base_mapping);
    }

    /// Rebuild a set from the byte form produced by [`GvecSet::pack`]. The
    /// stored distribution keeps describing the group the set was built on;
    /// the Cartesian caches are restored only when `comm` has the same
    /// size, otherwise the unpacked set serves its global accessors only.
    pub fn unpack(s: &mut Serializer, comm: ProcessGroup) -> Result<Self, Error> {
        let vk = Vector3::new(s.unpack_f64(), s.unpack_f64(), s.unpack_f64());
        let cutoff = s.unpack_f64();
        let mut lattice = Matrix3::zeros();
        for i in 0..9 {
            lattice[i] = s.unpack_f64();
        }
        let reduced = s.unpack_bool();
        let bare = s.unpack_bool();
        let grid = FftGrid3::new([s.unpack_usize(), s.unpack_usize(), s.unpack_usize()])?;
        let num_gvec = s.unpack_usize();
        let num_columns = s.unpack_usize();
        let mut columns = Vec::with_capacity(num_columns);
        for _ in 0..num_columns {
            let x = s.unpack_i32();
            let y = s.unpack_i32();
            let z = s.unpack_i32_vec();
            columns.push(ZColumn::new(x, y, z));
        }
        let num_entries = s.unpack_usize();
        let mut forward = Vec::with_capacity(num_entries);
        for _ in 0..num_entries {
            let column = s.unpack_u32();
            let z_index = s.unpack_u32();
            forward.push(GvecIndexEntry { column, z_index });
        }
        let gvec_distr = BlockDistribution::from_counts(s.unpack_usize_vec());
        let zcol_distr = BlockDistribution::from_counts(s.unpack_usize_vec());
        let shells = s.unpack_usize_vec();
        let shell_len = s.unpack_f64_vec();
        let base_mapping = s.unpack_usize_vec();

        let by_xy = build_xy_table(&columns, &grid)?;
        let mut set = GvecSet {
            vk,
            cutoff,
            lattice,
            comm,
            reduced,
            bare,
            grid,
            num_gvec,
            columns,
            forward,
            by_xy,
            gvec_distr,
            zcol_distr,
            shells,
            shell_len,
            base_mapping,
            gvec_cart: Vec::new(),
            gkvec_cart: Vec::new(),
        };
        if set.gvec_distr.num_ranks() == set.comm.size() {
            set.init_cartesian_caches();
        }
        Ok(set)
    }

    /// Transfer the full state of this set from rank `source` to rank
    /// `dest` of `comm`, which may be a different group than the one the
    /// set was built on. Returns the received set on `dest`, `None`
    /// elsewhere.
    pub fn send_recv(
        &self,
        comm: &ProcessGroup,
        source: usize,
        dest: usize,
    ) -> Result<Option<GvecSet>, Error> {
        let mut s = Serializer::new();
        if comm.rank() == source {
            self.pack(&mut s);
        }
        s.send_recv(comm, source, dest);
        if comm.rank() == dest {
            Ok(Some(GvecSet::unpack(&mut s, comm.clone())?))
        } else {
            Ok(None)
        }
    }
}
