//! Greedy assignment of z-columns to ranks.

use anyhow::Error;

use crate::distribution::BlockDistribution;
use crate::gvec::gvec_set::GvecSet;
use crate::gvec::ZColumn;

pub(crate) struct ColumnDistribution {
    /// Columns regrouped contiguously by owning rank.
    pub columns: Vec<ZColumn>,
    /// Per-rank G-vector counts and offsets.
    pub gvec_distr: BlockDistribution,
    /// Per-rank z-column counts and offsets.
    pub zcol_distr: BlockDistribution,
}

/// Distribute the columns found by the scan over `num_ranks` workers.
///
/// Columns replayed from a base set copy the base assignment, which is what
/// keeps local indices of the two sets compatible without communication.
/// The remaining columns (already sorted largest-first) go through a greedy
/// round-based pool: each round every rank receives exactly one column, in
/// order of smallest running G-vector tally, ties to the lowest rank id.
pub(crate) fn distribute_z_columns(
    columns: Vec<ZColumn>,
    num_gvec: usize,
    num_ranks: usize,
    base: Option<&GvecSet>,
) -> Result<ColumnDistribution, Error> {
    let mut gvec_counts = vec![0usize; num_ranks];
    let mut zcol_counts = vec![0usize; num_ranks];
    let mut per_rank: Vec<Vec<ZColumn>> = vec![Vec::new(); num_ranks];

    if let Some(base) = base {
        for rank in 0..num_ranks {
            for i in 0..base.zcol_count(rank) {
                let icol = base.zcol_offset(rank) + i;
                zcol_counts[rank] += 1;
                gvec_counts[rank] += columns[icol].len();
                per_rank[rank].push(columns[icol].clone());
            }
        }
    }

    let assigned = base.map_or(0, GvecSet::num_zcols);
    let mut pool: Vec<usize> = Vec::new();
    for column in &columns[assigned..] {
        if pool.is_empty() {
            pool = (0..num_ranks).collect();
        }
        let (position, &rank) = pool
            .iter()
            .enumerate()
            .min_by_key(|&(_, &r)| gvec_counts[r])
            .expect("rank pool cannot be empty");
        zcol_counts[rank] += 1;
        gvec_counts[rank] += column.len();
        per_rank[rank].push(column.clone());
        pool.remove(position);
    }

    let gvec_distr = BlockDistribution::from_counts(gvec_counts);
    let zcol_distr = BlockDistribution::from_counts(zcol_counts);
    if gvec_distr.total() != num_gvec {
        return Err(Error::msg(format!(
            "wrong number of G-vectors after distribution: {} assigned, {} found",
            gvec_distr.total(),
            num_gvec
        )));
    }

    let mut regrouped = Vec::with_capacity(columns.len());
    for rank_columns in per_rank {
        regrouped.extend(rank_columns);
    }

    Ok(ColumnDistribution {
        columns: regrouped,
        gvec_distr,
        zcol_distr,
    })
}
