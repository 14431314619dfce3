//! Grouping of G-vectors into shells of equal length.
//!
//! Two passes. The first walks every unassigned G-vector and tags all images
//! under the lattice point group (of the vector and of its negative, since a
//! reduced set stores only one member of each inversion pair) with a common
//! shell id. The result is physically meaningful but may be imprecise: the
//! second pass reclassifies every vector purely by its quantized length and
//! is authoritative. Both passes work over plain arrays; nothing is updated
//! incrementally.

use anyhow::Error;

use crate::config::{SHELL_LENGTH_QUANTUM, SHELL_LENGTH_TOLERANCE, SYMMETRY_TOLERANCE};
use crate::gvec::gvec_set::GvecSet;
use crate::symmetries::find_lattice_symmetries;

pub(crate) struct ShellClassification {
    /// Shell id per global G-vector index.
    pub shells: Vec<usize>,
    /// Representative length per shell, ascending.
    pub shell_len: Vec<f64>,
}

pub(crate) fn classify_shells(set: &GvecSet) -> Result<ShellClassification, Error> {
    let rotations = find_lattice_symmetries(set.lattice_vectors(), SYMMETRY_TOLERANCE);
    let num_gvec = set.num_gvec();

    // Pass 1: sweep the symmetry images. Later sweeps may re-tag a vector
    // that an earlier orbit already touched; the length pass below settles
    // the final grouping.
    let mut shells: Vec<i64> = vec![-1; num_gvec];
    let mut num_shells = 0usize;
    for ig in 0..num_gvec {
        if shells[ig] >= 0 {
            continue;
        }
        let g = set.gvec(ig);
        for rotation in &rotations {
            let image = rotation * g;
            let found = set
                .index_by_gvec(&image)
                .or_else(|| set.index_by_gvec(&(rotation * (-g))));
            if let Some(ig1) = found {
                shells[ig1] = num_shells as i64;
            }
        }
        num_shells += 1;
    }
    if shells.iter().any(|&s| s < 0) {
        return Err(Error::msg("G-vector left without a shell assignment"));
    }

    // Representative lengths, checked for agreement inside each shell.
    let mut shell_len = vec![-1.0f64; num_shells];
    for ig in 0..num_gvec {
        let length = set.gvec_cart_global(ig).norm();
        let shell = shells[ig] as usize;
        if shell_len[shell] < 0.0 {
            shell_len[shell] = length;
        } else if (shell_len[shell] - length).abs() > SHELL_LENGTH_TOLERANCE {
            return Err(Error::msg(format!(
                "wrong G-vector length in shell {}: shell length {}, vector {} has length {}",
                shell, shell_len[shell], ig, length
            )));
        }
    }

    // Pass 2: authoritative reclassification by quantized shell length.
    let mut ordered: Vec<(u64, usize)> = (0..num_gvec)
        .map(|ig| {
            let quantized = (shell_len[shells[ig] as usize] / SHELL_LENGTH_QUANTUM) as u64;
            (quantized, ig)
        })
        .collect();
    ordered.sort_unstable();

    let mut final_shells = vec![0usize; num_gvec];
    let mut final_len = Vec::new();
    for (i, &(quantized, ig)) in ordered.iter().enumerate() {
        if i == 0 || quantized != ordered[i - 1].0 {
            final_len.push(quantized as f64 * SHELL_LENGTH_QUANTUM);
        }
        final_shells[ig] = final_len.len() - 1;
    }

    for ig in 0..num_gvec {
        let length = set.gvec_cart_global(ig).norm();
        let shell = final_shells[ig];
        if (final_len[shell] - length).abs() > SHELL_LENGTH_TOLERANCE {
            return Err(Error::msg(format!(
                "wrong G-vector length in shell {}: shell length {}, vector {} has length {}",
                shell, final_len[shell], ig, length
            )));
        }
    }

    Ok(ShellClassification {
        shells: final_shells,
        shell_len: final_len,
    })
}
