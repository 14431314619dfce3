//! Shell-complete repartitioning of a G-vector set.
//!
//! Symmetrization rotates G-vectors within their shells, so the rank that
//! symmetrizes a vector must also hold every other member of the vector's
//! shell. This view remaps the default distribution, which balances columns
//! and vector counts, to one where shell ids are dealt round-robin over the
//! ranks and every rank holds complete shells. The remap tables are built
//! without communication from the replicated set description; only the
//! payload exchanges are collective.

use std::collections::HashMap;

use anyhow::Error;
use log::debug;
use nalgebra::Vector3;

use crate::comm::ProcessGroup;
use crate::distribution::{BlockCyclic, BlockDistribution};
use crate::gvec::GvecSet;

pub struct GvecShellRemap<'a> {
    gvec: &'a GvecSet,
    comm: ProcessGroup,
    /// Round-robin owner map over shell ids.
    shell_owner: BlockCyclic,
    /// Per-destination counts of the calling rank's outgoing vectors.
    send: BlockDistribution,
    /// Per-source counts of the calling rank's incoming vectors.
    recv: BlockDistribution,
    /// G-vectors held by the calling rank in the shell-complete layout.
    gvec_remapped: Vec<Vector3<i32>>,
    /// Shell id per remapped local vector.
    shell_remapped: Vec<usize>,
    /// Local reverse lookup in the remapped layout.
    index_by_gvec: HashMap<Vector3<i32>, usize>,
}

impl<'a> GvecShellRemap<'a> {
    pub fn new(gvec: &'a GvecSet) -> Result<Self, Error> {
        if !gvec.bare() {
            return Err(Error::msg(
                "shell remapping needs a bare G-vector set; shifted sets carry no shells",
            ));
        }
        let comm = gvec.comm().clone();
        let shell_owner = BlockCyclic::new(comm.size());

        // Outgoing side: where each locally held vector's shell now lives.
        let mut send_counts = vec![0usize; comm.size()];
        for igloc in 0..gvec.count() {
            let shell = gvec.shell(gvec.offset() + igloc);
            send_counts[shell_owner.owner(shell)] += 1;
        }
        let send = BlockDistribution::from_counts(send_counts);
        if send.total() != gvec.count() {
            return Err(Error::msg(
                "wrong number of G-vectors on the sending side of the shell remap",
            ));
        }

        // Incoming side: walk every rank's range and keep what is now ours.
        // Together with the pass above this yields exact symmetric exchange
        // tables without any communication.
        let mut recv_counts = vec![0usize; comm.size()];
        for rank in 0..comm.size() {
            for igloc in 0..gvec.gvec_count(rank) {
                let shell = gvec.shell(gvec.gvec_offset(rank) + igloc);
                if shell_owner.owner(shell) == comm.rank() {
                    recv_counts[rank] += 1;
                }
            }
        }
        let recv = BlockDistribution::from_counts(recv_counts);

        // Collective sanity check on the remapped total.
        let mut total = [recv.total()];
        comm.allreduce_sum(&mut total);
        if total[0] != gvec.num_gvec() {
            return Err(Error::msg(format!(
                "wrong number of G-vectors after the shell remap: {} of {}",
                total[0],
                gvec.num_gvec()
            )));
        }

        // The local piece of the shell-complete layout, ordered by source
        // rank exactly as the forward exchange delivers it.
        let mut gvec_remapped = vec![Vector3::new(0, 0, 0); recv.total()];
        let mut shell_remapped = vec![0usize; recv.total()];
        let mut filled = vec![0usize; comm.size()];
        for rank in 0..comm.size() {
            for igloc in 0..gvec.gvec_count(rank) {
                let ig = gvec.gvec_offset(rank) + igloc;
                let shell = gvec.shell(ig);
                if shell_owner.owner(shell) == comm.rank() {
                    let slot = recv.offset(rank) + filled[rank];
                    gvec_remapped[slot] = gvec.gvec(ig);
                    shell_remapped[slot] = shell;
                    filled[rank] += 1;
                }
            }
        }

        let index_by_gvec = gvec_remapped
            .iter()
            .enumerate()
            .map(|(i, g)| (*g, i))
            .collect();

        debug!(
            "shell remap: rank {} holds {} vectors of {} shells",
            comm.rank(),
            recv.total(),
            gvec.num_shells()
        );
        Ok(GvecShellRemap {
            gvec,
            comm,
            shell_owner,
            send,
            recv,
            gvec_remapped,
            shell_remapped,
            index_by_gvec,
        })
    }

    pub fn gvec(&self) -> &GvecSet {
        self.gvec
    }

    /// Local number of G-vectors in the shell-complete layout.
    pub fn gvec_count_remapped(&self) -> usize {
        self.recv.total()
    }

    /// G-vector by local index in the shell-complete layout.
    pub fn gvec_remapped(&self, igloc: usize) -> Vector3<i32> {
        self.gvec_remapped[igloc]
    }

    /// Shell id by local index in the shell-complete layout.
    pub fn shell_remapped(&self, igloc: usize) -> usize {
        self.shell_remapped[igloc]
    }

    /// Local index of a G-vector in the shell-complete layout, without any
    /// communication; `None` if the calling rank does not hold it.
    pub fn index_by_gvec(&self, g: &Vector3<i32>) -> Option<usize> {
        self.index_by_gvec.get(g).copied()
    }

    /// Move a per-vector payload from the default layout into the
    /// shell-complete layout.
    pub fn remap_forward<T>(&self, data: &[T]) -> Vec<T>
    where
        T: Clone + Default + Send + Sync + 'static,
    {
        assert_eq!(data.len(), self.gvec.count());
        let mut send_buf = vec![T::default(); self.gvec.count()];
        let mut filled = vec![0usize; self.comm.size()];
        for igloc in 0..self.gvec.count() {
            let shell = self.gvec.shell(self.gvec.offset() + igloc);
            let dest = self.shell_owner.owner(shell);
            send_buf[self.send.offset(dest) + filled[dest]] = data[igloc].clone();
            filled[dest] += 1;
        }
        let mut recv_buf = vec![T::default(); self.gvec_count_remapped()];
        self.comm.alltoallv(
            &send_buf,
            self.send.counts(),
            self.send.offsets(),
            &mut recv_buf,
            self.recv.counts(),
            self.recv.offsets(),
        );
        recv_buf
    }

    /// Move a payload in the shell-complete layout back into the default
    /// layout. The exact inverse permutation of
    /// [`GvecShellRemap::remap_forward`].
    pub fn remap_backward<T>(&self, buf: &[T], data: &mut [T])
    where
        T: Clone + Default + Send + Sync + 'static,
    {
        assert_eq!(buf.len(), self.gvec_count_remapped());
        assert_eq!(data.len(), self.gvec.count());
        let mut recv_buf = vec![T::default(); self.gvec.count()];
        self.comm.alltoallv(
            buf,
            self.recv.counts(),
            self.recv.offsets(),
            &mut recv_buf,
            self.send.counts(),
            self.send.offsets(),
        );
        let mut filled = vec![0usize; self.comm.size()];
        for igloc in 0..self.gvec.count() {
            let shell = self.gvec.shell(self.gvec.offset() + igloc);
            let source = self.shell_owner.owner(shell);
            data[igloc] = recv_buf[self.send.offset(source) + filled[source]].clone();
            filled[source] += 1;
        }
    }
}
