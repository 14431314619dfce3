//! Process group abstraction with collective primitives.
//!
//! A [`ProcessGroup`] is a handle into a fixed-size group of cooperating
//! ranks. Every rank runs the identical deterministic algorithm over its own
//! slice of the data and synchronizes only at collective boundaries, so the
//! group surface is small: rank/size queries, a barrier, sum all-reduce,
//! all-gather, variable-count all-to-all, point-to-point byte transfer, and
//! splitting into sub-groups.
//!
//! Two backends are provided. `solo()` is a trivial single-rank group.
//! `local_world(n)` creates `n` handles that rendezvous through shared
//! memory; each handle is meant to be driven by its own thread (see
//! [`run_local`]), which makes multi-rank behavior fully testable inside one
//! process.
//
// TODO: add an rsmpi-backed variant behind a feature flag so the same call
// sites can run on a real cluster.

use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Condvar, Mutex};

type Slot = Arc<dyn Any + Send + Sync>;

struct RoundState {
    /// Index of the collective round the group is currently accepting.
    round: u64,
    /// Next round each rank will participate in.
    rank_round: Vec<u64>,
    /// Per-rank contributions of the current round.
    slots: Vec<Option<Slot>>,
    posted: usize,
    collected: usize,
    /// Complete contribution set of the current round, once all ranks posted.
    ready: Option<Arc<Vec<Slot>>>,
}

/// Shared rendezvous state of one in-process group.
struct World {
    size: usize,
    state: Mutex<RoundState>,
    advanced: Condvar,
    mail: Mutex<HashMap<(usize, usize), VecDeque<Vec<u8>>>>,
    delivered: Condvar,
}

impl World {
    fn new(size: usize) -> Self {
        World {
            size,
            state: Mutex::new(RoundState {
                round: 0,
                rank_round: vec![0; size],
                slots: vec![None; size],
                posted: 0,
                collected: 0,
                ready: None,
            }),
            advanced: Condvar::new(),
            mail: Mutex::new(HashMap::new()),
            delivered: Condvar::new(),
        }
    }

    /// One collective round: every rank contributes a value and receives the
    /// complete contribution set in rank order. All other collectives are
    /// pure local computation on top of this primitive.
    fn all_exchange(&self, rank: usize, value: Slot) -> Arc<Vec<Slot>> {
        let mut st = self.state.lock().expect("process group state poisoned");
        let my_round = st.rank_round[rank];
        while st.round != my_round {
            st = self.advanced.wait(st).expect("process group state poisoned");
        }
        st.slots[rank] = Some(value);
        st.posted += 1;
        if st.posted == self.size {
            let contributions: Vec<Slot> = st
                .slots
                .iter_mut()
                .map(|s| s.take().expect("missing contribution"))
                .collect();
            st.ready = Some(Arc::new(contributions));
            st.posted = 0;
            self.advanced.notify_all();
        }
        while st.ready.is_none() {
            st = self.advanced.wait(st).expect("process group state poisoned");
        }
        let result = st.ready.as_ref().expect("round result vanished").clone();
        st.rank_round[rank] += 1;
        st.collected += 1;
        if st.collected == self.size {
            st.ready = None;
            st.collected = 0;
            st.round += 1;
            self.advanced.notify_all();
        }
        result
    }

    fn mail_send(&self, source: usize, dest: usize, data: Vec<u8>) {
        let mut mail = self.mail.lock().expect("mailbox poisoned");
        mail.entry((source, dest)).or_default().push_back(data);
        self.delivered.notify_all();
    }

    fn mail_recv(&self, source: usize, dest: usize) -> Vec<u8> {
        let mut mail = self.mail.lock().expect("mailbox poisoned");
        loop {
            if let Some(data) = mail.get_mut(&(source, dest)).and_then(VecDeque::pop_front) {
                return data;
            }
            mail = self.delivered.wait(mail).expect("mailbox poisoned");
        }
    }
}

#[derive(Clone)]
enum Backend {
    Solo {
        loopback: Arc<Mutex<VecDeque<Vec<u8>>>>,
    },
    Shared {
        world: Arc<World>,
        rank: usize,
    },
}

/// Handle of one rank inside a process group.
#[derive(Clone)]
pub struct ProcessGroup {
    backend: Backend,
}

impl ProcessGroup {
    /// A group containing only the calling rank.
    pub fn solo() -> Self {
        ProcessGroup {
            backend: Backend::Solo {
                loopback: Arc::new(Mutex::new(VecDeque::new())),
            },
        }
    }

    /// Create `size` rank handles of one shared in-process group. Each handle
    /// must be driven by its own thread; collectives block until every rank
    /// of the group has entered them.
    pub fn local_world(size: usize) -> Vec<ProcessGroup> {
        assert!(size > 0, "a process group needs at least one rank");
        let world = Arc::new(World::new(size));
        (0..size)
            .map(|rank| ProcessGroup {
                backend: Backend::Shared {
                    world: world.clone(),
                    rank,
                },
            })
            .collect()
    }

    pub fn rank(&self) -> usize {
        match &self.backend {
            Backend::Solo { .. } => 0,
            Backend::Shared { rank, .. } => *rank,
        }
    }

    pub fn size(&self) -> usize {
        match &self.backend {
            Backend::Solo { .. } => 1,
            Backend::Shared { world, .. } => world.size,
        }
    }

    fn exchange_any(&self, value: Slot) -> Vec<Slot> {
        match &self.backend {
            Backend::Solo { .. } => vec![value],
            Backend::Shared { world, rank } => world.all_exchange(*rank, value).to_vec(),
        }
    }

    /// Contribute one value and receive every rank's contribution in rank
    /// order. The building block of all collectives below.
    pub fn all_exchange<T: Send + Sync + 'static>(&self, value: T) -> Vec<Arc<T>> {
        self.exchange_any(Arc::new(value))
            .into_iter()
            .map(|slot| {
                slot.downcast::<T>()
                    .unwrap_or_else(|_| panic!("mismatched value type in a collective exchange"))
            })
            .collect()
    }

    /// Block until every rank of the group has reached this call.
    pub fn barrier(&self) {
        let _ = self.all_exchange(());
    }

    /// Element-wise sum reduction over all ranks, result replicated.
    pub fn allreduce_sum<T>(&self, data: &mut [T])
    where
        T: Copy + Default + std::ops::AddAssign + Send + Sync + 'static,
    {
        if self.size() == 1 {
            return;
        }
        let all = self.all_exchange(data.to_vec());
        for slot in data.iter_mut() {
            *slot = T::default();
        }
        for contribution in &all {
            debug_assert_eq!(contribution.len(), data.len());
            for (acc, value) in data.iter_mut().zip(contribution.iter()) {
                *acc += *value;
            }
        }
    }

    /// Concatenate every rank's slice in rank order, result replicated.
    pub fn allgatherv<T>(&self, local: &[T]) -> Vec<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        if self.size() == 1 {
            return local.to_vec();
        }
        let all = self.all_exchange(local.to_vec());
        all.iter().flat_map(|part| part.iter().cloned()).collect()
    }

    /// In-place all-gather: each rank contributes `buf[offset..offset+count]`
    /// and receives every other rank's contribution at that rank's offset.
    pub fn allgather_in_place<T>(&self, buf: &mut [T], offset: usize, count: usize)
    where
        T: Clone + Send + Sync + 'static,
    {
        if self.size() == 1 {
            debug_assert_eq!(offset, 0);
            debug_assert_eq!(count, buf.len());
            return;
        }
        let all = self.all_exchange((offset, buf[offset..offset + count].to_vec()));
        for part in &all {
            let (part_offset, data) = (part.0, &part.1);
            buf[part_offset..part_offset + data.len()].clone_from_slice(data);
        }
    }

    /// Variable-count all-to-all: rank `q` sends
    /// `send[send_offsets[p]..][..send_counts[p]]` to every rank `p`, which
    /// stores it at `recv[recv_offsets[q]..][..recv_counts[q]]`. The count
    /// tables of sender and receiver must agree.
    #[allow(clippy::too_many_arguments)]
    pub fn alltoallv<T>(
        &self,
        send: &[T],
        send_counts: &[usize],
        send_offsets: &[usize],
        recv: &mut [T],
        recv_counts: &[usize],
        recv_offsets: &[usize],
    ) where
        T: Clone + Send + Sync + 'static,
    {
        let size = self.size();
        assert_eq!(send_counts.len(), size);
        assert_eq!(send_offsets.len(), size);
        assert_eq!(recv_counts.len(), size);
        assert_eq!(recv_offsets.len(), size);
        if size == 1 {
            assert_eq!(send_counts[0], recv_counts[0], "all-to-all count tables disagree");
            recv[recv_offsets[0]..recv_offsets[0] + recv_counts[0]]
                .clone_from_slice(&send[send_offsets[0]..send_offsets[0] + send_counts[0]]);
            return;
        }
        let me = self.rank();
        let all = self.all_exchange((send.to_vec(), send_counts.to_vec(), send_offsets.to_vec()));
        for (sender, part) in all.iter().enumerate() {
            let (data, counts, offsets) = (&part.0, &part.1, &part.2);
            let count = counts[me];
            assert_eq!(count, recv_counts[sender], "all-to-all count tables disagree");
            recv[recv_offsets[sender]..recv_offsets[sender] + count]
                .clone_from_slice(&data[offsets[me]..offsets[me] + count]);
        }
    }

    /// Point-to-point byte transfer towards `dest`.
    pub fn send_bytes(&self, dest: usize, data: Vec<u8>) {
        match &self.backend {
            Backend::Solo { loopback } => {
                assert_eq!(dest, 0, "solo group has a single rank");
                loopback.lock().expect("loopback poisoned").push_back(data);
            }
            Backend::Shared { world, rank } => world.mail_send(*rank, dest, data),
        }
    }

    /// Point-to-point byte transfer from `source`; blocks until delivered.
    pub fn recv_bytes(&self, source: usize) -> Vec<u8> {
        match &self.backend {
            Backend::Solo { loopback } => {
                assert_eq!(source, 0, "solo group has a single rank");
                loopback
                    .lock()
                    .expect("loopback poisoned")
                    .pop_front()
                    .expect("no message pending on the solo loopback")
            }
            Backend::Shared { world, rank } => world.mail_recv(source, *rank),
        }
    }

    /// Partition the group into sub-groups of equal `color`; ranks of one
    /// sub-group are ordered by `key` (ties by parent rank). Collective: all
    /// ranks of the parent group must call with matching round order.
    pub fn split(&self, color: usize, key: usize) -> ProcessGroup {
        if self.size() == 1 {
            return self.clone();
        }
        let memberships = self.all_exchange((color, key));
        let mut members: Vec<(usize, usize)> = memberships
            .iter()
            .enumerate()
            .filter(|(_, m)| m.0 == color)
            .map(|(rank, m)| (m.1, rank))
            .collect();
        members.sort();
        let my_position = members
            .iter()
            .position(|&(_, rank)| rank == self.rank())
            .expect("calling rank missing from its own color group");
        let leader = members[0].1;
        let my_world = if self.rank() == leader {
            Some(Arc::new(World::new(members.len())))
        } else {
            None
        };
        let worlds = self.all_exchange(my_world);
        let world = (*worlds[leader])
            .clone()
            .expect("split leader did not publish a sub-group");
        ProcessGroup {
            backend: Backend::Shared {
                world,
                rank: my_position,
            },
        }
    }
}

/// Run `f` once per rank of a fresh `size`-rank in-process group, each rank
/// on its own thread, and return the per-rank results in rank order.
pub fn run_local<T, F>(size: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(ProcessGroup) -> T + Send + Sync,
{
    let groups = ProcessGroup::local_world(size);
    std::thread::scope(|scope| {
        let f = &f;
        let handles: Vec<_> = groups
            .into_iter()
            .map(|group| scope.spawn(move || f(group)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("rank thread panicked"))
            .collect()
    })
}
