#[cfg(test)]
mod _tests_process_group {
    use crate::comm::{run_local, ProcessGroup};

    #[test]
    fn test_solo_basics() {
        let group = ProcessGroup::solo();
        assert_eq!(group.rank(), 0);
        assert_eq!(group.size(), 1);
        group.barrier();

        let mut totals = [3usize, 7];
        group.allreduce_sum(&mut totals);
        assert_eq!(totals, [3, 7]);

        let gathered = group.allgatherv(&[1, 2, 3]);
        assert_eq!(gathered, vec![1, 2, 3]);
    }

    #[test]
    fn test_all_exchange_orders_by_rank() {
        let results = run_local(4, |group| {
            let contributions = group.all_exchange(group.rank() * 10);
            contributions.iter().map(|c| **c).collect::<Vec<_>>()
        });
        for per_rank in results {
            assert_eq!(per_rank, vec![0, 10, 20, 30]);
        }
    }

    #[test]
    fn test_allreduce_sum_replicates() {
        let results = run_local(3, |group| {
            let mut data = vec![group.rank() as i64, 1];
            group.allreduce_sum(&mut data);
            data
        });
        for data in results {
            assert_eq!(data, vec![3, 3]);
        }
    }

    #[test]
    fn test_allgather_in_place_fills_every_slice() {
        let results = run_local(3, |group| {
            // Rank r owns slots [2r, 2r+2) of a shared layout of length 6.
            let mut buf = vec![0usize; 6];
            let offset = 2 * group.rank();
            buf[offset] = group.rank() + 1;
            buf[offset + 1] = 10 * (group.rank() + 1);
            group.allgather_in_place(&mut buf, offset, 2);
            buf
        });
        for buf in results {
            assert_eq!(buf, vec![1, 10, 2, 20, 3, 30]);
        }
    }

    #[test]
    fn test_alltoallv_transposes() {
        // Rank q sends the single value q*10 + p to every rank p; rank p must
        // end up with [p, 10 + p, 20 + p].
        let results = run_local(3, |group| {
            let q = group.rank();
            let send: Vec<usize> = (0..3).map(|p| q * 10 + p).collect();
            let counts = vec![1usize; 3];
            let offsets = vec![0usize, 1, 2];
            let mut recv = vec![0usize; 3];
            group.alltoallv(&send, &counts, &offsets, &mut recv, &counts, &offsets);
            recv
        });
        for (p, recv) in results.into_iter().enumerate() {
            assert_eq!(recv, vec![p, 10 + p, 20 + p]);
        }
    }

    #[test]
    fn test_send_recv_bytes() {
        let results = run_local(2, |group| {
            if group.rank() == 0 {
                group.send_bytes(1, vec![1, 2, 3]);
                Vec::new()
            } else {
                group.recv_bytes(0)
            }
        });
        assert_eq!(results[1], vec![1, 2, 3]);
    }

    #[test]
    fn test_split_into_rows_and_columns() {
        // 4 ranks as a 2x2 grid: rows group ranks {0,1} and {2,3}, columns
        // group ranks {0,2} and {1,3}.
        let results = run_local(4, |group| {
            let row = group.split(group.rank() / 2, group.rank() % 2);
            let col = group.split(group.rank() % 2, group.rank() / 2);

            // Sum of parent ranks inside each sub-group identifies it.
            let mut row_sum = [group.rank()];
            row.allreduce_sum(&mut row_sum);
            let mut col_sum = [group.rank()];
            col.allreduce_sum(&mut col_sum);
            (row.rank(), row.size(), row_sum[0], col.rank(), col.size(), col_sum[0])
        });
        let expected = [
            (0, 2, 1, 0, 2, 2),
            (1, 2, 1, 0, 2, 4),
            (0, 2, 5, 1, 2, 2),
            (1, 2, 5, 1, 2, 4),
        ];
        for (got, want) in results.into_iter().zip(expected) {
            assert_eq!(got, want);
        }
    }

    #[test]
    fn test_consecutive_collectives_stay_ordered() {
        let results = run_local(2, |group| {
            let mut seen = Vec::new();
            for round in 0..8 {
                let all = group.all_exchange(round * 2 + group.rank());
                seen.push(all.iter().map(|v| **v).collect::<Vec<_>>());
            }
            seen
        });
        for per_rank in results {
            for (round, all) in per_rank.into_iter().enumerate() {
                assert_eq!(all, vec![round * 2, round * 2 + 1]);
            }
        }
    }
}
