#[cfg(test)]
mod _tests_block_distribution {
    use crate::distribution::{BlockCyclic, BlockDistribution};

    #[test]
    fn test_offsets_are_exclusive_prefix_sums() {
        let distr = BlockDistribution::from_counts(vec![3, 0, 5, 2]);
        assert_eq!(distr.num_ranks(), 4);
        assert_eq!(distr.offsets(), &[0, 3, 3, 8]);
        assert_eq!(distr.total(), 10);
        assert_eq!(distr.count(2), 5);
        assert_eq!(distr.offset(3), 8);
    }

    #[test]
    fn test_round_robin_owner() {
        let cyclic = BlockCyclic::new(3);
        let owners: Vec<usize> = (0..7).map(|i| cyclic.owner(i)).collect();
        assert_eq!(owners, vec![0, 1, 2, 0, 1, 2, 0]);
        assert_eq!(cyclic.num_ranks(), 3);
    }
}
