#[cfg(test)]
mod _tests_shell_remap {
    use crate::comm::ProcessGroup;
    use crate::comm::run_local;
    use crate::distribution::{BlockCyclic, GvecShellRemap};
    use crate::gvec::GvecSet;
    use nalgebra::{Matrix3, Vector3};

    fn encode(g: Vector3<i32>) -> f64 {
        f64::from(g.x * 100 + g.y * 10 + g.z)
    }

    #[test]
    fn test_each_rank_holds_complete_shells() {
        let totals = run_local(3, |group| {
            let set = GvecSet::new(Matrix3::identity(), 2.05, group.clone(), false).unwrap();
            let remap = GvecShellRemap::new(&set).unwrap();
            let owner = BlockCyclic::new(group.size());
            for igloc in 0..remap.gvec_count_remapped() {
                // Every held vector's shell belongs to this rank, so no
                // shell is split between ranks.
                assert_eq!(owner.owner(remap.shell_remapped(igloc)), group.rank());
                // The local hash lookup resolves without communication.
                let g = remap.gvec_remapped(igloc);
                assert_eq!(remap.index_by_gvec(&g), Some(igloc));
                // Shell ids agree with the base set.
                let ig = set.index_by_gvec(&g).unwrap();
                assert_eq!(set.shell(ig), remap.shell_remapped(igloc));
            }
            assert_eq!(remap.index_by_gvec(&Vector3::new(77, 0, 0)), None);
            remap.gvec_count_remapped()
        });
        let held: usize = totals.iter().sum();
        assert_eq!(held, 33);
    }

    #[test]
    fn test_forward_delivers_by_remapped_vector() {
        run_local(2, |group| {
            let set = GvecSet::new(Matrix3::identity(), 2.05, group.clone(), false).unwrap();
            let remap = GvecShellRemap::new(&set).unwrap();
            let data: Vec<f64> = (0..set.count())
                .map(|igloc| encode(set.gvec(set.offset() + igloc)))
                .collect();
            let remapped = remap.remap_forward(&data);
            assert_eq!(remapped.len(), remap.gvec_count_remapped());
            for (igloc, value) in remapped.iter().enumerate() {
                assert_eq!(*value, encode(remap.gvec_remapped(igloc)));
            }
        });
    }

    #[test]
    fn test_backward_is_the_exact_inverse_of_forward() {
        run_local(3, |group| {
            let set = GvecSet::new(Matrix3::identity(), 2.4, group.clone(), false).unwrap();
            let remap = GvecShellRemap::new(&set).unwrap();
            let data: Vec<f64> = (0..set.count())
                .map(|igloc| (set.offset() + igloc) as f64 * 1.5 - 7.0)
                .collect();
            let remapped = remap.remap_forward(&data);
            let mut restored = vec![0.0; set.count()];
            remap.remap_backward(&remapped, &mut restored);
            assert_eq!(restored, data);
        });
    }

    #[test]
    fn test_shifted_sets_are_rejected() {
        let set = GvecSet::with_k_shift(
            Vector3::new(0.1, 0.0, 0.0),
            Matrix3::identity(),
            1.5,
            ProcessGroup::solo(),
            false,
        )
        .unwrap();
        assert!(GvecShellRemap::new(&set).is_err());
    }
}
