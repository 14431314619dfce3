#[cfg(test)]
mod _tests_gvec_set {
    use crate::comm::{run_local, ProcessGroup};
    use crate::gvec::GvecSet;
    use nalgebra::{Matrix3, Vector3};

    const TOL: f64 = 1e-10;

    // Helper function to create a simple cubic reciprocal lattice
    fn create_simple_cubic(a: f64) -> Matrix3<f64> {
        Matrix3::new(
            a, 0.0, 0.0,
            0.0, a, 0.0,
            0.0, 0.0, a,
        )
    }

    #[test]
    fn test_origin_only_set() {
        // Cutoff below the shortest reciprocal vector: the set is the zero
        // vector alone.
        let set = GvecSet::solo(create_simple_cubic(1.0), 0.5, false).unwrap();
        assert_eq!(set.num_gvec(), 1);
        assert_eq!(set.gvec(0), Vector3::new(0, 0, 0));
        assert_eq!(set.num_shells(), 1);
        assert!(set.shell_len(0).abs() < TOL);
        assert_eq!(set.count(), 1);
        assert_eq!(set.offset(), 0);
    }

    #[test]
    fn test_index_roundtrip_covers_the_whole_set() {
        let set = GvecSet::solo(create_simple_cubic(1.0), 3.3, false).unwrap();
        assert!(set.num_gvec() > 100);
        for ig in 0..set.num_gvec() {
            let g = set.gvec(ig);
            assert_eq!(set.index_by_gvec(&g), Some(ig));
        }
        // Vectors outside the sphere resolve to nothing.
        assert_eq!(set.index_by_gvec(&Vector3::new(50, 0, 0)), None);
    }

    #[test]
    fn test_cartesian_caches_match_direct_computation() {
        let lattice = Matrix3::new(
            1.0, -0.5, 0.0,
            0.0, 3.0_f64.sqrt() / 2.0, 0.0,
            0.0, 0.0, 1.4,
        );
        let set = GvecSet::solo(lattice, 2.7, false).unwrap();
        for igloc in 0..set.count() {
            let ig = set.offset() + igloc;
            assert!((set.gvec_cart_local(igloc) - set.gvec_cart_global(ig)).norm() < TOL);
            assert!((set.gkvec_cart_local(igloc) - set.gkvec_cart_global(ig)).norm() < TOL);
        }
    }

    #[test]
    fn test_distribution_sums_and_contiguity() {
        let results = run_local(3, |group| {
            let set = GvecSet::new(create_simple_cubic(1.0), 3.3, group.clone(), false).unwrap();
            let counted: usize = (0..group.size()).map(|r| set.gvec_count(r)).sum();
            assert_eq!(counted, set.num_gvec());
            let columns: usize = (0..group.size()).map(|r| set.zcol_count(r)).sum();
            assert_eq!(columns, set.num_zcols());
            for rank in 0..group.size() - 1 {
                assert_eq!(
                    set.gvec_offset(rank) + set.gvec_count(rank),
                    set.gvec_offset(rank + 1)
                );
            }
            assert!(set.count() > 0);
            (set.num_gvec(), set.count(), set.skip_g0())
        });
        // Every rank agrees on the global total and owns a non-trivial part.
        let total = results[0].0;
        let held: usize = results.iter().map(|r| r.1).sum();
        assert_eq!(held, total);
        assert_eq!(results[0].2, 1);
        assert_eq!(results[1].2, 0);
    }

    #[test]
    fn test_reduced_set_drops_negative_z_on_the_zero_stick() {
        let results = run_local(2, |group| {
            let set = GvecSet::new(create_simple_cubic(1.0), 1.5, group, true).unwrap();
            assert_eq!(set.index_by_gvec(&Vector3::new(0, 0, -1)), None);
            assert!(set.index_by_gvec(&Vector3::new(0, 0, 1)).is_some());
            // The (0, 0) column holds no negative frequency anywhere.
            for column in set.z_columns() {
                if column.x == 0 && column.y == 0 {
                    assert!(column.z.iter().all(|&z| z >= 0));
                }
            }
            set.num_gvec()
        });
        assert_eq!(results[0], results[1]);
    }

    #[test]
    fn test_conjugate_aware_difference_lookup() {
        let set = GvecSet::solo(create_simple_cubic(1.0), 1.5, true).unwrap();
        let (ig, conjugated) = set
            .index_of_difference(&Vector3::new(0, 0, 0), &Vector3::new(0, 0, 1))
            .unwrap();
        assert!(conjugated);
        assert_eq!(set.gvec(ig), Vector3::new(0, 0, 1));

        let (ig, conjugated) = set
            .index_of_difference(&Vector3::new(0, 0, 1), &Vector3::new(0, 0, 0))
            .unwrap();
        assert!(!conjugated);
        assert_eq!(set.gvec(ig), Vector3::new(0, 0, 1));

        assert!(set
            .index_of_difference(&Vector3::new(40, 0, 0), &Vector3::new(0, 0, 0))
            .is_err());
    }

    #[test]
    fn test_base_set_forms_a_prefix_on_a_single_rank() {
        let base = GvecSet::solo(create_simple_cubic(1.0), 2.0, false).unwrap();
        let fine = GvecSet::with_base(3.0, &base).unwrap();
        assert!(fine.num_gvec() > base.num_gvec());
        for icol in 0..base.num_zcols() {
            assert_eq!(base.zcol(icol).x, fine.zcol(icol).x);
            assert_eq!(base.zcol(icol).y, fine.zcol(icol).y);
        }
        for igloc in 0..base.count() {
            let g = base.gvec(base.offset() + igloc);
            assert_eq!(fine.gvec(fine.offset() + fine.base_mapping(igloc)), g);
        }
    }

    #[test]
    fn test_base_set_keeps_rank_assignment_across_ranks() {
        run_local(2, |group| {
            let base = GvecSet::new(create_simple_cubic(1.0), 2.0, group.clone(), false).unwrap();
            let fine = GvecSet::with_base(3.0, &base).unwrap();
            // Per rank, the derived column range starts with the base
            // columns of that rank, in base order.
            for rank in 0..group.size() {
                for i in 0..base.zcol_count(rank) {
                    let coarse = base.zcol(base.zcol_offset(rank) + i);
                    let refined = fine.zcol(fine.zcol_offset(rank) + i);
                    assert_eq!((coarse.x, coarse.y), (refined.x, refined.y));
                }
            }
            // Every base vector is reachable locally through the mapping.
            for igloc in 0..base.count() {
                let g = base.gvec(base.offset() + igloc);
                assert_eq!(fine.gvec(fine.offset() + fine.base_mapping(igloc)), g);
            }
        });
    }

    #[test]
    fn test_shifted_set_has_no_shells() {
        let vk = Vector3::new(0.1, 0.2, -0.3);
        let set = GvecSet::with_k_shift(vk, create_simple_cubic(1.0), 2.0, ProcessGroup::solo(), false)
            .unwrap();
        assert!(!set.bare());
        assert_eq!(set.num_shells(), 0);
        for ig in 0..set.num_gvec() {
            let g = set.gvec(ig).map(f64::from);
            assert!((set.gkvec(ig) - (g + vk)).norm() < TOL);
            assert!(set.gkvec_cart_global(ig).norm() <= 2.0 + TOL);
        }
    }

    #[test]
    fn test_shifted_set_can_be_empty() {
        let vk = Vector3::new(0.5, 0.5, 0.5);
        let result = GvecSet::with_k_shift(vk, create_simple_cubic(1.0), 0.1, ProcessGroup::solo(), false);
        assert!(result.is_err());
    }

    #[test]
    fn test_metric_replacement_rebuilds_caches_only() {
        let mut set = GvecSet::solo(create_simple_cubic(1.0), 2.1, false).unwrap();
        let num_gvec = set.num_gvec();
        let num_zcols = set.num_zcols();
        let first_shell_len = set.shell_len(1);

        set.set_lattice_vectors(create_simple_cubic(0.5));
        set.rebuild_metric_caches().unwrap();

        // The enumeration is untouched; everything metric-derived scales.
        assert_eq!(set.num_gvec(), num_gvec);
        assert_eq!(set.num_zcols(), num_zcols);
        assert!((set.shell_len(1) - 0.5 * first_shell_len).abs() < TOL);
        for ig in 0..set.num_gvec() {
            assert_eq!(set.index_by_gvec(&set.gvec(ig)), Some(ig));
        }
        for igloc in 0..set.count() {
            let ig = set.offset() + igloc;
            assert!((set.gvec_cart_local(igloc) - set.gvec_cart_global(ig)).norm() < TOL);
        }
    }
}
