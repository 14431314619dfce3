#[cfg(test)]
mod _tests_lattice_symmetry {
    use crate::config::SYMMETRY_TOLERANCE;
    use crate::symmetries::find_lattice_symmetries;
    use nalgebra::Matrix3;

    #[test]
    fn test_cubic_point_group_has_48_operations() {
        let lattice = Matrix3::identity();
        let ops = find_lattice_symmetries(&lattice, SYMMETRY_TOLERANCE);
        assert_eq!(ops.len(), 48);
    }

    #[test]
    fn test_tetragonal_point_group_has_16_operations() {
        let lattice = Matrix3::new(
            1.0, 0.0, 0.0,
            0.0, 1.0, 0.0,
            0.0, 0.0, 2.0,
        );
        let ops = find_lattice_symmetries(&lattice, SYMMETRY_TOLERANCE);
        assert_eq!(ops.len(), 16);
    }

    #[test]
    fn test_triclinic_keeps_identity_and_inversion_only() {
        let lattice = Matrix3::new(
            1.0, 0.13, 0.21,
            0.0, 1.37, 0.11,
            0.0, 0.0, 1.71,
        );
        let ops = find_lattice_symmetries(&lattice, SYMMETRY_TOLERANCE);
        assert_eq!(ops.len(), 2);
        assert!(ops.contains(&Matrix3::identity()));
        assert!(ops.contains(&(-Matrix3::<i32>::identity())));
    }

    #[test]
    fn test_every_operation_preserves_the_metric() {
        let lattice = Matrix3::new(
            1.0, -0.5, 0.0,
            0.0, 3.0_f64.sqrt() / 2.0, 0.0,
            0.0, 0.0, 1.6,
        );
        let metric = lattice.transpose() * lattice;
        let ops = find_lattice_symmetries(&lattice, SYMMETRY_TOLERANCE);
        // Hexagonal lattice: 24 point-group operations.
        assert_eq!(ops.len(), 24);
        for rotation in &ops {
            let r = rotation.map(f64::from);
            let transformed = r.transpose() * metric * r;
            assert!((transformed - metric).abs().max() < SYMMETRY_TOLERANCE);
            assert_eq!(r.determinant().round().abs() as i32, 1);
        }
    }
}
