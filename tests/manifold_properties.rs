//! Randomized property tests for the pose manifold types

use approx::assert_relative_eq;
use nalgebra::SVector;
use pose_filters::geometry::{PoseManifold, PoseSE2, PoseSE3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use std::f64::consts::PI;

fn random_tangent<const D: usize>(rng: &mut StdRng, scale: f64) -> SVector<f64, D> {
    SVector::from_fn(|_, _| rng.random_range(-scale..scale))
}

/// Rotation components stay below pi so the logarithm's principal branch
/// recovers the input exactly.
fn random_se2(rng: &mut StdRng) -> PoseSE2 {
    PoseSE2::exp(&random_tangent::<3>(rng, 2.0))
}

fn random_se3(rng: &mut StdRng) -> PoseSE3 {
    PoseSE3::exp(&random_tangent::<6>(rng, 1.0))
}

#[test]
fn se2_exp_log_round_trip() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..200 {
        let tangent = random_tangent::<3>(&mut rng, 2.0);
        let recovered = PoseSE2::exp(&tangent).log();
        assert_relative_eq!(recovered, tangent, epsilon = 1e-9);
    }
}

#[test]
fn se3_exp_log_round_trip() {
    let mut rng = StdRng::seed_from_u64(13);
    for _ in 0..200 {
        let tangent = random_tangent::<6>(&mut rng, 1.0);
        let recovered = PoseSE3::exp(&tangent).log();
        assert_relative_eq!(recovered, tangent, epsilon = 1e-9);
    }
}

#[test]
fn se2_log_rewraps_large_angles() {
    let pose = PoseSE2::new(0.0, 0.0, 3.5);
    assert_relative_eq!(pose.log()[2], 3.5 - 2.0 * PI, epsilon = 1e-12);
}

#[test]
fn se2_group_laws() {
    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..100 {
        let a = random_se2(&mut rng);
        let b = random_se2(&mut rng);
        let c = random_se2(&mut rng);

        // associativity
        let ab_c = a.compose(&b).compose(&c);
        let a_bc = a.compose(&b.compose(&c));
        assert_relative_eq!(ab_c.to_matrix(), a_bc.to_matrix(), epsilon = 1e-9);

        // inverse laws
        assert!(a.compose(&a.inverse()).log().norm() < 1e-9);
        assert_relative_eq!(
            a.inverse().inverse().to_matrix(),
            a.to_matrix(),
            epsilon = 1e-9
        );
    }
}

#[test]
fn se3_group_laws() {
    let mut rng = StdRng::seed_from_u64(19);
    for _ in 0..100 {
        let a = random_se3(&mut rng);
        let b = random_se3(&mut rng);
        let c = random_se3(&mut rng);

        let ab_c = a.compose(&b).compose(&c);
        let a_bc = a.compose(&b.compose(&c));
        assert_relative_eq!(ab_c.to_matrix(), a_bc.to_matrix(), epsilon = 1e-9);

        assert!(a.compose(&a.inverse()).log().norm() < 1e-9);
        assert_relative_eq!(
            a.inverse().inverse().to_matrix(),
            a.to_matrix(),
            epsilon = 1e-9
        );
    }
}

#[test]
fn adjoint_transport_matches_conjugation() {
    // The adjoint convention: p · Exp(v) · p⁻¹ == Exp(adjoint(p) · v).
    // This is an exact group identity, not a linearization, so it must hold
    // for arbitrary tangent magnitudes within numerical tolerance.
    let mut rng = StdRng::seed_from_u64(23);
    for _ in 0..100 {
        let p2 = random_se2(&mut rng);
        let v2 = random_tangent::<3>(&mut rng, 1.0);
        let lhs = p2 * PoseSE2::exp(&v2) * p2.inverse();
        let rhs = PoseSE2::exp(&(p2.adjoint() * v2));
        assert_relative_eq!(lhs.to_matrix(), rhs.to_matrix(), epsilon = 1e-8);

        let p3 = random_se3(&mut rng);
        let v3 = random_tangent::<6>(&mut rng, 0.8);
        let lhs = p3 * PoseSE3::exp(&v3) * p3.inverse();
        let rhs = PoseSE3::exp(&(p3.adjoint() * v3));
        assert_relative_eq!(lhs.to_matrix(), rhs.to_matrix(), epsilon = 1e-8);
    }
}

#[test]
fn adjoint_of_inverse_is_inverse_of_adjoint() {
    let mut rng = StdRng::seed_from_u64(29);
    for _ in 0..50 {
        let pose = random_se3(&mut rng);
        let product = pose.adjoint() * pose.inverse().adjoint();
        assert_relative_eq!(
            product,
            nalgebra::SMatrix::<f64, 6, 6>::identity(),
            epsilon = 1e-9
        );
    }
}

#[test]
fn planar_spatial_round_trip() {
    let mut rng = StdRng::seed_from_u64(31);
    for _ in 0..100 {
        let planar = random_se2(&mut rng);
        let recovered = PoseSE2::from_se3(&PoseSE3::from_se2(&planar));
        assert_relative_eq!(recovered.to_vector(), planar.to_vector(), epsilon = 1e-10);
    }
}

#[test]
fn ground_plane_projection_drops_out_of_plane_motion() {
    let pose = PoseSE3::from_parts(
        nalgebra::Vector3::new(1.0, 2.0, 5.0),
        nalgebra::UnitQuaternion::from_axis_angle(&nalgebra::Vector3::z_axis(), 0.4),
    );
    let projected = PoseSE2::from_se3(&pose);

    assert_relative_eq!(projected.translation()[0], 1.0, epsilon = 1e-12);
    assert_relative_eq!(projected.translation()[1], 2.0, epsilon = 1e-12);
    assert_relative_eq!(projected.angle(), 0.4, epsilon = 1e-12);
}

#[test]
fn vector_round_trips() {
    let mut rng = StdRng::seed_from_u64(37);
    for _ in 0..50 {
        let planar = random_se2(&mut rng);
        let recovered = PoseSE2::from_vector(planar.to_vector().as_slice()).unwrap();
        assert_relative_eq!(recovered.to_vector(), planar.to_vector(), epsilon = 1e-12);

        let spatial = random_se3(&mut rng);
        let recovered = PoseSE3::from_vector(spatial.to_vector().as_slice()).unwrap();
        assert_relative_eq!(recovered.to_matrix(), spatial.to_matrix(), epsilon = 1e-12);
    }
}
