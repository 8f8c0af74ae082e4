use approx::assert_relative_eq;
use nalgebra::Point3;

use crate::prelude::*;

/// A bicubic polynomial patch interpolated on a 4 x 4 grid
fn polynomial_patch() -> NurbsSurface3D<f64> {
    let params = vec![0., 1. / 3., 2. / 3., 1.];
    let points: Vec<Vec<_>> = params
        .iter()
        .map(|u| params.iter().map(|v| patch(*u, *v)).collect())
        .collect();
    NurbsSurface3D::try_interpolate_grid(&points, &params, &params, false, false).unwrap()
}

fn patch(u: f64, v: f64) -> Point3<f64> {
    Point3::new(u, v, u * u * v - 0.5 * v * v * v + 0.25 * u)
}

fn grid(n: usize) -> impl Iterator<Item = (f64, f64)> {
    (0..=n).flat_map(move |i| (0..=n).map(move |j| (i as f64 / n as f64, j as f64 / n as f64)))
}

#[test]
fn grid_interpolation_reproduces_polynomial() {
    let surface = polynomial_patch();
    for (u, v) in grid(10) {
        assert_relative_eq!(surface.point_at(u, v), patch(u, v), epsilon = 1e-10);
    }
}

#[test]
fn transposed_swaps_parameters() {
    let surface = polynomial_patch();
    let transposed = surface.transposed();
    assert_eq!(transposed.u_degree(), surface.v_degree());
    assert_eq!(
        transposed.control_points().len(),
        surface.control_points()[0].len()
    );
    for (u, v) in grid(6) {
        assert_relative_eq!(
            transposed.point_at(v, u),
            surface.point_at(u, v),
            epsilon = 1e-12
        );
    }
}

#[test]
fn degree_elevation_keeps_shape() {
    let surface = polynomial_patch();
    let elevated = surface.try_elevate_degree(5, 4).unwrap();
    assert_eq!(elevated.u_degree(), 5);
    assert_eq!(elevated.v_degree(), 4);
    for (u, v) in grid(8) {
        assert_relative_eq!(
            elevated.point_at(u, v),
            surface.point_at(u, v),
            epsilon = 1e-10
        );
    }
    let untouched = surface.try_elevate_degree(1, 1).unwrap();
    assert_eq!(untouched.u_degree(), 3);
}

#[test]
fn knot_refinement_keeps_shape() {
    let surface = polynomial_patch();
    let refined = surface
        .try_refine_u_knot(vec![0.2, 0.5])
        .and_then(|s| s.try_refine_v_knot(vec![0.7]))
        .unwrap();
    assert_eq!(refined.control_points().len(), 6);
    assert_eq!(refined.control_points()[0].len(), 5);
    for (u, v) in grid(8) {
        assert_relative_eq!(
            refined.point_at(u, v),
            surface.point_at(u, v),
            epsilon = 1e-10
        );
    }
}

#[test]
fn unified_surfaces_share_structure() {
    let a = polynomial_patch();
    let b = a
        .try_refine_u_knot(vec![0.5])
        .unwrap()
        .try_elevate_degree(3, 4)
        .unwrap();
    let c = NurbsSurface3D::try_new(
        1,
        1,
        vec![0., 0., 1., 1.],
        vec![0., 0., 0.25, 1., 1.],
        vec![
            vec![
                Point3::new(0., 0., 0.).to_homogeneous().into(),
                Point3::new(0., 0.25, 0.).to_homogeneous().into(),
                Point3::new(0., 1., 1.).to_homogeneous().into(),
            ],
            vec![
                Point3::new(1., 0., 0.).to_homogeneous().into(),
                Point3::new(1., 0.25, 0.).to_homogeneous().into(),
                Point3::new(1., 1., 0.).to_homogeneous().into(),
            ],
        ],
    )
    .unwrap();
    let originals = vec![a, b, c];
    let unified = try_unify_surface_knot_vectors(&originals).unwrap();
    for s in unified.iter() {
        assert_eq!(s.u_degree(), 3);
        assert_eq!(s.v_degree(), 4);
        assert_eq!(s.u_knots().len(), unified[0].u_knots().len());
        assert_eq!(s.v_knots().len(), unified[0].v_knots().len());
        assert_eq!(s.control_points().len(), unified[0].control_points().len());
    }
    for (s, o) in unified.iter().zip(originals.iter()) {
        for (u, v) in grid(5) {
            assert_relative_eq!(s.point_at(u, v), o.point_at(u, v), epsilon = 1e-10);
        }
    }
}

#[test]
fn invalid_surface_is_rejected() {
    let row = vec![
        Point3::new(0., 0., 0.).to_homogeneous().into(),
        Point3::new(0., 1., 0.).to_homogeneous().into(),
    ];
    let short = vec![Point3::new(1., 0., 0.).to_homogeneous().into()];
    let knots = vec![0., 0., 1., 1.];
    assert!(NurbsSurface3D::<f64>::try_new(
        1,
        1,
        knots.clone(),
        knots.clone(),
        vec![row.clone(), short]
    )
    .is_err());
    assert!(NurbsSurface3D::<f64>::try_new(
        1,
        1,
        knots.clone(),
        vec![0., 1.],
        vec![row.clone(), row]
    )
    .is_err());
}
