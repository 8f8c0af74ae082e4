use approx::assert_relative_eq;
use nalgebra::{Point3, Point4};

use crate::prelude::*;

fn wavy_curve() -> NurbsCurve3D<f64> {
    let points = vec![
        Point3::new(0., 0., 0.),
        Point3::new(1., 2., 0.),
        Point3::new(2., -1., 1.),
        Point3::new(3., 0., 2.),
        Point3::new(4., 1., 1.),
        Point3::new(5., 0., 0.),
    ];
    NurbsCurve3D::interpolate(&points, 3).unwrap()
}

fn samples(n: usize) -> impl Iterator<Item = f64> {
    (0..=n).map(move |i| i as f64 / n as f64)
}

#[test]
fn degree_elevation_keeps_shape() {
    let curve = wavy_curve();
    for target in 4..=6 {
        let elevated = curve.try_elevate_degree(target).unwrap();
        assert_eq!(elevated.degree(), target);
        assert_eq!(
            elevated.knots().len(),
            elevated.control_points().len() + target + 1
        );
        for t in samples(40) {
            assert_relative_eq!(curve.point_at(t), elevated.point_at(t), epsilon = 1e-9);
        }
    }
}

#[test]
fn degree_elevation_of_rational_curve() {
    let control_points = vec![
        Point4::new(1., 0., 0., 1.),
        Point4::new(1., 1., 0., 1.) * std::f64::consts::FRAC_1_SQRT_2,
        Point4::new(0., 1., 0., 1.),
    ];
    let arc = NurbsCurve3D::try_new(2, control_points, vec![0., 0., 0., 1., 1., 1.]).unwrap();
    let elevated = arc.try_elevate_degree(3).unwrap();
    assert_eq!(elevated.control_points().len(), 4);
    for t in samples(16) {
        let p = elevated.point_at(t);
        assert_relative_eq!(p.coords.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(p, arc.point_at(t), epsilon = 1e-12);
    }
}

#[test]
fn degree_elevation_with_repeated_interior_knot() {
    let control_points = vec![
        Point4::new(0., 0., 0., 1.),
        Point4::new(1., 1., 0., 1.),
        Point4::new(2., 0., 0., 1.),
        Point4::new(3., 1., 1., 1.),
        Point4::new(4., 0., 0., 1.),
    ];
    let knots = vec![0., 0., 0., 0.5, 0.5, 1., 1., 1.];
    let curve = NurbsCurve3D::try_new(2, control_points, knots).unwrap();
    let elevated = curve.try_elevate_degree(3).unwrap();
    for t in samples(30) {
        assert_relative_eq!(curve.point_at(t), elevated.point_at(t), epsilon = 1e-10);
    }
}

#[test]
fn knot_refinement_keeps_shape() {
    let curve = wavy_curve();
    let mut refined = curve.clone();
    refined.try_refine_knot(vec![0.1, 0.1, 0.45, 0.8]).unwrap();
    assert_eq!(
        refined.control_points().len(),
        curve.control_points().len() + 4
    );
    for t in samples(40) {
        assert_relative_eq!(curve.point_at(t), refined.point_at(t), epsilon = 1e-10);
    }
}

#[test]
fn reparametrize_keeps_shape() {
    let curve = wavy_curve().try_reparametrize(-2., 3.).unwrap();
    assert_eq!(curve.knots_domain(), (-2., 3.));
    let back = curve.try_reparametrize(0., 1.).unwrap();
    for t in samples(20) {
        assert_relative_eq!(back.point_at(t), wavy_curve().point_at(t), epsilon = 1e-12);
    }
    assert!(wavy_curve().try_reparametrize(1., 1.).is_err());
}

#[test]
fn closedness_and_equality() {
    let open = wavy_curve();
    assert!(!open.is_closed(1e-8));
    assert!(open.is_equal(&open.clone(), 1e-12));
    assert!(!open.is_equal(&open.inverse(), 1e-3));

    let n = 6;
    let points: Vec<_> = (0..=n)
        .map(|i| {
            let a = std::f64::consts::TAU * i as f64 / n as f64;
            Point3::new(a.cos(), a.sin(), 0.)
        })
        .collect();
    let parameters: Vec<_> = samples(n).collect();
    let closed =
        NurbsCurve3D::try_interpolate_with_parameters(&points, &parameters, 3, true).unwrap();
    assert!(closed.is_closed(1e-10));
}

#[test]
fn parametric_curve_reverse_keeps_domain() {
    let mut curve = wavy_curve().try_reparametrize(2., 4.).unwrap();
    let start = curve.evaluate(2.);
    ParametricCurve::reverse(&mut curve);
    assert_eq!(curve.first_parameter(), 2.);
    assert_relative_eq!(curve.last_parameter(), 4., epsilon = 1e-12);
    assert_relative_eq!(curve.evaluate(4.), start, epsilon = 1e-12);
}

#[test]
fn curve_scale_is_control_point_spread() {
    let line = NurbsCurve3D::try_new(
        1,
        vec![Point4::new(0., 0., 0., 1.), Point4::new(3., 4., 0., 1.)],
        vec![0., 0., 1., 1.],
    )
    .unwrap();
    assert_relative_eq!(line.scale(), 5.);
    assert_relative_eq!(
        curves_scale(&[line.clone(), wavy_curve()]),
        wavy_curve().scale().max(5.)
    );
}
