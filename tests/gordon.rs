use std::f64::consts::TAU;

use approx::assert_relative_eq;
use gordon::prelude::*;
use nalgebra::Point3;

const TOLERANCE: f64 = 1e-4;

fn surface(u: f64, v: f64) -> Point3<f64> {
    Point3::new(u, v + 0.1 * u * u, 0.5 * u * v + 0.2 * v * v)
}

/// Cubic interpolant of `f` on [0, 1], exact for polynomials up to degree 3
fn iso_curve(f: impl Fn(f64) -> Point3<f64>) -> NurbsCurve3D<f64> {
    let parameters = [0., 1. / 3., 2. / 3., 1.];
    let points: Vec<_> = parameters.iter().map(|t| f(*t)).collect();
    NurbsCurve3D::try_interpolate_with_parameters(&points, &parameters, 3, false).unwrap()
}

const PROFILE_VS: [f64; 3] = [0., 0.45, 1.];
const GUIDE_US: [f64; 4] = [0., 0.3, 0.7, 1.];

fn polynomial_network() -> (Vec<NurbsCurve3D<f64>>, Vec<NurbsCurve3D<f64>>) {
    let profiles = PROFILE_VS
        .iter()
        .map(|v| iso_curve(|u| surface(u, *v)))
        .collect();
    let guides = GUIDE_US
        .iter()
        .map(|u| iso_curve(|v| surface(*u, v)))
        .collect();
    (profiles, guides)
}

fn assert_additive_identity(result: &CurveNetworkInterpolation<f64>) {
    let cps = |s: &NurbsSurface3D<f64>| s.control_points().clone();
    let (g, p, d, t) = (
        cps(&result.gordon),
        cps(&result.profile_skin),
        cps(&result.guide_skin),
        cps(&result.tensor),
    );
    assert_eq!(g.len(), t.len());
    for i in 0..g.len() {
        assert_eq!(g[i].len(), t[i].len());
        for j in 0..g[i].len() {
            let expected = p[i][j].coords + d[i][j].coords - t[i][j].coords;
            assert_relative_eq!(g[i][j].coords, expected, epsilon = 1e-12);
        }
    }
}

#[test]
fn polynomial_network_is_reproduced() {
    let (profiles, guides) = polynomial_network();
    let result = try_interpolate_curve_network(&profiles, &guides, TOLERANCE).unwrap();

    for (a, b) in result.u_params.iter().zip(GUIDE_US.iter()) {
        assert_relative_eq!(*a, *b, epsilon = 1e-8);
    }
    for (a, b) in result.v_params.iter().zip(PROFILE_VS.iter()) {
        assert_relative_eq!(*a, *b, epsilon = 1e-8);
    }

    for i in 0..=10 {
        for j in 0..=10 {
            let (u, v) = (i as f64 / 10., j as f64 / 10.);
            assert_relative_eq!(result.gordon.point_at(u, v), surface(u, v), epsilon = 1e-6);
        }
    }
    assert_additive_identity(&result);
}

#[test]
fn gordon_interpolates_the_network() {
    let (profiles, guides) = polynomial_network();
    let result = try_interpolate_curve_network(&profiles, &guides, TOLERANCE).unwrap();
    for (i, v) in result.v_params.iter().enumerate() {
        for (j, u) in result.u_params.iter().enumerate() {
            let expected = result.reparametrized_profiles[i].point_at(*u);
            assert_relative_eq!(result.gordon.point_at(*u, *v), expected, epsilon = 1e-6);
            assert_relative_eq!(
                result.reparametrized_guides[j].point_at(*v),
                expected,
                epsilon = 1e-6
            );
        }
    }
}

#[test]
fn shuffled_and_reversed_network() {
    let (profiles, guides) = polynomial_network();
    let reversed = |c: &NurbsCurve3D<f64>| {
        let mut c = c.clone();
        c.invert();
        c
    };
    let profiles = vec![
        profiles[2].clone(),
        reversed(&profiles[0]),
        profiles[1].clone(),
    ];
    let guides = vec![
        reversed(&guides[1]),
        guides[3].clone(),
        guides[0].clone(),
        guides[2].clone(),
    ];

    let network = NetworkCompatibilizer::new(&profiles, &guides, TOLERANCE)
        .try_compatibilize()
        .unwrap();
    // the network is rebuilt from the corner of the reversed first profile, running towards u = 0
    assert_eq!(network.profile_indices, vec!["1", "-2", "-0"]);
    assert_eq!(network.guide_indices, vec!["1", "3", "-0", "2"]);
    assert_relative_eq!(network.u_params[1], 0.3, epsilon = 1e-8);
    assert_relative_eq!(network.u_params[2], 0.7, epsilon = 1e-8);
    assert_relative_eq!(network.v_params[1], 0.45, epsilon = 1e-8);

    let surface_mirrored = NurbsSurface3D::try_gordon(&profiles, &guides, TOLERANCE).unwrap();
    for i in 0..=8 {
        for j in 0..=8 {
            let (u, v) = (i as f64 / 8., j as f64 / 8.);
            assert_relative_eq!(
                surface_mirrored.point_at(u, v),
                surface(1. - u, v),
                epsilon = 1e-6
            );
        }
    }
}

fn ring(z: f64, n: usize) -> NurbsCurve3D<f64> {
    let points: Vec<_> = (0..=n)
        .map(|k| {
            let a = TAU * k as f64 / n as f64;
            Point3::new(a.cos(), a.sin(), z)
        })
        .collect();
    let parameters: Vec<_> = (0..=n).map(|k| k as f64 / n as f64).collect();
    NurbsCurve3D::try_interpolate_with_parameters(&points, &parameters, 3, true).unwrap()
}

#[test]
fn closed_profiles_make_a_closed_surface() {
    let n = 8;
    let heights = [0., 0.5, 1.];
    let profiles: Vec<_> = heights.iter().map(|z| ring(*z, n)).collect();
    // the seam guide appears at both ends of the network
    let guides: Vec<_> = (0..=n)
        .step_by(2)
        .map(|k| {
            let a = TAU * k as f64 / n as f64;
            let (x, y) = (a.cos(), a.sin());
            NurbsCurve3D::interpolate(&vec![Point3::new(x, y, 0.), Point3::new(x, y, 1.)], 1)
                .unwrap()
        })
        .collect();

    let interpolator = CurveNetworkInterpolator::new(&profiles, &guides, TOLERANCE);
    let u_params = interpolator.u_params().unwrap();
    assert_eq!(u_params.len(), 5);
    for (k, u) in u_params.iter().enumerate() {
        assert_relative_eq!(*u, k as f64 / 4., epsilon = 1e-8);
    }

    let gordon = interpolator.surface().unwrap();
    for j in 0..=10 {
        let v = j as f64 / 10.;
        assert_relative_eq!(
            gordon.point_at(0., v),
            gordon.point_at(1., v),
            epsilon = 1e-8
        );
    }
    let profiles = interpolator.reparametrized_profiles().unwrap();
    for (profile, v) in profiles.iter().zip(interpolator.v_params().unwrap()) {
        for i in 0..=20 {
            let u = i as f64 / 20.;
            assert_relative_eq!(gordon.point_at(u, *v), profile.point_at(u), epsilon = 1e-6);
        }
    }
    assert_additive_identity(interpolator.interpolation().unwrap());
}

#[test]
fn results_are_memoized() {
    let (profiles, guides) = polynomial_network();
    let interpolator = CurveNetworkInterpolator::new(&profiles, &guides, TOLERANCE);
    let first = interpolator.surface().unwrap() as *const NurbsSurface3D<f64>;
    let second = interpolator.surface().unwrap() as *const NurbsSurface3D<f64>;
    assert_eq!(first, second);
    assert_eq!(
        interpolator.u_params().unwrap(),
        interpolator.u_params().unwrap()
    );

    let failing = CurveNetworkInterpolator::new(&profiles[..1], &guides, TOLERANCE);
    let e0 = failing.surface().unwrap_err();
    let e1 = failing.tensor().unwrap_err();
    assert_eq!(e0.to_string(), e1.to_string());
}

#[test]
fn too_few_curves() {
    let (profiles, guides) = polynomial_network();
    assert!(matches!(
        try_interpolate_curve_network(&profiles[..1], &guides, TOLERANCE),
        Err(GordonError::Validation(_))
    ));
    assert!(matches!(
        try_interpolate_curve_network(&profiles, &guides[..1], TOLERANCE),
        Err(GordonError::Validation(_))
    ));
}

#[test]
fn non_intersecting_pair() {
    let (profiles, mut guides) = polynomial_network();
    // lift the middle guides off the profiles
    for k in [1, 2] {
        let u = GUIDE_US[k];
        guides[k] = iso_curve(|v| surface(u, v) + nalgebra::Vector3::new(0., 0., 0.3));
    }
    match try_interpolate_curve_network(&profiles, &guides, TOLERANCE) {
        Err(GordonError::NoIntersection { pairs }) => {
            assert_eq!(pairs.len(), 6);
            assert!(pairs.contains(&(0, 1)));
            assert!(pairs.contains(&(2, 2)));
        }
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }
}

#[test]
fn incompatible_network_is_rejected_by_the_builder() {
    let (profiles, guides) = polynomial_network();
    let wrong_u = [0., 0.5, 0.7, 1.];
    let result = GordonSurfaceBuilder::new(&profiles, &guides, &wrong_u, &PROFILE_VS, TOLERANCE)
        .try_build();
    assert!(matches!(
        result,
        Err(GordonError::Incompatible { guide: 1, .. })
    ));
}

#[test]
fn mismatched_domains_are_rejected_by_the_builder() {
    let (mut profiles, guides) = polynomial_network();
    profiles[1] = profiles[1].try_reparametrize(0., 2.).unwrap();
    let result = GordonSurfaceBuilder::new(&profiles, &guides, &GUIDE_US, &PROFILE_VS, TOLERANCE)
        .try_build();
    assert!(matches!(result, Err(GordonError::DomainMismatch(_))));
}

fn line(a: Point3<f64>, b: Point3<f64>) -> NurbsCurve3D<f64> {
    NurbsCurve3D::interpolate(&vec![a, b], 1).unwrap()
}

#[test]
fn closed_guides_make_a_closed_surface() {
    let n = 8;
    let heights = [0., 0.5, 1.];
    // the seam line appears at both ends of the network
    let profiles: Vec<_> = (0..=n)
        .step_by(2)
        .map(|k| {
            let a = TAU * k as f64 / n as f64;
            let (x, y) = (a.cos(), a.sin());
            line(Point3::new(x, y, 0.), Point3::new(x, y, 1.))
        })
        .collect();
    let guides: Vec<_> = heights.iter().map(|z| ring(*z, n)).collect();

    let result = try_interpolate_curve_network(&profiles, &guides, TOLERANCE).unwrap();
    assert_eq!(result.v_params.len(), 5);
    for (k, v) in result.v_params.iter().enumerate() {
        assert_relative_eq!(*v, k as f64 / 4., epsilon = 1e-8);
    }
    for (u, z) in result.u_params.iter().zip(heights.iter()) {
        assert_relative_eq!(*u, *z, epsilon = 1e-8);
    }

    let gordon = &result.gordon;
    for i in 0..=10 {
        let u = i as f64 / 10.;
        assert_relative_eq!(
            gordon.point_at(u, 0.),
            gordon.point_at(u, 1.),
            epsilon = 1e-8
        );
    }
    for (guide, u) in result.reparametrized_guides.iter().zip(&result.u_params) {
        for j in 0..=20 {
            let v = j as f64 / 20.;
            assert_relative_eq!(gordon.point_at(*u, v), guide.point_at(v), epsilon = 1e-6);
        }
    }
    assert_additive_identity(&result);
}

#[test]
fn profile_crossing_a_guide_three_times_is_ambiguous() {
    // runs back and forth across x = 1 between its ends on x = 0 and x = 2
    let s_curve = {
        let parameters: Vec<_> = (0..=16).map(|k| k as f64 / 16.).collect();
        let points: Vec<_> = parameters
            .iter()
            .map(|t| {
                let w = (TAU * t).sin();
                Point3::new(2. * t + 0.6 * w, 1. + 0.2 * w, 0.)
            })
            .collect();
        NurbsCurve3D::try_interpolate_with_parameters(&points, &parameters, 3, false).unwrap()
    };
    let profiles = vec![
        line(Point3::new(0., 0., 0.), Point3::new(2., 0., 0.)),
        s_curve,
        line(Point3::new(0., 2., 0.), Point3::new(2., 2., 0.)),
    ];
    let guides: Vec<_> = [0., 1., 2.]
        .iter()
        .map(|x| line(Point3::new(*x, 0., 0.), Point3::new(*x, 2., 0.)))
        .collect();

    assert!(matches!(
        try_interpolate_curve_network(&profiles, &guides, TOLERANCE),
        Err(GordonError::AmbiguousIntersection {
            profile: 1,
            guide: 1,
            count: 3
        })
    ));
}

#[test]
fn guide_overshooting_the_outer_profiles_misses_the_boundary() {
    let (profiles, mut guides) = polynomial_network();
    let u = GUIDE_US[1];
    guides[1] = iso_curve(|t| surface(u, -0.2 + 1.4 * t));
    assert!(matches!(
        try_interpolate_curve_network(&profiles, &guides, TOLERANCE),
        Err(GordonError::Boundary(_))
    ));
}

#[test]
fn network_without_a_start_corner() {
    // x[i][j] is where profile i meets guide j
    let x = [
        [
            Point3::new(0., 0., 0.),
            Point3::new(1., 0., 0.3),
            Point3::new(2., 0., 0.),
        ],
        [
            Point3::new(1., 1., 0.5),
            Point3::new(0., 1., 0.1),
            Point3::new(2., 1., 0.2),
        ],
        [
            Point3::new(1., 2., -0.2),
            Point3::new(2., 2., 0.1),
            Point3::new(0., 2., 0.4),
        ],
    ];
    let polyline = |points: [Point3<f64>; 3]| {
        NurbsCurve3D::try_interpolate_with_parameters(&points, &[0., 0.5, 1.], 1, false).unwrap()
    };
    let profiles = vec![
        polyline([x[0][0], x[0][1], x[0][2]]),
        polyline([x[1][1], x[1][0], x[1][2]]),
        polyline([x[2][2], x[2][0], x[2][1]]),
    ];
    let guides = vec![
        polyline([x[1][0], x[0][0], x[2][0]]),
        polyline([x[0][1], x[1][1], x[2][1]]),
        polyline([x[0][2], x[2][2], x[1][2]]),
    ];

    assert!(matches!(
        try_interpolate_curve_network(&profiles, &guides, TOLERANCE),
        Err(GordonError::DegenerateNetwork)
    ));
}
