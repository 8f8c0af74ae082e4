use nalgebra::{DMatrix, Point3};

use crate::curve::ParametricCurve;

use super::{CurveNetwork, CurveNetworkSorter, GordonError};

/// Straight curve on [0, 1], enough to exercise the sorting logic
#[derive(Clone, Debug)]
struct Segment {
    start: Point3<f64>,
    end: Point3<f64>,
}

impl ParametricCurve<f64> for Segment {
    fn evaluate(&self, t: f64) -> Point3<f64> {
        self.start + (self.end - self.start) * t
    }

    fn first_parameter(&self) -> f64 {
        0.
    }

    fn last_parameter(&self) -> f64 {
        1.
    }

    fn reverse(&mut self) {
        std::mem::swap(&mut self.start, &mut self.end);
    }

    fn is_closed(&self, tolerance: f64) -> bool {
        (self.end - self.start).norm() <= tolerance
    }

    fn is_equal(&self, other: &Self, tolerance: f64) -> bool {
        (self.start - other.start).norm() <= tolerance && (self.end - other.end).norm() <= tolerance
    }
}

fn segments(n: usize) -> Vec<Segment> {
    (0..n)
        .map(|i| Segment {
            start: Point3::new(i as f64, 0., 0.),
            end: Point3::new(i as f64, 1., 0.),
        })
        .collect()
}

fn sorter(
    rows: usize,
    columns: usize,
    on_profile: &[f64],
    on_guide: &[f64],
) -> CurveNetworkSorter<f64, Segment> {
    let network = CurveNetwork::try_new(
        segments(rows),
        segments(columns),
        DMatrix::from_row_slice(rows, columns, on_profile),
        DMatrix::from_row_slice(rows, columns, on_guide),
    )
    .unwrap();
    CurveNetworkSorter::new(network)
}

const ORDERED_ON_PROFILE: [f64; 9] = [0., 0.2, 1., 0., 0.6, 1., 0., 0.7, 1.];
const ORDERED_ON_GUIDE: [f64; 9] = [0., 0., 0., 0.3, 0.4, 0.5, 1., 1., 1.];

#[test]
fn ordered_network_is_left_unchanged() {
    let mut sorter = sorter(3, 3, &ORDERED_ON_PROFILE, &ORDERED_ON_GUIDE);
    assert_eq!(sorter.start_curve_indices().unwrap(), (0, 0, false));

    sorter.perform().unwrap();
    assert_eq!(sorter.profile_indices(), &["0", "1", "2"]);
    assert_eq!(sorter.guide_indices(), &["0", "1", "2"]);
    assert_eq!(
        sorter.network().param_on_profile(),
        &DMatrix::from_row_slice(3, 3, &ORDERED_ON_PROFILE)
    );
    assert_eq!(
        sorter.network().param_on_guide(),
        &DMatrix::from_row_slice(3, 3, &ORDERED_ON_GUIDE)
    );
}

#[test]
fn unordered_and_reversed_network() {
    let mut sorter = sorter(
        3,
        3,
        &[0., 0.4, 1., 1., 0.2, 0., 1., 0.7, 0.],
        &[0.5, 0.4, 0.3, 1., 0., 0., 0., 1., 1.],
    );
    assert_eq!(sorter.start_curve_indices().unwrap(), (1, 2, false));

    sorter.perform().unwrap();
    assert_eq!(sorter.profile_indices(), &["1", "-0", "2"]);
    assert_eq!(sorter.guide_indices(), &["2", "1", "-0"]);
    assert_eq!(
        sorter.network().param_on_profile(),
        &DMatrix::from_row_slice(3, 3, &ORDERED_ON_PROFILE)
    );
    assert_eq!(
        sorter.network().param_on_guide(),
        &DMatrix::from_row_slice(3, 3, &ORDERED_ON_GUIDE)
    );

    // curves move and flip along with their labels
    let profiles = sorter.network().profiles();
    assert_eq!(profiles[0].start, Point3::new(1., 0., 0.));
    assert_eq!(profiles[1].start, Point3::new(0., 1., 0.));
}

#[test]
fn circular_network() {
    let mut sorter = sorter(3, 2, &[1., 0., 0., 1., 0., 1.], &[0., 1., 1., 0., 0.5, 0.6]);
    assert_eq!(sorter.start_curve_indices().unwrap(), (0, 1, true));

    sorter.perform().unwrap();
    assert_eq!(sorter.profile_indices(), &["0", "-2", "-1"]);
    assert_eq!(sorter.guide_indices(), &["-1", "0"]);
    assert_eq!(
        sorter.network().param_on_profile(),
        &DMatrix::from_row_slice(3, 2, &[0., 1., 0., 1., 0., 1.])
    );
    let on_guide = sorter.network().param_on_guide();
    for (i, expected) in [0., 0.4, 1.].iter().enumerate() {
        assert!((on_guide[(i, 0)] - expected).abs() < 1e-12);
    }
    for (i, expected) in [0., 0.5, 1.].iter().enumerate() {
        assert!((on_guide[(i, 1)] - expected).abs() < 1e-12);
    }
}

#[test]
fn perform_is_idempotent() {
    let mut sorter = sorter(
        3,
        3,
        &[0., 0.4, 1., 1., 0.2, 0., 1., 0.7, 0.],
        &[0.5, 0.4, 0.3, 1., 0., 0., 0., 1., 1.],
    );
    sorter.perform().unwrap();
    let once = sorter.clone();
    sorter.perform().unwrap();
    assert_eq!(sorter.profile_indices(), once.profile_indices());
    assert_eq!(sorter.guide_indices(), once.guide_indices());
    assert_eq!(
        sorter.network().param_on_guide(),
        once.network().param_on_guide()
    );
}

#[test]
fn network_without_start_corner() {
    // every profile starts at a guide whose first and last profiles are other ones
    let mut sorter = sorter(
        3,
        3,
        &[0., 0.5, 1., 0.5, 0., 1., 0.5, 1., 0.],
        &[0.5, 0., 0., 0., 0.5, 1., 1., 1., 0.5],
    );
    assert!(matches!(
        sorter.start_curve_indices(),
        Err(GordonError::DegenerateNetwork)
    ));
    assert!(matches!(
        sorter.perform(),
        Err(GordonError::DegenerateNetwork)
    ));
}

#[test]
fn mismatched_matrix_dimensions() {
    let result = CurveNetwork::try_new(
        segments(2),
        segments(3),
        DMatrix::<f64>::zeros(2, 3),
        DMatrix::<f64>::zeros(3, 2),
    );
    assert!(matches!(result, Err(GordonError::Validation(_))));
}
