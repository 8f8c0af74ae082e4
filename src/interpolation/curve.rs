use itertools::Itertools;
use nalgebra::{
    allocator::Allocator, DMatrix, DVector, DefaultAllocator, DimName, DimNameDiff, DimNameSub,
    OPoint, U1,
};

use crate::{
    curve::{KnotStyle, NurbsCurve},
    knot::KnotVector,
    misc::FloatingPoint,
};

use super::Interpolation;

impl<T: FloatingPoint, D: DimName> Interpolation for NurbsCurve<T, D>
where
    DefaultAllocator: Allocator<D>,
    D: DimNameSub<U1>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    type Input = Vec<OPoint<T, DimNameDiff<D, U1>>>;
    type Output = anyhow::Result<Self>;

    /// Try to create an interpolated NURBS curve from a set of points
    /// The points are parameterized by chord length on [0, 1]
    /// # Example
    /// ```
    /// use gordon::prelude::*;
    /// use nalgebra::Point3;
    /// use approx::assert_relative_eq;
    ///
    /// let points: Vec<Point3<f64>> = vec![
    ///     Point3::new(-1.0, -1.0, 0.),
    ///     Point3::new(1.0, -1.0, 0.),
    ///     Point3::new(1.0, 1.0, 0.),
    ///     Point3::new(-1.0, 1.0, 0.),
    ///     Point3::new(-1.0, 2.0, 0.),
    ///     Point3::new(1.0, 2.5, 0.),
    /// ];
    /// let curve = NurbsCurve3D::interpolate(&points, 3).unwrap();
    /// assert_eq!(curve.knots_domain(), (0., 1.));
    /// assert_relative_eq!(points[0], curve.point_at(0.));
    /// assert_relative_eq!(points[points.len() - 1], curve.point_at(1.));
    /// ```
    fn interpolate(input: &Self::Input, degree: usize) -> Self::Output {
        let points = input
            .iter()
            .map(|p| DVector::from_vec(p.iter().copied().collect()))
            .collect_vec();
        let parameters = KnotStyle::Chordal.parameterize(&points);
        let (control_points, knots) =
            try_interpolate_control_points(&points, &parameters, degree, false, true)?;
        Ok(Self::new_unchecked(
            degree,
            control_points
                .iter()
                .map(|v| OPoint::from_slice(v.as_slice()))
                .collect(),
            knots,
        ))
    }
}

impl<T: FloatingPoint, D: DimName> NurbsCurve<T, D>
where
    DefaultAllocator: Allocator<D>,
    D: DimNameSub<U1>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    /// Interpolate `points` at the prescribed ascending `parameters`
    /// A closed curve expects the first and last points to coincide and is made C^(degree-1) across the seam
    /// # Example
    /// ```
    /// use gordon::prelude::*;
    /// use nalgebra::Point3;
    /// use approx::assert_relative_eq;
    ///
    /// let points = vec![
    ///     Point3::new(1., 0., 0.),
    ///     Point3::new(0., 1., 0.),
    ///     Point3::new(-1., 0., 0.),
    ///     Point3::new(0., -1., 0.),
    ///     Point3::new(1., 0., 0.),
    /// ];
    /// let parameters = vec![0., 0.25, 0.5, 0.75, 1.];
    /// let curve = NurbsCurve3D::try_interpolate_with_parameters(&points, &parameters, 3, true).unwrap();
    /// for (p, t) in points.iter().zip(parameters.iter()) {
    ///     assert_relative_eq!(*p, curve.point_at(*t), epsilon = 1e-10);
    /// }
    /// let d0 = curve.rational_derivatives(0., 1);
    /// let d1 = curve.rational_derivatives(1., 1);
    /// assert_relative_eq!(d0[1], d1[1], epsilon = 1e-9);
    /// ```
    pub fn try_interpolate_with_parameters(
        points: &[OPoint<T, DimNameDiff<D, U1>>],
        parameters: &[T],
        degree: usize,
        closed: bool,
    ) -> anyhow::Result<Self> {
        let points = points
            .iter()
            .map(|p| DVector::from_vec(p.iter().copied().collect()))
            .collect_vec();
        let (control_points, knots) =
            try_interpolate_control_points(&points, parameters, degree, closed, true)?;
        Ok(Self::new_unchecked(
            degree,
            control_points
                .iter()
                .map(|v| OPoint::from_slice(v.as_slice()))
                .collect(),
            knots,
        ))
    }
}

/// Try to interpolate the control points of a NURBS curve passing through `points` at `parameters`
/// With `homogeneous`, a unit weight is appended to each resulting control point
pub fn try_interpolate_control_points<T: FloatingPoint>(
    points: &[DVector<T>],
    parameters: &[T],
    degree: usize,
    closed: bool,
    homogeneous: bool,
) -> anyhow::Result<(Vec<DVector<T>>, KnotVector<T>)> {
    let n = points.len();
    anyhow::ensure!(
        n == parameters.len(),
        "Number of points ({}) and parameters ({}) differ",
        n,
        parameters.len()
    );
    anyhow::ensure!(degree >= 1, "Degree must be at least 1");
    anyhow::ensure!(n > degree, "Too few points for degree {}", degree);
    anyhow::ensure!(
        parameters.iter().tuple_windows().all(|(a, b)| a < b),
        "Parameters must be strictly increasing"
    );

    let (knots, control_point_count) = if closed {
        (KnotVector::from_parameters(parameters, degree), n + degree - 1)
    } else {
        (KnotVector::averaged(parameters, degree), n)
    };
    let last = control_point_count - 1;

    // build basis function coefficients matrix
    let mut m_a = DMatrix::<T>::zeros(control_point_count, control_point_count);
    for (i, u) in parameters.iter().enumerate() {
        let knot_span_index = knots.find_knot_span_index(last, degree, *u);
        let basis = knots.basis_functions(knot_span_index, *u, degree);
        let ls = knot_span_index - degree;
        for (j, b) in basis.iter().enumerate() {
            m_a[(i, ls + j)] = *b;
        }
    }

    let dim = points[0].len();
    let mut rhs = points.to_vec();

    if closed {
        // match the derivatives at both ends of the seam
        let start = parameters[0];
        let end = parameters[n - 1];
        let start_span = knots.find_knot_span_index(last, degree, start);
        let end_span = knots.find_knot_span_index(last, degree, end);
        for order in 1..degree {
            let row = n + order - 1;
            let ds = knots.derivative_basis_functions(start_span, start, degree, order);
            let de = knots.derivative_basis_functions(end_span, end, degree, order);
            for j in 0..=degree {
                m_a[(row, start_span - degree + j)] += ds[order][j];
                m_a[(row, end_span - degree + j)] -= de[order][j];
            }
            rhs.push(DVector::zeros(dim));
        }
    }

    let control_points = try_solve_interpolation(m_a, &rhs, homogeneous)?;
    Ok((control_points, knots))
}

/// Try to solve the interpolation problem `m_a * X = rhs` coordinate by coordinate
fn try_solve_interpolation<T: FloatingPoint>(
    m_a: DMatrix<T>,
    rhs: &[DVector<T>],
    homogeneous: bool,
) -> anyhow::Result<Vec<DVector<T>>> {
    let dim = rhs[0].len();
    let rows = m_a.nrows();

    let lu = m_a.lu();
    let mut m_x = DMatrix::<T>::zeros(rows, dim);
    for i in 0..dim {
        let b = DVector::from_iterator(rhs.len(), rhs.iter().map(|p| p[i]));
        let xs = lu
            .solve(&b)
            .ok_or(anyhow::anyhow!("Interpolation system is singular"))?;
        m_x.set_column(i, &xs);
    }

    Ok(m_x
        .row_iter()
        .map(|row| {
            let mut coords = row.iter().copied().collect_vec();
            if homogeneous {
                coords.push(T::one());
            }
            DVector::from_vec(coords)
        })
        .collect())
}
