use itertools::Itertools;
use nalgebra::{
    allocator::Allocator, DVector, DefaultAllocator, DimName, DimNameDiff, DimNameSub, OPoint, U1,
};

use crate::{
    curve::NurbsCurve,
    misc::{transpose, FloatingPoint},
    surface::{try_unify_curve_knot_vectors, NurbsSurface},
};

use super::try_interpolate_control_points;

impl<T: FloatingPoint, D: DimName> NurbsSurface<T, D>
where
    DefaultAllocator: Allocator<D>,
    D: DimNameSub<U1>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    /// Skin a surface through `curves`, curve `k` becoming the iso curve at v = `parameters[k]`
    /// The curves run along u. The v degree is `min(3, curves - 1)`.
    /// A closed skin is C^(degree-1) across the v seam and expects the first and last curves to coincide.
    /// # Example
    /// ```
    /// use gordon::prelude::*;
    /// use nalgebra::Point3;
    /// use approx::assert_relative_eq;
    ///
    /// let curves: Vec<_> = [0., 0.5, 2.]
    ///     .iter()
    ///     .map(|z| {
    ///         let points = vec![
    ///             Point3::new(0., 0., *z),
    ///             Point3::new(1., z * z, *z),
    ///             Point3::new(2., 0., *z),
    ///         ];
    ///         NurbsCurve3D::interpolate(&points, 2).unwrap()
    ///     })
    ///     .collect();
    /// let parameters = vec![0., 0.4, 1.];
    /// let skin = NurbsSurface3D::try_skin(&curves, &parameters, false).unwrap();
    /// for (curve, v) in curves.iter().zip(parameters.iter()) {
    ///     assert_relative_eq!(skin.point_at(0.3, *v), curve.point_at(0.3), epsilon = 1e-10);
    /// }
    /// ```
    pub fn try_skin(
        curves: &[NurbsCurve<T, D>],
        parameters: &[T],
        closed: bool,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(
            curves.len() >= 2,
            "At least two curves are required to skin"
        );
        anyhow::ensure!(
            curves.len() == parameters.len(),
            "Number of curves ({}) and parameters ({}) differ",
            curves.len(),
            parameters.len()
        );

        let unified = try_unify_curve_knot_vectors(curves)?;
        let v_degree = 3.min(unified.len() - 1);
        let u_degree = unified[0].degree();
        let u_knots = unified[0].knots().clone();

        // interpolate the homogeneous control points across the curves
        let mut v_knots = None;
        let control_points = (0..unified[0].control_points().len())
            .map(|i| {
                let column = unified
                    .iter()
                    .map(|c| DVector::from_vec(c.control_points()[i].iter().copied().collect()))
                    .collect_vec();
                let (points, knots) =
                    try_interpolate_control_points(&column, parameters, v_degree, closed, false)?;
                v_knots = Some(knots);
                Ok(points
                    .iter()
                    .map(|p| OPoint::from_slice(p.as_slice()))
                    .collect_vec())
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        let v_knots = v_knots.ok_or(anyhow::anyhow!("Curves have no control points"))?;

        Ok(Self::new(
            u_degree,
            v_degree,
            u_knots.to_vec(),
            v_knots.to_vec(),
            control_points,
        ))
    }

    /// Interpolate a grid of points, `points[i][j]` being reached at (`u_parameters[i]`, `v_parameters[j]`)
    /// Each direction has degree `min(3, count - 1)` and may be closed.
    /// # Example
    /// ```
    /// use gordon::prelude::*;
    /// use nalgebra::Point3;
    /// use approx::assert_relative_eq;
    ///
    /// let us = vec![0., 0.3, 0.7, 1.];
    /// let vs = vec![0., 0.5, 1.];
    /// let points: Vec<Vec<_>> = us
    ///     .iter()
    ///     .map(|u| vs.iter().map(|v| Point3::new(*u, *v, u * v)).collect())
    ///     .collect();
    /// let surface = NurbsSurface3D::try_interpolate_grid(&points, &us, &vs, false, false).unwrap();
    /// assert_relative_eq!(surface.point_at(0.3, 0.5), points[1][1], epsilon = 1e-10);
    /// assert_relative_eq!(surface.point_at(0.2, 0.9), Point3::new(0.2, 0.9, 0.18), epsilon = 1e-10);
    /// ```
    pub fn try_interpolate_grid(
        points: &[Vec<OPoint<T, DimNameDiff<D, U1>>>],
        u_parameters: &[T],
        v_parameters: &[T],
        u_closed: bool,
        v_closed: bool,
    ) -> anyhow::Result<Self> {
        let nu = points.len();
        anyhow::ensure!(
            nu == u_parameters.len(),
            "Grid has {} rows but {} u parameters",
            nu,
            u_parameters.len()
        );
        anyhow::ensure!(
            points.iter().all(|row| row.len() == v_parameters.len()),
            "Every grid row must have {} points",
            v_parameters.len()
        );
        anyhow::ensure!(
            nu >= 2 && v_parameters.len() >= 2,
            "Grid must be at least 2 x 2"
        );

        let u_degree = 3.min(nu - 1);
        let v_degree = 3.min(v_parameters.len() - 1);

        // interpolate along v for every row
        let mut v_knots = None;
        let rows = points
            .iter()
            .map(|row| {
                let row = row
                    .iter()
                    .map(|p| DVector::from_vec(p.iter().copied().collect()))
                    .collect_vec();
                let (cps, knots) =
                    try_interpolate_control_points(&row, v_parameters, v_degree, v_closed, false)?;
                v_knots = Some(knots);
                Ok(cps)
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        // then along u through the intermediate control points
        let mut u_knots = None;
        let columns = transpose(&rows)
            .iter()
            .map(|column| {
                let (cps, knots) =
                    try_interpolate_control_points(column, u_parameters, u_degree, u_closed, true)?;
                u_knots = Some(knots);
                Ok(cps
                    .iter()
                    .map(|p| OPoint::from_slice(p.as_slice()))
                    .collect_vec())
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let (u_knots, v_knots) = u_knots
            .zip(v_knots)
            .ok_or(anyhow::anyhow!("Grid is empty"))?;

        Ok(Self::new(
            u_degree,
            v_degree,
            u_knots.to_vec(),
            v_knots.to_vec(),
            transpose(&columns),
        ))
    }
}
