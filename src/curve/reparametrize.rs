use itertools::Itertools;
use nalgebra::{
    allocator::Allocator, DMatrix, DefaultAllocator, DimName, DimNameDiff, DimNameSub,
    OPoint, U1,
};

use crate::{knot::KnotVector, misc::FloatingPoint};

use super::NurbsCurve;

/// Number of approximation samples per control point
const SAMPLES_PER_CONTROL_POINT: usize = 4;

/// Monotone piecewise cubic Hermite map through `(xs[i], ys[i])`
/// Slopes are limited with the Fritsch-Carlson conditions so that the map never reverses
#[derive(Clone, Debug)]
pub struct MonotoneCubicMap<T> {
    xs: Vec<T>,
    ys: Vec<T>,
    slopes: Vec<T>,
}

impl<T: FloatingPoint> MonotoneCubicMap<T> {
    /// `xs` must be strictly increasing and `ys` non-decreasing
    /// # Example
    /// ```
    /// use gordon::prelude::MonotoneCubicMap;
    /// let map = MonotoneCubicMap::try_new(&[0., 0.5, 1.], &[0., 0.2, 1.]).unwrap();
    /// assert_eq!(map.evaluate(0.5), 0.2);
    /// assert!(map.evaluate(0.25) < map.evaluate(0.3));
    /// ```
    pub fn try_new(xs: &[T], ys: &[T]) -> anyhow::Result<Self> {
        let n = xs.len();
        anyhow::ensure!(n >= 2, "At least two samples are required");
        anyhow::ensure!(n == ys.len(), "Sample counts differ");
        anyhow::ensure!(
            xs.iter().tuple_windows().all(|(a, b)| a < b),
            "Map abscissae must be strictly increasing"
        );
        anyhow::ensure!(
            ys.iter().tuple_windows().all(|(a, b)| a <= b),
            "Map values must be non-decreasing"
        );

        let secants = (0..(n - 1))
            .map(|k| (ys[k + 1] - ys[k]) / (xs[k + 1] - xs[k]))
            .collect_vec();

        let mut slopes = vec![T::zero(); n];
        slopes[0] = secants[0];
        slopes[n - 1] = secants[n - 2];
        for k in 1..(n - 1) {
            slopes[k] = if secants[k - 1] * secants[k] > T::zero() {
                (secants[k - 1] + secants[k]) / T::from_f64(2.0).unwrap()
            } else {
                T::zero()
            };
        }

        let three = T::from_f64(3.0).unwrap();
        for k in 0..(n - 1) {
            if secants[k] == T::zero() {
                slopes[k] = T::zero();
                slopes[k + 1] = T::zero();
                continue;
            }
            let alpha = slopes[k] / secants[k];
            let beta = slopes[k + 1] / secants[k];
            let s = alpha * alpha + beta * beta;
            if s > three * three {
                let tau = three / s.sqrt();
                slopes[k] = tau * alpha * secants[k];
                slopes[k + 1] = tau * beta * secants[k];
            }
        }

        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            slopes,
        })
    }

    /// Evaluate the map, clamping `x` to the sampled range
    pub fn evaluate(&self, x: T) -> T {
        let n = self.xs.len();
        if x <= self.xs[0] {
            return self.ys[0];
        }
        if x >= self.xs[n - 1] {
            return self.ys[n - 1];
        }
        let k = self.xs.partition_point(|v| *v <= x).clamp(1, n - 1) - 1;
        let h = self.xs[k + 1] - self.xs[k];
        let t = (x - self.xs[k]) / h;
        let t2 = t * t;
        let t3 = t2 * t;
        let two = T::from_f64(2.0).unwrap();
        let three = T::from_f64(3.0).unwrap();
        let h00 = two * t3 - three * t2 + T::one();
        let h10 = t3 - two * t2 + t;
        let h01 = three * t2 - two * t3;
        let h11 = t3 - t2;
        h00 * self.ys[k]
            + h10 * h * self.slopes[k]
            + h01 * self.ys[k + 1]
            + h11 * h * self.slopes[k + 1]
    }
}

impl<T: FloatingPoint, D: DimName> NurbsCurve<T, D>
where
    DefaultAllocator: Allocator<D>,
    D: DimNameSub<U1>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    /// Approximate the curve with a cubic B-spline of `max_control_points` control points
    /// whose parameter `new_parameters[k]` lands on the point the original curve reaches at `old_parameters[k]`.
    /// In between, the parametrization follows a monotone cubic map from new to old parameters.
    /// The result interpolates the original curve at every pair exactly and is C2 across the seam when `closed`.
    /// The returned curve is defined on [first new parameter, last new parameter].
    /// # Example
    /// ```
    /// use gordon::prelude::*;
    /// use nalgebra::Point3;
    /// use approx::assert_relative_eq;
    ///
    /// let points = vec![
    ///     Point3::new(0., 0., 0.),
    ///     Point3::new(1., 1., 0.),
    ///     Point3::new(2., 0., 0.5),
    ///     Point3::new(3., -1., 0.),
    ///     Point3::new(4., 0., 0.),
    /// ];
    /// let curve = NurbsCurve3D::interpolate(&points, 3).unwrap();
    /// let old = vec![0., 0.3, 1.];
    /// let new = vec![0., 0.5, 1.];
    /// let approx = curve.try_reparametrize_approx(&old, &new, 20, false).unwrap();
    /// assert_eq!(approx.control_points().len(), 20);
    /// assert_relative_eq!(approx.point_at(0.5), curve.point_at(0.3), epsilon = 1e-10);
    /// assert_relative_eq!(approx.point_at(1.), curve.point_at(1.), epsilon = 1e-10);
    /// ```
    pub fn try_reparametrize_approx(
        &self,
        old_parameters: &[T],
        new_parameters: &[T],
        max_control_points: usize,
        closed: bool,
    ) -> anyhow::Result<Self> {
        let n = old_parameters.len();
        anyhow::ensure!(
            n == new_parameters.len(),
            "Number of old ({}) and new ({}) parameters differ",
            n,
            new_parameters.len()
        );
        anyhow::ensure!(n >= 2, "At least two parameter pairs are required");
        let seam_orders = if closed { 2 } else { 0 };
        anyhow::ensure!(
            max_control_points >= n + seam_orders && max_control_points >= 4,
            "Too few control points ({}) for {} parameter pairs",
            max_control_points,
            n
        );

        let map = MonotoneCubicMap::try_new(new_parameters, old_parameters)?;
        let degree = 3;
        let ncp = max_control_points;
        let last = ncp - 1;
        let (t0, t1) = (new_parameters[0], new_parameters[n - 1]);
        let knots = KnotVector::<T>::clamped_uniform(ncp, degree)
            .rescaled((T::zero(), T::one()), (t0, t1));

        let coords = |p: OPoint<T, DimNameDiff<D, U1>>| p.iter().copied().collect_vec();
        let dim = D::dim() - 1;

        // least squares rows sampled along the mapped curve
        let samples = ncp * SAMPLES_PER_CONTROL_POINT;
        let div = T::from_usize(samples - 1).unwrap();
        let mut m_a = DMatrix::<T>::zeros(samples, ncp);
        let mut m_b = DMatrix::<T>::zeros(samples, dim);
        for k in 0..samples {
            let t = if k + 1 == samples {
                t1
            } else {
                t0 + (t1 - t0) * T::from_usize(k).unwrap() / div
            };
            let span = knots.find_knot_span_index(last, degree, t);
            let basis = knots.basis_functions(span, t, degree);
            for (j, b) in basis.iter().enumerate() {
                m_a[(k, span - degree + j)] = *b;
            }
            let p = self.point_at(map.evaluate(t));
            for (d, v) in coords(p).into_iter().enumerate() {
                m_b[(k, d)] = v;
            }
        }

        // equality constraints: interpolation at the new parameters and seam continuity
        let constraints = n + seam_orders;
        let mut m_c = DMatrix::<T>::zeros(constraints, ncp);
        let mut m_d = DMatrix::<T>::zeros(constraints, dim);
        for (k, (u_new, u_old)) in new_parameters.iter().zip(old_parameters.iter()).enumerate() {
            let span = knots.find_knot_span_index(last, degree, *u_new);
            let basis = knots.basis_functions(span, *u_new, degree);
            for (j, b) in basis.iter().enumerate() {
                m_c[(k, span - degree + j)] = *b;
            }
            for (d, v) in coords(self.point_at(*u_old)).into_iter().enumerate() {
                m_d[(k, d)] = v;
            }
        }
        if closed {
            let start_span = knots.find_knot_span_index(last, degree, t0);
            let end_span = knots.find_knot_span_index(last, degree, t1);
            let ds = knots.derivative_basis_functions(start_span, t0, degree, seam_orders);
            let de = knots.derivative_basis_functions(end_span, t1, degree, seam_orders);
            for order in 1..=seam_orders {
                let row = n + order - 1;
                for j in 0..=degree {
                    m_c[(row, start_span - degree + j)] += ds[order][j];
                    m_c[(row, end_span - degree + j)] -= de[order][j];
                }
                let scale = m_c.row(row).amax();
                if scale > T::zero() {
                    for j in 0..ncp {
                        m_c[(row, j)] /= scale;
                    }
                }
            }
        }

        // KKT system of the constrained least squares problem
        let size = ncp + constraints;
        let ata = m_a.transpose() * &m_a;
        let atb = m_a.transpose() * &m_b;
        let mut m_k = DMatrix::<T>::zeros(size, size);
        m_k.view_mut((0, 0), (ncp, ncp)).copy_from(&ata);
        m_k.view_mut((0, ncp), (ncp, constraints))
            .copy_from(&m_c.transpose());
        m_k.view_mut((ncp, 0), (constraints, ncp)).copy_from(&m_c);
        let mut rhs = DMatrix::<T>::zeros(size, dim);
        rhs.view_mut((0, 0), (ncp, dim)).copy_from(&atb);
        rhs.view_mut((ncp, 0), (constraints, dim)).copy_from(&m_d);

        let lu = m_k.lu();
        let solution = lu
            .solve(&rhs)
            .ok_or(anyhow::anyhow!("Reparametrization system is singular"))?;

        let control_points = (0..ncp)
            .map(|i| {
                let mut c = solution.row(i).iter().copied().collect_vec();
                c.push(T::one());
                OPoint::<T, D>::from_slice(&c)
            })
            .collect();

        Ok(Self::new_unchecked(degree, control_points, knots))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    use super::MonotoneCubicMap;
    use crate::prelude::*;

    #[test]
    fn monotone_map_interpolates_and_never_decreases() {
        let xs = [0., 0.2, 0.4, 1.];
        let ys = [0., 0.05, 0.9, 1.];
        let map = MonotoneCubicMap::try_new(&xs, &ys).unwrap();
        for (x, y) in xs.iter().zip(ys.iter()) {
            assert_relative_eq!(map.evaluate(*x), *y, epsilon = 1e-12);
        }
        let mut prev = map.evaluate(0.);
        for i in 1..=200 {
            let v = map.evaluate(i as f64 / 200.);
            assert!(v >= prev - 1e-14);
            prev = v;
        }
    }

    #[test]
    fn monotone_map_rejects_decreasing_values() {
        assert!(MonotoneCubicMap::try_new(&[0., 0.5, 1.], &[0., 0.7, 0.6]).is_err());
        assert!(MonotoneCubicMap::try_new(&[0., 0., 1.], &[0., 0.5, 1.]).is_err());
    }

    #[test]
    fn identity_reparametrization_keeps_polynomial_curve() {
        let f = |t: f64| Point3::new(t, 2. * t * t - t, 0.5 * t * t * t);
        let parameters = vec![0., 1. / 3., 2. / 3., 1.];
        let points: Vec<_> = parameters.iter().map(|t| f(*t)).collect();
        let curve =
            NurbsCurve3D::try_interpolate_with_parameters(&points, &parameters, 3, false).unwrap();
        let approx = curve
            .try_reparametrize_approx(&parameters, &parameters, 12, false)
            .unwrap();
        assert_eq!(approx.degree(), 3);
        assert_eq!(approx.knots_domain(), (0., 1.));
        for i in 0..=25 {
            let t = i as f64 / 25.;
            assert_relative_eq!(approx.point_at(t), f(t), epsilon = 1e-8);
        }
    }

    #[test]
    fn closed_reparametrization_stays_closed_and_smooth() {
        let n = 12;
        let points: Vec<_> = (0..=n)
            .map(|i| {
                let a = std::f64::consts::TAU * i as f64 / n as f64;
                Point3::new(2. * a.cos(), a.sin(), 0.)
            })
            .collect();
        let parameters: Vec<_> = (0..=n).map(|i| i as f64 / n as f64).collect();
        let curve =
            NurbsCurve3D::try_interpolate_with_parameters(&points, &parameters, 3, true).unwrap();
        let old = vec![0., 0.25, 0.6, 1.];
        let new = vec![0., 0.3, 0.55, 1.];
        let approx = curve
            .try_reparametrize_approx(&old, &new, 30, true)
            .unwrap();
        for (o, n) in old.iter().zip(new.iter()) {
            assert_relative_eq!(approx.point_at(*n), curve.point_at(*o), epsilon = 1e-9);
        }
        let d0 = approx.rational_derivatives(0., 2);
        let d1 = approx.rational_derivatives(1., 2);
        assert_relative_eq!(d0[1], d1[1], epsilon = 1e-6 * d0[1].norm());
        assert_relative_eq!(d0[2], d1[2], epsilon = 1e-6 * d0[2].norm());
    }

    #[test]
    fn too_few_control_points_is_an_error() {
        let points = vec![
            Point3::new(0., 0., 0.),
            Point3::new(1., 0., 0.),
            Point3::new(2., 1., 0.),
        ];
        let curve = NurbsCurve3D::interpolate(&points, 2).unwrap();
        let params = vec![0., 0.2, 0.4, 0.6, 0.8, 1.];
        assert!(curve
            .try_reparametrize_approx(&params, &params, 5, false)
            .is_err());
    }
}
