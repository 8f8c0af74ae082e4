use std::cmp::Ordering;

use argmin::core::{ArgminFloat, Executor, State};
use itertools::Itertools;
use nalgebra::{
    allocator::Allocator, DefaultAllocator, DimName, DimNameDiff, DimNameSub, OPoint, Vector2, U1,
};
use num_traits::Float;

use crate::{
    curve::NurbsCurve,
    misc::{segment_segment_closest_parameters, FloatingPoint},
    prelude::{HasIntersection, Intersects},
};

use super::{
    CurveCurveIntersection, CurveIntersectionNewton, CurveIntersectionProblem,
    CurveIntersectionSolverOptions,
};

impl<'a, T, D> Intersects<'a, &'a NurbsCurve<T, D>> for NurbsCurve<T, D>
where
    T: FloatingPoint + ArgminFloat,
    D: DimName + DimNameSub<U1>,
    DefaultAllocator: Allocator<D>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    type Output = anyhow::Result<Vec<CurveCurveIntersection<OPoint<T, DimNameDiff<D, U1>>, T>>>;
    type Option = Option<CurveIntersectionSolverOptions<T>>;

    /// Find the intersection points with another curve
    /// Both curves are sampled into polylines, every pair of nearby segments seeds a Gauss-Newton search.
    /// The results are sorted by the parameter on `self`.
    /// * `other` - The other curve to intersect with
    /// * `option` - Hyperparameters for the intersection solver
    /// # Example
    /// ```
    /// use gordon::prelude::*;
    /// use nalgebra::Point3;
    /// use approx::assert_relative_eq;
    ///
    /// let parabola = NurbsCurve3D::try_interpolate_with_parameters(
    ///     &[Point3::new(-1., 1., 0.), Point3::new(0., -1., 0.), Point3::new(1., 1., 0.)],
    ///     &[0., 0.5, 1.],
    ///     2,
    ///     false,
    /// ).unwrap();
    /// let line = NurbsCurve3D::interpolate(&vec![Point3::new(-2., 0., 0.), Point3::new(2., 0., 0.)], 1).unwrap();
    ///
    /// let intersections = parabola.find_intersections(&line, None).unwrap();
    /// assert_eq!(intersections.len(), 2);
    /// let x = 0.5f64.sqrt();
    /// assert_relative_eq!(intersections[0].a().0, Point3::new(-x, 0., 0.), epsilon = 1e-8);
    /// assert_relative_eq!(intersections[1].b().0, Point3::new(x, 0., 0.), epsilon = 1e-8);
    /// ```
    fn find_intersections(
        &'a self,
        other: &'a NurbsCurve<T, D>,
        option: Self::Option,
    ) -> Self::Output {
        let options = option.unwrap_or_default();
        let division = options.knot_domain_division.max(1);

        let a_domain = self.knots_domain();
        let b_domain = other.knots_domain();
        let pa = self.sample_regular_range_with_parameter(a_domain.0, a_domain.1, division + 1);
        let pb = other.sample_regular_range_with_parameter(b_domain.0, b_domain.1, division + 1);

        // seed the solver with the closest parameters of every pair of nearby polyline segments
        let half = T::from_f64(0.5).unwrap();
        let mut seeds = vec![];
        for ((ta0, a0), (ta1, a1)) in pa.iter().tuple_windows() {
            let la = (a1 - a0).norm();
            for ((tb0, b0), (tb1, b1)) in pb.iter().tuple_windows() {
                let lb = (b1 - b0).norm();
                let (s, t, distance) = segment_segment_closest_parameters(a0, a1, b0, b1);
                if distance <= options.minimum_distance + (la + lb) * half {
                    seeds.push(Vector2::new(
                        *ta0 + (*ta1 - *ta0) * s,
                        *tb0 + (*tb1 - *tb0) * t,
                    ));
                }
            }
        }

        let problem_domain = (a_domain, b_domain);
        let found = seeds
            .into_iter()
            .filter_map(|init_param| {
                let problem = CurveIntersectionProblem::new(self, other);
                let solver = CurveIntersectionNewton::<T>::new(problem_domain)
                    .with_step_size_tolerance(options.step_size_tolerance)
                    .with_cost_tolerance(options.cost_tolerance);

                let res = Executor::new(problem, solver)
                    .configure(|state| state.param(init_param).max_iters(options.max_iters))
                    .run();

                match res {
                    Ok(r) => {
                        let state = r.state();
                        state
                            .get_best_param()
                            .or(state.get_param())
                            .map(|param| {
                                let p0 = self.point_at(param[0]);
                                let p1 = other.point_at(param[1]);
                                CurveCurveIntersection::new((p0, param[0]), (p1, param[1]))
                            })
                    }
                    Err(_) => None,
                }
            })
            .filter(|it| {
                let d = (&it.a().0 - &it.b().0).norm();
                d < options.minimum_distance
            })
            .collect_vec();

        // merge solutions close in both parameters, keeping the closest one of each cluster
        let a_tolerance = options.parameter_minimum_distance * self.knots_domain_interval();
        let b_tolerance = options.parameter_minimum_distance * other.knots_domain_interval();
        let distance = |it: &CurveCurveIntersection<OPoint<T, DimNameDiff<D, U1>>, T>| {
            (&it.a().0 - &it.b().0).norm_squared()
        };
        let mut unique: Vec<CurveCurveIntersection<OPoint<T, DimNameDiff<D, U1>>, T>> = vec![];
        for it in found
            .into_iter()
            .sorted_by(|x, y| {
                distance(x)
                    .partial_cmp(&distance(y))
                    .unwrap_or(Ordering::Equal)
            })
        {
            let duplicated = unique.iter().any(|u| {
                Float::abs(u.a().1 - it.a().1) < a_tolerance
                    && Float::abs(u.b().1 - it.b().1) < b_tolerance
            });
            if !duplicated {
                unique.push(it);
            }
        }

        Ok(unique
            .into_iter()
            .sorted_by(|x, y| x.a().1.partial_cmp(&y.a().1).unwrap_or(Ordering::Equal))
            .collect())
    }
}
