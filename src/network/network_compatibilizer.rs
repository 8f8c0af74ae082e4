use argmin::core::ArgminFloat;
use itertools::Itertools;
use log::{debug, trace, warn};
use nalgebra::DMatrix;
use num_traits::Float;

use crate::{
    curve::{curves_scale, NurbsCurve3D},
    intersects::{CurveIntersectionSolverOptions, HasIntersectionParameter, Intersects},
    misc::FloatingPoint,
};

use super::{error::Result, CurveNetwork, CurveNetworkSorter, GordonError, GordonOptions};

/// A curve network where profile `i` meets guide `j` at `u_params[j]` on the profile
/// and at `v_params[i]` on the guide
#[derive(Clone, Debug)]
pub struct CompatibleCurveNetwork<T: FloatingPoint> {
    pub profiles: Vec<NurbsCurve3D<T>>,
    pub guides: Vec<NurbsCurve3D<T>>,
    /// Shared parameter of every guide along the profiles
    pub u_params: Vec<T>,
    /// Shared parameter of every profile along the guides
    pub v_params: Vec<T>,
    /// Original index of every profile, prefixed by `-` when reversed
    pub profile_indices: Vec<String>,
    /// Original index of every guide, prefixed by `-` when reversed
    pub guide_indices: Vec<String>,
}

/// Makes a loosely positioned curve network exactly intersecting on a shared parameter lattice
pub struct NetworkCompatibilizer<'a, T: FloatingPoint> {
    profiles: &'a [NurbsCurve3D<T>],
    guides: &'a [NurbsCurve3D<T>],
    tolerance: T,
    options: GordonOptions<T>,
}

impl<'a, T: FloatingPoint + ArgminFloat> NetworkCompatibilizer<'a, T> {
    /// `tolerance` is relative to the size of the curves
    pub fn new(
        profiles: &'a [NurbsCurve3D<T>],
        guides: &'a [NurbsCurve3D<T>],
        tolerance: T,
    ) -> Self {
        Self {
            profiles,
            guides,
            tolerance,
            options: GordonOptions::default(),
        }
    }

    pub fn with_options(mut self, options: GordonOptions<T>) -> Self {
        self.options = options;
        self
    }

    /// Normalize, intersect, sort and reparametrize the network
    pub fn try_compatibilize(&self) -> Result<CompatibleCurveNetwork<T>> {
        if self.profiles.len() < 2 || self.guides.len() < 2 {
            return Err(GordonError::Validation(format!(
                "at least two profiles and two guides are required, got {} and {}",
                self.profiles.len(),
                self.guides.len()
            )));
        }

        let profiles = normalize(self.profiles)?;
        let guides = normalize(self.guides)?;

        let (param_on_profile, param_on_guide) = self.compute_intersections(&profiles, &guides)?;
        let network = CurveNetwork::try_new(profiles, guides, param_on_profile, param_on_guide)?;

        let mut sorter = CurveNetworkSorter::new(network);
        sorter.perform()?;
        let profile_indices = sorter.profile_indices().to_vec();
        let guide_indices = sorter.guide_indices().to_vec();
        let (profiles, guides, mut param_on_profile, mut param_on_guide) =
            sorter.into_network().into_parts();

        self.snap(&mut param_on_profile);
        self.snap(&mut param_on_guide);

        // one parameter per guide along the profiles, one per profile along the guides
        let u_params = self.shared_parameters(
            param_on_profile.column_iter().map(|c| c.mean()).collect(),
            "guides",
        )?;
        let v_params = self.shared_parameters(
            param_on_guide.row_iter().map(|r| r.mean()).collect(),
            "profiles",
        )?;
        debug!("shared parameters u: {:?}, v: {:?}", u_params, v_params);

        let profiles = self.reparametrize(&profiles, &u_params, |i| {
            param_on_profile.row(i).iter().copied().collect()
        })?;
        let guides = self.reparametrize(&guides, &v_params, |j| {
            param_on_guide.column(j).iter().copied().collect()
        })?;

        Ok(CompatibleCurveNetwork {
            profiles,
            guides,
            u_params,
            v_params,
            profile_indices,
            guide_indices,
        })
    }

    /// Intersection parameters of every profile/guide pair as (profiles x guides) matrices
    fn compute_intersections(
        &self,
        profiles: &[NurbsCurve3D<T>],
        guides: &[NurbsCurve3D<T>],
    ) -> Result<(DMatrix<T>, DMatrix<T>)> {
        let (m, n) = (profiles.len(), guides.len());
        let profiles_closed = self.all_closed(profiles);
        let guides_closed = self.all_closed(guides);
        debug!(
            "intersecting {} profiles (closed: {}) with {} guides (closed: {})",
            m, n, profiles_closed, guides_closed
        );

        let half = T::from_f64(0.5).unwrap();
        let mut param_on_profile = DMatrix::zeros(m, n);
        let mut param_on_guide = DMatrix::zeros(m, n);
        let mut missing = vec![];

        for ((i, profile), (j, guide)) in profiles
            .iter()
            .enumerate()
            .cartesian_product(guides.iter().enumerate())
        {
            let scale = (profile.scale() + guide.scale()) * half;
            let options = CurveIntersectionSolverOptions::default()
                .with_minimum_distance(self.tolerance * scale)
                .with_knot_domain_division(self.options.intersection_division);
            let intersections = profile
                .find_intersections(guide, Some(options))?
                .iter()
                .map(|it| (it.a_parameter(), it.b_parameter()))
                .collect_vec();
            trace!("profile {} x guide {}: {:?}", i, j, intersections);

            let ambiguous = GordonError::AmbiguousIntersection {
                profile: i,
                guide: j,
                count: intersections.len(),
            };
            let picked = match intersections.len() {
                0 => {
                    missing.push((i, j));
                    continue;
                }
                1 => intersections[0],
                2 if profiles_closed && !guides_closed => {
                    let by_profile = |a: &(T, T), b: &(T, T)| a.0.partial_cmp(&b.0);
                    pick_boundary(&intersections, j, n, by_profile).ok_or(ambiguous)?
                }
                2 if guides_closed && !profiles_closed => {
                    let by_guide = |a: &(T, T), b: &(T, T)| a.1.partial_cmp(&b.1);
                    pick_boundary(&intersections, i, m, by_guide).ok_or(ambiguous)?
                }
                _ => {
                    warn!(
                        "profile {} and guide {} intersect {} times",
                        i,
                        j,
                        intersections.len()
                    );
                    return Err(ambiguous);
                }
            };
            param_on_profile[(i, j)] = picked.0;
            param_on_guide[(i, j)] = picked.1;
        }

        if !missing.is_empty() {
            warn!("curve pairs without intersection: {:?}", missing);
            return Err(GordonError::NoIntersection { pairs: missing });
        }

        Ok((param_on_profile, param_on_guide))
    }

    fn all_closed(&self, curves: &[NurbsCurve3D<T>]) -> bool {
        let tolerance = self.options.closed_tolerance * curves_scale(curves);
        curves.iter().all(|c| c.is_closed(tolerance))
    }

    /// Snap parameters close to the ends of the unit domain onto them
    fn snap(&self, params: &mut DMatrix<T>) {
        for p in params.iter_mut() {
            *p = snap_to_ends(*p, self.options.snap_tolerance);
        }
    }

    /// Check that the shared parameters span the whole domain and snap their ends
    fn shared_parameters(&self, mut params: Vec<T>, family: &str) -> Result<Vec<T>> {
        let tolerance = self.options.snap_tolerance;
        let (first, last) = (params[0], params[params.len() - 1]);
        if Float::abs(first) > tolerance || Float::abs(last - T::one()) > tolerance {
            warn!(
                "shared parameters of the {} span [{}, {}]",
                family, first, last
            );
            return Err(GordonError::Boundary(format!(
                "the {} span the parameters [{}, {}] instead of [0, 1]",
                family, first, last
            )));
        }
        let end = params.len() - 1;
        params[0] = T::zero();
        params[end] = T::one();
        Ok(params)
    }

    /// Reparametrize every curve so that its old intersection parameters move onto `shared`
    fn reparametrize<F>(
        &self,
        curves: &[NurbsCurve3D<T>],
        shared: &[T],
        old_parameters: F,
    ) -> Result<Vec<NurbsCurve3D<T>>>
    where
        F: Fn(usize) -> Vec<T>,
    {
        let max_control_points = curves
            .iter()
            .map(|c| c.control_points().len())
            .max()
            .unwrap_or(0);
        let budget = self
            .options
            .control_point_budget(max_control_points, shared.len());
        let closed_tolerance = self.options.closed_tolerance * curves_scale(curves);
        debug!(
            "reparametrizing {} curves with {} control points",
            curves.len(),
            budget
        );

        curves
            .iter()
            .enumerate()
            .map(|(k, curve)| {
                let closed = curve.is_closed(closed_tolerance);
                curve
                    .try_reparametrize_approx(&old_parameters(k), shared, budget, closed)
                    .map_err(GordonError::from)
            })
            .collect()
    }
}

/// Map every curve onto the unit domain
fn normalize<T: FloatingPoint>(curves: &[NurbsCurve3D<T>]) -> Result<Vec<NurbsCurve3D<T>>> {
    curves
        .iter()
        .map(|c| {
            c.try_reparametrize(T::zero(), T::one())
                .map_err(GordonError::from)
        })
        .collect()
}

/// Pick the first of two intersections for the first curve of the other family
/// and the last for its last curve, ordering by `compare`
fn pick_boundary<T: FloatingPoint, F>(
    intersections: &[(T, T)],
    index: usize,
    count: usize,
    compare: F,
) -> Option<(T, T)>
where
    F: Fn(&(T, T), &(T, T)) -> Option<std::cmp::Ordering>,
{
    let ordered = intersections
        .iter()
        .copied()
        .sorted_by(|a, b| compare(a, b).unwrap_or(std::cmp::Ordering::Equal))
        .collect_vec();
    if index == 0 {
        ordered.first().copied()
    } else if index + 1 == count {
        ordered.last().copied()
    } else {
        None
    }
}

fn snap_to_ends<T: FloatingPoint>(value: T, tolerance: T) -> T {
    if value.abs() < tolerance {
        T::zero()
    } else if (value - T::one()).abs() < tolerance {
        T::one()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::{pick_boundary, snap_to_ends};

    #[test]
    fn snapping_only_touches_the_ends() {
        assert_eq!(snap_to_ends(3e-6, 1e-5), 0.);
        assert_eq!(snap_to_ends(1. - 3e-6, 1e-5), 1.);
        assert_eq!(snap_to_ends(2e-5, 1e-5), 2e-5);
        assert_eq!(snap_to_ends(0.5, 1e-5), 0.5);
    }

    #[test]
    fn boundary_pick_for_closed_families() {
        let intersections = [(1., 0.3), (0., 0.3)];
        let by_first = |a: &(f64, f64), b: &(f64, f64)| a.0.partial_cmp(&b.0);
        assert_eq!(
            pick_boundary(&intersections, 0, 4, by_first),
            Some((0., 0.3))
        );
        assert_eq!(
            pick_boundary(&intersections, 3, 4, by_first),
            Some((1., 0.3))
        );
        assert_eq!(pick_boundary(&intersections, 1, 4, by_first), None);
    }
}
