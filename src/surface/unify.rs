use nalgebra::{
    allocator::Allocator, DefaultAllocator, DimName, DimNameDiff, DimNameSub, RealField, U1,
};

use crate::{curve::NurbsCurve, misc::FloatingPoint};

use super::NurbsSurface;

/// Bring a set of curves onto a common degree, parameter domain and knot vector
/// Every curve is mapped onto the domain of the first one.
pub fn try_unify_curve_knot_vectors<T, D>(
    curves: &[NurbsCurve<T, D>],
) -> anyhow::Result<Vec<NurbsCurve<T, D>>>
where
    T: FloatingPoint,
    D: DimName,
    DefaultAllocator: Allocator<D>,
{
    let first = curves
        .first()
        .ok_or(anyhow::anyhow!("No curves to unify"))?;
    let max_degree = curves.iter().fold(0, |d, c| d.max(c.degree()));
    let (start, end) = first.knots_domain();

    // elevate all curves to the same degree and domain
    let mut curves = curves
        .iter()
        .map(|c| {
            c.try_elevate_degree(max_degree)
                .and_then(|c| c.try_reparametrize(start, end))
        })
        .collect::<anyhow::Result<Vec<NurbsCurve<T, D>>>>()?;

    let merged_knots = curves
        .iter()
        .fold(vec![], |a, c| sorted_set_union(c.knots().as_slice(), &a));

    for curve in curves.iter_mut() {
        let rem = sorted_set_sub(&merged_knots, curve.knots().as_slice());
        if !rem.is_empty() {
            curve.try_refine_knot(rem)?;
        }
    }

    Ok(curves)
}

/// Bring a set of surfaces onto common degrees and knot vectors in both directions
/// All surfaces must already share the same parameter domain.
pub fn try_unify_surface_knot_vectors<T, D>(
    surfaces: &[NurbsSurface<T, D>],
) -> anyhow::Result<Vec<NurbsSurface<T, D>>>
where
    T: FloatingPoint,
    D: DimName + DimNameSub<U1>,
    DefaultAllocator: Allocator<D>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    let first = surfaces
        .first()
        .ok_or(anyhow::anyhow!("No surfaces to unify"))?;
    let tolerance = T::from_f64(1e-10).unwrap();
    let same_domain = |a: (T, T), b: (T, T)| {
        (a.0 - b.0).abs() <= tolerance && (a.1 - b.1).abs() <= tolerance
    };
    anyhow::ensure!(
        surfaces.iter().all(|s| {
            same_domain(s.u_knots_domain(), first.u_knots_domain())
                && same_domain(s.v_knots_domain(), first.v_knots_domain())
        }),
        "Surfaces must share the same parameter domain to be unified"
    );

    let u_degree = surfaces.iter().fold(0, |d, s| d.max(s.u_degree()));
    let v_degree = surfaces.iter().fold(0, |d, s| d.max(s.v_degree()));
    let surfaces = surfaces
        .iter()
        .map(|s| s.try_elevate_degree(u_degree, v_degree))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let merged_u = surfaces
        .iter()
        .fold(vec![], |a, s| sorted_set_union(s.u_knots().as_slice(), &a));
    let merged_v = surfaces
        .iter()
        .fold(vec![], |a, s| sorted_set_union(s.v_knots().as_slice(), &a));

    surfaces
        .iter()
        .map(|s| {
            let s = s.try_refine_u_knot(sorted_set_sub(&merged_u, s.u_knots().as_slice()))?;
            s.try_refine_v_knot(sorted_set_sub(&merged_v, s.v_knots().as_slice()))
        })
        .collect()
}

/// Union of two sorted multisets, equal values are matched within machine epsilon
pub(crate) fn sorted_set_union<T: RealField + Copy>(a: &[T], b: &[T]) -> Vec<T> {
    let mut merged = Vec::with_capacity(a.len() + b.len());
    let mut ai = 0;
    let mut bi = 0;
    while ai < a.len() || bi < b.len() {
        if ai >= a.len() {
            merged.push(b[bi]);
            bi += 1;
            continue;
        } else if bi >= b.len() {
            merged.push(a[ai]);
            ai += 1;
            continue;
        }

        let diff = a[ai] - b[bi];

        if diff.abs() < T::default_epsilon() {
            merged.push(a[ai]);
            ai += 1;
            bi += 1;
        } else if diff > T::zero() {
            merged.push(b[bi]);
            bi += 1;
        } else {
            merged.push(a[ai]);
            ai += 1;
        }
    }

    merged
}

/// Elements of the sorted multiset `a` missing from its sorted subset `b`
pub(crate) fn sorted_set_sub<T: RealField + Copy>(a: &[T], b: &[T]) -> Vec<T> {
    let mut result = Vec::new();
    let mut bi = 0;

    for v in a.iter() {
        if bi < b.len() && (*v - b[bi]).abs() < T::default_epsilon() {
            bi += 1;
        } else {
            result.push(*v);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::{sorted_set_sub, sorted_set_union};

    #[test]
    fn multiset_union_keeps_highest_multiplicity() {
        let a = [0., 0., 0.5, 0.5, 1., 1.];
        let b = [0., 0., 0.25, 0.5, 1., 1.];
        assert_eq!(
            sorted_set_union(&a, &b),
            vec![0., 0., 0.25, 0.5, 0.5, 1., 1.]
        );
    }

    #[test]
    fn multiset_difference() {
        let merged = [0., 0., 0.25, 0.5, 0.5, 1., 1.];
        let b = [0., 0., 0.5, 1., 1.];
        assert_eq!(sorted_set_sub(&merged, &b), vec![0.25, 0.5]);
    }
}
