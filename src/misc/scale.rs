use nalgebra::{allocator::Allocator, DefaultAllocator, DimName, OPoint, RealField};

/// Largest distance of any point from the first one, zero for an empty slice
pub fn point_spread<T: RealField + Copy, D: DimName>(points: &[OPoint<T, D>]) -> T
where
    DefaultAllocator: Allocator<D>,
{
    match points.first() {
        Some(first) => points
            .iter()
            .fold(T::zero(), |acc, p| acc.max((p - first).norm())),
        None => T::zero(),
    }
}

/// Characteristic size of a grid of points: the largest spread of any row
/// # Example
/// ```
/// use gordon::prelude::points_scale;
/// use nalgebra::Point3;
/// let rows = vec![
///     vec![Point3::new(0., 0., 0.), Point3::new(3., 4., 0.)],
///     vec![Point3::new(0., 1., 0.), Point3::new(1., 1., 0.)],
/// ];
/// assert_eq!(points_scale(&rows), 5.);
/// ```
pub fn points_scale<T: RealField + Copy, D: DimName>(rows: &[Vec<OPoint<T, D>>]) -> T
where
    DefaultAllocator: Allocator<D>,
{
    rows.iter()
        .fold(T::zero(), |acc, row| acc.max(point_spread(row)))
}
