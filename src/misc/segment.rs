use nalgebra::{allocator::Allocator, DefaultAllocator, DimName, OPoint, RealField};

/// Closest parameters between two segments `p0-p1` and `q0-q1`
/// Returns `(s, t, distance)` with `s` and `t` in [0, 1]
pub fn segment_segment_closest_parameters<T: RealField + Copy, D: DimName>(
    p0: &OPoint<T, D>,
    p1: &OPoint<T, D>,
    q0: &OPoint<T, D>,
    q1: &OPoint<T, D>,
) -> (T, T, T)
where
    DefaultAllocator: Allocator<D>,
{
    let d1 = p1 - p0;
    let d2 = q1 - q0;
    let r = p0 - q0;
    let a = d1.dot(&d1);
    let e = d2.dot(&d2);
    let f = d2.dot(&r);
    let eps = T::default_epsilon();
    let unit = |v: T| v.clamp(T::zero(), T::one());

    let (s, t) = if a <= eps && e <= eps {
        (T::zero(), T::zero())
    } else if a <= eps {
        (T::zero(), unit(f / e))
    } else {
        let c = d1.dot(&r);
        if e <= eps {
            (unit(-c / a), T::zero())
        } else {
            let b = d1.dot(&d2);
            let denom = a * e - b * b;
            let s = if denom > eps {
                unit((b * f - c * e) / denom)
            } else {
                T::zero()
            };
            let t = (b * s + f) / e;
            if t < T::zero() {
                (unit(-c / a), T::zero())
            } else if t > T::one() {
                (unit((b - c) / a), T::one())
            } else {
                (s, t)
            }
        }
    };

    let cp = p0 + d1 * s;
    let cq = q0 + d2 * t;
    (s, t, (cp - cq).norm())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    use super::segment_segment_closest_parameters;

    #[test]
    fn crossing_segments() {
        let (s, t, d) = segment_segment_closest_parameters(
            &Point3::new(-1., 0., 0.),
            &Point3::new(1., 0., 0.),
            &Point3::new(0.5, -1., 1.),
            &Point3::new(0.5, 1., 1.),
        );
        assert_relative_eq!(s, 0.75);
        assert_relative_eq!(t, 0.5);
        assert_relative_eq!(d, 1.0);
    }

    #[test]
    fn parallel_segments() {
        let (_, _, d) = segment_segment_closest_parameters(
            &Point3::new(0., 0., 0.),
            &Point3::new(1., 0., 0.),
            &Point3::new(0., 2., 0.),
            &Point3::new(1., 2., 0.),
        );
        assert_relative_eq!(d, 2.0);
    }
}
