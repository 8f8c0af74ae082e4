use itertools::Itertools;
use nalgebra::DVector;

use crate::misc::FloatingPoint;

/// Parameterization of a point sequence for interpolation
/// https://en.wikipedia.org/wiki/Centripetal_Catmull%E2%80%93Rom_spline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KnotStyle {
    Uniform,
    #[default]
    Chordal,
    Centripetal,
}

impl KnotStyle {
    /// Ascending parameters on [0, 1], one per point
    /// Falls back to uniform spacing when the points are all coincident
    /// # Example
    /// ```
    /// use gordon::prelude::KnotStyle;
    /// use nalgebra::DVector;
    /// let points = vec![
    ///     DVector::from_vec(vec![0., 0.]),
    ///     DVector::from_vec(vec![1., 0.]),
    ///     DVector::from_vec(vec![4., 0.]),
    /// ];
    /// assert_eq!(KnotStyle::Chordal.parameterize(&points), vec![0., 0.25, 1.]);
    /// assert_eq!(KnotStyle::Uniform.parameterize(&points), vec![0., 0.5, 1.]);
    /// ```
    pub fn parameterize<T: FloatingPoint>(&self, points: &[DVector<T>]) -> Vec<T> {
        let n = points.len();
        if n < 2 {
            return vec![T::zero(); n];
        }

        let steps: Vec<T> = match self {
            KnotStyle::Uniform => vec![T::one(); n - 1],
            KnotStyle::Chordal | KnotStyle::Centripetal => {
                let alpha = self.alpha::<T>();
                points
                    .iter()
                    .tuple_windows()
                    .map(|(a, b)| (b - a).norm().powf(alpha))
                    .collect()
            }
        };

        let total = steps.iter().fold(T::zero(), |acc, s| acc + *s);
        if total <= T::zero() {
            return KnotStyle::Uniform.parameterize(points);
        }

        let mut acc = T::zero();
        let mut parameters = vec![T::zero()];
        parameters.extend(steps.iter().take(n - 2).map(|s| {
            acc += *s;
            acc / total
        }));
        parameters.push(T::one());
        parameters
    }

    fn alpha<T: FloatingPoint>(&self) -> T {
        match self {
            KnotStyle::Centripetal => T::from_f64(0.5).unwrap(),
            _ => T::one(),
        }
    }
}
