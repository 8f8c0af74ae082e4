use std::ops::Index;

use nalgebra::RealField;

use crate::misc::{FloatingPoint, Invertible};

use super::KnotMultiplicity;

/// Knot vector representation
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KnotVector<T>(Vec<T>);

impl<T: RealField + Copy> KnotVector<T> {
    pub fn new(knots: Vec<T>) -> Self {
        Self(knots)
    }

    /// Create a clamped knot vector on [0, 1] with uniformly spaced interior knots
    /// # Example
    /// ```
    /// use gordon::prelude::KnotVector;
    /// let knots: KnotVector<f64> = KnotVector::clamped_uniform(5, 2);
    /// assert_eq!(knots.to_vec(), vec![0., 0., 0., 1. / 3., 2. / 3., 1., 1., 1.]);
    /// ```
    pub fn clamped_uniform(control_points: usize, degree: usize) -> Self {
        let spans = control_points - degree;
        let denom = T::from_usize(spans).unwrap();
        let mut knots = vec![T::zero(); degree + 1];
        knots.extend((1..spans).map(|i| T::from_usize(i).unwrap() / denom));
        knots.extend(std::iter::repeat_n(T::one(), degree + 1));
        Self(knots)
    }

    /// Create a clamped knot vector whose interior knots average `degree` consecutive parameters
    /// (The NURBS Book eq. 9.8)
    /// # Example
    /// ```
    /// use gordon::prelude::KnotVector;
    /// let knots = KnotVector::averaged(&[0., 0.25, 0.5, 0.75, 1.], 2);
    /// assert_eq!(knots.to_vec(), vec![0., 0., 0., 0.375, 0.625, 1., 1., 1.]);
    /// ```
    pub fn averaged(parameters: &[T], degree: usize) -> Self {
        let n = parameters.len();
        let first = parameters[0];
        let last = parameters[n - 1];
        let inv = T::one() / T::from_usize(degree).unwrap();
        let mut knots = vec![first; degree + 1];
        for i in 1..(n - degree) {
            let sum = parameters[i..(i + degree)]
                .iter()
                .fold(T::zero(), |acc, v| acc + *v);
            knots.push(sum * inv);
        }
        knots.extend(std::iter::repeat_n(last, degree + 1));
        Self(knots)
    }

    /// Create a clamped knot vector whose interior knots are the interior parameters
    /// Used by closed interpolation, which carries `degree - 1` extra control points
    pub fn from_parameters(parameters: &[T], degree: usize) -> Self {
        let n = parameters.len();
        let mut knots = vec![parameters[0]; degree + 1];
        knots.extend(parameters[1..(n - 1)].iter().cloned());
        knots.extend(std::iter::repeat_n(parameters[n - 1], degree + 1));
        Self(knots)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.0.clone()
    }

    pub fn first(&self) -> T {
        self.0[0]
    }

    pub fn last(&self) -> T {
        self.0[self.0.len() - 1]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    /// Get the domain of the knot vector by degree
    pub fn domain(&self, degree: usize) -> (T, T) {
        (self.0[degree], self.0[self.0.len() - 1 - degree])
    }

    /// Map the knots affinely so that the range `from` becomes `to`
    /// # Example
    /// ```
    /// use gordon::prelude::KnotVector;
    /// let knots = KnotVector::new(vec![2., 2., 3., 6., 6.]);
    /// assert_eq!(knots.rescaled((2., 6.), (0., 1.)).to_vec(), vec![0., 0., 0.25, 1., 1.]);
    /// ```
    pub fn rescaled(&self, from: (T, T), to: (T, T)) -> Self {
        let (f0, f1) = from;
        let (t0, t1) = to;
        let factor = (t1 - t0) / (f1 - f0);
        let knots = self
            .0
            .iter()
            .map(|k| {
                // keep the ends of the range exact
                if *k == f0 {
                    t0
                } else if *k == f1 {
                    t1
                } else {
                    t0 + (*k - f0) * factor
                }
            })
            .collect();
        Self(knots)
    }

    /// Get the multiplicity of each knot
    /// # Example
    /// ```
    /// use gordon::prelude::KnotVector;
    /// let knots = KnotVector::new(vec![0., 0., 0., 1., 2., 3., 3., 3.]);
    /// let knot_multiplicity = knots.multiplicity();
    /// assert_eq!(knot_multiplicity[0].multiplicity(), 3);
    /// assert_eq!(knot_multiplicity[1].multiplicity(), 1);
    /// assert_eq!(knot_multiplicity[3].multiplicity(), 3);
    /// ```
    pub fn multiplicity(&self) -> Vec<KnotMultiplicity<T>> {
        let mut mult = vec![];

        let mut current = KnotMultiplicity::new(self.0[0], 0);
        self.0.iter().for_each(|knot| {
            if (*knot - *current.knot()).abs() > T::default_epsilon() {
                mult.push(current.clone());
                current = KnotMultiplicity::new(*knot, 0);
            }
            current.increment_multiplicity();
        });
        mult.push(current);

        mult
    }

    /// Check if the knot vector is clamped
    /// `clamped` means the first and last knots have a multiplicity greater than the degree
    pub fn is_clamped(&self, degree: usize) -> bool {
        let multiplicity = self.multiplicity();
        match (multiplicity.first(), multiplicity.last()) {
            (Some(start), Some(end)) => {
                start.multiplicity() > degree && end.multiplicity() > degree
            }
            _ => false,
        }
    }

    /// Find the knot span index by binary search
    /// `n` is the index of the last control point
    ///
    /// # Example
    /// ```
    /// use gordon::prelude::KnotVector;
    /// let knots = KnotVector::new(vec![0., 0., 0., 1., 2., 3., 3., 3.]);
    /// assert_eq!(knots.find_knot_span_index(4, 2, 2.5), 4);
    /// assert_eq!(knots.find_knot_span_index(4, 2, 3.), 4);
    /// assert_eq!(knots.find_knot_span_index(4, 2, 0.), 2);
    /// ```
    pub fn find_knot_span_index(&self, n: usize, degree: usize, u: T) -> usize {
        if u > self[n + 1] - T::default_epsilon() {
            return n;
        }

        if u < self[degree] + T::default_epsilon() {
            return degree;
        }

        let mut low = degree;
        let mut high = n + 1;
        let mut mid = (low + high) / 2;
        while u < self[mid] || self[mid + 1] <= u {
            if u < self[mid] {
                high = mid;
            } else {
                low = mid;
            }
            let next = (low + high) / 2;
            if mid == next {
                break;
            }
            mid = next;
        }

        mid
    }

    /// Compute the non-vanishing basis functions
    pub fn basis_functions(&self, knot_span_index: usize, u: T, degree: usize) -> Vec<T> {
        let mut basis_functions = vec![T::zero(); degree + 1];
        let mut left = vec![T::zero(); degree + 1];
        let mut right = vec![T::zero(); degree + 1];

        basis_functions[0] = T::one();

        for j in 1..=degree {
            left[j] = u - self[knot_span_index + 1 - j];
            right[j] = self[knot_span_index + j] - u;
            let mut saved = T::zero();

            for r in 0..j {
                let temp = basis_functions[r] / (right[r + 1] + left[j - r]);
                basis_functions[r] = saved + right[r + 1] * temp;
                saved = left[j - r] * temp;
            }

            basis_functions[j] = saved;
        }

        basis_functions
    }

    /// Compute the non-vanishing basis functions and their derivatives up to order `n`
    /// Row k of the result holds the k-th derivatives. `n` must not exceed `degree`.
    pub fn derivative_basis_functions(
        &self,
        knot_index: usize,
        u: T,
        degree: usize,
        n: usize,
    ) -> Vec<Vec<T>> {
        let mut ndu = vec![vec![T::zero(); degree + 1]; degree + 1];
        let mut left = vec![T::zero(); degree + 1];
        let mut right = vec![T::zero(); degree + 1];

        ndu[0][0] = T::one();

        for j in 1..=degree {
            left[j] = u - self[knot_index + 1 - j];
            right[j] = self[knot_index + j] - u;

            let mut saved = T::zero();
            for r in 0..j {
                // lower triangle
                ndu[j][r] = right[r + 1] + left[j - r];
                let temp = ndu[r][j - 1] / ndu[j][r];

                // upper triangle
                ndu[r][j] = saved + right[r + 1] * temp;
                saved = left[j - r] * temp;
            }
            ndu[j][j] = saved;
        }

        let mut ders = vec![vec![T::zero(); degree + 1]; n + 1];
        let mut a = vec![vec![T::zero(); degree + 1]; 2];

        for j in 0..=degree {
            ders[0][j] = ndu[j][degree];
        }

        let idegree = degree as isize;
        let n = n.min(degree) as isize;

        for r in 0..=idegree {
            let mut s1 = 0;
            let mut s2 = 1;
            a[0][0] = T::one();

            for k in 1..=n {
                let mut d = T::zero();
                let rk = r - k;
                let pk = idegree - k;

                if r >= k {
                    a[s2][0] = a[s1][0] / ndu[(pk + 1) as usize][rk as usize];
                    d = a[s2][0] * ndu[rk as usize][pk as usize];
                }

                let j1 = if rk >= -1 { 1 } else { -rk };
                let j2 = if r - 1 <= pk { k - 1 } else { idegree - r };

                for j in j1..=j2 {
                    a[s2][j as usize] = (a[s1][j as usize] - a[s1][j as usize - 1])
                        / ndu[(pk + 1) as usize][(rk + j) as usize];
                    d += a[s2][j as usize] * ndu[(rk + j) as usize][pk as usize];
                }

                let uk = k as usize;
                let ur = r as usize;
                if r <= pk {
                    a[s2][uk] = -a[s1][(k - 1) as usize] / ndu[(pk + 1) as usize][ur];
                    d += a[s2][uk] * ndu[ur][pk as usize];
                }

                ders[uk][ur] = d;

                std::mem::swap(&mut s1, &mut s2);
            }
        }

        let mut acc = idegree;
        for k in 1..=n {
            for j in 0..=idegree {
                ders[k as usize][j as usize] *= T::from_isize(acc).unwrap();
            }
            acc *= idegree - k;
        }
        ders
    }
}

impl<T> Index<usize> for KnotVector<T> {
    type Output = T;
    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<T> FromIterator<T> for KnotVector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<T: FloatingPoint> Invertible for KnotVector<T> {
    /// Reverses the knot vector, keeping its first knot in place
    /// # Example
    /// ```
    /// use gordon::prelude::*;
    /// let mut knot = KnotVector::new(vec![0., 0., 0., 1., 2., 2.5, 3.5, 4.0, 4.0]);
    /// knot.invert();
    /// assert_eq!(knot.to_vec(), vec![0.0, 0.0, 0.5, 1.5, 2.0, 3.0, 4.0, 4.0, 4.0]);
    /// ```
    fn invert(&mut self) {
        if self.0.is_empty() {
            return;
        }
        let len = self.len();
        let mut next = vec![self.0[0]];
        for i in 1..len {
            next.push(next[i - 1] + (self[len - i] - self[len - i - 1]));
        }
        self.0 = next;
    }
}
