use log::debug;

use crate::{curve::ParametricCurve, misc::FloatingPoint};

use super::{error::Result, CurveNetwork, GordonError};

/// Brings a curve network into canonical order and orientation
/// After `perform`, profile 0 and guide 0 meet at the start of both curves,
/// and the intersection parameters increase with the row and column indices.
/// Every curve carries a label of its original index, prefixed by `-` for each reversal.
#[derive(Clone, Debug)]
pub struct CurveNetworkSorter<T: FloatingPoint, C> {
    network: CurveNetwork<T, C>,
    profile_indices: Vec<String>,
    guide_indices: Vec<String>,
    has_performed: bool,
}

impl<T: FloatingPoint, C: ParametricCurve<T>> CurveNetworkSorter<T, C> {
    /// Create a sorter over the given network
    /// # Example
    /// ```
    /// use gordon::prelude::*;
    /// use nalgebra::{DMatrix, Point3};
    ///
    /// let line = |a: Point3<f64>, b: Point3<f64>| NurbsCurve3D::interpolate(&vec![a, b], 1).unwrap();
    /// let profiles = vec![
    ///     line(Point3::new(0., 1., 0.), Point3::new(1., 1., 0.)),
    ///     line(Point3::new(0., 0., 0.), Point3::new(1., 0., 0.)),
    /// ];
    /// let guides = vec![
    ///     line(Point3::new(0., 0., 0.), Point3::new(0., 1., 0.)),
    ///     line(Point3::new(1., 0., 0.), Point3::new(1., 1., 0.)),
    /// ];
    /// let on_profile = DMatrix::from_row_slice(2, 2, &[0., 1., 0., 1.]);
    /// let on_guide = DMatrix::from_row_slice(2, 2, &[1., 1., 0., 0.]);
    /// let network = CurveNetwork::try_new(profiles, guides, on_profile, on_guide).unwrap();
    ///
    /// let mut sorter = CurveNetworkSorter::new(network);
    /// sorter.perform().unwrap();
    /// assert_eq!(sorter.profile_indices(), &["1", "0"]);
    /// assert_eq!(sorter.guide_indices(), &["0", "1"]);
    /// ```
    pub fn new(network: CurveNetwork<T, C>) -> Self {
        let profile_indices = (0..network.profile_count())
            .map(|i| i.to_string())
            .collect();
        let guide_indices = (0..network.guide_count()).map(|j| j.to_string()).collect();
        Self {
            network,
            profile_indices,
            guide_indices,
            has_performed: false,
        }
    }

    pub fn network(&self) -> &CurveNetwork<T, C> {
        &self.network
    }

    pub fn into_network(self) -> CurveNetwork<T, C> {
        self.network
    }

    pub fn profile_indices(&self) -> &[String] {
        &self.profile_indices
    }

    pub fn guide_indices(&self) -> &[String] {
        &self.guide_indices
    }

    /// Find the corner the sorted network starts from as `(profile, guide, guide_must_be_reversed)`
    /// A profile starts at the guide it meets first. That corner is a start if the guide
    /// also meets this profile first, or, for a closed network, last.
    pub fn start_curve_indices(&self) -> Result<(usize, usize, bool)> {
        let on_profile = &self.network.param_on_profile;
        let on_guide = &self.network.param_on_guide;

        for reversed in [false, true] {
            for row in 0..self.network.profile_count() {
                let column = argmin(on_profile.row(row).iter().copied());
                let values = on_guide.column(column);
                let candidate = if reversed {
                    argmax(values.iter().copied())
                } else {
                    argmin(values.iter().copied())
                };
                if candidate == row {
                    return Ok((row, column, reversed));
                }
            }
        }

        Err(GordonError::DegenerateNetwork)
    }

    /// Sort and orient the network, a second call does nothing
    pub fn perform(&mut self) -> Result<()> {
        if self.has_performed {
            return Ok(());
        }

        let (profile, guide, reverse_guide) = self.start_curve_indices()?;
        debug!(
            "curve network starts at profile {} and guide {}{}",
            profile,
            guide,
            if reverse_guide { " (reversed)" } else { "" }
        );

        self.swap_profiles(0, profile);
        self.swap_guides(0, guide);
        if reverse_guide {
            self.reverse_guide(0);
        }

        let m = self.network.profile_count();
        let n = self.network.guide_count();

        // bubble sort the guides along profile 0, then the profiles along guide 0
        for end in (2..n).rev() {
            for j in 1..end {
                if self.network.param_on_profile[(0, j)]
                    > self.network.param_on_profile[(0, j + 1)]
                {
                    self.swap_guides(j, j + 1);
                }
            }
        }
        for end in (2..m).rev() {
            for i in 1..end {
                if self.network.param_on_guide[(i, 0)] > self.network.param_on_guide[(i + 1, 0)]
                {
                    self.swap_profiles(i, i + 1);
                }
            }
        }

        for i in 1..m {
            if self.network.param_on_profile[(i, 0)] > self.network.param_on_profile[(i, n - 1)] {
                self.reverse_profile(i);
            }
        }
        for j in 1..n {
            if self.network.param_on_guide[(0, j)] > self.network.param_on_guide[(m - 1, j)] {
                self.reverse_guide(j);
            }
        }

        debug!(
            "sorted curve network: profiles {:?}, guides {:?}",
            self.profile_indices, self.guide_indices
        );
        self.has_performed = true;
        Ok(())
    }

    /// Exchange two profiles with their matrix rows and labels
    pub fn swap_profiles(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.network.profiles.swap(a, b);
        self.network.param_on_profile.swap_rows(a, b);
        self.network.param_on_guide.swap_rows(a, b);
        self.profile_indices.swap(a, b);
    }

    /// Exchange two guides with their matrix columns and labels
    pub fn swap_guides(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.network.guides.swap(a, b);
        self.network.param_on_profile.swap_columns(a, b);
        self.network.param_on_guide.swap_columns(a, b);
        self.guide_indices.swap(a, b);
    }

    /// Reverse profile `i`, reflecting its intersection parameters within its domain
    pub fn reverse_profile(&mut self, i: usize) {
        let curve = &mut self.network.profiles[i];
        let sum = curve.first_parameter() + curve.last_parameter();
        curve.reverse();
        for p in self.network.param_on_profile.row_mut(i).iter_mut() {
            *p = sum - *p;
        }
        self.profile_indices[i] = format!("-{}", self.profile_indices[i]);
    }

    /// Reverse guide `j`, reflecting its intersection parameters within its domain
    pub fn reverse_guide(&mut self, j: usize) {
        let curve = &mut self.network.guides[j];
        let sum = curve.first_parameter() + curve.last_parameter();
        curve.reverse();
        for p in self.network.param_on_guide.column_mut(j).iter_mut() {
            *p = sum - *p;
        }
        self.guide_indices[j] = format!("-{}", self.guide_indices[j]);
    }
}

/// Index of the first smallest value
fn argmin<T: PartialOrd>(values: impl Iterator<Item = T>) -> usize {
    let mut best: Option<(usize, T)> = None;
    for (i, v) in values.enumerate() {
        match &best {
            Some((_, b)) if v >= *b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i).unwrap_or(0)
}

/// Index of the first largest value
fn argmax<T: PartialOrd>(values: impl Iterator<Item = T>) -> usize {
    let mut best: Option<(usize, T)> = None;
    for (i, v) in values.enumerate() {
        match &best {
            Some((_, b)) if v <= *b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{argmax, argmin};

    #[test]
    fn first_occurrence_wins_ties() {
        assert_eq!(argmin([0.3, 0.1, 0.1].into_iter()), 1);
        assert_eq!(argmax([1., 0., 1.].into_iter()), 0);
        assert_eq!(argmin(std::iter::empty::<f64>()), 0);
    }
}
