use nalgebra::DMatrix;

use crate::{curve::ParametricCurve, misc::FloatingPoint};

use super::{error::Result, GordonError};

/// Profiles, guides and the parameters of their pairwise intersections
/// `param_on_profile[(i, j)]` and `param_on_guide[(i, j)]` locate the intersection
/// of profile `i` and guide `j` on the profile and on the guide respectively.
#[derive(Clone, Debug)]
pub struct CurveNetwork<T: FloatingPoint, C> {
    pub(crate) profiles: Vec<C>,
    pub(crate) guides: Vec<C>,
    pub(crate) param_on_profile: DMatrix<T>,
    pub(crate) param_on_guide: DMatrix<T>,
}

impl<T: FloatingPoint, C: ParametricCurve<T>> CurveNetwork<T, C> {
    /// Create a network, both matrices must be (profiles x guides)
    pub fn try_new(
        profiles: Vec<C>,
        guides: Vec<C>,
        param_on_profile: DMatrix<T>,
        param_on_guide: DMatrix<T>,
    ) -> Result<Self> {
        let shape = (profiles.len(), guides.len());
        if shape.0 == 0 || shape.1 == 0 {
            return Err(GordonError::Validation(
                "curve network has no profiles or no guides".to_string(),
            ));
        }
        for (name, m) in [("profile", &param_on_profile), ("guide", &param_on_guide)] {
            if m.shape() != shape {
                return Err(GordonError::Validation(format!(
                    "{} parameter matrix is {:?}, expected {:?}",
                    name,
                    m.shape(),
                    shape
                )));
            }
        }
        Ok(Self {
            profiles,
            guides,
            param_on_profile,
            param_on_guide,
        })
    }

    pub fn profiles(&self) -> &[C] {
        &self.profiles
    }

    pub fn guides(&self) -> &[C] {
        &self.guides
    }

    pub fn param_on_profile(&self) -> &DMatrix<T> {
        &self.param_on_profile
    }

    pub fn param_on_guide(&self) -> &DMatrix<T> {
        &self.param_on_guide
    }

    pub fn profile_count(&self) -> usize {
        self.profiles.len()
    }

    pub fn guide_count(&self) -> usize {
        self.guides.len()
    }

    /// Largest distance between a profile and a guide at their recorded intersection
    pub fn max_intersection_gap(&self) -> T {
        let mut gap = T::zero();
        for (i, profile) in self.profiles.iter().enumerate() {
            for (j, guide) in self.guides.iter().enumerate() {
                let p = profile.evaluate(self.param_on_profile[(i, j)]);
                let q = guide.evaluate(self.param_on_guide[(i, j)]);
                gap = gap.max((p - q).norm());
            }
        }
        gap
    }

    pub fn into_parts(self) -> (Vec<C>, Vec<C>, DMatrix<T>, DMatrix<T>) {
        (
            self.profiles,
            self.guides,
            self.param_on_profile,
            self.param_on_guide,
        )
    }
}
