use crate::misc::FloatingPoint;

/// Tunable constants of the curve network interpolation
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GordonOptions<T> {
    /// Intersection parameters this close to the ends of the unit domain are snapped onto them.
    pub snap_tolerance: T,
    /// Lower bound of the control point count of a reparametrized curve.
    pub min_control_points: usize,
    /// Upper bound of the control point count of a reparametrized curve.
    pub max_control_points: usize,
    /// Control points added to the largest input count when reparametrizing.
    pub control_point_headroom: usize,
    /// Relative tolerance to detect closed curves and closed networks.
    pub closed_tolerance: T,
    /// Tolerance on the parameter domains of the curves of one family.
    pub domain_tolerance: T,
    /// Number of polyline segments each curve is sampled into to seed the intersection search.
    pub intersection_division: usize,
}

impl<T: FloatingPoint> Default for GordonOptions<T> {
    fn default() -> Self {
        Self {
            snap_tolerance: T::from_f64(1e-5).unwrap(),
            min_control_points: 10,
            max_control_points: 80,
            control_point_headroom: 10,
            closed_tolerance: T::from_f64(1e-8).unwrap(),
            domain_tolerance: T::from_f64(1e-5).unwrap(),
            intersection_division: 64,
        }
    }
}

impl<T: FloatingPoint> GordonOptions<T> {
    pub fn with_snap_tolerance(mut self, snap_tolerance: T) -> Self {
        self.snap_tolerance = snap_tolerance;
        self
    }

    pub fn with_control_point_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_control_points = min;
        self.max_control_points = max;
        self
    }

    pub fn with_control_point_headroom(mut self, headroom: usize) -> Self {
        self.control_point_headroom = headroom;
        self
    }

    pub fn with_closed_tolerance(mut self, closed_tolerance: T) -> Self {
        self.closed_tolerance = closed_tolerance;
        self
    }

    pub fn with_domain_tolerance(mut self, domain_tolerance: T) -> Self {
        self.domain_tolerance = domain_tolerance;
        self
    }

    pub fn with_intersection_division(mut self, division: usize) -> Self {
        self.intersection_division = division;
        self
    }

    /// Control points for a reparametrized curve hit by `count` curves of the other family
    /// The largest input count plus the headroom, bounded by the configured range,
    /// and never below `count + 2`.
    /// # Example
    /// ```
    /// use gordon::prelude::*;
    /// let options = GordonOptions::<f64>::default();
    /// assert_eq!(options.control_point_budget(4, 3), 14);
    /// assert_eq!(options.control_point_budget(0, 3), 10);
    /// assert_eq!(options.control_point_budget(200, 3), 80);
    /// assert_eq!(options.control_point_budget(200, 100), 102);
    /// ```
    pub fn control_point_budget(&self, max_control_points: usize, count: usize) -> usize {
        let lower = (count + 2).max(self.min_control_points);
        let upper = (count + 2).max(self.max_control_points);
        (max_control_points + self.control_point_headroom)
            .max(lower)
            .min(upper)
    }
}
