use crate::misc::FloatingPoint;

/// Hyperparameters for the curve intersection solver.
#[derive(Clone, Debug)]
pub struct CurveIntersectionSolverOptions<T: FloatingPoint> {
    /// Maximum distance between the two curve points to accept them as an intersection.
    pub minimum_distance: T,
    /// Number of polyline segments each curve is divided into to seed the solver.
    pub knot_domain_division: usize,
    /// Two solutions closer than this in both parameters, relative to each knot domain, are merged.
    pub parameter_minimum_distance: T,
    /// The solver stops when a step gets shorter than this.
    pub step_size_tolerance: T,
    /// The solver stops when half the squared distance gets lower than this.
    pub cost_tolerance: T,
    /// Maximum number of iterations for the Newton method.
    pub max_iters: u64,
}

impl<T: FloatingPoint> Default for CurveIntersectionSolverOptions<T> {
    fn default() -> Self {
        Self {
            minimum_distance: T::from_f64(1e-5).unwrap(),
            knot_domain_division: 64,
            parameter_minimum_distance: T::from_f64(1e-4).unwrap(),
            step_size_tolerance: T::from_f64(1e-12).unwrap(),
            cost_tolerance: T::from_f64(1e-24).unwrap(),
            max_iters: 50,
        }
    }
}

impl<T: FloatingPoint> CurveIntersectionSolverOptions<T> {
    pub fn with_minimum_distance(mut self, minimum_distance: T) -> Self {
        self.minimum_distance = minimum_distance;
        self
    }

    pub fn with_knot_domain_division(mut self, knot_domain_division: usize) -> Self {
        self.knot_domain_division = knot_domain_division;
        self
    }

    pub fn with_parameter_minimum_distance(mut self, parameter_minimum_distance: T) -> Self {
        self.parameter_minimum_distance = parameter_minimum_distance;
        self
    }

    pub fn with_step_size_tolerance(mut self, step_size_tolerance: T) -> Self {
        self.step_size_tolerance = step_size_tolerance;
        self
    }

    pub fn with_cost_tolerance(mut self, cost_tolerance: T) -> Self {
        self.cost_tolerance = cost_tolerance;
        self
    }

    pub fn with_max_iters(mut self, max_iters: u64) -> Self {
        self.max_iters = max_iters;
        self
    }
}
