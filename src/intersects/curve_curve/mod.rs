use super::Intersection;

pub mod curve_intersection_newton;
pub mod curve_intersection_problem;
pub mod curve_intersection_solver_options;
pub mod intersection_curve_curve;

pub use curve_intersection_newton::*;
pub use curve_intersection_problem::*;
pub use curve_intersection_solver_options::*;

/// Intersection of two curves, holding the point and parameter on each
pub type CurveCurveIntersection<P, T> = Intersection<P, T, T>;
