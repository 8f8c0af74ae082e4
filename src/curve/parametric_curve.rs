use nalgebra::Point3;

use crate::misc::{FloatingPoint, Invertible};

use super::NurbsCurve3D;

/// The capabilities a curve needs to take part in a curve network
pub trait ParametricCurve<T: FloatingPoint>: Clone {
    /// Evaluate the curve at `t`
    fn evaluate(&self, t: T) -> Point3<T>;

    /// Start of the parameter domain
    fn first_parameter(&self) -> T;

    /// End of the parameter domain
    fn last_parameter(&self) -> T;

    /// Reverse the direction in place, keeping the parameter domain
    fn reverse(&mut self);

    /// Check if the curve ends where it starts
    fn is_closed(&self, tolerance: T) -> bool;

    /// Check if two curves are the same within `tolerance`
    fn is_equal(&self, other: &Self, tolerance: T) -> bool;
}

impl<T: FloatingPoint> ParametricCurve<T> for NurbsCurve3D<T> {
    fn evaluate(&self, t: T) -> Point3<T> {
        self.point_at(t)
    }

    fn first_parameter(&self) -> T {
        self.knots_domain().0
    }

    fn last_parameter(&self) -> T {
        self.knots_domain().1
    }

    fn reverse(&mut self) {
        self.invert();
    }

    fn is_closed(&self, tolerance: T) -> bool {
        NurbsCurve3D::is_closed(self, tolerance)
    }

    fn is_equal(&self, other: &Self, tolerance: T) -> bool {
        NurbsCurve3D::is_equal(self, other, tolerance)
    }
}
