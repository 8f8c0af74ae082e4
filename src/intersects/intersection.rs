use super::{has_intersection::HasIntersection, HasIntersectionParameter};

/// Intersection of two parametric objects
#[derive(Debug, Clone)]
pub struct Intersection<P, T0, T1> {
    /// Point on the first object and its parameter
    a: (P, T0),
    /// Point on the second object and its parameter
    b: (P, T1),
}

impl<P, T0, T1> Intersection<P, T0, T1> {
    pub fn new(a: (P, T0), b: (P, T1)) -> Self {
        Self { a, b }
    }
}

impl<P, T0: Copy, T1: Copy> HasIntersectionParameter<T0, T1> for Intersection<P, T0, T1> {
    fn a_parameter(&self) -> T0 {
        self.a.1
    }

    fn b_parameter(&self) -> T1 {
        self.b.1
    }
}

impl<P, T0: Copy, T1: Copy> HasIntersection<(P, T0), (P, T1), T0, T1>
    for Intersection<P, T0, T1>
{
    fn a(&self) -> &(P, T0) {
        &self.a
    }

    fn b(&self) -> &(P, T1) {
        &self.b
    }
}
