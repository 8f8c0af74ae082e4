/// Access to the points and parameters on both objects of an intersection
pub trait HasIntersection<VA, VB, A, B>: HasIntersectionParameter<A, B> {
    fn a(&self) -> &VA;
    fn b(&self) -> &VB;
}

/// Access to the parameters on both objects of an intersection
pub trait HasIntersectionParameter<A, B> {
    fn a_parameter(&self) -> A;
    fn b_parameter(&self) -> B;
}
