/// Types whose parametric direction can be reversed in place.
pub trait Invertible: Clone {
    fn invert(&mut self);

    /// Returns a reversed copy
    fn inverse(&self) -> Self {
        let mut inv = self.clone();
        inv.invert();
        inv
    }
}
