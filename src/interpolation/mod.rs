pub mod curve;
pub mod surface;
pub use curve::*;

/// Interpolation trait
pub trait Interpolation {
    type Input;
    type Output;
    fn interpolate(input: &Self::Input, degree: usize) -> Self::Output;
}
