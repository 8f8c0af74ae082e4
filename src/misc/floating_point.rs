use nalgebra::RealField;
use num_traits::ToPrimitive;

/// Scalar field shared by every geometric type in the crate (f32, f64)
pub trait FloatingPoint: RealField + ToPrimitive + Copy {}

impl FloatingPoint for f32 {}
impl FloatingPoint for f64 {}
