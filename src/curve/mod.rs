pub mod knot_style;
pub mod nurbs_curve;
pub mod parametric_curve;
pub mod reparametrize;
pub use knot_style::*;
pub use nurbs_curve::*;
pub use parametric_curve::*;
pub use reparametrize::*;

#[cfg(test)]
mod tests;
