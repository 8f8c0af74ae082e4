pub mod binomial;
pub mod floating_point;
pub mod invertible;
pub mod scale;
pub mod segment;
pub mod transpose;

pub use binomial::*;
pub use floating_point::*;
pub use invertible::*;
pub use scale::*;
pub use segment::*;
pub use transpose::*;
