pub mod nurbs_surface;
pub mod unify;
pub use nurbs_surface::*;
pub use unify::*;

#[cfg(test)]
mod tests;
