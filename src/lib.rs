#![allow(clippy::needless_range_loop)]

mod curve;
mod interpolation;
mod intersects;
mod knot;
mod misc;
mod network;
mod surface;

pub mod prelude {
    pub use crate::curve::*;
    pub use crate::interpolation::*;
    pub use crate::intersects::*;
    pub use crate::knot::*;
    pub use crate::misc::*;
    pub use crate::network::*;
    pub use crate::surface::*;
}
