pub mod curve_network;
pub mod curve_network_interpolator;
pub mod curve_network_sorter;
pub mod error;
pub mod gordon_surface_builder;
pub mod network_compatibilizer;
pub mod options;

pub use curve_network::*;
pub use curve_network_interpolator::*;
pub use curve_network_sorter::*;
pub use error::GordonError;
pub use gordon_surface_builder::*;
pub use network_compatibilizer::*;
pub use options::*;

#[cfg(test)]
mod tests;
