use thiserror::Error;

/// Errors raised while turning a curve network into a Gordon surface
/// Every failure is fatal for the network it was raised for.
#[derive(Debug, Clone, Error)]
pub enum GordonError {
    /// Too few curves or inconsistent dimensions.
    #[error("invalid curve network: {0}")]
    Validation(String),

    /// Some profile/guide pairs do not intersect, listed as (profile, guide).
    #[error("curves do not intersect: (profile, guide) pairs {pairs:?}")]
    NoIntersection { pairs: Vec<(usize, usize)> },

    /// A profile/guide pair intersects more often than the network topology allows.
    #[error("profile {profile} and guide {guide} have {count} ambiguous intersections")]
    AmbiguousIntersection {
        profile: usize,
        guide: usize,
        count: usize,
    },

    /// No corner of the network can serve as the start of the sorted network.
    #[error("cannot find starting curves of the curve network")]
    DegenerateNetwork,

    /// The curves of one family do not share a parameter domain.
    #[error("curves are not in the same parameter range: {0}")]
    DomainMismatch(String),

    /// The shared parameters do not reach the ends of the curve domains.
    #[error("no intersection at the network boundary: {0}")]
    Boundary(String),

    /// A profile and a guide do not meet at their shared parameters.
    #[error("network is incompatible: profile {profile} and guide {guide} are {distance:.6e} apart")]
    Incompatible {
        profile: usize,
        guide: usize,
        distance: f64,
    },

    /// A NURBS operation failed.
    #[error("geometry operation failed: {0}")]
    Geometry(String),
}

impl From<anyhow::Error> for GordonError {
    fn from(e: anyhow::Error) -> Self {
        GordonError::Geometry(format!("{:#}", e))
    }
}

/// Result type for curve network operations.
pub type Result<T> = std::result::Result<T, GordonError>;
