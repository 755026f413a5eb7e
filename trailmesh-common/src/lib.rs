//! Shared types for the trailmesh loop-discovery engine.

pub mod distance;
pub mod error;
pub mod geo;
pub mod ids;

pub use distance::Distance;
pub use error::{Error, Result};
pub use ids::{AreaId, NodeId, WayId};
