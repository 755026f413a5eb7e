//! Error types shared across the trailmesh workspace.
//!
//! Kept typed (`thiserror`) because this is library-level code; application
//! boundaries (the driver's per-task results) use `anyhow` instead — see
//! `trailmesh-driver`.

use thiserror::Error;

/// Errors that can occur while building or walking the trail graph.
#[derive(Debug, Error)]
pub enum Error {
    #[error("duplicate trail id `{0}` during load")]
    DuplicateTrailId(String),

    #[error("way {way_id} references missing node {node_id}")]
    MissingNode { way_id: i64, node_id: i64 },

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("node {0} has fewer than two points")]
    DegenerateTrail(i64),

    #[error("no path between nodes during forced closure (graph should be connected)")]
    NoShortestPath,
}

/// Convenience result type for trailmesh library crates.
pub type Result<T> = std::result::Result<T, Error>;
