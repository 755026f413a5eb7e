//! Graph construction pipeline: raw loading through connected-component
//! extraction, the stages that turn raw OSM-style records into the
//! `TrailNetwork`s the search engine walks.

pub mod assembler;
pub mod disconnector;
pub mod loader;
pub mod model;
pub mod network;
pub mod raw;
pub mod segmenter;

pub use model::{Edge, EdgeIdx, Graph, Node, NodeIdx, Park, Trail, Trailhead, TrailNetwork};
pub use raw::{RawArea, RawWay, RawWayNode};
