//! Bounded best-first loop search and quality scoring — turns
//! one `trailmesh_graph::TrailNetwork` and a trailhead into a ranked,
//! deduplicated set of loop hikes.

pub mod postfilter;
pub mod search;
pub mod subpath;

pub use postfilter::{filter_similar, postfilter};
pub use search::{find_loops, search as run_search, SearchSettings};
pub use subpath::{shortest_loop, Subpath, SubpathSegment};
