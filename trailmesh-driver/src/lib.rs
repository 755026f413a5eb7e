//! Driver, configuration, and the elevation oracle boundary
//! — the one crate in this workspace that ties the graph
//! pipeline and the search engine together into a runnable ingest.

pub mod driver;
pub mod elevation;
pub mod ingest;
pub mod meta;
pub mod settings;

pub use driver::{run, run_single_threaded, NetworkResult, TrailheadResult};
pub use elevation::{elevation_gain_loss, elevations, ElevationChange, ElevationOracle, POISON_ELEVATION_M};
pub use ingest::{ingest, ingest_single_threaded, ExtraLink, IngestOutput, IngestSummary};
pub use meta::{meta as trailhead_meta, TrailheadMeta};
pub use settings::{IngestSettings, QualitySettings};
