//! Input boundary types. A hosting binary is responsible for parsing the raw
//! map file (osmium/osmpbf or otherwise — explicitly out of scope) and
//! producing these values; this crate never looks inside a `.osm.pbf`.

use std::collections::HashMap;

pub type Tags = HashMap<String, String>;

/// One node reference inside a way's polyline. Ways whose coordinate lookup
/// failed surface as `Missing` rather than panicking the iterator, so the
/// loader can drop just that way.
#[derive(Debug, Clone)]
pub enum RawWayNode {
    Coord { id: i64, lat: f64, lon: f64 },
    Missing { id: i64 },
}

#[derive(Debug, Clone)]
pub struct RawWay {
    pub id: i64,
    pub tags: Tags,
    pub nodes: Vec<RawWayNode>,
}

#[derive(Debug, Clone)]
pub struct RawArea {
    pub id: i64,
    pub tags: Tags,
    /// Outer rings only — holes/inner rings don't affect park-overlap
    /// naming and are dropped by the upstream parser.
    pub outer_rings: Vec<Vec<(f64, f64)>>,
}
