//! Identity types. `NodeId` carries an `(osm_id, derived_tag)` pair: two
//! nodes are equal iff both components match, and the road-crossing
//! disconnector relies on the derived tag to split one physical coordinate
//! into multiple graph vertices.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WayId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AreaId(pub i64);

/// Node identity: the raw OSM id plus an optional derived tag.
///
/// `derived_tag` is empty (`""`) for every node the loader produces
/// directly from raw input. The road-crossing disconnector is the only
/// stage that ever sets it, to `"<osm_id>-<trail_id>-road-extra"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId {
    pub osm_id: i64,
    pub derived_tag: String,
}

impl NodeId {
    pub fn plain(osm_id: i64) -> Self {
        NodeId {
            osm_id,
            derived_tag: String::new(),
        }
    }

    pub fn derived(osm_id: i64, tag: impl Into<String>) -> Self {
        NodeId {
            osm_id,
            derived_tag: tag.into(),
        }
    }

    pub fn is_derived(&self) -> bool {
        !self.derived_tag.is_empty()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.derived_tag.is_empty() {
            write!(f, "{}", self.osm_id)
        } else {
            write!(f, "{}#{}", self.osm_id, self.derived_tag)
        }
    }
}
