//! Raw loader — lifts `RawWay`/`RawArea` records into `Trail`s,
//! `non_trail_nodes`, and `Park`s: a linear scan over raw records,
//! warning-and-continue on per-record failures. This crate has no
//! application-boundary error type of its own, so skips are logged with
//! `log::warn!` rather than collected into a report.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use trailmesh_common::{Error, NodeId, Result, WayId};

use crate::model::{Node, Park, Trail};
use crate::raw::{RawArea, RawWay, RawWayNode};

/// Drops ways whose first node lies outside a lat/lon circle;
/// also contributes to ingest-id for caching.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LocationFilter {
    pub lat: f64,
    pub lon: f64,
    pub radius_km: f64,
}

impl LocationFilter {
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        trailmesh_common::geo::haversine_distance_m(self.lat, self.lon, lat, lon) / 1000.0
            <= self.radius_km
    }

    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("{}:{}:{}", self.lat, self.lon, self.radius_km).as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[derive(Debug, Default)]
pub struct LoaderOutput {
    /// Keyed by way id prior to segmentation.
    pub trails: HashMap<i64, Trail>,
    /// `osm_id -> road name`, last-writer-wins.
    pub non_trail_nodes: HashMap<i64, String>,
    pub parks: HashMap<i64, Park>,
    /// Ways dropped for a missing node coordinate or too few distinct nodes.
    pub skipped_ways: usize,
    /// Park areas dropped for zero or degenerate rings.
    pub skipped_areas: usize,
}

fn way_nodes(way: &RawWay) -> Option<Vec<Node>> {
    let mut nodes = Vec::with_capacity(way.nodes.len());
    for n in &way.nodes {
        match n {
            RawWayNode::Coord { id, lat, lon } => nodes.push(Node {
                id: NodeId::plain(*id),
                lat: *lat,
                lon: *lon,
            }),
            RawWayNode::Missing { .. } => return None,
        }
    }
    // Collapse consecutive duplicate coordinates (e.g. a way that revisits
    // the same node id back to back) before the Trail invariant check.
    nodes.dedup_by(|a, b| a.id == b.id);
    Some(nodes)
}

fn build_polygon(rings: &[Vec<(f64, f64)>]) -> Option<geo::MultiPolygon<f64>> {
    if rings.is_empty() {
        return None;
    }
    let mut polygons = Vec::with_capacity(rings.len());
    for ring in rings {
        if ring.len() < 3 {
            return None;
        }
        let coords: Vec<geo::Coord<f64>> = ring
            .iter()
            .map(|(lat, lon)| geo::Coord { x: *lon, y: *lat })
            .collect();
        polygons.push(geo::Polygon::new(geo::LineString(coords), vec![]));
    }
    Some(geo::MultiPolygon(polygons))
}

/// Consume an iterator of raw ways and areas, producing `LoaderOutput`.
///
/// Duplicate trail ids are a fatal load-time error; a missing node
/// coordinate drops only the single offending way; a park with zero
/// or invalid rings is skipped (no name contribution).
pub fn load(
    ways: impl IntoIterator<Item = RawWay>,
    areas: impl IntoIterator<Item = RawArea>,
    location_filter: Option<&LocationFilter>,
) -> Result<LoaderOutput> {
    let mut out = LoaderOutput::default();

    for way in ways {
        let Some(nodes) = way_nodes(&way) else {
            log::warn!("skipping way {}: missing node coordinate", way.id);
            out.skipped_ways += 1;
            continue;
        };

        let is_trail = trailmesh_tags::is_trail(&way.tags);
        let is_drivable = trailmesh_tags::is_drivable(&way.tags);

        if is_trail {
            let in_radius = match (location_filter, nodes.first()) {
                (Some(filter), Some(first)) => filter.contains(first.lat, first.lon),
                (Some(_), None) => false,
                (None, _) => true,
            };
            if in_radius {
                if nodes.len() < 2 {
                    log::warn!("skipping way {}: fewer than two distinct nodes", way.id);
                    out.skipped_ways += 1;
                } else {
                    let name = way.tags.get("name").cloned();
                    let trail = Trail::new(way.id.to_string(), WayId(way.id), name, nodes.clone())?;
                    if out.trails.insert(way.id, trail).is_some() {
                        return Err(Error::DuplicateTrailId(way.id.to_string()));
                    }
                }
            }
        }

        if is_drivable {
            let road_name = way
                .tags
                .get("name")
                .cloned()
                .unwrap_or_else(|| "No name".to_string());
            for n in &nodes {
                // last-writer-wins: a later way's name overwrites an
                // earlier one's for a shared node id.
                out.non_trail_nodes.insert(n.id.osm_id, road_name.clone());
            }
        }
    }

    for area in areas {
        if !trailmesh_tags::is_park_area(&area.tags) {
            continue;
        }
        let Some(polygon) = build_polygon(&area.outer_rings) else {
            log::warn!("skipping park area {}: zero rings or degenerate ring", area.id);
            out.skipped_areas += 1;
            continue;
        };
        let name = trailmesh_tags::park_name(&area.tags);
        out.parks.insert(
            area.id,
            Park {
                id: area.id,
                name,
                polygon,
                tags: area.tags,
            },
        );
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn way(id: i64, tags: &[(&str, &str)], nodes: Vec<(i64, f64, f64)>) -> RawWay {
        RawWay {
            id,
            tags: tags.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            nodes: nodes
                .into_iter()
                .map(|(id, lat, lon)| RawWayNode::Coord { id, lat, lon })
                .collect(),
        }
    }

    #[test]
    fn footway_becomes_a_trail() {
        let ways = vec![way(
            1,
            &[("highway", "footway"), ("name", "Test Trail")],
            vec![(1, 0.0, 0.0), (2, 0.0, 0.001)],
        )];
        let out = load(ways, vec![], None).unwrap();
        assert_eq!(out.trails.len(), 1);
        assert_eq!(out.trails[&1].name.as_deref(), Some("Test Trail"));
    }

    #[test]
    fn duplicate_way_id_is_fatal() {
        let ways = vec![
            way(1, &[("highway", "path")], vec![(1, 0.0, 0.0), (2, 0.0, 0.001)]),
            way(1, &[("highway", "path")], vec![(3, 1.0, 1.0), (4, 1.0, 1.001)]),
        ];
        assert!(matches!(
            load(ways, vec![], None),
            Err(Error::DuplicateTrailId(_))
        ));
    }

    #[test]
    fn way_with_missing_node_is_dropped_not_fatal() {
        let ways = vec![
            RawWay {
                id: 1,
                tags: [("highway".to_string(), "path".to_string())].into(),
                nodes: vec![
                    RawWayNode::Coord { id: 1, lat: 0.0, lon: 0.0 },
                    RawWayNode::Missing { id: 2 },
                ],
            },
            way(2, &[("highway", "path")], vec![(3, 1.0, 1.0), (4, 1.0, 1.001)]),
        ];
        let out = load(ways, vec![], None).unwrap();
        assert_eq!(out.trails.len(), 1);
        assert!(out.trails.contains_key(&2));
    }

    #[test]
    fn non_trail_nodes_last_writer_wins() {
        let ways = vec![
            way(1, &[("highway", "residential"), ("name", "First St")], vec![(1, 0.0, 0.0), (2, 0.0, 0.001)]),
            way(2, &[("highway", "residential"), ("name", "Second St")], vec![(2, 0.0, 0.001), (3, 0.0, 0.002)]),
        ];
        let out = load(ways, vec![], None).unwrap();
        assert_eq!(out.non_trail_nodes[&2], "Second St");
    }

    #[test]
    fn location_filter_drops_distant_ways() {
        let filter = LocationFilter {
            lat: 0.0,
            lon: 0.0,
            radius_km: 1.0,
        };
        let ways = vec![way(
            1,
            &[("highway", "path")],
            vec![(1, 10.0, 10.0), (2, 10.0, 10.001)],
        )];
        let out = load(ways, vec![], Some(&filter)).unwrap();
        assert!(out.trails.is_empty());
    }

    #[test]
    fn park_area_is_recorded() {
        let areas = vec![RawArea {
            id: 1,
            tags: [
                ("leisure".to_string(), "park".to_string()),
                ("name".to_string(), "Test Park".to_string()),
            ]
            .into(),
            outer_rings: vec![vec![(0.0, 0.0), (0.0, 0.01), (0.01, 0.01), (0.01, 0.0)]],
        }];
        let out = load(vec![], areas, None).unwrap();
        assert_eq!(out.parks[&1].name, "Test Park");
    }
}
