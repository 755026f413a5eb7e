//! Network extractor — walks connected components of the global
//! graph and, for each viable one, builds a `TrailNetwork`: a content
//! digest for cross-ingest dedup, a convex-hull/park-overlap display name,
//! and a greedily clustered trailhead list.
//!
//! Naming uses `geo`'s convex hull and boolean-overlap operations against
//! park polygons; clustering uses an `rstar` tree that accepts candidates
//! incrementally as they're confirmed far enough apart from everything
//! already kept.

use std::collections::HashMap;

use geo::{Area, BooleanOps, ConvexHull, MultiPoint, MultiPolygon, Point, Polygon};
use rstar::{primitives::GeomWithData, RTree};
use trailmesh_common::Distance;

use crate::model::{Graph, Park, Trailhead, TrailNetwork};

const MIN_COMPONENT_NODES: usize = 3;
const MIN_COMPONENT_LENGTH_KM: f64 = 1.0;

/// Extract every viable `TrailNetwork` from the global graph.
///
/// `already_processed` is a caller-owned set of content digests from a
/// prior ingest; components matching one are skipped.
pub fn extract_networks(
    graph: &Graph,
    non_trail_nodes: &HashMap<i64, String>,
    parks: &HashMap<i64, Park>,
    trailhead_distance_threshold: Distance,
    already_processed: &mut std::collections::HashSet<String>,
) -> Vec<TrailNetwork> {
    let mut networks = Vec::new();
    for component in graph.connected_components() {
        let sub = graph.induced_subgraph(&component);
        let digest = sub.content_digest();
        if already_processed.contains(&digest) {
            continue;
        }
        if sub.node_count() < MIN_COMPONENT_NODES || sub.total_length_km() < MIN_COMPONENT_LENGTH_KM {
            continue;
        }

        let Some(hull) = convex_hull(&sub) else {
            continue;
        };
        if hull.unsigned_area() == 0.0 {
            continue;
        }

        let name = name_from_park_overlap(&hull, parks);
        let trailheads = cluster_trailheads(&sub, non_trail_nodes, trailhead_distance_threshold);

        already_processed.insert(digest.clone());
        networks.push(TrailNetwork {
            total_length_km: sub.total_length_km(),
            graph: sub,
            name,
            trailheads,
            digest,
        });
    }
    networks
}

fn convex_hull(graph: &Graph) -> Option<Polygon<f64>> {
    if graph.node_count() == 0 {
        return None;
    }
    let points: Vec<Point<f64>> = graph
        .node_indices()
        .map(|idx| {
            let n = graph.node(idx);
            Point::new(n.lon, n.lat)
        })
        .collect();
    Some(MultiPoint::new(points).convex_hull())
}

/// Name resolution: the park with maximum positive overlap
/// with the component's convex hull, else `None` (unnamed).
fn name_from_park_overlap(hull: &Polygon<f64>, parks: &HashMap<i64, Park>) -> Option<String> {
    let hull_area = hull.unsigned_area();
    if hull_area == 0.0 {
        return None;
    }
    let hull_multi = MultiPolygon::new(vec![hull.clone()]);

    let mut best: Option<(String, f64)> = None;
    let mut park_ids: Vec<&i64> = parks.keys().collect();
    park_ids.sort_unstable();
    for id in park_ids {
        let park = &parks[id];
        let overlap = hull_multi.intersection(&park.polygon);
        let overlap_area = overlap.unsigned_area();
        if overlap_area <= 0.0 {
            continue;
        }
        let ratio = overlap_area / hull_area;
        if best.as_ref().map(|(_, r)| ratio > *r).unwrap_or(true) {
            best = Some((park.name.clone(), ratio));
        }
    }
    best.map(|(name, _)| name)
}

/// Greedy trailhead clustering: candidates in `Graph`
/// node-insertion order, keeping the first and any subsequent candidate
/// whose distance to every already-kept trailhead exceeds `threshold`.
/// Capped at `floor(total_length_km / 2)`.
fn cluster_trailheads(
    graph: &Graph,
    non_trail_nodes: &HashMap<i64, String>,
    threshold: Distance,
) -> Vec<Trailhead> {
    let cap = (graph.total_length_km() / 2.0).floor() as usize;
    if cap == 0 {
        return Vec::new();
    }

    let mut kept: Vec<Trailhead> = Vec::new();
    let mut tree: RTree<GeomWithData<[f64; 2], usize>> = RTree::new();

    for idx in graph.node_indices() {
        let node = graph.node(idx);
        let Some(name) = non_trail_nodes.get(&node.id.osm_id) else {
            continue;
        };

        let point = [node.lon, node.lat];
        let far_enough = match tree.nearest_neighbor(&point) {
            None => true,
            Some(nearest) => {
                let nearest_trailhead = &kept[nearest.data];
                node.distance_m(&nearest_trailhead.node) > threshold.as_m()
            }
        };
        if !far_enough {
            continue;
        }

        let kept_idx = kept.len();
        kept.push(Trailhead {
            node: node.clone(),
            name: name.clone(),
        });
        tree.insert(GeomWithData::new(point, kept_idx));
        if kept.len() >= cap {
            break;
        }
    }
    kept
}
