//! Segmenter — splits each trail at interior nodes shared with
//! another trail, or coinciding with a road node, so that after this stage
//! the only shared endpoints between trails are at intersections.
//!
//! Builds a global inverse index (node id -> way ids containing it) first,
//! then decides split points per trail from that index.

use std::collections::{HashMap, HashSet};

use crate::model::Trail;

/// Build `node_id -> [way_ids containing it]` across all trails, then split
/// each trail at any interior node shared with another trail or present in
/// `road_nodes`. Trails with no qualifying interior node are emitted
/// unchanged. Iterates in way-id order for determinism.
pub fn segment_trails(trails: &HashMap<i64, Trail>, road_nodes: &HashSet<i64>) -> Vec<Trail> {
    let mut inverse: HashMap<i64, HashSet<i64>> = HashMap::new();
    for trail in trails.values() {
        for node in &trail.nodes {
            inverse
                .entry(node.id.osm_id)
                .or_default()
                .insert(trail.way_id.0);
        }
    }

    let mut way_ids: Vec<&i64> = trails.keys().collect();
    way_ids.sort_unstable();

    let mut out = Vec::new();
    for way_id in way_ids {
        let trail = &trails[way_id];
        let split_idxs: Vec<usize> = (1..trail.nodes.len().saturating_sub(1))
            .filter(|&i| {
                let osm_id = trail.nodes[i].id.osm_id;
                inverse.get(&osm_id).map(|s| s.len() > 1).unwrap_or(false)
                    || road_nodes.contains(&osm_id)
            })
            .collect();

        if split_idxs.is_empty() {
            out.push(trail.clone());
        } else {
            out.extend(trail.split_at(&split_idxs));
        }
    }
    out
}
