//! Road-crossing disconnector — rewrites a segment endpoint that
//! sits on a road node into a *derived* node identity, so two trails that
//! only meet at a road crossing don't share a graph vertex.

use std::collections::{HashMap, HashSet};

use trailmesh_common::NodeId;

use crate::model::{Node, Trail};

/// `allowlist` holds the osm ids of `extra_links` endpoints — manually
/// added connectors that are meant to stay joined through a road point.
pub fn disconnect_road_crossings(
    trails: Vec<Trail>,
    non_trail_nodes: &HashMap<i64, String>,
    allowlist: &HashSet<i64>,
) -> Vec<Trail> {
    trails
        .into_iter()
        .map(|trail| rewrite_endpoints(trail, non_trail_nodes, allowlist))
        .collect()
}

fn rewrite_endpoints(
    trail: Trail,
    non_trail_nodes: &HashMap<i64, String>,
    allowlist: &HashSet<i64>,
) -> Trail {
    let mut trail = trail;
    for from_start in [true, false] {
        let endpoint = if from_start {
            trail.first_node()
        } else {
            trail.last_node()
        };
        let osm_id = endpoint.id.osm_id;
        if non_trail_nodes.contains_key(&osm_id) && !allowlist.contains(&osm_id) {
            let derived_tag = format!("{}-{}-road-extra", osm_id, trail.id);
            let new_node = Node {
                id: NodeId::derived(osm_id, derived_tag),
                lat: endpoint.lat,
                lon: endpoint.lon,
            };
            trail = trail.with_endpoint(from_start, new_node);
        }
    }
    trail
}

#[cfg(test)]
mod tests {
    use super::*;
    use trailmesh_common::WayId;

    fn node(osm_id: i64, lon: f64) -> Node {
        Node {
            id: NodeId::plain(osm_id),
            lat: 0.0,
            lon,
        }
    }

    #[test]
    fn endpoint_on_road_node_is_rewritten() {
        let trail = Trail::new(
            "1-0/1".into(),
            WayId(1),
            None,
            vec![node(1, 0.0), node(2, 0.001)],
        )
        .unwrap();
        let mut non_trail_nodes = HashMap::new();
        non_trail_nodes.insert(2, "Some Road".to_string());
        let out = disconnect_road_crossings(vec![trail], &non_trail_nodes, &HashSet::new());
        assert!(out[0].last_node().id.is_derived());
        assert_eq!(out[0].last_node().id.osm_id, 2);
        assert!(!out[0].first_node().id.is_derived());
    }

    #[test]
    fn allowlisted_endpoint_is_not_rewritten() {
        let trail = Trail::new(
            "extra-1-2".into(),
            WayId(1),
            None,
            vec![node(1, 0.0), node(2, 0.001)],
        )
        .unwrap();
        let mut non_trail_nodes = HashMap::new();
        non_trail_nodes.insert(2, "Some Road".to_string());
        let mut allowlist = HashSet::new();
        allowlist.insert(2);
        let out = disconnect_road_crossings(vec![trail], &non_trail_nodes, &allowlist);
        assert!(!out[0].last_node().id.is_derived());
    }

    #[test]
    fn two_trails_crossing_at_road_point_no_longer_share_a_vertex() {
        let t1 = Trail::new(
            "1-0/1".into(),
            WayId(1),
            None,
            vec![node(10, -0.1), node(99, 0.0)],
        )
        .unwrap();
        let t2 = Trail::new(
            "2-0/1".into(),
            WayId(2),
            None,
            vec![node(99, 0.0), node(11, 0.1)],
        )
        .unwrap();
        let mut non_trail_nodes = HashMap::new();
        non_trail_nodes.insert(99, "Crossing Rd".to_string());
        let out = disconnect_road_crossings(vec![t1, t2], &non_trail_nodes, &HashSet::new());
        assert_ne!(out[0].last_node().id, out[1].first_node().id);
    }
}
