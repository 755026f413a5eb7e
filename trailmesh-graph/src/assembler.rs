//! Graph assembler — inserts one weighted multi-graph edge per
//! segment. Thin on purpose: `Graph::add_edge` (in `model.rs`) already does
//! the node-identity bookkeeping the graph arena needs; this module only
//! applies the `no_road_crossings` pure-road-connector filter.

use std::collections::HashSet;

use crate::model::{Graph, Trail};

/// Assemble segmented, road-disconnected trails into a graph. When
/// `no_road_crossings` is set, a segment whose *both* endpoints are road
/// nodes (rather than trail intersections) is dropped — it would otherwise
/// enter the trail graph as a pure road connector.
pub fn assemble_graph(trails: Vec<Trail>, road_nodes: &HashSet<i64>, no_road_crossings: bool) -> Graph {
    let mut graph = Graph::new();
    for trail in trails {
        if no_road_crossings {
            let first_is_road = road_nodes.contains(&trail.first_node().id.osm_id);
            let last_is_road = road_nodes.contains(&trail.last_node().id.osm_id);
            if first_is_road && last_is_road {
                continue;
            }
        }
        graph.add_edge(trail);
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use trailmesh_common::{NodeId, WayId};

    fn node(osm_id: i64, lon: f64) -> crate::model::Node {
        crate::model::Node {
            id: NodeId::plain(osm_id),
            lat: 0.0,
            lon,
        }
    }

    #[test]
    fn road_connector_between_two_road_nodes_is_dropped_when_flagged() {
        let trail = crate::model::Trail::new(
            "1".into(),
            WayId(1),
            None,
            vec![node(1, 0.0), node(2, 0.001)],
        )
        .unwrap();
        let mut road_nodes = HashSet::new();
        road_nodes.insert(1);
        road_nodes.insert(2);
        let graph = assemble_graph(vec![trail], &road_nodes, true);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn road_connector_is_kept_when_flag_is_off() {
        let trail = crate::model::Trail::new(
            "1".into(),
            WayId(1),
            None,
            vec![node(1, 0.0), node(2, 0.001)],
        )
        .unwrap();
        let mut road_nodes = HashSet::new();
        road_nodes.insert(1);
        road_nodes.insert(2);
        let graph = assemble_graph(vec![trail], &road_nodes, false);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn segment_with_one_trail_endpoint_is_always_kept() {
        let trail = crate::model::Trail::new(
            "1".into(),
            WayId(1),
            None,
            vec![node(1, 0.0), node(2, 0.001)],
        )
        .unwrap();
        let mut road_nodes = HashSet::new();
        road_nodes.insert(1);
        let graph = assemble_graph(vec![trail], &road_nodes, true);
        assert_eq!(graph.edge_count(), 1);
    }
}
