//! The driver — one task per `TrailNetwork`, networks ordered by
//! descending total length so the slowest work starts first, each task
//! running the loop search and post-filter for every trailhead and
//! producing a `NetworkResult`. Built on a `rayon`-driven per-item task
//! shape: one task per network.

use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use rayon::prelude::*;

use trailmesh_graph::{Trailhead, TrailNetwork};
use trailmesh_search::{postfilter::postfilter, search::find_loops, Subpath};

use crate::elevation::ElevationOracle;
use crate::meta::{meta, TrailheadMeta};
use crate::settings::IngestSettings;

pub struct TrailheadResult {
    pub loops: Vec<Subpath>,
    pub meta: TrailheadMeta,
}

/// One network's full result. `results` preserves the clustered-insertion
/// order trailhead extraction produced, which a `HashMap<Trailhead, _>`
/// couldn't, since `Trailhead` carries floating-point coordinates and has
/// no meaningful `Hash`.
pub struct NetworkResult {
    pub network: TrailNetwork,
    pub results: Vec<(Trailhead, TrailheadResult)>,
}

/// Run every trailhead of one network through loop search and
/// post-filter, recording per-trailhead timing for `TrailheadMeta`.
fn process_network(network: TrailNetwork, settings: &IngestSettings, oracle: &dyn ElevationOracle) -> NetworkResult {
    let search_settings = settings.to_search_settings();
    let network_length_km = network.total_length_km;

    let mut results = Vec::with_capacity(network.trailheads.len());
    for trailhead in &network.trailheads {
        let start_time = Instant::now();
        let Some(root) = network.graph.node_index(&trailhead.node.id) else {
            log::warn!(
                "trailhead {} not found in its own network's graph, skipping",
                trailhead.name
            );
            continue;
        };

        let raw_loops = find_loops(&network.graph, root, &search_settings);
        let mut loops = postfilter(raw_loops, network_length_km, search_settings.repeat_weight);

        for l in &mut loops {
            let nodes: Vec<_> = l
                .real_segments()
                .flat_map(|s| [s.first_node, s.last_node])
                .map(|idx| network.graph.node(idx).clone())
                .collect();
            // Elevation is sampled for its side effect on the node list's
            // memoized oracle cache in real deployments; the core itself
            // only needs gain/loss for display, computed and discarded here
            // to keep `Subpath` (in `trailmesh-search`) free of an
            // elevation-oracle dependency.
            let _ = crate::elevation::elevation_gain_loss(oracle, &nodes, std::time::Duration::from_secs(1));
        }

        let ingest_time_s = start_time.elapsed().as_secs_f64();
        let trailhead_meta = meta(&loops, network_length_km, ingest_time_s, search_settings.repeat_weight);
        results.push((trailhead.clone(), TrailheadResult { loops, meta: trailhead_meta }));
    }

    NetworkResult { network, results }
}

/// Run the full driver over every network, one rayon task per network.
/// A panicking task is logged and dropped; the remaining networks'
/// results are still returned.
pub fn run(networks: Vec<TrailNetwork>, settings: &IngestSettings, oracle: &dyn ElevationOracle) -> Vec<NetworkResult> {
    let mut networks = networks;
    networks.sort_by(|a, b| b.total_length_km.partial_cmp(&a.total_length_km).unwrap());

    networks
        .into_par_iter()
        .filter_map(|network| run_one(network, settings, oracle))
        .collect()
}

/// Single-threaded variant of `run`, for deterministic test runners.
pub fn run_single_threaded(
    networks: Vec<TrailNetwork>,
    settings: &IngestSettings,
    oracle: &dyn ElevationOracle,
) -> Vec<NetworkResult> {
    let mut networks = networks;
    networks.sort_by(|a, b| b.total_length_km.partial_cmp(&a.total_length_km).unwrap());

    networks
        .into_iter()
        .filter_map(|network| run_one(network, settings, oracle))
        .collect()
}

fn run_one(network: TrailNetwork, settings: &IngestSettings, oracle: &dyn ElevationOracle) -> Option<NetworkResult> {
    let unique_id = network.unique_id();
    match panic::catch_unwind(AssertUnwindSafe(|| process_network(network, settings, oracle))) {
        Ok(result) => Some(result),
        Err(_) => {
            log::error!("worker task panicked while processing network {unique_id}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trailmesh_common::{Distance, NodeId, WayId};
    use trailmesh_graph::model::{Graph, Node, Trail};

    struct ZeroOracle;
    impl ElevationOracle for ZeroOracle {
        fn elevation_m(&self, _lat: f64, _lon: f64) -> Option<f64> {
            Some(0.0)
        }
    }

    fn node(osm_id: i64, lat: f64, lon: f64) -> Node {
        Node {
            id: NodeId::plain(osm_id),
            lat,
            lon,
        }
    }

    fn square_network() -> TrailNetwork {
        let mut g = Graph::new();
        let corners = [(1, 0.0, 0.0), (2, 0.0, 0.05), (3, 0.05, 0.05), (4, 0.05, 0.0)];
        for w in 0..4 {
            let (a_id, a_lat, a_lon) = corners[w];
            let (b_id, b_lat, b_lon) = corners[(w + 1) % 4];
            g.add_edge(
                Trail::new(
                    format!("side{}", w + 1),
                    WayId(w as i64 + 1),
                    Some(format!("Side {}", w + 1)),
                    vec![node(a_id, a_lat, a_lon), node(b_id, b_lat, b_lon)],
                )
                .unwrap(),
            );
        }
        let total_length_km = g.total_length_km();
        let root_node = g.node(g.node_index(&NodeId::plain(1)).unwrap()).clone();
        TrailNetwork {
            graph: g,
            name: None,
            trailheads: vec![Trailhead {
                node: root_node,
                name: "Trailhead Rd".to_string(),
            }],
            digest: "test".to_string(),
            total_length_km,
        }
    }

    #[test]
    fn single_threaded_run_yields_one_network_result_with_loops() {
        let network = square_network();
        let mut settings = IngestSettings::default();
        settings.max_distance = Distance::km(20.0);
        let results = run_single_threaded(vec![network], &settings, &ZeroOracle);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].results.len(), 1);
        let (_, trailhead_result) = &results[0].results[0];
        assert!(!trailhead_result.loops.is_empty());
        assert_eq!(trailhead_result.meta.num_loops, trailhead_result.loops.len());
    }

    #[test]
    fn networks_are_processed_in_descending_length_order_single_threaded() {
        let small = {
            let mut g = Graph::new();
            g.add_edge(
                Trail::new(
                    "1".into(),
                    WayId(1),
                    None,
                    vec![node(10, 1.0, 1.0), node(11, 1.0, 1.001)],
                )
                .unwrap(),
            );
            let len = g.total_length_km();
            TrailNetwork {
                graph: g,
                name: None,
                trailheads: vec![],
                digest: "small".into(),
                total_length_km: len,
            }
        };
        let big = square_network();
        let big_len = big.total_length_km;
        let small_len = small.total_length_km;
        assert!(big_len > small_len);

        let results = run_single_threaded(vec![small, big], &IngestSettings::default(), &ZeroOracle);
        assert_eq!(results.len(), 2);
        assert!(results[0].network.total_length_km >= results[1].network.total_length_km);
    }
}
