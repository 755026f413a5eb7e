//! Bounded best-first loop search — the core algorithm. A push callback
//! (`on_loop`) rather than a returned collection, so a caller with a
//! tighter latency budget can call `search` directly and stop consuming
//! early; `find_loops` is the convenience wrapper that drains it into a
//! `Vec`.

use std::time::{Duration, Instant};

use trailmesh_graph::{EdgeIdx, Graph, NodeIdx};

use crate::subpath::{shortest_loop, Subpath, SubpathSegment};

/// Loops shorter than this, mid-search, aren't worth the cost of a
/// forced-closure shortest-path detour.
const MAX_SEARCH: usize = 20;

/// Per-invocation search parameters.
#[derive(Debug, Clone, Copy)]
pub struct SearchSettings {
    pub max_distance: trailmesh_common::Distance,
    pub max_segments: usize,
    pub max_concurrent: usize,
    pub timeout_s: u64,
    pub stop_searching_cutoff: trailmesh_common::Distance,
    /// Weight on `repeat_quality` in the quality formula — projected from
    /// `IngestSettings::quality_settings.repeat_node_weight`.
    pub repeat_weight: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings {
            max_distance: trailmesh_common::Distance::km(20.0),
            max_segments: 100,
            max_concurrent: 50,
            timeout_s: 10,
            stop_searching_cutoff: trailmesh_common::Distance::mi(8.0),
            repeat_weight: 1.0,
        }
    }
}

/// Enumerate loop hikes from `root` in `graph` (one connected component's
/// subgraph, as produced by `trailmesh_graph::extract_networks`).
pub fn find_loops(graph: &Graph, root: NodeIdx, settings: &SearchSettings) -> Vec<Subpath> {
    let mut out = Vec::new();
    search(graph, root, settings, |p| out.push(p));
    out
}

/// Drive the search, calling `on_loop` once per yielded (complete,
/// worth-keeping) `Subpath`. Exists separately from `find_loops` so a caller
/// that wants to stream results — or bail out after the first few — doesn't
/// have to wait for the whole `Vec` to materialize.
pub fn search(graph: &Graph, root: NodeIdx, settings: &SearchSettings, mut on_loop: impl FnMut(Subpath)) {
    let edge_count = graph.edge_count();
    if edge_count == 0 {
        return;
    }
    let total_km = graph.total_length_km();
    if total_km / edge_count as f64 < 0.1 {
        log::info!(
            "network is too dense ({total_km:.3} km / {edge_count} edges); yielding no loops"
        );
        return;
    }

    let max_segments = settings.max_segments.min(edge_count);
    let max_distance_m = settings.max_distance.as_m().min(total_km * 1000.0 * 1.1);
    let stop_searching_thresh = ((total_km / 4.0) as i64).clamp(1, 20) as usize;
    let exit_thresh = ((total_km / 2.0) as i64).clamp(1, 20) as usize;
    let max_length_target_m = max_distance_m.min(settings.stop_searching_cutoff.as_m());

    let mut active_paths = vec![Subpath::root(root)];
    let mut loops_yielded: usize = 0;
    let mut length_target_met = false;
    let start = Instant::now();
    let timeout = Duration::from_secs(settings.timeout_s);

    while !active_paths.is_empty() && !(loops_yielded >= exit_thresh && length_target_met) {
        if start.elapsed() >= timeout {
            log::warn!("loop search timed out after yielding {loops_yielded} loops");
            break;
        }

        active_paths.retain(|p| p.length_m() < max_distance_m && p.segment_count() < max_segments);

        let mut final_paths = Vec::new();
        if active_paths.len() > settings.max_concurrent {
            active_paths.sort_by(|a, b| {
                b.quality(settings.repeat_weight)
                    .total_cmp(&a.quality(settings.repeat_weight))
            });
            active_paths.retain(|p| p.quality(settings.repeat_weight) > 0.5);

            if loops_yielded < stop_searching_thresh {
                let overflow: Vec<Subpath> = active_paths
                    .iter()
                    .skip(settings.max_concurrent)
                    .filter(|p| p.length_m() > shortest_loop().as_m() / 2.0)
                    .take(MAX_SEARCH)
                    .cloned()
                    .collect();
                for mut path in overflow {
                    if force_close(graph, &mut path) {
                        debug_assert!(path.is_complete());
                        if path.worth_keeping(settings.repeat_weight) {
                            loops_yielded += 1;
                            if path.length_m() >= max_length_target_m {
                                length_target_met = true;
                            }
                            on_loop(path);
                        }
                        if loops_yielded > stop_searching_thresh {
                            break;
                        }
                    }
                }
            }
            active_paths.truncate(settings.max_concurrent);
        }

        for path in active_paths {
            let neighbors = graph.neighbors(path.last_node());
            let option_count = neighbors.len();
            for &(_, edge_idx) in neighbors {
                let edge = graph.edge(edge_idx);
                if option_count > 1 && edge.trail.id == path.last_segment().id {
                    continue;
                }
                let seg = segment_for_edge(graph, edge_idx, path.last_node());
                let new_path = path.extended(seg);
                if new_path.is_complete() {
                    if new_path.worth_keeping(settings.repeat_weight) {
                        loops_yielded += 1;
                        if new_path.length_m() >= max_length_target_m {
                            length_target_met = true;
                        }
                        on_loop(new_path);
                    }
                } else {
                    final_paths.push(new_path);
                }
            }
        }
        active_paths = final_paths;
    }
}

/// Build the `SubpathSegment` for walking `edge_idx` starting from `from`,
/// picking the trail orientation whose first node equals `from`.
fn segment_for_edge(graph: &Graph, edge_idx: EdgeIdx, from: NodeIdx) -> SubpathSegment {
    let edge = graph.edge(edge_idx);
    let (trail, first_node, last_node) = if edge.a == from {
        (None, edge.a, edge.b)
    } else {
        (Some(edge.trail.reversed()), edge.b, edge.a)
    };
    let name = trail.as_ref().map_or_else(|| edge.trail.name.clone(), |t| t.name.clone());
    SubpathSegment {
        id: edge.trail.id.clone(),
        name,
        length_m: edge.trail.length_m(),
        first_node,
        last_node,
    }
}

/// Forced closure: find the shortest path (by `weight` =
/// trail length in km) from `path.last_node()` back to `path.start_node()`
/// and mutably extend `path` along it. Returns `false` (leaving `path`
/// untouched) if no path exists, which can't happen within a single
/// connected component but is handled defensively since this walks a
/// caller-supplied subgraph.
fn force_close(graph: &Graph, path: &mut Subpath) -> bool {
    let Some(edges) = shortest_path_edges(graph, path.last_node(), path.start_node()) else {
        log::warn!(
            "forced closure: {} (node {:?} to {:?})",
            trailmesh_common::Error::NoShortestPath,
            path.last_node(),
            path.start_node()
        );
        return false;
    };
    let mut cur = path.last_node();
    for edge_idx in edges {
        let seg = segment_for_edge(graph, edge_idx, cur);
        cur = seg.last_node;
        path.extend_in_place(seg);
    }
    true
}

/// Plain Dijkstra over `graph`, weighted by `Edge::length_km`, returning the
/// sequence of edges from `from` to `to` (empty if `from == to`).
fn shortest_path_edges(graph: &Graph, from: NodeIdx, to: NodeIdx) -> Option<Vec<EdgeIdx>> {
    use std::cmp::Ordering;
    use std::collections::BinaryHeap;

    if from == to {
        return Some(Vec::new());
    }

    #[derive(PartialEq)]
    struct HeapEntry(f64, NodeIdx);
    impl Eq for HeapEntry {}
    impl PartialOrd for HeapEntry {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }
    impl Ord for HeapEntry {
        fn cmp(&self, other: &Self) -> Ordering {
            other.0.total_cmp(&self.0)
        }
    }

    let n = graph.node_count();
    let mut dist = vec![f64::INFINITY; n];
    let mut via: Vec<Option<EdgeIdx>> = vec![None; n];
    let mut prev: Vec<Option<NodeIdx>> = vec![None; n];
    dist[from] = 0.0;
    let mut heap = BinaryHeap::new();
    heap.push(HeapEntry(0.0, from));

    while let Some(HeapEntry(d, node)) = heap.pop() {
        if d > dist[node] {
            continue;
        }
        if node == to {
            break;
        }
        for &(next, edge_idx) in graph.neighbors(node) {
            let weight = graph.edge(edge_idx).length_km;
            let nd = d + weight;
            if nd < dist[next] {
                dist[next] = nd;
                via[next] = Some(edge_idx);
                prev[next] = Some(node);
                heap.push(HeapEntry(nd, next));
            }
        }
    }

    if dist[to].is_infinite() {
        return None;
    }
    let mut edges = Vec::new();
    let mut cur = to;
    while let Some(p) = prev[cur] {
        edges.push(via[cur].expect("prev set implies via set"));
        cur = p;
    }
    edges.reverse();
    Some(edges)
}
