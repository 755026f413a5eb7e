//! Data model and the graph arena: an arena of `Node`s indexed by a small
//! integer id, adjacency as `map<NodeIdx, list<(NodeIdx, EdgeIdx)>>`,
//! trails owned by a separate edges arena. This replaces shared-pointer
//! Node/Trail objects so a `Subpath` (in `trailmesh-search`) can carry
//! only indices.

use std::collections::HashMap;

use sha2::{Digest, Sha256};
use trailmesh_common::{Error, NodeId, Result, WayId};

/// A graph vertex: identity plus coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub lat: f64,
    pub lon: f64,
}

impl Node {
    pub fn distance_m(&self, other: &Node) -> f64 {
        trailmesh_common::geo::haversine_distance_m(self.lat, self.lon, other.lat, other.lon)
    }
}

/// A directed polyline admitted to the trail graph.
#[derive(Debug, Clone)]
pub struct Trail {
    pub id: String,
    pub way_id: WayId,
    pub name: Option<String>,
    pub nodes: Vec<Node>,
    length_m: f64,
}

impl Trail {
    /// Build a trail, computing and memoizing `length_m` once.
    pub fn new(id: String, way_id: WayId, name: Option<String>, nodes: Vec<Node>) -> Result<Self> {
        if nodes.len() < 2 {
            return Err(Error::DegenerateTrail(way_id.0));
        }
        for pair in nodes.windows(2) {
            if pair[0].id == pair[1].id {
                return Err(Error::InvalidGeometry(format!(
                    "trail {id} has a zero-length segment at node {}",
                    pair[0].id
                )));
            }
        }
        let length_m = nodes
            .windows(2)
            .map(|pair| pair[0].distance_m(&pair[1]))
            .sum();
        Ok(Trail {
            id,
            way_id,
            name,
            nodes,
            length_m,
        })
    }

    pub fn length_m(&self) -> f64 {
        self.length_m
    }

    pub fn first_node(&self) -> &Node {
        &self.nodes[0]
    }

    pub fn last_node(&self) -> &Node {
        self.nodes.last().expect("trail always has >=2 nodes")
    }

    /// Reversal preserves `id` and `way_id`, only reverses the node list.
    pub fn reversed(&self) -> Trail {
        let mut nodes = self.nodes.clone();
        nodes.reverse();
        Trail {
            id: self.id.clone(),
            way_id: self.way_id,
            name: self.name.clone(),
            nodes,
            length_m: self.length_m,
        }
    }

    /// Split at the given interior indices (each in `1..len-1`), producing
    /// `idxs.len() + 1` new trails whose ids are `"<way>-<j>/<k>"`. Every
    /// boundary node is shared between the two trails it separates, so the
    /// multiset of nodes is preserved.
    pub fn split_at(&self, idxs: &[usize]) -> Vec<Trail> {
        let k = idxs.len();
        let mut boundaries = Vec::with_capacity(k + 2);
        boundaries.push(0);
        boundaries.extend_from_slice(idxs);
        boundaries.push(self.nodes.len() - 1);

        let mut out = Vec::with_capacity(k + 1);
        for j in 0..=k {
            let start = boundaries[j];
            let end = boundaries[j + 1];
            let seg_nodes = self.nodes[start..=end].to_vec();
            let id = format!("{}-{}/{}", self.way_id.0, j, k);
            out.push(
                Trail::new(id, self.way_id, self.name.clone(), seg_nodes)
                    .expect("segment boundaries are strictly increasing, so >=2 distinct nodes"),
            );
        }
        out
    }

    /// Rewrite the first and/or last node, preserving length (same
    /// coordinates, only identity changes) — used by the road-crossing
    /// disconnector.
    pub fn with_endpoint(&self, index_from_start: bool, new_node: Node) -> Trail {
        let mut nodes = self.nodes.clone();
        if index_from_start {
            nodes[0] = new_node;
        } else {
            let last = nodes.len() - 1;
            nodes[last] = new_node;
        }
        Trail {
            id: self.id.clone(),
            way_id: self.way_id,
            name: self.name.clone(),
            nodes,
            // coordinates of the endpoint are unchanged, so length is too.
            length_m: self.length_m,
        }
    }
}

/// `(polygon, name, tags)` — used only to name networks.
#[derive(Debug, Clone)]
pub struct Park {
    pub id: i64,
    pub name: String,
    pub polygon: geo::MultiPolygon<f64>,
    pub tags: HashMap<String, String>,
}

pub type NodeIdx = usize;
pub type EdgeIdx = usize;

#[derive(Debug, Clone)]
pub struct Edge {
    pub trail: Trail,
    pub length_km: f64,
    pub a: NodeIdx,
    pub b: NodeIdx,
}

/// The global undirected multi-graph. Vertices are `Node`s, edges each carry a `Trail`.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    index: HashMap<NodeId, NodeIdx>,
    adjacency: Vec<Vec<(NodeIdx, EdgeIdx)>>,
    edges: Vec<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Graph::default()
    }

    fn get_or_insert_node(&mut self, node: Node) -> NodeIdx {
        if let Some(&idx) = self.index.get(&node.id) {
            return idx;
        }
        let idx = self.nodes.len();
        self.index.insert(node.id.clone(), idx);
        self.nodes.push(node);
        self.adjacency.push(Vec::new());
        idx
    }

    /// Insert one weighted edge per segment, keyed by node identity;
    /// duplicate edges between the same pair of vertices are preserved
    /// (this is a multi-graph, not a simple graph).
    pub fn add_edge(&mut self, trail: Trail) -> EdgeIdx {
        let length_km = trail.length_m() / 1000.0;
        let a = self.get_or_insert_node(trail.first_node().clone());
        let b = self.get_or_insert_node(trail.last_node().clone());
        let edge_idx = self.edges.len();
        self.edges.push(Edge {
            trail,
            length_km,
            a,
            b,
        });
        self.adjacency[a].push((b, edge_idx));
        if a != b {
            self.adjacency[b].push((a, edge_idx));
        }
        edge_idx
    }

    pub fn node(&self, idx: NodeIdx) -> &Node {
        &self.nodes[idx]
    }

    pub fn edge(&self, idx: EdgeIdx) -> &Edge {
        &self.edges[idx]
    }

    pub fn node_index(&self, id: &NodeId) -> Option<NodeIdx> {
        self.index.get(id).copied()
    }

    pub fn neighbors(&self, idx: NodeIdx) -> &[(NodeIdx, EdgeIdx)] {
        &self.adjacency[idx]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIdx> {
        0..self.nodes.len()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// Connected components via BFS, returned in deterministic
    /// first-encountered-node order (not arbitrary `HashMap` order).
    pub fn connected_components(&self) -> Vec<Vec<NodeIdx>> {
        let mut visited = vec![false; self.nodes.len()];
        let mut components = Vec::new();
        for start in 0..self.nodes.len() {
            if visited[start] {
                continue;
            }
            let mut component = Vec::new();
            let mut queue = std::collections::VecDeque::new();
            queue.push_back(start);
            visited[start] = true;
            while let Some(n) = queue.pop_front() {
                component.push(n);
                for &(next, _) in &self.adjacency[n] {
                    if !visited[next] {
                        visited[next] = true;
                        queue.push_back(next);
                    }
                }
            }
            components.push(component);
        }
        components
    }

    /// Build a compact, reindexed subgraph containing only the given
    /// nodes and the edges between them (both endpoints members).
    pub fn induced_subgraph(&self, members: &[NodeIdx]) -> Graph {
        let member_set: std::collections::HashSet<NodeIdx> = members.iter().copied().collect();
        let mut sub = Graph::new();
        let mut remap: HashMap<NodeIdx, NodeIdx> = HashMap::new();
        for &old in members {
            let new = sub.get_or_insert_node(self.nodes[old].clone());
            remap.insert(old, new);
        }
        let mut seen_edges = std::collections::HashSet::new();
        for &old in members {
            for &(neighbor, edge_idx) in &self.adjacency[old] {
                if !member_set.contains(&neighbor) || !seen_edges.insert(edge_idx) {
                    continue;
                }
                sub.add_edge(self.edges[edge_idx].trail.clone());
            }
        }
        sub
    }

    pub fn total_length_km(&self) -> f64 {
        self.edges.iter().map(|e| e.length_km).sum()
    }

    /// `SHA256` of concatenated sorted stringification of the graph's
    /// nodes — used for network deduplication across ingests.
    pub fn content_digest(&self) -> String {
        let mut ids: Vec<String> = self.nodes.iter().map(|n| n.id.to_string()).collect();
        ids.sort();
        let mut hasher = Sha256::new();
        hasher.update(ids.join(",").as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// `(node, name)` — a network access point reachable by car.
#[derive(Debug, Clone, PartialEq)]
pub struct Trailhead {
    pub node: Node,
    pub name: String,
}

/// One connected component of the segmented, road-disconnected graph.
pub struct TrailNetwork {
    pub graph: Graph,
    pub name: Option<String>,
    pub trailheads: Vec<Trailhead>,
    pub digest: String,
    pub total_length_km: f64,
}

impl TrailNetwork {
    /// Equality key: sorted, comma-joined set of underlying way ids.
    pub fn unique_id(&self) -> String {
        let mut way_ids: Vec<i64> = self
            .graph
            .edges()
            .map(|e| e.trail.way_id.0)
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();
        way_ids.sort_unstable();
        way_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}
