//! Co-actor graph store: deduplicated nodes and undirected edges with degree analytics.
//!
//! Nodes and edges are kept in insertion order so the tables written by
//! [`Graph::write_nodes`] / [`Graph::write_edges`] reload into an identical graph.
//! Duplicate checks go through hash indices instead of scanning the lists.

mod tabular;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Column delimiter of the nodes/edges tables.
pub const DELIMITER: char = ',';

/// A single actor in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// TMDb person id.
    pub id: String,
    /// Display name, never containing [`DELIMITER`].
    pub name: String,
}

/// An undirected co-appearance between two actors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
}

impl Edge {
    /// Order-independent identity of the edge.
    fn key(&self) -> (String, String) {
        edge_key(&self.source, &self.target)
    }
}

fn edge_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Remove delimiter characters so a name occupies exactly one column.
pub fn sanitize_name(name: &str) -> String {
    name.chars().filter(|c| *c != DELIMITER).collect()
}

/// In-memory co-actor graph.
#[derive(Debug, Default, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    node_ids: HashSet<String>,
    edge_keys: HashSet<(String, String)>,
}

impl Graph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from already-trusted node and edge lists.
    /// No deduplication is applied; later `add_*` calls still respect
    /// every id and pair present here.
    pub(crate) fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let node_ids = nodes.iter().map(|n| n.id.clone()).collect();
        let edge_keys = edges.iter().map(Edge::key).collect();
        Self {
            nodes,
            edges,
            node_ids,
            edge_keys,
        }
    }

    /// Add an actor unless a node with the same id exists.
    /// Commas are stripped from the name before storage.
    pub fn add_node(&mut self, id: &str, name: &str) {
        if self.node_ids.contains(id) {
            return;
        }
        self.node_ids.insert(id.to_string());
        self.nodes.push(Node {
            id: id.to_string(),
            name: sanitize_name(name),
        });
    }

    /// Add an undirected edge unless (source, target) or (target, source) exists.
    pub fn add_edge(&mut self, source: &str, target: &str) {
        if !self.edge_keys.insert(edge_key(source, target)) {
            return;
        }
        self.edges.push(Edge {
            source: source.to_string(),
            target: target.to_string(),
        });
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_ids.contains(id)
    }

    pub fn contains_edge(&self, source: &str, target: &str) -> bool {
        self.edge_keys.contains(&edge_key(source, target))
    }

    pub fn total_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn total_edges(&self) -> usize {
        self.edges.len()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Return the node(s) with the highest degree, keyed by node id.
    ///
    /// Degree is counted from the edge list alone: every edge adds one to
    /// each endpoint (a self-loop adds two to its node). Nodes that appear in
    /// no edge are never reported. Ties yield several entries; a graph
    /// without edges yields an empty map.
    pub fn max_degree_nodes(&self) -> HashMap<String, usize> {
        let mut degrees: HashMap<&str, usize> = HashMap::new();
        for edge in &self.edges {
            *degrees.entry(edge.source.as_str()).or_insert(0) += 1;
            *degrees.entry(edge.target.as_str()).or_insert(0) += 1;
        }

        let max = match degrees.values().max() {
            Some(max) => *max,
            None => return HashMap::new(),
        };

        degrees
            .into_iter()
            .filter(|(_, degree)| *degree == max)
            .map(|(id, degree)| (id.to_string(), degree))
            .collect()
    }
}
