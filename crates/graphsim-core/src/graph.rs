use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// A directed graph with typed nodes and optionally typed edges.
///
/// Node `i` carries a vocabulary id (`node_types[i]`), e.g. the kind of an
/// AST node. Edge `k` is the pair `(src, dst)`; messages flow from `src`
/// to `dst`.
///
/// # Example
///
/// ```rust
/// use graphsim_core::Graph;
///
/// let g = Graph::new(vec![3, 7, 7], vec![(0, 1), (0, 2)]).with_edge_types(vec![1, 1]);
///
/// assert_eq!(g.num_nodes(), 3);
/// assert_eq!(g.num_edges(), 2);
/// assert!(g.validate(10, 20).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    /// Vocabulary id per node.
    pub node_types: Vec<u32>,

    /// Directed edges as (source, target).
    #[serde(default)]
    pub edges: Vec<(u32, u32)>,

    /// Edge-kind id per edge, parallel to `edges`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_types: Option<Vec<u32>>,
}

/// Summary statistics for a [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphStats {
    pub num_nodes: usize,
    pub num_edges: usize,
    pub max_in_degree: usize,
    pub max_out_degree: usize,
    /// Nodes with neither incoming nor outgoing edges.
    pub isolated_nodes: usize,
    pub self_loops: usize,
}

impl Graph {
    /// Create an untyped-edge graph.
    pub fn new(node_types: Vec<u32>, edges: Vec<(u32, u32)>) -> Self {
        Self {
            node_types,
            edges,
            edge_types: None,
        }
    }

    /// Attach edge types (one per edge).
    pub fn with_edge_types(mut self, edge_types: Vec<u32>) -> Self {
        self.edge_types = Some(edge_types);
        self
    }

    pub fn num_nodes(&self) -> usize {
        self.node_types.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn has_edge_types(&self) -> bool {
        self.edge_types.is_some()
    }

    /// Check the graph against the node and edge vocabularies.
    ///
    /// Errors on an empty graph, out-of-range node types, dangling edge
    /// endpoints, a mismatched edge-type count, or out-of-range edge types.
    pub fn validate(&self, vocab_size: usize, edge_vocab_size: usize) -> Result<()> {
        let num_nodes = self.num_nodes();
        if num_nodes == 0 {
            return Err(Error::EmptyGraph);
        }

        if let Some((node, &node_type)) = self
            .node_types
            .iter()
            .enumerate()
            .find(|(_, &t)| t as usize >= vocab_size)
        {
            return Err(Error::NodeTypeOutOfRange {
                node,
                node_type,
                vocab_size,
            });
        }

        for (edge, &(src, dst)) in self.edges.iter().enumerate() {
            if src as usize >= num_nodes || dst as usize >= num_nodes {
                return Err(Error::EdgeEndpointOutOfRange {
                    edge,
                    src,
                    dst,
                    num_nodes,
                });
            }
        }

        if let Some(types) = &self.edge_types {
            if types.len() != self.edges.len() {
                return Err(Error::EdgeTypeCountMismatch {
                    edges: self.edges.len(),
                    types: types.len(),
                });
            }
            if let Some((edge, &edge_type)) = types
                .iter()
                .enumerate()
                .find(|(_, &t)| t as usize >= edge_vocab_size)
            {
                return Err(Error::EdgeTypeOutOfRange {
                    edge,
                    edge_type,
                    vocab_size: edge_vocab_size,
                });
            }
        }

        Ok(())
    }

    /// Add a self loop to every node that lacks one.
    ///
    /// New loops get edge type 0 when the graph is edge-typed.
    pub fn add_self_loops(&self) -> Self {
        let mut has_loop = vec![false; self.num_nodes()];
        for &(src, dst) in &self.edges {
            if src == dst {
                if let Some(slot) = has_loop.get_mut(src as usize) {
                    *slot = true;
                }
            }
        }

        let mut out = self.clone();
        for (node, _) in has_loop.iter().enumerate().filter(|(_, &l)| !l) {
            let node = node as u32;
            out.edges.push((node, node));
            if let Some(types) = out.edge_types.as_mut() {
                types.push(0);
            }
        }
        out
    }

    /// Flip the direction of every edge.
    pub fn reversed(&self) -> Self {
        Self {
            node_types: self.node_types.clone(),
            edges: self.edges.iter().map(|&(s, d)| (d, s)).collect(),
            edge_types: self.edge_types.clone(),
        }
    }

    /// Append the reverse of every non-loop edge, copying its type.
    pub fn to_undirected(&self) -> Self {
        let mut out = self.clone();
        for (k, &(src, dst)) in self.edges.iter().enumerate() {
            if src == dst {
                continue;
            }
            out.edges.push((dst, src));
            if let (Some(out_types), Some(types)) = (out.edge_types.as_mut(), &self.edge_types) {
                out_types.push(types.get(k).copied().unwrap_or(0));
            }
        }
        out
    }

    /// Compute degree statistics.
    pub fn stats(&self) -> GraphStats {
        let n = self.num_nodes();
        let mut in_deg = vec![0usize; n];
        let mut out_deg = vec![0usize; n];
        let mut self_loops = 0;

        for &(src, dst) in &self.edges {
            if let Some(d) = out_deg.get_mut(src as usize) {
                *d += 1;
            }
            if let Some(d) = in_deg.get_mut(dst as usize) {
                *d += 1;
            }
            if src == dst {
                self_loops += 1;
            }
        }

        let isolated_nodes = in_deg
            .iter()
            .zip(&out_deg)
            .filter(|(&i, &o)| i == 0 && o == 0)
            .count();

        GraphStats {
            num_nodes: n,
            num_edges: self.num_edges(),
            max_in_degree: in_deg.iter().copied().max().unwrap_or(0),
            max_out_degree: out_deg.iter().copied().max().unwrap_or(0),
            isolated_nodes,
            self_loops,
        }
    }

    /// Load from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Write to a JSON file.
    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}
