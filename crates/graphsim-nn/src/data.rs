//! Graph to tensor conversion.
//!
//! Encoders consume index tensors, not [`Graph`] values:
//!
//! - `node_ids`: `[N]` u32 vocabulary ids
//! - `edge_index`: `[2, E]` u32, row 0 = source, row 1 = target
//! - `edge_types`: optional `[E]` u32

use crate::{Error, Result};
use candle_core::{DType, Device, Tensor};
use graphsim_core::Graph;

/// Index tensors for a single graph.
#[derive(Debug, Clone)]
pub struct GraphTensors {
    pub node_ids: Tensor,
    pub edge_index: Tensor,
    pub edge_types: Option<Tensor>,
    pub num_nodes: usize,
    pub num_edges: usize,
}

impl GraphTensors {
    /// Build tensors from a graph.
    ///
    /// The graph is not validated against a vocabulary here; models do that
    /// through [`GraphTensors::check`] before embedding.
    pub fn from_graph(graph: &Graph, device: &Device) -> Result<Self> {
        let edge_types = match &graph.edge_types {
            Some(t) => Some(Tensor::from_vec(t.clone(), graph.num_edges(), device)?),
            None => None,
        };
        Ok(Self {
            node_ids: Tensor::from_vec(graph.node_types.clone(), graph.num_nodes(), device)?,
            edge_index: edge_index(graph, device)?,
            edge_types,
            num_nodes: graph.num_nodes(),
            num_edges: graph.num_edges(),
        })
    }

    /// Wrap pre-built tensors, accepting `[N]` or `[N, 1]` node ids.
    pub fn from_tensors(
        node_ids: Tensor,
        edge_index: Tensor,
        edge_types: Option<Tensor>,
    ) -> Result<Self> {
        let node_ids = flatten_ids(node_ids)?;
        let (rows, num_edges) = edge_index.dims2()?;
        if rows != 2 {
            return Err(Error::DimensionMismatch {
                expected: 2,
                got: rows,
            });
        }
        let edge_types = match edge_types {
            Some(t) => {
                let t = flatten_ids(t)?;
                let got = t.dim(0)?;
                if got != num_edges {
                    return Err(Error::DimensionMismatch {
                        expected: num_edges,
                        got,
                    });
                }
                Some(t)
            }
            None => None,
        };
        Ok(Self {
            num_nodes: node_ids.dim(0)?,
            node_ids,
            edge_index: edge_index.to_dtype(DType::U32)?,
            edge_types,
            num_edges,
        })
    }

    /// Check ids against vocabulary sizes and edge endpoints against the node count.
    pub fn check(&self, vocab_size: usize, edge_vocab_size: usize) -> Result<()> {
        if self.num_nodes == 0 {
            return Err(graphsim_core::Error::EmptyGraph.into());
        }
        check_max(&self.node_ids, vocab_size, "node type")?;
        if self.num_edges > 0 {
            check_max(&self.edge_index, self.num_nodes, "edge endpoint")?;
            if let Some(t) = &self.edge_types {
                check_max(t, edge_vocab_size, "edge type")?;
            }
        }
        Ok(())
    }

    pub fn device(&self) -> &Device {
        self.node_ids.device()
    }
}

/// Several graphs merged into one disjoint union.
///
/// `batch[i]` is the index of the graph node `i` came from, which is what
/// [`crate::pool::GlobalAttentionPool`] needs to pool per graph.
#[derive(Debug, Clone)]
pub struct GraphBatch {
    pub graphs: GraphTensors,
    pub batch: Tensor,
    pub num_graphs: usize,
}

impl GraphBatch {
    /// Concatenate graphs, offsetting edge endpoints.
    ///
    /// Every edge must stay inside its own graph; an endpoint past the
    /// graph's node count is rejected before offsetting. Edge types are kept
    /// only when every graph has them.
    pub fn from_graphs(graphs: &[Graph], device: &Device) -> Result<Self> {
        if graphs.is_empty() {
            return Err(Error::InvalidInput("batch needs at least one graph".into()));
        }
        let keep_types = graphs.iter().all(Graph::has_edge_types);

        let mut node_ids = Vec::new();
        let mut batch = Vec::new();
        let mut src = Vec::new();
        let mut dst = Vec::new();
        let mut types = Vec::new();

        for (b, g) in graphs.iter().enumerate() {
            let offset = node_ids.len() as u32;
            node_ids.extend_from_slice(&g.node_types);
            batch.extend(std::iter::repeat(b as u32).take(g.num_nodes()));
            let n = g.num_nodes();
            for (edge, &(s, d)) in g.edges.iter().enumerate() {
                if s as usize >= n || d as usize >= n {
                    return Err(graphsim_core::Error::EdgeEndpointOutOfRange {
                        edge,
                        src: s,
                        dst: d,
                        num_nodes: n,
                    }
                    .into());
                }
                src.push(s + offset);
                dst.push(d + offset);
            }
            if keep_types {
                if let Some(t) = &g.edge_types {
                    if t.len() != g.num_edges() {
                        return Err(graphsim_core::Error::EdgeTypeCountMismatch {
                            edges: g.num_edges(),
                            types: t.len(),
                        }
                        .into());
                    }
                    types.extend_from_slice(t);
                }
            }
        }

        let num_nodes = node_ids.len();
        let num_edges = src.len();
        src.extend(dst);
        let edge_types = if keep_types {
            Some(Tensor::from_vec(types, num_edges, device)?)
        } else {
            None
        };

        Ok(Self {
            graphs: GraphTensors {
                node_ids: Tensor::from_vec(node_ids, num_nodes, device)?,
                edge_index: Tensor::from_vec(src, (2, num_edges), device)?,
                edge_types,
                num_nodes,
                num_edges,
            },
            batch: Tensor::from_vec(batch, num_nodes, device)?,
            num_graphs: graphs.len(),
        })
    }
}

fn edge_index(graph: &Graph, device: &Device) -> Result<Tensor> {
    let e = graph.num_edges();
    let mut flat = Vec::with_capacity(2 * e);
    flat.extend(graph.edges.iter().map(|&(s, _)| s));
    flat.extend(graph.edges.iter().map(|&(_, d)| d));
    Ok(Tensor::from_vec(flat, (2, e), device)?)
}

/// `[N]` or `[N, 1]` -> `[N]` u32.
fn flatten_ids(ids: Tensor) -> Result<Tensor> {
    let ids = match ids.rank() {
        1 => ids,
        2 if ids.dim(1)? == 1 => ids.squeeze(1)?,
        _ => {
            return Err(Error::InvalidInput(format!(
                "expected id tensor of shape [N] or [N, 1], got {:?}",
                ids.dims()
            )))
        }
    };
    Ok(ids.to_dtype(DType::U32)?)
}

fn check_max(ids: &Tensor, limit: usize, what: &str) -> Result<()> {
    if ids.elem_count() == 0 {
        return Ok(());
    }
    let max = ids.flatten_all()?.max(0)?.to_scalar::<u32>()? as usize;
    if max >= limit {
        return Err(Error::InvalidInput(format!(
            "{what} {max} out of range 0..{limit}"
        )));
    }
    Ok(())
}
