//! Graph similarity encoders on candle.
//!
//! `graphsim-nn` turns graphs into fixed-size vectors with learned message
//! passing. It sits between the data layer (`graphsim-core`) and whatever
//! consumes the embeddings (a similarity score, a contrastive loss, a
//! training loop).
//!
//! # Modules
//!
//! - [`message`]: gather / scatter-add propagation and the [`MessagePassing`] trait
//! - [`gmn`]: graph matching layer with cross-graph attention
//! - [`ggnn`]: gated graph convolution
//! - [`gru`]: GRU cell used as the node update
//! - [`pool`]: gated attention readout
//! - [`models`]: [`GMNNet`], [`GGNN`] and the [`PairEncoder`] trait
//! - [`similarity`]: cosine / Euclidean scores and cosine embedding loss
//!
//! # Example: Comparing Two Graphs
//!
//! ```rust
//! use candle_core::{DType, Device};
//! use candle_nn::{VarBuilder, VarMap};
//! use graphsim_core::Graph;
//! use graphsim_nn::{cosine_similarity, GraphTensors, GMNNet, ModelConfig, PairEncoder};
//!
//! let device = Device::Cpu;
//! let varmap = VarMap::new();
//! let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
//!
//! let config = ModelConfig { vocab_size: 16, embedding_dim: 32, ..Default::default() };
//! let model = GMNNet::new(&config, vb)?;
//!
//! let a = Graph::new(vec![1, 4, 4], vec![(0, 1), (0, 2)]);
//! let b = Graph::new(vec![1, 4], vec![(0, 1)]);
//! let a = GraphTensors::from_graph(&a, &device)?;
//! let b = GraphTensors::from_graph(&b, &device)?;
//!
//! let (ha, hb) = model.encode_pair(&a, &b)?;  // (1, 32) each
//! let score = cosine_similarity(&ha, &hb)?;    // (1,)
//! # Ok::<(), graphsim_nn::Error>(())
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod ggnn;
pub mod gmn;
pub mod gru;
pub mod message;
pub mod models;
pub mod pool;
pub mod similarity;

pub use config::{ModelConfig, ModelKind};
pub use data::{GraphBatch, GraphTensors};
pub use error::{Error, Result};
pub use ggnn::GatedGraphConv;
pub use gmn::{cross_graph_attention, GMNLayer};
pub use gru::GRUCell;
pub use message::{Flow, MessagePassing};
pub use models::{GGNN, GMNNet, GraphSimModel, PairEncoder};
pub use pool::GlobalAttentionPool;
pub use similarity::{cosine_embedding_loss, cosine_similarity, euclidean_distance};
