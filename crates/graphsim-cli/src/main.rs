//! graphsim CLI - embed and compare graphs from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Write a starting config
//! graphsim init-config -o model.json
//!
//! # Show statistics about a graph
//! graphsim stats graph.json
//!
//! # Embed a graph (prints a JSON array)
//! graphsim embed graph.json --config model.json --weights model.safetensors
//!
//! # Score a pair of graphs
//! graphsim compare pair.json --config model.json --weights model.safetensors
//! ```
//!
//! Graph files look like `{"node_types": [..], "edges": [[src, dst], ..], "edge_types": [..]}`;
//! pair files are `{"left": <graph>, "right": <graph>}`.

use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use clap::{ArgAction, Args, Parser, Subcommand};
use graphsim_core::{Graph, GraphPair};
use graphsim_nn::{
    cosine_similarity, euclidean_distance, GraphSimModel, GraphTensors, ModelConfig, PairEncoder,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "graphsim")]
#[command(about = "Graph similarity encoders CLI", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show statistics about a graph
    Stats {
        /// Input graph (JSON)
        input: PathBuf,
    },

    /// Embed a single graph
    Embed {
        /// Input graph (JSON)
        input: PathBuf,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Score the similarity of a graph pair
    Compare {
        /// Input pair (JSON with "left" and "right")
        input: PathBuf,

        #[command(flatten)]
        model: ModelArgs,

        /// Also print both embeddings
        #[arg(long)]
        embeddings: bool,
    },

    /// Write the default model config as JSON
    InitConfig {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct ModelArgs {
    /// Model config (JSON); defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Trained parameters (safetensors); random init when omitted
    #[arg(short, long)]
    weights: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Stats { input } => cmd_stats(&input),
        Commands::Embed { input, model } => cmd_embed(&input, &model),
        Commands::Compare {
            input,
            model,
            embeddings,
        } => cmd_compare(&input, &model, embeddings),
        Commands::InitConfig { output } => cmd_init_config(output.as_deref()),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<ModelConfig> {
    match path {
        Some(p) => ModelConfig::from_json_file(p)
            .with_context(|| format!("Failed to load config {}", p.display())),
        None => Ok(ModelConfig::default()),
    }
}

/// Build the model, then overwrite its parameters from `weights` if given.
fn load_model(args: &ModelArgs, device: &Device) -> Result<GraphSimModel> {
    let config = load_config(args.config.as_deref())?;
    let mut varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
    let model = GraphSimModel::new(&config, vb).context("Failed to build model")?;

    match &args.weights {
        Some(path) => {
            varmap
                .load(path)
                .with_context(|| format!("Failed to load weights {}", path.display()))?;
            info!(path = %path.display(), "loaded weights");
        }
        None => info!("no weights given, using random initialization"),
    }
    debug!(?config, "model ready");
    Ok(model)
}

fn to_row(t: &Tensor) -> Result<Vec<f32>> {
    Ok(t.flatten_all()?.to_vec1::<f32>()?)
}

fn cmd_stats(input: &Path) -> Result<()> {
    let graph = Graph::from_json_file(input)
        .with_context(|| format!("Failed to load graph {}", input.display()))?;
    let stats = graph.stats();

    println!("Graph Statistics");
    println!("================");
    println!("Nodes:          {}", stats.num_nodes);
    println!("Edges:          {}", stats.num_edges);
    println!("Edge types:     {}", if graph.has_edge_types() { "yes" } else { "no" });
    println!("Max in-degree:  {}", stats.max_in_degree);
    println!("Max out-degree: {}", stats.max_out_degree);
    println!("Self loops:     {}", stats.self_loops);
    println!("Isolated nodes: {}", stats.isolated_nodes);
    Ok(())
}

fn cmd_embed(input: &Path, args: &ModelArgs) -> Result<()> {
    let device = Device::Cpu;
    let model = load_model(args, &device)?;
    let config = model.config();

    let graph = Graph::from_json_file(input)
        .with_context(|| format!("Failed to load graph {}", input.display()))?;
    graph
        .validate(config.vocab_size, config.edge_vocab_size)
        .with_context(|| format!("Invalid graph {}", input.display()))?;

    let start = Instant::now();
    let tensors = GraphTensors::from_graph(&graph, &device)?;
    let embedding = model.encode(&tensors)?;
    info!(elapsed = ?start.elapsed(), "encoded graph");

    println!("{}", serde_json::to_string(&to_row(&embedding)?)?);
    Ok(())
}

fn cmd_compare(input: &Path, args: &ModelArgs, show_embeddings: bool) -> Result<()> {
    let device = Device::Cpu;
    let model = load_model(args, &device)?;
    let config = model.config();

    let pair = GraphPair::from_json_file(input)
        .with_context(|| format!("Failed to load pair {}", input.display()))?;
    pair.validate(config.vocab_size, config.edge_vocab_size)
        .with_context(|| format!("Invalid pair {}", input.display()))?;

    let start = Instant::now();
    let left = GraphTensors::from_graph(&pair.left, &device)?;
    let right = GraphTensors::from_graph(&pair.right, &device)?;
    let (a, b) = model.encode_pair(&left, &right)?;
    info!(elapsed = ?start.elapsed(), "encoded pair");

    let cosine = to_row(&cosine_similarity(&a, &b)?)?[0];
    let distance = to_row(&euclidean_distance(&a, &b)?)?[0];

    println!("Similarity: {cosine:.4}");
    println!("Distance:   {distance:.4}");
    if show_embeddings {
        println!("Left:  {}", serde_json::to_string(&to_row(&a)?)?);
        println!("Right: {}", serde_json::to_string(&to_row(&b)?)?);
    }
    Ok(())
}

fn cmd_init_config(output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(&ModelConfig::default())?;
    match output {
        Some(path) => {
            fs::write(path, format!("{json}\n"))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote default config to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
