use assert_cmd::Command;
use candle_core::{DType, Device};
use candle_nn::{VarBuilder, VarMap};
use graphsim_core::Graph;
use graphsim_nn::{GraphSimModel, GraphTensors, ModelConfig};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

fn get_test_dir() -> PathBuf {
    let dir = PathBuf::from("target/tmp/tests");
    fs::create_dir_all(&dir).unwrap();
    dir
}

const SMALL_CONFIG: &str = r#"{"kind": "gmn", "vocab_size": 16, "embedding_dim": 8, "num_layers": 2}"#;

const GGNN_CONFIG: &str = r#"{"kind": "ggnn", "vocab_size": 16, "embedding_dim": 8, "num_layers": 2}"#;

const GRAPH: &str = r#"{"node_types": [1, 2, 3], "edges": [[0, 1], [0, 2], [2, 2]], "edge_types": [0, 0, 1]}"#;

#[test]
fn test_cli_stats() -> Result<(), Box<dyn std::error::Error>> {
    let dir = get_test_dir();
    let file = dir.join("stats_graph.json");
    fs::write(&file, GRAPH)?;

    let mut cmd = Command::cargo_bin("graphsim")?;
    cmd.arg("stats").arg(&file);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Nodes:          3"))
        .stdout(predicate::str::contains("Edges:          3"))
        .stdout(predicate::str::contains("Self loops:     1"));

    fs::remove_file(file)?;
    Ok(())
}

#[test]
fn test_cli_init_config() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("graphsim")?;
    cmd.arg("init-config");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""embedding_dim": 100"#))
        .stdout(predicate::str::contains(r#""edge_vocab_size": 20"#));
    Ok(())
}

#[test]
fn test_cli_embed() -> Result<(), Box<dyn std::error::Error>> {
    let dir = get_test_dir();
    let graph = dir.join("embed_graph.json");
    let config = dir.join("embed_config.json");
    fs::write(&graph, GRAPH)?;
    fs::write(&config, SMALL_CONFIG)?;

    let mut cmd = Command::cargo_bin("graphsim")?;
    cmd.arg("embed").arg(&graph).arg("--config").arg(&config);
    let output = cmd.assert().success().get_output().stdout.clone();

    let embedding: Vec<f32> = serde_json::from_slice(&output)?;
    assert_eq!(embedding.len(), 8);
    assert!(embedding.iter().all(|v| v.is_finite()));

    fs::remove_file(graph)?;
    fs::remove_file(config)?;
    Ok(())
}

#[test]
fn test_cli_compare_identical_pair() -> Result<(), Box<dyn std::error::Error>> {
    let dir = get_test_dir();
    let pair = dir.join("identical_pair.json");
    let config = dir.join("compare_config.json");
    fs::write(&pair, format!(r#"{{"left": {GRAPH}, "right": {GRAPH}}}"#))?;
    fs::write(&config, SMALL_CONFIG)?;

    let mut cmd = Command::cargo_bin("graphsim")?;
    cmd.arg("compare").arg(&pair).arg("-c").arg(&config);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Similarity: 1.0000"))
        .stdout(predicate::str::contains("Distance:   0.0000"));

    fs::remove_file(pair)?;
    fs::remove_file(config)?;
    Ok(())
}

#[test]
fn test_cli_rejects_out_of_vocab() -> Result<(), Box<dyn std::error::Error>> {
    let dir = get_test_dir();
    let graph = dir.join("bad_graph.json");
    let config = dir.join("bad_config.json");
    fs::write(&graph, r#"{"node_types": [0, 99], "edges": [[0, 1]]}"#)?;
    fs::write(&config, SMALL_CONFIG)?;

    let mut cmd = Command::cargo_bin("graphsim")?;
    cmd.arg("embed").arg(&graph).arg("--config").arg(&config);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid graph"));

    fs::remove_file(graph)?;
    fs::remove_file(config)?;
    Ok(())
}

#[test]
fn test_cli_missing_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("graphsim")?;
    cmd.arg("stats").arg("target/tmp/tests/does_not_exist.json");
    cmd.assert().failure();
    Ok(())
}

fn embed_output(graph: &Path, config: &Path, weights: &Path) -> Vec<f32> {
    let output = Command::cargo_bin("graphsim")
        .unwrap()
        .arg("embed")
        .arg(graph)
        .arg("--config")
        .arg(config)
        .arg("--weights")
        .arg(weights)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&output).unwrap()
}

#[test]
fn test_cli_embed_with_weights() -> Result<(), Box<dyn std::error::Error>> {
    let dir = get_test_dir();
    let graph = dir.join("weights_graph.json");
    let config = dir.join("weights_config.json");
    let weights = dir.join("weights_model.safetensors");
    fs::write(&graph, GRAPH)?;
    fs::write(&config, SMALL_CONFIG)?;

    let device = Device::Cpu;
    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
    let model_config = ModelConfig::from_json_file(&config)?;
    let model = GraphSimModel::new(&model_config, vb)?;
    varmap.save(&weights)?;

    let tensors = GraphTensors::from_graph(&Graph::from_json_file(&graph)?, &device)?;
    let expected = model.encode(&tensors)?.flatten_all()?.to_vec1::<f32>()?;

    let first = embed_output(&graph, &config, &weights);
    let second = embed_output(&graph, &config, &weights);
    assert_eq!(first, second);
    assert_eq!(first.len(), expected.len());
    for (got, want) in first.iter().zip(&expected) {
        assert!((got - want).abs() < 1e-5, "{got} vs {want}");
    }

    fs::remove_file(graph)?;
    fs::remove_file(config)?;
    fs::remove_file(weights)?;
    Ok(())
}

#[test]
fn test_cli_embed_ggnn() -> Result<(), Box<dyn std::error::Error>> {
    let dir = get_test_dir();
    let graph = dir.join("ggnn_graph.json");
    let config = dir.join("ggnn_config.json");
    fs::write(&graph, GRAPH)?;
    fs::write(&config, GGNN_CONFIG)?;

    let mut cmd = Command::cargo_bin("graphsim")?;
    cmd.arg("embed").arg(&graph).arg("--config").arg(&config);
    let output = cmd.assert().success().get_output().stdout.clone();

    let embedding: Vec<f32> = serde_json::from_slice(&output)?;
    assert_eq!(embedding.len(), 8);
    assert!(embedding.iter().all(|v| v.is_finite()));

    fs::remove_file(graph)?;
    fs::remove_file(config)?;
    Ok(())
}

#[test]
fn test_cli_compare_prints_embeddings() -> Result<(), Box<dyn std::error::Error>> {
    let dir = get_test_dir();
    let pair = dir.join("embeddings_pair.json");
    let config = dir.join("embeddings_config.json");
    fs::write(
        &pair,
        format!(r#"{{"left": {GRAPH}, "right": {{"node_types": [1, 2], "edges": [[0, 1]]}}}}"#),
    )?;
    fs::write(&config, GGNN_CONFIG)?;

    let mut cmd = Command::cargo_bin("graphsim")?;
    cmd.arg("compare")
        .arg(&pair)
        .arg("-c")
        .arg(&config)
        .arg("--embeddings");
    let output = cmd.assert().success().get_output().stdout.clone();
    let stdout = String::from_utf8(output)?;

    assert!(stdout.contains("Similarity: "));
    for prefix in ["Left:  ", "Right: "] {
        let line = stdout
            .lines()
            .find_map(|l| l.strip_prefix(prefix))
            .unwrap_or_else(|| panic!("missing {prefix:?} line in {stdout}"));
        let row: Vec<f32> = serde_json::from_str(line)?;
        assert_eq!(row.len(), 8);
    }

    fs::remove_file(pair)?;
    fs::remove_file(config)?;
    Ok(())
}

#[test]
fn test_cli_compare_rejects_invalid_pair() -> Result<(), Box<dyn std::error::Error>> {
    let dir = get_test_dir();
    let pair = dir.join("invalid_pair.json");
    let config = dir.join("invalid_pair_config.json");
    fs::write(
        &pair,
        format!(r#"{{"left": {GRAPH}, "right": {{"node_types": [1, 2], "edges": [[0, 7]]}}}}"#),
    )?;
    fs::write(&config, SMALL_CONFIG)?;

    let mut cmd = Command::cargo_bin("graphsim")?;
    cmd.arg("compare").arg(&pair).arg("-c").arg(&config);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid pair"))
        .stderr(predicate::str::contains("references a node outside 0..2"));

    fs::remove_file(pair)?;
    fs::remove_file(config)?;
    Ok(())
}
