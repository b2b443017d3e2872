//! Community naming from W2V1 word-vector files.

mod common;

use common::*;
use std::io::Write;
use stratum_core::config::AnalysisConfig;
use stratum_core::graph::node_id::NodeId;
use stratum_core::naming::vectors::encode_w2v1;
use stratum_core::naming::{
    load_namer, DisplayNamer, EmbeddingError, EmbeddingNamer, WordVectors, FALLBACK_NAME,
};
use stratum_core::pipeline::run_pipeline;
use tempfile::NamedTempFile;

fn vectors_file() -> NamedTempFile {
    let data = encode_w2v1(
        3,
        &[
            ("invoice", vec![1.0, 0.0, 0.0]),
            ("billing", vec![0.9, 0.1, 0.0]),
            ("user", vec![0.0, 1.0, 0.0]),
            ("database", vec![0.0, 0.0, 1.0]),
        ],
    );
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&data).unwrap();
    file.flush().unwrap();
    file
}

fn config_for(file: &NamedTempFile) -> AnalysisConfig {
    AnalysisConfig {
        vectors_path: Some(file.path().to_string_lossy().to_string()),
        ..Default::default()
    }
}

fn members(ids: &[&str]) -> Vec<NodeId> {
    ids.iter().map(|id| NodeId::new(*id)).collect()
}

#[test]
fn loads_vectors_from_disk() {
    let file = vectors_file();
    let vectors = WordVectors::from_file(file.path()).unwrap();
    assert_eq!(vectors.dim(), 3);
    assert_eq!(vectors.len(), 4);
    assert_eq!(vectors.get("user"), Some(&[0.0f32, 1.0, 0.0][..]));
}

#[test]
fn shared_token_names_the_community() {
    let file = vectors_file();
    let namer = load_namer(&config_for(&file)).expect("namer should load");
    let name = namer.name(&members(&[
        "Acme\\One\\Invoice",
        "Acme\\Two\\Invoice",
        "Acme\\Three\\Invoice",
        "Acme\\Four\\Invoice",
    ]));
    assert_eq!(name, "Invoice");
}

#[test]
fn unknown_words_fall_back_to_the_namespace() {
    let namer = EmbeddingNamer::from_file(vectors_file().path()).unwrap();
    let name = namer.name(&members(&[
        "Acme\\Reports\\Zq",
        "Acme\\Reports\\Xv",
        "Acme\\Reports\\Wk",
        "Acme\\Reports\\Pj",
    ]));
    assert_eq!(name, "Reports");
    assert_eq!(namer.name(&[]), FALLBACK_NAME);
}

#[test]
fn missing_file_disables_naming() {
    let config = AnalysisConfig {
        vectors_path: Some("/nonexistent/stratum/vectors.bin".to_string()),
        ..Default::default()
    };
    assert!(load_namer(&config).is_none());
    assert!(load_namer(&AnalysisConfig::default()).is_none());
}

#[test]
fn bad_magic_is_reported() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"NOPE\x01\x00\x00\x00\x00\x00\x00\x00").unwrap();
    file.flush().unwrap();
    assert!(matches!(
        WordVectors::from_file(file.path()),
        Err(EmbeddingError::BadMagic)
    ));
    assert!(load_namer(&config_for(&file)).is_none());
}

#[test]
fn pipeline_names_every_community() {
    let file = vectors_file();
    let input = load_input("layered_app.json");
    let result = run_pipeline(&config_for(&file), &input, None);
    let community = result.community.expect("communities detected");
    assert_eq!(
        community.display_names.keys().collect::<Vec<_>>(),
        community.communities.keys().collect::<Vec<_>>()
    );
    assert!(community.display_names.values().all(|n| !n.is_empty()));
}
