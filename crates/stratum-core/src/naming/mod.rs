//! Human-readable community names.

pub mod embedding;
pub mod tokens;
pub mod vectors;

use log::warn;

use crate::config::AnalysisConfig;
use crate::graph::node_id::NodeId;

pub use embedding::EmbeddingNamer;
pub use vectors::{EmbeddingError, WordVectors};

/// Name given when nothing better can be derived.
pub const FALLBACK_NAME: &str = "Miscellaneous";

/// Derives a short display name for a community from its members.
pub trait DisplayNamer {
    fn name(&self, members: &[NodeId]) -> String;
}

/// Load the embedding namer configured by `vectors_path`.
///
/// Returns `None` when no vectors are configured or they fail to load; the
/// caller then falls back to raw community ids.
pub fn load_namer(config: &AnalysisConfig) -> Option<Box<dyn DisplayNamer>> {
    let path = config.vectors_path.as_ref()?;
    match EmbeddingNamer::from_file(path) {
        Ok(namer) => Some(Box::new(namer)),
        Err(e) => {
            warn!("community naming disabled, could not load {path}: {e}");
            None
        }
    }
}
