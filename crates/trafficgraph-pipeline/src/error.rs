use crate::entity::{EntityKey, EntityKind};
use std::path::PathBuf;
use thiserror::Error;
use trafficgraph_graph::VocabularyError;
use trafficgraph_recording::RecordingError;

/// Fatal pipeline failures.
///
/// Recoverable anomalies (collapsed trim window, missing snippet boundaries,
/// unresolvable deferred relations) are logged and never surface here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Recording(#[from] RecordingError),

    #[error(transparent)]
    Vocabulary(#[from] VocabularyError),

    #[error("no converter registered for {0:?} entities")]
    NoConverter(EntityKind),

    #[error("failed to convert {key}: {source:#}")]
    Converter {
        key: EntityKey,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    ConfigJson(#[from] serde_json::Error),
}
