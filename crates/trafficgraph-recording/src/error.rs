use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordingError {
    #[error("failed to read recording {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed recording: {0}")]
    Json(#[from] serde_json::Error),

    #[error("recording needs at least two timestamps to recover its sampling rate, found {0}")]
    TooFewTimestamps(usize),

    #[error("timestamps must be strictly increasing (index {index})")]
    NonIncreasingTimestamps { index: usize },

    #[error("recording defines no snippet boundaries")]
    NoSnippetBoundaries,

    #[error("snippet {id} spans frames {start}..={end} outside the recording's {frames} frames")]
    SnippetOutOfRange {
        id: u32,
        start: u32,
        end: u32,
        frames: usize,
    },
}
