use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("malformed TLE (line {line}): {message}")]
    MalformedTle { line: usize, message: String },
    #[error("propagation failed at {time}: {message}")]
    Propagation {
        time: DateTime<Utc>,
        message: String,
    },
    #[error("scan aborted at sample {index}: {source}")]
    ScanAborted {
        index: usize,
        source: Box<PredictError>,
    },
    #[error("invalid search parameters: {0}")]
    InvalidParameters(String),
}

impl PredictError {
    pub(crate) fn malformed(line: usize, message: impl Into<String>) -> Self {
        PredictError::MalformedTle {
            line,
            message: message.into(),
        }
    }
}
