use thiserror::Error;

use crate::services::segmenter::SegmentError;

/// Per-request failures. The `Display` text is the wire `error` string.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("invalid json: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },
    #[error("request line exceeds {max_line_bytes} bytes")]
    LineTooLong { max_line_bytes: usize },
    #[error("request line is not valid UTF-8")]
    InvalidEncoding,
    #[error("request must be a JSON object")]
    NotAnObject,
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("field `data` must be an object")]
    InvalidData,
    #[error("invalid data for {method}: {source}")]
    InvalidParams {
        method: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown method: {0}")]
    UnknownMethod(String),
    #[error(transparent)]
    Segment(#[from] SegmentError),
}
