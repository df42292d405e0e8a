//! Error types for send cycles and image attachments.

use std::path::PathBuf;

/// Why a send cycle produced no usable reply.
///
/// These never leave the send coordinator: they are logged and folded into
/// the fallback assistant message.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("request to response endpoint failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("response endpoint returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("response body was not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("send cycle was cancelled")]
    Cancelled,
    #[error("send cycle task aborted: {0}")]
    Aborted(String),
}

/// Failure to pick an image from disk.
#[derive(Debug, thiserror::Error)]
pub enum AttachmentError {
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not an image file", path.display())]
    NotAnImage { path: PathBuf },
    #[error("{} has no file name", path.display())]
    NoFileName { path: PathBuf },
}
