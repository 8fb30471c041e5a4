//! Error types for the publish protocol.

use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by a [`crate::contract::WikiTransport`] implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request never produced a usable HTTP response.
    #[error("network error: {0}")]
    Network(String),

    /// The wiki answered with an API-level error object.
    #[error("api error {code}: {info}")]
    Api { code: String, info: String },

    /// The response body could not be interpreted.
    #[error("decode error: {0}")]
    Decode(String),
}

/// A single display page could not be fetched or saved.
#[derive(Debug, Error)]
#[error("page {title:?} failed to save: {source}")]
pub struct PagePublishError {
    pub title: String,
    #[source]
    pub source: TransportError,
}

/// All errors that can abort a publish run.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Login was rejected or could not be attempted.
    #[error("authentication error: {0}")]
    Auth(String),

    /// The wiki URL does not have the `scheme://host` shape.
    #[error("invalid wiki url: {0}")]
    InvalidUrl(String),

    /// A record has no title; the title adder step was not run.
    #[error("record {key:?} has no {column:?} cell; the title adder step must run before pages are created")]
    Precondition { key: String, column: String },

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error(transparent)]
    PagePublish(#[from] PagePublishError),

    /// An attachment file could not be read from disk.
    #[error("could not read attachment at {path}: {source}")]
    AttachmentRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience constructor for [`PublishError::AttachmentRead`].
pub(crate) fn attachment_err(path: impl Into<PathBuf>, source: std::io::Error) -> PublishError {
    PublishError::AttachmentRead {
        path: path.into(),
        source,
    }
}
