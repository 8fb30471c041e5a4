//! # contract: the boundary between the publishers and the remote wiki
//!
//! This module defines the single trait ([`WikiTransport`]) every publisher
//! talks through, plus the plain data it exchanges: [`ApiCall`] for the raw
//! upload actions and [`RemotePage`] for the pages read back.
//!
//! ## Remote-side assumptions
//! - A sheet upload replaces/merges the remote sheet by its key column; it is
//!   never appended blindly. Publishers always send the full current state.
//! - TOC and attachment uploads are keyed by (namespace, TOC name) and
//!   (namespace, record key, attachment name) respectively.
//! - `save_page` overwrites the whole page body.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`; with the `test-export-mocks`
//!   feature (on by default) dependents can use [`MockWikiTransport`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use mockall::automock;

use crate::error::TransportError;

/// One raw API request: an action, its form parameters and its file parts.
///
/// Parameters with no value are simply not inserted; the remote side reads
/// presence, not a boolean value, for flags such as `raw_toc`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiCall {
    pub action: String,
    pub params: BTreeMap<String, String>,
    pub files: BTreeMap<String, Vec<u8>>,
}

impl ApiCall {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Default::default()
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Adds `name` only when `value` is `Some`.
    pub fn optional_param(self, name: impl Into<String>, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.param(name, value),
            None => self,
        }
    }

    pub fn file(mut self, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.files.insert(name.into(), bytes);
        self
    }
}

/// A page as read back from the wiki.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePage {
    pub title: String,
    pub exists: bool,
    /// Current wikitext; empty when the page does not exist.
    pub content: String,
}

impl RemotePage {
    pub fn missing(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            exists: false,
            content: String::new(),
        }
    }

    pub fn existing(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            exists: true,
            content: content.into(),
        }
    }
}

/// Authenticated access to the remote wiki.
///
/// Implementations are expected to be logged in already; constructing one is
/// where authentication happens. Every method performs network I/O.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait WikiTransport: Send + Sync {
    /// Issue a raw API action with multipart parameters and file parts and
    /// return the decoded JSON response.
    async fn raw_call(&self, call: ApiCall) -> Result<serde_json::Value, TransportError>;

    /// Fetch a page by title, reporting whether it exists.
    async fn fetch_page(&self, title: &str) -> Result<RemotePage, TransportError>;

    /// Replace the body of the page at `title`, creating it if needed.
    async fn save_page(&self, title: &str, body: &str) -> Result<(), TransportError>;

    /// Every page currently stored on the wiki, in the wiki's listing order.
    async fn list_all_pages(&self) -> Result<Vec<RemotePage>, TransportError>;
}
