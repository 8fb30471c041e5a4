#![doc = "torque-sync-core: publish and reconciliation protocol for Torque-enabled wikis."]

//! This crate holds the transport contract, the competition data model and the
//! publishers that push a competition into a wiki: the sheet upload, the
//! table-of-contents uploads, the attachment uploads, the create-if-absent
//! display pages and the post-publish audit.
//!
//! The concrete HTTP client lives in the `torque-sync` binary crate; everything
//! here talks to the remote store through [`contract::WikiTransport`] so it can
//! be driven by mocks and fakes in tests.

pub mod attachment;
pub mod audit;
pub mod contract;
pub mod error;
pub mod model;
pub mod pages;
pub mod publish;
pub mod session;
pub mod sheet;
pub mod toc;

pub use error::{PagePublishError, PublishError, TransportError};
pub use model::{Attachment, Competition, Record, Toc};
pub use publish::{publish, ErrorPolicy, PublishMode, PublishOptions, PublishReport};
pub use session::WikiSession;
