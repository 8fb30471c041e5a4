//! Logged-in session against one wiki, scoped to one competition namespace.

use tracing::info;

use crate::contract::WikiTransport;

/// Holds the transport and the namespace every upload is filed under.
///
/// A session is built once per run and never mutated; how much gets published
/// is decided per call through [`crate::PublishOptions`].
pub struct WikiSession<T> {
    transport: T,
    competition_name: String,
}

impl<T: WikiTransport> WikiSession<T> {
    /// Wraps an already-authenticated transport.
    pub fn new(transport: T, competition_name: impl Into<String>) -> Self {
        let competition_name = competition_name.into();
        info!(competition = %competition_name, "[SESSION] Wiki session ready");
        Self {
            transport,
            competition_name,
        }
    }

    pub fn competition_name(&self) -> &str {
        &self.competition_name
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }
}
