//! Post-publish sanity check.
//!
//! Lists pages that exist on the wiki but that this competition does not
//! account for. Some are legitimate hand-made pages, some are leftovers from
//! earlier buggy runs; the check cannot tell them apart, so it only reports.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::contract::WikiTransport;
use crate::error::PublishError;
use crate::model::Competition;
use crate::session::WikiSession;

impl<T: WikiTransport> WikiSession<T> {
    /// Remote page titles missing from the competition's record titles, in
    /// the wiki's listing order. Records without a title contribute nothing.
    pub async fn audit(&self, competition: &Competition) -> Result<Vec<String>, PublishError> {
        let expected: HashSet<&str> = competition
            .ordered_records()
            .filter_map(|record| competition.title_of(record))
            .collect();

        let remote = self.transport().list_all_pages().await?;
        let remote_count = remote.len();
        let suspicious: Vec<String> = remote
            .into_iter()
            .map(|page| page.title)
            .filter(|title| !expected.contains(title.as_str()))
            .collect();

        info!(
            expected = expected.len(),
            remote = remote_count,
            suspicious = suspicious.len(),
            "[AUDIT] Pages in the wiki but not added by the pipeline"
        );
        for title in &suspicious {
            warn!(title = %title, "[AUDIT] Suspicious page");
        }
        Ok(suspicious)
    }
}
