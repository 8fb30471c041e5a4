//! Sheet upload: the full competition as one CSV, keyed by its key column.

use tracing::{error, info};

use crate::contract::{ApiCall, WikiTransport};
use crate::error::PublishError;
use crate::model::Competition;
use crate::publish::{PublishOptions, PublishReport};
use crate::session::WikiSession;

pub const UPLOAD_SHEET_ACTION: &str = "torquedataconnectuploadsheet";
/// Object kind every competition row is filed as on the wiki.
pub const OBJECT_NAME: &str = "proposal";

impl<T: WikiTransport> WikiSession<T> {
    /// Uploads the whole sheet, then every TOC, then (unless data-only) the
    /// record pages.
    ///
    /// The upload always carries the complete current state; the wiki merges
    /// it by key column.
    pub async fn publish_sheet(
        &self,
        competition: &Competition,
        options: &PublishOptions,
    ) -> Result<PublishReport, PublishError> {
        let csv = competition.to_csv()?;
        info!(
            competition = self.competition_name(),
            key_column = competition.key_column_name(),
            bytes = csv.len(),
            "[PUBLISH][SHEET] Uploading sheet"
        );

        let call = ApiCall::new(UPLOAD_SHEET_ACTION)
            .param("object_name", OBJECT_NAME)
            .param("sheet_name", self.competition_name())
            .param("key_column", competition.key_column_name())
            .file("data_file", csv);
        if let Err(e) = self.transport().raw_call(call).await {
            error!(error = %e, "[PUBLISH][SHEET][ERROR] Sheet upload failed");
            return Err(e.into());
        }

        let mut report = PublishReport {
            sheet_uploaded: true,
            ..Default::default()
        };

        for toc in &competition.tocs {
            self.publish_toc(toc, options, &mut report.pages).await?;
            report.tocs_uploaded.push(toc.name.clone());
        }

        if !options.is_data_only() {
            let pages = self.create_pages(competition, options).await?;
            report.pages.created.extend(pages.created);
            report.pages.existing.extend(pages.existing);
            report.pages.failures.extend(pages.failures);
        }

        Ok(report)
    }
}
