//! High-level pipeline: sheet → TOCs → pages → attachments → audit.
//!
//! [`publish`] runs one full publish of a competition against a
//! [`WikiSession`] and returns a [`PublishReport`] describing what was sent,
//! what was left alone and what failed.
//!
//! # Ordering
//! Every step is awaited before the next one starts:
//!   - TOC uploads and display pages only after the sheet upload returns
//!   - record pages only after every TOC upload returned
//!   - the audit only after all publishing (attachments included) is done
//!
//! # Error Handling
//! Bulk uploads (sheet, TOC data, attachments by default) fail fast and abort
//! the run. Display pages are best-effort by default: each failure is logged
//! with its title and collected in the report. Both behaviours are chosen per
//! operation through [`ErrorPolicy`].

use tracing::{error, info};

use crate::contract::WikiTransport;
use crate::error::{PagePublishError, PublishError};
use crate::model::{Attachment, Competition};
use crate::session::WikiSession;

/// What a publish run is allowed to touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PublishMode {
    /// Sheet and TOC data, TOC and record pages, attachments.
    #[default]
    Full,
    /// Sheet and TOC data only: no page is created and no attachment is sent.
    DataOnly,
}

/// How a batch reacts when one of its items fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Return the first error and skip the remaining items.
    FailFast,
    /// Log the error, record it in the report and carry on.
    Continue,
}

/// Per-run configuration handed to every publish call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishOptions {
    pub mode: PublishMode,
    /// Rewrite display pages that already exist.
    pub force_overwrite: bool,
    pub page_errors: ErrorPolicy,
    pub attachment_errors: ErrorPolicy,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            mode: PublishMode::Full,
            force_overwrite: false,
            page_errors: ErrorPolicy::Continue,
            attachment_errors: ErrorPolicy::FailFast,
        }
    }
}

impl PublishOptions {
    pub fn data_only() -> Self {
        Self {
            mode: PublishMode::DataOnly,
            ..Self::default()
        }
    }

    pub fn is_data_only(&self) -> bool {
        self.mode == PublishMode::DataOnly
    }
}

/// Display pages touched during a run.
#[derive(Debug, Default)]
pub struct PageReport {
    pub created: Vec<String>,
    /// Pages left untouched because they already existed.
    pub existing: Vec<String>,
    pub failures: Vec<PagePublishError>,
}

/// Everything a publish run did, for operators and tests.
#[derive(Debug, Default)]
pub struct PublishReport {
    pub sheet_uploaded: bool,
    pub tocs_uploaded: Vec<String>,
    pub pages: PageReport,
    pub attachments_uploaded: Vec<String>,
    pub attachment_failures: Vec<PublishError>,
    /// Remote pages not accounted for by the competition.
    pub suspicious_pages: Vec<String>,
}

/// Entrypoint: publish `competition` and its `attachments`, then audit.
pub async fn publish<T>(
    session: &WikiSession<T>,
    competition: &Competition,
    attachments: &[Attachment],
    options: &PublishOptions,
) -> Result<PublishReport, PublishError>
where
    T: WikiTransport,
{
    info!(
        competition = session.competition_name(),
        mode = ?options.mode,
        "[PUBLISH] Starting publish run"
    );

    let mut report = match session.publish_sheet(competition, options).await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "[PUBLISH][ERROR] Sheet publish failed");
            return Err(e);
        }
    };

    let uploads = match session.publish_attachments(attachments, options).await {
        Ok(uploads) => uploads,
        Err(e) => {
            error!(error = %e, "[PUBLISH][ERROR] Attachment publish failed");
            return Err(e);
        }
    };
    report.attachments_uploaded = uploads.uploaded;
    report.attachment_failures = uploads.failures;

    report.suspicious_pages = session.audit(competition).await?;

    info!(
        tocs = report.tocs_uploaded.len(),
        pages_created = report.pages.created.len(),
        page_failures = report.pages.failures.len(),
        attachments = report.attachments_uploaded.len(),
        suspicious = report.suspicious_pages.len(),
        "[PUBLISH] Publish run complete"
    );
    Ok(report)
}
