//! Display pages: one stub per record and per TOC, created only when absent.
//!
//! A stub is two lines: an HTML comment telling editors the page is managed
//! by the pipeline, then a `#tdcrender` directive pointing the wiki's
//! templating engine at the uploaded data.

use tracing::{error, info, warn};

use crate::contract::WikiTransport;
use crate::error::{PagePublishError, PublishError, TransportError};
use crate::model::Competition;
use crate::publish::{ErrorPolicy, PageReport, PublishOptions};
use crate::session::WikiSession;

pub const GENERATED_PAGE_WARNING: &str = "<!-- This page is generated by the Torque ETL pipeline and rendered from the template in the Torque configuration (TorqueConfig:MainConfig); the '#tdcrender' line below is correct. Do not edit this page: edits are not stored in the Torque database and will be lost the next time the pipeline runs.-->";

/// Extension of the rendered data files referenced by stubs.
pub const RENDER_EXTENSION: &str = "mwiki";

fn stub_body(target: &str) -> String {
    format!("{GENERATED_PAGE_WARNING}\n{{{{ #tdcrender:{target}.{RENDER_EXTENSION} }}}}")
}

pub fn record_page_body(namespace: &str, key: &str) -> String {
    stub_body(&format!("{namespace}/id/{key}"))
}

pub fn toc_page_body(namespace: &str, toc_name: &str) -> String {
    stub_body(&format!("{namespace}/toc/{toc_name}"))
}

/// What [`WikiSession::create_page`] did with one title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    Created,
    Overwritten,
    AlreadyExists,
    /// Empty title; nothing was fetched.
    Skipped,
}

impl<T: WikiTransport> WikiSession<T> {
    /// Writes `body` to `title` only if the page is missing, or always when
    /// `force_overwrite` is set. An empty title is a no-op.
    pub async fn create_page(
        &self,
        title: &str,
        body: &str,
        force_overwrite: bool,
    ) -> Result<PageOutcome, PagePublishError> {
        if title.is_empty() {
            return Ok(PageOutcome::Skipped);
        }

        let wrap = |source: TransportError| PagePublishError {
            title: title.to_string(),
            source,
        };

        let page = self.transport().fetch_page(title).await.map_err(wrap)?;
        if page.exists && !force_overwrite {
            return Ok(PageOutcome::AlreadyExists);
        }

        self.transport().save_page(title, body).await.map_err(wrap)?;
        Ok(if page.exists {
            PageOutcome::Overwritten
        } else {
            PageOutcome::Created
        })
    }

    /// Runs [`Self::create_page`] and files the result in `report`, applying
    /// `options.page_errors` to failures.
    pub(crate) async fn reconcile_page(
        &self,
        title: &str,
        body: &str,
        options: &PublishOptions,
        report: &mut PageReport,
    ) -> Result<(), PublishError> {
        match self.create_page(title, body, options.force_overwrite).await {
            Ok(PageOutcome::Created) | Ok(PageOutcome::Overwritten) => {
                info!(title, "[PUBLISH][PAGE] Saved page");
                report.created.push(title.to_string());
            }
            Ok(PageOutcome::AlreadyExists) => {
                report.existing.push(title.to_string());
            }
            Ok(PageOutcome::Skipped) => {}
            Err(e) => match options.page_errors {
                ErrorPolicy::FailFast => {
                    error!(title, error = %e.source, "[PUBLISH][PAGE][ERROR] Page failed to save");
                    return Err(e.into());
                }
                ErrorPolicy::Continue => {
                    warn!(title, error = %e.source, "[PUBLISH][PAGE] Page failed to save, continuing");
                    report.failures.push(e);
                }
            },
        }
        Ok(())
    }

    /// Ensures a stub page exists for every record, in record order.
    ///
    /// Every record must carry a title before anything is sent: a missing
    /// title aborts with [`PublishError::Precondition`] and no page call is
    /// made.
    pub async fn create_pages(
        &self,
        competition: &Competition,
        options: &PublishOptions,
    ) -> Result<PageReport, PublishError> {
        let mut titled = Vec::new();
        for record in competition.ordered_records() {
            match competition.title_of(record) {
                Some(title) => titled.push((title, record.key())),
                None => {
                    error!(
                        key = record.key(),
                        column = competition.title_column_name(),
                        "[PUBLISH][PAGE][ERROR] Record has no page title"
                    );
                    return Err(PublishError::Precondition {
                        key: record.key().to_string(),
                        column: competition.title_column_name().to_string(),
                    });
                }
            }
        }

        info!(pages = titled.len(), "[PUBLISH][PAGE] Reconciling record pages");
        let mut report = PageReport::default();
        for (title, key) in titled {
            let body = record_page_body(self.competition_name(), key);
            self.reconcile_page(title, &body, options, &mut report).await?;
        }
        Ok(report)
    }
}
