//! Table-of-contents upload plus its display page.

use tracing::{error, info};

use crate::contract::{ApiCall, WikiTransport};
use crate::error::PublishError;
use crate::model::Toc;
use crate::pages::toc_page_body;
use crate::publish::{PageReport, PublishOptions};
use crate::session::WikiSession;

pub const UPLOAD_TOC_ACTION: &str = "torquedataconnectuploadtoc";

impl<T: WikiTransport> WikiSession<T> {
    /// Uploads one TOC and makes sure a page named after it exists.
    ///
    /// The data upload fails fast. The page follows `options.page_errors` and
    /// is skipped entirely in data-only mode. An existing page is never
    /// rewritten unless `options.force_overwrite` is set.
    pub async fn publish_toc(
        &self,
        toc: &Toc,
        options: &PublishOptions,
        pages: &mut PageReport,
    ) -> Result<(), PublishError> {
        let json = serde_json::to_string(&toc.grouped_data)?;
        info!(toc = %toc.name, raw = toc.raw, "[PUBLISH][TOC] Uploading TOC");

        // raw_toc is signalled by presence alone.
        let call = ApiCall::new(UPLOAD_TOC_ACTION)
            .param("sheet_name", self.competition_name())
            .param("toc_name", toc.name.as_str())
            .optional_param("raw_toc", toc.raw.then_some("true"))
            .file("template", toc.template.clone())
            .file("json", json.into_bytes());
        if let Err(e) = self.transport().raw_call(call).await {
            error!(toc = %toc.name, error = %e, "[PUBLISH][TOC][ERROR] TOC upload failed");
            return Err(e.into());
        }

        if options.is_data_only() {
            return Ok(());
        }

        let body = toc_page_body(self.competition_name(), &toc.name);
        self.reconcile_page(&toc.name, &body, options, pages).await
    }
}
