//! Attachment uploads, one file at a time.

use tracing::{error, info, warn};

use crate::contract::{ApiCall, WikiTransport};
use crate::error::{attachment_err, PublishError};
use crate::model::Attachment;
use crate::publish::{ErrorPolicy, PublishOptions};
use crate::session::WikiSession;

pub const UPLOAD_ATTACHMENT_ACTION: &str = "torquedataconnectuploadattachment";

/// Result of an attachment batch.
#[derive(Debug, Default)]
pub struct AttachmentUploads {
    pub uploaded: Vec<String>,
    /// Only populated under [`ErrorPolicy::Continue`].
    pub failures: Vec<PublishError>,
}

impl<T: WikiTransport> WikiSession<T> {
    /// Reads and uploads each attachment in order. Does nothing in data-only
    /// mode.
    ///
    /// Under the default fail-fast policy the first unreadable file or failed
    /// upload aborts the remaining ones.
    pub async fn publish_attachments(
        &self,
        attachments: &[Attachment],
        options: &PublishOptions,
    ) -> Result<AttachmentUploads, PublishError> {
        let mut uploads = AttachmentUploads::default();
        if options.is_data_only() {
            info!("[PUBLISH][ATTACHMENT] Data-only mode, skipping attachments");
            return Ok(uploads);
        }

        for attachment in attachments {
            match self.publish_attachment(attachment).await {
                Ok(()) => uploads.uploaded.push(attachment.file.clone()),
                Err(e) => match options.attachment_errors {
                    ErrorPolicy::FailFast => {
                        error!(file = %attachment.file, error = %e, "[PUBLISH][ATTACHMENT][ERROR] Upload failed");
                        return Err(e);
                    }
                    ErrorPolicy::Continue => {
                        warn!(file = %attachment.file, error = %e, "[PUBLISH][ATTACHMENT] Upload failed, continuing");
                        uploads.failures.push(e);
                    }
                },
            }
        }
        Ok(uploads)
    }

    async fn publish_attachment(&self, attachment: &Attachment) -> Result<(), PublishError> {
        info!(
            file = %attachment.file,
            key = %attachment.key,
            "[PUBLISH][ATTACHMENT] Uploading attachment"
        );
        let bytes = tokio::fs::read(&attachment.path)
            .await
            .map_err(|e| attachment_err(&attachment.path, e))?;

        let call = ApiCall::new(UPLOAD_ATTACHMENT_ACTION)
            .param("sheet_name", self.competition_name())
            .param("object_id", attachment.key.as_str())
            .param("permissions_column", attachment.column_name.as_str())
            .param("attachment_name", attachment.file.as_str())
            .file("attachment", bytes);
        self.transport().raw_call(call).await?;
        Ok(())
    }
}
