/// `load_config` module: loads the static YAML publish config into typed structs.
///
/// The file holds no secrets; wiki credentials are read from the environment
/// by [`crate::mediawiki::Credentials::from_env`].
///
/// # Errors
/// All errors use `anyhow::Error` and are surfaced at the CLI boundary. Read
/// failures mention "read", parse failures mention "parse".
use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use torque_sync_core::model::DEFAULT_TITLE_COLUMN;
use torque_sync_core::{ErrorPolicy, PublishMode, PublishOptions};
use tracing::{error, info};

#[derive(Debug, Deserialize)]
pub struct CliConfig {
    pub wiki: WikiSection,
    pub dataset: DatasetSection,
    #[serde(default)]
    pub publish: PublishSection,
}

#[derive(Debug, Deserialize)]
pub struct WikiSection {
    /// `scheme://host` of the wiki.
    pub url: String,
    /// Namespace every upload is filed under.
    pub competition: String,
}

#[derive(Debug, Deserialize)]
pub struct DatasetSection {
    pub csv: PathBuf,
    pub key_column: String,
    #[serde(default = "default_title_column")]
    pub title_column: String,
    #[serde(default)]
    pub tocs: Vec<TocSection>,
    #[serde(default)]
    pub attachments: Vec<AttachmentSection>,
}

fn default_title_column() -> String {
    DEFAULT_TITLE_COLUMN.to_string()
}

#[derive(Debug, Deserialize)]
pub struct TocSection {
    pub name: String,
    pub template: PathBuf,
    /// JSON file holding the grouped data.
    pub data: PathBuf,
    #[serde(default)]
    pub raw: bool,
}

#[derive(Debug, Deserialize)]
pub struct AttachmentSection {
    pub key: String,
    pub column: String,
    pub file: String,
    pub path: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
pub struct PublishSection {
    #[serde(default)]
    pub data_only: bool,
    #[serde(default)]
    pub force_overwrite: bool,
    /// Keep uploading the remaining attachments after one fails.
    #[serde(default)]
    pub continue_on_attachment_error: bool,
    /// Stop at the first record or TOC page that fails to save.
    #[serde(default)]
    pub fail_fast_on_page_error: bool,
}

impl PublishSection {
    pub fn options(&self) -> PublishOptions {
        PublishOptions {
            mode: if self.data_only {
                PublishMode::DataOnly
            } else {
                PublishMode::Full
            },
            force_overwrite: self.force_overwrite,
            page_errors: if self.fail_fast_on_page_error {
                ErrorPolicy::FailFast
            } else {
                ErrorPolicy::Continue
            },
            attachment_errors: if self.continue_on_attachment_error {
                ErrorPolicy::Continue
            } else {
                ErrorPolicy::FailFast
            },
        }
    }
}

/// Loads a static YAML config file (no secrets).
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let config: CliConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    info!(
        wiki = %config.wiki.url,
        competition = %config.wiki.competition,
        tocs = config.dataset.tocs.len(),
        attachments = config.dataset.attachments.len(),
        data_only = config.publish.data_only,
        "Config loaded"
    );
    Ok(config)
}
