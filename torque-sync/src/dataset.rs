//! Builds the competition and its attachments from the files named in the
//! config's `dataset` section.

use std::fs::{self, File};
use std::path::Path;

use anyhow::{Context, Result};
use torque_sync_core::model::{Attachment, Competition, Toc};
use tracing::info;

use crate::load_config::{DatasetSection, TocSection};

/// Relative paths in the config resolve against `base_dir`.
pub fn load_competition(
    section: &DatasetSection,
    base_dir: &Path,
) -> Result<(Competition, Vec<Attachment>)> {
    let csv_path = base_dir.join(&section.csv);
    let file = File::open(&csv_path)
        .with_context(|| format!("Failed to read sheet {}", csv_path.display()))?;
    let competition =
        Competition::from_csv_reader(file, &section.key_column, &section.title_column)
            .with_context(|| format!("Failed to parse sheet {}", csv_path.display()))?;

    let tocs = section
        .tocs
        .iter()
        .map(|toc| load_toc(toc, base_dir))
        .collect::<Result<Vec<_>>>()?;

    let attachments: Vec<Attachment> = section
        .attachments
        .iter()
        .map(|a| Attachment {
            key: a.key.clone(),
            column_name: a.column.clone(),
            file: a.file.clone(),
            path: base_dir.join(&a.path),
        })
        .collect();

    info!(
        tocs = tocs.len(),
        attachments = attachments.len(),
        "Loaded competition dataset"
    );
    Ok((competition.with_tocs(tocs), attachments))
}

fn load_toc(section: &TocSection, base_dir: &Path) -> Result<Toc> {
    let template_path = base_dir.join(&section.template);
    let template = fs::read(&template_path)
        .with_context(|| format!("Failed to read TOC template {}", template_path.display()))?;
    let data_path = base_dir.join(&section.data);
    let data = fs::read_to_string(&data_path)
        .with_context(|| format!("Failed to read TOC data {}", data_path.display()))?;
    let grouped_data = serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse TOC data {}", data_path.display()))?;
    Ok(Toc {
        name: section.name.clone(),
        template,
        grouped_data,
        raw: section.raw,
    })
}
