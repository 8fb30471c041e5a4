///
/// This module implements the CLI for torque-sync: command parsing, the
/// async entrypoint and the operator-facing output.
///
/// All protocol logic (uploads, page reconciliation, audit) lives in
/// `torque-sync-core`; this module only wires config, credentials and the
/// HTTP transport together.
///
/// - For command-line users: run the `torque-sync` binary with `--help`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
use crate::dataset::load_competition;
use crate::load_config::{load_config, CliConfig};
use crate::mediawiki::{connect, Credentials, MediaWikiClient};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use torque_sync_core::{publish, PublishMode, PublishOptions, WikiSession};

/// CLI for torque-sync: publish a competition into a Torque wiki.
#[derive(Parser)]
#[clap(
    name = "torque-sync",
    version,
    about = "Publish competition sheets, TOCs, pages and attachments to a Torque wiki"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload the sheet, TOCs, pages and attachments, then audit the wiki
    Publish {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Upload sheet and TOC data only; no pages, no attachments
        #[clap(long)]
        data_only: bool,
    },
    /// List wiki pages the competition does not account for
    Audit {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
}

async fn open_session(config: &CliConfig) -> Result<WikiSession<MediaWikiClient>> {
    let credentials = Credentials::from_env()?;
    let session = connect(
        &credentials.username,
        &credentials.password,
        &config.wiki.competition,
        &config.wiki.url,
    )
    .await?;
    Ok(session)
}

fn config_dir(path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn print_suspicious(titles: &[String]) {
    println!("The following pages are in the wiki, but not added via the ETL pipeline");
    for title in titles {
        println!("{title}");
    }
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Publish {
            config: config_path,
            data_only,
        } => {
            let config = load_config(&config_path)?;
            let (competition, attachments) =
                load_competition(&config.dataset, &config_dir(&config_path))?;
            let mut options = config.publish.options();
            if data_only {
                options = PublishOptions {
                    mode: PublishMode::DataOnly,
                    ..options
                };
            }

            tracing::info!(command = "publish", "Starting publish");
            let session = open_session(&config).await?;
            match publish(&session, &competition, &attachments, &options).await {
                Ok(report) => {
                    for failure in &report.pages.failures {
                        println!("{} failed to save", failure.title);
                    }
                    print_suspicious(&report.suspicious_pages);
                    println!("Publish complete.\nReport:");
                    println!("{:#?}", report);
                    tracing::info!(command = "publish", "Publish complete");
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "publish", error = %e, "Publish failed");
                    Err(anyhow::Error::new(e))
                }
            }
        }
        Commands::Audit {
            config: config_path,
        } => {
            let config = load_config(&config_path)?;
            let (competition, _) = load_competition(&config.dataset, &config_dir(&config_path))?;
            let session = open_session(&config).await?;
            let suspicious = session.audit(&competition).await?;
            print_suspicious(&suspicious);
            tracing::info!(command = "audit", suspicious = suspicious.len(), "Audit complete");
            Ok(())
        }
    }
}
