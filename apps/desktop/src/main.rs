mod terminal;

use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::load_settings_from, load_settings, AlwaysConfirm, CommitteeStore, ConfirmationPrompt,
    ControllerDependencies, ControllerSettings, FilePreferenceStore, HttpCommitteeStore,
    LocalCommitteeStore, SyncController, SyncError,
};
use shared::domain::{DatasetCategory, Filter, LanguageCode};
use terminal::{print_committees, StdinConfirm, TerminalRenderer};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "desktop", about = "WPSG committee tracker")]
struct Cli {
    /// Settings file; defaults to ./committee_tracker.toml.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    bridge_url: Option<String>,
    /// Use the in-process store instead of the HTTP bridge.
    #[arg(long)]
    local: bool,
    #[arg(long, value_parser = parse_filter)]
    filter: Option<Filter>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    List,
    /// Adds a committee, optionally renaming it right away.
    Add {
        name: Option<String>,
    },
    Edit {
        index: usize,
        name: String,
    },
    Remove {
        index: usize,
        #[arg(long)]
        yes: bool,
    },
    Scan,
    Language {
        code: String,
    },
    Status,
    Ping,
    Dataset {
        #[arg(value_parser = parse_dataset)]
        kind: DatasetCategory,
    },
}

fn parse_filter(raw: &str) -> Result<Filter, String> {
    Filter::parse(raw).ok_or_else(|| format!("unknown filter '{raw}', expected CEN or ISO"))
}

fn parse_dataset(raw: &str) -> Result<DatasetCategory, String> {
    DatasetCategory::parse(raw).ok_or_else(|| {
        format!(
            "unknown dataset '{raw}', expected under_development, recently_published, iso_deleted or need_more"
        )
    })
}

fn build_controller<S>(
    store: Arc<S>,
    preferences_path: &str,
    confirmation: Arc<dyn ConfirmationPrompt>,
    settings: ControllerSettings,
) -> Arc<SyncController>
where
    S: CommitteeStore + 'static,
{
    let deps = ControllerDependencies::new(
        store,
        Arc::new(TerminalRenderer),
        Arc::new(FilePreferenceStore::new(preferences_path)),
        confirmation,
    );
    SyncController::new_with_dependencies(deps, settings)
}

/// Skips are silent no-ops; everything else fails the command.
fn finish<T>(result: Result<T, SyncError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if !err.is_user_visible() => {
            tracing::info!(reason = %err, "nothing to do");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = match &cli.config {
        Some(path) => load_settings_from(path, |key| std::env::var(key).ok()),
        None => load_settings(),
    };
    if let Some(bridge_url) = &cli.bridge_url {
        settings.bridge_url = bridge_url.clone();
    }
    let controller_settings = ControllerSettings::from_client_settings(&settings)?;

    let confirmation: Arc<dyn ConfirmationPrompt> = match &cli.command {
        Command::Remove { yes: true, .. } => Arc::new(AlwaysConfirm),
        _ => Arc::new(StdinConfirm),
    };
    let controller = if cli.local {
        build_controller(
            Arc::new(LocalCommitteeStore::new()),
            &settings.preferences_path,
            confirmation,
            controller_settings,
        )
    } else {
        build_controller(
            Arc::new(HttpCommitteeStore::from_settings(&settings)?),
            &settings.preferences_path,
            confirmation,
            controller_settings,
        )
    };

    let report = controller.initialize(None).await?;
    if !report.committees_loaded {
        return Err(anyhow!("could not load committees from {}", settings.bridge_url));
    }
    if let Some(filter) = cli.filter {
        finish(controller.switch_filter(filter).await)?;
    }

    match cli.command {
        Command::List => print_committees(&controller.view().await),
        Command::Add { name } => {
            let added = finish(controller.add_committee().await)?.flatten();
            if let (Some(id), Some(name)) = (added, name) {
                finish(controller.edit_committee(id, &name).await)?;
            }
            print_committees(&controller.view().await);
        }
        Command::Edit { index, name } => {
            finish(controller.edit_committee_at(index, &name).await)?;
            print_committees(&controller.view().await);
        }
        Command::Remove { index, .. } => {
            finish(controller.delete_committee_at(index).await)?;
            print_committees(&controller.view().await);
        }
        Command::Scan => {
            if let Some(report) = finish(controller.perform_scan().await)? {
                if let Some(changes) = report.changes_found {
                    println!("changes found: {changes}");
                }
                if let Some(last_update) = report.last_update {
                    println!("last update: {last_update}");
                }
            }
        }
        Command::Language { code } => {
            finish(controller.switch_language(LanguageCode::new(&code)).await)?;
            let labels = controller.labels().await;
            println!("{} ({})", labels.page_title, labels.language);
        }
        Command::Status => {
            let status = controller.status().await?;
            println!("last update: {}", status.last_update);
            println!("language: {}", status.language);
            if let Some(interval) = status.scan_interval {
                println!("scan interval: {interval} days");
            }
            if let Some(version) = status.version {
                println!("version: {version}");
            }
            if let Some(total) = status.total_committees {
                println!("committees: {total}");
            }
        }
        Command::Ping => {
            let report = controller.test_connection().await?;
            println!("{}", report.message);
        }
        Command::Dataset { kind } => {
            controller.open_dataset(kind).await;
        }
    }

    Ok(())
}
