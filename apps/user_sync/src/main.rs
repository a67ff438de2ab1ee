use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::SyncOrchestrator;
use shared::domain::{UserField, UserId};
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::{load_settings, DEFAULT_CONFIG_PATH};

#[derive(Parser, Debug)]
#[command(about = "Keep a local user list in sync with its CRUD endpoint")]
struct Cli {
    /// Settings file; missing files are ignored.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[arg(long)]
    primary_url: Option<String>,
    #[arg(long)]
    read_only_url: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show both collections (default).
    List,
    /// Create a user from the given fields.
    Add(Fields),
    /// Update the user with `id`; omitted fields keep their current value.
    Edit {
        id: String,
        #[command(flatten)]
        fields: Fields,
    },
    /// Delete the user with `id`.
    Delete { id: String },
}

#[derive(Args, Debug)]
struct Fields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    website: Option<String>,
}

impl Fields {
    fn into_updates(self) -> Vec<(UserField, String)> {
        [
            (UserField::Name, self.name),
            (UserField::Email, self.email),
            (UserField::Phone, self.phone),
            (UserField::Website, self.website),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|value| (field, value)))
        .collect()
    }
}

/// Runs one subcommand against loaded collections. Changes are only sent
/// once both loads succeeded; otherwise the load error is left to be rendered.
async fn run_command(sync: &SyncOrchestrator, command: Command) -> Result<()> {
    let snapshot = sync.snapshot().await;
    if let Some(err) = &snapshot.current_error {
        if !matches!(command, Command::List) {
            warn!(error = %err, "initial load failed; no changes sent");
        }
        return Ok(());
    }

    // Mutation failures land in the snapshot and are rendered by the caller.
    match command {
        Command::List => {}
        Command::Add(fields) => {
            sync.start_create().await;
            for (field, value) in fields.into_updates() {
                sync.update_field(field, value).await;
            }
            let _ = sync.submit().await;
        }
        Command::Edit { id, fields } => {
            let id: UserId = id.parse().context("invalid user id")?;
            let Some(record) = snapshot.find_primary(&id) else {
                bail!("no local user with id {id}");
            };
            sync.start_edit(record).await;
            for (field, value) in fields.into_updates() {
                sync.update_field(field, value).await;
            }
            let _ = sync.submit().await;
        }
        Command::Delete { id } => {
            let id: UserId = id.parse().context("invalid user id")?;
            let _ = sync.delete_record(&id).await;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(&cli.config);
    if let Some(url) = cli.primary_url {
        settings.primary_url = url;
    }
    if let Some(url) = cli.read_only_url {
        settings.read_only_url = url;
    }

    let sync = SyncOrchestrator::from_urls(&settings.primary_url, &settings.read_only_url)
        .context("invalid resource configuration")?;
    sync.initialize().await;
    run_command(&sync, cli.command.unwrap_or(Command::List)).await?;

    let snapshot = sync.snapshot().await;
    print!("{}", render::render(&snapshot));
    if let Some(err) = snapshot.current_error {
        bail!(err);
    }
    Ok(())
}
