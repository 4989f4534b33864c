//! CLI entry point for the CONTENTdm client.

use anyhow::Result;
use clap::Parser;
use contentdm_core::{AssetReference, ContentDm, Visibility};
use tracing::debug;

mod app_config;
mod cli;
mod commands;

use app_config::{load_default_file_config, resolve_output_dir, resolve_server};
use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // Logs go to stderr; stdout carries command output.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let loaded_config = load_default_file_config()?;
    let file_config = loaded_config.config.as_ref();
    let server = resolve_server(&args, file_config);
    debug!(configured = server.is_configured(), "server configuration resolved");

    let client = ContentDm::new(server)?;

    match args.command {
        Command::Collections {
            published,
            unpublished,
        } => {
            let visibility = if published {
                Some(Visibility::Published)
            } else if unpublished {
                Some(Visibility::Unpublished)
            } else {
                None
            };
            commands::run_collections_command(&client, visibility).await
        }
        Command::Fields { alias } => commands::run_fields_command(&client, &alias).await,
        Command::Compound { alias, pointer } => {
            commands::run_compound_command(&client, &alias, &pointer).await
        }
        Command::Item { alias, pointer } => {
            commands::run_item_command(&client, &alias, &pointer).await
        }
        Command::Download {
            alias,
            pointer,
            filename,
            output_dir,
        } => {
            let output_dir = resolve_output_dir(output_dir, file_config);
            let asset = AssetReference::new(alias, pointer, filename);
            commands::run_download_command(&client, &asset, &output_dir, args.quiet).await
        }
        Command::Config => {
            let output_dir = resolve_output_dir(None, file_config);
            commands::run_config_show_command(&loaded_config, client.server(), &output_dir);
            Ok(())
        }
    }
}
