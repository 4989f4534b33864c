//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Query a CONTENTdm server and download its assets.
///
/// Server settings come from --host/--port/--tls, falling back to
/// `$XDG_CONFIG_HOME/contentdm/config.toml`.
#[derive(Parser, Debug)]
#[command(name = "contentdm")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Server hostname
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Server port (defaults to 443 with --tls, 80 otherwise)
    #[arg(long, global = true, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Use HTTPS
    #[arg(long, global = true)]
    pub tls: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List collections as JSON
    Collections {
        /// Only published collections
        #[arg(long, conflicts_with = "unpublished")]
        published: bool,

        /// Only unpublished collections
        #[arg(long)]
        unpublished: bool,
    },

    /// Show the metadata fields of a collection
    Fields {
        /// Collection alias, with or without the leading '/'
        alias: String,
    },

    /// Show the structure of a compound object
    Compound { alias: String, pointer: String },

    /// Show the metadata of an item
    Item { alias: String, pointer: String },

    /// Download the file behind an item
    Download {
        alias: String,
        pointer: String,
        /// Name to save the file under
        filename: String,

        /// Directory to save into (default: config `output_dir`, else ".")
        #[arg(short = 'o', long)]
        output_dir: Option<PathBuf>,
    },

    /// Print the effective configuration
    Config,
}
