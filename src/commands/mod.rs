//! CLI command handlers.

mod config;
mod download;
mod rpc;

pub use config::run_config_show_command;
pub use download::run_download_command;
pub use rpc::{
    run_collections_command, run_compound_command, run_fields_command, run_item_command,
};
