//! Config command handler: show effective configuration.

use std::path::Path;

use contentdm_core::ServerConfig;

use crate::app_config::LoadedConfig;

pub fn run_config_show_command(loaded: &LoadedConfig, server: &ServerConfig, output_dir: &Path) {
    let resolved_path = loaded.path.as_ref().map_or_else(
        || "<unresolved>".to_string(),
        |path| path.display().to_string(),
    );
    println!("config_path = {resolved_path}");
    println!(
        "config_file = {}",
        if loaded.loaded_from_file() {
            "loaded"
        } else {
            "not found (using defaults)"
        }
    );
    match server.descriptor() {
        Some(descriptor) => {
            println!("hostname = {}", descriptor.hostname());
            println!("port = {}", descriptor.port());
            println!("tls = {}", descriptor.use_tls());
            println!("rpc_endpoint = {}", descriptor.rpc_endpoint());
        }
        None => println!("server = not configured"),
    }
    println!("output_dir = {}", output_dir.display());
}
