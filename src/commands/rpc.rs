//! RPC command handlers: print server responses as pretty JSON.

use anyhow::{Context, Result};
use contentdm_core::{ContentDm, Visibility};
use serde::Serialize;

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to render JSON output")?;
    println!("{rendered}");
    Ok(())
}

pub async fn run_collections_command(
    client: &ContentDm,
    visibility: Option<Visibility>,
) -> Result<()> {
    let collections = client
        .list_collections(visibility)
        .await
        .context("Failed to list collections")?;
    print_json(&collections)
}

pub async fn run_fields_command(client: &ContentDm, alias: &str) -> Result<()> {
    let fields = client
        .collection_field_info(alias)
        .await
        .with_context(|| format!("Failed to fetch field info for collection '{alias}'"))?;
    print_json(&fields)
}

pub async fn run_compound_command(client: &ContentDm, alias: &str, pointer: &str) -> Result<()> {
    let info = client
        .compound_object_info(alias, pointer)
        .await
        .with_context(|| format!("Failed to fetch compound object {alias}/{pointer}"))?;
    print_json(&info)
}

pub async fn run_item_command(client: &ContentDm, alias: &str, pointer: &str) -> Result<()> {
    let info = client
        .item_info(alias, pointer)
        .await
        .with_context(|| format!("Failed to fetch item {alias}/{pointer}"))?;
    print_json(&info)
}
