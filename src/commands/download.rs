//! Download command handler.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use contentdm_core::{AssetReference, ContentDm};
use indicatif::{ProgressBar, ProgressStyle};

pub async fn run_download_command(
    client: &ContentDm,
    asset: &AssetReference,
    output_dir: &Path,
    quiet: bool,
) -> Result<()> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("Failed to create output directory '{}'", output_dir.display()))?;

    let spinner = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Downloading {}", asset.filename));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = client.download(asset, output_dir).await;
    spinner.finish_and_clear();

    let path = result.with_context(|| {
        format!(
            "Failed to download {}/{} as '{}'",
            asset.alias, asset.pointer, asset.filename
        )
    })?;
    println!("{}", path.display());
    Ok(())
}
