//! Asset downloads with atomic publication.
//!
//! A download streams into `{filename}.part` and is renamed to `{filename}`
//! only after the whole body has been written and synced, so a file under the
//! final name is always complete. An existing final file short-circuits the
//! download entirely. Interrupted transfers leave their `.part` file behind;
//! nothing here cleans those up.
//!
//! Downloads of the same destination are serialized through the client's
//! in-flight registry: a later caller waits for the earlier transfer and then
//! finds the published file instead of fetching it again.
//!
//! # Example
//!
//! ```no_run
//! use contentdm_core::{AssetReference, ContentDm, ServerDescriptor};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ContentDm::new(ServerDescriptor::new("cdm.example.org", 81, false))?;
//! let asset = AssetReference::new("demo", "12", "map.jp2");
//! let path = client.download(&asset, Path::new("./downloads")).await?;
//! println!("Downloaded: {}", path.display());
//! # Ok(())
//! # }
//! ```

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::client::{ContentDm, InFlightRegistry};
use crate::error::ContentDmError;
use crate::model::AssetReference;
use crate::transport::TransportResponse;

/// Suffix of the in-progress file.
pub const PARTIAL_SUFFIX: &str = ".part";

impl ContentDm {
    /// Downloads `asset` into `destination_dir` and returns the published path.
    ///
    /// # Errors
    ///
    /// - [`ContentDmError::InvalidFilename`] if the filename is not a single path component
    /// - [`ContentDmError::NotConfigured`] if the file is missing and no server is set
    /// - [`ContentDmError::RequestFailed`] when the status is not 200
    /// - [`ContentDmError::Transport`] on connection or stream failure (the `.part` file remains)
    /// - [`ContentDmError::Io`] when the partial file cannot be written
    /// - [`ContentDmError::RenameFailed`] when publishing fails (the `.part` file remains)
    #[must_use = "download result contains the path to the downloaded file"]
    #[instrument(skip(self, asset), fields(alias = %asset.alias, pointer = %asset.pointer, filename = %asset.filename))]
    pub async fn download(
        &self,
        asset: &AssetReference,
        destination_dir: &Path,
    ) -> Result<PathBuf, ContentDmError> {
        self.download_inner(asset, destination_dir)
            .await
            .inspect_err(log_download_failure)
    }

    async fn download_inner(
        &self,
        asset: &AssetReference,
        destination_dir: &Path,
    ) -> Result<PathBuf, ContentDmError> {
        validate_filename(&asset.filename)?;
        let destination = destination_dir.join(&asset.filename);

        if already_published(&destination).await {
            debug!(path = %destination.display(), "already downloaded, skipping");
            return Ok(destination);
        }

        let entry = InFlightEntry::register(&self.in_flight, destination.clone());
        let _held = entry.lock().lock().await;
        self.fetch_and_publish(asset, &destination).await
    }

    async fn fetch_and_publish(
        &self,
        asset: &AssetReference,
        destination: &Path,
    ) -> Result<PathBuf, ContentDmError> {
        if already_published(destination).await {
            debug!(path = %destination.display(), "published by a concurrent download");
            return Ok(destination.to_path_buf());
        }

        let url = self.server().file_url(&asset.alias, &asset.pointer);
        if url.is_empty() {
            return Err(ContentDmError::NotConfigured);
        }

        debug!(url = %url, "starting download");
        let response = self
            .transport
            .get(&url)
            .await
            .map_err(|e| ContentDmError::transport(url.as_str(), e))?;

        if response.status != 200 {
            return Err(ContentDmError::request_failed(url, response.status));
        }

        let partial = partial_path(destination);
        let bytes = stream_to_partial(response, &url, &partial).await?;

        tokio::fs::rename(&partial, destination)
            .await
            .map_err(|e| ContentDmError::rename_failed(&partial, destination, e))?;

        info!(path = %destination.display(), bytes, "download complete");
        Ok(destination.to_path_buf())
    }
}

/// Registry slot for one destination path.
#[derive(Debug)]
pub(crate) struct InFlightSlot {
    lock: Arc<Mutex<()>>,
    holders: usize,
}

/// A download's claim on a registry slot.
///
/// Dropping it, whether the download finished or its future was dropped,
/// releases the claim and removes the slot once no claims remain.
struct InFlightEntry<'a> {
    registry: &'a InFlightRegistry,
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl<'a> InFlightEntry<'a> {
    fn register(registry: &'a InFlightRegistry, path: PathBuf) -> Self {
        let lock = {
            let mut slot = registry.entry(path.clone()).or_insert_with(|| InFlightSlot {
                lock: Arc::new(Mutex::new(())),
                holders: 0,
            });
            slot.holders += 1;
            Arc::clone(&slot.lock)
        };
        Self {
            registry,
            path,
            lock,
        }
    }

    fn lock(&self) -> &Mutex<()> {
        &self.lock
    }
}

impl Drop for InFlightEntry<'_> {
    fn drop(&mut self) {
        // Claims are counted under the shard lock, so the last release always removes the slot.
        if let Entry::Occupied(mut slot) = self.registry.entry(self.path.clone()) {
            slot.get_mut().holders -= 1;
            if slot.get().holders == 0 {
                slot.remove();
            }
        }
    }
}

/// `{destination}.part`
#[must_use]
pub fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_os_string();
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

/// Streams the response body into `partial`, returning bytes written.
///
/// The file is flushed and synced before the handle is closed.
async fn stream_to_partial(
    response: TransportResponse,
    url: &str,
    partial: &Path,
) -> Result<u64, ContentDmError> {
    let file = File::create(partial)
        .await
        .map_err(|e| ContentDmError::io(partial, e))?;
    let mut writer = BufWriter::new(file);
    let mut body = response.body;
    let mut bytes_written: u64 = 0;

    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| ContentDmError::transport(url, e))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| ContentDmError::io(partial, e))?;
        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| ContentDmError::io(partial, e))?;
    writer
        .into_inner()
        .sync_all()
        .await
        .map_err(|e| ContentDmError::io(partial, e))?;

    Ok(bytes_written)
}

/// The filename must be exactly one normal path component.
fn validate_filename(filename: &str) -> Result<(), ContentDmError> {
    let mut components = Path::new(filename).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !filename.contains(['/', '\\']) => Ok(()),
        _ => Err(ContentDmError::invalid_filename(filename)),
    }
}

async fn already_published(destination: &Path) -> bool {
    tokio::fs::try_exists(destination).await.unwrap_or(false)
}

fn log_download_failure(error: &ContentDmError) {
    match error {
        ContentDmError::RenameFailed { .. } => error!(error = %error, "failed to publish download"),
        _ => warn!(error = %error, "download failed"),
    }
}
