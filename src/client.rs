//! CONTENTdm RPC client.
//!
//! Calls go out as `GET {endpoint}q={function}/{param}/.../json`. The service
//! parses the path positionally, so parameters are joined verbatim and an
//! empty parameter list still produces the `//json` tail.

use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::download::InFlightSlot;
use crate::error::ContentDmError;
use crate::model::{
    CollectionDescriptor, FieldDescriptor, UNSPECIFIED_VISIBILITY_SEGMENT, Visibility,
};
use crate::server::ServerConfig;
use crate::transport::{ReqwestTransport, Transport};

/// RPC function names understood by the server.
pub mod functions {
    /// Lists collections, filtered by a visibility parameter.
    pub const COLLECTION_LIST: &str = "dmGetCollectionList";
    /// Field configuration of one collection.
    pub const COLLECTION_FIELD_INFO: &str = "dmGetCollectionFieldInfo";
    /// Page structure of a compound object.
    pub const COMPOUND_OBJECT_INFO: &str = "dmGetCompoundObjectInfo";
    /// Metadata record of a single item.
    pub const ITEM_INFO: &str = "dmGetItemInfo";
}

/// Downloads in progress, keyed by destination path.
pub(crate) type InFlightRegistry = DashMap<PathBuf, InFlightSlot>;

/// Client for one CONTENTdm server.
///
/// Cheap to clone; clones share the HTTP transport and the in-flight
/// download registry.
///
/// # Example
///
/// ```no_run
/// use contentdm_core::{ContentDm, ServerDescriptor, Visibility};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ContentDm::new(ServerDescriptor::new("cdm.example.org", 81, false))?;
/// for collection in client.list_collections(Some(Visibility::Published)).await? {
///     println!("{} {}", collection.alias, collection.name);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ContentDm {
    server: ServerConfig,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) in_flight: Arc<InFlightRegistry>,
}

impl ContentDm {
    /// Creates a client using the default reqwest transport.
    ///
    /// # Errors
    ///
    /// Returns [`ContentDmError::Init`] if the HTTP client cannot be built.
    pub fn new(server: impl Into<ServerConfig>) -> Result<Self, ContentDmError> {
        let transport = ReqwestTransport::new().map_err(ContentDmError::Init)?;
        Ok(Self::with_transport(server, Arc::new(transport)))
    }

    /// Creates a client over a caller-supplied transport.
    pub fn with_transport(server: impl Into<ServerConfig>, transport: Arc<dyn Transport>) -> Self {
        Self {
            server: server.into(),
            transport,
            in_flight: Arc::new(DashMap::new()),
        }
    }

    #[must_use]
    pub fn server(&self) -> &ServerConfig {
        &self.server
    }

    /// Replaces the server configuration and returns the new state.
    ///
    /// Requests already started keep the endpoint they resolved.
    pub fn set_server(&mut self, server: impl Into<ServerConfig>) -> &ServerConfig {
        self.server = server.into();
        debug!(configured = self.server.is_configured(), "server configuration replaced");
        &self.server
    }

    /// Lists collections, optionally restricted by visibility.
    ///
    /// # Errors
    ///
    /// See [`invoke`](Self::invoke).
    #[instrument(skip(self))]
    pub async fn list_collections(
        &self,
        visibility: Option<Visibility>,
    ) -> Result<Vec<CollectionDescriptor>, ContentDmError> {
        let param = visibility.map_or(UNSPECIFIED_VISIBILITY_SEGMENT, Visibility::as_param);
        self.call(functions::COLLECTION_LIST, &[param]).await
    }

    /// Describes every metadata field of a collection.
    ///
    /// # Errors
    ///
    /// See [`invoke`](Self::invoke).
    #[instrument(skip(self))]
    pub async fn collection_field_info(
        &self,
        alias: &str,
    ) -> Result<Vec<FieldDescriptor>, ContentDmError> {
        let alias = normalize_alias(alias);
        self.call(functions::COLLECTION_FIELD_INFO, &[alias.as_str()])
            .await
    }

    /// Structure of a compound object.
    ///
    /// # Errors
    ///
    /// See [`invoke`](Self::invoke).
    #[instrument(skip(self))]
    pub async fn compound_object_info(
        &self,
        alias: &str,
        pointer: &str,
    ) -> Result<Value, ContentDmError> {
        let alias = normalize_alias(alias);
        self.call(functions::COMPOUND_OBJECT_INFO, &[alias.as_str(), pointer])
            .await
    }

    /// Metadata of a single item.
    ///
    /// # Errors
    ///
    /// See [`invoke`](Self::invoke).
    #[instrument(skip(self))]
    pub async fn item_info(&self, alias: &str, pointer: &str) -> Result<Value, ContentDmError> {
        let alias = normalize_alias(alias);
        self.call(functions::ITEM_INFO, &[alias.as_str(), pointer]).await
    }

    /// Calls an arbitrary RPC function and returns the parsed JSON body.
    ///
    /// # Errors
    ///
    /// - [`ContentDmError::NotConfigured`] before any request when no server is set
    /// - [`ContentDmError::Transport`] on connection or stream failure
    /// - [`ContentDmError::RequestFailed`] when the status is not 200
    /// - [`ContentDmError::MalformedResponse`] when the body is not JSON
    #[instrument(skip(self))]
    pub async fn invoke(&self, function: &str, params: &[&str]) -> Result<Value, ContentDmError> {
        self.call(function, params).await
    }

    async fn call<T: DeserializeOwned>(
        &self,
        function: &str,
        params: &[&str],
    ) -> Result<T, ContentDmError> {
        self.request(function, params)
            .await
            .inspect_err(|error| warn!(function, error = %error, "CONTENTdm request failed"))
    }

    async fn request<T: DeserializeOwned>(
        &self,
        function: &str,
        params: &[&str],
    ) -> Result<T, ContentDmError> {
        let endpoint = self.server.rpc_endpoint();
        if endpoint.is_empty() {
            return Err(ContentDmError::NotConfigured);
        }

        let url = format!("{endpoint}{}", build_query(function, params));
        debug!(url = %url, "sending RPC request");

        let response = self
            .transport
            .get(&url)
            .await
            .map_err(|e| ContentDmError::transport(url.as_str(), e))?;

        let status = response.status;
        if status != 200 {
            // Read the body to the end anyway so the connection is left clean.
            let drained = response.collect_body().await.map(|body| body.len());
            debug!(status, ?drained, "drained error response");
            return Err(ContentDmError::request_failed(url, status));
        }

        let body = response
            .collect_body()
            .await
            .map_err(|e| ContentDmError::transport(url.as_str(), e))?;

        serde_json::from_slice(&body).map_err(|e| ContentDmError::malformed(url, e))
    }
}

/// Builds `q={function}/{params joined by '/'}/json`.
#[must_use]
pub fn build_query(function: &str, params: &[&str]) -> String {
    format!("q={function}/{}/json", params.join("/"))
}

/// Strips every `/` so `/demo` and `demo` address the same collection.
#[must_use]
pub fn normalize_alias(alias: &str) -> String {
    alias.replace('/', "")
}
