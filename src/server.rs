//! Server configuration and endpoint URL construction.
//!
//! URLs are built by plain string formatting rather than through a URL
//! parser: the RPC service reads its query positionally, so the segment
//! separators must reach the wire exactly as written.

use serde::{Deserialize, Serialize};

/// Path of the RPC entry point, including the query-string marker.
const RPC_PATH: &str = "/dmwebservices/index.php?";

/// Path of the file-retrieval CGI.
const FILE_PATH: &str = "/cgi-bin/showfile.exe";

/// Address of one CONTENTdm server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServerDescriptor {
    hostname: String,
    port: u16,
    use_tls: bool,
}

impl ServerDescriptor {
    /// Creates a descriptor for `hostname:port`, using HTTPS when `use_tls` is set.
    pub fn new(hostname: impl Into<String>, port: u16, use_tls: bool) -> Self {
        Self {
            hostname: hostname.into(),
            port,
            use_tls,
        }
    }

    #[must_use]
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    #[must_use]
    pub fn use_tls(&self) -> bool {
        self.use_tls
    }

    fn base(&self) -> String {
        let scheme = if self.use_tls { "https" } else { "http" };
        format!("{scheme}://{}:{}", self.hostname, self.port)
    }

    /// RPC endpoint, ready for a `q=...` query to be appended.
    #[must_use]
    pub fn rpc_endpoint(&self) -> String {
        format!("{}{RPC_PATH}", self.base())
    }

    /// URL that serves the raw file behind `alias`/`pointer`.
    #[must_use]
    pub fn file_url(&self, alias: &str, pointer: &str) -> String {
        format!(
            "{}{FILE_PATH}?CISOROOT={alias}&CISOPTR={pointer}",
            self.base()
        )
    }
}

/// Whether a client has a server to talk to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerConfig {
    #[default]
    Unconfigured,
    Configured(ServerDescriptor),
}

impl ServerConfig {
    /// Returns the descriptor when configured.
    #[must_use]
    pub fn descriptor(&self) -> Option<&ServerDescriptor> {
        match self {
            Self::Configured(descriptor) => Some(descriptor),
            Self::Unconfigured => None,
        }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Configured(_))
    }

    /// RPC endpoint, or the empty string when unconfigured.
    #[must_use]
    pub fn rpc_endpoint(&self) -> String {
        self.descriptor()
            .map(ServerDescriptor::rpc_endpoint)
            .unwrap_or_default()
    }

    /// File URL, or the empty string when unconfigured.
    #[must_use]
    pub fn file_url(&self, alias: &str, pointer: &str) -> String {
        self.descriptor()
            .map(|descriptor| descriptor.file_url(alias, pointer))
            .unwrap_or_default()
    }
}

impl From<ServerDescriptor> for ServerConfig {
    fn from(descriptor: ServerDescriptor) -> Self {
        Self::Configured(descriptor)
    }
}

impl From<Option<ServerDescriptor>> for ServerConfig {
    fn from(descriptor: Option<ServerDescriptor>) -> Self {
        descriptor.map_or(Self::Unconfigured, Self::Configured)
    }
}
