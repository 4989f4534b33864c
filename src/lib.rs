//! CONTENTdm Client Library
//!
//! Talks to a CONTENTdm digital-collections server: query-string RPC calls
//! returning JSON, and binary asset downloads that are published atomically.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`server`] - Server configuration and endpoint URL construction
//! - [`client`] - RPC calls (collections, field info, item and compound-object info)
//! - [`download`] - Streaming asset downloads with `.part` + rename publication
//! - [`transport`] - HTTP transport seam and its reqwest implementation
//! - [`model`] - Typed projections of server data
//! - [`error`] - Structured error kinds

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod download;
pub mod error;
pub mod model;
pub mod server;
pub mod transport;
mod user_agent;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use client::{ContentDm, build_query, normalize_alias};
pub use download::{PARTIAL_SUFFIX, partial_path};
pub use error::{ContentDmError, TransportError};
pub use model::{AssetReference, CollectionDescriptor, FieldDescriptor, Visibility};
pub use server::{ServerConfig, ServerDescriptor};
pub use transport::{ReqwestTransport, Transport, TransportResponse};
