//! Storage integration layer
//!
//! This module provides the S3 functionality including:
//! - [`config::ClientConfig`] - connection settings resolved from the environment
//! - [`client::StorageClient`] - bucket and object operations
//! - [`error`] - uniform [`error::Failure`] outcome for provider errors
//! - [`download`] - streamed object downloads
//! - [`types`] - S3 data types (Bucket, ObjectSummary)

pub mod client;
pub mod config;
pub mod download;
pub mod error;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use client::{cancellable, StorageClient};
pub use config::{ClientConfig, ProxyConfig, StaticCredentials};
pub use download::{stream_object, Download, ObjectContent};
pub use error::{translate, Failure, Outcome, Severity};
pub use types::{Bucket, ObjectSummary};
