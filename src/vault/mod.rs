//! Vault storage backends
//!
//! A vault is a corpus of Markdown notes addressed by forward-slash,
//! corpus-relative paths. The [`VaultStore`] trait is the capability set the
//! link engine and the MCP tool layer are written against; [`FsVault`] backs
//! it with a local (optionally git-synced) checkout, [`ApiVault`] with a
//! remote REST endpoint, and [`MemoryVault`] with an in-memory map for tests.

mod api;
mod fs;
mod memory;
pub mod meta;
mod store;

pub use api::ApiVault;
pub use fs::FsVault;
pub use memory::MemoryVault;
pub use store::{batch_contents, SearchHit, VaultStore};

use thiserror::Error;

/// Errors that can occur during vault operations
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("Note not found: {0}")]
    NotFound(String),

    #[error("Invalid vault path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("Git error: {0}")]
    Git(String),

    #[error("Frontmatter error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Operation not supported by this backend: {0}")]
    Unsupported(String),
}

/// Result type for vault operations
pub type VaultResult<T> = Result<T, VaultError>;
