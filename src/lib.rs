//! Vaultlink: link-consistency engine and MCP server for Markdown note vaults
//!
//! A vault is a directory (local, git-synced, or behind a REST API) of
//! Markdown notes connected by `[[wiki-links]]`. Vaultlink keeps those links
//! consistent: content written through it gets its references canonicalized
//! and its resolvable path mentions promoted to links, and the link graph
//! stays queryable (forward links, backlinks, rename propagation).
//!
//! # Core Concepts
//!
//! - **Notes**: Markdown files addressed by corpus-relative paths
//! - **References**: `[[target]]` / `[[target|display]]` wiki-links,
//!   canonicalized to bare note names
//! - **Mentions**: quoted, contextual, or bare note paths in prose that are
//!   promoted to references when they resolve
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use vaultlink::{FsVault, LinkEngine};
//!
//! # async fn demo() -> vaultlink::VaultResult<()> {
//! let vault = Arc::new(FsVault::open("/path/to/vault")?);
//! let engine = LinkEngine::new(vault);
//! let canonical = engine.rewrite("See \"notes/Plan.md\" for details").await;
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod mcp;
pub mod vault;

pub use engine::{LinkEngine, LinkReport};
pub use vault::{
    batch_contents, ApiVault, FsVault, MemoryVault, SearchHit, VaultError, VaultResult, VaultStore,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
