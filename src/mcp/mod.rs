//! MCP server for Vaultlink — exposes vault access and link maintenance via
//! the Model Context Protocol.
//!
//! Every tool that writes note content routes it through the link engine
//! first, so references stay canonical no matter which tool touched the note.

pub mod params;

use crate::engine::LinkEngine;
use crate::vault::{self, batch_contents, ApiVault, FsVault, VaultStore};
use params::*;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use std::path::PathBuf;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ok_text(text: String) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

fn err_text(msg: String) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::error(vec![Content::text(msg)]))
}

fn yaml_updates(updates: serde_json::Map<String, serde_json::Value>) -> serde_yaml::Mapping {
    let mut mapping = serde_yaml::Mapping::new();
    for (key, value) in updates {
        if let Ok(value) = serde_yaml::to_value(value) {
            mapping.insert(serde_yaml::Value::String(key), value);
        }
    }
    mapping
}

// ---------------------------------------------------------------------------
// VaultMcpServer
// ---------------------------------------------------------------------------

/// Which vault backend the server runs against.
pub enum BackendConfig {
    /// Local directory, optionally a git clone that syncs with its remote.
    Fs { root: PathBuf, git: bool },
    /// Obsidian Local REST API over HTTPS.
    Api { url: String, key: String },
}

#[derive(Clone)]
pub struct VaultMcpServer {
    store: Arc<dyn VaultStore>,
    engine: Arc<LinkEngine>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl VaultMcpServer {
    pub fn new(store: Arc<dyn VaultStore>) -> Self {
        Self {
            engine: Arc::new(LinkEngine::new(store.clone())),
            store,
            tool_router: Self::tool_router(),
        }
    }

    // ── File tools ──────────────────────────────────────────────────────

    #[tool(description = "List all markdown notes in the vault")]
    async fn list_files_in_vault(&self) -> Result<CallToolResult, McpError> {
        match self.store.list_notes().await {
            Ok(notes) => ok_text(serde_json::to_string_pretty(&notes).unwrap()),
            Err(e) => err_text(e.to_string()),
        }
    }

    #[tool(description = "List files and subdirectories in a vault directory")]
    async fn list_files_in_dir(
        &self,
        Parameters(p): Parameters<DirPathParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.store.list_dir(&p.dirpath).await {
            Ok(entries) => ok_text(serde_json::to_string_pretty(&entries).unwrap()),
            Err(e) => err_text(e.to_string()),
        }
    }

    #[tool(description = "Read the full content of a note")]
    async fn get_file_contents(
        &self,
        Parameters(p): Parameters<FilePathParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.store.read(&p.filepath).await {
            Ok(content) => ok_text(content),
            Err(e) => err_text(e.to_string()),
        }
    }

    #[tool(description = "Read several notes at once, concatenated with per-note headings")]
    async fn batch_get_file_contents(
        &self,
        Parameters(p): Parameters<BatchFilesParams>,
    ) -> Result<CallToolResult, McpError> {
        ok_text(batch_contents(self.store.as_ref(), &p.filepaths).await)
    }

    #[tool(description = "Search note contents for a text query (case-insensitive)")]
    async fn search(
        &self,
        Parameters(p): Parameters<SearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let context_length = p.context_length.unwrap_or(100);
        match self.store.search_text(&p.query, context_length).await {
            Ok(hits) => ok_text(serde_json::to_string_pretty(&hits).unwrap()),
            Err(e) => err_text(e.to_string()),
        }
    }

    // ── Content tools ───────────────────────────────────────────────────

    #[tool(
        description = "Create or overwrite a note. Wiki-links are normalized and resolvable path mentions become links."
    )]
    async fn put_content(
        &self,
        Parameters(p): Parameters<WriteContentParams>,
    ) -> Result<CallToolResult, McpError> {
        let content = self.engine.rewrite(&p.content).await;
        match self.store.write(&p.filepath, &content).await {
            Ok(()) => ok_text(format!("Successfully wrote {}", p.filepath)),
            Err(e) => err_text(e.to_string()),
        }
    }

    #[tool(
        description = "Append content to a note, creating it if missing. Links in the appended content are normalized."
    )]
    async fn append_content(
        &self,
        Parameters(p): Parameters<WriteContentParams>,
    ) -> Result<CallToolResult, McpError> {
        let content = self.engine.rewrite(&p.content).await;
        match self.store.append(&p.filepath, &content).await {
            Ok(()) => ok_text(format!("Successfully appended to {}", p.filepath)),
            Err(e) => err_text(e.to_string()),
        }
    }

    #[tool(description = "Insert content at the start or end of an existing note")]
    async fn patch_content(
        &self,
        Parameters(p): Parameters<PatchContentParams>,
    ) -> Result<CallToolResult, McpError> {
        let existing = match self.store.read(&p.filepath).await {
            Ok(c) => c,
            Err(e) => return err_text(e.to_string()),
        };
        let insert = self.engine.rewrite(&p.content).await;
        let patched = match p.position.as_str() {
            "append" => format!("{}\n{}", existing, insert),
            "prepend" => format!("{}\n{}", insert, existing),
            other => return err_text(format!("unknown position '{}'", other)),
        };
        match self.store.write(&p.filepath, &patched).await {
            Ok(()) => ok_text(format!("Successfully patched {}", p.filepath)),
            Err(e) => err_text(e.to_string()),
        }
    }

    #[tool(description = "Delete a note from the vault")]
    async fn delete_file(
        &self,
        Parameters(p): Parameters<FilePathParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.store.delete(&p.filepath).await {
            Ok(()) => ok_text(format!("Successfully deleted {}", p.filepath)),
            Err(e) => err_text(e.to_string()),
        }
    }

    // ── Frontmatter tools ───────────────────────────────────────────────

    #[tool(description = "Read a note's YAML frontmatter as a JSON object")]
    async fn get_frontmatter(
        &self,
        Parameters(p): Parameters<FilePathParams>,
    ) -> Result<CallToolResult, McpError> {
        match vault::meta::read_frontmatter(self.store.as_ref(), &p.filepath).await {
            // YAML allows keys (floats, nulls, sequences) that JSON cannot
            // represent; report those instead of panicking.
            Ok(fields) => match serde_json::to_string_pretty(&fields) {
                Ok(text) => ok_text(text),
                Err(e) => err_text(format!(
                    "frontmatter of {} is not representable as JSON: {}",
                    p.filepath, e
                )),
            },
            Err(e) => err_text(e.to_string()),
        }
    }

    #[tool(description = "Merge fields into a note's frontmatter, keeping unnamed fields")]
    async fn update_frontmatter(
        &self,
        Parameters(p): Parameters<UpdateFrontmatterParams>,
    ) -> Result<CallToolResult, McpError> {
        let updates = yaml_updates(p.updates);
        let merged =
            match vault::meta::merged_frontmatter(self.store.as_ref(), &p.filepath, updates).await {
                Ok(m) => m,
                Err(e) => return err_text(e.to_string()),
            };
        let merged = self.engine.rewrite(&merged).await;
        match self.store.write(&p.filepath, &merged).await {
            Ok(()) => ok_text(format!("Updated frontmatter of {}", p.filepath)),
            Err(e) => err_text(e.to_string()),
        }
    }

    #[tool(description = "Remove one field from a note's frontmatter")]
    async fn delete_frontmatter_field(
        &self,
        Parameters(p): Parameters<DeleteFrontmatterFieldParams>,
    ) -> Result<CallToolResult, McpError> {
        let updated = match vault::meta::without_frontmatter_field(
            self.store.as_ref(),
            &p.filepath,
            &p.field,
        )
        .await
        {
            Ok(u) => u,
            Err(e) => return err_text(e.to_string()),
        };
        match self.store.write(&p.filepath, &updated).await {
            Ok(()) => ok_text(format!("Removed field '{}' from {}", p.field, p.filepath)),
            Err(e) => err_text(e.to_string()),
        }
    }

    // ── Link tools ──────────────────────────────────────────────────────

    #[tool(description = "List the wiki-links and internal markdown links in a note")]
    async fn extract_links(
        &self,
        Parameters(p): Parameters<FilePathParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.engine.extract_links(&p.filepath).await {
            Ok(report) => ok_text(serde_json::to_string_pretty(&report).unwrap()),
            Err(e) => err_text(e.to_string()),
        }
    }

    #[tool(description = "List the notes that link to a given note")]
    async fn get_backlinks(
        &self,
        Parameters(p): Parameters<FilePathParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.engine.backlinks(&p.filepath).await {
            Ok(backlinks) => ok_text(serde_json::to_string_pretty(&backlinks).unwrap()),
            Err(e) => err_text(e.to_string()),
        }
    }

    #[tool(description = "Rewrite references in other notes after a note was renamed or moved")]
    async fn update_links(
        &self,
        Parameters(p): Parameters<UpdateLinksParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.engine.update_links(&p.old_path, &p.new_path).await {
            Ok(count) => ok_text(format!(
                "Updated links in {} note(s): {} -> {}",
                count, p.old_path, p.new_path
            )),
            Err(e) => err_text(e.to_string()),
        }
    }

    // ── Workflow tools ──────────────────────────────────────────────────

    #[tool(
        description = "Create a daily progress note in a project's Daily Progress folder (daily_progress_YYYY_MM_DD.md)"
    )]
    async fn create_daily_note(
        &self,
        Parameters(p): Parameters<DailyNoteParams>,
    ) -> Result<CallToolResult, McpError> {
        let date = match p.date.as_deref() {
            Some(raw) => match chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(d) => d,
                Err(e) => return err_text(format!("invalid date '{}': {}", raw, e)),
            },
            None => chrono::Local::now().date_naive(),
        };
        let (path, content) = vault::meta::daily_note_content(&p.project_path, date);
        let content = self.engine.rewrite(&content).await;
        match self.store.write(&path, &content).await {
            Ok(()) => ok_text(format!("Created daily progress note: {}", path)),
            Err(e) => err_text(e.to_string()),
        }
    }

    #[tool(description = "Commit local vault changes and sync with the git remote")]
    async fn git_sync(
        &self,
        Parameters(p): Parameters<GitSyncParams>,
    ) -> Result<CallToolResult, McpError> {
        let message = p
            .message
            .unwrap_or_else(|| "Update vault via vaultlink".to_string());
        match self.store.sync(&message).await {
            Ok(summary) => {
                // Remote state may have changed; stop trusting cached existence.
                self.engine.invalidate_cache();
                ok_text(summary)
            }
            Err(e) => err_text(e.to_string()),
        }
    }
}

#[tool_handler]
impl ServerHandler for VaultMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Vaultlink MCP server — Markdown vault access with automatic wiki-link maintenance"
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::MemoryVault;

    fn server_with(notes: &[(&str, &str)]) -> VaultMcpServer {
        let vault = MemoryVault::new();
        for (path, content) in notes {
            vault.insert(path, content);
        }
        VaultMcpServer::new(Arc::new(vault))
    }

    #[tokio::test]
    async fn test_get_frontmatter_returns_fields() {
        let server = server_with(&[("a.md", "---\ntitle: Alpha\n---\nbody\n")]);
        let result = server
            .get_frontmatter(Parameters(FilePathParams {
                filepath: "a.md".to_string(),
            }))
            .await
            .unwrap();
        assert_ne!(result.is_error, Some(true));
    }

    #[tokio::test]
    async fn test_get_frontmatter_unrepresentable_key_is_tool_error() {
        // A null map key is valid YAML but has no JSON form; the tool must
        // report it, not crash the server.
        let server = server_with(&[("weird.md", "---\n~: x\n---\nbody\n")]);
        let result = server
            .get_frontmatter(Parameters(FilePathParams {
                filepath: "weird.md".to_string(),
            }))
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run_mcp_server(config: BackendConfig) -> i32 {
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to create tokio runtime: {}", e);
            return 1;
        }
    };

    rt.block_on(async {
        let store: Arc<dyn VaultStore> = match config {
            BackendConfig::Fs { root, git: false } => match FsVault::open(&root) {
                Ok(v) => Arc::new(v),
                Err(e) => {
                    eprintln!("failed to open vault at {}: {}", root.display(), e);
                    return 1;
                }
            },
            BackendConfig::Fs { root, git: true } => match FsVault::open_git(&root).await {
                Ok(v) => Arc::new(v),
                Err(e) => {
                    eprintln!("failed to open git vault at {}: {}", root.display(), e);
                    return 1;
                }
            },
            BackendConfig::Api { url, key } => match ApiVault::new(&url, &key) {
                Ok(v) => Arc::new(v),
                Err(e) => {
                    eprintln!("failed to configure API client for {}: {}", url, e);
                    return 1;
                }
            },
        };

        let server = VaultMcpServer::new(store);

        eprintln!("vaultlink mcp server starting on stdio...");

        let service = match server.serve(rmcp::transport::stdio()).await {
            Ok(s) => s,
            Err(e) => {
                eprintln!("failed to start MCP server: {}", e);
                return 1;
            }
        };

        if let Err(e) = service.waiting().await {
            eprintln!("MCP server error: {}", e);
            return 1;
        }

        0
    })
}
