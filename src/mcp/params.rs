//! MCP tool parameter structs with schemars-derived JSON schemas.

use schemars::JsonSchema;
use serde::Deserialize;

// ── File params ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FilePathParams {
    #[schemars(description = "Path to the note, relative to the vault root")]
    pub filepath: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DirPathParams {
    #[schemars(description = "Directory path relative to the vault root (empty for the root)")]
    pub dirpath: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct BatchFilesParams {
    #[schemars(description = "Paths of the notes to read, relative to the vault root")]
    pub filepaths: Vec<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchParams {
    #[schemars(description = "Text to search for (case-insensitive)")]
    pub query: String,
    #[schemars(description = "Characters of surrounding context per match (default 100)")]
    pub context_length: Option<usize>,
}

// ── Content params ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize, JsonSchema)]
pub struct WriteContentParams {
    #[schemars(description = "Path to the note, relative to the vault root")]
    pub filepath: String,
    #[schemars(description = "Markdown content to write")]
    pub content: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PatchContentParams {
    #[schemars(description = "Path to the note, relative to the vault root")]
    pub filepath: String,
    #[schemars(description = "Markdown content to insert")]
    pub content: String,
    #[schemars(description = "Where to insert: 'append' or 'prepend'")]
    pub position: String,
}

// ── Frontmatter params ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateFrontmatterParams {
    #[schemars(description = "Path to the note, relative to the vault root")]
    pub filepath: String,
    #[schemars(description = "Fields to set; existing fields not named here are kept")]
    pub updates: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteFrontmatterFieldParams {
    #[schemars(description = "Path to the note, relative to the vault root")]
    pub filepath: String,
    #[schemars(description = "Frontmatter field to remove")]
    pub field: String,
}

// ── Link params ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateLinksParams {
    #[schemars(description = "Old note path, relative to the vault root")]
    pub old_path: String,
    #[schemars(description = "New note path, relative to the vault root")]
    pub new_path: String,
}

// ── Sync params ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GitSyncParams {
    #[schemars(description = "Commit message for local changes (optional)")]
    pub message: Option<String>,
}

// ── Daily note params ───────────────────────────────────────────────────

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DailyNoteParams {
    #[schemars(
        description = "Path to the project (e.g. 'Projects/My Research', or just 'My Research')"
    )]
    pub project_path: String,
    #[schemars(description = "Date in YYYY-MM-DD format (defaults to today)")]
    pub date: Option<String>,
}
