//! Filesystem vault backend with optional git synchronization.

use super::store::context_matches;
use super::{SearchHit, VaultError, VaultResult, VaultStore};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::process::Command;
use walkdir::WalkDir;

/// A vault rooted at a local directory.
///
/// In git mode the root must be a working tree; `open_git` pulls once on
/// open and [`VaultStore::sync`] commits and pushes the session's changes.
#[derive(Debug)]
pub struct FsVault {
    root: PathBuf,
    git: bool,
}

impl FsVault {
    /// Open a plain directory vault.
    pub fn open(root: impl Into<PathBuf>) -> VaultResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(VaultError::InvalidPath(format!(
                "not a directory: {}",
                root.display()
            )));
        }
        Ok(Self { root, git: false })
    }

    /// Open a git-backed vault, pulling the latest remote state.
    pub async fn open_git(root: impl Into<PathBuf>) -> VaultResult<Self> {
        let root = root.into();
        if !root.join(".git").exists() {
            return Err(VaultError::Git(format!(
                "not a git repository: {}",
                root.display()
            )));
        }
        let vault = Self { root, git: true };
        vault.git(&["pull", "--rebase"]).await?;
        Ok(vault)
    }

    /// Resolve a corpus-relative path against the root, rejecting anything
    /// that would escape it.
    fn abs(&self, path: &str) -> VaultResult<PathBuf> {
        let rel = Path::new(path);
        if rel.is_absolute()
            || rel
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        {
            return Err(VaultError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(rel))
    }

    fn relative(&self, abs: &Path) -> String {
        abs.strip_prefix(&self.root)
            .unwrap_or(abs)
            .to_string_lossy()
            .replace('\\', "/")
    }

    async fn git(&self, args: &[&str]) -> VaultResult<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .await
            .map_err(|e| VaultError::Git(format!("failed to run git {}: {}", args.join(" "), e)))?;
        if !output.status.success() {
            return Err(VaultError::Git(format!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[async_trait]
impl VaultStore for FsVault {
    async fn read(&self, path: &str) -> VaultResult<String> {
        let abs = self.abs(path)?;
        match tokio::fs::read_to_string(&abs).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(VaultError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, path: &str, content: &str) -> VaultResult<()> {
        let abs = self.abs(path)?;
        if let Some(parent) = abs.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&abs, content).await?;
        Ok(())
    }

    async fn append(&self, path: &str, content: &str) -> VaultResult<()> {
        let new = match self.read(path).await {
            Ok(existing) => format!("{}\n{}", existing, content),
            Err(VaultError::NotFound(_)) => content.to_string(),
            Err(e) => return Err(e),
        };
        self.write(path, &new).await
    }

    async fn delete(&self, path: &str) -> VaultResult<()> {
        let abs = self.abs(path)?;
        match tokio::fs::remove_file(&abs).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(VaultError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, path: &str) -> bool {
        match self.abs(path) {
            Ok(abs) => tokio::fs::metadata(&abs).await.map(|m| m.is_file()).unwrap_or(false),
            Err(_) => false,
        }
    }

    async fn list_notes(&self) -> VaultResult<Vec<String>> {
        let mut notes = Vec::new();
        let walker = WalkDir::new(&self.root).into_iter().filter_entry(|e| {
            !e.file_name()
                .to_str()
                .map(|n| n.starts_with('.'))
                .unwrap_or(false)
        });
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };
            if entry.file_type().is_file()
                && entry.path().extension().is_some_and(|ext| ext == "md")
            {
                notes.push(self.relative(entry.path()));
            }
        }
        notes.sort();
        Ok(notes)
    }

    async fn list_dir(&self, dirpath: &str) -> VaultResult<Vec<String>> {
        let abs = self.abs(dirpath)?;
        if !abs.is_dir() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        let mut dir = tokio::fs::read_dir(&abs).await?;
        while let Some(item) = dir.next_entry().await? {
            let name = item.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue;
            }
            if item.file_type().await?.is_dir() {
                entries.push(format!("{}/", name));
            } else {
                entries.push(name);
            }
        }
        entries.sort();
        Ok(entries)
    }

    async fn search_text(&self, query: &str, context_length: usize) -> VaultResult<Vec<SearchHit>> {
        let mut hits = Vec::new();
        for path in self.list_notes().await? {
            match self.read(&path).await {
                Ok(content) => hits.extend(context_matches(&path, &content, query, context_length)),
                Err(e) => {
                    tracing::warn!(path = %path, error = %e, "skipping unreadable note in search");
                }
            }
        }
        Ok(hits)
    }

    async fn sync(&self, message: &str) -> VaultResult<String> {
        if !self.git {
            return Err(VaultError::Unsupported("sync (vault is not git-backed)".into()));
        }

        self.git(&["add", "-A"]).await?;
        let status = self.git(&["status", "--porcelain"]).await?;
        if status.trim().is_empty() {
            return Ok("No changes to commit".to_string());
        }
        self.git(&["commit", "-m", message]).await?;
        self.git(&["pull", "--rebase"]).await?;
        self.git(&["push"]).await?;
        tracing::info!("vault changes pushed to remote");
        Ok("Changes synced to remote".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FsVault::open(dir.path()).unwrap();
        assert!(matches!(
            vault.read("../outside.md").await,
            Err(VaultError::InvalidPath(_))
        ));
        assert!(!vault.exists("../outside.md").await);
    }

    #[tokio::test]
    async fn test_write_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FsVault::open(dir.path()).unwrap();
        vault.write("a/b/c.md", "deep").await.unwrap();
        assert_eq!(vault.read("a/b/c.md").await.unwrap(), "deep");
    }

    #[tokio::test]
    async fn test_list_notes_skips_hidden() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FsVault::open(dir.path()).unwrap();
        vault.write("one.md", "").await.unwrap();
        vault.write("sub/two.md", "").await.unwrap();
        vault.write("notes.txt", "").await.unwrap();
        std::fs::create_dir_all(dir.path().join(".obsidian")).unwrap();
        std::fs::write(dir.path().join(".obsidian/hidden.md"), "").unwrap();

        let notes = vault.list_notes().await.unwrap();
        assert_eq!(notes, vec!["one.md".to_string(), "sub/two.md".to_string()]);
    }

    #[tokio::test]
    async fn test_sync_requires_git_mode() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FsVault::open(dir.path()).unwrap();
        assert!(matches!(
            vault.sync("msg").await,
            Err(VaultError::Unsupported(_))
        ));
    }
}
