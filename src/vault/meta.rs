//! Note metadata: YAML frontmatter access and templated note creation.

use super::{VaultResult, VaultStore};
use crate::engine::frontmatter;
use chrono::NaiveDate;
use serde_yaml::{Mapping, Value};

fn parse_header(header: &str) -> Mapping {
    match serde_yaml::from_str::<Value>(header) {
        Ok(Value::Mapping(map)) => map,
        _ => Mapping::new(),
    }
}

/// Frontmatter fields of a note. Missing or malformed frontmatter reads as
/// an empty mapping.
pub async fn read_frontmatter(store: &dyn VaultStore, path: &str) -> VaultResult<Mapping> {
    let content = store.read(path).await?;
    Ok(match frontmatter::split(&content) {
        Some((header, _)) => parse_header(header),
        None => Mapping::new(),
    })
}

/// Rebuild a note's content with `updates` merged into its frontmatter.
///
/// Existing fields not named in `updates` are kept; a note without
/// frontmatter gains a header block. The note itself is not written.
pub async fn merged_frontmatter(
    store: &dyn VaultStore,
    path: &str,
    updates: Mapping,
) -> VaultResult<String> {
    let content = store.read(path).await?;
    let (mut fields, body) = match frontmatter::split(&content) {
        Some((header, body)) => (parse_header(header), body),
        None => (Mapping::new(), content.as_str()),
    };
    for (key, value) in updates {
        fields.insert(key, value);
    }
    let header = serde_yaml::to_string(&fields)?;
    Ok(frontmatter::reassemble(&header, body))
}

/// Rebuild a note's content with one frontmatter field removed.
///
/// A note without frontmatter, or with frontmatter that fails to parse, is
/// returned unchanged. When the last field is removed the header block goes
/// with it.
pub async fn without_frontmatter_field(
    store: &dyn VaultStore,
    path: &str,
    field: &str,
) -> VaultResult<String> {
    let content = store.read(path).await?;
    let Some((header, body)) = frontmatter::split(&content) else {
        return Ok(content);
    };
    let mut fields = parse_header(header);
    if fields.is_empty() {
        return Ok(content);
    }
    fields.remove(field);
    if fields.is_empty() {
        return Ok(body.to_string());
    }
    let header = serde_yaml::to_string(&fields)?;
    Ok(frontmatter::reassemble(&header, body))
}

/// Path and templated content for a daily progress note.
///
/// Project paths outside `Projects/` are moved under it, matching how the
/// vault is laid out.
pub fn daily_note_content(project_path: &str, date: NaiveDate) -> (String, String) {
    let project_path = if project_path.starts_with("Projects/") {
        project_path.to_string()
    } else {
        format!("Projects/{}", project_path)
    };
    let date_dashed = date.format("%Y-%m-%d");
    let date_snake = date.format("%Y_%m_%d");
    let project_name = project_path.rsplit('/').next().unwrap_or(&project_path);

    let path = format!(
        "{}/Daily Progress/daily_progress_{}.md",
        project_path, date_snake
    );
    let content = format!(
        "---\n\
         date: [[{date}]]\n\
         type: daily_progress\n\
         project: \"[[{project}]]\"\n\
         tags: [daily-progress, research-planning]\n\
         ---\n\
         \n\
         # Daily Progress - [[{date}]]\n\
         \n\
         ## What I Learned Today\n\
         \n\
         ## Key Insights\n\
         \n\
         ## Questions & Challenges\n\
         \n\
         ## Next Steps\n\
         \n\
         ## Resources Referenced\n",
        date = date_dashed,
        project = project_name,
    );
    (path, content)
}
