//! Remote REST vault backend.
//!
//! Speaks the local REST API exposed by the note application: notes live
//! under `/vault/{path}`, simple search under `/search/simple/`. The endpoint
//! serves a self-signed certificate on localhost, so certificate validation
//! is disabled and every request carries a bearer token.

use super::{SearchHit, VaultError, VaultResult, VaultStore};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(6);

/// A vault reached over HTTP.
#[derive(Debug)]
pub struct ApiVault {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct FileListing {
    files: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "errorCode", default)]
    error_code: i64,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SimpleSearchResult {
    filename: String,
    #[serde(default)]
    matches: Vec<SimpleSearchMatch>,
}

#[derive(Debug, Deserialize)]
struct SimpleSearchMatch {
    #[serde(default)]
    context: String,
}

impl ApiVault {
    pub fn new(base_url: &str, api_key: &str) -> VaultResult<Self> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    fn note_url(&self, path: &str) -> String {
        format!("{}/vault/{}", self.base_url, path)
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        self.client.request(method, url).bearer_auth(&self.api_key)
    }

    /// Map a non-success response to an error, decoding the API's error body
    /// when one is present.
    async fn check(path: &str, resp: reqwest::Response) -> VaultResult<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(VaultError::NotFound(path.to_string()));
        }
        let body: ApiErrorBody = resp.json().await.unwrap_or(ApiErrorBody {
            error_code: -1,
            message: None,
        });
        Err(VaultError::Api {
            code: body.error_code,
            message: body.message.unwrap_or_else(|| format!("HTTP {}", status)),
        })
    }
}

#[async_trait]
impl VaultStore for ApiVault {
    async fn read(&self, path: &str) -> VaultResult<String> {
        let resp = self
            .request(reqwest::Method::GET, self.note_url(path))
            .send()
            .await?;
        Ok(Self::check(path, resp).await?.text().await?)
    }

    async fn write(&self, path: &str, content: &str) -> VaultResult<()> {
        let resp = self
            .request(reqwest::Method::PUT, self.note_url(path))
            .header(reqwest::header::CONTENT_TYPE, "text/markdown")
            .body(content.to_string())
            .send()
            .await?;
        Self::check(path, resp).await?;
        Ok(())
    }

    async fn append(&self, path: &str, content: &str) -> VaultResult<()> {
        let resp = self
            .request(reqwest::Method::POST, self.note_url(path))
            .header(reqwest::header::CONTENT_TYPE, "text/markdown")
            .body(content.to_string())
            .send()
            .await?;
        Self::check(path, resp).await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> VaultResult<()> {
        let resp = self
            .request(reqwest::Method::DELETE, self.note_url(path))
            .send()
            .await?;
        Self::check(path, resp).await?;
        Ok(())
    }

    async fn list_notes(&self) -> VaultResult<Vec<String>> {
        let resp = self
            .request(reqwest::Method::GET, format!("{}/vault/", self.base_url))
            .send()
            .await?;
        let listing: FileListing = Self::check("/", resp).await?.json().await?;
        let mut notes: Vec<String> = listing
            .files
            .into_iter()
            .filter(|f| f.ends_with(".md"))
            .collect();
        notes.sort();
        Ok(notes)
    }

    async fn list_dir(&self, dirpath: &str) -> VaultResult<Vec<String>> {
        let url = format!(
            "{}/vault/{}/",
            self.base_url,
            dirpath.trim_matches('/')
        );
        let resp = self.request(reqwest::Method::GET, url).send().await?;
        let listing: FileListing = Self::check(dirpath, resp).await?.json().await?;
        let mut entries = listing.files;
        entries.sort();
        Ok(entries)
    }

    async fn search_text(&self, query: &str, context_length: usize) -> VaultResult<Vec<SearchHit>> {
        let resp = self
            .request(
                reqwest::Method::POST,
                format!("{}/search/simple/", self.base_url),
            )
            .query(&[
                ("query", query),
                ("contextLength", &context_length.to_string()),
            ])
            .send()
            .await?;
        let results: Vec<SimpleSearchResult> = Self::check("/", resp).await?.json().await?;

        Ok(results
            .into_iter()
            .map(|r| {
                let context = r
                    .matches
                    .into_iter()
                    .next()
                    .map(|m| m.context)
                    .unwrap_or_default();
                SearchHit {
                    path: r.filename,
                    context,
                }
            })
            .collect())
    }
}
