//! The HTTP client that talks to the real Git host.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use git_http::GitHttpError;

/// Abstracts the upstream Git smart-HTTP endpoint so tests can substitute a
/// stub without opening a real socket.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn fetch_info_refs(&self, repo_url: &str) -> Result<Vec<u8>, GitHttpError>;

    async fn upload_pack(&self, repo_url: &str, body: Bytes) -> Result<Bytes, GitHttpError>;
}

pub struct ReqwestUpstreamClient {
    client: reqwest::Client,
    base: String,
}

impl ReqwestUpstreamClient {
    pub fn new(base: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base: base.into() })
    }

    fn full_url(&self, repo_url: &str, suffix: &str) -> String {
        if repo_url.starts_with("http://") || repo_url.starts_with("https://") {
            format!("{repo_url}/{suffix}")
        } else {
            format!("{}/{repo_url}/{suffix}", self.base.trim_end_matches('/'))
        }
    }
}

#[async_trait]
impl UpstreamClient for ReqwestUpstreamClient {
    async fn fetch_info_refs(&self, repo_url: &str) -> Result<Vec<u8>, GitHttpError> {
        let url = self.full_url(repo_url, "info/refs?service=git-upload-pack");
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GitHttpError::UpstreamFailure(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(GitHttpError::UpstreamFailure(format!(
                "upstream returned {}",
                resp.status()
            )));
        }
        resp.bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| GitHttpError::UpstreamFailure(e.to_string()))
    }

    async fn upload_pack(&self, repo_url: &str, body: Bytes) -> Result<Bytes, GitHttpError> {
        let url = self.full_url(repo_url, "git-upload-pack");
        let resp = self
            .client
            .post(&url)
            .header("Content-Type", "application/x-git-upload-pack-request")
            .body(body)
            .send()
            .await
            .map_err(|e| GitHttpError::UpstreamFailure(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(GitHttpError::UpstreamFailure(format!(
                "upstream returned {}",
                resp.status()
            )));
        }
        resp.bytes().await.map_err(|e| GitHttpError::UpstreamFailure(e.to_string()))
    }
}
