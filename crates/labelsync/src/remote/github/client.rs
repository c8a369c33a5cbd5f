//! GitHub REST API client implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use tracing::{debug, warn};

use super::models::{CreateLabelBody, LabelResource, UpdateLabelBody};
use crate::error::SyncError;
use crate::manifest::Label;
use crate::remote::traits::LabelStore;

/// Base URL for the GitHub REST API.
const API_BASE_URL: &str = "https://api.github.com";

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Page size used when listing labels.
const LIST_PAGE_SIZE: usize = 50;

/// GitHub label store backed by the REST v3 API.
#[derive(Clone)]
pub struct GithubClient {
    /// HTTP client, shared across concurrent sync tasks.
    client: Client,
    /// Personal access or installation token.
    token: String,
    /// API root; overridable for GitHub Enterprise Server and tests.
    base_url: String,
}

impl GithubClient {
    /// Create a client against the public GitHub API.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(token: impl Into<String>) -> Result<Self, SyncError> {
        Self::with_base_url(token, API_BASE_URL)
    }

    /// Create a client against a different API root.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn with_base_url(
        token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, SyncError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            token: token.into(),
            base_url: base_url.into(),
        })
    }

    /// Build an authenticated request.
    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        debug!(method = %method, url = %url, "GitHub API request");

        self.client
            .request(method, &url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header(
                "User-Agent",
                concat!("labelsync/", env!("CARGO_PKG_VERSION")),
            )
    }

    /// Check the status of a response whose body we do not need.
    async fn expect_success(response: reqwest::Response) -> Result<(), SyncError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let message = response.text().await.unwrap_or_default();
        Err(SyncError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Parse a JSON response, mapping non-2xx statuses to API errors.
    async fn parse_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, SyncError> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str(&text).map_err(|e| {
                warn!(error = %e, body = %text, "failed to parse GitHub response");
                SyncError::Serialization(e)
            })
        } else {
            Err(SyncError::Api {
                status: status.as_u16(),
                message: text,
            })
        }
    }
}

#[async_trait]
impl LabelStore for GithubClient {
    async fn list_labels(&self, owner: &str, repo: &str) -> Result<Vec<Label>, SyncError> {
        let mut labels = Vec::new();
        let mut page = 1usize;

        loop {
            let path =
                format!("/repos/{owner}/{repo}/labels?per_page={LIST_PAGE_SIZE}&page={page}");
            let response = self.request(Method::GET, &path).send().await?;
            let batch: Vec<LabelResource> = Self::parse_json(response).await?;

            let count = batch.len();
            debug!(owner = %owner, repo = %repo, page, count, "fetched label page");
            labels.extend(batch.into_iter().map(Label::from));

            // A short page means the set is exhausted.
            if count < LIST_PAGE_SIZE {
                break;
            }
            page += 1;
        }

        Ok(labels)
    }

    async fn create_label(&self, owner: &str, repo: &str, label: &Label) -> Result<(), SyncError> {
        let body = CreateLabelBody {
            name: &label.name,
            description: &label.description,
            color: &label.color,
        };

        let response = self
            .request(Method::POST, &format!("/repos/{owner}/{repo}/labels"))
            .json(&body)
            .send()
            .await?;

        Self::expect_success(response).await
    }

    async fn update_label(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
        label: &Label,
    ) -> Result<(), SyncError> {
        let body = UpdateLabelBody {
            new_name: &label.name,
            description: &label.description,
            color: &label.color,
        };
        let encoded = urlencoding::encode(name);

        let response = self
            .request(
                Method::PATCH,
                &format!("/repos/{owner}/{repo}/labels/{encoded}"),
            )
            .json(&body)
            .send()
            .await?;

        Self::expect_success(response).await
    }

    async fn delete_label(&self, owner: &str, repo: &str, name: &str) -> Result<(), SyncError> {
        let encoded = urlencoding::encode(name);

        let response = self
            .request(
                Method::DELETE,
                &format!("/repos/{owner}/{repo}/labels/{encoded}"),
            )
            .send()
            .await?;

        Self::expect_success(response).await
    }
}
