//! GitHub REST adapter for [`IssueTracker`]

use super::{IssueTracker, RepositoryRef};
use crate::error::{Result, TrackerError, ValidationError};
use crate::label::Label;
use crate::security::AuthToken;
use log::debug;
use reqwest::{Client as HttpClient, Method, Response, StatusCode, Url, header};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Public GitHub API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Largest page size the labels endpoint accepts
const PAGE_SIZE: usize = 100;

/// Connection settings for [`GitHubClient`]
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub api_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: concat!("label-sync/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GitHubError {
    message: String,
}

#[derive(Debug, Serialize)]
struct EditLabelRequest<'a> {
    new_name: &'a str,
    color: &'a str,
}

/// Issue tracker backed by the GitHub labels API
pub struct GitHubClient {
    http_client: HttpClient,
    base_url: Url,
    repository: RepositoryRef,
    token: AuthToken,
}

impl GitHubClient {
    /// Create a client bound to one repository
    pub fn new(repository: RepositoryRef, token: AuthToken, config: GitHubConfig) -> Result<Self> {
        if token.is_empty() {
            return Err(ValidationError::missing_field("token").into());
        }

        let base_url = Url::parse(&config.api_url)
            .map_err(|e| ValidationError::invalid_parameter("api_url", &e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(
                ValidationError::invalid_parameter("api_url", "must be an http(s) URL").into(),
            );
        }

        let http_client = HttpClient::builder()
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(TrackerError::from)?;

        Ok(Self {
            http_client,
            base_url,
            repository,
            token,
        })
    }

    /// `/repos/{owner}/{repo}/labels`
    fn labels_url(&self) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in new()
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend([
                "repos",
                self.repository.owner(),
                self.repository.name(),
                "labels",
            ]);
        }
        url
    }

    /// `/repos/{owner}/{repo}/labels/{name}`, with the name percent-encoded
    ///
    /// URL parsing collapses `.` and `..` segments (and their `%2e` forms), so
    /// such names have no address of their own and are refused.
    fn label_url(&self, name: &str) -> std::result::Result<Url, TrackerError> {
        if name.is_empty() || name == "." || name == ".." {
            return Err(TrackerError::invalid_request(format!(
                "label name '{name}' cannot be used in a URL path"
            )));
        }

        let mut url = self.labels_url();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(name);
        }
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> std::result::Result<Response, TrackerError> {
        debug!("{method} {url}");

        let mut request = self
            .http_client
            .request(method, url)
            .bearer_auth(self.token.expose_secret())
            .header(header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");

        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::error_from_response(response).await)
        }
    }

    async fn error_from_response(response: Response) -> TrackerError {
        let status = response.status();
        let quota_exhausted = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|h| h.to_str().ok())
            .is_some_and(|remaining| remaining == "0");
        let reset_in = Self::rate_limit_reset(&response);

        let message = match response.json::<GitHubError>().await {
            Ok(error) => error.message,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        };

        match status {
            StatusCode::UNAUTHORIZED => TrackerError::unauthorized(&message),
            StatusCode::TOO_MANY_REQUESTS => TrackerError::rate_limited(reset_in),
            StatusCode::FORBIDDEN if quota_exhausted => TrackerError::rate_limited(reset_in),
            _ => TrackerError::api(status.as_u16(), &message),
        }
    }

    /// Time until the rate limit window resets, from `x-ratelimit-reset`
    fn rate_limit_reset(response: &Response) -> Option<Duration> {
        response
            .headers()
            .get("x-ratelimit-reset")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.parse::<i64>().ok())
            .map(|reset_timestamp| {
                let now = chrono::Utc::now().timestamp();
                let seconds_until_reset = u64::try_from(reset_timestamp - now).unwrap_or(0);
                Duration::from_secs(seconds_until_reset)
            })
    }
}

#[async_trait::async_trait]
impl IssueTracker for GitHubClient {
    fn repository(&self) -> &RepositoryRef {
        &self.repository
    }

    async fn list_labels(&self) -> std::result::Result<Vec<Label>, TrackerError> {
        let mut labels = Vec::new();

        for page in 1u32.. {
            let mut url = self.labels_url();
            url.query_pairs_mut()
                .append_pair("per_page", &PAGE_SIZE.to_string())
                .append_pair("page", &page.to_string());

            let batch: Vec<Label> = self.send(Method::GET, url, None).await?.json().await?;
            let last_page = batch.len() < PAGE_SIZE;
            labels.extend(batch);

            if last_page {
                break;
            }
        }

        debug!(
            "Listed {} labels from {}",
            labels.len(),
            self.repository
        );
        Ok(labels)
    }

    async fn create_label(&self, label: &Label) -> std::result::Result<Label, TrackerError> {
        let body = serde_json::to_value(label).map_err(|e| TrackerError::decode(e.to_string()))?;
        let response = self
            .send(Method::POST, self.labels_url(), Some(body))
            .await?;
        Ok(response.json().await?)
    }

    async fn edit_label(
        &self,
        name: &str,
        label: &Label,
    ) -> std::result::Result<Label, TrackerError> {
        let body = serde_json::to_value(EditLabelRequest {
            new_name: &label.name,
            color: &label.color,
        })
        .map_err(|e| TrackerError::decode(e.to_string()))?;
        let response = self
            .send(Method::PATCH, self.label_url(name)?, Some(body))
            .await?;
        Ok(response.json().await?)
    }

    async fn delete_label(&self, name: &str) -> std::result::Result<(), TrackerError> {
        self.send(Method::DELETE, self.label_url(name)?, None)
            .await?;
        Ok(())
    }
}
