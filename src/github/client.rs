//! GitHub API client.

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, LINK, USER_AGENT};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{RosterError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Page size requested from list endpoints.
pub const PER_PAGE: u32 = 100;

/// Client for interacting with the GitHub API.
#[derive(Clone)]
pub struct GitHubClient {
    pub(crate) token: String,
    pub(crate) base_url: String,
    pub(crate) client: Client,
}

impl GitHubClient {
    /// Create a new GitHub client with the given token.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_enterprise(token, DEFAULT_BASE_URL)
    }

    /// Create a client for GitHub Enterprise with a custom base URL.
    pub fn with_enterprise(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        let mut url = base_url.into();
        while url.ends_with('/') {
            url.pop();
        }
        Self {
            token: token.into(),
            base_url: url,
            client: Client::new(),
        }
    }

    /// Create a client from an optional token. A missing or blank token is
    /// a `MissingToken` error and no request is made.
    pub fn from_token(token: Option<String>, base_url: impl Into<String>) -> Result<Self> {
        let token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(RosterError::MissingToken)?;
        Ok(Self::with_enterprise(token, base_url))
    }

    /// Create a client using the GITHUB_TOKEN environment variable.
    pub fn from_env() -> Result<Self> {
        Self::from_token(std::env::var("GITHUB_TOKEN").ok(), DEFAULT_BASE_URL)
    }

    /// Get the default headers for API requests.
    pub(crate) fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|_| RosterError::InvalidToken)?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("org-roster"));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        Ok(headers)
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Make a GET request to the GitHub API.
    pub(crate) fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let response = self
            .client
            .get(self.url(endpoint))
            .headers(self.headers()?)
            .send()?;
        let response = check_status(response)?;

        response.json().map_err(|e| RosterError::MalformedResponse {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
    }

    /// GET every page of a list endpoint, following `Link: rel="next"`.
    pub(crate) fn get_paginated<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(format!("{}?per_page={}", self.url(endpoint), PER_PAGE));

        while let Some(url) = next.take() {
            debug!(%url, "fetching page");
            let response = self.client.get(&url).headers(self.headers()?).send()?;
            let response = check_status(response)?;

            next = response
                .headers()
                .get(LINK)
                .and_then(|value| value.to_str().ok())
                .and_then(next_link);

            let page: Vec<T> = response.json().map_err(|e| RosterError::MalformedResponse {
                endpoint: endpoint.to_string(),
                message: format!("expected a JSON array: {}", e),
            })?;
            items.extend(page);
        }

        Ok(items)
    }

    /// Make a PUT request with a JSON body.
    pub(crate) fn put<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .client
            .put(self.url(endpoint))
            .headers(self.headers()?)
            .json(body)
            .send()?;
        let response = check_status(response)?;

        response.json().map_err(|e| RosterError::MalformedResponse {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
    }

    /// Make a DELETE request. GitHub answers 204 (or 202 when queued).
    pub(crate) fn delete(&self, endpoint: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.url(endpoint))
            .headers(self.headers()?)
            .send()?;
        let response = check_status(response)?;

        match response.status().as_u16() {
            202 | 204 => Ok(()),
            status => Err(RosterError::Api {
                status,
                message: "unexpected status for delete".into(),
            }),
        }
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    let message = error_message(&body);
    if status == StatusCode::UNAUTHORIZED {
        return Err(RosterError::Unauthorized { message });
    }
    Err(RosterError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Pull the `message` field out of a GitHub error body, falling back to the
/// raw text.
pub(crate) fn error_message(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: String,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.message,
        Err(_) if body.trim().is_empty() => "<empty body>".into(),
        Err(_) => body.trim().to_string(),
    }
}

/// Find the `rel="next"` target in a `Link` header.
pub(crate) fn next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let mut sections = part.split(';');
        let target = sections.next()?.trim();
        let is_next = sections.any(|param| {
            let param = param.trim();
            param == r#"rel="next""# || param == "rel=next"
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::to_string)
    })
}
