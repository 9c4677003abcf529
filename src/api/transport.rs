//! HTTP transport for the integration API
use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use url::Url;

use crate::errors::{Error, Result};

/// Form fields sent as the request body
pub type Form = Vec<(&'static str, String)>;

/// One outbound request, normalized into a JSON value or a typed error
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `method` to `base_url/path`
    ///
    /// JSON responses are decoded, anything else comes back as
    /// `Value::String` with the raw body. 401 and 403 map to
    /// `Error::Unauthorized` and `Error::Forbidden`, every other failure to
    /// `Error::Request`.
    async fn request(
        &self,
        method: Method,
        base_url: &str,
        path: &str,
        data: Option<Form>,
    ) -> Result<Value>;

    /// Replace the bearer token, `None` reverts to unauthenticated requests
    fn set_bearer_token(&mut self, token: Option<String>);

    fn bearer_token(&self) -> Option<&str>;
}

/// Join a base URL and a path segment with exactly one `/`
pub fn join_url(base_url: &str, path: &str) -> Result<Url> {
    let joined = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|e| Error::request(joined.as_str(), format!("Invalid URL: {}", e)))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

/// `Transport` over a shared reqwest session
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    session: reqwest::Client,
    bearer_token: Option<String>,
}

impl HttpTransport {
    pub fn new(session: reqwest::Client) -> Self {
        HttpTransport {
            session,
            bearer_token: None,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        method: Method,
        base_url: &str,
        path: &str,
        data: Option<Form>,
    ) -> Result<Value> {
        let url = join_url(base_url, path)?;
        debug!("{} {}", method, url);

        let mut request = self.session.request(method, url.clone());
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }
        if let Some(form) = &data {
            request = request.form(form);
        }

        let response = request.send().await?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            debug!("{} returned {}: {}", url, status, body);

            return Err(match status {
                StatusCode::UNAUTHORIZED => Error::Unauthorized(body),
                StatusCode::FORBIDDEN => Error::Forbidden(body),
                _ => {
                    let reason = status.canonical_reason().unwrap_or("HTTP error");
                    let message = if body.trim().is_empty() {
                        reason.to_string()
                    } else {
                        format!("{}: {}", reason, body.trim())
                    };
                    Error::status(status.as_u16(), url.as_str(), message)
                }
            });
        }

        let json = is_json(response.headers());
        let body = response.text().await?;

        if !json {
            return Ok(Value::String(body));
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::request(url.as_str(), format!("Malformed JSON: {}", e)))
    }

    fn set_bearer_token(&mut self, token: Option<String>) {
        self.bearer_token = token;
    }

    fn bearer_token(&self) -> Option<&str> {
        self.bearer_token.as_deref()
    }
}
