//! Wire transport.
//!
//! The executor talks to the network through [`HttpTransport`], so the
//! contract checks can run against a scripted transport in tests and against
//! [`BullpenClient`] in production.

use std::{env, error::Error as _, sync::Arc};

use async_trait::async_trait;
use bullpen_types::HttpMethod;
use reqwest::{Client, Method, RequestBuilder, Url, cookie::Jar, header};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::{ClientConfig, ConfigError, validate_base_url};

/// A request ready to go on the wire. `path` already carries any query string.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<Value>,
}

/// Raw response: status code plus the unparsed body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request never produced a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct NetworkError(pub String);

impl From<reqwest::Error> for NetworkError {
    /// Keeps the whole source chain; reqwest's own message omits the cause.
    fn from(error: reqwest::Error) -> Self {
        let mut message = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self(message)
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, NetworkError>;
}

#[derive(Debug, Clone)]
/// Thin wrapper around a configured `reqwest::Client` for Bullpen API access.
///
/// The client pre-configures JSON headers and a cookie jar seeded with the
/// session cookie, so every request carries the user's credentials.
pub struct BullpenClient {
    pub base_url: String,
    pub http: Client,
    pub user_agent: String,
}

impl BullpenClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        validate_base_url(&base_url)?;

        let jar = Arc::new(Jar::default());
        if let Some(cookie) = config.session_cookie_pair() {
            let url = Url::parse(&base_url).map_err(|error| ConfigError::InvalidBaseUrl {
                url: base_url.clone(),
                reason: error.to_string(),
            })?;
            jar.add_cookie_str(&cookie, &url);
        }

        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .cookie_provider(jar)
            .timeout(config.request_timeout())
            .build()
            .map_err(|error| ConfigError::InvalidBaseUrl {
                url: base_url.clone(),
                reason: format!("could not build the HTTP client: {error}"),
            })?;

        Ok(Self {
            base_url,
            http,
            user_agent: format!("bullpen/0.1; {}", env::consts::OS),
        })
    }

    /// Build a `reqwest::RequestBuilder` for a method and API-relative path.
    pub fn request(&self, method: HttpMethod, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "building request");

        self.http
            .request(reqwest_method(method), url)
            .header(header::USER_AGENT, &self.user_agent)
    }
}

#[async_trait]
impl HttpTransport for BullpenClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, NetworkError> {
        let mut builder = self.request(request.method, &request.path);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(NetworkError::from)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(NetworkError::from)?;
        Ok(HttpResponse { status, body })
    }
}

fn reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_rejects_plain_http_remote_hosts() {
        let config = ClientConfig {
            base_url: "http://coach.example.com".into(),
            ..Default::default()
        };
        assert!(BullpenClient::new(&config).is_err());
    }

    #[test]
    fn requests_are_resolved_against_the_base_url() {
        let config = ClientConfig {
            base_url: "http://localhost:5000/".into(),
            session_cookie: Some("abc".into()),
            ..Default::default()
        };
        let client = BullpenClient::new(&config).unwrap();
        let request = client.request(HttpMethod::Get, "/api/athletes?teamId=3").build().unwrap();

        assert_eq!(request.url().as_str(), "http://localhost:5000/api/athletes?teamId=3");
        assert_eq!(request.method(), Method::GET);
        assert!(request.headers().contains_key(header::USER_AGENT));
    }

    #[tokio::test]
    async fn https_urls_reach_the_connect_stage() {
        let config = ClientConfig {
            base_url: "https://127.0.0.1:1".into(),
            request_timeout_secs: 5,
            ..Default::default()
        };
        let client = BullpenClient::new(&config).unwrap();

        let error = client
            .send(HttpRequest {
                method: HttpMethod::Get,
                path: "/api/athletes".into(),
                body: None,
            })
            .await
            .unwrap_err();

        assert!(!error.0.contains("scheme is not http"), "{}", error.0);
        assert!(error.0.contains("https://127.0.0.1:1/api/athletes"), "{}", error.0);
    }
}
