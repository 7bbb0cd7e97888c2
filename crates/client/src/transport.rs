//! The HTTP seam of the client.
//!
//! [`FhirClient`](crate::FhirClient) builds complete [`HttpRequest`]s and
//! interprets [`HttpResponse`]s; moving bytes is left to an
//! [`HttpTransport`]. The default transport is a blocking `reqwest` client.
//! Tests substitute a scripted one.

use std::time::Duration;

use http::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use http::{Method, StatusCode};
use thiserror::Error;
use url::Url;

/// A transport level failure: the server produced no answer.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request to '{url}' timed out")]
    Timeout { url: String },

    #[error("failed to connect to '{url}': {message}")]
    Connection { url: String, message: String },

    #[error("transport error: {0}")]
    Other(String),
}

/// A request ready to be sent.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers
            .get(name.as_ref())
            .and_then(|value| value.to_str().ok())
    }

    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    pub fn body_text(&self) -> Option<String> {
        self.body
            .as_deref()
            .map(|body| String::from_utf8_lossy(body).into_owned())
    }
}

/// A received response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// `None` when the server sent no content.
    pub body: Option<Vec<u8>>,
}

impl HttpResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers
            .get(name.as_ref())
            .and_then(|value| value.to_str().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE)
    }

    /// The body as text, lossily decoded. Empty when there is no body.
    pub fn body_text(&self) -> String {
        self.body
            .as_deref()
            .map(|body| String::from_utf8_lossy(body).into_owned())
            .unwrap_or_default()
    }
}

/// Sends one request and waits for its response.
///
/// Implementations report only failures to obtain a response. Any status the
/// server answers with is a successful exchange at this level.
pub trait HttpTransport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport on top of `reqwest`.
#[cfg(feature = "reqwest-transport")]
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "reqwest-transport")]
impl ReqwestTransport {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Other(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn from_config(config: &crate::config::ClientConfig) -> Result<Self, TransportError> {
        Self::new(config.timeout_duration(), &config.user_agent)
    }

    fn map_error(url: &Url, error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout {
                url: url.to_string(),
            }
        } else if error.is_connect() {
            TransportError::Connection {
                url: url.to_string(),
                message: error.to_string(),
            }
        } else {
            TransportError::Other(error.to_string())
        }
    }
}

#[cfg(feature = "reqwest-transport")]
impl HttpTransport for ReqwestTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .map_err(|e| Self::map_error(&request.url, e))?;

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .bytes()
            .map_err(|e| Self::map_error(&request.url, e))?;

        Ok(HttpResponse {
            status,
            headers,
            body: (!bytes.is_empty()).then(|| bytes.to_vec()),
        })
    }
}

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_header_lookup() {
        let mut response = HttpResponse::new(StatusCode::OK);
        response.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/fhir+json; charset=UTF-8"),
        );
        assert_eq!(
            response.content_type(),
            Some("application/fhir+json; charset=UTF-8")
        );
        assert_eq!(response.header("content-type"), response.content_type());
        assert_eq!(response.header("location"), None);
    }

    #[test]
    fn test_empty_body_text() {
        assert_eq!(HttpResponse::new(StatusCode::NO_CONTENT).body_text(), "");
    }

    #[cfg(feature = "reqwest-transport")]
    #[test]
    fn test_reqwest_transport_builds() {
        assert!(ReqwestTransport::new(DEFAULT_TIMEOUT, "helios-fhir-client-test").is_ok());
    }
}
