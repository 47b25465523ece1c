//! HTTP seam used by the client.
//!
//! [`HttpTransport`] talks to the network through `reqwest`. Anything else
//! implementing [`Transport`] (a proxy, a recorder, a scripted fake in tests)
//! can be plugged in with [`LiblibClient::with_transport`](crate::LiblibClient::with_transport).

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;

use crate::error::{LiblibError, Result};

/// Raw response as seen by the transport: status code and body bytes.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Convert a non-2xx response into [`LiblibError::Service`].
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(LiblibError::Service {
                status: self.status,
                body: String::from_utf8_lossy(&self.body).into_owned(),
            })
        }
    }
}

/// A `multipart/form-data` body: text fields in order, then one file part.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipartForm {
    pub fields: Vec<(String, String)>,
    pub file_field: String,
    pub file_name: String,
    pub file: Vec<u8>,
}

impl MultipartForm {
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(name, _)| name.as_str()).collect()
    }
}

/// Sends one request and returns the raw response.
///
/// Implementations report network failures as [`LiblibError::Transport`] and
/// return non-2xx responses as ordinary values.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, method: Method, url: &str, body: Option<&Value>) -> Result<TransportResponse>;

    /// POST a multipart form, used for file uploads to object storage.
    ///
    /// Transports that only speak JSON can leave this out; uploads through
    /// them fail with [`LiblibError::Configuration`].
    async fn send_multipart(&self, url: &str, form: MultipartForm) -> Result<TransportResponse> {
        let _ = form;
        Err(LiblibError::Configuration(format!(
            "transport cannot send multipart uploads (to {})",
            url
        )))
    }
}

/// `reqwest`-backed transport sending JSON bodies.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    timeout: Duration,
    headers: HeaderMap,
}

impl HttpTransport {
    pub fn new(http: Client, timeout: Duration, user_agent: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(ua) = HeaderValue::from_str(user_agent) {
            headers.insert(USER_AGENT, ua);
        }
        Self {
            http,
            timeout,
            headers,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, method: Method, url: &str, body: Option<&Value>) -> Result<TransportResponse> {
        let mut req = self
            .http
            .request(method, url)
            .timeout(self.timeout)
            .headers(self.headers.clone());
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| LiblibError::transport("Cannot connect to LiblibAI", e))?;
        let status = resp.status().as_u16();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| LiblibError::transport("Failed to read LiblibAI response body", e))?;

        Ok(TransportResponse {
            status,
            body: bytes.to_vec(),
        })
    }

    async fn send_multipart(&self, url: &str, form: MultipartForm) -> Result<TransportResponse> {
        let mut body = Form::new();
        for (name, value) in form.fields {
            body = body.text(name, value);
        }
        body = body.part(form.file_field, Part::bytes(form.file).file_name(form.file_name));

        // reqwest sets the multipart content type itself
        let mut req = self.http.post(url).timeout(self.timeout);
        if let Some(ua) = self.headers.get(USER_AGENT) {
            req = req.header(USER_AGENT, ua.clone());
        }

        let resp = req
            .multipart(body)
            .send()
            .await
            .map_err(|e| LiblibError::transport("Failed to upload file to storage", e))?;
        let status = resp.status().as_u16();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| LiblibError::transport("Failed to read storage response body", e))?;

        Ok(TransportResponse {
            status,
            body: bytes.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_range() {
        for status in [200, 201, 204, 299] {
            let resp = TransportResponse { status, body: vec![] };
            assert!(resp.is_success());
        }
        for status in [199, 301, 400, 500] {
            let resp = TransportResponse { status, body: vec![] };
            assert!(!resp.is_success());
        }
    }

    #[test]
    fn test_error_for_status_carries_body() {
        let resp = TransportResponse {
            status: 403,
            body: br#"{"code":403,"msg":"signature expired"}"#.to_vec(),
        };
        match resp.error_for_status() {
            Err(LiblibError::Service { status, body }) => {
                assert_eq!(status, 403);
                assert!(body.contains("signature expired"));
            }
            other => panic!("expected Service error, got {:?}", other.map(|r| r.status)),
        }
    }

    struct JsonOnly;

    #[async_trait]
    impl Transport for JsonOnly {
        async fn send(&self, _: Method, _: &str, _: Option<&Value>) -> Result<TransportResponse> {
            Ok(TransportResponse { status: 200, body: vec![] })
        }
    }

    #[tokio::test]
    async fn test_multipart_unsupported_by_default() {
        let form = MultipartForm {
            fields: vec![("key".into(), "img/a.png".into())],
            file_field: "file".into(),
            file_name: "a.png".into(),
            file: vec![1, 2, 3],
        };
        assert_eq!(form.field_names(), vec!["key"]);
        let err = JsonOnly.send_multipart("https://bucket", form).await.unwrap_err();
        assert!(matches!(err, LiblibError::Configuration(_)));
    }

    #[test]
    fn test_http_transport_headers() {
        let t = HttpTransport::new(Client::new(), Duration::from_secs(1), "liblibai-rs/test");
        assert_eq!(t.headers[CONTENT_TYPE], "application/json");
        assert_eq!(t.headers[USER_AGENT], "liblibai-rs/test");
    }
}
