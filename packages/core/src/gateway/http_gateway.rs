//! HTTP Gateway
//!
//! `reqwest` implementation of [`SyncGateway`] for the CRIPT REST API. Every
//! request carries the raw token in `Authorization` and a JSON content type,
//! except File saves, which upload the local `source` file as multipart form
//! data.

use crate::gateway::{GatewayConfig, GatewayError, RemoteResponse, SyncGateway};
use crate::models::slug_from_url;
use crate::validation::Vocabulary;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde_json::{Map, Value};
use std::path::Path;

const FILE_SLUG: &str = "file";

pub struct HttpGateway {
    client: Client,
    base_url: String,
    vocabulary_path: String,
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Status and body; bodies that are not JSON are kept as a string
async fn read_body(response: Response) -> Result<(StatusCode, Value), GatewayError> {
    let status = response.status();
    let text = response.text().await?;
    let body = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    };
    Ok((status, body))
}

/// Multipart form holding the file named by the payload's `source`
async fn upload_form(payload: &Value) -> Result<Form, GatewayError> {
    let source = payload
        .get("source")
        .and_then(Value::as_str)
        .filter(|source| !source.is_empty())
        .ok_or_else(|| GatewayError::io("source", "File payload has no source path"))?;
    let bytes = tokio::fs::read(source)
        .await
        .map_err(|e| GatewayError::io(source, e.to_string()))?;

    let mut part = Part::bytes(bytes);
    if let Some(name) = Path::new(source).file_name().and_then(|n| n.to_str()) {
        part = part.file_name(name.to_string());
    }
    tracing::debug!(source, "Uploading file");
    Ok(Form::new().part("file", part))
}

fn body_text(body: &Value) -> String {
    match body {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

impl HttpGateway {
    /// Build a client from a validated configuration
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        let mut token = HeaderValue::from_str(&config.token)
            .map_err(|_| GatewayError::config("token contains invalid header characters"))?;
        token.set_sensitive(true);
        headers.insert(AUTHORIZATION, token);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| GatewayError::config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.normalized_base_url().to_string(),
            vocabulary_path: config.vocabulary_path.trim_start_matches('/').to_string(),
        })
    }

    /// Gateway configured from `CRIPT_*` environment variables
    pub fn from_env() -> Result<Self, GatewayError> {
        Self::new(&GatewayConfig::from_env()?)
    }

    fn collection_url(&self, slug: &str) -> String {
        format!("{}/{}/", self.base_url, slug)
    }

    async fn get_json(&self, url: &str) -> Result<Value, GatewayError> {
        let response = self.client.get(url).send().await?;
        let (status, body) = read_body(response).await?;
        match status {
            StatusCode::OK => Ok(body),
            StatusCode::NOT_FOUND => Err(GatewayError::not_found(url)),
            StatusCode::UNAUTHORIZED => Err(GatewayError::auth(detail_of(&body))),
            other => Err(GatewayError::http(other.as_u16(), body_text(&body))),
        }
    }
}

fn detail_of(body: &Value) -> String {
    body.get("detail")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| body_text(body))
}

#[async_trait]
impl SyncGateway for HttpGateway {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn verify(&self) -> Result<(), GatewayError> {
        let response = self.client.get(&self.base_url).send().await?;
        let (status, body) = read_body(response).await?;
        if status == StatusCode::UNAUTHORIZED {
            return Err(GatewayError::auth(detail_of(&body)));
        }
        tracing::info!(base_url = %self.base_url, "Connected to CRIPT API");
        Ok(())
    }

    async fn fetch_vocabulary(&self) -> Result<Vocabulary, GatewayError> {
        let url = format!("{}/{}", self.base_url, self.vocabulary_path);
        let body = self.get_json(&url).await?;
        serde_json::from_value(body).map_err(|e| GatewayError::decode(e.to_string()))
    }

    async fn create(&self, slug: &str, payload: &Value) -> Result<RemoteResponse, GatewayError> {
        let request = self.client.post(self.collection_url(slug));
        // the multipart content type replaces the default JSON one
        let request = if slug == FILE_SLUG {
            request.multipart(upload_form(payload).await?)
        } else {
            request.json(payload)
        };
        let (status, body) = read_body(request.send().await?).await?;
        Ok(RemoteResponse::new(status.as_u16(), body))
    }

    async fn update(&self, url: &str, payload: &Value) -> Result<RemoteResponse, GatewayError> {
        let request = self.client.put(url);
        let request = if slug_from_url(url) == Some(FILE_SLUG) {
            request.multipart(upload_form(payload).await?)
        } else {
            request.json(payload)
        };
        let (status, body) = read_body(request.send().await?).await?;
        Ok(RemoteResponse::new(status.as_u16(), body))
    }

    async fn fetch(&self, url: &str) -> Result<Map<String, Value>, GatewayError> {
        match self.get_json(url).await? {
            Value::Object(record) => Ok(record),
            other => Err(GatewayError::decode(format!(
                "expected a JSON object from {url}, got {other}"
            ))),
        }
    }

    async fn query(&self, slug: &str, query: &str) -> Result<Value, GatewayError> {
        let mut url = self.collection_url(slug);
        if !query.is_empty() {
            url.push('?');
            url.push_str(query);
        }
        self.get_json(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_paths() {
        let config = GatewayConfig {
            vocabulary_path: "/keys/".to_string(),
            ..GatewayConfig::new("https://criptapp.org/api/", "token")
        };
        let gateway = HttpGateway::new(&config).unwrap();
        assert_eq!(gateway.base_url(), "https://criptapp.org/api");
        assert_eq!(gateway.vocabulary_path, "keys/");
        assert_eq!(
            gateway.collection_url("material"),
            "https://criptapp.org/api/material/"
        );
    }

    #[test]
    fn test_new_rejects_missing_token() {
        let config = GatewayConfig::new("https://criptapp.org/api", "");
        assert!(matches!(
            HttpGateway::new(&config),
            Err(GatewayError::Config(_))
        ));
    }

    #[test]
    fn test_file_save_reads_source_before_sending() {
        let config = GatewayConfig::new("https://criptapp.org/api", "token");
        let gateway = HttpGateway::new(&config).unwrap();
        let missing = "/nonexistent/cript/sample.csv";
        let payload = serde_json::json!({"source": missing, "type": "data"});

        let err = tokio_test::block_on(gateway.create("file", &payload)).unwrap_err();
        assert!(matches!(err, GatewayError::Io { ref path, .. } if path == missing));

        let err = tokio_test::block_on(
            gateway.update("https://criptapp.org/api/file/4/", &payload),
        )
        .unwrap_err();
        assert!(matches!(err, GatewayError::Io { .. }));
    }

    #[test]
    fn test_upload_form_requires_source() {
        let payload = serde_json::json!({"name": "sample"});
        let err = tokio_test::block_on(upload_form(&payload)).unwrap_err();
        assert!(matches!(err, GatewayError::Io { ref path, .. } if path == "source"));
    }

    #[test]
    fn test_upload_form_reads_existing_file() {
        let path = std::env::temp_dir().join("cript_upload_form_test.csv");
        std::fs::write(&path, "x,y\n1,2\n").unwrap();
        let payload = serde_json::json!({"source": path.to_str().unwrap()});
        let form = tokio_test::block_on(upload_form(&payload)).unwrap();
        assert!(!form.boundary().is_empty());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_detail_of_prefers_detail_field() {
        let body = serde_json::json!({"detail": "Invalid token."});
        assert_eq!(detail_of(&body), "Invalid token.");
        assert_eq!(detail_of(&Value::String("nope".into())), "nope");
    }
}
