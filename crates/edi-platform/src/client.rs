//! reqwest-backed [`Platform`] implementation.
//!
//! # Design
//! - One `reqwest::Client` carries TLS, proxy, and default headers for both
//!   REST calls and pre-signed downloads.
//! - Basic auth is attached per request; non-2xx responses become
//!   [`PlatformError::Status`] with the response body.
//! - Ids are appended as path segments so they are percent-encoded.

use std::fs;
use std::path::Path;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_DISPOSITION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Certificate, Client, Identity, Method, Proxy, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::disposition::{attachment_header, filename_from_header};
use crate::error::{PlatformError, PlatformResult};
use crate::model::{AttachmentPayload, Confirmation, MessageAttachment, Transmission, TransmissionList};
use crate::platform::Platform;
use crate::settings::PlatformSettings;

const API_PREFIX: [&str; 2] = ["rest", "v2"];

/// Authenticated HTTPS/JSON client for the platform.
#[derive(Debug, Clone)]
pub struct PlatformClient {
    http: Client,
    base_url: Url,
    username: String,
    password: String,
}

impl PlatformClient {
    /// Build a client, reading proxy fallbacks from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL, TLS material, or proxy is invalid.
    pub fn new(settings: &PlatformSettings) -> PlatformResult<Self> {
        Self::with_env(settings, |name| std::env::var(name).ok())
    }

    /// Build a client using `lookup` in place of the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL, TLS material, or proxy is invalid.
    pub fn with_env<F>(settings: &PlatformSettings, lookup: F) -> PlatformResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url =
            Url::parse(&settings.base_url).map_err(|source| PlatformError::InvalidUrl {
                url: settings.base_url.clone(),
                source,
            })?;
        if base_url.cannot_be_a_base() {
            return Err(PlatformError::UnsupportedUrl {
                url: settings.base_url.clone(),
            });
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder()
            .user_agent(edi_telemetry::user_agent())
            .default_headers(headers)
            .no_proxy();

        if let Some(path) = settings.client_certificate.as_deref() {
            if path.exists() {
                let pem = read_tls_material(path)?;
                let identity =
                    Identity::from_pem(&pem).map_err(|source| PlatformError::TlsParse {
                        path: path.to_path_buf(),
                        source,
                    })?;
                builder = builder.identity(identity);
            } else {
                tracing::warn!(
                    path = %path.display(),
                    "client certificate not found; continuing without client identity"
                );
            }
        }

        if let Some(path) = settings.ca_file.as_deref() {
            let pem = read_tls_material(path)?;
            let roots =
                Certificate::from_pem_bundle(&pem).map_err(|source| PlatformError::TlsParse {
                    path: path.to_path_buf(),
                    source,
                })?;
            builder = builder.tls_built_in_root_certs(false);
            for root in roots {
                builder = builder.add_root_certificate(root);
            }
        }

        if let Some(proxy_url) = settings.resolve_proxy(lookup) {
            let proxy = Proxy::all(&proxy_url).map_err(|source| PlatformError::Proxy {
                url: proxy_url.clone(),
                source,
            })?;
            tracing::debug!(proxy = %proxy_url, "routing platform traffic through proxy");
            builder = builder.proxy(proxy);
        }

        let http = builder
            .build()
            .map_err(|source| PlatformError::ClientBuild { source })?;

        Ok(Self {
            http,
            base_url,
            username: settings.username.clone(),
            password: settings.password.clone(),
        })
    }

    /// Base URL all REST paths are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> PlatformResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| PlatformError::UnsupportedUrl {
                url: self.base_url.to_string(),
            })?
            .pop_if_empty()
            .extend(API_PREFIX)
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .basic_auth(&self.username, Some(&self.password))
    }

    async fn send(
        &self,
        operation: &'static str,
        url: &Url,
        request: RequestBuilder,
    ) -> PlatformResult<Response> {
        tracing::debug!(operation, url = %url, "platform request");
        let response = request
            .send()
            .await
            .map_err(|source| PlatformError::Request {
                operation,
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.bytes().await.unwrap_or_default();
        Err(PlatformError::Status {
            operation,
            url: url.to_string(),
            status: status.as_u16(),
            body: String::from_utf8_lossy(&body).trim().to_string(),
        })
    }

    async fn read_bytes(
        operation: &'static str,
        url: &Url,
        response: Response,
    ) -> PlatformResult<Vec<u8>> {
        response
            .bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .map_err(|source| PlatformError::Request {
                operation,
                url: url.to_string(),
                source,
            })
    }

    async fn read_json<T: DeserializeOwned>(
        operation: &'static str,
        url: &Url,
        response: Response,
    ) -> PlatformResult<T> {
        let bytes = Self::read_bytes(operation, url, response).await?;
        serde_json::from_slice(&bytes).map_err(|source| PlatformError::Decode {
            operation,
            url: url.to_string(),
            source,
        })
    }

    fn parse_download_url(raw: &str) -> PlatformResult<Url> {
        Url::parse(raw).map_err(|source| PlatformError::InvalidUrl {
            url: raw.to_string(),
            source,
        })
    }
}

#[async_trait]
impl Platform for PlatformClient {
    async fn list_transmissions(&self, config_id: &str) -> PlatformResult<Vec<Transmission>> {
        const OPERATION: &str = "transmissions.list";
        let mut url = self.endpoint(&["transmissions"])?;
        url.query_pairs_mut().append_pair("configID", config_id);
        let response = self
            .send(OPERATION, &url, self.request(Method::GET, url.clone()))
            .await?;
        let list: TransmissionList = Self::read_json(OPERATION, &url, response).await?;
        Ok(list.transmissions)
    }

    async fn download_transmission(&self, transmission: &Transmission) -> PlatformResult<Vec<u8>> {
        const OPERATION: &str = "transmissions.download";
        let url = Self::parse_download_url(&transmission.url)?;
        let response = self
            .send(OPERATION, &url, self.request(Method::GET, url.clone()))
            .await?;
        Self::read_bytes(OPERATION, &url, response).await
    }

    async fn confirm_transmission(&self, id: &str) -> PlatformResult<()> {
        const OPERATION: &str = "transmissions.confirm";
        let url = self.endpoint(&["transmissions", id, "confirm"])?;
        let request = self
            .request(Method::POST, url.clone())
            .json(&Confirmation::processed(id));
        self.send(OPERATION, &url, request).await?;
        Ok(())
    }

    async fn add_transmission(&self, config_id: &str, data: &[u8]) -> PlatformResult<()> {
        const OPERATION: &str = "transmissions.add";
        let mut url = self.endpoint(&["transmissions"])?;
        url.query_pairs_mut().append_pair("configID", config_id);
        let request = self.request(Method::POST, url.clone()).body(data.to_vec());
        self.send(OPERATION, &url, request).await?;
        Ok(())
    }

    async fn add_attachment(&self, data: &[u8], filename: &str) -> PlatformResult<()> {
        const OPERATION: &str = "attachments.add";
        let url = self.endpoint(&["attachments"])?;
        let request = self
            .request(Method::POST, url.clone())
            .header(
                CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            )
            .header(CONTENT_DISPOSITION, attachment_header(filename)?)
            .body(data.to_vec());
        self.send(OPERATION, &url, request).await?;
        Ok(())
    }

    async fn list_message_attachments(
        &self,
        message_id: &str,
    ) -> PlatformResult<Vec<MessageAttachment>> {
        const OPERATION: &str = "attachments.list";
        let url = self.endpoint(&["messages", message_id, "attachments"])?;
        let response = self
            .send(OPERATION, &url, self.request(Method::GET, url.clone()))
            .await?;
        let attachments: Option<Vec<MessageAttachment>> =
            Self::read_json(OPERATION, &url, response).await?;
        Ok(attachments.unwrap_or_default())
    }

    async fn download_attachment(
        &self,
        attachment: &MessageAttachment,
    ) -> PlatformResult<AttachmentPayload> {
        const OPERATION: &str = "attachments.download";
        let url = Self::parse_download_url(&attachment.url)?;
        let response = self
            .send(OPERATION, &url, self.request(Method::GET, url.clone()))
            .await?;
        let filename = filename_from_header(response.headers().get(CONTENT_DISPOSITION));
        let content = Self::read_bytes(OPERATION, &url, response).await?;
        Ok(AttachmentPayload { content, filename })
    }
}

fn read_tls_material(path: &Path) -> PlatformResult<Vec<u8>> {
    fs::read(path).map_err(|source| PlatformError::TlsRead {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use base64::{Engine as _, engine::general_purpose};
    use httpmock::prelude::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn client_for(server: &MockServer) -> Result<PlatformClient> {
        let settings = PlatformSettings {
            base_url: server.base_url(),
            username: "user".to_string(),
            password: "secret".to_string(),
            ..PlatformSettings::default()
        };
        Ok(PlatformClient::with_env(&settings, |_| None)?)
    }

    fn basic_auth() -> String {
        format!("Basic {}", general_purpose::STANDARD.encode("user:secret"))
    }

    #[tokio::test]
    async fn every_request_carries_identity_headers() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/rest/v2/transmissions")
                .query_param("configID", "cfgA")
                .header("authorization", basic_auth())
                .header("accept", "application/json")
                .header("user-agent", edi_telemetry::user_agent());
            then.status(200).json_body(json!({"transmissions": []}));
        });

        let client = client_for(&server)?;
        let transmissions = client.list_transmissions("cfgA").await?;
        assert!(transmissions.is_empty());
        mock.assert();
        Ok(())
    }

    #[tokio::test]
    async fn list_transmissions_decodes_payload() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/rest/v2/transmissions")
                .query_param("configID", "cfgB");
            then.status(200).json_body(json!({
                "transmissions": [{
                    "id": "T1",
                    "url": "https://files.example.com/T1",
                    "hash": {"method": "sha256", "sum": "00"},
                    "test": false,
                    "metadata": {"TID": "M1", "filename": "in.csv"}
                }]
            }));
        });

        let client = client_for(&server)?;
        let transmissions = client.list_transmissions("cfgB").await?;
        assert_eq!(transmissions.len(), 1);
        assert_eq!(transmissions[0].id, "T1");
        assert_eq!(transmissions[0].tid(), Some("M1"));
        mock.assert();
        Ok(())
    }

    #[tokio::test]
    async fn non_success_status_carries_body() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/rest/v2/transmissions");
            then.status(503).body("maintenance");
        });

        let client = client_for(&server)?;
        let err = client
            .list_transmissions("cfgA")
            .await
            .err()
            .ok_or_else(|| anyhow::anyhow!("expected status error"))?;
        assert!(matches!(
            &err,
            PlatformError::Status { status: 503, body, .. } if body == "maintenance"
        ));
        Ok(())
    }

    #[tokio::test]
    async fn malformed_json_is_a_decode_error() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/rest/v2/transmissions");
            then.status(200).body("{not json");
        });

        let client = client_for(&server)?;
        let result = client.list_transmissions("cfgA").await;
        assert!(matches!(result, Err(PlatformError::Decode { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn confirm_posts_processed_message() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/rest/v2/transmissions/T1/confirm")
                .header("content-type", "application/json")
                .json_body(json!({"error": false, "message": "processed transmission T1"}));
            then.status(200);
        });

        let client = client_for(&server)?;
        client.confirm_transmission("T1").await?;
        mock.assert();
        Ok(())
    }

    #[tokio::test]
    async fn ids_are_percent_encoded_in_paths() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path("/rest/v2/messages/M%2F1/attachments");
            then.status(200).json_body(json!([]));
        });

        let client = client_for(&server)?;
        let attachments = client.list_message_attachments("M/1").await?;
        assert!(attachments.is_empty());
        mock.assert();
        Ok(())
    }

    #[tokio::test]
    async fn add_transmission_posts_raw_body() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/rest/v2/transmissions")
                .query_param("configID", "cfgA")
                .body("hello");
            then.status(200);
        });

        let client = client_for(&server)?;
        client.add_transmission("cfgA", b"hello").await?;
        mock.assert();
        Ok(())
    }

    #[tokio::test]
    async fn add_attachment_sets_disposition_and_octet_stream() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/rest/v2/attachments")
                .header("content-type", "application/octet-stream")
                .header("content-disposition", "attachment; filename=\"drawing.pdf\"")
                .body("PDFDATA");
            then.status(200);
        });

        let client = client_for(&server)?;
        client.add_attachment(b"PDFDATA", "drawing.pdf").await?;
        mock.assert();
        Ok(())
    }

    #[tokio::test]
    async fn attachments_are_listed_and_downloaded_with_filename() -> Result<()> {
        let server = MockServer::start_async().await;
        let list = server.mock(|when, then| {
            when.method(GET).path("/rest/v2/messages/M1/attachments");
            then.status(200)
                .json_body(json!([{"url": server.url("/files/a1"), "item_id": "a1"}]));
        });
        let download = server.mock(|when, then| {
            when.method(GET)
                .path("/files/a1")
                .header("authorization", basic_auth());
            then.status(200)
                .header("content-disposition", "attachment; filename=\"drawing.pdf\"")
                .body("PDFDATA");
        });

        let client = client_for(&server)?;
        let attachments = client.list_message_attachments("M1").await?;
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].item_id, "a1");

        let payload = client.download_attachment(&attachments[0]).await?;
        assert_eq!(payload.content, b"PDFDATA");
        assert_eq!(payload.filename, "drawing.pdf");
        list.assert();
        download.assert();
        Ok(())
    }

    #[tokio::test]
    async fn download_without_disposition_has_empty_filename() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/files/a2");
            then.status(200).body("bytes");
        });

        let client = client_for(&server)?;
        let payload = client
            .download_attachment(&MessageAttachment {
                url: server.url("/files/a2"),
                item_id: "a2".to_string(),
            })
            .await?;
        assert_eq!(payload.filename, "");
        assert_eq!(payload.content, b"bytes");
        Ok(())
    }

    #[tokio::test]
    async fn download_transmission_uses_presigned_url() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/signed/T1")
                .query_param("sig", "abc")
                .header("user-agent", edi_telemetry::user_agent());
            then.status(200).body("c1;c2");
        });

        let client = client_for(&server)?;
        let transmission = Transmission {
            id: "T1".to_string(),
            url: server.url("/signed/T1?sig=abc"),
            ..Transmission::default()
        };
        let bytes = client.download_transmission(&transmission).await?;
        assert_eq!(bytes, b"c1;c2");
        mock.assert();
        Ok(())
    }

    #[test]
    fn base_url_path_prefix_is_preserved() -> Result<()> {
        let settings = PlatformSettings {
            base_url: "https://edi.example.com/tenant/".to_string(),
            ..PlatformSettings::default()
        };
        let client = PlatformClient::with_env(&settings, |_| None)?;
        let url = client.endpoint(&["transmissions", "a b", "confirm"])?;
        assert_eq!(
            url.as_str(),
            "https://edi.example.com/tenant/rest/v2/transmissions/a%20b/confirm"
        );
        Ok(())
    }

    #[test]
    fn construction_rejects_bad_inputs() -> Result<()> {
        let invalid = PlatformSettings {
            base_url: "not a url".to_string(),
            ..PlatformSettings::default()
        };
        assert!(matches!(
            PlatformClient::with_env(&invalid, |_| None),
            Err(PlatformError::InvalidUrl { .. })
        ));

        let dir = tempfile::tempdir()?;
        let missing_ca = PlatformSettings {
            base_url: "https://edi.example.com".to_string(),
            ca_file: Some(dir.path().join("missing-ca.pem")),
            ..PlatformSettings::default()
        };
        assert!(matches!(
            PlatformClient::with_env(&missing_ca, |_| None),
            Err(PlatformError::TlsRead { .. })
        ));

        let garbage = dir.path().join("client.pem");
        fs::write(&garbage, "not a pem bundle")?;
        let bad_identity = PlatformSettings {
            base_url: "https://edi.example.com".to_string(),
            client_certificate: Some(garbage),
            ..PlatformSettings::default()
        };
        assert!(matches!(
            PlatformClient::with_env(&bad_identity, |_| None),
            Err(PlatformError::TlsParse { .. })
        ));
        Ok(())
    }

    #[test]
    fn missing_client_certificate_is_tolerated() -> Result<()> {
        let settings = PlatformSettings {
            base_url: "https://edi.example.com".to_string(),
            client_certificate: Some(PathBuf::from("/definitely/missing/client.pem")),
            ..PlatformSettings::default()
        };
        PlatformClient::with_env(&settings, |_| None)?;
        Ok(())
    }

    #[test]
    fn environment_proxy_is_validated() {
        let settings = PlatformSettings {
            base_url: "https://edi.example.com".to_string(),
            ..PlatformSettings::default()
        };
        let result = PlatformClient::with_env(&settings, |name| {
            (name == "HTTP_PROXY").then(|| "http://proxy.internal:3128".to_string())
        });
        assert!(result.is_ok());
    }
}
