//! Scripted in-memory [`Platform`] that records every call.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use edi_platform::{
    AttachmentPayload, MessageAttachment, Platform, PlatformError, PlatformResult, Transmission,
};

/// One recorded platform call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    /// `list_transmissions(config_id)`.
    ListTransmissions(String),
    /// `download_transmission(t)` with the transmission id.
    DownloadTransmission(String),
    /// `confirm_transmission(id)`.
    ConfirmTransmission(String),
    /// `add_transmission(config_id, data)`.
    AddTransmission {
        /// Config id.
        config_id: String,
        /// Uploaded bytes.
        data: Vec<u8>,
    },
    /// `add_attachment(data, filename)`.
    AddAttachment {
        /// Announced file name.
        filename: String,
        /// Uploaded bytes.
        data: Vec<u8>,
    },
    /// `list_message_attachments(message_id)`.
    ListMessageAttachments(String),
    /// `download_attachment(a)` with the attachment URL.
    DownloadAttachment(String),
}

impl PlatformCall {
    /// Operation name matching the keys accepted by [`FakePlatform::fail`].
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::ListTransmissions(_) => "list_transmissions",
            Self::DownloadTransmission(_) => "download_transmission",
            Self::ConfirmTransmission(_) => "confirm_transmission",
            Self::AddTransmission { .. } => "add_transmission",
            Self::AddAttachment { .. } => "add_attachment",
            Self::ListMessageAttachments(_) => "list_message_attachments",
            Self::DownloadAttachment(_) => "download_attachment",
        }
    }
}

#[derive(Default)]
struct FakeState {
    calls: Vec<PlatformCall>,
    transmissions: HashMap<String, Vec<Transmission>>,
    downloads: HashMap<String, Vec<u8>>,
    attachments: HashMap<String, Vec<MessageAttachment>>,
    attachment_downloads: HashMap<String, AttachmentPayload>,
    failures: HashMap<&'static str, u16>,
    delays: HashMap<&'static str, Duration>,
}

/// In-memory platform with scripted responses.
///
/// Unscripted downloads answer with status 404; unscripted listings are
/// empty.
#[derive(Default)]
pub struct FakePlatform {
    state: Mutex<FakeState>,
}

impl FakePlatform {
    /// Empty platform.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `transmissions` for `config_id`.
    #[must_use]
    pub fn with_transmissions(self, config_id: &str, transmissions: Vec<Transmission>) -> Self {
        self.lock()
            .transmissions
            .insert(config_id.to_string(), transmissions);
        self
    }

    /// Serve `content` when `url` is downloaded as a transmission.
    #[must_use]
    pub fn with_download(self, url: &str, content: impl Into<Vec<u8>>) -> Self {
        self.lock().downloads.insert(url.to_string(), content.into());
        self
    }

    /// Serve `attachments` for `message_id`.
    #[must_use]
    pub fn with_attachments(self, message_id: &str, attachments: Vec<MessageAttachment>) -> Self {
        self.lock()
            .attachments
            .insert(message_id.to_string(), attachments);
        self
    }

    /// Serve `payload` when `url` is downloaded as an attachment.
    #[must_use]
    pub fn with_attachment_download(self, url: &str, payload: AttachmentPayload) -> Self {
        self.lock()
            .attachment_downloads
            .insert(url.to_string(), payload);
        self
    }

    /// Answer `operation` with `status`.
    #[must_use]
    pub fn fail(self, operation: &'static str, status: u16) -> Self {
        self.lock().failures.insert(operation, status);
        self
    }

    /// Sleep for `delay` before answering `operation`.
    #[must_use]
    pub fn delay(self, operation: &'static str, delay: Duration) -> Self {
        self.lock().delays.insert(operation, delay);
        self
    }

    /// Calls recorded so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<PlatformCall> {
        self.lock().calls.clone()
    }

    /// Number of recorded calls to `operation`.
    #[must_use]
    pub fn count(&self, operation: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.operation() == operation)
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn enter(&self, call: PlatformCall) -> PlatformResult<()> {
        let operation = call.operation();
        let (delay, failure) = {
            let mut state = self.lock();
            state.calls.push(call);
            (
                state.delays.get(operation).copied(),
                state.failures.get(operation).copied(),
            )
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match failure {
            Some(status) => Err(status_error(operation, status, "scripted failure")),
            None => Ok(()),
        }
    }
}

fn status_error(operation: &'static str, status: u16, body: &str) -> PlatformError {
    PlatformError::Status {
        operation,
        url: format!("fake://{operation}"),
        status,
        body: body.to_string(),
    }
}

#[async_trait]
impl Platform for FakePlatform {
    async fn list_transmissions(&self, config_id: &str) -> PlatformResult<Vec<Transmission>> {
        self.enter(PlatformCall::ListTransmissions(config_id.to_string()))
            .await?;
        Ok(self
            .lock()
            .transmissions
            .get(config_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn download_transmission(&self, transmission: &Transmission) -> PlatformResult<Vec<u8>> {
        self.enter(PlatformCall::DownloadTransmission(transmission.id.clone()))
            .await?;
        self.lock()
            .downloads
            .get(&transmission.url)
            .cloned()
            .ok_or_else(|| status_error("download_transmission", 404, "not found"))
    }

    async fn confirm_transmission(&self, id: &str) -> PlatformResult<()> {
        self.enter(PlatformCall::ConfirmTransmission(id.to_string()))
            .await
    }

    async fn add_transmission(&self, config_id: &str, data: &[u8]) -> PlatformResult<()> {
        self.enter(PlatformCall::AddTransmission {
            config_id: config_id.to_string(),
            data: data.to_vec(),
        })
        .await
    }

    async fn add_attachment(&self, data: &[u8], filename: &str) -> PlatformResult<()> {
        self.enter(PlatformCall::AddAttachment {
            filename: filename.to_string(),
            data: data.to_vec(),
        })
        .await
    }

    async fn list_message_attachments(
        &self,
        message_id: &str,
    ) -> PlatformResult<Vec<MessageAttachment>> {
        self.enter(PlatformCall::ListMessageAttachments(message_id.to_string()))
            .await?;
        Ok(self
            .lock()
            .attachments
            .get(message_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn download_attachment(
        &self,
        attachment: &MessageAttachment,
    ) -> PlatformResult<AttachmentPayload> {
        self.enter(PlatformCall::DownloadAttachment(attachment.url.clone()))
            .await?;
        self.lock()
            .attachment_downloads
            .get(&attachment.url)
            .cloned()
            .ok_or_else(|| status_error("download_attachment", 404, "not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_responses_and_failures_are_served() {
        let platform = FakePlatform::new()
            .with_transmissions(
                "cfg",
                vec![Transmission {
                    id: "T1".to_string(),
                    url: "fake://T1".to_string(),
                    ..Transmission::default()
                }],
            )
            .with_download("fake://T1", "body")
            .fail("confirm_transmission", 500);

        let listed = platform.list_transmissions("cfg").await;
        assert!(matches!(listed.as_deref(), Ok([t]) if t.id == "T1"));
        let body = platform.download_transmission(&listed.unwrap_or_default()[0]).await;
        assert_eq!(body.ok(), Some(b"body".to_vec()));
        let confirm = platform.confirm_transmission("T1").await;
        assert!(matches!(confirm, Err(PlatformError::Status { status: 500, .. })));
        assert_eq!(platform.count("confirm_transmission"), 1);
        assert_eq!(platform.calls().len(), 3);
    }
}
