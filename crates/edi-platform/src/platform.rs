//! Platform operations consumed by the connector engine.

use async_trait::async_trait;

use crate::error::PlatformResult;
use crate::model::{AttachmentPayload, MessageAttachment, Transmission};

/// Operations offered by the EDI platform. Each call is a single attempt.
#[async_trait]
pub trait Platform: Send + Sync {
    /// List transmissions waiting for `config_id`.
    async fn list_transmissions(&self, config_id: &str) -> PlatformResult<Vec<Transmission>>;

    /// Download the full body of a transmission from its pre-signed URL.
    async fn download_transmission(&self, transmission: &Transmission) -> PlatformResult<Vec<u8>>;

    /// Acknowledge that transmission `id` was processed.
    async fn confirm_transmission(&self, id: &str) -> PlatformResult<()>;

    /// Upload `data` as a new transmission for `config_id`.
    async fn add_transmission(&self, config_id: &str, data: &[u8]) -> PlatformResult<()>;

    /// Upload `data` as an attachment named `filename`.
    async fn add_attachment(&self, data: &[u8], filename: &str) -> PlatformResult<()>;

    /// List the attachments referenced by message `message_id`.
    async fn list_message_attachments(
        &self,
        message_id: &str,
    ) -> PlatformResult<Vec<MessageAttachment>>;

    /// Download an attachment together with its announced file name.
    async fn download_attachment(
        &self,
        attachment: &MessageAttachment,
    ) -> PlatformResult<AttachmentPayload>;
}
