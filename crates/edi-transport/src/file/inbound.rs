//! Inbound file transport.

use std::path::Path;

use async_trait::async_trait;
use edi_config::ProcessConfig;
use tracing::debug;

use crate::error::TransportResult;
use crate::file::fsio;
use crate::file::settings::{ExistMode, InboundSettings};
use crate::object::Object;
use crate::transport::{AttachmentProcessor, InboundTransport};

/// Writes downloaded transmissions and attachments into local folders.
#[derive(Debug, Clone)]
pub struct FileInbound {
    settings: InboundSettings,
}

impl FileInbound {
    /// Build the transport from decoded settings.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TransportError::InvalidSetting`] when `path` is unset
    /// or a configured directory does not exist.
    pub fn new(settings: InboundSettings) -> TransportResult<Self> {
        Ok(Self {
            settings: settings.validate()?,
        })
    }

    /// Build the transport from a process entry.
    ///
    /// # Errors
    ///
    /// Returns decoding or validation errors for the process settings.
    pub fn from_process(process: &ProcessConfig) -> TransportResult<Self> {
        Self::new(InboundSettings::from_process(process)?)
    }
}

async fn store(dir: &Path, object: &Object, mode: ExistMode) -> TransportResult<()> {
    let name = fsio::sanitize_filename(object.filename())?;
    let target = dir.join(name);
    if mode == ExistMode::Append && fsio::exists(&target).await? {
        fsio::write_append(&target, object.content()).await?;
        debug!(path = %target.display(), bytes = object.content().len(), "appended payload");
    } else {
        fsio::write_replace(&target, object.content()).await?;
        debug!(path = %target.display(), bytes = object.content().len(), "wrote payload");
    }
    Ok(())
}

#[async_trait]
impl InboundTransport for FileInbound {
    async fn process_message(&self, object: Object) -> TransportResult<()> {
        store(&self.settings.path, &object, self.settings.exist).await
    }

    fn attachment_processor(&self) -> Option<&dyn AttachmentProcessor> {
        Some(self)
    }
}

#[async_trait]
impl AttachmentProcessor for FileInbound {
    async fn process_attachment(&self, object: Object) -> TransportResult<()> {
        // Unconfigured attachment storage falls back to the message folder.
        let dir = self
            .settings
            .attachment_path
            .as_deref()
            .unwrap_or(&self.settings.path);
        store(dir, &object, ExistMode::Count).await
    }

    fn handle_attachments(&self) -> bool {
        self.settings.attachment_path.is_some()
    }

    fn accepts_attachment_url(&self, url: &str) -> bool {
        self.settings.attachment_whitelist.is_empty()
            || self
                .settings
                .attachment_whitelist
                .iter()
                .any(|prefix| url.starts_with(prefix.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::object::METADATA_FILENAME;
    use edi_test_support::fixtures::{file_names, sub_dir, temp_dir};
    use std::collections::BTreeMap;
    use std::fs;

    fn named(id: &str, filename: &str, content: &str) -> Object {
        let mut metadata = BTreeMap::new();
        metadata.insert(METADATA_FILENAME.to_string(), filename.to_string());
        Object::with_metadata(id, content, metadata)
    }

    #[tokio::test]
    async fn count_mode_overwrites_existing_files() -> Result<(), Box<dyn std::error::Error>> {
        let root = temp_dir("inbound-count")?;
        let transport = FileInbound::new(InboundSettings {
            path: root.path().to_path_buf(),
            ..InboundSettings::default()
        })?;
        transport.process_message(named("T1", "in.csv", "first\n")).await?;
        transport.process_message(named("T2", "in.csv", "second\n")).await?;
        assert_eq!(fs::read_to_string(root.path().join("in.csv"))?, "second\n");
        assert_eq!(file_names(root.path())?, vec!["in.csv".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn append_mode_concatenates() -> Result<(), Box<dyn std::error::Error>> {
        let root = temp_dir("inbound-append")?;
        let transport = FileInbound::new(InboundSettings {
            path: root.path().to_path_buf(),
            exist: ExistMode::Append,
            ..InboundSettings::default()
        })?;
        transport.process_message(named("T1", "in.csv", "first\n")).await?;
        transport.process_message(named("T2", "in.csv", "second\n")).await?;
        assert_eq!(
            fs::read_to_string(root.path().join("in.csv"))?,
            "first\nsecond\n"
        );
        Ok(())
    }

    #[tokio::test]
    async fn missing_filename_uses_the_id() -> Result<(), Box<dyn std::error::Error>> {
        let root = temp_dir("inbound-id")?;
        let transport = FileInbound::new(InboundSettings {
            path: root.path().to_path_buf(),
            ..InboundSettings::default()
        })?;
        transport.process_message(Object::new("T9", "body")).await?;
        assert_eq!(fs::read_to_string(root.path().join("T9"))?, "body");
        Ok(())
    }

    #[tokio::test]
    async fn path_components_are_stripped_or_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let root = temp_dir("inbound-names")?;
        let inbox = sub_dir(root.path(), "inbox")?;
        let transport = FileInbound::new(InboundSettings {
            path: inbox.clone(),
            ..InboundSettings::default()
        })?;
        transport
            .process_message(named("T1", "../escape.csv", "x"))
            .await?;
        assert_eq!(file_names(&inbox)?, vec!["escape.csv".to_string()]);
        assert_eq!(file_names(root.path())?, vec!["inbox".to_string()]);

        let rejected = transport.process_message(named("..", "..", "x")).await;
        assert!(matches!(rejected, Err(TransportError::InvalidFilename { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn attachments_always_replace() -> Result<(), Box<dyn std::error::Error>> {
        let root = temp_dir("inbound-att")?;
        let inbox = sub_dir(root.path(), "in")?;
        let attachments = sub_dir(root.path(), "att")?;
        let transport = FileInbound::new(InboundSettings {
            path: inbox,
            attachment_path: Some(attachments.clone()),
            exist: ExistMode::Append,
            attachment_whitelist: vec!["https://files.example.com/".to_string()],
        })?;
        let processor = transport.attachment_processor().ok_or("processor missing")?;
        assert!(processor.handle_attachments());
        processor
            .process_attachment(named("u1", "drawing.pdf", "v1"))
            .await?;
        processor
            .process_attachment(named("u2", "drawing.pdf", "v2"))
            .await?;
        assert_eq!(fs::read_to_string(attachments.join("drawing.pdf"))?, "v2");

        assert!(processor.accepts_attachment_url("https://files.example.com/a/1"));
        assert!(!processor.accepts_attachment_url("https://evil.example.net/a/1"));
        Ok(())
    }

    #[test]
    fn empty_whitelist_accepts_everything() -> Result<(), Box<dyn std::error::Error>> {
        let root = temp_dir("inbound-whitelist")?;
        let transport = FileInbound::new(InboundSettings {
            path: root.path().to_path_buf(),
            ..InboundSettings::default()
        })?;
        let processor = transport.attachment_processor().ok_or("processor missing")?;
        assert!(!processor.handle_attachments());
        assert!(processor.accepts_attachment_url("https://anywhere/"));
        Ok(())
    }
}
