//! Outbound file transport.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use edi_config::ProcessConfig;
use tracing::{debug, info};

use crate::error::{TransportError, TransportResult};
use crate::file::fsio;
use crate::file::settings::{FolderSettings, OutboundLayout, OutboundSettings};
use crate::object::Object;
use crate::transport::{AttachmentLister, FinalizeError, Finalizer, OutboundTransport};

/// Uploads aged files from watched folders and moves them afterwards.
#[derive(Debug, Clone)]
pub struct FileOutbound {
    layout: OutboundLayout,
}

impl FileOutbound {
    /// Build the transport from decoded settings.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TransportError::InvalidSetting`] when no folder is
    /// configured, a folder lacks extensions, or a directory is missing.
    pub fn new(settings: OutboundSettings) -> TransportResult<Self> {
        Ok(Self {
            layout: settings.validate()?,
        })
    }

    /// Build the transport from a process entry.
    ///
    /// # Errors
    ///
    /// Returns decoding or validation errors for the process settings.
    pub fn from_process(process: &ProcessConfig) -> TransportResult<Self> {
        Self::new(OutboundSettings::from_process(process)?)
    }

    async fn list(folder: Option<&FolderSettings>) -> TransportResult<Vec<Object>> {
        match folder {
            Some(folder) => fsio::list_folder(folder).await,
            None => Ok(Vec::new()),
        }
    }

    /// Path of `source` below the watched folder it came from.
    fn relative_to_watched(&self, source: &Path) -> PathBuf {
        [&self.layout.message, &self.layout.attachment]
            .into_iter()
            .flatten()
            .filter_map(|folder| std::path::absolute(&folder.path).ok())
            .find_map(|root| source.strip_prefix(root).ok().map(Path::to_path_buf))
            .filter(|relative| !relative.as_os_str().is_empty())
            .unwrap_or_else(|| basename(source))
    }
}

#[async_trait]
impl OutboundTransport for FileOutbound {
    async fn list_messages(&self) -> TransportResult<Vec<Object>> {
        Self::list(self.layout.message.as_ref()).await
    }

    fn attachment_lister(&self) -> Option<&dyn AttachmentLister> {
        Some(self)
    }

    fn finalizer(&self) -> Option<&dyn Finalizer> {
        Some(self)
    }
}

#[async_trait]
impl AttachmentLister for FileOutbound {
    async fn list_attachments(&self) -> TransportResult<Vec<Object>> {
        Self::list(self.layout.attachment.as_ref()).await
    }

    fn handle_attachments(&self) -> bool {
        self.layout.attachment.is_some()
    }
}

#[async_trait]
impl Finalizer for FileOutbound {
    async fn finalize(&self, object: &Object, error: Option<&FinalizeError>) -> TransportResult<()> {
        let source = PathBuf::from(object.id());
        if let Some(error) = error {
            let destination = self.layout.error_path.join(self.relative_to_watched(&source));
            fsio::move_file(&source, &destination).await?;
            info!(
                path = %source.display(),
                destination = %destination.display(),
                error = %error,
                "moved failed upload to error folder"
            );
            return Ok(());
        }

        if let Some(success_path) = &self.layout.success_path {
            let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
            let name = format!("{nanos}_{}", basename(&source).display());
            let destination = success_path.join(name);
            fsio::move_file(&source, &destination).await?;
            debug!(
                path = %source.display(),
                destination = %destination.display(),
                "moved uploaded file to success folder"
            );
            return Ok(());
        }

        tokio::fs::remove_file(&source)
            .await
            .map_err(|err| TransportError::io("finalize.remove", &source, err))?;
        debug!(path = %source.display(), "removed uploaded file");
        Ok(())
    }
}

fn basename(path: &Path) -> PathBuf {
    path.file_name().map_or_else(|| path.to_path_buf(), PathBuf::from)
}
