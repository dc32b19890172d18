//! Settings decoded from the free-form `settings` mapping of a `FILE` process.

use std::path::{Path, PathBuf};
use std::time::Duration;

use edi_config::ProcessConfig;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{TransportError, TransportResult};

/// Minimum file age when `waitTime` is not configured.
pub const DEFAULT_WAIT_TIME: Duration = Duration::from_secs(15);

/// Outbound settings: watched folders plus post-upload destinations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundSettings {
    /// Folder whose files are uploaded as transmissions.
    #[serde(default)]
    pub message: Option<FolderSettings>,
    /// Folder whose files are uploaded as attachments.
    #[serde(default)]
    pub attachment: Option<FolderSettings>,
    /// Destination for uploaded files; they are deleted when unset.
    #[serde(default)]
    pub success_path: Option<PathBuf>,
    /// Destination for files whose upload failed.
    #[serde(default)]
    pub error_path: Option<PathBuf>,
}

/// One watched folder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderSettings {
    /// Directory to scan (direct children only).
    #[serde(default)]
    pub path: PathBuf,
    /// Accepted extensions; `""` matches files without one.
    #[serde(default)]
    pub extensions: Vec<String>,
    /// Minimum age before a file is picked up.
    #[serde(default, with = "edi_config::duration::option")]
    pub wait_time: Option<Duration>,
}

impl FolderSettings {
    /// Configured wait time or [`DEFAULT_WAIT_TIME`].
    #[must_use]
    pub fn wait_time(&self) -> Duration {
        self.wait_time.unwrap_or(DEFAULT_WAIT_TIME)
    }

    fn is_configured(&self) -> bool {
        !self.path.as_os_str().is_empty()
    }
}

/// Behaviour when an inbound target file already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExistMode {
    /// Replace the existing file.
    #[default]
    Count,
    /// Append to the existing file.
    Append,
}

/// Inbound settings: destination folders and write behaviour.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundSettings {
    /// Directory receiving transmission bodies.
    #[serde(default)]
    pub path: PathBuf,
    /// Directory receiving attachments.
    #[serde(default)]
    pub attachment_path: Option<PathBuf>,
    /// Behaviour when the message target already exists.
    #[serde(default)]
    pub exist: ExistMode,
    /// URL prefixes attachments must match; empty accepts every URL.
    #[serde(default)]
    pub attachment_whitelist: Vec<String>,
}

/// Validated outbound folder layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OutboundLayout {
    pub(crate) message: Option<FolderSettings>,
    pub(crate) attachment: Option<FolderSettings>,
    pub(crate) success_path: Option<PathBuf>,
    pub(crate) error_path: PathBuf,
}

impl OutboundSettings {
    /// Decode the settings of `process`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Settings`] when the mapping does not decode.
    pub fn from_process(process: &ProcessConfig) -> TransportResult<Self> {
        decode(process)
    }

    pub(crate) fn validate(self) -> TransportResult<OutboundLayout> {
        let message = self.message.filter(FolderSettings::is_configured);
        let attachment = self.attachment.filter(FolderSettings::is_configured);
        if message.is_none() && attachment.is_none() {
            return Err(TransportError::invalid_setting(
                "message.path",
                "message_or_attachment_required",
                None::<String>,
            ));
        }
        if let Some(folder) = &message {
            validate_folder("message.path", "message.extensions", folder)?;
        }
        if let Some(folder) = &attachment {
            validate_folder("attachment.path", "attachment.extensions", folder)?;
        }

        let error_path = self
            .error_path
            .filter(|path| !path.as_os_str().is_empty())
            .ok_or_else(|| {
                TransportError::invalid_setting("errorPath", "required", None::<String>)
            })?;
        require_dir("errorPath", &error_path)?;

        let success_path = self.success_path.filter(|path| !path.as_os_str().is_empty());
        if let Some(path) = &success_path {
            require_dir("successPath", path)?;
        }

        Ok(OutboundLayout {
            message,
            attachment,
            success_path,
            error_path,
        })
    }
}

impl InboundSettings {
    /// Decode the settings of `process`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Settings`] when the mapping does not decode.
    pub fn from_process(process: &ProcessConfig) -> TransportResult<Self> {
        decode(process)
    }

    pub(crate) fn validate(mut self) -> TransportResult<Self> {
        if self.path.as_os_str().is_empty() {
            return Err(TransportError::invalid_setting(
                "path",
                "required",
                None::<String>,
            ));
        }
        require_dir("path", &self.path)?;

        self.attachment_path = self
            .attachment_path
            .filter(|path| !path.as_os_str().is_empty());
        if let Some(path) = &self.attachment_path {
            require_dir("attachmentPath", path)?;
        }

        self.attachment_whitelist
            .retain(|prefix| !prefix.trim().is_empty());
        Ok(self)
    }
}

fn decode<T>(process: &ProcessConfig) -> TransportResult<T>
where
    T: for<'de> Deserialize<'de>,
{
    let settings = match &process.settings {
        Value::Null => Value::Object(serde_json::Map::new()),
        other => other.clone(),
    };
    serde_json::from_value(settings).map_err(|source| TransportError::Settings {
        id: process.id.clone(),
        source,
    })
}

fn validate_folder(
    path_field: &'static str,
    extensions_field: &'static str,
    folder: &FolderSettings,
) -> TransportResult<()> {
    require_dir(path_field, &folder.path)?;
    if folder.extensions.is_empty() {
        return Err(TransportError::invalid_setting(
            extensions_field,
            "at_least_one_required",
            None::<String>,
        ));
    }
    Ok(())
}

fn require_dir(field: &'static str, path: &Path) -> TransportResult<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(TransportError::invalid_setting(
            field,
            "directory_missing",
            Some(path.display().to_string()),
        ))
    }
}
