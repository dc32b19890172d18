//! Filesystem primitives shared by the file transports.
//!
//! # Design
//! - Listing is non-recursive and only yields regular files.
//! - Moves are copy-then-remove so they work across mount points.
//! - Replacing writes go through a sibling temporary file and a rename.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{TransportError, TransportResult};
use crate::file::settings::FolderSettings;
use crate::object::{METADATA_FILENAME, Object};

/// Text after the last `.` of `name`, or `""` when there is none.
pub(crate) fn extension_of(name: &str) -> &str {
    name.rfind('.').map_or("", |index| &name[index + 1..])
}

/// Whether `name` carries one of the `accepted` extensions. A leading `.` in
/// an accepted entry is ignored and `""` matches names without extension.
pub(crate) fn matches_extension(name: &str, accepted: &[String]) -> bool {
    let extension = extension_of(name);
    accepted.iter().any(|entry| {
        let entry = entry.trim();
        entry.strip_prefix('.').unwrap_or(entry) == extension
    })
}

/// Whether a file modified at `modified` is at least `wait` old at `now`.
pub(crate) fn is_aged(modified: SystemTime, wait: Duration, now: SystemTime) -> bool {
    now.duration_since(modified)
        .is_ok_and(|age| age >= wait)
}

/// Read every eligible file directly inside `folder`, ordered by name.
pub(crate) async fn list_folder(folder: &FolderSettings) -> TransportResult<Vec<Object>> {
    let root = std::path::absolute(&folder.path)
        .map_err(|source| TransportError::io("list.resolve", &folder.path, source))?;
    let mut entries = fs::read_dir(&root)
        .await
        .map_err(|source| TransportError::io("list.read_dir", &root, source))?;

    let now = SystemTime::now();
    let wait = folder.wait_time();
    let mut eligible = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|source| TransportError::io("list.next_entry", &root, source))?
    {
        let path = entry.path();
        let file_type = entry
            .file_type()
            .await
            .map_err(|source| TransportError::io("list.file_type", &path, source))?;
        if !file_type.is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            tracing::debug!(path = %path.display(), "skipping file with non UTF-8 name");
            continue;
        };
        if !matches_extension(&name, &folder.extensions) {
            continue;
        }
        let modified = entry
            .metadata()
            .await
            .and_then(|metadata| metadata.modified())
            .map_err(|source| TransportError::io("list.metadata", &path, source))?;
        if is_aged(modified, wait, now) {
            eligible.push((name, path));
        }
    }
    eligible.sort();

    let mut objects = Vec::with_capacity(eligible.len());
    for (name, path) in eligible {
        let content = fs::read(&path)
            .await
            .map_err(|source| TransportError::io("list.read_file", &path, source))?;
        let mut metadata = BTreeMap::new();
        metadata.insert(METADATA_FILENAME.to_string(), name);
        objects.push(Object::with_metadata(
            path.to_string_lossy().into_owned(),
            content,
            metadata,
        ));
    }
    Ok(objects)
}

/// Move a regular file by copying it to `destination` and removing `source`.
pub(crate) async fn move_file(source: &Path, destination: &Path) -> TransportResult<()> {
    let metadata = fs::symlink_metadata(source)
        .await
        .map_err(|err| TransportError::io("move.stat", source, err))?;
    if !metadata.is_file() {
        return Err(TransportError::NotRegularFile {
            path: source.to_path_buf(),
        });
    }
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|err| TransportError::io("move.create_parent", parent, err))?;
    }
    fs::copy(source, destination)
        .await
        .map_err(|err| TransportError::io("move.copy", destination, err))?;
    fs::remove_file(source)
        .await
        .map_err(|err| TransportError::io("move.remove_source", source, err))?;
    Ok(())
}

/// Reduce a payload name to its final path component.
pub(crate) fn sanitize_filename(name: &str) -> TransportResult<&str> {
    let candidate = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    if candidate.is_empty() || candidate == "." || candidate == ".." {
        return Err(TransportError::InvalidFilename {
            value: name.to_string(),
        });
    }
    Ok(candidate)
}

/// Replace `target` with `content` through a sibling temporary file.
pub(crate) async fn write_replace(target: &Path, content: &[u8]) -> TransportResult<()> {
    let temp = temp_sibling(target);
    let written = write_temp(&temp, content).await;
    let renamed = match written {
        Ok(()) => fs::rename(&temp, target)
            .await
            .map_err(|source| TransportError::io("write.rename", target, source)),
        Err(err) => Err(err),
    };
    if renamed.is_err() {
        let _ = fs::remove_file(&temp).await;
    }
    renamed
}

/// Append `content` to `target`, which must already exist.
pub(crate) async fn write_append(target: &Path, content: &[u8]) -> TransportResult<()> {
    let mut file = fs::OpenOptions::new()
        .append(true)
        .open(target)
        .await
        .map_err(|source| TransportError::io("append.open", target, source))?;
    file.write_all(content)
        .await
        .map_err(|source| TransportError::io("append.write", target, source))?;
    file.flush()
        .await
        .map_err(|source| TransportError::io("append.flush", target, source))?;
    Ok(())
}

pub(crate) async fn exists(path: &Path) -> TransportResult<bool> {
    fs::try_exists(path)
        .await
        .map_err(|source| TransportError::io("write.exists", path, source))
}

async fn write_temp(temp: &Path, content: &[u8]) -> TransportResult<()> {
    fs::write(temp, content)
        .await
        .map_err(|source| TransportError::io("write.temp", temp, source))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(temp, std::fs::Permissions::from_mode(0o644))
            .await
            .map_err(|source| TransportError::io("write.permissions", temp, source))?;
    }
    Ok(())
}

fn temp_sibling(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let nanos = chrono::Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_default();
    target.with_file_name(format!(".{name}.{nanos}.tmp"))
}
