//! Filesystem fixtures.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tempfile::TempDir;

/// Create a temporary directory whose name starts with `edi-<label>-`.
///
/// # Errors
///
/// Returns an error when the directory cannot be created.
pub fn temp_dir(label: &str) -> io::Result<TempDir> {
    tempfile::Builder::new()
        .prefix(&format!("edi-{label}-"))
        .tempdir()
}

/// Create `root/name` as a directory and return its path.
///
/// # Errors
///
/// Returns an error when the directory cannot be created.
pub fn sub_dir(root: &Path, name: &str) -> io::Result<PathBuf> {
    let path = root.join(name);
    fs::create_dir_all(&path)?;
    Ok(path)
}

/// Write `contents` to `dir/name` and backdate its modification time by `age`.
///
/// # Errors
///
/// Returns an error when the file cannot be written or its timestamp cannot
/// be changed.
pub fn write_aged_file(
    dir: &Path,
    name: &str,
    contents: impl AsRef<[u8]>,
    age: Duration,
) -> io::Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, contents)?;
    let modified = SystemTime::now()
        .checked_sub(age)
        .ok_or_else(|| io::Error::other("age exceeds the representable time range"))?;
    File::options().write(true).open(&path)?.set_modified(modified)?;
    Ok(path)
}

/// Names of the entries directly inside `dir`, sorted.
///
/// # Errors
///
/// Returns an error when the directory cannot be read.
pub fn file_names(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = fs::read_dir(dir)?
        .map(|entry| entry.map(|entry| entry.file_name().to_string_lossy().into_owned()))
        .collect::<io::Result<Vec<_>>>()?;
    names.sort();
    Ok(names)
}
