//! Atomic file writes for persisted specification documents
//!
//! A document is written to a temporary file in the target directory, synced,
//! and renamed over the target. A crash mid-write leaves either the previous
//! document or the new one, never a truncated file.

use anyhow::{Context, Result};
use camino::Utf8Path;
use std::fs;
use std::io::Write;

use tempfile::NamedTempFile;

/// Outcome of an atomic write
#[derive(Debug, Clone, Default)]
pub struct AtomicWriteResult {
    /// Bytes written after line-ending normalization
    pub bytes_written: usize,
    /// Whether the rename had to fall back to copy + sync
    pub used_copy_fallback: bool,
}

/// Atomically write `content` to `path` (temp file + fsync + rename).
///
/// Line endings are normalized to LF and missing parent directories are created.
pub fn write_file_atomic(path: &Utf8Path, content: &str) -> Result<AtomicWriteResult> {
    let normalized = normalize_line_endings(content);

    let parent = match path.parent() {
        Some(p) if !p.as_str().is_empty() => p,
        _ => Utf8Path::new("."),
    };
    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create parent directory: {parent}"))?;

    let mut temp_file = NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temporary file in: {parent}"))?;
    temp_file
        .write_all(normalized.as_bytes())
        .context("Failed to write content to temporary file")?;
    temp_file
        .as_file()
        .sync_all()
        .context("Failed to fsync temporary file")?;

    let mut result = AtomicWriteResult {
        bytes_written: normalized.len(),
        used_copy_fallback: false,
    };

    if let Err(persist_error) = temp_file.persist(path.as_std_path()) {
        // Rename can fail across filesystems; copy the synced temp file instead.
        let temp_file = persist_error.file;
        fs::copy(temp_file.path(), path.as_std_path())
            .with_context(|| format!("Failed to atomically write file: {path}"))?;
        fs::File::open(path.as_std_path())
            .and_then(|f| f.sync_all())
            .with_context(|| format!("Failed to fsync {path}"))?;
        result.used_copy_fallback = true;
    }

    Ok(result)
}

fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n").replace('\r', "\n")
}

/// Read a text file, tolerating CRLF line endings.
pub fn read_file_with_crlf_tolerance(path: &Utf8Path) -> Result<String> {
    let content =
        fs::read_to_string(path.as_std_path()).with_context(|| format!("Failed to read {path}"))?;
    Ok(normalize_line_endings(&content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    fn utf8_dir(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(normalize_line_endings("a\r\nb\rc\n"), "a\nb\nc\n");
    }

    #[test]
    fn test_atomic_write_basic() {
        let dir = TempDir::new().unwrap();
        let path = utf8_dir(&dir).join("shop.evospec.yaml");

        let result = write_file_atomic(&path, "spec: evospec/v1\n").unwrap();
        assert_eq!(result.bytes_written, 17);
        assert_eq!(fs::read_to_string(&path).unwrap(), "spec: evospec/v1\n");
    }

    #[test]
    fn test_atomic_write_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let path = utf8_dir(&dir).join("nested/deeper/spec.evospec.yaml");

        write_file_atomic(&path, "x").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_atomic_write_overwrites_existing() {
        let dir = TempDir::new().unwrap();
        let path = utf8_dir(&dir).join("spec.evospec.yaml");

        write_file_atomic(&path, "old\r\n").unwrap();
        write_file_atomic(&path, "new\r\n").unwrap();
        assert_eq!(read_file_with_crlf_tolerance(&path).unwrap(), "new\n");
    }
}
