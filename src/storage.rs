//! Single-record files.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::crypto::random_bytes;
use crate::error::{Error, Result};
use crate::format::{self, Encoding};
use crate::record::EncryptedRecord;

/// A file holding one encrypted record in text form.
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Writes the record, replacing any previous content atomically.
    ///
    /// The text goes to a randomly named sibling file first, is synced, then
    /// renamed over the target; the parent directory is synced last. A crash
    /// leaves either the old or the new record, never a partial one.
    pub fn save_record(&self, record: &EncryptedRecord, encoding: Encoding) -> Result<()> {
        let mut text = format::encode_text(record, encoding)?;
        text.push('\n');

        if let Some(parent) = self.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.random_tmp_path()?;

        let mut tmp_file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)?;
        tmp_file.write_all(text.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        if let Some(parent) = self.parent() {
            File::open(parent)?.sync_all()?;
        }

        debug!(path = %self.path.display(), "record written");
        Ok(())
    }

    /// Reads a record written in either text encoding.
    pub fn load_record(&self) -> Result<EncryptedRecord> {
        let text = fs::read_to_string(&self.path)?;
        format::decode_text(&text)
    }

    fn parent(&self) -> Option<&Path> {
        self.path.parent().filter(|p| !p.as_os_str().is_empty())
    }

    /// `<file name>.tmp.<16 hex chars>` next to the target.
    fn random_tmp_path(&self) -> Result<PathBuf> {
        let suffix: String = random_bytes(8)?
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect();

        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| {
                Error::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "record path has no file name",
                ))
            })?
            .to_string_lossy();

        Ok(self.path.with_file_name(format!("{file_name}.tmp.{suffix}")))
    }
}
