use crate::core::{StagedWrite, Storage};
use crate::utils::error::{FetchError, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};

/// Write buffer size; the body is flushed to disk in blocks of this many bytes.
pub const CHUNK_SIZE: usize = 8192;

/// Writes rasters to the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }
}

/// Sibling path the download is streamed into before it replaces `path`.
pub fn staging_path(path: &Path) -> Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| FetchError::InvalidConfigValueError {
        field: "output_path".to_string(),
        value: path.display().to_string(),
        reason: "Path must name a file".to_string(),
    })?;

    let mut staged_name = OsString::from(".");
    staged_name.push(file_name);
    staged_name.push(".part");
    Ok(path.with_file_name(staged_name))
}

impl Storage for LocalStorage {
    type Staged = StagedFile;

    async fn stage(&self, path: &Path) -> Result<StagedFile> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let staging = staging_path(path)?;
        // truncates leftovers from an interrupted earlier run
        let file = File::create(&staging).await?;
        tracing::debug!("Staging download at {}", staging.display());

        Ok(StagedFile {
            writer: BufWriter::with_capacity(CHUNK_SIZE, file),
            staging,
            target: path.to_path_buf(),
            written: 0,
        })
    }
}

#[derive(Debug)]
pub struct StagedFile {
    writer: BufWriter<File>,
    staging: PathBuf,
    target: PathBuf,
    written: u64,
}

impl StagedWrite for StagedFile {
    async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        self.writer.write_all(chunk).await?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    async fn commit(self) -> Result<u64> {
        let Self {
            mut writer,
            staging,
            target,
            written,
        } = self;

        if let Err(e) = writer.flush().await {
            drop(writer);
            let _ = fs::remove_file(&staging).await;
            return Err(e.into());
        }
        // close the handle before the rename
        drop(writer);

        if let Err(e) = fs::rename(&staging, &target).await {
            let _ = fs::remove_file(&staging).await;
            return Err(e.into());
        }
        Ok(written)
    }

    async fn abort(self) {
        let Self { writer, staging, .. } = self;
        drop(writer);
        if let Err(e) = fs::remove_file(&staging).await {
            tracing::debug!("Could not remove staging file {}: {}", staging.display(), e);
        }
    }
}
