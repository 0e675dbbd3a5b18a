//! Local file materialization.
//!
//! Payloads are written to a temporary sibling (`.tmp-<uuid>`) and renamed
//! into place only once fully flushed, so readers never observe a partially
//! written target and a failed transfer leaves the previous file untouched.

use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tracing::debug;
use uuid::Uuid;

/// A file being written under a temporary name next to its final path.
#[derive(Debug)]
pub struct StagedFile {
    tmp_path: PathBuf,
    final_path: PathBuf,
    file: File,
}

impl StagedFile {
    /// Create missing parent directories and open the temporary file.
    pub async fn create(final_path: &Path) -> io::Result<Self> {
        let parent = match final_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).await?;

        let tmp_path = parent.join(format!(".tmp-{}", Uuid::new_v4()));
        let file = File::create(&tmp_path).await?;

        Ok(Self {
            tmp_path,
            final_path: final_path.to_path_buf(),
            file,
        })
    }

    pub fn file_mut(&mut self) -> &mut File {
        &mut self.file
    }

    /// Flush, sync and rename into the final path, replacing any existing file.
    pub async fn commit(mut self) -> io::Result<PathBuf> {
        if let Err(err) = self.sync().await {
            self.discard().await;
            return Err(err);
        }

        if let Err(err) = fs::rename(&self.tmp_path, &self.final_path).await {
            if err.kind() == ErrorKind::AlreadyExists {
                fs::remove_file(&self.final_path).await?;
                fs::rename(&self.tmp_path, &self.final_path).await?;
            } else {
                let _ = fs::remove_file(&self.tmp_path).await;
                return Err(err);
            }
        }

        debug!("wrote {}", self.final_path.display());
        Ok(self.final_path)
    }

    /// Drop the temporary file; the final path is left as it was.
    pub async fn discard(self) {
        if let Err(err) = fs::remove_file(&self.tmp_path).await {
            debug!(
                "failed to remove temporary file {}: {}",
                self.tmp_path.display(),
                err
            );
        }
    }

    async fn sync(&mut self) -> io::Result<()> {
        self.file.flush().await?;
        self.file.sync_all().await
    }
}

/// Write `content` to `path` in one pass, creating parent directories.
pub async fn write_text(path: &Path, content: &str) -> io::Result<PathBuf> {
    let mut staged = StagedFile::create(path).await?;
    if let Err(err) = staged.file_mut().write_all(content.as_bytes()).await {
        staged.discard().await;
        return Err(err);
    }
    staged.commit().await
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn leftover_temp_files(dir: &Path) -> usize {
        let mut count = 0;
        let mut entries = fs::read_dir(dir).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            if entry.file_name().to_string_lossy().starts_with(".tmp-") {
                count += 1;
            }
        }
        count
    }

    #[tokio::test]
    async fn creates_parents_and_writes() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a/b/c.csv");

        let written = write_text(&target, "x,y\n").await.unwrap();
        assert_eq!(written, target);
        assert_eq!(fs::read_to_string(&target).await.unwrap(), "x,y\n");
        assert_eq!(leftover_temp_files(&dir.path().join("a/b")).await, 0);
    }

    #[tokio::test]
    async fn overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.json");

        write_text(&target, "{\"long\": \"first version\"}").await.unwrap();
        write_text(&target, "{}").await.unwrap();
        assert_eq!(fs::read_to_string(&target).await.unwrap(), "{}");
    }

    #[tokio::test]
    async fn discard_keeps_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("keep.tsv");
        write_text(&target, "old").await.unwrap();

        let mut staged = StagedFile::create(&target).await.unwrap();
        staged.file_mut().write_all(b"partial").await.unwrap();
        staged.discard().await;

        assert_eq!(fs::read_to_string(&target).await.unwrap(), "old");
        assert_eq!(leftover_temp_files(dir.path()).await, 0);
    }
}
