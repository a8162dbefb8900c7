use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("download directory {} is unusable: {source}", dir.display())]
    DownloadDir { dir: PathBuf, source: io::Error },
    #[error("could not save {filename}: {source}")]
    Write { filename: String, source: io::Error },
}

/// Saves downloaded documents into one directory.
///
/// Content goes to a temp file in the same directory which is then renamed over
/// the target, so a reader sees either the previous document or the new one.
#[derive(Debug, Clone)]
pub struct DocumentWriter {
    dir: PathBuf,
}

impl DocumentWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `content` to `{dir}/{filename}`, creating the directory if needed.
    pub fn save(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        self.prepare_dir()?;

        let write_err = |source: io::Error| PersistError::Write {
            filename: filename.to_string(),
            source,
        };
        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(write_err)?;
        tmp.write_all(content).map_err(write_err)?;
        tmp.as_file_mut().sync_all().map_err(write_err)?;
        tmp.persist(&target).map_err(|err| write_err(err.error))?;
        Ok(target)
    }

    fn prepare_dir(&self) -> Result<(), PersistError> {
        let dir_err = |source: io::Error| PersistError::DownloadDir {
            dir: self.dir.clone(),
            source,
        };
        match fs::metadata(&self.dir) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(dir_err(io::Error::other("path is not a directory"))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(&self.dir).map_err(dir_err)
            }
            Err(err) => Err(dir_err(err)),
        }
    }
}
