//! File-backed token persistence for the command line.
//!
//! DESIGN
//! ======
//! One file holds the one token slot. An absent file reads as "no token";
//! removing the token deletes the file.

#[cfg(test)]
#[path = "token_file_test.rs"]
mod token_file_test;

use std::io;
use std::path::{Path, PathBuf};

use client::state::token_store::{StorageError, TokenBackend};

pub const TOKEN_FILE_ENV: &str = "PROMPTWORKS_TOKEN_FILE";

/// `<local data dir>/promptworks/access_token`.
pub fn default_token_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("promptworks").join("access_token"))
}

#[derive(Clone, Debug)]
pub struct FileTokenBackend {
    path: PathBuf,
}

impl FileTokenBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn storage_error(&self, error: &io::Error) -> StorageError {
        StorageError(format!("{}: {error}", self.path.display()))
    }
}

impl TokenBackend for FileTokenBackend {
    fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text.trim_end_matches(['\r', '\n']).to_owned())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.storage_error(&e)),
        }
    }

    fn write(&self, _key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.storage_error(&e))?;
        }
        std::fs::write(&self.path, value).map_err(|e| self.storage_error(&e))?;

        // owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .map_err(|e| self.storage_error(&e))?;
        }
        Ok(())
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.storage_error(&e)),
        }
    }
}
