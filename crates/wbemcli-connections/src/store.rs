//! Durable storage for connection definitions.
//!
//! The repository lives in a single YAML file. Rewrites go through a
//! temporary file in the same directory; the previous file is moved to
//! `<file>.bak` before the new content is renamed into place, so a valid copy
//! survives a process killed mid-write. An empty repository is represented by
//! the absence of the file.
//!
//! There is no inter-process locking: concurrent writers race and the last
//! rename wins. Readers never see a partially written file.

use std::fs;
use std::io::{self, Write as IoWrite};

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::definition::ConnectionDefinition;
use crate::error::StoreError;
use crate::repository::ConnectionRepository;

const STORE_TARGET: &str = "wbemcli::store";

/// Owner of the on-disk connection repository.
///
/// The repository is read once when the store is opened and kept in memory;
/// every mutation goes through [`ConnectionStore::transaction`] and is written
/// back before the call returns.
#[derive(Debug)]
pub struct ConnectionStore {
    path: Utf8PathBuf,
    repository: ConnectionRepository,
}

impl ConnectionStore {
    /// Opens the repository at `path`, loading it if present.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RepositoryCorrupt`] when the file cannot be
    /// parsed, or an IO error when it cannot be read.
    pub fn open(path: impl Into<Utf8PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let repository = load_repository(&path)?;
        Ok(Self { path, repository })
    }

    /// Path of the repository file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Path of the backup written before each rewrite.
    #[must_use]
    pub fn backup_path(&self) -> Utf8PathBuf {
        backup_path(&self.path)
    }

    /// Returns true when the repository file exists on disk.
    #[must_use]
    pub fn file_exists(&self) -> bool {
        self.path.is_file()
    }

    /// The repository as last loaded or saved.
    #[must_use]
    pub fn repository(&self) -> &ConnectionRepository {
        &self.repository
    }

    /// Re-reads the repository file.
    ///
    /// A missing or empty file yields an empty repository. When the file is
    /// missing but a backup exists, the backup is restored first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RepositoryCorrupt`] when the file cannot be
    /// parsed.
    pub fn load(&mut self) -> Result<&ConnectionRepository, StoreError> {
        self.repository = load_repository(&self.path)?;
        Ok(&self.repository)
    }

    /// Writes `repository` to disk and adopts it as the current state.
    ///
    /// An empty repository deletes the file and its backup.
    ///
    /// # Errors
    ///
    /// Returns an error when serialisation or any filesystem step fails; the
    /// in-memory state is unchanged in that case.
    pub fn save(&mut self, repository: ConnectionRepository) -> Result<(), StoreError> {
        if repository.is_empty() {
            remove_if_present(&self.path)?;
            remove_if_present(&backup_path(&self.path))?;
            info!(target: STORE_TARGET, path = %self.path, "removed empty connection repository");
        } else {
            let content = serde_saphyr::to_string(&repository).map_err(|error| {
                StoreError::Serialise {
                    message: error.to_string(),
                }
            })?;
            write_with_backup(&self.path, &content)?;
            debug!(
                target: STORE_TARGET,
                path = %self.path,
                definitions = repository.len(),
                "saved connection repository"
            );
        }
        self.repository = repository;
        Ok(())
    }

    /// Applies a group of mutations and writes the result once.
    ///
    /// The closure receives a copy of the repository. When it returns `Ok`
    /// and the copy differs from the current state, the copy is saved; on
    /// `Err` the copy is discarded and nothing is written.
    ///
    /// # Errors
    ///
    /// Propagates the closure's error or any save failure.
    pub fn transaction<T, E, F>(&mut self, mutate: F) -> Result<T, E>
    where
        F: FnOnce(&mut ConnectionRepository, &Utf8Path) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut working = self.repository.clone();
        let value = mutate(&mut working, &self.path)?;
        if working != self.repository {
            self.save(working)?;
        }
        Ok(value)
    }

    /// Inserts or replaces the definition stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidDefinition`] for invalid definitions and
    /// any save failure.
    pub fn upsert(&mut self, name: &str, definition: ConnectionDefinition) -> Result<(), StoreError> {
        self.transaction(|repository, _| repository.upsert(name, definition).map(|_| ()))
    }

    /// Deletes the definition stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the file does not exist or the
    /// name is not stored.
    pub fn delete(&mut self, name: &str) -> Result<ConnectionDefinition, StoreError> {
        if !self.file_exists() {
            return Err(StoreError::NotFound {
                name: name.to_owned(),
                path: self.path.clone(),
            });
        }
        self.transaction(|repository, path| repository.remove(name, path))
    }

    /// Makes `name` the default connection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the name is not stored.
    pub fn set_default(&mut self, name: &str) -> Result<(), StoreError> {
        self.transaction(|repository, path| repository.set_default(name, path))
    }

    /// Looks up a definition for selection by name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ConnectionFileNotFound`] when no repository file
    /// exists and [`StoreError::NotFound`] when the name is not stored.
    pub fn select(&self, name: &str) -> Result<&ConnectionDefinition, StoreError> {
        if !self.file_exists() {
            return Err(StoreError::ConnectionFileNotFound {
                path: self.path.clone(),
            });
        }
        self.repository.get(name).ok_or_else(|| StoreError::NotFound {
            name: name.to_owned(),
            path: self.path.clone(),
        })
    }
}

fn backup_path(path: &Utf8Path) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{path}.bak"))
}

fn load_repository(path: &Utf8Path) -> Result<ConnectionRepository, StoreError> {
    restore_backup_if_needed(path)?;
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            return Ok(ConnectionRepository::default());
        }
        Err(error) => return Err(StoreError::io("read", path, error)),
    };
    if content.trim().is_empty() {
        return Ok(ConnectionRepository::default());
    }
    let mut repository: ConnectionRepository =
        serde_saphyr::from_str(&content).map_err(|error| StoreError::RepositoryCorrupt {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;
    repository.normalise(path);
    debug!(
        target: STORE_TARGET,
        path = %path,
        definitions = repository.len(),
        "loaded connection repository"
    );
    Ok(repository)
}

/// Puts the backup back when a rewrite was interrupted after the old file
/// was moved aside.
fn restore_backup_if_needed(path: &Utf8Path) -> Result<(), StoreError> {
    let backup = backup_path(path);
    if path.exists() || !backup.is_file() {
        return Ok(());
    }
    warn!(
        target: STORE_TARGET,
        path = %path,
        backup = %backup,
        "connection repository missing; restoring from backup"
    );
    fs::rename(&backup, path).map_err(|error| StoreError::io("restore backup to", path, error))
}

fn write_with_backup(path: &Utf8Path, content: &str) -> Result<(), StoreError> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    fs::create_dir_all(parent).map_err(|error| StoreError::io("create directory", parent, error))?;

    let mut staged =
        NamedTempFile::new_in(parent).map_err(|error| StoreError::io("stage", path, error))?;
    staged
        .write_all(content.as_bytes())
        .and_then(|()| staged.as_file().sync_all())
        .map_err(|error| StoreError::io("stage", path, error))?;

    let backup = backup_path(path);
    let had_previous = path.is_file();
    if had_previous {
        remove_if_present(&backup)?;
        fs::rename(path, &backup).map_err(|error| StoreError::io("back up", path, error))?;
    }

    if let Err(error) = staged.persist(path) {
        if had_previous {
            restore_backup(&backup, path);
        }
        return Err(StoreError::io("write", path, error.error));
    }
    Ok(())
}

/// Moves the last good file back after a failed write.
///
/// The write error is what the caller reports, so a failed restore is only
/// logged. Returns whether the backup is back in place.
fn restore_backup(backup: &Utf8Path, path: &Utf8Path) -> bool {
    match fs::rename(backup, path) {
        Ok(()) => true,
        Err(error) => {
            warn!(
                target: STORE_TARGET,
                path = %path,
                backup = %backup,
                error = %error,
                "could not restore connection repository backup"
            );
            false
        }
    }
}

fn remove_if_present(path: &Utf8Path) -> Result<(), StoreError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(StoreError::io("remove", path, error)),
    }
}
