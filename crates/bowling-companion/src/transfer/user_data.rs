//! Swapping a downloaded database in for the local one.
//!
//! The database must be closed while these operations run. SQLite's `-wal`
//! and `-shm` files move together with the database they belong to.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};

const DOWNLOAD_SUFFIX: &str = ".download";
const BACKUP_SUFFIX: &str = ".backup";
const SIDECAR_SUFFIXES: [&str; 2] = ["-wal", "-shm"];

/// The database file and the download and backup files kept beside it.
#[derive(Debug, Clone)]
pub struct UserData {
    database: PathBuf,
}

impl UserData {
    /// Manage the files for the database at `database`.
    #[must_use]
    pub fn new(database: impl Into<PathBuf>) -> Self {
        Self {
            database: database.into(),
        }
    }

    /// The live database.
    #[must_use]
    pub fn database_file(&self) -> &Path {
        &self.database
    }

    /// Where downloads are written before being applied.
    #[must_use]
    pub fn download_file(&self) -> PathBuf {
        with_suffix(&self.database, DOWNLOAD_SUFFIX)
    }

    /// Where the replaced database is kept.
    #[must_use]
    pub fn backup_file(&self) -> PathBuf {
        with_suffix(&self.database, BACKUP_SUFFIX)
    }

    /// Check if a download is waiting to be applied.
    #[must_use]
    pub fn has_download(&self) -> bool {
        self.download_file().is_file()
    }

    /// Check if a backup can be restored.
    #[must_use]
    pub fn has_backup(&self) -> bool {
        self.backup_file().is_file()
    }

    /// Back up the current database and move the download into its place.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no download or a file can't be moved.
    pub fn apply_download(&self) -> Result<()> {
        let download = self.download_file();
        if !download.is_file() {
            return Err(Error::invalid_input(format!(
                "no downloaded database at {}",
                download.display()
            )));
        }

        let backup = self.backup_file();
        if self.database.exists() {
            move_database(&self.database, &backup)?;
        }
        move_database(&download, &self.database)?;

        info!(
            "Applied downloaded database, previous database kept at {}",
            backup.display()
        );
        Ok(())
    }

    /// Replace the current database with the backup.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no backup or a file can't be moved.
    pub fn restore_backup(&self) -> Result<()> {
        let backup = self.backup_file();
        if !backup.is_file() {
            return Err(Error::invalid_input(format!(
                "no database backup at {}",
                backup.display()
            )));
        }

        move_database(&backup, &self.database)?;
        info!("Restored database from {}", backup.display());
        Ok(())
    }

    /// Delete a pending download. Returns whether there was one.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but can't be removed.
    pub fn discard_download(&self) -> Result<bool> {
        let download = self.download_file();
        match fs::remove_file(&download) {
            Ok(()) => {
                debug!("Discarded {}", download.display());
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Rename `from` onto `to`, replacing `to` and its sidecars.
fn move_database(from: &Path, to: &Path) -> Result<()> {
    for suffix in SIDECAR_SUFFIXES {
        remove_if_exists(&with_suffix(to, suffix))?;
    }
    fs::rename(from, to)?;
    for suffix in SIDECAR_SUFFIXES {
        let sidecar = with_suffix(from, suffix);
        if sidecar.exists() {
            fs::rename(&sidecar, with_suffix(to, suffix))?;
        }
    }
    Ok(())
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
        _ => Ok(()),
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
