//! Store - the lock-guarded database and its backing file.
//!
//! The store owns one [`Database`] behind a single reader/writer lock. Reads
//! run under the shared lock. Mutations run under the exclusive lock for the
//! whole find, mutate and persist sequence, so the file on disk always reflects
//! a completed operation and mutations are linearizable.
//!
//! Saves write a sibling `.tmp` file and rename it over the backing file, so
//! a crash mid-write never leaves a truncated database behind.

use crate::error::{Error, Result};
use crate::Database;
use parking_lot::RwLock;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Content written when the backing file is missing or empty.
pub const EMPTY_DATABASE: &[u8] = b"{}";

/// The database plus the file it persists to.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    db: RwLock<Database>,
}

impl Store {
    /// Load the database from `path`.
    ///
    /// Creates the parent directory if needed. A missing or empty file is
    /// initialized to `{}`. I/O failures and malformed content are fatal.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let bytes = read_or_init(&path)?;

        let db: Database = serde_json::from_slice(&bytes).map_err(|source| Error::Malformed {
            path: path.clone(),
            source,
        })?;

        tracing::info!(
            path = %path.display(),
            collections = db.len(),
            records = db.record_count(),
            "loaded database"
        );

        Ok(Self {
            path,
            db: RwLock::new(db),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` under the shared lock.
    pub fn read<R>(&self, f: impl FnOnce(&Database) -> R) -> R {
        let db = self.db.read();
        f(&db)
    }

    /// Run `f` under the exclusive lock and persist if it succeeds.
    ///
    /// The lock is held until the file is written. If `f` fails nothing is
    /// saved. If the save fails the in-memory change is kept and the error
    /// is returned; memory and disk stay diverged until the next good save.
    pub fn write<R>(&self, f: impl FnOnce(&mut Database) -> Result<R>) -> Result<R> {
        let mut db = self.db.write();
        let out = f(&mut db)?;
        persist(&self.path, &db)?;
        Ok(out)
    }

    /// Write the current state to disk.
    pub fn save(&self) -> Result<()> {
        let db = self.db.write();
        persist(&self.path, &db)
    }

    /// Clone of the current state, taken under the shared lock.
    pub fn snapshot(&self) -> Database {
        self.db.read().clone()
    }
}

fn read_or_init(path: &Path) -> Result<Vec<u8>> {
    let load_err = |source: std::io::Error| Error::Load {
        path: path.to_path_buf(),
        source,
    };

    if let Some(dir) = parent_dir(path) {
        fs::create_dir_all(dir).map_err(load_err)?;
    }

    match fs::read(path) {
        Ok(bytes) if !bytes.is_empty() => Ok(bytes),
        Ok(_) => init_file(path),
        Err(e) if e.kind() == ErrorKind::NotFound => init_file(path),
        Err(e) => Err(load_err(e)),
    }
}

fn init_file(path: &Path) -> Result<Vec<u8>> {
    tracing::info!(path = %path.display(), "initializing empty database file");
    fs::write(path, EMPTY_DATABASE).map_err(|source| Error::Load {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(EMPTY_DATABASE.to_vec())
}

/// Serialize with 2-space indentation and atomically replace the file.
fn persist(path: &Path, db: &Database) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(db)?;
    let tmp_path = tmp_path(path);

    let persist_err = |source: std::io::Error| Error::Persist {
        path: path.to_path_buf(),
        source,
    };

    if let Some(dir) = parent_dir(path) {
        fs::create_dir_all(dir).map_err(persist_err)?;
    }

    let mut file = File::create(&tmp_path).map_err(persist_err)?;
    file.write_all(&bytes).map_err(persist_err)?;
    file.sync_all().map_err(persist_err)?;
    drop(file);

    fs::rename(&tmp_path, path).map_err(persist_err)?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "saved database");
    Ok(())
}

fn parent_dir(path: &Path) -> Option<&Path> {
    path.parent().filter(|dir| !dir.as_os_str().is_empty())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}
