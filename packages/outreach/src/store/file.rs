//! File-backed ledger and cursor.
//!
//! The ledger is an append-only text file, one canonical profile id per
//! line, read fully into a set at open. The cursor is a single integer,
//! overwritten atomically via write-temp-then-rename.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::store::{CursorStore, SeenLedger};
use crate::types::ProfileId;

/// Append-only ledger file with an in-memory read cache.
#[derive(Debug)]
pub struct FileLedger {
    path: PathBuf,
    seen: RwLock<HashSet<ProfileId>>,
}

impl FileLedger {
    /// Open the ledger, creating an empty one when the file is absent.
    pub async fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        let seen = match fs::read_to_string(&path).await {
            Ok(contents) => parse_ledger(&path, &contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), entries = seen.len(), "ledger opened");
        Ok(Self {
            path,
            seen: RwLock::new(seen),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.seen.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.read().unwrap().is_empty()
    }
}

fn parse_ledger(path: &Path, contents: &str) -> StorageResult<HashSet<ProfileId>> {
    let mut seen = HashSet::new();
    for (n, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let id = ProfileId::parse(line).map_err(|e| StorageError::Corrupt {
            path: path.display().to_string(),
            reason: format!("line {}: {}", n + 1, e),
        })?;
        seen.insert(id);
    }
    Ok(seen)
}

#[async_trait]
impl SeenLedger for FileLedger {
    async fn contains(&self, id: &ProfileId) -> StorageResult<bool> {
        Ok(self.seen.read().unwrap().contains(id))
    }

    async fn add(&self, id: &ProfileId) -> StorageResult<()> {
        if self.seen.read().unwrap().contains(id) {
            return Ok(());
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(format!("{}\n", id).as_bytes()).await?;
        file.sync_data().await?;
        self.seen.write().unwrap().insert(id.clone());
        Ok(())
    }

    async fn load_all(&self) -> StorageResult<HashSet<ProfileId>> {
        Ok(self.seen.read().unwrap().clone())
    }
}

/// Single-integer cursor file.
pub struct FileCursor {
    path: PathBuf,
}

impl FileCursor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut os = self.path.as_os_str().to_owned();
        os.push(".tmp");
        PathBuf::from(os)
    }
}

#[async_trait]
impl CursorStore for FileCursor {
    async fn load(&self) -> StorageResult<usize> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        contents
            .trim()
            .parse::<usize>()
            .map_err(|e| StorageError::Corrupt {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            })
    }

    async fn save(&self, position: usize) -> StorageResult<()> {
        let tmp = self.tmp_path();
        fs::write(&tmp, position.to_string()).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn reset(&self) -> StorageResult<()> {
        self.save(0).await
    }
}
