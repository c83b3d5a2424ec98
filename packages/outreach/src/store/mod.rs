//! Durable run state: the seen ledger and the resume cursor.
//!
//! Split into two focused traits mirroring the two files on disk:
//! - [`SeenLedger`]: append-only record of profile ids finally handled
//! - [`CursorStore`]: single resume position, atomically overwritten

mod file;
mod memory;

pub use file::{FileCursor, FileLedger};
pub use memory::{MemoryCursor, MemoryLedger};

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::types::ProfileId;

/// Durable record of profile ids already finally handled (actioned,
/// permanently skipped, or permanently failed).
///
/// Entries are never removed by the pipeline; writes complete before
/// the pipeline moves on, so a crash never loses a recorded id.
#[async_trait]
pub trait SeenLedger: Send + Sync {
    /// Whether the id has already been finally handled.
    async fn contains(&self, id: &ProfileId) -> StorageResult<bool>;

    /// Record the id. Idempotent: re-adding a recorded id is a no-op.
    async fn add(&self, id: &ProfileId) -> StorageResult<()>;

    /// The full set of recorded ids.
    async fn load_all(&self) -> StorageResult<HashSet<ProfileId>>;
}

/// Durable "next position to process" marker.
#[async_trait]
pub trait CursorStore: Send + Sync {
    /// Last persisted position, or 0 when none was ever saved.
    async fn load(&self) -> StorageResult<usize>;

    /// Persist the position. Called per processed item, so a crash
    /// loses at most the in-flight item's outcome.
    async fn save(&self, position: usize) -> StorageResult<()>;

    /// Start over from 0 (explicit external directive).
    async fn reset(&self) -> StorageResult<()>;
}
