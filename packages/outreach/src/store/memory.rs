//! In-memory ledger and cursor for testing and development.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::store::{CursorStore, SeenLedger};
use crate::types::ProfileId;

/// In-memory ledger. State is shared across clones, so a test can keep
/// a handle to inspect what the pipeline recorded. Not durable.
#[derive(Clone, Default)]
pub struct MemoryLedger {
    seen: Arc<RwLock<HashSet<ProfileId>>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.seen.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.read().unwrap().is_empty()
    }
}

#[async_trait]
impl SeenLedger for MemoryLedger {
    async fn contains(&self, id: &ProfileId) -> StorageResult<bool> {
        Ok(self.seen.read().unwrap().contains(id))
    }

    async fn add(&self, id: &ProfileId) -> StorageResult<()> {
        self.seen.write().unwrap().insert(id.clone());
        Ok(())
    }

    async fn load_all(&self) -> StorageResult<HashSet<ProfileId>> {
        Ok(self.seen.read().unwrap().clone())
    }
}

/// In-memory cursor; shared across clones like [`MemoryLedger`].
#[derive(Clone, Default)]
pub struct MemoryCursor {
    position: Arc<RwLock<usize>>,
}

impl MemoryCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start at a given position, as if persisted by an earlier run.
    pub fn starting_at(position: usize) -> Self {
        Self {
            position: Arc::new(RwLock::new(position)),
        }
    }

    pub fn position(&self) -> usize {
        *self.position.read().unwrap()
    }
}

#[async_trait]
impl CursorStore for MemoryCursor {
    async fn load(&self) -> StorageResult<usize> {
        Ok(*self.position.read().unwrap())
    }

    async fn save(&self, position: usize) -> StorageResult<()> {
        *self.position.write().unwrap() = position;
        Ok(())
    }

    async fn reset(&self) -> StorageResult<()> {
        self.save(0).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> ProfileId {
        ProfileId::parse(&format!("https://network.example/in/{}", name)).unwrap()
    }

    #[tokio::test]
    async fn ledger_clones_share_state() {
        let ledger = MemoryLedger::new();
        let handle = ledger.clone();
        ledger.add(&id("alice")).await.unwrap();
        assert!(handle.contains(&id("alice")).await.unwrap());
        assert_eq!(handle.len(), 1);
    }

    #[tokio::test]
    async fn cursor_round_trips() {
        let cursor = MemoryCursor::starting_at(5);
        assert_eq!(cursor.load().await.unwrap(), 5);
        cursor.save(9).await.unwrap();
        assert_eq!(cursor.load().await.unwrap(), 9);
        cursor.reset().await.unwrap();
        assert_eq!(cursor.load().await.unwrap(), 0);
    }
}
