//! In-memory store with optimistic concurrency
//!
//! Reference implementation of the store contract, also used by the test
//! suite. Every committed batch carries a version number; a transaction
//! records the version of each batch it read and commits only if none of
//! them moved underneath it. Writes are buffered and applied atomically
//! under one lock at commit time.
//!
//! Transactions do not read their own buffered writes; the engine performs
//! all reads before staging writes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use shared::{OwnerScope, StockBatch, StockChange};
use uuid::Uuid;

use super::{BatchStore, BatchTxn, StoreError, StoreResult};

#[derive(Default)]
struct Inner {
    batches: HashMap<Uuid, (u64, StockBatch)>,
    changes: Vec<StockChange>,
    next_version: u64,
}

impl Inner {
    fn bump(&mut self) -> u64 {
        self.next_version += 1;
        self.next_version
    }
}

/// Shared handle to an in-memory batch store
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock(inner: &Mutex<Inner>) -> StoreResult<MutexGuard<'_, Inner>> {
    inner
        .lock()
        .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))
}

#[async_trait]
impl BatchStore for MemoryStore {
    type Txn = MemoryTxn;

    async fn begin(&self) -> StoreResult<Self::Txn> {
        Ok(MemoryTxn {
            inner: Arc::clone(&self.inner),
            reads: HashMap::new(),
            writes: Vec::new(),
        })
    }
}

enum WriteOp {
    InsertBatch(StockBatch),
    UpdateBatch(StockBatch),
    DeleteBatch(Uuid),
    AppendChange(StockChange),
}

/// A buffered read-modify-write unit against [`MemoryStore`]
pub struct MemoryTxn {
    inner: Arc<Mutex<Inner>>,
    /// Version observed for each batch read; `None` means the batch was
    /// absent at read time
    reads: HashMap<Uuid, Option<u64>>,
    writes: Vec<WriteOp>,
}

impl MemoryTxn {
    fn record_read(&mut self, batch_id: Uuid, version: Option<u64>) {
        self.reads.entry(batch_id).or_insert(version);
    }
}

#[async_trait]
impl BatchTxn for MemoryTxn {
    async fn get_batch(
        &mut self,
        tenant_id: Uuid,
        batch_id: Uuid,
    ) -> StoreResult<Option<StockBatch>> {
        let guard = lock(&self.inner)?;
        let found = guard
            .batches
            .get(&batch_id)
            .filter(|(_, b)| b.tenant_id == tenant_id)
            .map(|(v, b)| (*v, b.clone()));
        drop(guard);

        match found {
            Some((version, batch)) => {
                self.record_read(batch_id, Some(version));
                Ok(Some(batch))
            }
            None => {
                self.record_read(batch_id, None);
                Ok(None)
            }
        }
    }

    async fn batches_for_owner(&mut self, scope: &OwnerScope) -> StoreResult<Vec<StockBatch>> {
        let guard = lock(&self.inner)?;
        let mut found: Vec<(u64, StockBatch)> = guard
            .batches
            .values()
            .filter(|(_, b)| {
                b.tenant_id == scope.tenant_id
                    && b.owner_kind == scope.owner_kind
                    && b.owner_id == scope.owner_id
            })
            .map(|(v, b)| (*v, b.clone()))
            .collect();
        drop(guard);

        found.sort_by(|(_, a), (_, b)| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(found
            .into_iter()
            .map(|(version, batch)| {
                self.record_read(batch.id, Some(version));
                batch
            })
            .collect())
    }

    async fn batches_for_tenant(&mut self, tenant_id: Uuid) -> StoreResult<Vec<StockBatch>> {
        let guard = lock(&self.inner)?;
        let mut found: Vec<(u64, StockBatch)> = guard
            .batches
            .values()
            .filter(|(_, b)| b.tenant_id == tenant_id)
            .map(|(v, b)| (*v, b.clone()))
            .collect();
        drop(guard);

        found.sort_by(|(_, a), (_, b)| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(found
            .into_iter()
            .map(|(version, batch)| {
                self.record_read(batch.id, Some(version));
                batch
            })
            .collect())
    }

    async fn changes_for_owner(&mut self, scope: &OwnerScope) -> StoreResult<Vec<StockChange>> {
        let guard = lock(&self.inner)?;
        let mut found: Vec<StockChange> = guard
            .changes
            .iter()
            .filter(|c| {
                c.tenant_id == scope.tenant_id
                    && c.owner_kind == scope.owner_kind
                    && c.owner_id == scope.owner_id
            })
            .cloned()
            .collect();
        drop(guard);

        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn insert_batch(&mut self, batch: StockBatch) -> StoreResult<()> {
        self.writes.push(WriteOp::InsertBatch(batch));
        Ok(())
    }

    async fn update_batch(&mut self, batch: StockBatch) -> StoreResult<()> {
        self.writes.push(WriteOp::UpdateBatch(batch));
        Ok(())
    }

    async fn delete_batch(&mut self, _tenant_id: Uuid, batch_id: Uuid) -> StoreResult<()> {
        self.writes.push(WriteOp::DeleteBatch(batch_id));
        Ok(())
    }

    async fn append_change(&mut self, change: StockChange) -> StoreResult<()> {
        self.writes.push(WriteOp::AppendChange(change));
        Ok(())
    }

    async fn commit(self) -> StoreResult<()> {
        let mut guard = lock(&self.inner)?;

        // Validate the read set: every batch read must still be at the
        // version we observed, and every absence must still hold.
        for (batch_id, observed) in &self.reads {
            let current = guard.batches.get(batch_id).map(|(v, _)| *v);
            if current != *observed {
                return Err(StoreError::Conflict);
            }
        }

        // Dry-run the write set so a failed precondition leaves the store
        // untouched; `staged` tracks presence as earlier staged ops land.
        let mut staged: HashMap<Uuid, bool> = HashMap::new();
        for op in &self.writes {
            let exists = |id: &Uuid| {
                staged
                    .get(id)
                    .copied()
                    .unwrap_or_else(|| guard.batches.contains_key(id))
            };
            match op {
                WriteOp::InsertBatch(batch) => {
                    if exists(&batch.id) {
                        return Err(StoreError::Conflict);
                    }
                    staged.insert(batch.id, true);
                }
                WriteOp::UpdateBatch(batch) => {
                    if !exists(&batch.id) {
                        return Err(StoreError::Conflict);
                    }
                }
                WriteOp::DeleteBatch(batch_id) => {
                    if !exists(batch_id) {
                        return Err(StoreError::Conflict);
                    }
                    staged.insert(*batch_id, false);
                }
                WriteOp::AppendChange(_) => {}
            }
        }

        for op in self.writes {
            match op {
                WriteOp::InsertBatch(batch) | WriteOp::UpdateBatch(batch) => {
                    let version = guard.bump();
                    guard.batches.insert(batch.id, (version, batch));
                }
                WriteOp::DeleteBatch(batch_id) => {
                    guard.batches.remove(&batch_id);
                }
                WriteOp::AppendChange(change) => {
                    guard.changes.push(change);
                }
            }
        }

        Ok(())
    }
}
