//! Write-through-on-confirm mutation coordination.
//!
//! Every create, update and delete is registered here before its request is
//! sent and receives a monotonically increasing sequence number. When the
//! response arrives the coordinator decides what happens to it:
//!
//! - a sequence number that is not pending (already completed, or reset by a
//!   session teardown) is ignored, so no response is ever applied twice
//! - a success for a record that a higher-numbered mutation has already
//!   written is dropped as superseded
//! - any other success is written through to the cache and clears the last error
//! - a failure leaves the cache untouched and is recorded in the status channel
//!
//! While a load is in flight the applied changes are also journaled. The load's
//! payload may predate them, so they are replayed over it once it lands.

use super::cache::EntityCache;
use super::status::StatusChannel;
use crate::domain::{OperationError, UserPatch, UserRecord};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

/// A mutation whose response has not arrived yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMutation {
    pub seq: u64,
    pub kind: MutationKind,
    /// Target record; `None` for creates.
    pub id: Option<String>,
}

/// What the coordinator did with a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The sequence number was not pending.
    Ignored,
    /// A newer mutation of the same record was already applied.
    Superseded,
    /// Written through. Holds the affected record when it was cached: the new
    /// or merged record, or the removed one for deletes.
    Applied(Option<UserRecord>),
    /// The remote call failed; the error has been recorded.
    Failed(OperationError),
}

/// A confirmed change, as written to the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
enum AppliedChange {
    Created(UserRecord),
    Updated { id: String, patch: UserPatch },
    Deleted(String),
}

#[derive(Debug, Clone, Default)]
pub struct MutationCoordinator {
    next_seq: u64,
    pending: BTreeMap<u64, PendingMutation>,
    last_applied: HashMap<String, u64>,
    /// `Some` while a load is in flight.
    journal: Option<Vec<AppliedChange>>,
}

impl MutationCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a mutation and returns its sequence number.
    pub fn begin(&mut self, kind: MutationKind, id: Option<&str>) -> u64 {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.pending.insert(seq, PendingMutation { seq, kind, id: id.map(String::from) });
        tracing::debug!(seq = seq, kind = ?kind, user_id = ?id, "mutation submitted");
        seq
    }

    pub fn begin_create(&mut self) -> u64 {
        self.begin(MutationKind::Create, None)
    }

    pub fn begin_update(&mut self, id: &str) -> u64 {
        self.begin(MutationKind::Update, Some(id))
    }

    pub fn begin_delete(&mut self, id: &str) -> u64 {
        self.begin(MutationKind::Delete, Some(id))
    }

    /// Whether a mutation of `kind` on `id` is awaiting its response.
    #[must_use]
    pub fn is_pending(&self, kind: MutationKind, id: &str) -> bool {
        self.pending
            .values()
            .any(|p| p.kind == kind && p.id.as_deref() == Some(id))
    }

    /// Kind of the newest in-flight mutation on `id`, for a per-record indicator.
    #[must_use]
    pub fn pending_for(&self, id: &str) -> Option<MutationKind> {
        self.pending
            .values()
            .rev()
            .find(|p| p.id.as_deref() == Some(id))
            .map(|p| p.kind)
    }

    #[must_use]
    pub fn creating(&self) -> bool {
        self.pending.values().any(|p| p.kind == MutationKind::Create)
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Forgets everything in flight; late responses will be ignored.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.last_applied.clear();
        self.journal = None;
    }

    /// Starts journaling applied changes for a load that was just issued.
    /// Changes applied before this point are already visible to that load.
    pub fn track_applied(&mut self) {
        self.journal = Some(Vec::new());
    }

    /// Stops journaling without replaying, e.g. when the load failed.
    pub fn stop_tracking(&mut self) {
        self.journal = None;
    }

    /// Re-applies every change confirmed since [`track_applied`](Self::track_applied)
    /// onto freshly loaded `cache`, then stops journaling. Returns how many
    /// changes were replayed.
    pub fn replay_applied(&mut self, cache: &mut EntityCache) -> usize {
        let changes = self.journal.take().unwrap_or_default();
        for change in &changes {
            match change {
                AppliedChange::Created(record) => cache.apply_create(record.clone()),
                AppliedChange::Updated { id, patch } => {
                    cache.apply_update(id, patch);
                }
                AppliedChange::Deleted(id) => {
                    cache.apply_delete(id);
                }
            }
        }
        if !changes.is_empty() {
            tracing::debug!(replayed = changes.len(), "replayed changes confirmed during load");
        }
        changes.len()
    }

    fn journal(&mut self, change: AppliedChange) {
        if let Some(journal) = self.journal.as_mut() {
            journal.push(change);
        }
    }

    pub fn complete_create(
        &mut self,
        seq: u64,
        result: Result<UserRecord, OperationError>,
        cache: &mut EntityCache,
        status: &mut StatusChannel,
    ) -> Completion {
        if self.take(seq, MutationKind::Create).is_none() {
            return Completion::Ignored;
        }

        match result {
            Ok(record) => {
                if self.is_superseded(&record.id, seq) {
                    return Completion::Superseded;
                }
                self.last_applied.insert(record.id.clone(), seq);
                cache.apply_create(record.clone());
                self.journal(AppliedChange::Created(record.clone()));
                status.clear_error();
                Completion::Applied(Some(record))
            }
            Err(error) => Self::fail(error, status),
        }
    }

    /// Merges the server's copy when it sent one, otherwise the submitted patch.
    pub fn complete_update(
        &mut self,
        seq: u64,
        id: &str,
        patch: &UserPatch,
        result: Result<Option<UserRecord>, OperationError>,
        cache: &mut EntityCache,
        status: &mut StatusChannel,
    ) -> Completion {
        if self.take(seq, MutationKind::Update).is_none() {
            return Completion::Ignored;
        }

        match result {
            Ok(server_copy) => {
                if self.is_superseded(id, seq) {
                    return Completion::Superseded;
                }
                let merged = server_copy.as_ref().map_or_else(|| patch.clone(), UserPatch::from_record);
                self.last_applied.insert(id.to_string(), seq);
                cache.apply_update(id, &merged);
                self.journal(AppliedChange::Updated { id: id.to_string(), patch: merged });
                status.clear_error();
                Completion::Applied(cache.get(id).cloned())
            }
            Err(error) => Self::fail(error, status),
        }
    }

    pub fn complete_delete(
        &mut self,
        seq: u64,
        id: &str,
        result: Result<(), OperationError>,
        cache: &mut EntityCache,
        status: &mut StatusChannel,
    ) -> Completion {
        if self.take(seq, MutationKind::Delete).is_none() {
            return Completion::Ignored;
        }

        match result {
            Ok(()) => {
                if self.is_superseded(id, seq) {
                    return Completion::Superseded;
                }
                self.last_applied.insert(id.to_string(), seq);
                let removed = cache.apply_delete(id);
                self.journal(AppliedChange::Deleted(id.to_string()));
                status.clear_error();
                Completion::Applied(removed)
            }
            Err(error) => Self::fail(error, status),
        }
    }

    fn take(&mut self, seq: u64, kind: MutationKind) -> Option<PendingMutation> {
        match self.pending.get(&seq) {
            Some(pending) if pending.kind == kind => self.pending.remove(&seq),
            Some(pending) => {
                tracing::warn!(seq = seq, expected = ?kind, actual = ?pending.kind, "response kind mismatch");
                None
            }
            None => {
                tracing::debug!(seq = seq, kind = ?kind, "ignoring response for unknown sequence");
                None
            }
        }
    }

    fn is_superseded(&self, id: &str, seq: u64) -> bool {
        let superseded = self.last_applied.get(id).is_some_and(|&applied| applied > seq);
        if superseded {
            tracing::debug!(user_id = %id, seq = seq, "dropping superseded response");
        }
        superseded
    }

    fn fail(error: OperationError, status: &mut StatusChannel) -> Completion {
        status.fail(error.clone());
        Completion::Failed(error)
    }
}
