//! Synchronization engine.
//!
//! Two independent operations per record kind: draining the outbox against
//! the remote gateway, and fetching the remote record set to merge with the
//! local snapshot. They may run concurrently with each other - they touch
//! disjoint data paths until the final local-store write, which the store's
//! write mutex serializes - but each is logically sequential internally.
//!
//! Partial failure while draining (some records sync, others do not) is
//! expected steady-state behavior, not an error condition: failed records
//! stay in the outbox and retry on the next pass.

use lucid_core::connectivity::NetworkProbe;
use lucid_core::identity::SessionProvider;
use lucid_core::record::StoredRecord;
use lucid_core::remote::WriteOutcome;
use lucid_infrastructure::local_store::RecordStore;
use lucid_infrastructure::outbox::Outbox;
use lucid_infrastructure::remote_gateway::RemoteGateway;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Counters from one outbox drain pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrainReport {
    /// Records pending when the pass started
    pub attempted: usize,
    /// Records confirmed remotely and dequeued
    pub synced: usize,
    /// Records left pending for the next pass
    pub failed: usize,
}

/// Reconciles one record kind between the local store and the remote
/// backend.
#[derive(Clone)]
pub struct SyncEngine<R: StoredRecord> {
    store: Arc<RecordStore<R>>,
    outbox: Arc<Outbox<R>>,
    gateway: Arc<RemoteGateway<R>>,
    sessions: Arc<dyn SessionProvider>,
    probe: Arc<dyn NetworkProbe>,
}

impl<R: StoredRecord> SyncEngine<R> {
    pub fn new(
        store: Arc<RecordStore<R>>,
        outbox: Arc<Outbox<R>>,
        gateway: Arc<RemoteGateway<R>>,
        sessions: Arc<dyn SessionProvider>,
        probe: Arc<dyn NetworkProbe>,
    ) -> Self {
        Self {
            store,
            outbox,
            gateway,
            sessions,
            probe,
        }
    }

    /// Pushes pending local writes to the backend.
    ///
    /// The pending list is snapshotted up front, so records enqueued while
    /// the pass runs wait for the next one. A record is dequeued only once
    /// the backend confirms it; one record's failure never blocks the rest.
    /// Scheduling (and any backoff between passes) is the caller's concern.
    pub async fn drain_outbox(&self) -> DrainReport {
        let pending = self.outbox.list().await;
        let mut report = DrainReport {
            attempted: pending.len(),
            ..DrainReport::default()
        };

        for record in pending {
            match self.gateway.save(&record).await {
                WriteOutcome::Persisted => match self.outbox.remove(record.id()).await {
                    Ok(()) => report.synced += 1,
                    Err(e) => {
                        report.failed += 1;
                        tracing::warn!(
                            kind = R::KIND,
                            id = record.id(),
                            error = %e,
                            "synced record could not be dequeued, it will re-sync"
                        );
                    }
                },
                outcome => {
                    report.failed += 1;
                    tracing::debug!(
                        kind = R::KIND,
                        id = record.id(),
                        outcome = ?outcome,
                        "record left pending for retry"
                    );
                }
            }
        }

        if report.attempted > 0 {
            tracing::info!(
                kind = R::KIND,
                attempted = report.attempted,
                synced = report.synced,
                failed = report.failed,
                "outbox drain finished"
            );
        }
        report
    }

    /// Reconciles the remote record set into the local cache and returns
    /// the resulting snapshot.
    ///
    /// With no principal, no connectivity, or a failed fetch, the
    /// pre-existing local snapshot comes back unchanged - a sync pass must
    /// never corrupt the cache. After a successful merge a drain pass is
    /// spawned opportunistically (writes queued while offline may be newly
    /// syncable); it does not block this call's return value.
    pub async fn fetch_and_merge(&self) -> Vec<R> {
        let local = self.store.get().await;

        if self.sessions.current_session().await.is_none() {
            tracing::debug!(kind = R::KIND, "no active session, keeping local snapshot");
            return local;
        }
        if !self.probe.is_online().await {
            tracing::debug!(kind = R::KIND, "offline, keeping local snapshot");
            return local;
        }

        let Some(remote) = self.gateway.fetch_all().await else {
            return local;
        };

        let merged = merge_last_writer_wins(local, remote);
        if let Err(e) = self.store.save_all(merged.clone()).await {
            tracing::warn!(kind = R::KIND, error = %e, "failed to persist merged snapshot");
        }

        let engine = self.clone();
        tokio::spawn(async move {
            engine.drain_outbox().await;
        });

        merged
    }
}

/// Merges remote records into the local set by id.
///
/// The remote copy replaces the local one unless the local copy is strictly
/// newer by `updated_at`; ties go to the remote, since the server is
/// authoritative once a record has round-tripped.
fn merge_last_writer_wins<R: StoredRecord>(local: Vec<R>, remote: Vec<R>) -> Vec<R> {
    let mut by_id: BTreeMap<String, R> = local
        .into_iter()
        .map(|record| (record.id().to_string(), record))
        .collect();

    for incoming in remote {
        let keep_local = by_id
            .get(incoming.id())
            .is_some_and(|existing| existing.updated_at() > incoming.updated_at());
        if keep_local {
            tracing::debug!(kind = R::KIND, id = incoming.id(), "keeping newer local copy");
            continue;
        }
        by_id.insert(incoming.id().to_string(), incoming);
    }

    let mut merged: Vec<R> = by_id.into_values().collect();
    R::sort_for_read(&mut merged);
    merged
}
