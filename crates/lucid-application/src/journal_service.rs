//! Orchestrating facade.
//!
//! The only entry point presentation code calls. Writes persist locally
//! first - that succeeds offline and is the durability guarantee - then
//! enqueue and kick a background sync pass. Reads return the local snapshot
//! immediately and kick a background reconciliation that refreshes the
//! cache for the next call. Background tasks are spawned and never awaited
//! by the caller, so UI-facing calls never block on network latency; their
//! failures are caught and logged, never surfaced.
//!
//! A failed *local* write is the one failure a caller sees. Reads and
//! deletes degrade internally and never raise.

use crate::sync::SyncEngine;
use anyhow::{Context, Result as AnyResult};
use chrono::Utc;
use lucid_core::config::SyncConfig;
use lucid_core::connectivity::NetworkProbe;
use lucid_core::error::Result;
use lucid_core::identity::SessionProvider;
use lucid_core::interpretation::Interpretation;
use lucid_core::journal::{Draft, JournalEntry};
use lucid_core::record::{StoredRecord, keys};
use lucid_core::remote::RemoteApi;
use lucid_core::settings::Settings;
use lucid_core::storage::KeyValueStore;
use lucid_infrastructure::config_service::ConfigService;
use lucid_infrastructure::connectivity::CachedNetworkProbe;
use lucid_infrastructure::http_remote::HttpRemoteApi;
use lucid_infrastructure::identity_boundary::IdentityBoundary;
use lucid_infrastructure::json_file_store::JsonFileStore;
use lucid_infrastructure::local_store::{RecordStore, SingletonStore, clear_all};
use lucid_infrastructure::outbox::Outbox;
use lucid_infrastructure::remote_gateway::RemoteGateway;
use std::sync::Arc;

/// Store, outbox, gateway, and engine for one record kind.
struct KindStack<R: StoredRecord> {
    store: Arc<RecordStore<R>>,
    outbox: Arc<Outbox<R>>,
    gateway: Arc<RemoteGateway<R>>,
    engine: SyncEngine<R>,
}

impl<R: StoredRecord> KindStack<R> {
    fn new(
        kv: Arc<dyn KeyValueStore>,
        api: Arc<dyn RemoteApi<R>>,
        sessions: Arc<dyn SessionProvider>,
        probe: Arc<dyn NetworkProbe>,
    ) -> Self {
        let store = Arc::new(RecordStore::new(kv.clone()));
        let outbox = Arc::new(Outbox::new(kv));
        let gateway = Arc::new(RemoteGateway::new(api, sessions.clone()));
        let engine = SyncEngine::new(
            store.clone(),
            outbox.clone(),
            gateway.clone(),
            sessions,
            probe,
        );
        Self {
            store,
            outbox,
            gateway,
            engine,
        }
    }
}

/// The read/write API surrounding components call.
pub struct JournalService {
    kv: Arc<dyn KeyValueStore>,
    sessions: Arc<dyn SessionProvider>,
    identity: IdentityBoundary,
    entries: KindStack<JournalEntry>,
    interpretations: KindStack<Interpretation>,
    drafts: SingletonStore<Draft>,
    settings: SingletonStore<Settings>,
}

impl JournalService {
    /// Wires the facade from explicit collaborators.
    pub fn new(
        kv: Arc<dyn KeyValueStore>,
        sessions: Arc<dyn SessionProvider>,
        probe: Arc<dyn NetworkProbe>,
        entry_api: Arc<dyn RemoteApi<JournalEntry>>,
        interpretation_api: Arc<dyn RemoteApi<Interpretation>>,
    ) -> Self {
        Self {
            identity: IdentityBoundary::new(sessions.clone(), kv.clone()),
            entries: KindStack::new(kv.clone(), entry_api, sessions.clone(), probe.clone()),
            interpretations: KindStack::new(
                kv.clone(),
                interpretation_api,
                sessions.clone(),
                probe,
            ),
            drafts: SingletonStore::new(kv.clone(), keys::DRAFT),
            settings: SingletonStore::new(kv.clone(), keys::SETTINGS),
            kv,
            sessions,
        }
    }

    /// Wires the facade with the production backends at the default
    /// on-device location, resolving configuration once.
    pub async fn default_location(sessions: Arc<dyn SessionProvider>) -> AnyResult<Self> {
        let config = ConfigService::load();
        let kv: Arc<dyn KeyValueStore> = Arc::new(
            JsonFileStore::default_location()
                .await
                .context("Failed to open local store")?,
        );
        Ok(Self::with_config(kv, sessions, &config))
    }

    /// Wires the facade with HTTP backends from the given configuration.
    pub fn with_config(
        kv: Arc<dyn KeyValueStore>,
        sessions: Arc<dyn SessionProvider>,
        config: &SyncConfig,
    ) -> Self {
        let probe: Arc<dyn NetworkProbe> = Arc::new(CachedNetworkProbe::new(config));
        let entry_api: Arc<dyn RemoteApi<JournalEntry>> = Arc::new(HttpRemoteApi::new(config));
        let interpretation_api: Arc<dyn RemoteApi<Interpretation>> =
            Arc::new(HttpRemoteApi::new(config));
        Self::new(kv, sessions, probe, entry_api, interpretation_api)
    }

    /// Called once at process start.
    ///
    /// When the active account differs from the one local state belongs
    /// to, wipes every key the core owns before anything reads it, then
    /// records the new principal.
    pub async fn initialize(&self) -> Result<()> {
        if self.identity.has_changed().await {
            tracing::info!("active principal changed, wiping local state");
            clear_all(self.kv.as_ref()).await?;
            if let Some(principal) = self.identity.current_principal().await {
                self.identity.store(&principal).await?;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Journal entries
    // ------------------------------------------------------------------

    /// Saves an entry locally, enqueues it for sync, and kicks a
    /// background drain.
    ///
    /// Returns the entry as persisted (timestamps advanced). Only the
    /// local write can fail; the remote mirror is best-effort.
    pub async fn save_entry(&self, mut entry: JournalEntry) -> Result<JournalEntry> {
        entry.touch();
        self.entries.store.save(&entry).await?;
        if let Err(e) = self.entries.outbox.add(&entry).await {
            tracing::warn!(id = entry.id.as_str(), error = %e, "failed to enqueue entry for sync");
        }
        self.spawn_drain(self.entries.engine.clone());
        Ok(entry)
    }

    /// Returns the local entries immediately and refreshes the cache in
    /// the background for the next call.
    pub async fn entries(&self) -> Vec<JournalEntry> {
        let snapshot = self.entries.store.get().await;
        Self::spawn_refresh(self.entries.engine.clone());
        snapshot
    }

    /// Returns one entry from the local cache.
    pub async fn entry(&self, id: &str) -> Option<JournalEntry> {
        self.entries.store.get_by_id(id).await
    }

    /// Deletes an entry locally and best-effort remotely, cascading to its
    /// interpretations. Never raises; failures are logged and the next
    /// sync pass reconciles.
    pub async fn delete_entry(&self, id: &str) {
        if let Err(e) = self.entries.store.delete(id).await {
            tracing::warn!(id, error = %e, "failed to delete entry locally");
        }
        if let Err(e) = self.entries.outbox.remove(id).await {
            tracing::warn!(id, error = %e, "failed to dequeue deleted entry");
        }

        let orphaned: Vec<String> = self
            .interpretations
            .store
            .get()
            .await
            .into_iter()
            .filter(|i| i.entry_id == id)
            .map(|i| i.id)
            .collect();
        for interpretation_id in &orphaned {
            self.remove_interpretation_locally(interpretation_id).await;
        }

        let entry_gateway = self.entries.gateway.clone();
        let interpretation_gateway = self.interpretations.gateway.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            entry_gateway.delete(&id).await;
            for interpretation_id in &orphaned {
                interpretation_gateway.delete(interpretation_id).await;
            }
        });
    }

    // ------------------------------------------------------------------
    // Interpretations
    // ------------------------------------------------------------------

    /// Saves an interpretation locally, enqueues it, and kicks a
    /// background drain.
    pub async fn save_interpretation(
        &self,
        mut interpretation: Interpretation,
    ) -> Result<Interpretation> {
        interpretation.touch();
        self.interpretations.store.save(&interpretation).await?;
        if let Err(e) = self.interpretations.outbox.add(&interpretation).await {
            tracing::warn!(
                id = interpretation.id.as_str(),
                error = %e,
                "failed to enqueue interpretation for sync"
            );
        }
        self.spawn_drain(self.interpretations.engine.clone());
        Ok(interpretation)
    }

    /// Returns the local interpretations immediately and refreshes the
    /// cache in the background.
    pub async fn interpretations(&self) -> Vec<Interpretation> {
        let snapshot = self.interpretations.store.get().await;
        Self::spawn_refresh(self.interpretations.engine.clone());
        snapshot
    }

    /// Returns the current interpretation of an entry: the most recently
    /// updated one referencing it.
    pub async fn interpretation_for(&self, entry_id: &str) -> Option<Interpretation> {
        self.interpretations
            .store
            .get()
            .await
            .into_iter()
            .filter(|i| i.entry_id == entry_id)
            .max_by_key(|i| i.updated_at)
    }

    /// Deletes an interpretation locally and best-effort remotely. Never
    /// raises.
    pub async fn delete_interpretation(&self, id: &str) {
        self.remove_interpretation_locally(id).await;
        let gateway = self.interpretations.gateway.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            gateway.delete(&id).await;
        });
    }

    async fn remove_interpretation_locally(&self, id: &str) {
        if let Err(e) = self.interpretations.store.delete(id).await {
            tracing::warn!(id, error = %e, "failed to delete interpretation locally");
        }
        if let Err(e) = self.interpretations.outbox.remove(id).await {
            tracing::warn!(id, error = %e, "failed to dequeue deleted interpretation");
        }
    }

    // ------------------------------------------------------------------
    // Draft and settings
    // ------------------------------------------------------------------

    /// Overwrites the single draft, stamping the save time.
    pub async fn save_draft(&self, mut draft: Draft) -> Result<Draft> {
        draft.saved_at = Utc::now();
        self.drafts.set(&draft).await?;
        Ok(draft)
    }

    /// Returns the in-progress draft, if one exists.
    pub async fn draft(&self) -> Option<Draft> {
        self.drafts.get().await
    }

    /// Discards the draft.
    pub async fn clear_draft(&self) -> Result<()> {
        self.drafts.clear().await
    }

    /// Returns the stored settings, or the defaults when none exist.
    pub async fn settings(&self) -> Settings {
        self.settings.get().await.unwrap_or_default()
    }

    /// Persists the settings. Local-only; never synced.
    pub async fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.settings.set(settings).await
    }

    // ------------------------------------------------------------------
    // Sync
    // ------------------------------------------------------------------

    /// Runs a full sync pass in the foreground: drains both outboxes and
    /// reconciles both record kinds. Intended for app-foreground or
    /// connectivity-restored hooks; regular reads and writes schedule
    /// their own background passes.
    pub async fn sync_now(&self) {
        self.entries.engine.drain_outbox().await;
        self.interpretations.engine.drain_outbox().await;
        self.entries.engine.fetch_and_merge().await;
        self.interpretations.engine.fetch_and_merge().await;
    }

    fn spawn_drain<R: StoredRecord>(&self, engine: SyncEngine<R>) {
        let sessions = self.sessions.clone();
        tokio::spawn(async move {
            if sessions.current_session().await.is_none() {
                tracing::debug!(kind = R::KIND, "no active session, deferring outbox drain");
                return;
            }
            engine.drain_outbox().await;
        });
    }

    fn spawn_refresh<R: StoredRecord>(engine: SyncEngine<R>) {
        tokio::spawn(async move {
            engine.fetch_and_merge().await;
        });
    }
}
