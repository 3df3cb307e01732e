//! HTTP implementation of the remote backend transport.
//!
//! Wire format per record kind:
//!
//! ```text
//! GET    {base}/v1/{path}          -> [ { "owner_id": "...", "record": {...} } ]
//! GET    {base}/v1/{path}/{id}     -> { "owner_id": "...", "record": {...} } | 404
//! PUT    {base}/v1/{path}/{id}     <- { "owner_id": "...", "record": {...} }
//! DELETE {base}/v1/{path}/{id}     -> 2xx | 404
//! ```
//!
//! Every request carries the session's bearer token and a bounded timeout
//! so a hung connection cannot pin a background task indefinitely.

use async_trait::async_trait;
use lucid_core::config::SyncConfig;
use lucid_core::error::{LucidError, Result};
use lucid_core::identity::{AuthSession, Principal};
use lucid_core::record::StoredRecord;
use lucid_core::remote::{RemoteApi, RemoteRecord};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize)]
struct WireRecord<R> {
    owner_id: String,
    record: R,
}

/// Reqwest-backed implementation of [`RemoteApi`] for one record kind.
pub struct HttpRemoteApi<R: StoredRecord> {
    client: Client,
    base_url: String,
    timeout: Duration,
    _marker: PhantomData<fn() -> R>,
}

impl<R: StoredRecord> HttpRemoteApi<R> {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.remote_base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.request_timeout_secs),
            _marker: PhantomData,
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/v1/{}", self.base_url, R::REMOTE_PATH)
    }

    fn record_url(&self, id: &str) -> String {
        format!("{}/v1/{}/{}", self.base_url, R::REMOTE_PATH, id)
    }

    fn auth_request(
        &self,
        request: reqwest::RequestBuilder,
        session: &AuthSession,
    ) -> reqwest::RequestBuilder {
        request
            .header("Authorization", format!("Bearer {}", session.access_token))
            .timeout(self.timeout)
    }
}

#[async_trait]
impl<R: StoredRecord> RemoteApi<R> for HttpRemoteApi<R> {
    async fn list(&self, session: &AuthSession) -> Result<Vec<RemoteRecord<R>>> {
        let response = self
            .auth_request(self.client.get(self.collection_url()), session)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LucidError::remote(
                Some(status.as_u16()),
                format!("list {} failed", R::KIND),
            ));
        }
        let wire: Vec<WireRecord<R>> = response.json().await?;
        Ok(wire
            .into_iter()
            .map(|w| RemoteRecord {
                owner: Principal::new(w.owner_id),
                record: w.record,
            })
            .collect())
    }

    async fn get(&self, session: &AuthSession, id: &str) -> Result<Option<RemoteRecord<R>>> {
        let response = self
            .auth_request(self.client.get(self.record_url(id)), session)
            .send()
            .await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(LucidError::remote(
                Some(status.as_u16()),
                format!("get {} failed", R::KIND),
            ));
        }
        let wire: WireRecord<R> = response.json().await?;
        Ok(Some(RemoteRecord {
            owner: Principal::new(wire.owner_id),
            record: wire.record,
        }))
    }

    async fn upsert(&self, session: &AuthSession, record: &R) -> Result<()> {
        let body = WireRecord {
            owner_id: session.principal.as_str().to_string(),
            record: record.clone(),
        };
        let response = self
            .auth_request(self.client.put(self.record_url(record.id())), session)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LucidError::remote(
                Some(status.as_u16()),
                format!("upsert {} failed", R::KIND),
            ));
        }
        Ok(())
    }

    async fn delete(&self, session: &AuthSession, id: &str) -> Result<()> {
        let response = self
            .auth_request(self.client.delete(self.record_url(id)), session)
            .send()
            .await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND || status.is_success() {
            return Ok(());
        }
        Err(LucidError::remote(
            Some(status.as_u16()),
            format!("delete {} failed", R::KIND),
        ))
    }
}
