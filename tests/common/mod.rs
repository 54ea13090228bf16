//! In-memory Dex admin API for integration tests.
//!
//! Behaves like Dex for the flag-style outcomes (`already_exists`,
//! `not_found`), or answers missing objects with a `NotFound` status when
//! asked to. Every RPC is recorded by name so tests can assert that a path
//! made no calls, or only the expected ones.

#![allow(dead_code)]

use async_trait::async_trait;
use dex_reconciler::remote::{
    ClientUpdate, ConnectorUpdate, CreateOutcome, MutationOutcome, RemoteClient, RemoteConnector,
};
use dex_reconciler::{DexApi, ReconcileContext, RemoteError};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Default)]
struct Store {
    clients: BTreeMap<String, RemoteClient>,
    connectors: BTreeMap<String, RemoteConnector>,
    calls: Vec<&'static str>,
}

#[derive(Debug, Default)]
pub struct MockDex {
    store: Mutex<Store>,
    /// Report deletes as applied but keep the object
    keep_after_delete: bool,
    /// Answer `GetClient` with `Unimplemented`, like older Dex releases
    get_client_unimplemented: bool,
    /// Never answer; used with a paused clock to hit the deadline
    stall: bool,
    /// Report missing objects with a `NotFound` status instead of the flag
    not_found_status: bool,
}

impl MockDex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keep_after_delete(mut self) -> Self {
        self.keep_after_delete = true;
        self
    }

    pub fn get_client_unimplemented(mut self) -> Self {
        self.get_client_unimplemented = true;
        self
    }

    pub fn stall(mut self) -> Self {
        self.stall = true;
        self
    }

    pub fn not_found_status(mut self) -> Self {
        self.not_found_status = true;
        self
    }

    pub fn with_client(self, client: RemoteClient) -> Self {
        self.lock().clients.insert(client.id.clone(), client);
        self
    }

    pub fn with_connector(self, connector: RemoteConnector) -> Self {
        self.lock().connectors.insert(connector.id.clone(), connector);
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn client(&self, id: &str) -> Option<RemoteClient> {
        self.lock().clients.get(id).cloned()
    }

    pub fn connector(&self, id: &str) -> Option<RemoteConnector> {
        self.lock().connectors.get(id).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Store> {
        self.store.lock().unwrap()
    }

    fn missing(&self) -> Result<MutationOutcome, RemoteError> {
        if self.not_found_status {
            Err(RemoteError::NotFound)
        } else {
            Ok(MutationOutcome::NotFound)
        }
    }

    async fn record(&self, call: &'static str) {
        self.lock().calls.push(call);
        if self.stall {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
    }
}

#[async_trait]
impl DexApi for MockDex {
    async fn create_client(&self, client: RemoteClient) -> Result<CreateOutcome, RemoteError> {
        self.record("create_client").await;
        let mut store = self.lock();
        if store.clients.contains_key(&client.id) {
            return Ok(CreateOutcome::AlreadyExists);
        }
        store.clients.insert(client.id.clone(), client);
        Ok(CreateOutcome::Created)
    }

    async fn get_client(&self, id: &str) -> Result<Option<RemoteClient>, RemoteError> {
        self.record("get_client").await;
        if self.get_client_unimplemented {
            return Err(RemoteError::Unimplemented("GetClient".to_string()));
        }
        Ok(self.lock().clients.get(id).cloned())
    }

    async fn list_clients(&self) -> Result<Vec<RemoteClient>, RemoteError> {
        self.record("list_clients").await;
        Ok(self.lock().clients.values().cloned().collect())
    }

    async fn update_client(&self, update: ClientUpdate) -> Result<MutationOutcome, RemoteError> {
        self.record("update_client").await;
        let mut store = self.lock();
        let Some(client) = store.clients.get_mut(&update.id) else {
            return self.missing();
        };
        client.name = update.name;
        client.redirect_uris = update.redirect_uris;
        client.trusted_peers = update.trusted_peers;
        client.logo_url = update.logo_url;
        Ok(MutationOutcome::Applied)
    }

    async fn delete_client(&self, id: &str) -> Result<MutationOutcome, RemoteError> {
        self.record("delete_client").await;
        let mut store = self.lock();
        if !store.clients.contains_key(id) {
            return self.missing();
        }
        if !self.keep_after_delete {
            store.clients.remove(id);
        }
        Ok(MutationOutcome::Applied)
    }

    async fn create_connector(
        &self,
        connector: RemoteConnector,
    ) -> Result<CreateOutcome, RemoteError> {
        self.record("create_connector").await;
        let mut store = self.lock();
        if store.connectors.contains_key(&connector.id) {
            return Ok(CreateOutcome::AlreadyExists);
        }
        store.connectors.insert(connector.id.clone(), connector);
        Ok(CreateOutcome::Created)
    }

    async fn list_connectors(&self) -> Result<Vec<RemoteConnector>, RemoteError> {
        self.record("list_connectors").await;
        Ok(self.lock().connectors.values().cloned().collect())
    }

    async fn update_connector(
        &self,
        update: ConnectorUpdate,
    ) -> Result<MutationOutcome, RemoteError> {
        self.record("update_connector").await;
        let mut store = self.lock();
        let Some(connector) = store.connectors.get_mut(&update.id) else {
            return self.missing();
        };
        connector.connector_type = update.new_type;
        connector.name = update.new_name;
        connector.config = update.new_config;
        Ok(MutationOutcome::Applied)
    }

    async fn delete_connector(&self, id: &str) -> Result<MutationOutcome, RemoteError> {
        self.record("delete_connector").await;
        let mut store = self.lock();
        if store.connectors.remove(id).is_none() {
            return self.missing();
        }
        Ok(MutationOutcome::Applied)
    }
}

/// Context with a 5s deadline and no settle delay
pub fn context(dex: &Arc<MockDex>) -> ReconcileContext {
    ReconcileContext::with_timeouts(
        Arc::<MockDex>::clone(dex),
        Duration::from_secs(5),
        Duration::ZERO,
    )
}
