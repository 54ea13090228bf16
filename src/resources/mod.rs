//! # Reconcilers
//!
//! One reconciler per Dex object kind, all implementing [`Resource`].
//!
//! The orchestrator drives each object through `check`, then one of
//! `create` / `read` / `update` / `delete`, passing the prior state it
//! persisted and a `dry_run` flag for previews. Reconcilers are stateless;
//! everything they need per call is in the request and the shared
//! [`ReconcileContext`].

pub mod client;
pub mod connector;
pub mod flavors;

pub use client::{ClientInputs, ClientResource, ClientState};
pub use connector::{ConnectorFlavor, ConnectorResource};

use crate::config::ProviderConfig;
use crate::error::{Operation, ReconcileError, ReconcileResult};
use crate::remote::{DexApi, RemoteError};
use crate::validation::CheckResponse;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Create a new object
#[derive(Debug, Clone)]
pub struct CreateRequest<I> {
    pub inputs: I,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateResponse<S> {
    pub id: String,
    pub state: S,
}

/// Refresh an object from Dex. `state` is what the orchestrator last stored.
#[derive(Debug, Clone)]
pub struct ReadRequest<S> {
    pub id: String,
    pub state: Option<S>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadResponse<I, S> {
    pub id: String,
    pub inputs: I,
    pub state: S,
}

#[derive(Debug, Clone)]
pub struct UpdateRequest<I, S> {
    pub id: String,
    pub inputs: I,
    pub state: S,
    pub dry_run: bool,
}

/// Delete an object. The id falls back to the one in `state` when empty.
#[derive(Debug, Clone)]
pub struct DeleteRequest<S> {
    pub id: String,
    pub state: S,
}

/// Reconciliation contract shared by every object kind
#[async_trait]
pub trait Resource: Send + Sync {
    type Inputs: Clone + std::fmt::Debug + Send + Sync + Serialize + DeserializeOwned + 'static;
    type State: Clone + std::fmt::Debug + Send + Sync + Serialize + DeserializeOwned + 'static;

    /// Kind name used in errors, spans and manifests
    const KIND: &'static str;

    /// Caller-chosen object id
    fn id(inputs: &Self::Inputs) -> &str;

    /// Validate and apply defaults. Never touches Dex.
    fn check(&self, inputs: Self::Inputs) -> CheckResponse<Self::Inputs>;

    async fn create(
        &self,
        ctx: &ReconcileContext,
        request: CreateRequest<Self::Inputs>,
    ) -> ReconcileResult<CreateResponse<Self::State>>;

    /// `Ok(None)` means the object is gone and should be recreated
    async fn read(
        &self,
        ctx: &ReconcileContext,
        request: ReadRequest<Self::State>,
    ) -> ReconcileResult<Option<ReadResponse<Self::Inputs, Self::State>>>;

    async fn update(
        &self,
        ctx: &ReconcileContext,
        request: UpdateRequest<Self::Inputs, Self::State>,
    ) -> ReconcileResult<Self::State>;

    async fn delete(
        &self,
        ctx: &ReconcileContext,
        request: DeleteRequest<Self::State>,
    ) -> ReconcileResult<()>;
}

/// Run `check` and turn failures into a validation error
pub(crate) fn checked<R: Resource + ?Sized>(
    resource: &R,
    inputs: R::Inputs,
) -> ReconcileResult<R::Inputs> {
    let response = resource.check(inputs);
    if response.is_valid() {
        Ok(response.inputs)
    } else {
        Err(ReconcileError::Validation(response.failures))
    }
}

/// Shared per-provider dependencies handed to every reconciler call
#[derive(Clone)]
pub struct ReconcileContext {
    api: Arc<dyn DexApi>,
    timeout: Duration,
    delete_settle: Duration,
}

impl std::fmt::Debug for ReconcileContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconcileContext")
            .field("timeout", &self.timeout)
            .field("delete_settle", &self.delete_settle)
            .finish_non_exhaustive()
    }
}

impl ReconcileContext {
    pub fn new(api: Arc<dyn DexApi>, config: &ProviderConfig) -> Self {
        Self::with_timeouts(api, config.timeout(), config.delete_settle_delay())
    }

    pub fn with_timeouts(api: Arc<dyn DexApi>, timeout: Duration, delete_settle: Duration) -> Self {
        Self {
            api,
            timeout,
            delete_settle,
        }
    }

    #[must_use]
    pub fn api(&self) -> &dyn DexApi {
        self.api.as_ref()
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Await one RPC under the per-call deadline, annotating any failure
    /// with the operation, kind and id
    pub async fn call<T, F>(
        &self,
        operation: Operation,
        kind: &'static str,
        id: &str,
        rpc: F,
    ) -> ReconcileResult<T>
    where
        F: Future<Output = Result<T, RemoteError>> + Send,
    {
        match tokio::time::timeout(self.timeout, rpc).await {
            Ok(result) => result.map_err(|source| ReconcileError::remote(operation, kind, id, source)),
            Err(_) => Err(ReconcileError::remote(
                operation,
                kind,
                id,
                RemoteError::Timeout(self.timeout),
            )),
        }
    }

    /// Single bounded pause before post-delete verification
    pub async fn settle(&self) {
        if !self.delete_settle.is_zero() {
            tokio::time::sleep(self.delete_settle).await;
        }
    }
}
