//! # Remote Identity Client
//!
//! Abstract interface for the Dex admin API.
//!
//! Reconcilers only ever talk to Dex through [`DexApi`], so the gRPC
//! implementation in [`grpc`] can be swapped for an in-memory double in
//! tests. One implementation is constructed per provider instance and shared
//! (behind an `Arc`) by every reconciler.

pub mod grpc;

use crate::secret::SecretString;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub use grpc::DexGrpc;

/// An OAuth2 client as Dex stores it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteClient {
    pub id: String,
    pub secret: SecretString,
    pub redirect_uris: Vec<String>,
    pub trusted_peers: Vec<String>,
    pub public: bool,
    pub name: String,
    pub logo_url: String,
}

/// A connector as Dex stores it. `config` is opaque JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteConnector {
    pub id: String,
    pub connector_type: String,
    pub name: String,
    pub config: Vec<u8>,
}

/// Mutable fields of a client. Dex has no way to change the secret or
/// the public flag in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientUpdate {
    pub id: String,
    pub name: String,
    pub redirect_uris: Vec<String>,
    pub trusted_peers: Vec<String>,
    pub logo_url: String,
}

/// Whole-object replacement of a connector's mutable fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectorUpdate {
    pub id: String,
    pub new_type: String,
    pub new_name: String,
    pub new_config: Vec<u8>,
}

/// Dex answers a duplicate create with a flag, not an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    AlreadyExists,
}

/// Dex answers update/delete of a missing object with a flag, not an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    NotFound,
}

/// Transport-level failures talking to Dex
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    #[error("object not found")]
    NotFound,
    #[error("deadline of {0:?} exceeded")]
    Timeout(Duration),
    #[error("dex unavailable: {0}")]
    Unavailable(String),
    #[error("not implemented by dex: {0}")]
    Unimplemented(String),
    #[error("rpc failed ({code}): {message}")]
    Rpc { code: String, message: String },
}

/// Dex admin RPCs used by the reconcilers
#[async_trait]
pub trait DexApi: Send + Sync {
    async fn create_client(&self, client: RemoteClient) -> Result<CreateOutcome, RemoteError>;

    /// `Ok(None)` when no client has this id
    async fn get_client(&self, id: &str) -> Result<Option<RemoteClient>, RemoteError>;

    async fn list_clients(&self) -> Result<Vec<RemoteClient>, RemoteError>;

    async fn update_client(&self, update: ClientUpdate) -> Result<MutationOutcome, RemoteError>;

    async fn delete_client(&self, id: &str) -> Result<MutationOutcome, RemoteError>;

    async fn create_connector(
        &self,
        connector: RemoteConnector,
    ) -> Result<CreateOutcome, RemoteError>;

    /// Dex has no get-by-id for connectors; callers enumerate and filter
    async fn list_connectors(&self) -> Result<Vec<RemoteConnector>, RemoteError>;

    async fn update_connector(
        &self,
        update: ConnectorUpdate,
    ) -> Result<MutationOutcome, RemoteError>;

    async fn delete_connector(&self, id: &str) -> Result<MutationOutcome, RemoteError>;
}
