//! # Dex gRPC Client
//!
//! [`DexApi`] over Dex's gRPC admin endpoint using `tonic`.
//!
//! The channel is established once and cloned per call; `tonic` channels
//! multiplex, so one `DexGrpc` can serve concurrent reconciliations of
//! different objects. Every request carries the configured deadline.

#[allow(
    clippy::all,
    clippy::pedantic,
    missing_debug_implementations,
    reason = "Wire types mirror the protobuf definitions"
)]
mod proto;

use super::{
    ClientUpdate, ConnectorUpdate, CreateOutcome, DexApi, MutationOutcome, RemoteClient,
    RemoteConnector, RemoteError,
};
use crate::config::ProviderConfig;
use crate::secret::SecretString;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tonic::transport::Endpoint;
use tonic::Code;
use tracing::{debug, info};

use proto::DexClient;

/// Dex admin API client
#[derive(Debug, Clone)]
pub struct DexGrpc {
    client: DexClient,
    timeout: Duration,
}

impl DexGrpc {
    /// Dial Dex and return a client that shares the resulting channel
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or Dex cannot be reached
    /// before the configured timeout
    pub async fn connect(config: &ProviderConfig) -> Result<Self> {
        config.validate()?;
        let timeout = config.timeout();
        let endpoint = Endpoint::from_shared(config.endpoint_uri())
            .with_context(|| format!("invalid Dex endpoint {}", config.host))?
            .connect_timeout(timeout)
            .timeout(timeout);

        info!(host = %config.host, "Connecting to Dex gRPC API");
        let channel = endpoint
            .connect()
            .await
            .with_context(|| format!("failed to connect to Dex at {}", config.host))?;

        Ok(Self {
            client: DexClient::new(channel),
            timeout,
        })
    }

    fn request<T>(&self, message: T) -> tonic::Request<T> {
        let mut request = tonic::Request::new(message);
        request.set_timeout(self.timeout);
        request
    }

    async fn unary<Req, Resp>(&self, method: &'static str, message: Req) -> Result<Resp, RemoteError>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        debug!(method, "Calling Dex");
        let mut client = self.client.clone();
        client
            .unary(method, self.request(message))
            .await
            .map(tonic::Response::into_inner)
            .map_err(|status| status_to_remote(&status, self.timeout))
    }
}

/// Map a gRPC status onto the transport error taxonomy
fn status_to_remote(status: &tonic::Status, timeout: Duration) -> RemoteError {
    match status.code() {
        Code::NotFound => RemoteError::NotFound,
        Code::DeadlineExceeded => RemoteError::Timeout(timeout),
        Code::Unavailable => RemoteError::Unavailable(status.message().to_string()),
        Code::Unimplemented => RemoteError::Unimplemented(status.message().to_string()),
        // Dex passes storage.ErrNotFound through as an untyped error
        Code::Unknown if status.message().contains("not found") => RemoteError::NotFound,
        code => RemoteError::Rpc {
            code: code.description().to_string(),
            message: status.message().to_string(),
        },
    }
}

impl From<proto::Client> for RemoteClient {
    fn from(client: proto::Client) -> Self {
        Self {
            id: client.id,
            secret: SecretString::from(client.secret),
            redirect_uris: client.redirect_uris,
            trusted_peers: client.trusted_peers,
            public: client.public,
            name: client.name,
            logo_url: client.logo_url,
        }
    }
}

impl From<RemoteClient> for proto::Client {
    fn from(client: RemoteClient) -> Self {
        Self {
            secret: client.secret.expose().to_string(),
            id: client.id,
            redirect_uris: client.redirect_uris,
            trusted_peers: client.trusted_peers,
            public: client.public,
            name: client.name,
            logo_url: client.logo_url,
        }
    }
}

impl From<proto::Connector> for RemoteConnector {
    fn from(connector: proto::Connector) -> Self {
        Self {
            id: connector.id,
            connector_type: connector.r#type,
            name: connector.name,
            config: connector.config,
        }
    }
}

impl From<RemoteConnector> for proto::Connector {
    fn from(connector: RemoteConnector) -> Self {
        Self {
            id: connector.id,
            r#type: connector.connector_type,
            name: connector.name,
            config: connector.config,
        }
    }
}

fn created(already_exists: bool) -> CreateOutcome {
    if already_exists {
        CreateOutcome::AlreadyExists
    } else {
        CreateOutcome::Created
    }
}

fn mutated(not_found: bool) -> MutationOutcome {
    if not_found {
        MutationOutcome::NotFound
    } else {
        MutationOutcome::Applied
    }
}

#[async_trait]
impl DexApi for DexGrpc {
    async fn create_client(&self, client: RemoteClient) -> Result<CreateOutcome, RemoteError> {
        let resp: proto::CreateClientResp = self
            .unary(
                proto::CREATE_CLIENT,
                proto::CreateClientReq {
                    client: Some(client.into()),
                },
            )
            .await?;
        Ok(created(resp.already_exists))
    }

    async fn get_client(&self, id: &str) -> Result<Option<RemoteClient>, RemoteError> {
        let result: Result<proto::GetClientResp, RemoteError> = self
            .unary(proto::GET_CLIENT, proto::GetClientReq { id: id.to_string() })
            .await;
        match result {
            Ok(resp) => Ok(resp.client.map(RemoteClient::from)),
            Err(RemoteError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn list_clients(&self) -> Result<Vec<RemoteClient>, RemoteError> {
        let resp: proto::ListClientResp = self
            .unary(proto::LIST_CLIENTS, proto::ListClientReq {})
            .await?;
        Ok(resp.clients.into_iter().map(RemoteClient::from).collect())
    }

    async fn update_client(&self, update: ClientUpdate) -> Result<MutationOutcome, RemoteError> {
        let resp: proto::UpdateClientResp = self
            .unary(
                proto::UPDATE_CLIENT,
                proto::UpdateClientReq {
                    id: update.id,
                    redirect_uris: update.redirect_uris,
                    trusted_peers: update.trusted_peers,
                    name: update.name,
                    logo_url: update.logo_url,
                },
            )
            .await?;
        Ok(mutated(resp.not_found))
    }

    async fn delete_client(&self, id: &str) -> Result<MutationOutcome, RemoteError> {
        let resp: proto::DeleteClientResp = self
            .unary(
                proto::DELETE_CLIENT,
                proto::DeleteClientReq { id: id.to_string() },
            )
            .await?;
        Ok(mutated(resp.not_found))
    }

    async fn create_connector(
        &self,
        connector: RemoteConnector,
    ) -> Result<CreateOutcome, RemoteError> {
        let resp: proto::CreateConnectorResp = self
            .unary(
                proto::CREATE_CONNECTOR,
                proto::CreateConnectorReq {
                    connector: Some(connector.into()),
                },
            )
            .await?;
        Ok(created(resp.already_exists))
    }

    async fn list_connectors(&self) -> Result<Vec<RemoteConnector>, RemoteError> {
        let resp: proto::ListConnectorResp = self
            .unary(proto::LIST_CONNECTORS, proto::ListConnectorReq {})
            .await?;
        Ok(resp
            .connectors
            .into_iter()
            .map(RemoteConnector::from)
            .collect())
    }

    async fn update_connector(
        &self,
        update: ConnectorUpdate,
    ) -> Result<MutationOutcome, RemoteError> {
        let resp: proto::UpdateConnectorResp = self
            .unary(
                proto::UPDATE_CONNECTOR,
                proto::UpdateConnectorReq {
                    id: update.id,
                    new_type: update.new_type,
                    new_name: update.new_name,
                    new_config: update.new_config,
                },
            )
            .await?;
        Ok(mutated(resp.not_found))
    }

    async fn delete_connector(&self, id: &str) -> Result<MutationOutcome, RemoteError> {
        let resp: proto::DeleteConnectorResp = self
            .unary(
                proto::DELETE_CONNECTOR,
                proto::DeleteConnectorReq { id: id.to_string() },
            )
            .await?;
        Ok(mutated(resp.not_found))
    }
}
