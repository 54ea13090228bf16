//! # OAuth2 Client Reconciler
//!
//! Manages Dex OAuth2 clients.
//!
//! - The secret is supplied by the caller or generated once at creation.
//!   Dex's update call has no secret field, so the stored secret is
//!   carried forward on every update and is never regenerated.
//! - `public` cannot be changed in place either.
//! - Deletes are verified by listing clients after a short settle delay.

use super::{
    checked, CreateRequest, CreateResponse, DeleteRequest, ReadRequest, ReadResponse,
    ReconcileContext, Resource, UpdateRequest,
};
use crate::error::{Operation, ReconcileError, ReconcileResult};
use crate::remote::{ClientUpdate, CreateOutcome, MutationOutcome, RemoteClient, RemoteError};
use crate::secret::{SecretPolicy, SecretString};
use crate::validation::{CheckFailure, CheckResponse, Failures};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, info_span, warn, Instrument, Span};

/// Declared OAuth2 client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInputs {
    pub client_id: String,
    pub name: String,
    /// Generated at creation when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<SecretString>,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trusted_peers: Vec<String>,
    #[serde(default)]
    pub public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

/// Reconciled OAuth2 client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientState {
    #[serde(flatten)]
    pub inputs: ClientInputs,
    /// RFC 3339 time of creation by this reconciler. Dex does not record it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl ClientState {
    fn from_remote(remote: RemoteClient, created_at: Option<String>) -> Self {
        let secret = (!remote.secret.is_empty()).then(|| remote.secret.clone());
        Self {
            inputs: ClientInputs {
                secret,
                logo_url: (!remote.logo_url.is_empty()).then(|| remote.logo_url.clone()),
                client_id: remote.id,
                name: remote.name,
                redirect_uris: remote.redirect_uris,
                trusted_peers: remote.trusted_peers,
                public: remote.public,
            },
            created_at,
        }
    }
}

/// Reconciler for `client` objects
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientResource;

impl ClientResource {
    /// Look a client up by id, enumerating when Dex lacks `GetClient`
    async fn fetch(
        &self,
        ctx: &ReconcileContext,
        operation: Operation,
        id: &str,
    ) -> ReconcileResult<Option<RemoteClient>> {
        match ctx
            .call(operation, Self::KIND, id, ctx.api().get_client(id))
            .await
        {
            Err(ReconcileError::Remote {
                source: RemoteError::Unimplemented(_),
                ..
            }) => {
                debug!("GetClient not supported, listing clients instead");
                let clients = ctx
                    .call(operation, Self::KIND, id, ctx.api().list_clients())
                    .await?;
                Ok(clients.into_iter().find(|client| client.id == id))
            }
            other => other,
        }
    }

    /// Fields Dex cannot change in place
    fn ensure_mutable(prior: &ClientState, next: &ClientInputs) -> ReconcileResult<()> {
        if prior.inputs.client_id != next.client_id {
            return Err(ReconcileError::Validation(vec![CheckFailure::new(
                "clientId",
                format!(
                    "cannot be changed from {:?} to {:?}; delete and recreate the client",
                    prior.inputs.client_id, next.client_id
                ),
            )]));
        }
        if prior.inputs.public != next.public {
            return Err(ReconcileError::ReplaceRequired {
                kind: Self::KIND,
                id: next.client_id.clone(),
                field: "public",
            });
        }
        if let (Some(prior_secret), Some(next_secret)) = (&prior.inputs.secret, &next.secret) {
            if prior_secret != next_secret {
                return Err(ReconcileError::ReplaceRequired {
                    kind: Self::KIND,
                    id: next.client_id.clone(),
                    field: "secret",
                });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Resource for ClientResource {
    type Inputs = ClientInputs;
    type State = ClientState;

    const KIND: &'static str = "client";

    fn id(inputs: &ClientInputs) -> &str {
        &inputs.client_id
    }

    fn check(&self, mut inputs: ClientInputs) -> CheckResponse<ClientInputs> {
        let mut failures = Failures::new();
        failures.require("clientId", &inputs.client_id);
        failures.require("name", &inputs.name);
        failures.no_blank_entries("redirectUris", &inputs.redirect_uris);
        failures.no_blank_entries("trustedPeers", &inputs.trusted_peers);

        if inputs.secret.as_ref().is_some_and(SecretString::is_empty) {
            inputs.secret = None;
        }
        if inputs.logo_url.as_deref() == Some("") {
            inputs.logo_url = None;
        }

        CheckResponse {
            inputs,
            failures: failures.into_vec(),
        }
    }

    async fn create(
        &self,
        ctx: &ReconcileContext,
        request: CreateRequest<ClientInputs>,
    ) -> ReconcileResult<CreateResponse<ClientState>> {
        let span = info_span!(
            "dex.client.create",
            client.id = %request.inputs.client_id,
            dry_run = request.dry_run,
            operation.outcome = tracing::field::Empty,
        );

        async move {
            let declared = request.inputs.clone();
            let inputs = checked(self, request.inputs)?;
            let id = inputs.client_id.clone();

            if request.dry_run {
                debug!("Preview only, not calling Dex");
                return Ok(CreateResponse {
                    id,
                    state: ClientState {
                        inputs: declared,
                        created_at: None,
                    },
                });
            }

            let secret = SecretPolicy::resolve(inputs.secret.as_ref())?;
            if secret.generated {
                debug!("No client secret supplied, generated one");
            }

            let remote = RemoteClient {
                id: id.clone(),
                secret: secret.value.clone(),
                redirect_uris: inputs.redirect_uris.clone(),
                trusted_peers: inputs.trusted_peers.clone(),
                public: inputs.public,
                name: inputs.name.clone(),
                logo_url: inputs.logo_url.clone().unwrap_or_default(),
            };

            let outcome = ctx
                .call(Operation::Create, Self::KIND, &id, ctx.api().create_client(remote))
                .await?;

            if outcome == CreateOutcome::AlreadyExists {
                warn!("Client already exists in Dex, adopting it");
                Span::current().record("operation.outcome", "adopted");
                let existing = self.fetch(ctx, Operation::Create, &id).await?.ok_or_else(|| {
                    ReconcileError::remote(Operation::Create, Self::KIND, &id, RemoteError::NotFound)
                })?;
                return Ok(CreateResponse {
                    id,
                    state: ClientState::from_remote(existing, None),
                });
            }

            info!("Created client");
            Span::current().record("operation.outcome", "created");
            Ok(CreateResponse {
                id,
                state: ClientState {
                    inputs: ClientInputs {
                        secret: Some(secret.value),
                        ..inputs
                    },
                    created_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
                },
            })
        }
        .instrument(span)
        .await
    }

    async fn read(
        &self,
        ctx: &ReconcileContext,
        request: ReadRequest<ClientState>,
    ) -> ReconcileResult<Option<ReadResponse<ClientInputs, ClientState>>> {
        let span = info_span!("dex.client.read", client.id = %request.id);

        async move {
            let Some(remote) = self.fetch(ctx, Operation::Read, &request.id).await? else {
                info!("Client not found in Dex");
                return Ok(None);
            };

            let created_at = request.state.and_then(|prior| prior.created_at);
            let state = ClientState::from_remote(remote, created_at);
            debug!("Read client");
            Ok(Some(ReadResponse {
                id: request.id,
                inputs: state.inputs.clone(),
                state,
            }))
        }
        .instrument(span)
        .await
    }

    async fn update(
        &self,
        ctx: &ReconcileContext,
        request: UpdateRequest<ClientInputs, ClientState>,
    ) -> ReconcileResult<ClientState> {
        let span = info_span!(
            "dex.client.update",
            client.id = %request.id,
            dry_run = request.dry_run,
        );

        async move {
            let declared = request.inputs.clone();
            let inputs = checked(self, request.inputs)?;
            let prior = request.state;
            Self::ensure_mutable(&prior, &inputs)?;

            // Dex keeps the secret it was created with
            let secret = prior.inputs.secret.clone().or_else(|| inputs.secret.clone());

            if request.dry_run {
                debug!("Preview only, not calling Dex");
                return Ok(ClientState {
                    inputs: ClientInputs {
                        secret: declared.secret.clone().or(secret),
                        ..declared
                    },
                    created_at: prior.created_at,
                });
            }

            let update = ClientUpdate {
                id: inputs.client_id.clone(),
                name: inputs.name.clone(),
                redirect_uris: inputs.redirect_uris.clone(),
                trusted_peers: inputs.trusted_peers.clone(),
                logo_url: inputs.logo_url.clone().unwrap_or_default(),
            };
            let id = update.id.clone();

            let outcome = ctx
                .call(Operation::Update, Self::KIND, &id, ctx.api().update_client(update))
                .await?;
            if outcome == MutationOutcome::NotFound {
                return Err(ReconcileError::remote(
                    Operation::Update,
                    Self::KIND,
                    id,
                    RemoteError::NotFound,
                ));
            }

            info!("Updated client");
            Ok(ClientState {
                inputs: ClientInputs { secret, ..inputs },
                created_at: prior.created_at,
            })
        }
        .instrument(span)
        .await
    }

    async fn delete(
        &self,
        ctx: &ReconcileContext,
        request: DeleteRequest<ClientState>,
    ) -> ReconcileResult<()> {
        let id = if request.id.is_empty() {
            request.state.inputs.client_id.clone()
        } else {
            request.id.clone()
        };
        let span = info_span!("dex.client.delete", client.id = %id);

        async move {
            if id.is_empty() {
                return Err(ReconcileError::MissingId { kind: Self::KIND });
            }

            // Dex reports a missing client either as a flag or as a status
            let absent = match ctx
                .call(Operation::Delete, Self::KIND, &id, ctx.api().delete_client(&id))
                .await
            {
                Ok(outcome) => outcome == MutationOutcome::NotFound,
                Err(e) if e.is_not_found() => true,
                Err(e) => return Err(e),
            };
            if absent {
                info!("Client already absent from Dex");
                return Ok(());
            }

            ctx.settle().await;

            let clients = ctx
                .call(Operation::List, Self::KIND, &id, ctx.api().list_clients())
                .await
                .map_err(|e| ReconcileError::VerificationFailed {
                    kind: Self::KIND,
                    id: id.clone(),
                    reason: format!("could not confirm deletion: {e}"),
                })?;

            if clients.iter().any(|client| client.id == id) {
                error!("Dex reported the client deleted but still lists it");
                return Err(ReconcileError::VerificationFailed {
                    kind: Self::KIND,
                    id: id.clone(),
                    reason: "delete reported success but the client is still present; \
                             it may need manual cleanup in Dex"
                        .to_string(),
                });
            }

            info!("Deleted client");
            Ok(())
        }
        .instrument(span)
        .await
    }
}
