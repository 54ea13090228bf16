//! # Connector Reconciler
//!
//! Dex stores every connector as `(id, type, name, config bytes)`. What
//! differs between connector kinds is how the typed inputs map onto the
//! config bytes, which defaults apply and which fields are immutable.
//! That is captured by [`ConnectorFlavor`]; [`ConnectorResource`] runs the
//! Create/Read/Update/Delete contract once for all of them.
//!
//! Dex has no get-by-id for connectors, so reads list and filter.

use super::{
    checked, CreateRequest, CreateResponse, DeleteRequest, ReadRequest, ReadResponse,
    ReconcileContext, Resource, UpdateRequest,
};
use crate::codec::CodecError;
use crate::error::{Operation, ReconcileError, ReconcileResult};
use crate::remote::{ConnectorUpdate, CreateOutcome, MutationOutcome, RemoteConnector, RemoteError};
use crate::validation::{CheckFailure, CheckResponse, Failures};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info, info_span, warn, Instrument, Span};

/// Per-kind behavior of a Dex connector
pub trait ConnectorFlavor: Debug + Default + Send + Sync + 'static {
    type Inputs: Clone + Debug + PartialEq + Send + Sync + Serialize + DeserializeOwned + 'static;

    /// Kind name used in errors, spans and manifests
    const KIND: &'static str;

    fn id(inputs: &Self::Inputs) -> &str;

    fn name(inputs: &Self::Inputs) -> &str;

    /// Dex connector type, e.g. `oidc` or `github`
    fn connector_type(inputs: &Self::Inputs) -> String;

    /// Kind-specific checks; `id` and `name` are checked by the caller
    fn validate(inputs: &Self::Inputs, failures: &mut Failures);

    /// Fill in defaults. Runs before encoding only, never on read.
    fn apply_defaults(_inputs: &mut Self::Inputs) {}

    /// First immutable field (other than the id) that differs
    fn changed_immutable_field(_prior: &Self::Inputs, _next: &Self::Inputs) -> Option<&'static str> {
        None
    }

    /// # Errors
    /// Returns an error if the inputs cannot be serialized
    fn encode(inputs: &Self::Inputs) -> Result<Vec<u8>, CodecError>;

    /// Rebuild inputs from what Dex stores. `prior` is the last reconciled
    /// state, when known.
    ///
    /// # Errors
    /// Returns an error if the stored config cannot be decoded
    fn decode(remote: RemoteConnector, prior: Option<&Self::Inputs>) -> Result<Self::Inputs, CodecError>;
}

/// Reconciler for any [`ConnectorFlavor`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectorResource<F> {
    flavor: std::marker::PhantomData<F>,
}

impl<F: ConnectorFlavor> ConnectorResource<F> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            flavor: std::marker::PhantomData,
        }
    }

    async fn find(
        &self,
        ctx: &ReconcileContext,
        operation: Operation,
        id: &str,
    ) -> ReconcileResult<Option<RemoteConnector>> {
        let connectors = ctx
            .call(operation, F::KIND, id, ctx.api().list_connectors())
            .await?;
        Ok(connectors.into_iter().find(|connector| connector.id == id))
    }

    fn encode(inputs: &F::Inputs) -> ReconcileResult<Vec<u8>> {
        F::encode(inputs).map_err(|e| ReconcileError::codec(F::KIND, F::id(inputs), e))
    }

    fn decode(remote: RemoteConnector, prior: Option<&F::Inputs>) -> ReconcileResult<F::Inputs> {
        let id = remote.id.clone();
        F::decode(remote, prior).map_err(|e| ReconcileError::codec(F::KIND, id, e))
    }

    fn ensure_mutable(prior: &F::Inputs, next: &F::Inputs) -> ReconcileResult<()> {
        if F::id(prior) != F::id(next) {
            return Err(ReconcileError::Validation(vec![CheckFailure::new(
                ID_PROPERTY,
                format!(
                    "cannot be changed from {:?} to {:?}; delete and recreate the connector",
                    F::id(prior),
                    F::id(next)
                ),
            )]));
        }
        if let Some(field) = F::changed_immutable_field(prior, next) {
            return Err(ReconcileError::ReplaceRequired {
                kind: F::KIND,
                id: F::id(next).to_string(),
                field,
            });
        }
        Ok(())
    }
}

/// Property name of the connector id in the declared schema
const ID_PROPERTY: &str = "connectorId";

#[async_trait]
impl<F: ConnectorFlavor> Resource for ConnectorResource<F> {
    type Inputs = F::Inputs;
    type State = F::Inputs;

    const KIND: &'static str = F::KIND;

    fn id(inputs: &F::Inputs) -> &str {
        F::id(inputs)
    }

    fn check(&self, mut inputs: F::Inputs) -> CheckResponse<F::Inputs> {
        let mut failures = Failures::new();
        failures.require(ID_PROPERTY, F::id(&inputs));
        failures.require("name", F::name(&inputs));
        F::validate(&inputs, &mut failures);
        F::apply_defaults(&mut inputs);
        CheckResponse {
            inputs,
            failures: failures.into_vec(),
        }
    }

    async fn create(
        &self,
        ctx: &ReconcileContext,
        request: CreateRequest<F::Inputs>,
    ) -> ReconcileResult<CreateResponse<F::Inputs>> {
        let span = info_span!(
            "dex.connector.create",
            connector.kind = F::KIND,
            connector.id = %F::id(&request.inputs),
            dry_run = request.dry_run,
            operation.outcome = tracing::field::Empty,
        );

        async move {
            let declared = request.inputs.clone();
            let inputs = checked(self, request.inputs)?;
            let id = F::id(&inputs).to_string();

            if request.dry_run {
                debug!("Preview only, not calling Dex");
                return Ok(CreateResponse { id, state: declared });
            }

            let remote = RemoteConnector {
                id: id.clone(),
                connector_type: F::connector_type(&inputs),
                name: F::name(&inputs).to_string(),
                config: Self::encode(&inputs)?,
            };

            let outcome = ctx
                .call(Operation::Create, F::KIND, &id, ctx.api().create_connector(remote))
                .await?;

            if outcome == CreateOutcome::AlreadyExists {
                warn!("Connector already exists in Dex, adopting it");
                Span::current().record("operation.outcome", "adopted");
                let existing = self.find(ctx, Operation::Create, &id).await?.ok_or_else(|| {
                    ReconcileError::remote(Operation::Create, F::KIND, &id, RemoteError::NotFound)
                })?;
                let state = Self::decode(existing, Some(&inputs))?;
                return Ok(CreateResponse { id, state });
            }

            info!("Created connector");
            Span::current().record("operation.outcome", "created");
            Ok(CreateResponse { id, state: inputs })
        }
        .instrument(span)
        .await
    }

    async fn read(
        &self,
        ctx: &ReconcileContext,
        request: ReadRequest<F::Inputs>,
    ) -> ReconcileResult<Option<ReadResponse<F::Inputs, F::Inputs>>> {
        let span = info_span!(
            "dex.connector.read",
            connector.kind = F::KIND,
            connector.id = %request.id,
        );

        async move {
            let Some(remote) = self.find(ctx, Operation::Read, &request.id).await? else {
                info!("Connector not found in Dex");
                return Ok(None);
            };

            let prior = request.state.as_ref();
            if let Some(prior) = prior {
                let expected = F::connector_type(prior);
                if remote.connector_type != expected {
                    warn!(
                        expected = %expected,
                        actual = %remote.connector_type,
                        "Connector type drifted in Dex"
                    );
                }
            }

            let state = Self::decode(remote, prior)?;
            debug!("Read connector");
            Ok(Some(ReadResponse {
                id: request.id,
                inputs: state.clone(),
                state,
            }))
        }
        .instrument(span)
        .await
    }

    async fn update(
        &self,
        ctx: &ReconcileContext,
        request: UpdateRequest<F::Inputs, F::Inputs>,
    ) -> ReconcileResult<F::Inputs> {
        let span = info_span!(
            "dex.connector.update",
            connector.kind = F::KIND,
            connector.id = %request.id,
            dry_run = request.dry_run,
        );

        async move {
            let declared = request.inputs.clone();
            let inputs = checked(self, request.inputs)?;
            Self::ensure_mutable(&request.state, &inputs)?;

            if request.dry_run {
                debug!("Preview only, not calling Dex");
                return Ok(declared);
            }

            let id = F::id(&inputs).to_string();
            let update = ConnectorUpdate {
                id: id.clone(),
                new_type: F::connector_type(&inputs),
                new_name: F::name(&inputs).to_string(),
                new_config: Self::encode(&inputs)?,
            };

            let outcome = ctx
                .call(Operation::Update, F::KIND, &id, ctx.api().update_connector(update))
                .await?;
            if outcome == MutationOutcome::NotFound {
                return Err(ReconcileError::remote(
                    Operation::Update,
                    F::KIND,
                    id,
                    RemoteError::NotFound,
                ));
            }

            info!("Updated connector");
            Ok(inputs)
        }
        .instrument(span)
        .await
    }

    async fn delete(
        &self,
        ctx: &ReconcileContext,
        request: DeleteRequest<F::Inputs>,
    ) -> ReconcileResult<()> {
        let id = if request.id.is_empty() {
            F::id(&request.state).to_string()
        } else {
            request.id.clone()
        };
        let span = info_span!(
            "dex.connector.delete",
            connector.kind = F::KIND,
            connector.id = %id,
        );

        async move {
            if id.is_empty() {
                return Err(ReconcileError::MissingId { kind: F::KIND });
            }

            match ctx
                .call(Operation::Delete, F::KIND, &id, ctx.api().delete_connector(&id))
                .await
            {
                Ok(MutationOutcome::Applied) => info!("Deleted connector"),
                Ok(MutationOutcome::NotFound) => info!("Connector already absent from Dex"),
                Err(e) if e.is_not_found() => info!("Connector already absent from Dex"),
                Err(e) => return Err(e),
            }
            Ok(())
        }
        .instrument(span)
        .await
    }
}
