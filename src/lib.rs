//! Dex Reconciler Library
//!
//! Reconciles declared Dex OAuth2 clients and connectors against a live Dex
//! instance through its gRPC admin API.
//!
//! An orchestrator builds one [`ReconcileContext`](resources::ReconcileContext)
//! per provider instance and drives objects through the
//! [`Resource`](resources::Resource) contract: `check`, then `create`,
//! `read`, `update` or `delete`. Tests are included in the module files and
//! under `tests/`.

pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod observability;
pub mod remote;
pub mod resources;
pub mod secret;
pub mod validation;

pub use config::ProviderConfig;
pub use error::{Operation, ReconcileError, ReconcileResult};
pub use remote::{DexApi, DexGrpc, RemoteError};
pub use resources::{ReconcileContext, Resource};
pub use secret::{SecretPolicy, SecretString};
