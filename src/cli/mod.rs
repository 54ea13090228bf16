//! # DEXCTL CLI
//!
//! Command-line interface for reconciling Dex objects by hand.
//!
//! ## Usage
//!
//! ```bash
//! # List every client and connector Dex knows about
//! dexctl verify
//!
//! # Create or update the objects declared in a manifest
//! dexctl apply dex.yaml
//!
//! # Show what apply would do without changing Dex
//! dexctl apply dex.yaml --dry-run
//!
//! # Delete one object (client deletes are verified)
//! dexctl delete client web-app
//! ```
//!
//! Connection settings come from `DEX_HOST`, `DEX_TIMEOUT_SECONDS` and
//! `DEX_DELETE_SETTLE_MS`; `--host` and `--timeout` override them.

mod manifest;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dex_reconciler::observability::init_tracing;
use dex_reconciler::resources::flavors::{
    AzureMicrosoftConnector, AzureOidcConnector, CognitoOidcConnector, GenericConnector,
    GitHubConnector, GitLabConnector, GoogleConnector, LocalConnector,
};
use dex_reconciler::resources::{
    ClientResource, CreateRequest, DeleteRequest, ReadRequest, UpdateRequest,
};
use dex_reconciler::{DexGrpc, ProviderConfig, ReconcileContext, Resource};
use manifest::{redact, Declared};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Dex reconciler CLI
#[derive(Parser)]
#[command(name = "dexctl")]
#[command(
    about = "Reconcile Dex OAuth2 clients and connectors",
    long_about = None,
    after_help = "\
Object kinds:
  client, connector, azure-oidc-connector, azure-microsoft-connector,
  cognito-oidc-connector, github-connector, gitlab-connector,
  google-connector, local-connector

Examples:
  dexctl verify
  dexctl apply dex.yaml --dry-run
  dexctl delete github-connector github
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Dex gRPC endpoint (host:port), overrides DEX_HOST
    #[arg(long, global = true)]
    host: Option<String>,

    /// Per-call deadline in seconds, overrides DEX_TIMEOUT_SECONDS
    #[arg(long, global = true)]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all clients and connectors in Dex
    Verify,
    /// Create or update every object declared in a YAML manifest
    Apply {
        /// Manifest file (a YAML list of objects, each with a `kind`)
        file: PathBuf,
        /// Validate and preview only; Dex is not called
        #[arg(long)]
        dry_run: bool,
    },
    /// Delete one object
    Delete {
        /// Object kind, e.g. `client` or `github-connector`
        kind: String,
        /// Object id
        id: String,
    },
    /// Show build information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ProviderConfig::from_env();
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }
    init_tracing(&config.logging)?;

    match cli.command {
        Commands::Version => {
            print_version();
            Ok(())
        }
        Commands::Apply { file, dry_run: true } => {
            // Previews never touch Dex, so no connection is made
            let ctx = ReconcileContext::new(Arc::new(manifest::Offline), &config);
            apply_manifest(&ctx, &file, true).await
        }
        command => {
            let dex = DexGrpc::connect(&config).await?;
            let ctx = ReconcileContext::new(Arc::new(dex), &config);
            match command {
                Commands::Verify => verify(&ctx).await,
                Commands::Apply { file, dry_run } => apply_manifest(&ctx, &file, dry_run).await,
                Commands::Delete { kind, id } => delete(&ctx, &kind, id).await,
                Commands::Version => Ok(()),
            }
        }
    }
}

fn print_version() {
    println!("dexctl {}", env!("CARGO_PKG_VERSION"));
    println!("  commit: {}", env!("BUILD_GIT_HASH"));
    println!("  built:  {}", env!("BUILD_DATETIME"));
}

async fn verify(ctx: &ReconcileContext) -> Result<()> {
    let clients = ctx
        .api()
        .list_clients()
        .await
        .context("failed to list clients")?;
    println!("Clients ({}):", clients.len());
    for client in &clients {
        println!(
            "  {:<24} name={:?} public={} redirectURIs={:?}",
            client.id, client.name, client.public, client.redirect_uris
        );
    }

    let connectors = ctx
        .api()
        .list_connectors()
        .await
        .context("failed to list connectors")?;
    println!("Connectors ({}):", connectors.len());
    for connector in &connectors {
        println!(
            "  {:<24} type={} name={:?}",
            connector.id, connector.connector_type, connector.name
        );
    }
    Ok(())
}

async fn apply_manifest(ctx: &ReconcileContext, file: &Path, dry_run: bool) -> Result<()> {
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read manifest {}", file.display()))?;
    let objects: Vec<Declared> = serde_yaml::from_str(&contents)
        .with_context(|| format!("failed to parse manifest {}", file.display()))?;
    info!(objects = objects.len(), dry_run, "Applying manifest");

    for object in objects {
        let state = match object {
            Declared::Client(inputs) => apply(&ClientResource, ctx, inputs, dry_run).await?,
            Declared::Connector(inputs) => {
                apply(&GenericConnector::new(), ctx, inputs, dry_run).await?
            }
            Declared::AzureOidcConnector(inputs) => {
                apply(&AzureOidcConnector::new(), ctx, inputs, dry_run).await?
            }
            Declared::AzureMicrosoftConnector(inputs) => {
                apply(&AzureMicrosoftConnector::new(), ctx, inputs, dry_run).await?
            }
            Declared::CognitoOidcConnector(inputs) => {
                apply(&CognitoOidcConnector::new(), ctx, inputs, dry_run).await?
            }
            Declared::GitHubConnector(inputs) => {
                apply(&GitHubConnector::new(), ctx, inputs, dry_run).await?
            }
            Declared::GitLabConnector(inputs) => {
                apply(&GitLabConnector::new(), ctx, inputs, dry_run).await?
            }
            Declared::GoogleConnector(inputs) => {
                apply(&GoogleConnector::new(), ctx, inputs, dry_run).await?
            }
            Declared::LocalConnector(inputs) => {
                apply(&LocalConnector::new(), ctx, inputs, dry_run).await?
            }
        };
        println!("{}", serde_json::to_string_pretty(&state)?);
    }
    Ok(())
}

/// Create the object, or update it when Dex already has it
async fn apply<R: Resource>(
    resource: &R,
    ctx: &ReconcileContext,
    inputs: R::Inputs,
    dry_run: bool,
) -> Result<serde_json::Value> {
    let id = R::id(&inputs).to_string();

    let existing = if dry_run {
        None
    } else {
        resource
            .read(
                ctx,
                ReadRequest {
                    id: id.clone(),
                    state: None,
                },
            )
            .await?
    };

    let state = match existing {
        Some(existing) => {
            resource
                .update(
                    ctx,
                    UpdateRequest {
                        id,
                        inputs,
                        state: existing.state,
                        dry_run,
                    },
                )
                .await?
        }
        None => {
            resource
                .create(ctx, CreateRequest { inputs, dry_run })
                .await?
                .state
        }
    };

    let mut value = serde_json::to_value(&state)?;
    redact(&mut value);
    Ok(serde_json::json!({ "kind": R::KIND, "state": value }))
}

async fn delete(ctx: &ReconcileContext, kind: &str, id: String) -> Result<()> {
    let shown = id.clone();
    match kind {
        "client" => delete_one(&ClientResource, ctx, id).await?,
        "connector" => delete_one(&GenericConnector::new(), ctx, id).await?,
        "azure-oidc-connector" => delete_one(&AzureOidcConnector::new(), ctx, id).await?,
        "azure-microsoft-connector" => delete_one(&AzureMicrosoftConnector::new(), ctx, id).await?,
        "cognito-oidc-connector" => delete_one(&CognitoOidcConnector::new(), ctx, id).await?,
        "github-connector" => delete_one(&GitHubConnector::new(), ctx, id).await?,
        "gitlab-connector" => delete_one(&GitLabConnector::new(), ctx, id).await?,
        "google-connector" => delete_one(&GoogleConnector::new(), ctx, id).await?,
        "local-connector" => delete_one(&LocalConnector::new(), ctx, id).await?,
        other => anyhow::bail!("unknown object kind {other:?}"),
    }
    println!("Deleted {kind} {shown:?}");
    Ok(())
}

async fn delete_one<R>(resource: &R, ctx: &ReconcileContext, id: String) -> Result<()>
where
    R: Resource,
    R::State: Default,
{
    resource
        .delete(
            ctx,
            DeleteRequest {
                id,
                state: R::State::default(),
            },
        )
        .await?;
    Ok(())
}
