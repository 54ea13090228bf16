//! Manifest format read by `dexctl apply`.

use async_trait::async_trait;
use dex_reconciler::remote::{
    ClientUpdate, ConnectorUpdate, CreateOutcome, MutationOutcome, RemoteClient, RemoteConnector,
};
use dex_reconciler::resources::flavors::{
    AzureMicrosoftInputs, AzureOidcInputs, CognitoOidcInputs, ConnectorInputs, GitHubInputs,
    GitLabInputs, GoogleInputs, LocalInputs,
};
use dex_reconciler::resources::ClientInputs;
use dex_reconciler::{DexApi, RemoteError};
use serde::Deserialize;
use serde_json::Value;

const REDACTED: &str = "***";
/// Keys whose values are credentials in clients and Dex connector configs
const SECRET_KEYS: &[&str] = &[
    "secret",
    "clientSecret",
    "bindPW",
    "password",
    "hash",
    "privateKey",
];
/// Connector config kept as an opaque JSON string
const RAW_CONFIG_KEY: &str = "rawConfig";

/// One declared object; `kind` selects the reconciler
#[derive(Debug, Deserialize)]
#[serde(tag = "kind")]
pub enum Declared {
    #[serde(rename = "client")]
    Client(ClientInputs),
    #[serde(rename = "connector")]
    Connector(ConnectorInputs),
    #[serde(rename = "azure-oidc-connector")]
    AzureOidcConnector(AzureOidcInputs),
    #[serde(rename = "azure-microsoft-connector")]
    AzureMicrosoftConnector(AzureMicrosoftInputs),
    #[serde(rename = "cognito-oidc-connector")]
    CognitoOidcConnector(CognitoOidcInputs),
    #[serde(rename = "github-connector")]
    GitHubConnector(GitHubInputs),
    #[serde(rename = "gitlab-connector")]
    GitLabConnector(GitLabInputs),
    #[serde(rename = "google-connector")]
    GoogleConnector(GoogleInputs),
    #[serde(rename = "local-connector")]
    LocalConnector(LocalInputs),
}

fn is_secret_key(key: &str) -> bool {
    SECRET_KEYS.iter().any(|secret| secret.eq_ignore_ascii_case(key))
}

/// Mask secret-bearing keys anywhere in a JSON document, including inside
/// raw connector configs
pub fn redact(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, entry) in map.iter_mut() {
                if entry.is_null() {
                    continue;
                }
                if is_secret_key(key) {
                    *entry = Value::String(REDACTED.to_string());
                } else if key == RAW_CONFIG_KEY {
                    redact_raw(entry);
                } else {
                    redact(entry);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact),
        _ => {}
    }
}

/// Raw configs are redacted as JSON when they parse, and hidden entirely
/// when they do not
fn redact_raw(entry: &mut Value) {
    let Value::String(raw) = entry else {
        redact(entry);
        return;
    };
    let masked = match serde_json::from_str::<Value>(raw) {
        Ok(mut parsed) if parsed.is_object() || parsed.is_array() => {
            redact(&mut parsed);
            serde_json::to_string(&parsed).ok()
        }
        _ => None,
    };
    *entry = Value::String(masked.unwrap_or_else(|| REDACTED.to_string()));
}

/// Stand-in API for previews; any call is a bug in the dry-run path
#[derive(Debug)]
pub struct Offline;

fn offline<T>() -> Result<T, RemoteError> {
    Err(RemoteError::Unavailable(
        "dry run does not connect to dex".to_string(),
    ))
}

#[async_trait]
impl DexApi for Offline {
    async fn create_client(&self, _client: RemoteClient) -> Result<CreateOutcome, RemoteError> {
        offline()
    }

    async fn get_client(&self, _id: &str) -> Result<Option<RemoteClient>, RemoteError> {
        offline()
    }

    async fn list_clients(&self) -> Result<Vec<RemoteClient>, RemoteError> {
        offline()
    }

    async fn update_client(&self, _update: ClientUpdate) -> Result<MutationOutcome, RemoteError> {
        offline()
    }

    async fn delete_client(&self, _id: &str) -> Result<MutationOutcome, RemoteError> {
        offline()
    }

    async fn create_connector(
        &self,
        _connector: RemoteConnector,
    ) -> Result<CreateOutcome, RemoteError> {
        offline()
    }

    async fn list_connectors(&self) -> Result<Vec<RemoteConnector>, RemoteError> {
        offline()
    }

    async fn update_connector(
        &self,
        _update: ConnectorUpdate,
    ) -> Result<MutationOutcome, RemoteError> {
        offline()
    }

    async fn delete_connector(&self, _id: &str) -> Result<MutationOutcome, RemoteError> {
        offline()
    }
}
