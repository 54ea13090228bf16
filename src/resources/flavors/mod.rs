//! # Connector Flavors
//!
//! One [`ConnectorFlavor`](super::ConnectorFlavor) per connector kind.
//!
//! | Kind                        | Dex type    |
//! |-----------------------------|-------------|
//! | `connector`                 | caller-set  |
//! | `azure-oidc-connector`      | `oidc`      |
//! | `azure-microsoft-connector` | `microsoft` |
//! | `cognito-oidc-connector`    | `oidc`      |
//! | `github-connector`          | `github`    |
//! | `gitlab-connector`          | `gitlab`    |
//! | `google-connector`          | `google`    |
//! | `local-connector`           | `local`     |

pub mod azure_microsoft;
pub mod azure_oidc;
pub mod cognito;
pub mod generic;
pub mod github;
pub mod gitlab;
pub mod google;
pub mod local;

pub use azure_microsoft::{AzureMicrosoftFlavor, AzureMicrosoftInputs};
pub use azure_oidc::{AzureOidcFlavor, AzureOidcInputs};
pub use cognito::{CognitoOidcFlavor, CognitoOidcInputs};
pub use generic::{ConnectorInputs, GenericFlavor};
pub use github::{GitHubFlavor, GitHubInputs, GitHubOrg};
pub use gitlab::{GitLabFlavor, GitLabInputs};
pub use google::{GoogleFlavor, GoogleInputs};
pub use local::{LocalFlavor, LocalInputs};

use super::ConnectorResource;
use crate::secret::SecretString;
use crate::validation::Failures;

pub type GenericConnector = ConnectorResource<GenericFlavor>;
pub type AzureOidcConnector = ConnectorResource<AzureOidcFlavor>;
pub type AzureMicrosoftConnector = ConnectorResource<AzureMicrosoftFlavor>;
pub type CognitoOidcConnector = ConnectorResource<CognitoOidcFlavor>;
pub type GitHubConnector = ConnectorResource<GitHubFlavor>;
pub type GitLabConnector = ConnectorResource<GitLabFlavor>;
pub type GoogleConnector = ConnectorResource<GoogleFlavor>;
pub type LocalConnector = ConnectorResource<LocalFlavor>;

/// OAuth2 app registration every upstream provider needs
fn require_credentials(
    failures: &mut Failures,
    client_id: &str,
    client_secret: &SecretString,
    redirect_uri: &str,
) {
    failures.require("clientId", client_id);
    failures.require("clientSecret", client_secret.expose());
    failures.require("redirectUri", redirect_uri);
}

/// Replace an empty list with a default
fn default_list(values: &mut Vec<String>, defaults: &[&str]) {
    if values.is_empty() {
        *values = defaults.iter().map(ToString::to_string).collect();
    }
}

/// Replace a missing value with a default
fn default_string(value: &mut Option<String>, default: &str) {
    if value.is_none() {
        *value = Some(default.to_string());
    }
}
