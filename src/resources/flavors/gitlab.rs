//! GitLab (SaaS or self-managed) through Dex's `gitlab` connector.

use super::{default_string, require_credentials};
use crate::codec::oidc::OAuthCredentials;
use crate::codec::{
    parse_object, take_bool, take_string, take_string_list, CodecError, ConfigBuilder, ConfigMap,
};
use crate::constants::DEFAULT_GITLAB_BASE_URL;
use crate::remote::RemoteConnector;
use crate::resources::ConnectorFlavor;
use crate::secret::SecretString;
use crate::validation::Failures;
use serde::{Deserialize, Serialize};

const GITLAB_CONNECTOR_TYPE: &str = "gitlab";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitLabInputs {
    pub connector_id: String,
    pub name: String,
    #[serde(default, rename = "baseURL", skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub client_id: String,
    #[serde(default)]
    pub client_secret: SecretString,
    pub redirect_uri: String,
    /// Only members of these groups may log in
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    #[serde(default, rename = "useLoginAsID")]
    pub use_login_as_id: bool,
    #[serde(default)]
    pub get_groups_permission: bool,
    #[serde(default, skip_serializing_if = "ConfigMap::is_empty")]
    pub extra_config: ConfigMap,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GitLabFlavor;

impl ConnectorFlavor for GitLabFlavor {
    type Inputs = GitLabInputs;

    const KIND: &'static str = "gitlab-connector";

    fn id(inputs: &GitLabInputs) -> &str {
        &inputs.connector_id
    }

    fn name(inputs: &GitLabInputs) -> &str {
        &inputs.name
    }

    fn connector_type(_inputs: &GitLabInputs) -> String {
        GITLAB_CONNECTOR_TYPE.to_string()
    }

    fn validate(inputs: &GitLabInputs, failures: &mut Failures) {
        if inputs.base_url.as_deref().is_some_and(|url| url.trim().is_empty()) {
            failures.push("baseURL", "must not be empty when set");
        }
        require_credentials(
            failures,
            &inputs.client_id,
            &inputs.client_secret,
            &inputs.redirect_uri,
        );
        failures.no_blank_entries("groups", &inputs.groups);
    }

    fn apply_defaults(inputs: &mut GitLabInputs) {
        default_string(&mut inputs.base_url, DEFAULT_GITLAB_BASE_URL);
    }

    fn encode(inputs: &GitLabInputs) -> Result<Vec<u8>, CodecError> {
        let credentials = OAuthCredentials {
            client_id: inputs.client_id.clone(),
            client_secret: inputs.client_secret.clone(),
            redirect_uri: inputs.redirect_uri.clone(),
        };
        credentials
            .write(ConfigBuilder::new().opt_string("baseURL", inputs.base_url.as_deref()))
            .list("groups", &inputs.groups)
            .flag("useLoginAsID", inputs.use_login_as_id)
            .flag("getGroupsPermission", inputs.get_groups_permission)
            .extra(&inputs.extra_config)
            .to_bytes()
    }

    fn decode(
        remote: RemoteConnector,
        _prior: Option<&GitLabInputs>,
    ) -> Result<GitLabInputs, CodecError> {
        let mut map = parse_object(&remote.config)?;
        let credentials = OAuthCredentials::take(&mut map);
        Ok(GitLabInputs {
            connector_id: remote.id,
            name: remote.name,
            base_url: take_string(&mut map, "baseURL"),
            client_id: credentials.client_id,
            client_secret: credentials.client_secret,
            redirect_uri: credentials.redirect_uri,
            groups: take_string_list(&mut map, "groups"),
            use_login_as_id: take_bool(&mut map, "useLoginAsID").unwrap_or(false),
            get_groups_permission: take_bool(&mut map, "getGroupsPermission").unwrap_or(false),
            extra_config: map,
        })
    }
}
