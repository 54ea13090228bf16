//! GitHub (and GitHub Enterprise) through Dex's `github` connector.

use super::{default_string, require_credentials};
use crate::codec::oidc::OAuthCredentials;
use crate::codec::{
    parse_object, take_bool, take_string, take_string_list, take_string_or_empty, CodecError,
    ConfigBuilder, ConfigMap,
};
use crate::constants::{DEFAULT_GITHUB_TEAM_NAME_FIELD, GITHUB_TEAM_NAME_FIELDS};
use crate::remote::RemoteConnector;
use crate::resources::ConnectorFlavor;
use crate::secret::SecretString;
use crate::validation::Failures;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const GITHUB_CONNECTOR_TYPE: &str = "github";

/// Organization whose members (optionally only some teams) may log in
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubOrg {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub teams: Vec<String>,
    /// Per-org keys with no typed field
    #[serde(default, skip_serializing_if = "ConfigMap::is_empty")]
    pub extra: ConfigMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubInputs {
    pub connector_id: String,
    pub name: String,
    pub client_id: String,
    #[serde(default)]
    pub client_secret: SecretString,
    pub redirect_uri: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub orgs: Vec<GitHubOrg>,
    #[serde(default)]
    pub load_all_groups: bool,
    /// `name`, `slug` or `both`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_name_field: Option<String>,
    #[serde(default, rename = "useLoginAsID")]
    pub use_login_as_id: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_email_domain: Option<String>,
    /// GitHub Enterprise host name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
    /// CA bundle path for GitHub Enterprise
    #[serde(default, rename = "rootCA", skip_serializing_if = "Option::is_none")]
    pub root_ca: Option<String>,
    #[serde(default, skip_serializing_if = "ConfigMap::is_empty")]
    pub extra_config: ConfigMap,
}

fn encode_orgs(orgs: &[GitHubOrg]) -> Value {
    Value::Array(
        orgs.iter()
            .map(|org| {
                ConfigBuilder::new()
                    .string("name", &org.name)
                    .list("teams", &org.teams)
                    .extra(&org.extra)
                    .build()
                    .into()
            })
            .collect(),
    )
}

/// Typed orgs, or `None` when the stored value is not an array of objects
/// and has to be passed through untouched
fn decode_orgs(value: &Value) -> Option<Vec<GitHubOrg>> {
    let items = value.as_array()?;
    items
        .iter()
        .map(|item| {
            let mut org = item.as_object()?.clone();
            Some(GitHubOrg {
                name: take_string_or_empty(&mut org, "name"),
                teams: take_string_list(&mut org, "teams"),
                extra: org,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GitHubFlavor;

impl ConnectorFlavor for GitHubFlavor {
    type Inputs = GitHubInputs;

    const KIND: &'static str = "github-connector";

    fn id(inputs: &GitHubInputs) -> &str {
        &inputs.connector_id
    }

    fn name(inputs: &GitHubInputs) -> &str {
        &inputs.name
    }

    fn connector_type(_inputs: &GitHubInputs) -> String {
        GITHUB_CONNECTOR_TYPE.to_string()
    }

    fn validate(inputs: &GitHubInputs, failures: &mut Failures) {
        require_credentials(
            failures,
            &inputs.client_id,
            &inputs.client_secret,
            &inputs.redirect_uri,
        );
        for (index, org) in inputs.orgs.iter().enumerate() {
            if org.name.trim().is_empty() {
                failures.push(&format!("orgs[{index}].name"), "must not be empty");
            }
            failures.no_blank_entries(&format!("orgs[{index}].teams"), &org.teams);
        }
        failures.one_of(
            "teamNameField",
            inputs.team_name_field.as_deref(),
            GITHUB_TEAM_NAME_FIELDS,
        );
    }

    fn apply_defaults(inputs: &mut GitHubInputs) {
        default_string(&mut inputs.team_name_field, DEFAULT_GITHUB_TEAM_NAME_FIELD);
    }

    fn encode(inputs: &GitHubInputs) -> Result<Vec<u8>, CodecError> {
        let credentials = OAuthCredentials {
            client_id: inputs.client_id.clone(),
            client_secret: inputs.client_secret.clone(),
            redirect_uri: inputs.redirect_uri.clone(),
        };
        let mut builder = credentials.write(ConfigBuilder::new());
        if !inputs.orgs.is_empty() {
            builder = builder.value("orgs", encode_orgs(&inputs.orgs));
        }
        builder
            .flag("loadAllGroups", inputs.load_all_groups)
            .opt_string("teamNameField", inputs.team_name_field.as_deref())
            .flag("useLoginAsID", inputs.use_login_as_id)
            .opt_string("preferredEmailDomain", inputs.preferred_email_domain.as_deref())
            .opt_string("hostName", inputs.host_name.as_deref())
            .opt_string("rootCA", inputs.root_ca.as_deref())
            .extra(&inputs.extra_config)
            .to_bytes()
    }

    fn decode(
        remote: RemoteConnector,
        _prior: Option<&GitHubInputs>,
    ) -> Result<GitHubInputs, CodecError> {
        let mut map = parse_object(&remote.config)?;
        let credentials = OAuthCredentials::take(&mut map);
        let orgs = match map.get("orgs").and_then(decode_orgs) {
            Some(orgs) => {
                map.remove("orgs");
                orgs
            }
            None => Vec::new(),
        };
        Ok(GitHubInputs {
            connector_id: remote.id,
            name: remote.name,
            client_id: credentials.client_id,
            client_secret: credentials.client_secret,
            redirect_uri: credentials.redirect_uri,
            orgs,
            load_all_groups: take_bool(&mut map, "loadAllGroups").unwrap_or(false),
            team_name_field: take_string(&mut map, "teamNameField"),
            use_login_as_id: take_bool(&mut map, "useLoginAsID").unwrap_or(false),
            preferred_email_domain: take_string(&mut map, "preferredEmailDomain"),
            host_name: take_string(&mut map, "hostName"),
            root_ca: take_string(&mut map, "rootCA"),
            extra_config: map,
        })
    }
}
