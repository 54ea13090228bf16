//! Google accounts through Dex's `google` connector.

use super::{default_string, require_credentials};
use crate::codec::oidc::OAuthCredentials;
use crate::codec::{
    parse_object, take_string, take_string_list, take_string_map, CodecError, ConfigBuilder,
    ConfigMap,
};
use crate::constants::{DEFAULT_GOOGLE_PROMPT_TYPE, GOOGLE_PROMPT_TYPES};
use crate::remote::RemoteConnector;
use crate::resources::ConnectorFlavor;
use crate::secret::SecretString;
use crate::validation::Failures;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const GOOGLE_CONNECTOR_TYPE: &str = "google";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleInputs {
    pub connector_id: String,
    pub name: String,
    pub client_id: String,
    #[serde(default)]
    pub client_secret: SecretString,
    pub redirect_uri: String,
    /// `consent`, `select_account`, `login` or `none`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_type: Option<String>,
    /// Google Workspace domains allowed to log in
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hosted_domains: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    /// Service account key used to fetch group membership
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_file_path: Option<String>,
    /// Admin account to impersonate per Workspace domain
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub domain_to_admin_email: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "ConfigMap::is_empty")]
    pub extra_config: ConfigMap,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GoogleFlavor;

impl ConnectorFlavor for GoogleFlavor {
    type Inputs = GoogleInputs;

    const KIND: &'static str = "google-connector";

    fn id(inputs: &GoogleInputs) -> &str {
        &inputs.connector_id
    }

    fn name(inputs: &GoogleInputs) -> &str {
        &inputs.name
    }

    fn connector_type(_inputs: &GoogleInputs) -> String {
        GOOGLE_CONNECTOR_TYPE.to_string()
    }

    fn validate(inputs: &GoogleInputs, failures: &mut Failures) {
        require_credentials(
            failures,
            &inputs.client_id,
            &inputs.client_secret,
            &inputs.redirect_uri,
        );
        failures.one_of("promptType", inputs.prompt_type.as_deref(), GOOGLE_PROMPT_TYPES);
        failures.no_blank_entries("hostedDomains", &inputs.hosted_domains);
        failures.no_blank_entries("groups", &inputs.groups);
    }

    fn apply_defaults(inputs: &mut GoogleInputs) {
        default_string(&mut inputs.prompt_type, DEFAULT_GOOGLE_PROMPT_TYPE);
    }

    fn encode(inputs: &GoogleInputs) -> Result<Vec<u8>, CodecError> {
        let credentials = OAuthCredentials {
            client_id: inputs.client_id.clone(),
            client_secret: inputs.client_secret.clone(),
            redirect_uri: inputs.redirect_uri.clone(),
        };
        credentials
            .write(ConfigBuilder::new())
            .opt_string("promptType", inputs.prompt_type.as_deref())
            .list("hostedDomains", &inputs.hosted_domains)
            .list("groups", &inputs.groups)
            .opt_string(
                "serviceAccountFilePath",
                inputs.service_account_file_path.as_deref(),
            )
            .string_map("domainToAdminEmail", &inputs.domain_to_admin_email)
            .extra(&inputs.extra_config)
            .to_bytes()
    }

    fn decode(
        remote: RemoteConnector,
        _prior: Option<&GoogleInputs>,
    ) -> Result<GoogleInputs, CodecError> {
        let mut map = parse_object(&remote.config)?;
        let credentials = OAuthCredentials::take(&mut map);
        Ok(GoogleInputs {
            connector_id: remote.id,
            name: remote.name,
            client_id: credentials.client_id,
            client_secret: credentials.client_secret,
            redirect_uri: credentials.redirect_uri,
            prompt_type: take_string(&mut map, "promptType"),
            hosted_domains: take_string_list(&mut map, "hostedDomains"),
            groups: take_string_list(&mut map, "groups"),
            service_account_file_path: take_string(&mut map, "serviceAccountFilePath"),
            domain_to_admin_email: take_string_map(&mut map, "domainToAdminEmail"),
            extra_config: map,
        })
    }
}
