//! Azure AD through Dex's native `microsoft` connector.

use super::require_credentials;
use crate::codec::oidc::OAuthCredentials;
use crate::codec::{
    parse_object, take_string_list, take_string_or_empty, CodecError, ConfigBuilder, ConfigMap,
};
use crate::constants::AZURE_WELL_KNOWN_TENANTS;
use crate::remote::RemoteConnector;
use crate::resources::ConnectorFlavor;
use crate::secret::SecretString;
use crate::validation::{is_uuid, Failures};
use serde::{Deserialize, Serialize};

const MICROSOFT_CONNECTOR_TYPE: &str = "microsoft";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureMicrosoftInputs {
    pub connector_id: String,
    pub name: String,
    /// `common`, `organizations`, `consumers` or a tenant UUID
    pub tenant: String,
    pub client_id: String,
    #[serde(default)]
    pub client_secret: SecretString,
    pub redirect_uri: String,
    /// Only users in these groups may log in
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    #[serde(default, skip_serializing_if = "ConfigMap::is_empty")]
    pub extra_config: ConfigMap,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AzureMicrosoftFlavor;

impl ConnectorFlavor for AzureMicrosoftFlavor {
    type Inputs = AzureMicrosoftInputs;

    const KIND: &'static str = "azure-microsoft-connector";

    fn id(inputs: &AzureMicrosoftInputs) -> &str {
        &inputs.connector_id
    }

    fn name(inputs: &AzureMicrosoftInputs) -> &str {
        &inputs.name
    }

    fn connector_type(_inputs: &AzureMicrosoftInputs) -> String {
        MICROSOFT_CONNECTOR_TYPE.to_string()
    }

    fn validate(inputs: &AzureMicrosoftInputs, failures: &mut Failures) {
        if inputs.tenant.trim().is_empty() {
            failures.push("tenant", "tenant is required");
        } else if !AZURE_WELL_KNOWN_TENANTS.contains(&inputs.tenant.as_str()) && !is_uuid(&inputs.tenant) {
            failures.push(
                "tenant",
                format!(
                    "must be one of {} or a tenant UUID",
                    AZURE_WELL_KNOWN_TENANTS.join(", ")
                ),
            );
        }
        require_credentials(
            failures,
            &inputs.client_id,
            &inputs.client_secret,
            &inputs.redirect_uri,
        );
        failures.no_blank_entries("groups", &inputs.groups);
    }

    fn changed_immutable_field(
        prior: &AzureMicrosoftInputs,
        next: &AzureMicrosoftInputs,
    ) -> Option<&'static str> {
        (!prior.tenant.eq_ignore_ascii_case(&next.tenant)).then_some("tenant")
    }

    fn encode(inputs: &AzureMicrosoftInputs) -> Result<Vec<u8>, CodecError> {
        let credentials = OAuthCredentials {
            client_id: inputs.client_id.clone(),
            client_secret: inputs.client_secret.clone(),
            redirect_uri: inputs.redirect_uri.clone(),
        };
        credentials
            .write(ConfigBuilder::new())
            .string("tenant", &inputs.tenant)
            .list("groups", &inputs.groups)
            .extra(&inputs.extra_config)
            .to_bytes()
    }

    fn decode(
        remote: RemoteConnector,
        _prior: Option<&AzureMicrosoftInputs>,
    ) -> Result<AzureMicrosoftInputs, CodecError> {
        let mut map = parse_object(&remote.config)?;
        let credentials = OAuthCredentials::take(&mut map);
        Ok(AzureMicrosoftInputs {
            connector_id: remote.id,
            name: remote.name,
            tenant: take_string_or_empty(&mut map, "tenant"),
            client_id: credentials.client_id,
            client_secret: credentials.client_secret,
            redirect_uri: credentials.redirect_uri,
            groups: take_string_list(&mut map, "groups"),
            extra_config: map,
        })
    }
}
