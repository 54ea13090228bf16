//! Azure AD (Entra ID) through Dex's generic `oidc` connector.
//!
//! The issuer is derived from the tenant id and cannot be set directly.

use super::{default_list, default_string, require_credentials};
use crate::codec::oidc::OAuthCredentials;
use crate::codec::templates::{azure_issuer, parse_azure_issuer};
use crate::codec::{
    parse_object, take_string, take_string_list, CodecError, ConfigBuilder, ConfigMap,
};
use crate::constants::{
    AZURE_USERNAME_SOURCES, DEFAULT_AZURE_SCOPES, DEFAULT_AZURE_USERNAME_SOURCE,
    OIDC_CONNECTOR_TYPE,
};
use crate::remote::RemoteConnector;
use crate::resources::ConnectorFlavor;
use crate::secret::SecretString;
use crate::validation::Failures;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureOidcInputs {
    pub connector_id: String,
    pub name: String,
    /// Directory (tenant) id; changing it requires replacement
    pub tenant_id: String,
    pub client_id: String,
    #[serde(default)]
    pub client_secret: SecretString,
    pub redirect_uri: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
    /// Claim used as the Dex username: `preferred_username`, `upn` or `email`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name_source: Option<String>,
    #[serde(default, skip_serializing_if = "ConfigMap::is_empty")]
    pub extra_oidc: ConfigMap,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AzureOidcFlavor;

impl ConnectorFlavor for AzureOidcFlavor {
    type Inputs = AzureOidcInputs;

    const KIND: &'static str = "azure-oidc-connector";

    fn id(inputs: &AzureOidcInputs) -> &str {
        &inputs.connector_id
    }

    fn name(inputs: &AzureOidcInputs) -> &str {
        &inputs.name
    }

    fn connector_type(_inputs: &AzureOidcInputs) -> String {
        OIDC_CONNECTOR_TYPE.to_string()
    }

    fn validate(inputs: &AzureOidcInputs, failures: &mut Failures) {
        failures.require("tenantId", &inputs.tenant_id);
        failures.uuid("tenantId", &inputs.tenant_id);
        require_credentials(
            failures,
            &inputs.client_id,
            &inputs.client_secret,
            &inputs.redirect_uri,
        );
        failures.no_blank_entries("scopes", &inputs.scopes);
        failures.one_of(
            "userNameSource",
            inputs.user_name_source.as_deref(),
            AZURE_USERNAME_SOURCES,
        );
    }

    fn apply_defaults(inputs: &mut AzureOidcInputs) {
        default_list(&mut inputs.scopes, DEFAULT_AZURE_SCOPES);
        default_string(&mut inputs.user_name_source, DEFAULT_AZURE_USERNAME_SOURCE);
    }

    fn changed_immutable_field(prior: &AzureOidcInputs, next: &AzureOidcInputs) -> Option<&'static str> {
        (!prior.tenant_id.eq_ignore_ascii_case(&next.tenant_id)).then_some("tenantId")
    }

    fn encode(inputs: &AzureOidcInputs) -> Result<Vec<u8>, CodecError> {
        let credentials = OAuthCredentials {
            client_id: inputs.client_id.clone(),
            client_secret: inputs.client_secret.clone(),
            redirect_uri: inputs.redirect_uri.clone(),
        };
        credentials
            .write(ConfigBuilder::new().string("issuer", &azure_issuer(&inputs.tenant_id)))
            .list("scopes", &inputs.scopes)
            .opt_string("userNameKey", inputs.user_name_source.as_deref())
            .extra(&inputs.extra_oidc)
            .to_bytes()
    }

    fn decode(
        remote: RemoteConnector,
        _prior: Option<&AzureOidcInputs>,
    ) -> Result<AzureOidcInputs, CodecError> {
        let mut map = parse_object(&remote.config)?;
        let tenant_id = take_string(&mut map, "issuer")
            .and_then(|issuer| parse_azure_issuer(&issuer))
            .unwrap_or_default();
        let credentials = OAuthCredentials::take(&mut map);
        Ok(AzureOidcInputs {
            connector_id: remote.id,
            name: remote.name,
            tenant_id,
            client_id: credentials.client_id,
            client_secret: credentials.client_secret,
            redirect_uri: credentials.redirect_uri,
            scopes: take_string_list(&mut map, "scopes"),
            user_name_source: take_string(&mut map, "userNameKey"),
            extra_oidc: map,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    const TENANT: &str = "0d1e2f3a-4b5c-6d7e-8f90-a1b2c3d4e5f6";

    fn inputs() -> AzureOidcInputs {
        AzureOidcInputs {
            connector_id: "azure".to_string(),
            name: "Azure AD".to_string(),
            tenant_id: TENANT.to_string(),
            client_id: "app-id".to_string(),
            client_secret: SecretString::new("s3cr3t"),
            redirect_uri: "https://dex.example.com/callback".to_string(),
            ..AzureOidcInputs::default()
        }
    }

    fn remote(inputs: &AzureOidcInputs) -> RemoteConnector {
        RemoteConnector {
            id: inputs.connector_id.clone(),
            connector_type: AzureOidcFlavor::connector_type(inputs),
            name: inputs.name.clone(),
            config: AzureOidcFlavor::encode(inputs).unwrap(),
        }
    }

    #[test]
    fn test_encode_derives_issuer() {
        let mut inputs = inputs();
        AzureOidcFlavor::apply_defaults(&mut inputs);
        let config: Value = serde_json::from_slice(&AzureOidcFlavor::encode(&inputs).unwrap()).unwrap();
        assert_eq!(
            config["issuer"],
            json!(format!("https://login.microsoftonline.com/{TENANT}/v2.0"))
        );
        assert_eq!(config["clientID"], json!("app-id"));
        assert_eq!(config["userNameKey"], json!("preferred_username"));
        assert_eq!(
            config["scopes"],
            json!(["openid", "profile", "email", "offline_access"])
        );
    }

    #[test]
    fn test_round_trip_with_extension_fields() {
        let mut extra = ConfigMap::new();
        extra.insert("insecureEnableGroups".to_string(), json!(true));
        extra.insert("groupsPrefix".to_string(), json!("azure:"));
        let inputs = AzureOidcInputs {
            scopes: vec!["openid".to_string()],
            user_name_source: Some("upn".to_string()),
            extra_oidc: extra,
            ..inputs()
        };
        assert_eq!(AzureOidcFlavor::decode(remote(&inputs), None).unwrap(), inputs);
    }

    #[test]
    fn test_extension_cannot_override_issuer() {
        let mut extra = ConfigMap::new();
        extra.insert("issuer".to_string(), json!("https://evil.example"));
        let inputs = AzureOidcInputs {
            extra_oidc: extra,
            ..inputs()
        };
        let decoded = AzureOidcFlavor::decode(remote(&inputs), None).unwrap();
        assert_eq!(decoded.tenant_id, TENANT);
        assert!(decoded.extra_oidc.is_empty());
    }

    #[test]
    fn test_foreign_issuer_leaves_tenant_empty() {
        let remote = RemoteConnector {
            id: "azure".to_string(),
            connector_type: "oidc".to_string(),
            name: "Azure AD".to_string(),
            config: br#"{"issuer":"https://accounts.google.com","clientID":"x"}"#.to_vec(),
        };
        let decoded = AzureOidcFlavor::decode(remote, None).unwrap();
        assert_eq!(decoded.tenant_id, "");
        assert_eq!(decoded.client_id, "x");
    }

    #[test]
    fn test_validation() {
        let mut failures = Failures::new();
        AzureOidcFlavor::validate(
            &AzureOidcInputs {
                tenant_id: "not-a-tenant".to_string(),
                client_secret: SecretString::default(),
                user_name_source: Some("nickname".to_string()),
                ..inputs()
            },
            &mut failures,
        );
        let properties: Vec<_> = failures.into_vec().into_iter().map(|f| f.property).collect();
        assert_eq!(properties, vec!["tenantId", "clientSecret", "userNameSource"]);
    }

    #[test]
    fn test_tenant_is_immutable() {
        let next = AzureOidcInputs {
            tenant_id: "11111111-2222-3333-4444-555555555555".to_string(),
            ..inputs()
        };
        assert_eq!(
            AzureOidcFlavor::changed_immutable_field(&inputs(), &next),
            Some("tenantId")
        );
        let same_upper = AzureOidcInputs {
            tenant_id: TENANT.to_uppercase(),
            ..inputs()
        };
        assert_eq!(
            AzureOidcFlavor::changed_immutable_field(&inputs(), &same_upper),
            None
        );
    }
}
