//! AWS Cognito user pools through Dex's generic `oidc` connector.
//!
//! The issuer is derived from the region and user pool id; both are
//! immutable.

use super::{default_list, default_string, require_credentials};
use crate::codec::oidc::OAuthCredentials;
use crate::codec::templates::{cognito_issuer, parse_cognito_issuer};
use crate::codec::{
    parse_object, take_string, take_string_list, CodecError, ConfigBuilder, ConfigMap,
};
use crate::constants::{
    COGNITO_USERNAME_SOURCES, DEFAULT_COGNITO_SCOPES, DEFAULT_COGNITO_USERNAME_SOURCE,
    OIDC_CONNECTOR_TYPE,
};
use crate::remote::RemoteConnector;
use crate::resources::ConnectorFlavor;
use crate::secret::SecretString;
use crate::validation::{is_aws_region, is_cognito_user_pool_id, Failures};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CognitoOidcInputs {
    pub connector_id: String,
    pub name: String,
    pub region: String,
    pub user_pool_id: String,
    pub client_id: String,
    #[serde(default)]
    pub client_secret: SecretString,
    pub redirect_uri: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
    /// `email` or `sub`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name_source: Option<String>,
    #[serde(default, skip_serializing_if = "ConfigMap::is_empty")]
    pub extra_oidc: ConfigMap,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CognitoOidcFlavor;

impl ConnectorFlavor for CognitoOidcFlavor {
    type Inputs = CognitoOidcInputs;

    const KIND: &'static str = "cognito-oidc-connector";

    fn id(inputs: &CognitoOidcInputs) -> &str {
        &inputs.connector_id
    }

    fn name(inputs: &CognitoOidcInputs) -> &str {
        &inputs.name
    }

    fn connector_type(_inputs: &CognitoOidcInputs) -> String {
        OIDC_CONNECTOR_TYPE.to_string()
    }

    fn validate(inputs: &CognitoOidcInputs, failures: &mut Failures) {
        failures.require("region", &inputs.region);
        if !inputs.region.is_empty() && !is_aws_region(&inputs.region) {
            failures.push("region", "must be a valid AWS region identifier");
        }
        failures.require("userPoolId", &inputs.user_pool_id);
        if !inputs.user_pool_id.is_empty() && !is_cognito_user_pool_id(&inputs.user_pool_id) {
            failures.push("userPoolId", "must look like <region>_<id>");
        }
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
            COGNITO_USERNAME_SOURCES,
        );
    }

    fn apply_defaults(inputs: &mut CognitoOidcInputs) {
        default_list(&mut inputs.scopes, DEFAULT_COGNITO_SCOPES);
        default_string(&mut inputs.user_name_source, DEFAULT_COGNITO_USERNAME_SOURCE);
    }

    fn changed_immutable_field(
        prior: &CognitoOidcInputs,
        next: &CognitoOidcInputs,
    ) -> Option<&'static str> {
        if prior.region != next.region {
            Some("region")
        } else if prior.user_pool_id != next.user_pool_id {
            Some("userPoolId")
        } else {
            None
        }
    }

    fn encode(inputs: &CognitoOidcInputs) -> Result<Vec<u8>, CodecError> {
        let credentials = OAuthCredentials {
            client_id: inputs.client_id.clone(),
            client_secret: inputs.client_secret.clone(),
            redirect_uri: inputs.redirect_uri.clone(),
        };
        let issuer = cognito_issuer(&inputs.region, &inputs.user_pool_id);
        credentials
            .write(ConfigBuilder::new().string("issuer", &issuer))
            .list("scopes", &inputs.scopes)
            .opt_string("userNameKey", inputs.user_name_source.as_deref())
            .extra(&inputs.extra_oidc)
            .to_bytes()
    }

    fn decode(
        remote: RemoteConnector,
        _prior: Option<&CognitoOidcInputs>,
    ) -> Result<CognitoOidcInputs, CodecError> {
        let mut map = parse_object(&remote.config)?;
        let (region, user_pool_id) = take_string(&mut map, "issuer")
            .and_then(|issuer| parse_cognito_issuer(&issuer))
            .unwrap_or_default();
        let credentials = OAuthCredentials::take(&mut map);
        Ok(CognitoOidcInputs {
            connector_id: remote.id,
            name: remote.name,
            region,
            user_pool_id,
            client_id: credentials.client_id,
            client_secret: credentials.client_secret,
            redirect_uri: credentials.redirect_uri,
            scopes: take_string_list(&mut map, "scopes"),
            user_name_source: take_string(&mut map, "userNameKey"),
            extra_oidc: map,
        })
    }
}
