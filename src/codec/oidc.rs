//! # OIDC Sub-schema
//!
//! Typed view of Dex's `oidc` connector config.
//!
//! The declared schema spells identifiers `clientId` / `redirectUri`; Dex
//! expects `clientID` / `redirectURI`. Claim mapping keys are nested under
//! `claimMapping` on both sides but named `email`, `groups` and
//! `preferred_username` in Dex.
//!
//! Decoding never fails on content: a known key holding an unexpected type
//! is left in the extension bucket and written back as it was found.

use super::{
    take_bool, take_object, take_secret, take_string, take_string_list,
    take_string_or_empty, ConfigBuilder, ConfigMap,
};
use crate::secret::SecretString;
use serde::{Deserialize, Serialize};

/// Dex `oidc` connector configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OidcConfig {
    pub issuer: String,
    pub client_id: String,
    #[serde(default)]
    pub client_secret: SecretString,
    pub redirect_uri: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure_skip_email_verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure_issuer: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_mapping: Option<ClaimMapping>,
    /// Dex OIDC keys with no typed field, passed through verbatim
    #[serde(default, skip_serializing_if = "ConfigMap::is_empty")]
    pub extra: ConfigMap,
}

/// Overrides for which upstream claims Dex reads
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username_key: Option<String>,
    /// Mapping keys with no typed field
    #[serde(default, skip_serializing_if = "ConfigMap::is_empty")]
    pub extra: ConfigMap,
}

const ISSUER: &str = "issuer";
const CLIENT_ID: &str = "clientID";
const CLIENT_SECRET: &str = "clientSecret";
const REDIRECT_URI: &str = "redirectURI";
const SCOPES: &str = "scopes";
const INSECURE_SKIP_EMAIL_VERIFIED: &str = "insecureSkipEmailVerified";
const INSECURE_ISSUER: &str = "insecureIssuer";
const USER_NAME_KEY: &str = "userNameKey";
const CLAIM_MAPPING: &str = "claimMapping";

impl ClaimMapping {
    fn encode(&self) -> ConfigMap {
        ConfigBuilder::new()
            .opt_string("email", self.email_key.as_deref())
            .opt_string("groups", self.groups_key.as_deref())
            .opt_string("preferred_username", self.preferred_username_key.as_deref())
            .extra(&self.extra)
            .build()
    }

    fn decode(mut map: ConfigMap) -> Self {
        Self {
            email_key: take_string(&mut map, "email"),
            groups_key: take_string(&mut map, "groups"),
            preferred_username_key: take_string(&mut map, "preferred_username"),
            extra: map,
        }
    }
}

impl OidcConfig {
    /// Known fields in Dex spelling, then the extension bucket
    #[must_use]
    pub fn encode(&self) -> ConfigMap {
        let mut builder = ConfigBuilder::new()
            .string(ISSUER, &self.issuer)
            .string(CLIENT_ID, &self.client_id)
            .secret(CLIENT_SECRET, &self.client_secret)
            .string(REDIRECT_URI, &self.redirect_uri)
            .list(SCOPES, &self.scopes)
            .opt_bool(INSECURE_SKIP_EMAIL_VERIFIED, self.insecure_skip_email_verified)
            .opt_bool(INSECURE_ISSUER, self.insecure_issuer)
            .opt_string(USER_NAME_KEY, self.user_name_key.as_deref());
        if let Some(mapping) = &self.claim_mapping {
            builder = builder.value(CLAIM_MAPPING, mapping.encode().into());
        }
        builder.extra(&self.extra).build()
    }

    /// Inverse of [`OidcConfig::encode`]; unknown keys land in `extra`
    #[must_use]
    pub fn decode(mut map: ConfigMap) -> Self {
        let claim_mapping = take_object(&mut map, CLAIM_MAPPING).map(ClaimMapping::decode);
        Self {
            issuer: take_string_or_empty(&mut map, ISSUER),
            client_id: take_string_or_empty(&mut map, CLIENT_ID),
            client_secret: take_secret(&mut map, CLIENT_SECRET),
            redirect_uri: take_string_or_empty(&mut map, REDIRECT_URI),
            scopes: take_string_list(&mut map, SCOPES),
            insecure_skip_email_verified: take_bool(&mut map, INSECURE_SKIP_EMAIL_VERIFIED),
            insecure_issuer: take_bool(&mut map, INSECURE_ISSUER),
            user_name_key: take_string(&mut map, USER_NAME_KEY),
            claim_mapping,
            extra: map,
        }
    }
}

/// Credentials shared by every OAuth2-style flavor, in Dex spelling
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
    pub redirect_uri: String,
}

impl OAuthCredentials {
    #[must_use]
    pub fn write(&self, builder: ConfigBuilder) -> ConfigBuilder {
        builder
            .string(CLIENT_ID, &self.client_id)
            .secret(CLIENT_SECRET, &self.client_secret)
            .string(REDIRECT_URI, &self.redirect_uri)
    }

    #[must_use]
    pub fn take(map: &mut ConfigMap) -> Self {
        Self {
            client_id: take_string_or_empty(map, CLIENT_ID),
            client_secret: take_secret(map, CLIENT_SECRET),
            redirect_uri: take_string_or_empty(map, REDIRECT_URI),
        }
    }
}
