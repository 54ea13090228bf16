//! Generic connector: any Dex connector type, configured either through the
//! typed OIDC sub-schema or a raw JSON document.

use super::default_list;
use crate::codec::{parse_object, to_bytes, CodecError, OidcConfig};
use crate::constants::{DEFAULT_OIDC_SCOPES, OIDC_CONNECTOR_TYPE};
use crate::remote::RemoteConnector;
use crate::resources::ConnectorFlavor;
use crate::validation::Failures;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorInputs {
    pub connector_id: String,
    /// Dex connector type (`oidc`, `saml`, `ldap`, ...)
    #[serde(rename = "type")]
    pub connector_type: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oidc_config: Option<OidcConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_config: Option<String>,
}

impl ConnectorInputs {
    fn has_raw_config(&self) -> bool {
        self.raw_config.as_deref().is_some_and(|raw| !raw.is_empty())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GenericFlavor;

impl ConnectorFlavor for GenericFlavor {
    type Inputs = ConnectorInputs;

    const KIND: &'static str = "connector";

    fn id(inputs: &ConnectorInputs) -> &str {
        &inputs.connector_id
    }

    fn name(inputs: &ConnectorInputs) -> &str {
        &inputs.name
    }

    fn connector_type(inputs: &ConnectorInputs) -> String {
        inputs.connector_type.clone()
    }

    fn validate(inputs: &ConnectorInputs, failures: &mut Failures) {
        failures.require("type", &inputs.connector_type);

        let has_raw = inputs.has_raw_config();
        match (&inputs.oidc_config, has_raw) {
            (Some(_), true) | (None, false) => failures.push(
                "oidcConfig",
                "exactly one of oidcConfig or rawConfig must be set",
            ),
            _ => {}
        }

        if let Some(oidc) = &inputs.oidc_config {
            if inputs.connector_type != OIDC_CONNECTOR_TYPE {
                failures.push(
                    "oidcConfig",
                    format!("only valid when type is \"{OIDC_CONNECTOR_TYPE}\""),
                );
            }
            failures.require("oidcConfig.issuer", &oidc.issuer);
            failures.require("oidcConfig.clientId", &oidc.client_id);
            failures.no_blank_entries("oidcConfig.scopes", &oidc.scopes);
        }

        if let Some(raw) = inputs.raw_config.as_deref().filter(|raw| !raw.is_empty()) {
            if let Err(e) = parse_object(raw.as_bytes()) {
                failures.push("rawConfig", format!("must be a JSON object: {e}"));
            }
        }
    }

    fn apply_defaults(inputs: &mut ConnectorInputs) {
        if let Some(oidc) = inputs.oidc_config.as_mut() {
            default_list(&mut oidc.scopes, DEFAULT_OIDC_SCOPES);
        }
        if inputs.raw_config.as_deref() == Some("") {
            inputs.raw_config = None;
        }
    }

    fn encode(inputs: &ConnectorInputs) -> Result<Vec<u8>, CodecError> {
        match (&inputs.oidc_config, &inputs.raw_config) {
            (Some(oidc), _) => to_bytes(&oidc.encode()),
            // Sent exactly as declared
            (None, Some(raw)) => Ok(raw.as_bytes().to_vec()),
            (None, None) => Ok(b"{}".to_vec()),
        }
    }

    fn decode(
        remote: RemoteConnector,
        prior: Option<&ConnectorInputs>,
    ) -> Result<ConnectorInputs, CodecError> {
        let keep_raw = prior.is_some_and(ConnectorInputs::has_raw_config);
        let typed = (remote.connector_type == OIDC_CONNECTOR_TYPE && !keep_raw)
            .then(|| parse_object(&remote.config).ok().map(OidcConfig::decode))
            .flatten();

        let (oidc_config, raw_config) = match typed {
            Some(oidc) => (Some(oidc), None),
            None if remote.config.is_empty() => (None, None),
            None => (None, Some(String::from_utf8_lossy(&remote.config).into_owned())),
        };

        Ok(ConnectorInputs {
            connector_id: remote.id,
            connector_type: remote.connector_type,
            name: remote.name,
            oidc_config,
            raw_config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secret::SecretString;
    use serde_json::json;

    fn oidc_inputs() -> ConnectorInputs {
        ConnectorInputs {
            connector_id: "corp-sso".to_string(),
            connector_type: "oidc".to_string(),
            name: "Corporate SSO".to_string(),
            oidc_config: Some(OidcConfig {
                issuer: "https://sso.example.com".to_string(),
                client_id: "dex".to_string(),
                client_secret: SecretString::new("s3cr3t"),
                redirect_uri: "https://dex.example.com/callback".to_string(),
                ..OidcConfig::default()
            }),
            raw_config: None,
        }
    }

    fn failures(inputs: &ConnectorInputs) -> Vec<String> {
        let mut failures = Failures::new();
        GenericFlavor::validate(inputs, &mut failures);
        failures.into_vec().into_iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn test_exactly_one_config_is_required() {
        let neither = ConnectorInputs {
            oidc_config: None,
            ..oidc_inputs()
        };
        assert_eq!(
            failures(&neither),
            vec!["oidcConfig: exactly one of oidcConfig or rawConfig must be set"]
        );

        let both = ConnectorInputs {
            raw_config: Some("{}".to_string()),
            ..oidc_inputs()
        };
        assert_eq!(failures(&both).len(), 1);
    }

    #[test]
    fn test_oidc_config_requires_oidc_type() {
        let inputs = ConnectorInputs {
            connector_type: "saml".to_string(),
            ..oidc_inputs()
        };
        assert_eq!(
            failures(&inputs),
            vec!["oidcConfig: only valid when type is \"oidc\""]
        );
    }

    #[test]
    fn test_raw_config_must_be_json_object() {
        let inputs = ConnectorInputs {
            connector_type: "ldap".to_string(),
            oidc_config: None,
            raw_config: Some("host: ldap.example.com".to_string()),
            ..oidc_inputs()
        };
        let failures = failures(&inputs);
        assert_eq!(failures.len(), 1);
        assert!(failures[0].starts_with("rawConfig: must be a JSON object"));
    }

    #[test]
    fn test_default_scopes_applied() {
        let mut inputs = oidc_inputs();
        GenericFlavor::apply_defaults(&mut inputs);
        assert_eq!(
            inputs.oidc_config.unwrap().scopes,
            vec!["openid", "profile", "email"]
        );
    }

    #[test]
    fn test_oidc_round_trip_through_remote() {
        let inputs = oidc_inputs();
        let remote = RemoteConnector {
            id: inputs.connector_id.clone(),
            connector_type: inputs.connector_type.clone(),
            name: inputs.name.clone(),
            config: GenericFlavor::encode(&inputs).unwrap(),
        };
        assert_eq!(GenericFlavor::decode(remote, None).unwrap(), inputs);
    }

    #[test]
    fn test_raw_config_stays_raw_when_declared_raw() {
        let raw = json!({ "issuer": "https://sso.example.com", "clientID": "dex" }).to_string();
        let prior = ConnectorInputs {
            oidc_config: None,
            raw_config: Some(raw.clone()),
            ..oidc_inputs()
        };
        let remote = RemoteConnector {
            id: prior.connector_id.clone(),
            connector_type: "oidc".to_string(),
            name: prior.name.clone(),
            config: GenericFlavor::encode(&prior).unwrap(),
        };
        let decoded = GenericFlavor::decode(remote, Some(&prior)).unwrap();
        assert_eq!(decoded, prior);
    }

    #[test]
    fn test_non_oidc_types_decode_as_raw() {
        let remote = RemoteConnector {
            id: "ldap".to_string(),
            connector_type: "ldap".to_string(),
            name: "LDAP".to_string(),
            config: br#"{"host":"ldap.example.com:636"}"#.to_vec(),
        };
        let decoded = GenericFlavor::decode(remote, None).unwrap();
        assert_eq!(decoded.oidc_config, None);
        assert_eq!(
            decoded.raw_config.as_deref(),
            Some(r#"{"host":"ldap.example.com:636"}"#)
        );
    }

    #[test]
    fn test_unparseable_oidc_config_falls_back_to_raw() {
        let remote = RemoteConnector {
            id: "broken".to_string(),
            connector_type: "oidc".to_string(),
            name: "Broken".to_string(),
            config: br#"{"scopes":"openid"}"#.to_vec(),
        };
        let decoded = GenericFlavor::decode(remote, None).unwrap();
        assert!(decoded.oidc_config.is_none());
        assert!(decoded.raw_config.is_some());
    }
}
