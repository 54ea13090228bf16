//! Dex's built-in username/password database (`local` connector).
//!
//! The connector has no typed settings. Whatever object Dex stores for it is
//! kept in `extraConfig` and written back unchanged on update.

use crate::codec::{parse_object, CodecError, ConfigBuilder, ConfigMap};
use crate::remote::RemoteConnector;
use crate::resources::ConnectorFlavor;
use crate::validation::Failures;
use serde::{Deserialize, Serialize};

const LOCAL_CONNECTOR_TYPE: &str = "local";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalInputs {
    pub connector_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "ConfigMap::is_empty")]
    pub extra_config: ConfigMap,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFlavor;

impl ConnectorFlavor for LocalFlavor {
    type Inputs = LocalInputs;

    const KIND: &'static str = "local-connector";

    fn id(inputs: &LocalInputs) -> &str {
        &inputs.connector_id
    }

    fn name(inputs: &LocalInputs) -> &str {
        &inputs.name
    }

    fn connector_type(_inputs: &LocalInputs) -> String {
        LOCAL_CONNECTOR_TYPE.to_string()
    }

    fn validate(_inputs: &LocalInputs, _failures: &mut Failures) {}

    fn encode(inputs: &LocalInputs) -> Result<Vec<u8>, CodecError> {
        ConfigBuilder::new().extra(&inputs.extra_config).to_bytes()
    }

    fn decode(
        remote: RemoteConnector,
        _prior: Option<&LocalInputs>,
    ) -> Result<LocalInputs, CodecError> {
        // Older Dex releases store no config at all for this type
        let extra_config = if remote.config.is_empty() {
            ConfigMap::new()
        } else {
            parse_object(&remote.config)?
        };
        Ok(LocalInputs {
            connector_id: remote.id,
            name: remote.name,
            extra_config,
        })
    }
}
