use serde::{Deserialize, Serialize};

use crate::error::SolverResult;
use crate::secrets::SecretKeySelector;

/// Per-issuer solver configuration, carried in the challenge request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    #[serde(default)]
    pub esb_api_key: SecretKeySelector,
    #[serde(default)]
    pub infoblox_user: SecretKeySelector,
    #[serde(default)]
    pub infoblox_password: SecretKeySelector,
    #[serde(default)]
    pub dns_name: Option<String>,
}

impl ProviderConfig {
    /// Decode the raw config blob. No blob at all yields the zero value.
    pub fn load(raw: Option<&serde_json::Value>) -> SolverResult<Self> {
        match raw {
            None | Some(serde_json::Value::Null) => Ok(Self::default()),
            Some(value) => Ok(Self::deserialize(value)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SolverError;

    #[test]
    fn test_absent_config_is_default() {
        assert_eq!(ProviderConfig::load(None).unwrap(), ProviderConfig::default());
        assert_eq!(
            ProviderConfig::load(Some(&serde_json::Value::Null)).unwrap(),
            ProviderConfig::default()
        );
        assert_eq!(
            ProviderConfig::load(Some(&serde_json::json!({}))).unwrap(),
            ProviderConfig::default()
        );
    }

    #[test]
    fn test_full_config() {
        let raw = serde_json::json!({
            "esbApiKey": { "name": "esb", "key": "subscription-key" },
            "infobloxUser": { "name": "infoblox", "key": "username" },
            "infobloxPassword": { "name": "infoblox", "key": "password" },
            "dnsName": "example.com"
        });

        let config = ProviderConfig::load(Some(&raw)).unwrap();

        assert_eq!(config.esb_api_key, SecretKeySelector::new("esb", "subscription-key"));
        assert_eq!(config.infoblox_user, SecretKeySelector::new("infoblox", "username"));
        assert_eq!(config.infoblox_password, SecretKeySelector::new("infoblox", "password"));
        assert_eq!(config.dns_name.as_deref(), Some("example.com"));
    }

    #[test]
    fn test_malformed_config() {
        let raw = serde_json::json!({ "esbApiKey": "not-a-selector" });
        let err = ProviderConfig::load(Some(&raw)).unwrap_err();
        assert!(matches!(err, SolverError::ConfigDecode(_)));
    }
}
