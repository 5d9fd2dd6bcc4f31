use serde::{Deserialize, Serialize};

/// What cert-manager is asking the solver to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChallengeAction {
    Present,
    CleanUp,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for ChallengeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChallengeAction::Present => write!(f, "Present"),
            ChallengeAction::CleanUp => write!(f, "CleanUp"),
            ChallengeAction::Unknown => write!(f, "Unknown"),
        }
    }
}

/// A single DNS-01 challenge as handed over by cert-manager
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    #[serde(default)]
    pub uid: String,
    pub action: Option<ChallengeAction>,
    #[serde(default, rename = "type")]
    pub challenge_type: String,
    #[serde(default)]
    pub dns_name: String,
    /// Proof-of-possession token to publish
    #[serde(default)]
    pub key: String,
    /// Namespace secret references are resolved in
    #[serde(default)]
    pub resource_namespace: String,
    #[serde(default, rename = "resolvedFQDN")]
    pub resolved_fqdn: String,
    #[serde(default)]
    pub resolved_zone: String,
    #[serde(default)]
    pub allow_ambient_credentials: bool,
    /// Raw solver config from the issuer
    #[serde(default)]
    pub config: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_cert_manager_request() {
        let request: ChallengeRequest = serde_json::from_value(serde_json::json!({
            "uid": "3b6c5f4e",
            "action": "Present",
            "type": "dns-01",
            "dnsName": "example.com",
            "key": "token",
            "resourceNamespace": "cert-manager",
            "resolvedFQDN": "_acme-challenge.example.com.",
            "resolvedZone": "example.com.",
            "allowAmbientCredentials": false,
            "config": { "dnsName": "example.com" }
        }))
        .unwrap();

        assert_eq!(request.action, Some(ChallengeAction::Present));
        assert_eq!(request.resolved_fqdn, "_acme-challenge.example.com.");
        assert_eq!(request.resolved_zone, "example.com.");
        assert_eq!(request.resource_namespace, "cert-manager");
        assert!(request.config.is_some());
    }

    #[test]
    fn test_unknown_action() {
        let request: ChallengeRequest =
            serde_json::from_value(serde_json::json!({ "action": "Rotate" })).unwrap();
        assert_eq!(request.action, Some(ChallengeAction::Unknown));
    }
}
