use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::solver::ChallengeRequest;

pub const CHALLENGE_API_VERSION: &str = "acme.cert-manager.io/v1alpha1";
pub const CHALLENGE_KIND: &str = "ChallengePayload";
pub const API_VERSION: &str = "v1alpha1";

// Challenge models
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengePayload {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<ChallengeRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ChallengeResponse>,
}

impl ChallengePayload {
    pub fn answer(request: Option<ChallengeRequest>, response: ChallengeResponse) -> Self {
        Self {
            api_version: CHALLENGE_API_VERSION.to_string(),
            kind: CHALLENGE_KIND.to_string(),
            request,
            response: Some(response),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeResponse {
    pub uid: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl ChallengeResponse {
    pub fn success(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            success: true,
            status: None,
        }
    }

    pub fn failure(uid: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            success: false,
            status: Some(Status::failure(500, "InternalError", message)),
        }
    }
}

/// Subset of the Kubernetes `metav1.Status` object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub kind: String,
    #[serde(default, rename = "apiVersion")]
    pub api_version: String,
    pub status: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub code: u16,
}

impl Status {
    pub fn failure(code: u16, reason: &str, message: impl Into<String>) -> Self {
        Self {
            kind: "Status".to_string(),
            api_version: "v1".to_string(),
            status: "Failure".to_string(),
            message: message.into(),
            reason: Some(reason.to_string()),
            code,
        }
    }
}

// Discovery models
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResourceList {
    pub kind: String,
    pub api_version: String,
    pub group_version: String,
    pub resources: Vec<ApiResource>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResource {
    pub name: String,
    pub singular_name: String,
    pub namespaced: bool,
    pub kind: String,
    pub verbs: Vec<String>,
}

impl ApiResourceList {
    pub fn for_solver(group_name: &str, solver_name: &str) -> Self {
        Self {
            kind: "APIResourceList".to_string(),
            api_version: "v1".to_string(),
            group_version: format!("{}/{}", group_name, API_VERSION),
            resources: vec![ApiResource {
                name: solver_name.to_string(),
                singular_name: solver_name.to_string(),
                namespaced: false,
                kind: CHALLENGE_KIND.to_string(),
                verbs: vec!["create".to_string()],
            }],
        }
    }
}

// System models
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub solver: String,
    pub group_name: String,
    pub timestamp: DateTime<Utc>,
}
