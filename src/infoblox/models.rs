use serde::{Deserialize, Serialize};
use std::fmt;

/// DNS view all challenge records live in
pub const DEFAULT_VIEW: &str = "Internet";

/// TTL for challenge records, in seconds
pub const CHALLENGE_TTL: u32 = 3600;

pub const SUBSCRIPTION_KEY_HEADER: &str = "EsbApi-Subscription-Key";

/// Plaintext gateway credentials for a single call
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub user: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /record/txt`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxtRecordRequestBody {
    pub name: String,
    pub text: String,
    pub view: String,
    pub ttl: u32,
}

impl TxtRecordRequestBody {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            view: DEFAULT_VIEW.to_string(),
            ttl: CHALLENGE_TTL,
        }
    }
}

/// One element of the `GET /record/txt` listing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TxtRecord {
    #[serde(rename = "_ref")]
    pub reference: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub view: String,
}
