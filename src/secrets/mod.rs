//! Credential lookup for the solver
//!
//! Credentials are never part of the challenge request itself. The request's
//! solver config only carries [`SecretKeySelector`]s, which are dereferenced
//! against a [`SecretStore`] in the request's resource namespace.

pub mod kube;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use tracing::debug;

use crate::error::{SolverError, SolverResult};

pub use kube::{ClusterConfig, KubeSecretStore};
pub use memory::InMemorySecretStore;

/// Field name to raw value, as stored in a secret
pub type SecretData = HashMap<String, Vec<u8>>;

/// Points at one field of one named secret
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretKeySelector {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub key: String,
}

impl SecretKeySelector {
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
        }
    }
}

/// Key/value secret backend
///
/// Implementations must be safe to share between concurrent challenge requests.
#[async_trait]
pub trait SecretStore: Send + Sync + Debug {
    /// Fetch a secret by namespace and name.
    ///
    /// Returns `Ok(None)` when the secret does not exist; `Err` is reserved
    /// for failures talking to the backend.
    async fn get_secret(&self, namespace: &str, name: &str) -> SolverResult<Option<SecretData>>;
}

/// Resolve a single selector to its plaintext value.
///
/// `which` names the credential being resolved and is carried into every
/// error so the caller can tell which of the references was broken.
pub async fn resolve_selector(
    store: &dyn SecretStore,
    which: &str,
    selector: &SecretKeySelector,
    namespace: &str,
) -> SolverResult<String> {
    let secret_path = format!("{}/{}", namespace, selector.name);

    if selector.name.is_empty() {
        return Err(SolverError::SecretNotFound {
            which: which.to_string(),
            reason: format!("failed to load secret \"{}\": no secret name configured", secret_path),
        });
    }

    debug!(which = %which, secret = %secret_path, key = %selector.key, "Resolving secret reference");

    let data = match store.get_secret(namespace, &selector.name).await {
        Ok(Some(data)) => data,
        Ok(None) => {
            return Err(SolverError::SecretNotFound {
                which: which.to_string(),
                reason: format!("failed to load secret \"{}\": not found", secret_path),
            })
        }
        Err(SolverError::SecretStore(message)) => {
            return Err(SolverError::SecretStore(format!("{}: {}", which, message)))
        }
        Err(e) => return Err(e),
    };

    match data.get(&selector.key) {
        Some(value) => Ok(String::from_utf8_lossy(value).into_owned()),
        None => Err(SolverError::SecretNotFound {
            which: which.to_string(),
            reason: format!("key not found \"{}\" in secret '{}'", selector.key, secret_path),
        }),
    }
}
