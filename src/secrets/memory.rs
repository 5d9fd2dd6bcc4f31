use async_trait::async_trait;
use std::collections::HashMap;

use super::{SecretData, SecretStore};
use crate::error::SolverResult;

/// Secret store backed by a plain map, keyed by (namespace, name)
#[derive(Debug, Default, Clone)]
pub struct InMemorySecretStore {
    secrets: HashMap<(String, String), SecretData>,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret<K, V>(
        mut self,
        namespace: &str,
        name: &str,
        fields: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: AsRef<[u8]>,
    {
        self.insert(namespace, name, fields);
        self
    }

    pub fn insert<K, V>(
        &mut self,
        namespace: &str,
        name: &str,
        fields: impl IntoIterator<Item = (K, V)>,
    ) where
        K: Into<String>,
        V: AsRef<[u8]>,
    {
        let data = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.as_ref().to_vec()))
            .collect();
        self.secrets
            .insert((namespace.to_string(), name.to_string()), data);
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> SolverResult<Option<SecretData>> {
        Ok(self
            .secrets
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }
}
