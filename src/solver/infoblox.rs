use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

use super::config::ProviderConfig;
use super::names::{short_record_name, trim_trailing_dot};
use super::request::ChallengeRequest;
use super::Solver;
use crate::error::{SolverError, SolverResult};
use crate::infoblox::{Credentials, InfobloxClient, TxtRecordRequestBody};
use crate::secrets::{resolve_selector, ClusterConfig, KubeSecretStore, SecretStore};

pub const SOLVER_NAME: &str = "infoblox-solver";

/// Solver publishing challenge records through the Infoblox ESB gateway
pub struct InfobloxSolver {
    client: InfobloxClient,
    secrets: OnceLock<Arc<dyn SecretStore>>,
}

impl InfobloxSolver {
    /// Solver without a secret store; `initialize` must be called before use
    pub fn new(client: InfobloxClient) -> Self {
        Self {
            client,
            secrets: OnceLock::new(),
        }
    }

    /// Solver bound to an already constructed secret store
    pub fn with_secret_store(client: InfobloxClient, store: Arc<dyn SecretStore>) -> Self {
        let secrets = OnceLock::new();
        let _ = secrets.set(store);
        Self { client, secrets }
    }

    fn secret_store(&self) -> SolverResult<&dyn SecretStore> {
        self.secrets
            .get()
            .map(|store| store.as_ref())
            .ok_or(SolverError::NotInitialized)
    }

    /// Decode the request's config and resolve all three credentials.
    async fn credentials(&self, request: &ChallengeRequest) -> SolverResult<Credentials> {
        let config = ProviderConfig::load(request.config.as_ref())?;
        if let Some(dns_name) = &config.dns_name {
            debug!(dns_name = %dns_name, uid = %request.uid, "Solver config names DNS override");
        }

        let store = self.secret_store()?;
        let namespace = request.resource_namespace.as_str();

        let api_key = resolve_selector(store, "apiKey", &config.esb_api_key, namespace).await?;
        let user = resolve_selector(store, "user", &config.infoblox_user, namespace).await?;
        let password =
            resolve_selector(store, "password", &config.infoblox_password, namespace).await?;

        Ok(Credentials {
            api_key,
            user,
            password,
        })
    }
}

#[async_trait]
impl Solver for InfobloxSolver {
    fn name(&self) -> &str {
        SOLVER_NAME
    }

    async fn present(&self, request: &ChallengeRequest) -> SolverResult<()> {
        let name = trim_trailing_dot(&request.resolved_fqdn);
        let zone = trim_trailing_dot(&request.resolved_zone);
        if name.is_empty() {
            return Err(SolverError::RequestBuild {
                method: "POST",
                message: "challenge has no resolved FQDN".to_string(),
            });
        }

        let credentials = self.credentials(request).await?;

        info!(record = %name, zone = %zone, value = %request.key, "Adding TXT record");

        let body = TxtRecordRequestBody::new(name, request.key.as_str());
        let status = self.client.create_txt_record(&credentials, &body).await?;

        // Propagation is checked by cert-manager; the status is informational
        if status.is_success() {
            info!(record = %name, zone = %zone, status = %status, "TXT record submitted");
        } else {
            warn!(record = %name, zone = %zone, status = %status, "Gateway rejected TXT record");
        }

        Ok(())
    }

    async fn clean_up(&self, request: &ChallengeRequest) -> SolverResult<()> {
        let zone = trim_trailing_dot(&request.resolved_zone);
        let record_name = short_record_name(&request.resolved_fqdn, &request.resolved_zone);

        // An empty name would list, and then delete, unrelated records in the zone
        if record_name.is_empty() {
            return Err(SolverError::RequestBuild {
                method: "GET",
                message: format!(
                    "no record name can be derived from FQDN '{}'",
                    request.resolved_fqdn
                ),
            });
        }

        let credentials = self.credentials(request).await?;

        let records = self
            .client
            .list_txt_records(&credentials, zone, &record_name)
            .await?;

        if records.is_empty() {
            info!(record = %record_name, zone = %zone, "No TXT records to clean up");
            return Ok(());
        }

        // Delete every match so duplicates from repeated Present calls go too
        let mut failed = Vec::new();
        for record in &records {
            info!(reference = %record.reference, zone = %zone, "Deleting TXT record");

            match self.client.delete_record(&credentials, &record.reference).await {
                Ok(status) if status.is_success() => {
                    info!(reference = %record.reference, status = %status, "TXT record deleted");
                }
                Ok(status) if status == StatusCode::NOT_FOUND => {
                    debug!(reference = %record.reference, "TXT record already deleted");
                }
                Ok(status) => {
                    warn!(reference = %record.reference, status = %status, "Failed to delete TXT record");
                    failed.push(record.reference.clone());
                }
                Err(e) => {
                    warn!(reference = %record.reference, error = %e, "Failed to delete TXT record");
                    failed.push(record.reference.clone());
                }
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(SolverError::CleanupIncomplete {
                failed,
                total: records.len(),
            })
        }
    }

    fn initialize(&self, cluster: &ClusterConfig) -> SolverResult<()> {
        if self.secrets.get().is_some() {
            return Err(SolverError::AlreadyInitialized);
        }

        let store = KubeSecretStore::new(cluster)?;
        self.secrets
            .set(Arc::new(store))
            .map_err(|_| SolverError::AlreadyInitialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::InMemorySecretStore;
    use std::time::Duration;

    fn client() -> InfobloxClient {
        InfobloxClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap()
    }

    fn cluster() -> ClusterConfig {
        ClusterConfig {
            api_server: "https://k8s.local:6443".to_string(),
            token: None,
            ca_cert_pem: None,
            timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn test_name_is_stable() {
        assert_eq!(InfobloxSolver::new(client()).name(), "infoblox-solver");
    }

    #[tokio::test]
    async fn test_uninitialized_solver_fails() {
        let solver = InfobloxSolver::new(client());
        let request = ChallengeRequest {
            resolved_fqdn: "_acme-challenge.example.com.".to_string(),
            ..Default::default()
        };
        let err = solver.present(&request).await.unwrap_err();
        assert!(matches!(err, SolverError::NotInitialized));
    }

    #[test]
    fn test_initialize_only_once() {
        let solver = InfobloxSolver::new(client());
        solver.initialize(&cluster()).unwrap();

        let err = solver.initialize(&cluster()).unwrap_err();
        assert!(matches!(err, SolverError::AlreadyInitialized));
    }

    #[test]
    fn test_initialize_rejects_bad_descriptor() {
        let solver = InfobloxSolver::new(client());
        let mut bad = cluster();
        bad.api_server = "::not a url::".to_string();

        let err = solver.initialize(&bad).unwrap_err();
        assert!(matches!(err, SolverError::InvalidClusterConfig(_)));
        assert!(solver.secrets.get().is_none());
    }

    #[tokio::test]
    async fn test_empty_config_fails_on_api_key() {
        let solver =
            InfobloxSolver::with_secret_store(client(), Arc::new(InMemorySecretStore::new()));
        let request = ChallengeRequest {
            resource_namespace: "cert-manager".to_string(),
            resolved_fqdn: "_acme-challenge.example.com.".to_string(),
            resolved_zone: "example.com.".to_string(),
            ..Default::default()
        };

        let err = solver.clean_up(&request).await.unwrap_err();
        match err {
            SolverError::SecretNotFound { which, .. } => assert_eq!(which, "apiKey"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
