//! Kubernetes-backed secret store
//!
//! Reads `v1/Secret` objects straight from the API server using the pod's
//! service account, so no client library beyond `reqwest` is needed.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::{Certificate, Client, StatusCode, Url};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use super::{SecretData, SecretStore};
use crate::config::KubernetesConfig;
use crate::error::{SolverError, SolverResult};

/// Where the kubelet mounts the service account credentials
pub const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";

/// Connection descriptor for the cluster API server
#[derive(Clone)]
pub struct ClusterConfig {
    pub api_server: String,
    pub token: Option<String>,
    pub ca_cert_pem: Option<Vec<u8>>,
    pub timeout: Duration,
}

impl fmt::Debug for ClusterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterConfig")
            .field("api_server", &self.api_server)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("ca_cert_pem", &self.ca_cert_pem.as_ref().map(|c| c.len()))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClusterConfig {
    /// Build the descriptor from settings, falling back to the in-cluster
    /// environment for anything not set explicitly.
    pub fn from_settings(settings: &KubernetesConfig) -> SolverResult<Self> {
        let api_server = match &settings.api_server {
            Some(url) => url.clone(),
            None => in_cluster_api_server()?,
        };

        let token = read_optional(
            settings.token_file.as_deref(),
            &format!("{}/token", SERVICE_ACCOUNT_DIR),
        )?
        .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string());

        let ca_cert_pem = read_optional(
            settings.ca_file.as_deref(),
            &format!("{}/ca.crt", SERVICE_ACCOUNT_DIR),
        )?;

        Ok(Self {
            api_server,
            token,
            ca_cert_pem,
            timeout: Duration::from_secs(settings.timeout_secs),
        })
    }
}

fn in_cluster_api_server() -> SolverResult<String> {
    let host = std::env::var("KUBERNETES_SERVICE_HOST").map_err(|_| {
        SolverError::InvalidClusterConfig(
            "no API server configured and KUBERNETES_SERVICE_HOST is not set".to_string(),
        )
    })?;
    let port = std::env::var("KUBERNETES_SERVICE_PORT").unwrap_or_else(|_| "443".to_string());

    if host.contains(':') {
        Ok(format!("https://[{}]:{}", host, port))
    } else {
        Ok(format!("https://{}:{}", host, port))
    }
}

/// An explicitly configured path must be readable; the default path may be absent.
fn read_optional(explicit: Option<&str>, default: &str) -> SolverResult<Option<Vec<u8>>> {
    match explicit {
        Some(path) => std::fs::read(path).map(Some).map_err(|e| {
            SolverError::InvalidClusterConfig(format!("failed to read '{}': {}", path, e))
        }),
        None if Path::new(default).exists() => std::fs::read(default).map(Some).map_err(|e| {
            SolverError::InvalidClusterConfig(format!("failed to read '{}': {}", default, e))
        }),
        None => Ok(None),
    }
}

#[derive(Debug, Deserialize)]
struct SecretObject {
    #[serde(default)]
    data: HashMap<String, String>,
}

/// Secret store talking to the Kubernetes core/v1 API
#[derive(Debug)]
pub struct KubeSecretStore {
    client: Client,
    api_server: Url,
    token: Option<String>,
}

impl KubeSecretStore {
    pub fn new(config: &ClusterConfig) -> SolverResult<Self> {
        let api_server = Url::parse(config.api_server.trim_end_matches('/')).map_err(|e| {
            SolverError::InvalidClusterConfig(format!(
                "invalid API server URL '{}': {}",
                config.api_server, e
            ))
        })?;

        let mut builder = Client::builder().timeout(config.timeout);

        if let Some(pem) = &config.ca_cert_pem {
            let cert = Certificate::from_pem(pem).map_err(|e| {
                SolverError::InvalidClusterConfig(format!("invalid CA bundle: {}", e))
            })?;
            builder = builder.add_root_certificate(cert);
        }

        let client = builder.build().map_err(|e| {
            SolverError::InvalidClusterConfig(format!("failed to create HTTP client: {}", e))
        })?;

        info!(api_server = %api_server, "Kubernetes secret store ready");

        Ok(Self {
            client,
            api_server,
            token: config.token.clone(),
        })
    }

    fn secret_url(&self, namespace: &str, name: &str) -> SolverResult<Url> {
        let mut url = self.api_server.clone();
        url.path_segments_mut()
            .map_err(|_| {
                SolverError::InvalidClusterConfig(format!(
                    "API server URL '{}' cannot be a base",
                    self.api_server
                ))
            })?
            .pop_if_empty()
            .extend(["api", "v1", "namespaces", namespace, "secrets", name]);
        Ok(url)
    }
}

#[async_trait]
impl SecretStore for KubeSecretStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> SolverResult<Option<SecretData>> {
        let url = self.secret_url(namespace, name)?;
        debug!(namespace = %namespace, name = %name, "Fetching secret");

        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SolverError::SecretStore(format!("request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SolverError::SecretStore(format!(
                "fetching secret {}/{} returned HTTP {}: {}",
                namespace, name, status, body
            )));
        }

        let secret: SecretObject = response.json().await.map_err(|e| {
            SolverError::SecretStore(format!("failed to parse secret {}/{}: {}", namespace, name, e))
        })?;

        let mut data = SecretData::with_capacity(secret.data.len());
        for (field, encoded) in secret.data {
            let decoded = STANDARD.decode(encoded.as_bytes()).map_err(|e| {
                SolverError::SecretStore(format!(
                    "field '{}' of secret {}/{} is not valid base64: {}",
                    field, namespace, name, e
                ))
            })?;
            data.insert(field, decoded);
        }

        Ok(Some(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cluster(uri: String) -> ClusterConfig {
        ClusterConfig {
            api_server: uri,
            token: Some("sa-token".to_string()),
            ca_cert_pem: None,
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_get_secret_decodes_data() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/namespaces/cert-manager/secrets/infoblox"))
            .and(header("authorization", "Bearer sa-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "apiVersion": "v1",
                "kind": "Secret",
                "metadata": { "name": "infoblox", "namespace": "cert-manager" },
                "data": { "user": STANDARD.encode("svc-acme") }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let store = KubeSecretStore::new(&cluster(mock_server.uri())).unwrap();
        let data = store
            .get_secret("cert-manager", "infoblox")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(data.get("user").map(Vec::as_slice), Some(&b"svc-acme"[..]));
    }

    #[tokio::test]
    async fn test_missing_secret_is_none() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "kind": "Status",
                "reason": "NotFound"
            })))
            .mount(&mock_server)
            .await;

        let store = KubeSecretStore::new(&cluster(mock_server.uri())).unwrap();
        let result = store.get_secret("cert-manager", "absent").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_forbidden_is_store_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&mock_server)
            .await;

        let store = KubeSecretStore::new(&cluster(mock_server.uri())).unwrap();
        let err = store.get_secret("cert-manager", "infoblox").await.unwrap_err();

        assert!(matches!(err, SolverError::SecretStore(_)));
    }

    #[test]
    fn test_invalid_api_server_url() {
        let err = KubeSecretStore::new(&cluster("not a url".to_string())).unwrap_err();
        assert!(matches!(err, SolverError::InvalidClusterConfig(_)));
    }

    #[test]
    fn test_secret_url_layout() {
        let store = KubeSecretStore::new(&cluster("https://10.0.0.1:6443/".to_string())).unwrap();
        let url = store.secret_url("ns", "creds").unwrap();
        assert_eq!(
            url.as_str(),
            "https://10.0.0.1:6443/api/v1/namespaces/ns/secrets/creds"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", cluster("https://k8s".to_string()));
        assert!(!rendered.contains("sa-token"));
    }

    #[test]
    fn test_explicit_token_file_must_exist() {
        let settings = KubernetesConfig {
            api_server: Some("https://k8s.local".to_string()),
            token_file: Some("/nonexistent/token".to_string()),
            ca_file: None,
            timeout_secs: 5,
        };
        let err = ClusterConfig::from_settings(&settings).unwrap_err();
        assert!(matches!(err, SolverError::InvalidClusterConfig(_)));
    }

    #[test]
    fn test_explicit_token_file_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let token_path = dir.path().join("token");
        std::fs::write(&token_path, "abc123\n").unwrap();

        let settings = KubernetesConfig {
            api_server: Some("https://k8s.local".to_string()),
            token_file: Some(token_path.to_string_lossy().into_owned()),
            ca_file: None,
            timeout_secs: 5,
        };
        let config = ClusterConfig::from_settings(&settings).unwrap();

        assert_eq!(config.api_server, "https://k8s.local");
        assert_eq!(config.token.as_deref(), Some("abc123"));
    }
}
