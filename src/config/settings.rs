use serde::{Deserialize, Serialize};
use anyhow::Result;

/// Environment variable naming the API group the webhook is registered under
pub const GROUP_NAME_ENV: &str = "GROUP_NAME";

pub const DEFAULT_INFOBLOX_BASE_URL: &str = "https://esb.zeiss.com/public/api/infoblox";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub infoblox: InfobloxConfig,
    #[serde(default)]
    pub kubernetes: KubernetesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub threads: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    #[serde(default)]
    pub group_name: String,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub tls_cert_file: Option<String>,
    pub tls_key_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfobloxConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KubernetesConfig {
    pub api_server: Option<String>,
    pub token_file: Option<String>,
    pub ca_file: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    443
}

fn default_base_url() -> String {
    DEFAULT_INFOBLOX_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            threads: None,
        }
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            group_name: String::new(),
            bind_address: default_bind_address(),
            port: default_port(),
            tls_cert_file: None,
            tls_key_file: None,
        }
    }
}

impl Default for InfobloxConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for KubernetesConfig {
    fn default() -> Self {
        Self {
            api_server: None,
            token_file: None,
            ca_file: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Settings {
    /// Load settings from an optional file, `INFOBLOX_SOLVER__*` variables and
    /// `GROUP_NAME`, then validate them.
    pub fn load(config_path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("INFOBLOX_SOLVER").separator("__"))
            .set_override_option("webhook.group_name", std::env::var(GROUP_NAME_ENV).ok())?
            .build()?;

        let settings: Settings = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.webhook.group_name.trim().is_empty() {
            anyhow::bail!(
                "{} must be specified (the API group this webhook is registered under)",
                GROUP_NAME_ENV
            );
        }

        if self.webhook.tls_cert_file.is_some() != self.webhook.tls_key_file.is_some() {
            anyhow::bail!("webhook.tls_cert_file and webhook.tls_key_file must be set together");
        }

        let base_url = reqwest::Url::parse(&self.infoblox.base_url)
            .map_err(|e| anyhow::anyhow!("Invalid infoblox.base_url '{}': {}", self.infoblox.base_url, e))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("infoblox.base_url '{}' cannot be used as a base URL", self.infoblox.base_url);
        }

        if self.infoblox.timeout_secs == 0 {
            anyhow::bail!("infoblox.timeout_secs must be greater than zero");
        }

        if self.kubernetes.timeout_secs == 0 {
            anyhow::bail!("kubernetes.timeout_secs must be greater than zero");
        }

        Ok(())
    }

    /// Settings with every default applied and the given group name
    pub fn with_group_name(group_name: impl Into<String>) -> Self {
        let mut webhook = WebhookConfig::default();
        webhook.group_name = group_name.into();
        Self {
            server: ServerConfig::default(),
            webhook,
            infoblox: InfobloxConfig::default(),
            kubernetes: KubernetesConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_validate_with_group_name() {
        let settings = Settings::with_group_name("acme.example.com");
        assert!(settings.validate().is_ok());
        assert_eq!(settings.infoblox.base_url, DEFAULT_INFOBLOX_BASE_URL);
        assert_eq!(settings.webhook.port, 443);
    }

    #[test]
    fn test_missing_group_name_is_rejected() {
        let settings = Settings::with_group_name("");
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("GROUP_NAME"));
    }

    #[test]
    fn test_tls_files_must_be_paired() {
        let mut settings = Settings::with_group_name("acme.example.com");
        settings.webhook.tls_cert_file = Some("/tls/tls.crt".to_string());
        assert!(settings.validate().is_err());

        settings.webhook.tls_key_file = Some("/tls/tls.key".to_string());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_zero_timeouts_are_rejected() {
        let mut settings = Settings::with_group_name("acme.example.com");
        settings.kubernetes.timeout_secs = 0;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("kubernetes.timeout_secs"));

        let mut settings = Settings::with_group_name("acme.example.com");
        settings.infoblox.timeout_secs = 0;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("infoblox.timeout_secs"));
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let mut settings = Settings::with_group_name("acme.example.com");
        settings.infoblox.base_url = "esb without scheme".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[webhook]
group_name = "acme.example.com"
port = 8443

[infoblox]
base_url = "https://gateway.internal/infoblox"
timeout_secs = 10
"#
        )
        .unwrap();

        // GROUP_NAME from the environment overrides the file, so only check
        // the fields it does not touch.
        let settings = Settings::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(settings.webhook.port, 8443);
        assert_eq!(settings.infoblox.base_url, "https://gateway.internal/infoblox");
        assert_eq!(settings.infoblox.timeout_secs, 10);
        assert!(settings.kubernetes.api_server.is_none());
    }
}
