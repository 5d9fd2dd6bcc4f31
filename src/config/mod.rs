mod settings;

pub use settings::{
    InfobloxConfig, KubernetesConfig, ServerConfig, Settings, WebhookConfig,
    DEFAULT_INFOBLOX_BASE_URL, GROUP_NAME_ENV,
};
