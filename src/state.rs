use crate::config::{Config, CredentialSource};
use crate::referer::RefererPolicy;

/// Shared, read-only handler state.
pub struct AppState {
    pub http_client: reqwest::Client,
    pub referers: RefererPolicy,
    pub credentials: CredentialSource,
    pub api_base: String,
}

impl AppState {
    pub fn from_config(config: &Config) -> reqwest::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()?;

        Ok(Self {
            http_client,
            referers: RefererPolicy::new(&config.allowed_referers),
            credentials: config.credentials.clone(),
            api_base: config.api_base.clone(),
        })
    }
}
