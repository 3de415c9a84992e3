use crate::error::{Error, Result};
use crate::netlify::{NETLIFY_API_BASE, NetlifyClient};

/// Connection settings for the Netlify API.
#[derive(Clone)]
pub struct ProviderConfig {
    token: String,
    pub base_url: String,
}

impl ProviderConfig {
    /// Falls back to the public API when `base_url` is empty.
    pub fn new(token: Option<String>, base_url: Option<String>) -> Result<Self> {
        let token = token.filter(|t| !t.is_empty()).ok_or_else(|| {
            Error::Config("No API token provided. Set NETLIFY_TOKEN or use --token flag".to_string())
        })?;
        let base_url = base_url
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| NETLIFY_API_BASE.to_string());

        Ok(Self { token, base_url })
    }

    pub fn client(&self) -> Result<NetlifyClient> {
        Ok(NetlifyClient::with_base_url(
            self.token.clone(),
            self.base_url.clone(),
        )?)
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("token", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}
