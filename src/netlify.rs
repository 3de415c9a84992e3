mod client;
mod error;
mod types;

pub use client::NetlifyClient;
pub use error::NetlifyError;
pub use types::{ApiErrorBody, EnvVar, EnvVarValue, EnvVarWrite, NETLIFY_API_BASE, SetValueBody};

use async_trait::async_trait;

use crate::envvar::AccountScope;

/// Remote operations on environment variables.
///
/// Every call is a single request/response round-trip. A 404 surfaces as
/// [`NetlifyError::NotFound`], any other non-success status as
/// [`NetlifyError::Api`].
#[async_trait]
pub trait EnvVarTransport: Send + Sync {
    /// Creates one variable. The endpoint accepts a batch and answers with one.
    async fn create_variable(
        &self,
        scope: &AccountScope,
        env_var: &EnvVarWrite,
    ) -> Result<Vec<EnvVar>, NetlifyError>;

    async fn get_variable(&self, scope: &AccountScope, key: &str) -> Result<EnvVar, NetlifyError>;

    /// Replaces the variable stored under `key`; `env_var.key` may differ to rename it.
    async fn update_variable(
        &self,
        scope: &AccountScope,
        key: &str,
        env_var: &EnvVarWrite,
    ) -> Result<EnvVar, NetlifyError>;

    async fn delete_variable(&self, scope: &AccountScope, key: &str) -> Result<(), NetlifyError>;

    /// Sets the value for one context. An empty value removes that context's entry.
    async fn set_value(
        &self,
        scope: &AccountScope,
        key: &str,
        value: &SetValueBody,
    ) -> Result<Option<EnvVarValue>, NetlifyError>;
}
