use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;

use super::types::{ApiErrorBody, EnvVar, EnvVarValue, EnvVarWrite, NETLIFY_API_BASE, SetValueBody};
use super::{EnvVarTransport, NetlifyError};
use crate::envvar::AccountScope;

#[derive(Clone)]
pub struct NetlifyClient {
    client: reqwest::Client,
    base_url: String,
}

impl NetlifyClient {
    pub fn new(token: String) -> Result<Self, NetlifyError> {
        Self::with_base_url(token, NETLIFY_API_BASE.to_string())
    }

    /// NOTE: Also used for testing with mock servers.
    pub fn with_base_url(token: String, base_url: String) -> Result<Self, NetlifyError> {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", token);
        let header_value =
            HeaderValue::from_str(&auth_value).map_err(|_| NetlifyError::Auth {
                message: "Invalid token format".to_string(),
            })?;
        headers.insert(AUTHORIZATION, header_value);

        let client = reqwest::Client::builder()
            .user_agent(concat!("netlify-env/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(NetlifyError::Network)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.base_url
    }

    // NOTE: Path segments are percent-encoded; `site_id` only goes on the query when non-empty
    fn env_path(scope: &AccountScope, key: Option<&str>) -> String {
        let mut path = format!("/accounts/{}/env", urlencoding::encode(&scope.account_id));
        if let Some(key) = key {
            path.push('/');
            path.push_str(&urlencoding::encode(key));
        }
        if let Some(site_id) = scope.site_id() {
            path.push_str("?site_id=");
            path.push_str(&urlencoding::encode(site_id));
        }
        path
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        path: &str,
    ) -> Result<String, NetlifyError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        if status == StatusCode::NOT_FOUND {
            return Err(NetlifyError::NotFound {
                path: strip_query(path).to_string(),
            });
        }

        // NOTE: `payload` is None only for an empty body; a non-JSON body becomes the message
        let payload = if body.trim().is_empty() {
            None
        } else {
            Some(
                serde_json::from_str::<ApiErrorBody>(&body).unwrap_or_else(|_| ApiErrorBody {
                    code: None,
                    message: excerpt(&body),
                }),
            )
        };
        tracing::debug!(
            status = status.as_u16(),
            path = strip_query(path),
            has_payload = payload.is_some(),
            "Netlify API request failed"
        );

        Err(NetlifyError::Api {
            status: status.as_u16(),
            payload,
        })
    }

    fn decode<T: DeserializeOwned>(body: &str, path: &str) -> Result<T, NetlifyError> {
        serde_json::from_str(body).map_err(|e| NetlifyError::Decode {
            path: strip_query(path).to_string(),
            message: e.to_string(),
        })
    }
}

const MAX_RAW_ERROR_CHARS: usize = 200;

fn excerpt(body: &str) -> String {
    body.trim().chars().take(MAX_RAW_ERROR_CHARS).collect()
}

fn strip_query(path: &str) -> &str {
    path.split_once('?').map(|(p, _)| p).unwrap_or(path)
}

#[async_trait]
impl EnvVarTransport for NetlifyClient {
    async fn create_variable(
        &self,
        scope: &AccountScope,
        env_var: &EnvVarWrite,
    ) -> Result<Vec<EnvVar>, NetlifyError> {
        let path = Self::env_path(scope, None);
        tracing::debug!(path = %strip_query(&path), key = %env_var.key, "POST env var");

        let request = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(&[env_var]);
        let body = self.send(request, &path).await?;
        Self::decode(&body, &path)
    }

    async fn get_variable(&self, scope: &AccountScope, key: &str) -> Result<EnvVar, NetlifyError> {
        let path = Self::env_path(scope, Some(key));
        tracing::debug!(path = %strip_query(&path), "GET env var");

        let request = self.client.get(format!("{}{}", self.base_url, path));
        let body = self.send(request, &path).await?;
        Self::decode(&body, &path)
    }

    async fn update_variable(
        &self,
        scope: &AccountScope,
        key: &str,
        env_var: &EnvVarWrite,
    ) -> Result<EnvVar, NetlifyError> {
        let path = Self::env_path(scope, Some(key));
        tracing::debug!(path = %strip_query(&path), new_key = %env_var.key, "PUT env var");

        let request = self
            .client
            .put(format!("{}{}", self.base_url, path))
            .json(env_var);
        let body = self.send(request, &path).await?;
        Self::decode(&body, &path)
    }

    async fn delete_variable(&self, scope: &AccountScope, key: &str) -> Result<(), NetlifyError> {
        let path = Self::env_path(scope, Some(key));
        tracing::debug!(path = %strip_query(&path), "DELETE env var");

        let request = self.client.delete(format!("{}{}", self.base_url, path));
        self.send(request, &path).await?;
        Ok(())
    }

    async fn set_value(
        &self,
        scope: &AccountScope,
        key: &str,
        value: &SetValueBody,
    ) -> Result<Option<EnvVarValue>, NetlifyError> {
        let path = Self::env_path(scope, Some(key));
        tracing::debug!(path = %strip_query(&path), context = %value.context, "PATCH env var value");

        let request = self
            .client
            .patch(format!("{}{}", self.base_url, path))
            .json(value);
        let body = self.send(request, &path).await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        Self::decode(&body, &path).map(Some)
    }
}

impl std::fmt::Debug for NetlifyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetlifyClient")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}
