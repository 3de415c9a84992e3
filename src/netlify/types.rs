use serde::{Deserialize, Serialize};

use crate::resource::Scope;

pub const NETLIFY_API_BASE: &str = "https://api.netlify.com/api/v1";

/// Environment variable object as returned by `GET /accounts/{account_id}/env/{key}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvVar {
    pub key: String,
    #[serde(default)]
    pub scopes: Vec<Scope>,
    #[serde(default)]
    pub values: Vec<EnvVarValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_secret: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVarValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub context: String,
    #[serde(default)]
    pub value: String,
    // NOTE: Only set for branch-specific values, which this crate never declares
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_parameter: Option<String>,
}

impl EnvVarValue {
    pub fn new(context: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: None,
            context: context.into(),
            value: value.into(),
            context_parameter: None,
        }
    }
}

/// Body item for create, and the full body for update. The update endpoint
/// replaces the whole object, so `values` must always be the complete list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvVarWrite {
    pub key: String,
    pub scopes: Vec<Scope>,
    pub values: Vec<EnvVarValue>,
}

/// Body of `PATCH /accounts/{account_id}/env/{key}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetValueBody {
    pub context: String,
    pub value: String,
}

/// Error object returned by the API on non-success responses.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<i64>,
    pub message: String,
}
