//! Declared-entity schema for `netlify_environment_variable` and
//! `netlify_environment_variable_value`.
//!
//! Reconcilers only ever see the typed structs in this module. Conversion to
//! and from the attribute maps the host stores happens in `from_attributes`
//! and `to_attributes`, nowhere else.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::envvar::{AccountScope, EnvVarId};
use crate::error::{Error, Result};
use crate::netlify::EnvVarValue;

pub const VARIABLE_RESOURCE_TYPE: &str = "netlify_environment_variable";
pub const VALUE_RESOURCE_TYPE: &str = "netlify_environment_variable_value";

/// Runtime category a variable is exposed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Builds,
    Functions,
    PostProcessing,
    Runtime,
}

impl Scope {
    pub const ALL: [Scope; 4] = [
        Scope::Builds,
        Scope::Functions,
        Scope::PostProcessing,
        Scope::Runtime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Builds => "builds",
            Scope::Functions => "functions",
            Scope::PostProcessing => "post_processing",
            Scope::Runtime => "runtime",
        }
    }

    pub fn full_set() -> BTreeSet<Scope> {
        Scope::ALL.into_iter().collect()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Scope::ALL
            .into_iter()
            .find(|scope| scope.as_str() == s)
            .ok_or_else(|| {
                Error::invalid(
                    "scopes",
                    format!(
                        "unknown scope '{s}', must be one of [builds functions post_processing runtime]"
                    ),
                )
            })
    }
}

/// Deploy context a single value applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Context {
    All,
    Dev,
    BranchDeploy,
    DeployPreview,
    Production,
}

impl Context {
    pub const ALL: [Context; 5] = [
        Context::All,
        Context::Dev,
        Context::BranchDeploy,
        Context::DeployPreview,
        Context::Production,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Context::All => "all",
            Context::Dev => "dev",
            Context::BranchDeploy => "branch-deploy",
            Context::DeployPreview => "deploy-preview",
            Context::Production => "production",
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Context {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Context::ALL
            .into_iter()
            .find(|context| context.as_str() == s)
            .ok_or_else(|| {
                Error::invalid(
                    "context",
                    "must be one of [all dev branch-deploy deploy-preview production]",
                )
            })
    }
}

/// One `value` block of a declared variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredValue {
    pub context: Context,
    pub value: String,
}

/// Desired state of an environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableConfig {
    pub scope: AccountScope,
    pub key: String,
    /// Empty means "not declared"; the reconciler substitutes the full set.
    pub scopes: BTreeSet<Scope>,
    pub values: Vec<DeclaredValue>,
}

/// Recorded state of an environment variable after a successful round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableState {
    pub id: EnvVarId,
    pub scopes: BTreeSet<Scope>,
    pub values: Vec<EnvVarValue>,
}

impl VariableState {
    pub fn key(&self) -> &str {
        &self.id.key
    }

    pub fn scope(&self) -> &AccountScope {
        &self.id.scope
    }
}

/// Desired state of a single context value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueConfig {
    pub environment_variable_id: String,
    pub context: Context,
    pub value: String,
}

/// Recorded state of a single context value. `id` is the server-assigned value id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueState {
    pub id: String,
    pub environment_variable_id: String,
    pub context: Context,
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct VariableAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    account_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    site_id: Option<String>,
    key: String,
    #[serde(default)]
    scopes: Vec<String>,
    #[serde(default, rename = "value")]
    values: Vec<ValueBlock>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ValueBlock {
    context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    value: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ValueAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    environment_variable_id: String,
    context: String,
    value: String,
}

fn parse_record<T: for<'de> Deserialize<'de>>(
    resource_type: &str,
    attrs: &serde_json::Value,
) -> Result<T> {
    T::deserialize(attrs).map_err(|e| Error::invalid(resource_type, e.to_string()))
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::invalid(field, "must not be empty"));
    }
    Ok(())
}

fn parse_scopes(raw: &[String]) -> Result<BTreeSet<Scope>> {
    raw.iter().map(|s| s.parse()).collect()
}

impl VariableConfig {
    pub fn from_attributes(attrs: &serde_json::Value) -> Result<Self> {
        let attrs: VariableAttributes = parse_record(VARIABLE_RESOURCE_TYPE, attrs)?;
        require_non_empty("account_id", &attrs.account_id)?;
        require_non_empty("key", &attrs.key)?;

        Ok(Self {
            scope: AccountScope::new(attrs.account_id, attrs.site_id),
            key: attrs.key,
            scopes: parse_scopes(&attrs.scopes)?,
            values: attrs
                .values
                .into_iter()
                .map(|block| -> Result<DeclaredValue> {
                    Ok(DeclaredValue {
                        context: block.context.parse()?,
                        value: block.value,
                    })
                })
                .collect::<Result<_>>()?,
        })
    }
}

impl VariableState {
    pub fn from_attributes(attrs: &serde_json::Value) -> Result<Self> {
        let attrs: VariableAttributes = parse_record(VARIABLE_RESOURCE_TYPE, attrs)?;
        let id = attrs
            .id
            .as_deref()
            .ok_or_else(|| Error::invalid("id", "state record has no id"))
            .and_then(EnvVarId::decode)?;

        Ok(Self {
            id,
            scopes: parse_scopes(&attrs.scopes)?,
            values: attrs
                .values
                .into_iter()
                .map(|block| EnvVarValue {
                    id: block.id,
                    context: block.context,
                    value: block.value,
                    context_parameter: None,
                })
                .collect(),
        })
    }

    pub fn to_attributes(&self) -> serde_json::Value {
        let attrs = VariableAttributes {
            id: Some(self.id.encode()),
            account_id: self.id.scope.account_id.clone(),
            site_id: self.id.scope.site_id().map(str::to_string),
            key: self.id.key.clone(),
            scopes: self.scopes.iter().map(|s| s.as_str().to_string()).collect(),
            values: self
                .values
                .iter()
                .map(|v| ValueBlock {
                    context: v.context.clone(),
                    id: v.id.clone(),
                    value: v.value.clone(),
                })
                .collect(),
        };
        serde_json::json!(attrs)
    }
}

impl ValueConfig {
    pub fn from_attributes(attrs: &serde_json::Value) -> Result<Self> {
        let attrs: ValueAttributes = parse_record(VALUE_RESOURCE_TYPE, attrs)?;
        require_non_empty("environment_variable_id", &attrs.environment_variable_id)?;

        Ok(Self {
            environment_variable_id: attrs.environment_variable_id,
            context: attrs.context.parse()?,
            value: attrs.value,
        })
    }
}

impl ValueState {
    pub fn from_attributes(attrs: &serde_json::Value) -> Result<Self> {
        let attrs: ValueAttributes = parse_record(VALUE_RESOURCE_TYPE, attrs)?;
        let id = attrs
            .id
            .ok_or_else(|| Error::invalid("id", "state record has no id"))?;

        Ok(Self {
            id,
            environment_variable_id: attrs.environment_variable_id,
            context: attrs.context.parse()?,
            value: attrs.value,
        })
    }

    pub fn to_attributes(&self) -> serde_json::Value {
        serde_json::json!(ValueAttributes {
            id: Some(self.id.clone()),
            environment_variable_id: self.environment_variable_id.clone(),
            context: self.context.as_str().to_string(),
            value: self.value.clone(),
        })
    }
}
