//! Minimal declarative driver: compares a manifest against recorded state and
//! calls the reconcilers.
//!
//! Every tracked entity is refreshed before it is planned, so an entity that
//! disappeared remotely is re-created (or, if no longer declared, dropped)
//! without touching the API a second time.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::envvar::{ValueReconciler, VariableReconciler, normalize_scopes};
use crate::error::{Error, Result};
use crate::netlify::EnvVarTransport;
use crate::resource::{
    VALUE_RESOURCE_TYPE, VARIABLE_RESOURCE_TYPE, ValueConfig, ValueState, VariableConfig,
    VariableState,
};

const REFERENCE_PREFIX: &str = "variables.";
const REFERENCE_SUFFIX: &str = ".id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    NoOp,
    Create,
    Update,
    Replace,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::NoOp => "no-op",
            Action::Create => "create",
            Action::Update => "update",
            Action::Replace => "replace",
            Action::Delete => "delete",
        };
        f.write_str(s)
    }
}

pub fn plan_variable(prior: Option<&VariableState>, desired: Option<&VariableConfig>) -> Action {
    match (prior, desired) {
        (None, None) => Action::NoOp,
        (None, Some(_)) => Action::Create,
        (Some(_), None) => Action::Delete,
        (Some(prior), Some(desired)) => {
            if prior.scope() != &desired.scope {
                return Action::Replace;
            }

            let desired_scopes: BTreeSet<_> =
                normalize_scopes(&desired.scopes).into_iter().collect();
            let values_differ = desired.values.iter().any(|declared| {
                !prior
                    .values
                    .iter()
                    .any(|v| v.context == declared.context.as_str() && v.value == declared.value)
            });

            if prior.key() != desired.key || prior.scopes != desired_scopes || values_differ {
                Action::Update
            } else {
                Action::NoOp
            }
        }
    }
}

pub fn plan_value(prior: Option<&ValueState>, desired: Option<&ValueConfig>) -> Action {
    match (prior, desired) {
        (None, None) => Action::NoOp,
        (None, Some(_)) => Action::Create,
        (Some(_), None) => Action::Delete,
        (Some(prior), Some(desired)) => {
            if prior.environment_variable_id != desired.environment_variable_id
                || prior.context != desired.context
            {
                Action::Replace
            } else if prior.value != desired.value {
                Action::Update
            } else {
                Action::NoOp
            }
        }
    }
}

/// Declared entities, keyed by a local name.
#[derive(Debug, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub variables: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub values: BTreeMap<String, serde_json::Value>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Recorded attributes of every tracked entity, keyed like the manifest.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateFile {
    #[serde(default)]
    pub variables: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub values: BTreeMap<String, serde_json::Value>,
}

impl StateFile {
    /// A missing file is an empty state.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub resource_type: &'static str,
    pub name: String,
    pub action: Action,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub changes: Vec<Change>,
}

impl ApplyReport {
    fn record(&mut self, resource_type: &'static str, name: &str, action: Action) {
        self.changes.push(Change {
            resource_type,
            name: name.to_string(),
            action,
        });
    }

    pub fn count(&self, action: Action) -> usize {
        self.changes.iter().filter(|c| c.action == action).count()
    }
}

/// Applies `manifest` on top of `state`, mutating `state` as entities change.
///
/// Variables are applied before values so value references to
/// `variables.<name>.id` see the new identifiers. On error, `state` reflects
/// everything completed before the failing step.
pub async fn apply(
    transport: &dyn EnvVarTransport,
    manifest: &Manifest,
    state: &mut StateFile,
) -> Result<ApplyReport> {
    let mut report = ApplyReport::default();

    let names: BTreeSet<String> = manifest
        .variables
        .keys()
        .chain(state.variables.keys())
        .cloned()
        .collect();
    for name in &names {
        let action = apply_variable(transport, name, manifest, state).await?;
        report.record(VARIABLE_RESOURCE_TYPE, name, action);
    }

    let names: BTreeSet<String> = manifest
        .values
        .keys()
        .chain(state.values.keys())
        .cloned()
        .collect();
    for name in &names {
        let action = apply_value(transport, name, manifest, state).await?;
        report.record(VALUE_RESOURCE_TYPE, name, action);
    }

    tracing::info!(
        created = report.count(Action::Create),
        updated = report.count(Action::Update),
        replaced = report.count(Action::Replace),
        deleted = report.count(Action::Delete),
        "apply complete"
    );
    Ok(report)
}

async fn apply_variable(
    transport: &dyn EnvVarTransport,
    name: &str,
    manifest: &Manifest,
    state: &mut StateFile,
) -> Result<Action> {
    let reconciler = VariableReconciler::new(transport);

    let prior = match state.variables.get(name) {
        Some(attrs) => {
            let recorded = VariableState::from_attributes(attrs)?;
            reconciler.read(&recorded.id.encode()).await?
        }
        None => None,
    };
    let desired = manifest
        .variables
        .get(name)
        .map(VariableConfig::from_attributes)
        .transpose()?;

    let action = plan_variable(prior.as_ref(), desired.as_ref());
    tracing::debug!(name, %action, "planned environment variable");

    let next = match (action, prior, desired) {
        (Action::Create, _, Some(desired)) => Some(reconciler.create(&desired).await?),
        (Action::Update, Some(prior), Some(desired)) => {
            Some(reconciler.update(&prior.id.encode(), &desired).await?)
        }
        (Action::Replace, Some(prior), Some(desired)) => {
            reconciler.delete(&prior.id.encode()).await?;
            Some(reconciler.create(&desired).await?)
        }
        (Action::Delete, Some(prior), _) => {
            reconciler.delete(&prior.id.encode()).await?;
            None
        }
        (_, prior, _) => prior,
    };

    match next {
        Some(next) => {
            state
                .variables
                .insert(name.to_string(), next.to_attributes());
        }
        None => {
            state.variables.remove(name);
        }
    }
    Ok(action)
}

async fn apply_value(
    transport: &dyn EnvVarTransport,
    name: &str,
    manifest: &Manifest,
    state: &mut StateFile,
) -> Result<Action> {
    let reconciler = ValueReconciler::new(transport);

    let prior = match state.values.get(name) {
        Some(attrs) => {
            let recorded = ValueState::from_attributes(attrs)?;
            reconciler
                .read(&recorded.environment_variable_id, recorded.context)
                .await?
        }
        None => None,
    };
    let desired = match manifest.values.get(name) {
        Some(attrs) => Some(ValueConfig::from_attributes(&resolve_references(
            attrs, state,
        )?)?),
        None => None,
    };

    let action = plan_value(prior.as_ref(), desired.as_ref());
    tracing::debug!(name, %action, "planned environment variable value");

    let next = match (action, prior, desired) {
        (Action::Create | Action::Update, _, Some(desired)) => {
            reconciler.create_or_update(&desired).await?
        }
        (Action::Replace, Some(prior), Some(desired)) => {
            reconciler
                .delete(&prior.environment_variable_id, prior.context)
                .await?;
            reconciler.create_or_update(&desired).await?
        }
        (Action::Delete, Some(prior), _) => {
            reconciler
                .delete(&prior.environment_variable_id, prior.context)
                .await?;
            None
        }
        (_, prior, _) => prior,
    };

    match next {
        Some(next) => {
            state.values.insert(name.to_string(), next.to_attributes());
        }
        None => {
            state.values.remove(name);
        }
    }
    Ok(action)
}

/// Replaces an `environment_variable_id` of the form `variables.<name>.id`
/// with the identifier recorded for that variable.
fn resolve_references(attrs: &serde_json::Value, state: &StateFile) -> Result<serde_json::Value> {
    let reference = attrs
        .get("environment_variable_id")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    let Some(name) = reference
        .strip_prefix(REFERENCE_PREFIX)
        .and_then(|rest| rest.strip_suffix(REFERENCE_SUFFIX))
    else {
        return Ok(attrs.clone());
    };

    let id = state
        .variables
        .get(name)
        .and_then(|v| v.get("id"))
        .and_then(|id| id.as_str())
        .ok_or_else(|| Error::UnresolvedReference {
            reference: reference.to_string(),
        })?;

    let mut resolved = attrs.clone();
    resolved["environment_variable_id"] = serde_json::Value::String(id.to_string());
    Ok(resolved)
}
