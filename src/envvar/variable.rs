use std::collections::BTreeSet;

use super::drift::absent_on_not_found;
use super::id::EnvVarId;
use crate::error::{Error, Result};
use crate::netlify::{EnvVar, EnvVarTransport, EnvVarValue, EnvVarWrite};
use crate::resource::{DeclaredValue, Scope, VariableConfig, VariableState};

// NOTE: The create endpoint refuses a key without at least one value
const PLACEHOLDER_CONTEXT: &str = "all";

/// Scopes to send on the wire. An empty declaration means every scope; the
/// API only defaults that way on create, so the full set is always explicit.
pub fn normalize_scopes(declared: &BTreeSet<Scope>) -> Vec<Scope> {
    if declared.is_empty() {
        Scope::ALL.to_vec()
    } else {
        declared.iter().copied().collect()
    }
}

fn initial_values(declared: &[DeclaredValue]) -> Vec<EnvVarValue> {
    if declared.is_empty() {
        return vec![EnvVarValue::new(PLACEHOLDER_CONTEXT, "")];
    }
    declared
        .iter()
        .map(|v| EnvVarValue::new(v.context.as_str(), v.value.as_str()))
        .collect()
}

/// Overlays declared values onto the remote list by context.
///
/// The update endpoint replaces the whole value list, so every remote entry
/// without a declared counterpart is carried forward as-is. Declared values
/// replace the matching entry in place and keep its server id.
///
/// Removing a `value` block from a declaration therefore never removes the
/// remote entry; delete it through the value resource instead.
pub fn merge_values(existing: Vec<EnvVarValue>, declared: &[DeclaredValue]) -> Vec<EnvVarValue> {
    let mut merged = existing;
    for declared in declared {
        match merged.iter_mut().find(|v| v.context == declared.context.as_str()) {
            Some(entry) => entry.value = declared.value.clone(),
            None => merged.push(EnvVarValue::new(
                declared.context.as_str(),
                declared.value.as_str(),
            )),
        }
    }
    merged
}

/// Remote contexts that no declared value covers, in remote order.
pub(crate) fn undeclared_contexts(existing: &[EnvVarValue], declared: &[DeclaredValue]) -> Vec<String> {
    existing
        .iter()
        .filter(|v| !declared.iter().any(|d| d.context.as_str() == v.context))
        .map(|v| v.context.clone())
        .collect()
}

fn into_state(scope_of: &EnvVarId, env_var: EnvVar) -> VariableState {
    VariableState {
        id: EnvVarId::new(scope_of.scope.clone(), env_var.key),
        scopes: env_var.scopes.into_iter().collect(),
        values: env_var.values,
    }
}

/// Create/read/update/delete for `netlify_environment_variable`.
///
/// Holds nothing but the transport; build one per operation.
pub struct VariableReconciler<'a> {
    transport: &'a dyn EnvVarTransport,
}

impl<'a> VariableReconciler<'a> {
    pub fn new(transport: &'a dyn EnvVarTransport) -> Self {
        Self { transport }
    }

    pub async fn create(&self, config: &VariableConfig) -> Result<VariableState> {
        let body = EnvVarWrite {
            key: config.key.clone(),
            scopes: normalize_scopes(&config.scopes),
            values: initial_values(&config.values),
        };

        self.transport.create_variable(&config.scope, &body).await?;

        let id = EnvVarId::new(config.scope.clone(), config.key.as_str());
        tracing::info!(id = %id, scopes = body.scopes.len(), "environment variable created");

        self.read_back(&id).await
    }

    /// `Ok(None)` when the variable no longer exists remotely.
    pub async fn read(&self, id: &str) -> Result<Option<VariableState>> {
        let id = EnvVarId::decode(id)?;
        let fetched =
            absent_on_not_found(self.transport.get_variable(&id.scope, &id.key).await)?;

        match fetched {
            Some(env_var) => Ok(Some(into_state(&id, env_var))),
            None => {
                tracing::warn!(id = %id, "environment variable not found remotely, removing from state");
                Ok(None)
            }
        }
    }

    /// Rewrites key and scopes, merging declared values over the current
    /// remote values. Returns the state under the (possibly new) identifier.
    pub async fn update(&self, id: &str, config: &VariableConfig) -> Result<VariableState> {
        let id = EnvVarId::decode(id)?;
        if config.scope != id.scope {
            return Err(Error::invalid(
                "account_id",
                "account_id and site_id cannot change in place, the variable must be replaced",
            ));
        }

        let current = self.transport.get_variable(&id.scope, &id.key).await?;
        if !config.values.is_empty() {
            let retained = undeclared_contexts(&current.values, &config.values);
            if !retained.is_empty() {
                tracing::warn!(
                    id = %id,
                    contexts = ?retained,
                    "remote values without a matching value block are kept"
                );
            }
        }
        let body = EnvVarWrite {
            key: config.key.clone(),
            scopes: normalize_scopes(&config.scopes),
            values: merge_values(current.values, &config.values),
        };

        let updated = self
            .transport
            .update_variable(&id.scope, &id.key, &body)
            .await?;

        let new_id = EnvVarId::new(id.scope.clone(), updated.key);
        if new_id != id {
            tracing::info!(old_id = %id, new_id = %new_id, "environment variable renamed");
        }
        tracing::info!(id = %new_id, values = body.values.len(), "environment variable updated");

        self.read_back(&new_id).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let id = EnvVarId::decode(id)?;
        self.transport.delete_variable(&id.scope, &id.key).await?;
        tracing::info!(id = %id, "environment variable deleted");
        Ok(())
    }

    async fn read_back(&self, id: &EnvVarId) -> Result<VariableState> {
        self.read(&id.encode())
            .await?
            .ok_or_else(|| Error::Vanished { id: id.encode() })
    }
}
