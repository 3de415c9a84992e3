use super::drift::absent_on_not_found;
use super::id::EnvVarId;
use crate::error::Result;
use crate::netlify::{EnvVarTransport, SetValueBody};
use crate::resource::{Context, ValueConfig, ValueState};

/// Create/read/update/delete for `netlify_environment_variable_value`.
///
/// A value is stored inside its parent variable. Writes never go through the
/// variable's update endpoint (which needs the full value list); they use the
/// per-context set-value call, where an empty value removes the entry.
pub struct ValueReconciler<'a> {
    transport: &'a dyn EnvVarTransport,
}

impl<'a> ValueReconciler<'a> {
    pub fn new(transport: &'a dyn EnvVarTransport) -> Self {
        Self { transport }
    }

    /// Sets the value and reads it back. An empty `value` removes the entry,
    /// so the result is `None` in that case.
    pub async fn create_or_update(&self, config: &ValueConfig) -> Result<Option<ValueState>> {
        let id = EnvVarId::decode(&config.environment_variable_id)?;
        self.set(&id, config.context, &config.value).await?;
        tracing::info!(id = %id, context = %config.context, "environment variable value set");

        self.read(&config.environment_variable_id, config.context)
            .await
    }

    /// Finds the entry for `context` in the parent variable. `Ok(None)` when
    /// either the parent or the entry is gone.
    pub async fn read(
        &self,
        environment_variable_id: &str,
        context: Context,
    ) -> Result<Option<ValueState>> {
        let id = EnvVarId::decode(environment_variable_id)?;
        let Some(env_var) =
            absent_on_not_found(self.transport.get_variable(&id.scope, &id.key).await)?
        else {
            tracing::warn!(id = %id, "parent environment variable not found remotely");
            return Ok(None);
        };

        let found = env_var
            .values
            .into_iter()
            .find(|v| v.context == context.as_str());

        match found {
            Some(value) => Ok(Some(ValueState {
                id: value.id.unwrap_or_default(),
                environment_variable_id: environment_variable_id.to_string(),
                context,
                value: value.value,
            })),
            None => {
                tracing::warn!(id = %id, context = %context, "environment variable value not found remotely");
                Ok(None)
            }
        }
    }

    pub async fn delete(&self, environment_variable_id: &str, context: Context) -> Result<()> {
        let id = EnvVarId::decode(environment_variable_id)?;
        self.set(&id, context, "").await?;
        tracing::info!(id = %id, context = %context, "environment variable value removed");
        Ok(())
    }

    async fn set(&self, id: &EnvVarId, context: Context, value: &str) -> Result<()> {
        let body = SetValueBody {
            context: context.as_str().to_string(),
            value: value.to_string(),
        };

        match self.transport.set_value(&id.scope, &id.key, &body).await {
            Ok(_) => Ok(()),
            // NOTE: The API answers some successful set-value calls with an
            // error status and no body. Those count as success.
            Err(err) if err.is_empty_api_error() => {
                tracing::warn!(
                    id = %id,
                    status = ?err.code(),
                    "set-value returned an empty error response, treating as success"
                );
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}
