#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use netlify_env::netlify::{ApiErrorBody, EnvVar, EnvVarValue, EnvVarWrite, SetValueBody};
use netlify_env::{AccountScope, EnvVarTransport, NetlifyError};

type Address = (String, Option<String>, String);

fn address(scope: &AccountScope, key: &str) -> Address {
    (
        scope.account_id.clone(),
        scope.site_id().map(str::to_string),
        key.to_string(),
    )
}

fn not_found(key: &str) -> NetlifyError {
    NetlifyError::NotFound {
        path: format!("/env/{key}"),
    }
}

/// In-memory stand-in for the Netlify env var API.
#[derive(Default)]
pub struct MemoryTransport {
    vars: Mutex<BTreeMap<Address, EnvVar>>,
    next_id: AtomicU64,
    calls: Mutex<Vec<String>>,
    get_failure: Mutex<Option<(u16, Option<ApiErrorBody>)>>,
    set_value_failure: Mutex<Option<(u16, Option<ApiErrorBody>)>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn stored(&self, scope: &AccountScope, key: &str) -> Option<EnvVar> {
        self.vars.lock().unwrap().get(&address(scope, key)).cloned()
    }

    /// Removes a variable behind the reconcilers' back.
    pub fn remove(&self, scope: &AccountScope, key: &str) {
        self.vars.lock().unwrap().remove(&address(scope, key));
    }

    pub fn fail_next_get(&self, status: u16, payload: Option<ApiErrorBody>) {
        *self.get_failure.lock().unwrap() = Some((status, payload));
    }

    pub fn fail_next_set_value(&self, status: u16, payload: Option<ApiErrorBody>) {
        *self.set_value_failure.lock().unwrap() = Some((status, payload));
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn assign_ids(&self, values: &[EnvVarValue]) -> Vec<EnvVarValue> {
        values
            .iter()
            .map(|v| EnvVarValue {
                id: v.id.clone().or_else(|| Some(self.fresh_id())),
                ..v.clone()
            })
            .collect()
    }

    fn fresh_id(&self) -> String {
        format!("val-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[async_trait]
impl EnvVarTransport for MemoryTransport {
    async fn create_variable(
        &self,
        scope: &AccountScope,
        env_var: &EnvVarWrite,
    ) -> Result<Vec<EnvVar>, NetlifyError> {
        self.log(format!("POST {}", env_var.key));
        let mut vars = self.vars.lock().unwrap();
        let addr = address(scope, &env_var.key);
        if vars.contains_key(&addr) {
            return Err(NetlifyError::Api {
                status: 422,
                payload: Some(ApiErrorBody {
                    code: Some(422),
                    message: "key already exists".to_string(),
                }),
            });
        }

        let created = EnvVar {
            key: env_var.key.clone(),
            scopes: env_var.scopes.clone(),
            values: self.assign_ids(&env_var.values),
            is_secret: Some(false),
            updated_at: None,
        };
        vars.insert(addr, created.clone());
        Ok(vec![created])
    }

    async fn get_variable(&self, scope: &AccountScope, key: &str) -> Result<EnvVar, NetlifyError> {
        self.log(format!("GET {key}"));
        if let Some((status, payload)) = self.get_failure.lock().unwrap().take() {
            return Err(NetlifyError::Api { status, payload });
        }
        self.vars
            .lock()
            .unwrap()
            .get(&address(scope, key))
            .cloned()
            .ok_or_else(|| not_found(key))
    }

    async fn update_variable(
        &self,
        scope: &AccountScope,
        key: &str,
        env_var: &EnvVarWrite,
    ) -> Result<EnvVar, NetlifyError> {
        self.log(format!("PUT {key}"));
        let mut vars = self.vars.lock().unwrap();
        let mut existing = vars.remove(&address(scope, key)).ok_or_else(|| not_found(key))?;

        existing.key = env_var.key.clone();
        existing.scopes = env_var.scopes.clone();
        existing.values = self.assign_ids(&env_var.values);
        vars.insert(address(scope, &env_var.key), existing.clone());
        Ok(existing)
    }

    async fn delete_variable(&self, scope: &AccountScope, key: &str) -> Result<(), NetlifyError> {
        self.log(format!("DELETE {key}"));
        self.vars
            .lock()
            .unwrap()
            .remove(&address(scope, key))
            .map(|_| ())
            .ok_or_else(|| not_found(key))
    }

    async fn set_value(
        &self,
        scope: &AccountScope,
        key: &str,
        value: &SetValueBody,
    ) -> Result<Option<EnvVarValue>, NetlifyError> {
        self.log(format!("PATCH {key} {}", value.context));
        if let Some((status, payload)) = self.set_value_failure.lock().unwrap().take() {
            return Err(NetlifyError::Api { status, payload });
        }

        let mut vars = self.vars.lock().unwrap();
        let env_var = vars
            .get_mut(&address(scope, key))
            .ok_or_else(|| not_found(key))?;

        if value.value.is_empty() {
            env_var.values.retain(|v| v.context != value.context);
            return Ok(None);
        }

        match env_var.values.iter_mut().find(|v| v.context == value.context) {
            Some(entry) => {
                entry.value = value.value.clone();
                Ok(Some(entry.clone()))
            }
            None => {
                let entry = EnvVarValue {
                    id: Some(self.fresh_id()),
                    ..EnvVarValue::new(value.context.as_str(), value.value.as_str())
                };
                env_var.values.push(entry.clone());
                Ok(Some(entry))
            }
        }
    }
}
