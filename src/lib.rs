//! netlify-env - Netlify environment variable reconciliation
//!
//! Manages account- and site-level environment variables and their
//! per-context values against the Netlify REST API.

pub mod config;
pub mod envvar;
pub mod error;
pub mod netlify;
pub mod plan;
pub mod resource;

pub use config::ProviderConfig;
pub use envvar::{AccountScope, EnvVarId, ValueReconciler, VariableReconciler};
pub use error::{Error, Result};
pub use netlify::{EnvVarTransport, NetlifyClient, NetlifyError};
pub use plan::{Action, ApplyReport, Manifest, StateFile, apply};
pub use resource::{Context, Scope, ValueConfig, ValueState, VariableConfig, VariableState};
