//! Environment variable reconciliation.
//!
//! Two declared entity kinds share one remote object: the variable itself
//! ([`VariableReconciler`]) and a single context value nested in it
//! ([`ValueReconciler`]). Both address the remote object through the
//! composite identifier [`EnvVarId`].

pub mod drift;
mod id;
mod value;
mod variable;

pub use drift::is_not_found;
pub use id::{AccountScope, EnvVarId};
pub use value::ValueReconciler;
pub use variable::{VariableReconciler, merge_values, normalize_scopes};
