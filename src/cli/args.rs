use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;

use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[arg(long, env = "NETLIFY_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    #[arg(long, env = "NETLIFY_BASE_URL", global = true)]
    pub base_url: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage environment variables
    Variable {
        #[command(subcommand)]
        command: VariableCommand,
    },
    /// Manage single context values of an environment variable
    Value {
        #[command(subcommand)]
        command: ValueCommand,
    },
    /// Reconcile a manifest of declared entities against a state file
    Apply(ApplyArgs),
}

#[derive(Subcommand, Debug)]
pub enum VariableCommand {
    Create(VariableArgs),
    /// Read (or import) a variable by its `key/account_id/site_id` identifier
    Read { id: String },
    Update(UpdateArgs),
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum ValueCommand {
    Set(ValueArgs),
    Read(ValueRefArgs),
    Delete(ValueRefArgs),
}

#[derive(clap::Args, Debug)]
pub struct VariableArgs {
    #[arg(long)]
    pub account_id: String,

    #[arg(long)]
    pub site_id: Option<String>,

    #[arg(long)]
    pub key: String,

    #[arg(long = "scope", value_delimiter = ',')]
    pub scopes: Vec<String>,

    /// Value for one context, as `context=value`
    #[arg(long = "value", value_parser = parse_value_block)]
    pub values: Vec<(String, String)>,
}

impl VariableArgs {
    pub fn to_attributes(&self) -> serde_json::Value {
        json!({
            "account_id": self.account_id,
            "site_id": self.site_id,
            "key": self.key,
            "scopes": self.scopes,
            "value": value_blocks(&self.values),
        })
    }
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    pub id: String,

    /// New key; keeps the current key when omitted
    #[arg(long)]
    pub key: Option<String>,

    #[arg(long = "scope", value_delimiter = ',')]
    pub scopes: Vec<String>,

    #[arg(long = "value", value_parser = parse_value_block)]
    pub values: Vec<(String, String)>,
}

impl UpdateArgs {
    /// Attributes for the variable behind `self.id`, which must already be decoded.
    pub fn to_attributes(&self, current: &netlify_env::EnvVarId) -> serde_json::Value {
        json!({
            "account_id": current.scope.account_id,
            "site_id": current.scope.site_id(),
            "key": self.key.as_deref().unwrap_or(&current.key),
            "scopes": self.scopes,
            "value": value_blocks(&self.values),
        })
    }
}

#[derive(clap::Args, Debug)]
pub struct ValueArgs {
    #[command(flatten)]
    pub target: ValueRefArgs,

    #[arg(long)]
    pub value: String,
}

impl ValueArgs {
    pub fn to_attributes(&self) -> serde_json::Value {
        json!({
            "environment_variable_id": self.target.variable_id,
            "context": self.target.context,
            "value": self.value,
        })
    }
}

#[derive(clap::Args, Debug)]
pub struct ValueRefArgs {
    /// Identifier of the parent variable
    #[arg(long)]
    pub variable_id: String,

    #[arg(long)]
    pub context: String,
}

#[derive(clap::Args, Debug)]
pub struct ApplyArgs {
    #[arg(long)]
    pub manifest: PathBuf,

    #[arg(long, default_value = "netlify-env.state.json")]
    pub state: PathBuf,
}

fn parse_value_block(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(context, value)| (context.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected context=value, got '{raw}'"))
}

fn value_blocks(values: &[(String, String)]) -> Vec<serde_json::Value> {
    values
        .iter()
        .map(|(context, value)| json!({"context": context, "value": value}))
        .collect()
}
