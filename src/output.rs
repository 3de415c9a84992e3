use tabled::{Table, Tabled};
use termtree::Tree;

use netlify_env::{ApplyReport, ValueState, VariableState};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Table,
    Tree,
}

#[derive(Tabled)]
struct ValueRow {
    context: String,
    id: String,
    value: String,
}

#[derive(Tabled)]
struct ChangeRow {
    resource: String,
    name: String,
    action: String,
}

pub fn render_variable(state: Option<&VariableState>, format: OutputFormat) -> String {
    let Some(state) = state else {
        return render_absent(format);
    };

    match format {
        OutputFormat::Json => pretty(&state.to_attributes()),
        OutputFormat::Table => {
            let rows = state.values.iter().map(|v| ValueRow {
                context: v.context.clone(),
                id: v.id.clone().unwrap_or_default(),
                value: v.value.clone(),
            });
            format!(
                "id:     {}\nscopes: {}\n{}",
                state.id,
                join_scopes(state),
                Table::new(rows)
            )
        }
        OutputFormat::Tree => {
            let mut root = Tree::new(state.id.to_string());
            root.push(Tree::new(format!("scopes: {}", join_scopes(state))));
            let values = state
                .values
                .iter()
                .map(|v| Tree::new(format!("{} = {:?}", v.context, v.value)));
            root.push(Tree::new("values".to_string()).with_leaves(values));
            root.to_string()
        }
    }
}

pub fn render_value(state: Option<&ValueState>, format: OutputFormat) -> String {
    let Some(state) = state else {
        return render_absent(format);
    };

    match format {
        OutputFormat::Json => pretty(&state.to_attributes()),
        OutputFormat::Table => Table::new([ValueRow {
            context: state.context.to_string(),
            id: state.id.clone(),
            value: state.value.clone(),
        }])
        .to_string(),
        OutputFormat::Tree => Tree::new(state.environment_variable_id.clone())
            .with_leaves([format!("{} = {:?}", state.context, state.value)])
            .to_string(),
    }
}

pub fn render_report(report: &ApplyReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => pretty(&serde_json::json!(report)),
        OutputFormat::Table => Table::new(report.changes.iter().map(|c| ChangeRow {
            resource: c.resource_type.to_string(),
            name: c.name.clone(),
            action: c.action.to_string(),
        }))
        .to_string(),
        OutputFormat::Tree => {
            let leaves = report
                .changes
                .iter()
                .map(|c| format!("{}.{}: {}", c.resource_type, c.name, c.action));
            Tree::new("apply".to_string()).with_leaves(leaves).to_string()
        }
    }
}

pub fn render_deleted(id: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => pretty(&serde_json::json!({ "id": id, "deleted": true })),
        OutputFormat::Table | OutputFormat::Tree => format!("deleted {id}"),
    }
}

fn render_absent(format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => "null".to_string(),
        OutputFormat::Table | OutputFormat::Tree => "not found".to_string(),
    }
}

fn join_scopes(state: &VariableState) -> String {
    state
        .scopes
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use netlify_env::netlify::EnvVarValue;
    use netlify_env::{AccountScope, Context, EnvVarId, Scope};

    fn state() -> VariableState {
        VariableState {
            id: EnvVarId::new(AccountScope::new("acct", Some("site".to_string())), "DB_URL"),
            scopes: Scope::full_set(),
            values: vec![EnvVarValue {
                id: Some("v1".to_string()),
                ..EnvVarValue::new("dev", "postgres://dev")
            }],
        }
    }

    #[test]
    fn test_render_variable_json() {
        let rendered = render_variable(Some(&state()), OutputFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["id"], "DB_URL/acct/site");
        assert_eq!(parsed["value"][0]["context"], "dev");
    }

    #[test]
    fn test_render_variable_table() {
        let rendered = render_variable(Some(&state()), OutputFormat::Table);
        assert!(rendered.contains("DB_URL/acct/site"));
        assert!(rendered.contains("builds,functions,post_processing,runtime"));
        assert!(rendered.contains("postgres://dev"));
        assert!(rendered.contains("context"));
    }

    #[test]
    fn test_render_variable_tree() {
        let rendered = render_variable(Some(&state()), OutputFormat::Tree);
        assert!(rendered.starts_with("DB_URL/acct/site"));
        assert!(rendered.contains("dev = \"postgres://dev\""));
    }

    #[test]
    fn test_render_absent() {
        assert_eq!(render_variable(None, OutputFormat::Json), "null");
        assert_eq!(render_value(None, OutputFormat::Table), "not found");
    }

    #[test]
    fn test_render_value_json() {
        let value = ValueState {
            id: "v1".to_string(),
            environment_variable_id: "DB_URL/acct/".to_string(),
            context: Context::Production,
            value: "x".to_string(),
        };
        let rendered = render_value(Some(&value), OutputFormat::Json);
        assert!(rendered.contains("\"production\""));
    }
}
