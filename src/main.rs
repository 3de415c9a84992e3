mod cli;
mod output;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, ValueCommand, VariableCommand};
use netlify_env::{
    EnvVarId, EnvVarTransport, Manifest, ProviderConfig, StateFile, ValueConfig, ValueReconciler,
    VariableConfig, VariableReconciler,
};
use output::OutputFormat;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ProviderConfig::new(cli.token, cli.base_url)?;
    let client = config.client()?;

    let rendered = run(&client, cli.command, cli.format).await?;
    println!("{rendered}");

    Ok(())
}

async fn run(
    transport: &dyn EnvVarTransport,
    command: Command,
    format: OutputFormat,
) -> Result<String> {
    match command {
        Command::Variable { command } => {
            let reconciler = VariableReconciler::new(transport);
            match command {
                VariableCommand::Create(args) => {
                    let config = VariableConfig::from_attributes(&args.to_attributes())?;
                    let state = reconciler.create(&config).await?;
                    Ok(output::render_variable(Some(&state), format))
                }
                VariableCommand::Read { id } => {
                    let state = reconciler.read(&id).await?;
                    Ok(output::render_variable(state.as_ref(), format))
                }
                VariableCommand::Update(args) => {
                    let current = EnvVarId::decode(&args.id)?;
                    let config = VariableConfig::from_attributes(&args.to_attributes(&current))?;
                    let state = reconciler.update(&args.id, &config).await?;
                    Ok(output::render_variable(Some(&state), format))
                }
                VariableCommand::Delete { id } => {
                    // Refresh first: a variable already gone remotely is not an error.
                    if reconciler.read(&id).await?.is_some() {
                        reconciler.delete(&id).await?;
                    }
                    Ok(output::render_deleted(&id, format))
                }
            }
        }
        Command::Value { command } => {
            let reconciler = ValueReconciler::new(transport);
            match command {
                ValueCommand::Set(args) => {
                    let config = ValueConfig::from_attributes(&args.to_attributes())?;
                    let state = reconciler.create_or_update(&config).await?;
                    Ok(output::render_value(state.as_ref(), format))
                }
                ValueCommand::Read(args) => {
                    let context = args.context.parse()?;
                    let state = reconciler.read(&args.variable_id, context).await?;
                    Ok(output::render_value(state.as_ref(), format))
                }
                ValueCommand::Delete(args) => {
                    let context = args.context.parse()?;
                    if reconciler.read(&args.variable_id, context).await?.is_some() {
                        reconciler.delete(&args.variable_id, context).await?;
                    }
                    Ok(output::render_deleted(
                        &format!("{}:{}", args.variable_id, args.context),
                        format,
                    ))
                }
            }
        }
        Command::Apply(args) => {
            let manifest = Manifest::load(&args.manifest)?;
            let mut state = StateFile::load(&args.state)?;

            let result = netlify_env::apply(transport, &manifest, &mut state).await;
            // Whatever completed before a failure is still recorded.
            state.save(&args.state)?;

            let report = result?;
            tracing::info!(state = %args.state.display(), "state written");
            Ok(output::render_report(&report, format))
        }
    }
}
