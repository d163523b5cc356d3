mod browser;
mod cli;
mod commands;
mod state;

use browser::BrowserDialog;
use clap::Parser;
use cli::{Cli, Commands, GraphCommand};
use state::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let dialog = BrowserDialog {
        print_only: cli.no_browser,
    };

    match cli.command {
        Commands::Doc {
            action,
            file,
            select,
        } => commands::doc(action, &file, select.as_deref()).await,
        Commands::Dialog { code, message } => {
            let (_, config) = state::load_config(cli.config_dir.as_deref())?;
            commands::dialog(&config.dialog, &dialog, code, message).await
        }
        Commands::Graph(command) => {
            let (config_manager, config) = state::load_config(cli.config_dir.as_deref())?;
            let mut state = AppState::initialize(config_manager.config_path(), config, dialog)?;
            run(&mut state, command).await
        }
    }
}

async fn run(state: &mut AppState, command: GraphCommand) -> anyhow::Result<()> {
    match command {
        GraphCommand::Login => commands::login(state).await,
        GraphCommand::CompleteLogin { url } => commands::complete_login(state, &url).await,
        GraphCommand::Logout => commands::logout(state).await,
        GraphCommand::Whoami => commands::whoami(state).await,
        GraphCommand::SendMail => commands::send_mail(state).await,
        GraphCommand::Upload { path } => commands::upload(state, path.as_deref()).await,
        GraphCommand::Explore { url, body } => {
            commands::explore(state, &url, body.as_deref()).await
        }
    }
}
