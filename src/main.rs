use std::fs::File;
use std::io::IsTerminal;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use genie::cli::Cli;
use genie::{ChatSession, Container, LineView, TerminalUi};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let full_screen =
        !cli.plain && std::io::stdin().is_terminal() && std::io::stdout().is_terminal();
    init_logging(&cli, full_screen)?;

    let (config, config_error) = cli.container_config();
    let mut chat = match config_error {
        Some(error) => ChatSession::halted(cli.greeting.clone(), error),
        None => Container::new(config).start_session(),
    };

    if full_screen {
        info!("Starting full-screen session");
        TerminalUi::new().run(&mut chat).await?;
    } else {
        info!("Starting line-mode session");
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut view = LineView::new(std::io::stdout())
            .with_echo(!std::io::stdin().is_terminal())
            .with_spinner(std::io::stderr().is_terminal());
        view.run(&mut chat, stdin).await?;
    }

    Ok(())
}

/// Logs go to `--log-file` when given. Otherwise the full-screen UI discards
/// them and line mode writes warnings to stderr.
fn init_logging(cli: &Cli, full_screen: bool) -> Result<()> {
    let default_level = match (cli.verbose, cli.log_file.is_some()) {
        (true, _) => "debug",
        (false, true) => "info",
        (false, false) => "warn",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false);

    if let Some(path) = &cli.log_file {
        let file = File::create(path)
            .with_context(|| format!("cannot create log file {}", path.display()))?;
        let subscriber = builder.with_ansi(false).with_writer(Arc::new(file)).finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else if full_screen {
        let subscriber = builder.with_writer(std::io::sink).finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = builder.with_writer(std::io::stderr).finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(())
}
