use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use task_tracker::cli::Cli;
use task_tracker::cmd::{cmd_completions, cmd_once, Commands};
use task_tracker::error::Result;
use task_tracker::repl::cmd_shell;
use task_tracker::tui::run::run_board;

fn main() {
    // RUST_LOG overrides the default; invalid or huge filters are ignored.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() || raw.len() > 4096 {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        None | Some(Commands::Shell) => cmd_shell(&cli.file, cli.json),
        Some(Commands::Ui) => {
            run_board(&cli.file)?;
            Ok(())
        }
        Some(Commands::Completions { shell }) => {
            cmd_completions(shell);
            Ok(())
        }
        Some(Commands::Task(command)) => cmd_once(&cli.file, cli.json, command),
    }
}
