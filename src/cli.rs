use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;
use crate::json::DEFAULT_FILE;

/// Single-user task tracker with a category/priority matrix.
/// Storage defaults to ./tasks.json or a path passed via --file.
#[derive(Parser, Debug)]
#[command(name = "tt", version, about = "Single-user command-line task tracker")]
pub struct Cli {
    /// Path to the JSON data file.
    #[arg(
        long,
        global = true,
        visible_alias = "db",
        env = "TASK_TRACKER_FILE",
        default_value = DEFAULT_FILE
    )]
    pub file: PathBuf,

    /// Print JSON instead of tables where a command has output.
    #[arg(long, global = true)]
    pub json: bool,

    /// Runs the interactive shell when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::TaskCommand;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_to_tasks_json_and_shell() {
        let cli = Cli::try_parse_from(["tt"]).unwrap();
        assert_eq!(cli.file, PathBuf::from("tasks.json"));
        assert!(cli.command.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn task_commands_are_flattened_into_top_level() {
        let cli = Cli::try_parse_from(["tt", "--db", "x.json", "add", "Buy milk", "2%"]).unwrap();
        assert_eq!(cli.file, PathBuf::from("x.json"));
        match cli.command {
            Some(Commands::Task(TaskCommand::Add { title, description })) => {
                assert_eq!(title, "Buy milk");
                assert_eq!(description.as_deref(), Some("2%"));
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn negative_priority_reaches_the_validator() {
        let cli = Cli::try_parse_from(["tt", "priority", "1", "-3"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Task(TaskCommand::Priority { ref priority, .. })) if priority == "-3"
        ));
    }
}
