//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Inspect entry points declared in an environment and check whether they can be loaded
#[derive(Parser, Debug)]
#[command(name = "entries")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Environment manifest describing installed packages
    #[arg(
        long = "env",
        env = "ENTRIES_ENV",
        default_value = entry_manifest::ENVIRONMENT_FILENAME,
        global = true
    )]
    pub env: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List every group that has declared entry points
    Groups,

    /// List entry point names in a group
    ///
    /// Examples:
    ///   entries list nodes
    ///   entries --env ./environment.toml list api
    List {
        /// Entry point group
        group: String,
    },

    /// Show every entry point of a group with its conflicts
    Show {
        /// Entry point group
        group: String,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Load an entry point and print its resolved target
    Load {
        /// Entry point group
        group: String,

        /// Entry point name
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list() {
        let cli = Cli::try_parse_from(["entries", "list", "nodes"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::List {
                group: "nodes".to_string()
            })
        );
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_show_json_with_env() {
        let cli =
            Cli::try_parse_from(["entries", "show", "api", "--json", "--env", "/tmp/env.toml"])
                .unwrap();
        assert_eq!(cli.env, PathBuf::from("/tmp/env.toml"));
        assert_eq!(
            cli.command,
            Some(Commands::Show {
                group: "api".to_string(),
                json: true
            })
        );
    }

    #[test]
    fn test_load_requires_name() {
        assert!(Cli::try_parse_from(["entries", "load", "nodes"]).is_err());
    }
}
