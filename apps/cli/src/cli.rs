//! Command-line arguments

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "keyturn")]
#[command(about = "Rotate cloud access keys one step at a time", long_about = None)]
#[command(version)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "KEYTURN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Run against in-memory backends instead of the cloud
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Handle a raw `{"action", "username"}` request
    Handle {
        /// File holding the request, or `-` for stdin
        #[arg(long, default_value = "-")]
        event: String,
    },

    /// Issue a new key and store it as current
    Create {
        /// Identity to rotate
        username: String,
    },

    /// Deactivate the key recorded as previous
    Deactivate {
        /// Identity to rotate
        username: String,
    },

    /// Delete the previous key once it is inactive
    Delete {
        /// Identity to rotate
        username: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_shorthand() {
        let cli = Cli::try_parse_from(["keyturn", "--dry-run", "create", "svc-app"]).unwrap();
        assert!(cli.dry_run);
        assert_eq!(
            cli.command,
            Command::Create {
                username: "svc-app".into()
            }
        );
    }

    #[test]
    fn handle_reads_stdin_by_default() {
        let cli = Cli::try_parse_from(["keyturn", "handle"]).unwrap();
        assert_eq!(cli.command, Command::Handle { event: "-".into() });
    }
}
