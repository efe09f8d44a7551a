//! Clap CLI definitions for Beacon.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub const AFTER_HELP: &str = "\
\x1b[1;36mExamples:\x1b[0m
  beacon serve --port 9999 --path jmxrmi        Publish the demo objects
  beacon list --port 9999 --path jmxrmi         List remote objects
  beacon describe demo:type=Hello --port 9999   Show an object's methods
  beacon call demo:type=Hello say_hello World   Invoke a method

Values given to `call` are parsed as JSON; anything that is not valid JSON
is sent as a string.";

/// Beacon: publish managed objects and call them remotely.
#[derive(Parser)]
#[command(
    name = "beacon",
    version,
    about = "Beacon managed-object directory",
    after_help = AFTER_HELP,
)]
pub struct Cli {
    /// Path to config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Publish the demo objects and expose them until Ctrl+C.
    Serve {
        /// Listen port (0 picks a free port). Overrides `[server] port`.
        #[arg(long)]
        port: Option<i32>,
        /// Path clients must present. Overrides `[server] path`.
        #[arg(long)]
        path: Option<String>,
        /// Bind host. Overrides `[server] host`.
        #[arg(long)]
        host: Option<String>,
    },
    /// List the objects published by a remote directory.
    List {
        #[command(flatten)]
        target: Target,
    },
    /// Show the interface of one remote object.
    Describe {
        /// Qualified name, e.g. `demo:type=Hello`.
        name: String,
        #[command(flatten)]
        target: Target,
    },
    /// Invoke a method on a remote object and print the result.
    Call {
        /// Qualified name, e.g. `demo:type=Hello`.
        name: String,
        /// Method name.
        method: String,
        /// Arguments in declaration order.
        args: Vec<String>,
        #[command(flatten)]
        target: Target,
    },
}

/// Remote directory to talk to. Each flag overrides the `[client]` table.
#[derive(Args, Debug, Clone, Default)]
pub struct Target {
    /// Remote host.
    #[arg(long)]
    pub host: Option<String>,
    /// Remote port.
    #[arg(long)]
    pub port: Option<i32>,
    /// Path the server advertises.
    #[arg(long)]
    pub path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_call_with_args() {
        let cli = Cli::try_parse_from([
            "beacon",
            "call",
            "demo:type=Hello",
            "say_hello",
            "World",
            "--port",
            "9999",
        ])
        .unwrap();
        match cli.command {
            Commands::Call {
                name,
                method,
                args,
                target,
            } => {
                assert_eq!(name, "demo:type=Hello");
                assert_eq!(method, "say_hello");
                assert_eq!(args, vec!["World".to_string()]);
                assert_eq!(target.port, Some(9999));
                assert!(target.path.is_none());
            }
            _ => panic!("Expected call"),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["beacon", "list", "--config", "/tmp/b.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/b.toml")));
        assert!(matches!(cli.command, Commands::List { .. }));
    }

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["beacon", "serve"]).unwrap();
        match cli.command {
            Commands::Serve { port, path, host } => {
                assert!(port.is_none() && path.is_none() && host.is_none());
            }
            _ => panic!("Expected serve"),
        }
    }
}
