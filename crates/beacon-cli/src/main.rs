//! Beacon CLI: publish demo managed objects and inspect remote directories.

mod cli;
mod cmd;
mod demo;
mod ui;

use clap::Parser;
use cli::{Cli, Commands};

/// Trace to stderr, filtered by `RUST_LOG` (default `info`).
fn init_tracing_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing_stderr();

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Serve { port, path, host } => cmd::serve::cmd_serve(config, port, path, host),
        Commands::List { target } => cmd::remote::cmd_list(config, &target),
        Commands::Describe { name, target } => cmd::remote::cmd_describe(config, &target, &name),
        Commands::Call {
            name,
            method,
            args,
            target,
        } => cmd::remote::cmd_call(config, &target, &name, &method, &args),
    }
}
