//! Vault CLI - a personal secret store with per-user encryption
//!
//! This is the command-line interface for Vault. It provides a user-friendly
//! interface to the core library functionality.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod output;
mod security;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use vault_core::VaultError;

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::commands::{account, binary, card, init, misc, text};
use crate::constants::env;
use crate::errors::CliError;

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let ctx = AppContext::new(&cli);

    if let Err(err) = run(&ctx, &cli) {
        if let Some(cli_err) = err.downcast_ref::<CliError>() {
            cli_err.exit();
        }
        if let Some(cli_err) = err.downcast_ref::<VaultError>().and_then(CliError::from_vault) {
            cli_err.exit();
        }
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

/// Log to stderr, filtered by VAULT_LOG (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_env(env::LOG).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(ctx: &AppContext, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Init(args) => init::handle_init(ctx, args),
        Commands::Register(args) => account::handle_register(ctx, args),
        Commands::Login(args) => account::handle_login(ctx, args),
        Commands::Logout => account::handle_logout(ctx),
        Commands::Whoami { json } => account::handle_whoami(ctx, *json),
        Commands::Text(command) => text::handle_text(ctx, command),
        Commands::Binary(command) => binary::handle_binary(ctx, command),
        Commands::Card(command) => card::handle_card(ctx, command),
        Commands::Completions { shell } => misc::handle_completions(*shell),
    }
}
