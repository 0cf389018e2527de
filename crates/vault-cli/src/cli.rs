use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use vault_core::VERSION;

/// Vault - a personal secret store with per-user encryption
#[derive(Parser)]
#[command(name = "vault")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create config, signing secret and database
    Init(InitArgs),

    /// Register a new account and start a session
    Register(AccountArgs),

    /// Log in and start a session
    Login(AccountArgs),

    /// Forget the current session
    Logout,

    /// Show the current session
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Text records
    #[command(subcommand)]
    Text(TextCommand),

    /// Binary file records
    #[command(subcommand)]
    Binary(BinaryCommand),

    /// Payment card records
    #[command(subcommand)]
    Card(CardCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Database file (defaults to the XDG data directory)
    #[arg(long, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Session lifetime in hours
    #[arg(long, value_name = "HOURS")]
    pub ttl_hours: Option<i64>,
}

/// Arguments for `register` and `login`
#[derive(Args)]
pub struct AccountArgs {
    /// Account login
    #[arg(long)]
    pub login: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Record id plus output format
#[derive(Args)]
pub struct ShowArgs {
    /// Record ID
    #[arg(value_name = "ID")]
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum TextCommand {
    /// Store a text record
    Add {
        /// Text to store (read from stdin when omitted)
        #[arg(value_name = "TEXT")]
        text: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a text record
    Show(ShowArgs),

    /// Delete a text record
    Delete {
        #[arg(value_name = "ID")]
        id: String,
    },
}

#[derive(Subcommand)]
pub enum BinaryCommand {
    /// Store a file
    Add {
        /// File to store
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Stored filename (defaults to the file's own name)
        #[arg(long)]
        name: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a stored file back to disk
    Get {
        #[arg(value_name = "ID")]
        id: String,

        /// Directory to write into
        #[arg(long, value_name = "DIR", default_value = ".")]
        out: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a stored file
    Delete {
        #[arg(value_name = "ID")]
        id: String,
    },
}

#[derive(Subcommand)]
pub enum CardCommand {
    /// Store a payment card
    ///
    /// The card number and CVV are prompted for on a terminal, or read from
    /// stdin as two lines, so they never appear in the process arguments.
    Add {
        /// Cardholder name
        #[arg(long)]
        holder: String,

        /// Expiration date (MM/YY)
        #[arg(long)]
        expires: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a payment card
    Show(ShowArgs),

    /// Delete a payment card
    Delete {
        #[arg(value_name = "ID")]
        id: String,
    },
}
