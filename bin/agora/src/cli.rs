use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    about = concat!(env!("CARGO_CRATE_NAME"), " - terminal client for Agora discussion forums"),
    version
)]
pub struct Flags {
    /// Configuration file (defaults to $AGORA_CONFIG or ./agora.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "AGORA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "AGORA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Print the signed-in user
    Whoami,
    /// Print a thread and its discussion
    Show { slug: String },
    /// Upvote a thread's post, or one of its comments
    Upvote {
        slug: String,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Reply to a thread's post, or to one of its comments
    Reply {
        slug: String,
        text: String,
        /// Comment id to reply to
        #[arg(long)]
        to: Option<String>,
    },
    /// Start a new discussion
    Publish {
        #[arg(long)]
        category: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },
}

impl Flags {
    /// Parse from `std::env::args_os()`, exiting on error.
    pub fn from_args() -> Self {
        Self::parse()
    }
}
