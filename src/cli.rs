//! Command-line interface for numble.

use clap::{Parser, Subcommand};

/// Numble - two-player code guessing
#[derive(Parser, Debug)]
#[command(name = "numble")]
#[command(about = "Numble scoring, validation and an in-memory demo game", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score a guess against a secret
    Score {
        /// Secret code (four distinct digits 1-9)
        secret: String,
        /// Guess to score
        guess: String,
    },

    /// Check whether a code is well-formed
    Validate {
        /// Code to check
        code: String,
    },

    /// Play a scripted two-player game on an in-memory store and log every
    /// room snapshot
    Demo {
        /// Host's name
        #[arg(long, default_value = "Ada")]
        host: String,

        /// Guest's name
        #[arg(long, default_value = "Grace")]
        guest: String,

        /// Host's secret
        #[arg(long, default_value = "1234")]
        host_secret: String,

        /// Guest's secret
        #[arg(long, default_value = "5678")]
        guest_secret: String,

        /// Optional TOML config file
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,
    },
}
