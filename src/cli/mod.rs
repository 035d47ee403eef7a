//! CLI command definitions for fogg-task
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

use clap::{Parser, Subcommand};

/// Personal task service with AI-assisted planning
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Path to database file (overrides config)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Address to bind (overrides config)
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP API server (default if no subcommand given)
    Serve,

    /// Issue or revoke session tokens
    #[command(subcommand)]
    Session(SessionCommand),

    /// Print a user's tasks as a markdown tree
    Tree {
        /// User whose tasks to print
        #[arg(short, long)]
        user: String,

        /// Hide archived tasks
        #[arg(long)]
        hide_archived: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    /// Issue a new session token for a user
    Issue {
        /// User id the token authenticates as
        #[arg(short, long)]
        user: String,

        /// Token lifetime in hours (defaults to server.session_ttl_hours)
        #[arg(long)]
        ttl_hours: Option<u64>,
    },

    /// Revoke a session token
    Revoke {
        /// Token to revoke
        token: String,
    },

    /// Delete all expired sessions
    Purge,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_serve() {
        let cli = Cli::parse_from(["fogg-task"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.log, "2");
    }

    #[test]
    fn test_session_issue_args() {
        let cli = Cli::parse_from([
            "fogg-task", "--port", "0", "session", "issue", "--user", "alice", "--ttl-hours", "2",
        ]);
        assert_eq!(cli.port, Some(0));
        match cli.command {
            Some(Command::Session(SessionCommand::Issue { user, ttl_hours })) => {
                assert_eq!(user, "alice");
                assert_eq!(ttl_hours, Some(2));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
