//! CLI module for the query cache
//!
//! Provides subcommands for running the admin server and one-shot
//! maintenance commands that print JSON reports:
//! - `serve`: HTTP admin server
//! - `stats`, `health`: introspection
//! - `flush`, `invalidate`: invalidation

pub mod admin;
pub mod serve;

use clap::{Parser, Subcommand};

/// Query cache - Redis-backed result cache with in-process fallback
#[derive(Parser)]
#[command(name = "query-cache")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP admin server
    Serve,

    /// Print cache statistics
    Stats,

    /// Print cache health
    Health,

    /// Remove every entry owned by the cache
    Flush,

    /// Remove entries whose key contains PATTERN
    Invalidate {
        /// Substring to match, e.g. a namespace
        pattern: String,
    },
}
