//! CLI module - Command-line interface for profilectl
//!
//! This module provides a structured CLI using clap for argument parsing.

pub mod commands;

use clap::{Parser, Subcommand};

use crate::models::Plan;

/// profilectl - Profile table maintenance and diagnostics
/// Bootstrap, inspect, and patch rows of the hosted profiles backend
#[derive(Parser)]
#[command(name = "profilectl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ensure a profile row exists for an identity (creates it on first access)
    #[command(alias = "b")]
    Bootstrap {
        /// Identity subject id
        id: String,

        /// Email to copy onto a newly created profile
        #[arg(long)]
        email: Option<String>,

        /// Display-name hint for a newly created profile
        #[arg(long)]
        name: Option<String>,

        /// Single attempt, no retry on store failures
        #[arg(long)]
        no_retry: bool,
    },

    /// Show a profile row
    #[command(alias = "s", alias = "info")]
    Show {
        /// Profile id
        id: String,
    },

    /// Move a profile to a different plan
    SetPlan {
        /// Profile id
        id: String,

        /// Target plan: free, starter, pro
        plan: Plan,

        /// Days until the new plan expires
        #[arg(long, default_value = "30")]
        days: i64,
    },

    /// Grant extra credits to a profile
    Grant {
        /// Profile id
        id: String,

        /// Credits to add to the find meter
        #[arg(long, default_value = "0")]
        find: u32,

        /// Credits to add to the verify meter
        #[arg(long, default_value = "0")]
        verify: u32,
    },

    /// Correct a profile's display name
    Rename {
        /// Profile id
        id: String,

        /// New display name
        full_name: String,
    },

    /// Create a default config file in the current directory
    #[command(alias = "--init")]
    Init,
}
