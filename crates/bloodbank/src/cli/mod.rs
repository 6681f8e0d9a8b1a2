//! Command-line interface for bloodbank.
//!
//! This module provides the CLI structure and output rendering for the
//! `bloodbank` binary. Each subcommand corresponds to one user action.

mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, DonorCommand, InventoryCommand, OutputFormat, RegisterDonorArgs,
    RequestCommand, SubmitRequestArgs,
};

/// bloodbank - Track blood donors and requests
///
/// Register donors, search supply by blood group, accept requests when supply
/// covers them and fulfill requests by drawing units from donors.
#[derive(Debug, Parser)]
#[command(name = "bloodbank")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to the database file (overrides configuration)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub database: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Register, list and search donors
    #[command(subcommand)]
    Donor(DonorCommand),

    /// Submit, list and fulfill blood requests
    #[command(subcommand)]
    Request(RequestCommand),

    /// Show units available per blood group
    Inventory(InventoryCommand),

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.quiet, self.verbose)
    }
}
