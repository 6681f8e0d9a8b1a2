//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::blood_group::BloodGroup;
use crate::donor::NewDonor;
use crate::request::NewRequest;

/// Donor commands.
#[derive(Debug, Subcommand)]
pub enum DonorCommand {
    /// Register a new donor
    Register(RegisterDonorArgs),

    /// List registered donors
    List {
        /// Only show donors of this blood group
        #[arg(short = 'g', long = "group", value_name = "GROUP")]
        blood_group: Option<BloodGroup>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Search for donors of a blood group
    Search {
        /// Blood group to search for (A+, A-, B+, B-, O+, O-, AB+, AB-)
        #[arg(value_name = "GROUP")]
        blood_group: BloodGroup,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

/// Donor registration arguments.
#[derive(Debug, Args)]
pub struct RegisterDonorArgs {
    /// Donor's name
    #[arg(short, long)]
    pub name: String,

    /// Donor's age
    #[arg(short, long)]
    pub age: u8,

    /// Blood group (A+, A-, B+, B-, O+, O-, AB+, AB-)
    #[arg(short = 'g', long = "group", value_name = "GROUP")]
    pub blood_group: BloodGroup,

    /// Contact number
    #[arg(short = 'p', long)]
    pub contact: String,

    /// Units of blood available
    #[arg(short, long, default_value = "0")]
    pub units: u32,
}

impl From<RegisterDonorArgs> for NewDonor {
    fn from(args: RegisterDonorArgs) -> Self {
        Self::new(
            args.name,
            args.age,
            args.blood_group,
            args.contact,
            args.units,
        )
    }
}

/// Blood request commands.
#[derive(Debug, Subcommand)]
pub enum RequestCommand {
    /// Request blood
    Submit(SubmitRequestArgs),

    /// List pending requests
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Fulfill a pending request, drawing units from donors
    Fulfill {
        /// Id of the request to fulfill
        id: i64,

        /// Output format
        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },
}

/// Blood request arguments.
#[derive(Debug, Args)]
pub struct SubmitRequestArgs {
    /// Requester's name
    #[arg(short, long)]
    pub name: String,

    /// Required blood group (A+, A-, B+, B-, O+, O-, AB+, AB-)
    #[arg(short = 'g', long = "group", value_name = "GROUP")]
    pub blood_group: BloodGroup,

    /// Requester's contact
    #[arg(short = 'p', long)]
    pub contact: String,

    /// Units needed
    #[arg(short, long, default_value = "1")]
    pub units: u32,
}

impl From<SubmitRequestArgs> for NewRequest {
    fn from(args: SubmitRequestArgs) -> Self {
        Self::new(args.name, args.blood_group, args.contact, args.units)
    }
}

/// Inventory command arguments.
#[derive(Debug, Args)]
pub struct InventoryCommand {
    /// Only show this blood group
    #[arg(short = 'g', long = "group", value_name = "GROUP")]
    pub blood_group: Option<BloodGroup>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}
