//! `bloodbank` - CLI for the blood bank
//!
//! This binary provides the command-line interface for registering donors,
//! submitting and fulfilling blood requests and reporting inventory.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use bloodbank::cli::{
    output, Cli, Command, ConfigCommand, DonorCommand, InventoryCommand, OutputFormat,
    RequestCommand,
};
use bloodbank::{init_logging, BloodBank, Config, NewDonor, NewRequest};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let mut config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;
    if let Some(database) = cli.database {
        config.storage.database_path = Some(database);
    }

    // Configuration commands never touch the database
    if let Command::Config(config_cmd) = cli.command {
        return handle_config(&config, cli.config, config_cmd);
    }

    let bank = BloodBank::open(&config).with_context(|| {
        format!(
            "failed to open database at {}",
            config.database_path().display()
        )
    })?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Donor(donor_cmd) => handle_donor(&bank, donor_cmd, &mut out),
        Command::Request(request_cmd) => handle_request(&bank, request_cmd, &mut out),
        Command::Inventory(inventory_cmd) => handle_inventory(&bank, &inventory_cmd, &mut out),
        Command::Config(_) => Ok(()),
    }
}

fn handle_donor(bank: &BloodBank, cmd: DonorCommand, out: &mut impl Write) -> Result<()> {
    match cmd {
        DonorCommand::Register(args) => {
            let donor = bank.register_donor(&NewDonor::from(args))?;
            writeln!(
                out,
                "Donor registered successfully with id {} ({}, {} units).",
                donor.id, donor.blood_group, donor.blood_units
            )?;
        }
        DonorCommand::List {
            blood_group,
            format,
        } => {
            let donors = match blood_group {
                Some(group) => bank.filter_donors_by_group(group)?,
                None => bank.list_all_donors()?,
            };
            output::donors(out, &donors, format)?;
        }
        DonorCommand::Search {
            blood_group,
            format,
        } => {
            let donors = bank.filter_donors_by_group(blood_group)?;
            if donors.is_empty() && format != OutputFormat::Json {
                writeln!(out, "No donors found with blood group {blood_group}.")?;
            } else {
                output::donors(out, &donors, format)?;
            }
        }
    }
    Ok(())
}

fn handle_request(bank: &BloodBank, cmd: RequestCommand, out: &mut impl Write) -> Result<()> {
    match cmd {
        RequestCommand::Submit(args) => {
            let request = bank.submit_blood_request(&NewRequest::from(args))?;
            writeln!(
                out,
                "Blood request submitted successfully with id {} ({} units of {}).",
                request.id, request.units_requested, request.blood_group
            )?;
        }
        RequestCommand::List { format } => {
            let requests = bank.list_pending_requests()?;
            output::requests(out, &requests, format)?;
        }
        RequestCommand::Fulfill { id, format } => {
            let fulfillment = bank
                .fulfill_request(id)
                .with_context(|| format!("could not fulfill request {id}"))?;
            output::fulfillment(out, &fulfillment, format)?;
        }
    }
    Ok(())
}

fn handle_inventory(bank: &BloodBank, cmd: &InventoryCommand, out: &mut impl Write) -> Result<()> {
    let report = bank.inventory()?;
    let groups: Vec<_> = report
        .groups
        .iter()
        .filter(|g| cmd.blood_group.map_or(true, |wanted| g.group == wanted))
        .copied()
        .collect();
    output::inventory(out, &report, &groups, cmd.format)?;
    Ok(())
}

fn handle_config(config: &Config, config_path: Option<PathBuf>, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Busy timeout (ms):  {}", config.storage.busy_timeout_ms);
                println!();
                println!("[Limits]");
                println!(
                    "  Donor age:          {}-{}",
                    config.limits.min_donor_age, config.limits.max_donor_age
                );
                println!("  Max donor units:    {}", config.limits.max_donor_units);
                match config.limits.max_request_units {
                    Some(max) => println!("  Max request units:  {max}"),
                    None => println!("  Max request units:  unlimited"),
                }
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::check_file(&path)
                .with_context(|| format!("invalid configuration in {}", path.display()))?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
