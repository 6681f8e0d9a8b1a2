//! Rendering of command results.
//!
//! Every renderer writes to any [`Write`] so tests can capture output.

use std::io::Write;

use serde::Serialize;

use crate::bank::Fulfillment;
use crate::donor::Donor;
use crate::error::Result;
use crate::request::BloodRequest;
use crate::storage::{GroupSupply, InventoryReport};

use super::OutputFormat;

/// Render donors.
///
/// # Errors
///
/// Returns an error if writing or JSON serialization fails.
pub fn donors(out: &mut impl Write, donors: &[Donor], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => json(out, donors)?,
        OutputFormat::Plain => {
            for d in donors {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    d.id, d.name, d.age, d.blood_group, d.contact, d.blood_units
                )?;
            }
        }
        OutputFormat::Table => {
            if donors.is_empty() {
                writeln!(out, "No donors found.")?;
                return Ok(());
            }
            let name_width = column_width("Name", donors.iter().map(|d| d.name.as_str()));
            let contact_width = column_width("Contact", donors.iter().map(|d| d.contact.as_str()));
            writeln!(
                out,
                "{:>5}  {:<name_width$}  {:>3}  {:<5}  {:<contact_width$}  {:>5}",
                "ID", "Name", "Age", "Group", "Contact", "Units"
            )?;
            for d in donors {
                writeln!(
                    out,
                    "{:>5}  {:<name_width$}  {:>3}  {:<5}  {:<contact_width$}  {:>5}",
                    d.id, d.name, d.age, d.blood_group, d.contact, d.blood_units
                )?;
            }
        }
    }
    Ok(())
}

/// Render pending requests.
///
/// # Errors
///
/// Returns an error if writing or JSON serialization fails.
pub fn requests(out: &mut impl Write, requests: &[BloodRequest], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => json(out, requests)?,
        OutputFormat::Plain => {
            for r in requests {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}\t{}",
                    r.id, r.name, r.blood_group, r.contact, r.units_requested
                )?;
            }
        }
        OutputFormat::Table => {
            if requests.is_empty() {
                writeln!(out, "No pending requests.")?;
                return Ok(());
            }
            let name_width = column_width("Name", requests.iter().map(|r| r.name.as_str()));
            let contact_width =
                column_width("Contact", requests.iter().map(|r| r.contact.as_str()));
            writeln!(
                out,
                "{:>5}  {:<name_width$}  {:<5}  {:<contact_width$}  {:>5}",
                "ID", "Name", "Group", "Contact", "Units"
            )?;
            for r in requests {
                writeln!(
                    out,
                    "{:>5}  {:<name_width$}  {:<5}  {:<contact_width$}  {:>5}",
                    r.id, r.name, r.blood_group, r.contact, r.units_requested
                )?;
            }
        }
    }
    Ok(())
}

/// Render the outcome of a fulfillment.
///
/// # Errors
///
/// Returns an error if writing or JSON serialization fails.
pub fn fulfillment(out: &mut impl Write, done: &Fulfillment, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return json(out, done);
    }

    writeln!(
        out,
        "Fulfilled request {} for {} units of {}.",
        done.request.id, done.request.units_requested, done.request.blood_group
    )?;
    for draw in &done.allocation.draws {
        writeln!(
            out,
            "  donor {:>5}: took {} units, {} left",
            draw.donor_id, draw.units, draw.remaining
        )?;
    }
    Ok(())
}

/// Render the inventory, optionally limited to some groups.
///
/// # Errors
///
/// Returns an error if writing or JSON serialization fails.
pub fn inventory(
    out: &mut impl Write,
    report: &InventoryReport,
    groups: &[GroupSupply],
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json if groups.len() == report.groups.len() => json(out, report)?,
        OutputFormat::Json => json(out, groups)?,
        OutputFormat::Plain => {
            for g in groups {
                writeln!(out, "{}\t{}\t{}", g.group, g.donors, g.units)?;
            }
        }
        OutputFormat::Table => {
            writeln!(out, "{:<5}  {:>6}  {:>5}", "Group", "Donors", "Units")?;
            for g in groups {
                writeln!(out, "{:<5}  {:>6}  {:>5}", g.group, g.donors, g.units)?;
            }
            writeln!(out)?;
            writeln!(out, "Total units:      {}", report.total_units)?;
            writeln!(
                out,
                "Pending requests: {} ({} units)",
                report.pending_requests, report.pending_units
            )?;
        }
    }
    Ok(())
}

/// Pretty-print any value as JSON followed by a newline.
///
/// # Errors
///
/// Returns an error if writing or serialization fails.
pub fn json<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values
        .map(|v| v.chars().count())
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(header.len())
}
