//! Allocation of donor supply to requests.
//!
//! Fulfillment is greedy: donors of the requested group are visited from the
//! largest supply to the smallest, each giving either everything they have or
//! just what is still needed. This touches as few donor records as possible.
//! No fairness between donors is attempted.

use rusqlite::Connection;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::blood_group::BloodGroup;
use crate::error::{Error, Result};
use crate::request::{BloodRequest, NewRequest};
use crate::storage::{donors, requests};

/// Units one donor can currently give.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DonorSupply {
    /// Donor id.
    pub donor_id: i64,
    /// Units the donor has.
    pub units: u32,
}

/// Units taken from a single donor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Draw {
    /// Donor id.
    pub donor_id: i64,
    /// Units taken.
    pub units: u32,
    /// Units the donor has left afterwards.
    pub remaining: u32,
}

/// A plan for covering a request from donor supply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Allocation {
    /// Units asked for.
    pub requested: u32,
    /// Draws in the order they are taken.
    pub draws: Vec<Draw>,
    /// Units left uncovered once every donor was drawn.
    pub shortfall: u32,
}

impl Allocation {
    /// Units covered by the draws.
    #[must_use]
    pub fn allocated(&self) -> u32 {
        self.draws.iter().map(|d| d.units).sum()
    }

    /// Whether the draws cover the whole request.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.shortfall == 0
    }

    /// Number of donor records the plan touches.
    #[must_use]
    pub fn donors_touched(&self) -> usize {
        self.draws.len()
    }
}

/// Plan the greedy largest-first walk over `supply`.
///
/// Donors are visited by units descending; donors with equal units keep their
/// order in `supply`. Donors with no units are skipped. Requesting zero units
/// yields an empty, complete plan.
#[must_use]
pub fn allocate(supply: &[DonorSupply], requested: u32) -> Allocation {
    let mut ordered: Vec<DonorSupply> = supply.iter().copied().filter(|s| s.units > 0).collect();
    // stable: ties keep input order
    ordered.sort_by(|a, b| b.units.cmp(&a.units));

    let mut remaining = requested;
    let mut draws = Vec::new();
    for donor in ordered {
        if remaining == 0 {
            break;
        }
        let take = donor.units.min(remaining);
        draws.push(Draw {
            donor_id: donor.donor_id,
            units: take,
            remaining: donor.units - take,
        });
        remaining -= take;
    }

    Allocation {
        requested,
        draws,
        shortfall: remaining,
    }
}

/// Whether `available` units cover a request for `requested`.
#[must_use]
pub fn covers(available: u64, requested: u32) -> bool {
    available >= u64::from(requested)
}

/// Accept a request if supply covers it right now.
///
/// No units are reserved; supply is checked again at fulfillment.
///
/// # Errors
///
/// Returns [`Error::InsufficientSupply`] without writing anything if supply
/// is short.
pub(crate) fn submit(conn: &Connection, request: &NewRequest) -> Result<BloodRequest> {
    let group = request.blood_group;
    let available = donors::available_units(conn, group)?;
    if !covers(available, request.units_requested) {
        warn!(
            "Rejected request for {} units of {}: {} available",
            request.units_requested, group, available
        );
        return Err(Error::InsufficientSupply {
            group,
            requested: request.units_requested,
            available,
        });
    }

    let stored = requests::insert(conn, request)?;
    info!(
        "Accepted request {} for {} units of {}",
        stored.id, stored.units_requested, group
    );
    Ok(stored)
}

/// Take `requested` units of `group` from donors, largest supply first.
///
/// Supply is re-checked before anything is written; if it no longer covers
/// the request this fails with [`Error::StaleSupply`] and no donor changes.
/// Run inside a transaction so the draws land together or not at all.
///
/// # Errors
///
/// Returns [`Error::StaleSupply`] on a shortfall, or a database error.
pub(crate) fn fulfill(conn: &Connection, group: BloodGroup, requested: u32) -> Result<Allocation> {
    let supply = donors::supply(conn, group)?;
    let allocation = allocate(&supply, requested);

    if !allocation.is_complete() {
        let available = supply.iter().map(|s| u64::from(s.units)).sum();
        warn!(
            "Supply of {} dropped to {} units, cannot cover {}",
            group, available, requested
        );
        return Err(Error::StaleSupply {
            group,
            requested,
            available,
        });
    }

    for draw in &allocation.draws {
        donors::decrement(conn, draw.donor_id, draw.units)?;
        debug!("Took {} units from donor {}", draw.units, draw.donor_id);
    }

    Ok(allocation)
}
