//! The blood bank facade.
//!
//! [`BloodBank`] is the entry point used by the command-line handlers. It
//! validates input, runs mutating actions inside immediate transactions and
//! answers read-only queries straight from storage.

use serde::Serialize;
use tracing::info;

use crate::allocation::{self, Allocation};
use crate::blood_group::BloodGroup;
use crate::config::{Config, LimitsConfig};
use crate::donor::{Donor, NewDonor};
use crate::error::{Error, Result};
use crate::request::{BloodRequest, NewRequest};
use crate::storage::{requests, InventoryReport, Storage};

/// Outcome of fulfilling a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fulfillment {
    /// The request that was fulfilled and removed.
    pub request: BloodRequest,
    /// The draws made from donors.
    pub allocation: Allocation,
}

/// Donor inventory and request queue behind one store handle.
#[derive(Debug)]
pub struct BloodBank {
    storage: Storage,
    limits: LimitsConfig,
}

impl BloodBank {
    /// Wrap an open store with the given input limits.
    #[must_use]
    pub fn new(storage: Storage, limits: LimitsConfig) -> Self {
        Self { storage, limits }
    }

    /// Open the configured database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open(config: &Config) -> Result<Self> {
        Ok(Self::new(
            Storage::from_config(config)?,
            config.limits.clone(),
        ))
    }

    /// Register a donor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if name or contact is empty or a number
    /// is out of range, or a database error.
    pub fn register_donor(&self, donor: &NewDonor) -> Result<Donor> {
        donor.validate(&self.limits)?;
        let stored = self.storage.add_donor(donor)?;
        info!(
            "Registered donor {} ({}, {} units)",
            stored.id, stored.blood_group, stored.blood_units
        );
        Ok(stored)
    }

    /// All donors in registration order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_all_donors(&self) -> Result<Vec<Donor>> {
        self.storage.list_donors()
    }

    /// Donors of one blood group in registration order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn filter_donors_by_group(&self, group: BloodGroup) -> Result<Vec<Donor>> {
        self.storage.list_donors_by_group(group)
    }

    /// Units of the group currently on hand.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn available_units(&self, group: BloodGroup) -> Result<u64> {
        self.storage.available_units(group)
    }

    /// Whether current supply covers `units` of `group`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn can_satisfy(&self, group: BloodGroup, units: u32) -> Result<bool> {
        Ok(allocation::covers(self.available_units(group)?, units))
    }

    /// Submit a request, accepted only if supply covers it right now.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for bad input and
    /// [`Error::InsufficientSupply`] if supply is short; nothing is stored in
    /// either case.
    pub fn submit_blood_request(&self, request: &NewRequest) -> Result<BloodRequest> {
        request.validate(&self.limits)?;
        self.storage
            .transaction(|conn| allocation::submit(conn, request))
    }

    /// Pending requests in submission order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_pending_requests(&self) -> Result<Vec<BloodRequest>> {
        self.storage.list_requests()
    }

    /// Fulfill a pending request by id.
    ///
    /// Donor units are drawn largest supply first and the request is removed,
    /// all in one transaction. Only this request is removed, even if others
    /// ask for the same group and amount.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RequestNotFound`] if no request has this id and
    /// [`Error::StaleSupply`] if supply dropped below the request since it was
    /// accepted. Nothing changes on error.
    pub fn fulfill_request(&self, request_id: i64) -> Result<Fulfillment> {
        let fulfillment = self.storage.transaction(|conn| {
            let request = requests::get(conn, request_id)?
                .ok_or(Error::RequestNotFound { id: request_id })?;
            let allocation = allocation::fulfill(conn, request.blood_group, request.units_requested)?;
            if !requests::remove(conn, request.id)? {
                return Err(Error::RequestNotFound { id: request_id });
            }
            Ok(Fulfillment {
                request,
                allocation,
            })
        })?;

        info!(
            "Fulfilled request {}: {} units of {} from {} donors",
            fulfillment.request.id,
            fulfillment.allocation.allocated(),
            fulfillment.request.blood_group,
            fulfillment.allocation.donors_touched()
        );
        Ok(fulfillment)
    }

    /// Supply per group and the pending queue.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn inventory(&self) -> Result<InventoryReport> {
        self.storage.inventory_report()
    }

    /// Look up one donor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DonorNotFound`] if the id is unknown.
    pub fn donor(&self, id: i64) -> Result<Donor> {
        self.storage
            .get_donor(id)?
            .ok_or(Error::DonorNotFound { id })
    }
}
