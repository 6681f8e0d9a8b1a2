//! Storage layer for bloodbank.
//!
//! This module provides `SQLite`-based persistent storage for the donor
//! inventory and the pending request queue. A single [`Storage`] owns the
//! connection for the life of the process; the connection closes on drop.

pub(crate) mod donors;
pub mod migrations;
pub(crate) mod requests;
pub mod schema;

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde::Serialize;
use tracing::{debug, info};

use crate::blood_group::BloodGroup;
use crate::config::Config;
use crate::donor::{Donor, NewDonor};
use crate::error::{Error, Result};
use crate::request::{BloodRequest, NewRequest};

/// Storage engine for donors and requests.
///
/// Provides persistent storage using `SQLite` with support for:
/// - Donor registration, listing and per-group supply queries
/// - Request queueing, lookup and removal
/// - Immediate (write-locking) transactions for check-then-act sequences
/// - Inventory reporting
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // WAL lets readers proceed while another session writes
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Open the database named by the configuration and apply its busy timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn from_config(config: &Config) -> Result<Self> {
        let storage = Self::open(config.database_path())?;
        storage.set_busy_timeout(config.busy_timeout())?;
        Ok(storage)
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Set how long a write waits for another session's lock.
    ///
    /// # Errors
    ///
    /// Returns an error if the setting cannot be applied.
    pub fn set_busy_timeout(&self, timeout: Duration) -> Result<()> {
        self.conn.busy_timeout(timeout)?;
        Ok(())
    }

    /// Run `f` inside an immediate transaction.
    ///
    /// The write lock is taken up front, so reads made inside `f` stay valid
    /// until commit. If `f` fails, everything it wrote is rolled back.
    ///
    /// # Errors
    ///
    /// Returns the error from `f`, or a database error if the transaction
    /// cannot begin or commit.
    pub fn transaction<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    // === Inventory ===

    /// Register a donor. Input is stored as given; validation is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn add_donor(&self, donor: &NewDonor) -> Result<Donor> {
        donors::insert(&self.conn, donor)
    }

    /// Get a donor by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_donor(&self, id: i64) -> Result<Option<Donor>> {
        donors::get(&self.conn, id)
    }

    /// All donors in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_donors(&self) -> Result<Vec<Donor>> {
        donors::list(&self.conn)
    }

    /// Donors of one blood group in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_donors_by_group(&self, group: BloodGroup) -> Result<Vec<Donor>> {
        donors::list_by_group(&self.conn, group)
    }

    /// Sum of units over donors of the group, 0 if none.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn available_units(&self, group: BloodGroup) -> Result<u64> {
        donors::available_units(&self.conn, group)
    }

    /// Take units from one donor. Returns the units the donor has left.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DonorOverdraw`] if the donor has fewer than `amount`
    /// units and [`Error::DonorNotFound`] if the id is unknown.
    pub fn decrement_donor(&self, id: i64, amount: u32) -> Result<u32> {
        donors::decrement(&self.conn, id, amount)
    }

    // === Request queue ===

    /// Append a request without checking supply.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn create_request(&self, request: &NewRequest) -> Result<BloodRequest> {
        requests::insert(&self.conn, request)
    }

    /// All pending requests in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_requests(&self) -> Result<Vec<BloodRequest>> {
        requests::list(&self.conn)
    }

    /// Delete every request with this exact group and unit count.
    ///
    /// This matches on values, not identity: two unrelated requests for the
    /// same group and amount are both removed. Fulfillment removes by id
    /// instead, see [`BloodBank::fulfill_request`](crate::bank::BloodBank::fulfill_request).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn remove_requests_matching(&self, group: BloodGroup, units_requested: u32) -> Result<usize> {
        let removed = requests::remove_matching(&self.conn, group, units_requested)?;
        if removed > 0 {
            info!(
                "Removed {} {} requests for {} units",
                removed, group, units_requested
            );
        }
        Ok(removed)
    }

    // === Reporting ===

    /// Summarize supply per group and the pending queue.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn inventory_report(&self) -> Result<InventoryReport> {
        let totals = donors::group_totals(&self.conn)?;
        let groups: Vec<GroupSupply> = BloodGroup::ALL
            .into_iter()
            .map(|group| {
                let (donors, units) = totals
                    .iter()
                    .find(|(g, _, _)| *g == group)
                    .map_or((0, 0), |&(_, donors, units)| (donors, units));
                GroupSupply {
                    group,
                    donors,
                    units,
                }
            })
            .collect();

        let total_units = groups.iter().map(|g| g.units).sum();
        let (pending_requests, pending_units) = requests::pending_totals(&self.conn)?;

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(InventoryReport {
            groups,
            total_units,
            pending_requests,
            pending_units,
            db_size_bytes,
        })
    }
}

/// Supply held for one blood group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GroupSupply {
    /// The blood group.
    pub group: BloodGroup,
    /// Registered donors of this group, including those with no units left.
    pub donors: u64,
    /// Units available across those donors.
    pub units: u64,
}

/// Inventory summary across all groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryReport {
    /// One entry per blood group, in [`BloodGroup::ALL`] order.
    pub groups: Vec<GroupSupply>,
    /// Units available across every group.
    pub total_units: u64,
    /// Requests waiting to be fulfilled.
    pub pending_requests: u64,
    /// Units those requests ask for.
    pub pending_units: u64,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

impl InventoryReport {
    /// Supply entry for one group.
    #[must_use]
    pub fn group(&self, group: BloodGroup) -> Option<&GroupSupply> {
        self.groups.iter().find(|g| g.group == group)
    }
}
