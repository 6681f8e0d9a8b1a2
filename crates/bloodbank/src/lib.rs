//! `bloodbank` - Blood donor inventory and request tracking
//!
//! This library keeps a registry of donors with the units of blood each can
//! give, a queue of pending requests, and the greedy allocation that turns
//! donor supply into fulfilled requests. Everything lives in one SQLite file.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod allocation;
pub mod bank;
pub mod blood_group;
pub mod cli;
pub mod config;
pub mod donor;
pub mod error;
pub mod logging;
pub mod request;
pub mod storage;

pub use allocation::{allocate, Allocation, DonorSupply, Draw};
pub use bank::{BloodBank, Fulfillment};
pub use blood_group::{BloodGroup, ParseBloodGroupError};
pub use config::Config;
pub use donor::{Donor, NewDonor};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use request::{BloodRequest, NewRequest};
pub use storage::{GroupSupply, InventoryReport, Storage};
