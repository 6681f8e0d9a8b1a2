//! Donor records.
//!
//! A donor is a person together with the units of blood they currently have
//! available. Units only ever go down after registration, and only through
//! fulfillment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::blood_group::BloodGroup;
use crate::config::LimitsConfig;
use crate::error::{Error, Result};

/// A registered donor, as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donor {
    /// Unique identifier assigned by the store.
    pub id: i64,
    /// Donor's name.
    pub name: String,
    /// Age at registration.
    pub age: u8,
    /// Blood group.
    pub blood_group: BloodGroup,
    /// How to reach the donor.
    pub contact: String,
    /// Units currently available from this donor.
    pub blood_units: u32,
    /// When the donor was registered.
    pub registered_at: DateTime<Utc>,
}

/// Input for registering a donor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDonor {
    /// Donor's name.
    pub name: String,
    /// Donor's age.
    pub age: u8,
    /// Blood group.
    pub blood_group: BloodGroup,
    /// How to reach the donor.
    pub contact: String,
    /// Units available at registration.
    pub blood_units: u32,
}

impl NewDonor {
    /// Create registration input, trimming surrounding whitespace from text fields.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        age: u8,
        blood_group: BloodGroup,
        contact: impl Into<String>,
        blood_units: u32,
    ) -> Self {
        Self {
            name: name.into().trim().to_string(),
            age,
            blood_group,
            contact: contact.into().trim().to_string(),
            blood_units,
        }
    }

    /// Check the input against the configured limits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first offending field.
    pub fn validate(&self, limits: &LimitsConfig) -> Result<()> {
        require_present("name", &self.name)?;
        require_present("contact", &self.contact)?;

        if !(limits.min_donor_age..=limits.max_donor_age).contains(&self.age) {
            return Err(Error::validation(
                "age",
                format!(
                    "{} is outside the accepted range {}..={}",
                    self.age, limits.min_donor_age, limits.max_donor_age
                ),
            ));
        }

        if self.blood_units > limits.max_donor_units {
            return Err(Error::validation(
                "blood_units",
                format!(
                    "{} exceeds the maximum of {}",
                    self.blood_units, limits.max_donor_units
                ),
            ));
        }

        Ok(())
    }
}

/// Fail if a required text field is blank.
pub(crate) fn require_present(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(field, "must not be empty"));
    }
    Ok(())
}
