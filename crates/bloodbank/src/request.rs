//! Blood requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::blood_group::BloodGroup;
use crate::config::LimitsConfig;
use crate::donor::require_present;
use crate::error::{Error, Result};

/// A pending request for blood, as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodRequest {
    /// Unique identifier assigned by the store.
    pub id: i64,
    /// Requester's name.
    pub name: String,
    /// Blood group needed.
    pub blood_group: BloodGroup,
    /// How to reach the requester.
    pub contact: String,
    /// Units needed. Always greater than zero.
    pub units_requested: u32,
    /// When the request was accepted.
    pub requested_at: DateTime<Utc>,
}

/// Input for submitting a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRequest {
    /// Requester's name.
    pub name: String,
    /// Blood group needed.
    pub blood_group: BloodGroup,
    /// How to reach the requester.
    pub contact: String,
    /// Units needed.
    pub units_requested: u32,
}

impl NewRequest {
    /// Create request input, trimming surrounding whitespace from text fields.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        blood_group: BloodGroup,
        contact: impl Into<String>,
        units_requested: u32,
    ) -> Self {
        Self {
            name: name.into().trim().to_string(),
            blood_group,
            contact: contact.into().trim().to_string(),
            units_requested,
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

        if self.units_requested == 0 {
            return Err(Error::validation(
                "units_requested",
                "at least one unit must be requested",
            ));
        }

        if let Some(max) = limits.max_request_units {
            if self.units_requested > max {
                return Err(Error::validation(
                    "units_requested",
                    format!(
                        "{} is outside the accepted range 1..={max}",
                        self.units_requested
                    ),
                ));
            }
        }

        Ok(())
    }
}
