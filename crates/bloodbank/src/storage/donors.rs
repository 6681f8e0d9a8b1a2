//! Donor inventory queries.
//!
//! Functions here take a plain [`Connection`] so they run the same way on the
//! store's connection and inside a transaction.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, warn};

use crate::allocation::DonorSupply;
use crate::blood_group::BloodGroup;
use crate::donor::{Donor, NewDonor};
use crate::error::{Error, Result};

const DONOR_COLUMNS: &str = "id, name, age, blood_group, contact, blood_units, registered_at";

/// Insert a donor and return the stored record.
pub(crate) fn insert(conn: &Connection, donor: &NewDonor) -> Result<Donor> {
    let registered_at = Utc::now();
    conn.execute(
        r"
        INSERT INTO donors (name, age, blood_group, contact, blood_units, registered_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ",
        params![
            donor.name,
            donor.age,
            donor.blood_group,
            donor.contact,
            donor.blood_units,
            registered_at.to_rfc3339(),
        ],
    )?;

    let id = conn.last_insert_rowid();
    debug!("Inserted donor with id {}", id);
    Ok(Donor {
        id,
        name: donor.name.clone(),
        age: donor.age,
        blood_group: donor.blood_group,
        contact: donor.contact.clone(),
        blood_units: donor.blood_units,
        registered_at,
    })
}

/// Get a donor by id.
pub(crate) fn get(conn: &Connection, id: i64) -> Result<Option<Donor>> {
    let donor = conn
        .query_row(
            &format!("SELECT {DONOR_COLUMNS} FROM donors WHERE id = ?1"),
            [id],
            row_to_donor,
        )
        .optional()?;
    Ok(donor)
}

/// All donors in insertion order.
pub(crate) fn list(conn: &Connection) -> Result<Vec<Donor>> {
    let mut stmt = conn.prepare(&format!("SELECT {DONOR_COLUMNS} FROM donors ORDER BY id"))?;
    let donors = stmt
        .query_map([], row_to_donor)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(donors)
}

/// Donors of one group in insertion order.
pub(crate) fn list_by_group(conn: &Connection, group: BloodGroup) -> Result<Vec<Donor>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DONOR_COLUMNS} FROM donors WHERE blood_group = ?1 ORDER BY id"
    ))?;
    let donors = stmt
        .query_map([group], row_to_donor)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(donors)
}

/// Total units on hand for a group, 0 if there are no donors.
pub(crate) fn available_units(conn: &Connection, group: BloodGroup) -> Result<u64> {
    let total: i64 = conn.query_row(
        "SELECT COALESCE(SUM(blood_units), 0) FROM donors WHERE blood_group = ?1",
        [group],
        |row| row.get(0),
    )?;
    count(total, "supply")
}

/// Donors of a group that still have units, largest supply first.
///
/// Donors with equal units keep insertion order.
pub(crate) fn supply(conn: &Connection, group: BloodGroup) -> Result<Vec<DonorSupply>> {
    let mut stmt = conn.prepare(
        r"
        SELECT id, blood_units FROM donors
        WHERE blood_group = ?1 AND blood_units > 0
        ORDER BY blood_units DESC, id ASC
        ",
    )?;
    let supply = stmt
        .query_map([group], |row| {
            Ok(DonorSupply {
                donor_id: row.get(0)?,
                units: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(supply)
}

/// Take `amount` units from one donor and return what they have left.
///
/// The check and the update are one statement, so a donor can never go
/// below zero.
pub(crate) fn decrement(conn: &Connection, id: i64, amount: u32) -> Result<u32> {
    let remaining: Option<u32> = conn
        .query_row(
            r"
            UPDATE donors SET blood_units = blood_units - ?1
            WHERE id = ?2 AND blood_units >= ?1
            RETURNING blood_units
            ",
            params![amount, id],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(remaining) = remaining {
        debug!("Donor {} decremented by {}, {} left", id, amount, remaining);
        return Ok(remaining);
    }

    let available: Option<u32> = conn
        .query_row(
            "SELECT blood_units FROM donors WHERE id = ?1",
            [id],
            |row| row.get(0),
        )
        .optional()?;
    match available {
        Some(available) => Err(Error::DonorOverdraw {
            id,
            requested: amount,
            available,
        }),
        None => Err(Error::DonorNotFound { id }),
    }
}

/// Donor count and unit total for each group that has donors.
pub(crate) fn group_totals(conn: &Connection) -> Result<Vec<(BloodGroup, u64, u64)>> {
    let mut stmt = conn.prepare(
        r"
        SELECT blood_group, COUNT(*), COALESCE(SUM(blood_units), 0)
        FROM donors GROUP BY blood_group
        ",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, BloodGroup>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(group, donors, units)| {
            Ok((group, count(donors, "donor count")?, count(units, "supply")?))
        })
        .collect()
}

/// Convert an aggregate read from `SQLite` into an unsigned count.
pub(crate) fn count(value: i64, what: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| Error::internal(format!("negative {what}: {value}")))
}

/// Parse a stored timestamp, falling back to now for rows with bad values.
pub(crate) fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw).map_or_else(
        |_| {
            warn!("Unparseable stored timestamp: {}, using current time", raw);
            Utc::now()
        },
        |dt| dt.with_timezone(&Utc),
    )
}

fn row_to_donor(row: &Row<'_>) -> rusqlite::Result<Donor> {
    let registered_at: String = row.get(6)?;
    Ok(Donor {
        id: row.get(0)?,
        name: row.get(1)?,
        age: row.get(2)?,
        blood_group: row.get(3)?,
        contact: row.get(4)?,
        blood_units: row.get(5)?,
        registered_at: parse_timestamp(&registered_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::migrations::initialize_schema;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        conn
    }

    fn add(conn: &Connection, name: &str, group: BloodGroup, units: u32) -> Donor {
        insert(conn, &NewDonor::new(name, 30, group, "555-0100", units)).unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let conn = conn();
        let donor = add(&conn, "Asha", BloodGroup::OPos, 5);

        let stored = get(&conn, donor.id).unwrap().unwrap();
        assert_eq!(stored.name, "Asha");
        assert_eq!(stored.blood_group, BloodGroup::OPos);
        assert_eq!(stored.blood_units, 5);
    }

    #[test]
    fn test_get_nonexistent() {
        assert!(get(&conn(), 42).unwrap().is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        let conn = conn();
        let a = add(&conn, "A", BloodGroup::APos, 1);
        let b = add(&conn, "B", BloodGroup::APos, 1);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_list_in_insertion_order() {
        let conn = conn();
        add(&conn, "First", BloodGroup::BNeg, 1);
        add(&conn, "Second", BloodGroup::APos, 9);
        add(&conn, "Third", BloodGroup::BNeg, 4);

        let names: Vec<_> = list(&conn).unwrap().into_iter().map(|d| d.name).collect();
        assert_eq!(names, ["First", "Second", "Third"]);
    }

    #[test]
    fn test_list_by_group() {
        let conn = conn();
        add(&conn, "First", BloodGroup::BNeg, 1);
        add(&conn, "Second", BloodGroup::APos, 9);
        add(&conn, "Third", BloodGroup::BNeg, 4);

        let donors = list_by_group(&conn, BloodGroup::BNeg).unwrap();
        assert_eq!(donors.len(), 2);
        assert!(donors.iter().all(|d| d.blood_group == BloodGroup::BNeg));
        assert!(list_by_group(&conn, BloodGroup::AbPos).unwrap().is_empty());
    }

    #[test]
    fn test_available_units_sums_group_only() {
        let conn = conn();
        add(&conn, "A", BloodGroup::OPos, 5);
        add(&conn, "B", BloodGroup::OPos, 3);
        add(&conn, "C", BloodGroup::ONeg, 7);

        assert_eq!(available_units(&conn, BloodGroup::OPos).unwrap(), 8);
        assert_eq!(available_units(&conn, BloodGroup::ONeg).unwrap(), 7);
        assert_eq!(available_units(&conn, BloodGroup::AbNeg).unwrap(), 0);
    }

    #[test]
    fn test_supply_orders_largest_first_and_skips_empty() {
        let conn = conn();
        let a = add(&conn, "A", BloodGroup::APos, 2);
        let b = add(&conn, "B", BloodGroup::APos, 6);
        add(&conn, "Empty", BloodGroup::APos, 0);
        let c = add(&conn, "C", BloodGroup::APos, 2);

        let ids: Vec<_> = supply(&conn, BloodGroup::APos)
            .unwrap()
            .into_iter()
            .map(|s| s.donor_id)
            .collect();
        assert_eq!(ids, [b.id, a.id, c.id]);
    }

    #[test]
    fn test_decrement() {
        let conn = conn();
        let donor = add(&conn, "A", BloodGroup::OPos, 5);

        assert_eq!(decrement(&conn, donor.id, 2).unwrap(), 3);
        assert_eq!(decrement(&conn, donor.id, 3).unwrap(), 0);
        assert_eq!(get(&conn, donor.id).unwrap().unwrap().blood_units, 0);
    }

    #[test]
    fn test_decrement_overdraw_leaves_donor_untouched() {
        let conn = conn();
        let donor = add(&conn, "A", BloodGroup::OPos, 2);

        let err = decrement(&conn, donor.id, 3).unwrap_err();
        assert!(matches!(
            err,
            Error::DonorOverdraw {
                requested: 3,
                available: 2,
                ..
            }
        ));
        assert_eq!(get(&conn, donor.id).unwrap().unwrap().blood_units, 2);
    }

    #[test]
    fn test_decrement_unknown_donor() {
        let err = decrement(&conn(), 99, 1).unwrap_err();
        assert!(matches!(err, Error::DonorNotFound { id: 99 }));
    }

    #[test]
    fn test_group_totals() {
        let conn = conn();
        add(&conn, "A", BloodGroup::OPos, 5);
        add(&conn, "B", BloodGroup::OPos, 3);
        add(&conn, "C", BloodGroup::BPos, 0);

        let mut totals = group_totals(&conn).unwrap();
        totals.sort();
        assert_eq!(totals, [(BloodGroup::BPos, 1, 0), (BloodGroup::OPos, 2, 8)]);
    }

    #[test]
    fn test_parse_timestamp_fallback() {
        let parsed = parse_timestamp("2024-01-15T10:00:00Z");
        assert_eq!(parsed.to_rfc3339(), "2024-01-15T10:00:00+00:00");

        let before = Utc::now();
        assert!(parse_timestamp("not a time") >= before);
    }
}
