//! Pending request queue queries.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::blood_group::BloodGroup;
use crate::error::Result;
use crate::request::{BloodRequest, NewRequest};

use super::donors::{count, parse_timestamp};

const REQUEST_COLUMNS: &str = "id, name, blood_group, contact, units_requested, requested_at";

/// Append a request and return the stored record.
pub(crate) fn insert(conn: &Connection, request: &NewRequest) -> Result<BloodRequest> {
    let requested_at = Utc::now();
    conn.execute(
        r"
        INSERT INTO requests (name, blood_group, contact, units_requested, requested_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ",
        params![
            request.name,
            request.blood_group,
            request.contact,
            request.units_requested,
            requested_at.to_rfc3339(),
        ],
    )?;

    let id = conn.last_insert_rowid();
    debug!("Inserted request with id {}", id);
    Ok(BloodRequest {
        id,
        name: request.name.clone(),
        blood_group: request.blood_group,
        contact: request.contact.clone(),
        units_requested: request.units_requested,
        requested_at,
    })
}

/// Get a pending request by id.
pub(crate) fn get(conn: &Connection, id: i64) -> Result<Option<BloodRequest>> {
    let request = conn
        .query_row(
            &format!("SELECT {REQUEST_COLUMNS} FROM requests WHERE id = ?1"),
            [id],
            row_to_request,
        )
        .optional()?;
    Ok(request)
}

/// All pending requests in insertion order.
pub(crate) fn list(conn: &Connection) -> Result<Vec<BloodRequest>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {REQUEST_COLUMNS} FROM requests ORDER BY id"
    ))?;
    let requests = stmt
        .query_map([], row_to_request)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(requests)
}

/// Delete one request by id. Returns `true` if it existed.
pub(crate) fn remove(conn: &Connection, id: i64) -> Result<bool> {
    let affected = conn.execute("DELETE FROM requests WHERE id = ?1", [id])?;
    Ok(affected > 0)
}

/// Delete every request with this exact group and unit count.
///
/// Unrelated requests that happen to share both values are removed too.
pub(crate) fn remove_matching(
    conn: &Connection,
    group: BloodGroup,
    units_requested: u32,
) -> Result<usize> {
    let affected = conn.execute(
        "DELETE FROM requests WHERE blood_group = ?1 AND units_requested = ?2",
        params![group, units_requested],
    )?;
    Ok(affected)
}

/// Number of pending requests and the units they ask for in total.
pub(crate) fn pending_totals(conn: &Connection) -> Result<(u64, u64)> {
    let (requests, units): (i64, i64) = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(units_requested), 0) FROM requests",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok((count(requests, "request count")?, count(units, "requested units")?))
}

fn row_to_request(row: &Row<'_>) -> rusqlite::Result<BloodRequest> {
    let requested_at: String = row.get(5)?;
    Ok(BloodRequest {
        id: row.get(0)?,
        name: row.get(1)?,
        blood_group: row.get(2)?,
        contact: row.get(3)?,
        units_requested: row.get(4)?,
        requested_at: parse_timestamp(&requested_at),
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

    fn add(conn: &Connection, group: BloodGroup, units: u32) -> BloodRequest {
        insert(conn, &NewRequest::new("Ward 4", group, "x101", units)).unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let conn = conn();
        let request = add(&conn, BloodGroup::AbNeg, 2);

        let stored = get(&conn, request.id).unwrap().unwrap();
        assert_eq!(stored.blood_group, BloodGroup::AbNeg);
        assert_eq!(stored.units_requested, 2);
        assert_eq!(stored.name, "Ward 4");
    }

    #[test]
    fn test_list_in_insertion_order() {
        let conn = conn();
        let a = add(&conn, BloodGroup::OPos, 3);
        let b = add(&conn, BloodGroup::APos, 1);

        let ids: Vec<_> = list(&conn).unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, [a.id, b.id]);
    }

    #[test]
    fn test_remove_by_id() {
        let conn = conn();
        let request = add(&conn, BloodGroup::OPos, 3);

        assert!(remove(&conn, request.id).unwrap());
        assert!(!remove(&conn, request.id).unwrap());
        assert!(get(&conn, request.id).unwrap().is_none());
    }

    #[test]
    fn test_remove_matching_deletes_all_equal_requests() {
        let conn = conn();
        add(&conn, BloodGroup::OPos, 2);
        add(&conn, BloodGroup::OPos, 2);
        let other_units = add(&conn, BloodGroup::OPos, 3);
        let other_group = add(&conn, BloodGroup::ONeg, 2);

        assert_eq!(remove_matching(&conn, BloodGroup::OPos, 2).unwrap(), 2);

        let ids: Vec<_> = list(&conn).unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, [other_units.id, other_group.id]);
    }

    #[test]
    fn test_pending_totals() {
        let conn = conn();
        assert_eq!(pending_totals(&conn).unwrap(), (0, 0));

        add(&conn, BloodGroup::OPos, 2);
        add(&conn, BloodGroup::BNeg, 3);
        assert_eq!(pending_totals(&conn).unwrap(), (2, 5));
    }
}
