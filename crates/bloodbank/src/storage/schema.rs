//! `SQLite` schema definitions for bloodbank.

/// SQL statement to create the donors table.
pub const CREATE_DONORS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS donors (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    age INTEGER NOT NULL,
    blood_group TEXT NOT NULL,
    contact TEXT NOT NULL,
    blood_units INTEGER NOT NULL DEFAULT 0 CHECK (blood_units >= 0),
    registered_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
)
";

/// SQL statement to create the requests table.
pub const CREATE_REQUESTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS requests (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    blood_group TEXT NOT NULL,
    contact TEXT NOT NULL,
    units_requested INTEGER NOT NULL CHECK (units_requested > 0),
    requested_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
)
";

/// Index for supply lookups by group.
pub const CREATE_DONOR_GROUP_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_donors_group ON donors(blood_group, blood_units DESC)
";

/// Index for request lookups by group.
pub const CREATE_REQUEST_GROUP_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_requests_group ON requests(blood_group)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_DONORS_TABLE,
    CREATE_REQUESTS_TABLE,
    CREATE_DONOR_GROUP_INDEX,
    CREATE_REQUEST_GROUP_INDEX,
    CREATE_METADATA_TABLE,
];
