//! `SQLite` schema for the local slot store.
//!
//! The store mirrors a browser's local storage: one row per key, the value
//! held as an opaque string.

/// Version 1: the slots table.
pub const CREATE_SLOTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS slots (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// Schema migrations, indexed by target version minus one.
pub const MIGRATIONS: &[&str] = &[CREATE_SLOTS_TABLE];
