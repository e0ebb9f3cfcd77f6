//! Test fixtures for reflection integration tests
//!
//! Driver column reports as the Kinetica ODBC driver returns them for a few
//! typical tables.

#![allow(dead_code)]

use gpudb_catalog::MockConnection;
use gpudb_core::DriverTypeReport;

/// A customers table covering the integer, text and time types
///
/// - Primary key (id)
/// - Sized and unbounded text (email, name, notes)
/// - Timestamps in both driver spellings
pub fn customers_columns() -> Vec<DriverTypeReport> {
    vec![
        DriverTypeReport::new("id", "BIGINT", Some(19), 0),
        DriverTypeReport::new("email", "VARCHAR", Some(128), 0),
        DriverTypeReport::new("name", "VARCHAR", Some(255), 1),
        DriverTypeReport::new("notes", "VARCHAR", Some(10000), 1),
        DriverTypeReport::new("created_at", "TYPE_TIMESTAMP", Some(23), 0),
        DriverTypeReport::new("updated_at", "TIMESTAMP", Some(23), 1),
    ]
}

/// An orders table with numeric and date columns
pub fn orders_columns() -> Vec<DriverTypeReport> {
    vec![
        DriverTypeReport::new("id", "INTEGER", Some(10), 0),
        DriverTypeReport::new("customer_id", "BIGINT", Some(19), 0),
        DriverTypeReport::new("total", "DECIMAL", Some(18), 0),
        DriverTypeReport::new("discount", "REAL", Some(7), 1),
        DriverTypeReport::new("placed_on", "TYPE_DATE", Some(10), 0),
        DriverTypeReport::new("placed_at", "TYPE_TIME", Some(8), 1),
        DriverTypeReport::new("quantity", "SMALLINT", Some(5), 0),
        DriverTypeReport::new("flags", "TINYINT", Some(3), 1),
    ]
}

/// A geospatial table with Kinetica-specific types
pub fn sensors_columns() -> Vec<DriverTypeReport> {
    vec![
        DriverTypeReport::new("sensor", "VARCHAR", Some(16), 0),
        DriverTypeReport::new("address", "IPV4", Some(15), 1),
        DriverTypeReport::new("location", "GEOMETRY", None, 1),
        DriverTypeReport::new("reading", "DOUBLE", Some(15), 1),
        DriverTypeReport::new("payload", "BYTES", None, 1),
        DriverTypeReport::new("epoch_ms", "LONG", Some(19), 0),
    ]
}

/// A table with column types the mapper does not know
pub fn legacy_columns() -> Vec<DriverTypeReport> {
    vec![
        DriverTypeReport::new("id", "INTEGER", Some(10), 0),
        DriverTypeReport::new("shape", "WKT_BLOB", None, 1),
        DriverTypeReport::new("tags", "ARRAY", Some(8), 1),
    ]
}

/// A connection holding all fixture tables in two schemas
pub fn warehouse() -> MockConnection {
    MockConnection::new()
        .with_database("ki_home")
        .with_table("ki_home", "customers", customers_columns())
        .with_table("ki_home", "orders", orders_columns())
        .with_table("iot", "sensors", sensors_columns())
        .with_table("iot", "legacy", legacy_columns())
}
