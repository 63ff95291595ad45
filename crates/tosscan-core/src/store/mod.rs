//! Persistent scan-result store (SQLite via sqlx).
//!
//! A key-value table holds one JSON [`StoredScan`](crate::model::StoredScan)
//! per hostname under `scan_<hostname>`; a second table queues scan-result
//! telemetry that could not be delivered.

mod db;
mod scans;
mod uploads;

pub use db::ResultStore;
pub use scans::storage_key;
pub use uploads::PendingUpload;
