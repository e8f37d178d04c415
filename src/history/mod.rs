//! Local scan history: bounded newest-first log plus filtering.

pub mod filter;
pub mod store;

pub use filter::{category_counts, filter, Category, CategoryCounts, HistoryFilter};
pub use store::ScanHistoryStore;

/// Maximum number of records kept.
pub const DEFAULT_RETENTION: usize = 100;
