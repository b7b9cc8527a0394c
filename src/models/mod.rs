pub mod visitor;

pub use visitor::{now_timestamp, PersistedRecord, RequestMetadata, VisitorRecord, VisitorStats};
