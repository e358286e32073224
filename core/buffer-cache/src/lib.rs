//! Editor buffer cache: per-path content tracking, significant-change
//! detection and periodic summary emission (spec §4.2).

mod cache;

pub use cache::BufferCache;
pub use cache::SummarySnapshot;
pub use cache::UpdateOutcome;
