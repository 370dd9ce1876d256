// Document completion tracking: one instance per (placement, required template),
// status lifecycle updates, and aggregate completion statistics.

pub mod handlers;
pub mod stats;
pub mod tracker;

pub use tracker::TrackerError;
