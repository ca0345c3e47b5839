//! Aggregation and classification pipeline.
//!
//! `aggregator` resamples readings to hourly means, `classifier` maps an
//! average onto a band, and `summary` combines both per room.

pub mod aggregator;
pub mod classifier;
pub mod summary;

pub use summary::{build_dashboard, Dashboard, RoomSummary};
