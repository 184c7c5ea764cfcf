//! Analysis modules.
//!
//! The fan-out aggregator and the statistics it reports.

pub mod aggregator;
pub mod stats;

pub use aggregator::Aggregator;
