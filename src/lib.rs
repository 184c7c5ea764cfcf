//! randmean - dispersion statistics over true random numbers.
//!
//! Fans a job of `N` requests out to the random.org JSON-RPC API, then reports
//! the standard deviation of every returned sequence and of the sequence sums.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod upstream;
