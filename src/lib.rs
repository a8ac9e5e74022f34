//! Squadron Watch - monitors a squadron's competitive standing and reports
//! battles, play sessions and leaderboard rank.
//!
//! This library provides the polling and inference core (snapshot
//! differencing, session tracking, rank resolution) and the service around it.

pub mod clock;
pub mod config;
pub mod diff;
pub mod leaderboard;
pub mod monitor;
pub mod notify;
pub mod roster;
pub mod server;
pub mod session;
pub mod source;
pub mod types;

#[cfg(test)]
mod test_utils;
