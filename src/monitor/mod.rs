//! The single-writer loop tying the data source, differencer, session tracker
//! and notifier together.

pub mod config;
pub mod view;
pub mod worker;

pub use config::MonitorConfig;
pub use view::SessionView;
pub use worker::{Monitor, PollOutcome};
