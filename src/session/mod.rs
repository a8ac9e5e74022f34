//! Play-session tracking.
//!
//! A session is a window of consecutive battles. The first battle observed
//! while idle opens one; a configurable stretch without battles (checked on a
//! fixed tick) or an explicit shutdown closes it and yields a
//! [`SessionSummary`].
//!
//! # Module Structure
//!
//! - [`state`]: the tagged `Idle`/`Active` state
//! - [`transitions`]: pure transition functions
//! - [`summary`]: progress snapshots and end-of-session summaries
//! - [`tracker`]: the stateful owner used by the monitor

pub mod state;
pub mod summary;
pub mod tracker;
pub mod transitions;

pub use state::{ActiveSession, SessionState};
pub use summary::{EndReason, MAX_SUMMARY_EVENTS, SessionProgress, SessionSummary};
pub use tracker::SessionTracker;
pub use transitions::{SessionUpdate, on_battle, on_idle_check, on_shutdown};
