//! Adaptive polling.
//!
//! [`PollScheduler`] is the pure transition function: events in, effects
//! out. [`PollDriver`] hosts it on a tokio task, turning effects into
//! timers, fetches and reconciler calls.

pub mod driver;
pub mod machine;
pub mod policy;
pub mod types;

pub use driver::{Command, PollDriver};
pub use machine::PollScheduler;
pub use policy::PollPolicy;
pub use types::{PollEffect, PollEvent, PollState, SchedulerMode, Visibility};
