//! # tether-sync
//!
//! Registry → monitor reconciliation.
//!
//! [`pipeline::run`] fetches both snapshots and hands them to
//! [`Reconciler::reconcile`], which links, updates and creates monitor devices
//! through the [`tether_core::MonitorApi`] capability and returns a
//! [`RunReport`]. [`record`] persists the last report for `tether status`.

pub mod context;
pub mod engine;
pub mod error;
pub mod index;
pub mod matcher;
pub mod pipeline;
pub mod record;
pub mod report;

pub use context::RunContext;
pub use engine::Reconciler;
pub use error::SyncError;
pub use report::{
    Action, ActionResult, Anomaly, DeviceOutcome, DeviceState, Failure, Resolution, RunReport,
};
