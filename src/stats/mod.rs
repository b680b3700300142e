//! Statistics and metrics

pub mod metrics;

pub use metrics::{ServerCounters, ServerStats, SessionStats};
