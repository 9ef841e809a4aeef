//! Tracing initialization
//!
//! Development logs go to stdout in a compact human format. Production logs
//! are JSON lines appended to the configured log file, which is also what the
//! log view serves.

mod init_basic;

pub use init_basic::{default_filter, init_telemetry};
