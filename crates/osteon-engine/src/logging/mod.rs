//! Logging utilities.
//!
//! The pipeline only talks to the `log` facade. Hosts that want output call
//! [`init_logging`] once; tests and embedders with their own logger skip it.

mod init;

pub use init::{init_logging, LoggingConfig};
