//! Logger setup.
//!
//! The library itself only talks to the `log` facade; binaries call
//! [`init_logging`] once to route records through `env_logger`.

mod init;

pub use init::{LoggingConfig, init_logging};
