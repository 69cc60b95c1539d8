//! Logger setup on top of the `log` facade.
//!
//! Engine code logs through `log::*` macros; binaries call [`init_logging`]
//! once at the top of `main`.

mod init;

pub use init::{init_logging, LoggingConfig};
