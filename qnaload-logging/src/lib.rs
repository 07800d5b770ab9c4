//! Logging setup for qnaload
//!
//! Library crates only emit `tracing` events; the binary calls one of the
//! initialisers here once at startup. Console output always goes to stderr so
//! that the run summary on stdout stays machine-readable.

pub mod init;

pub use init::{build_env_filter, init_logging_from_config, init_simple_tracing, LoggingGuard};
