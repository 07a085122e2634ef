#![forbid(unsafe_code)]

//! `tapline` command-line harness: replay recorded pointer traces through a
//! fully wired list (gesture engine, list policy, reorder sensor) and manage
//! configuration files.

pub mod cli;
pub mod config;
pub mod error;
pub mod session;

pub use cli::run_from_env;
pub use config::{ConfigError, TaplineConfig};
pub use error::{HarnessError, Result};
pub use session::{ReplayReport, Stamped, replay_list_session};

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (`warn` when unset).
pub const LOG_ENV: &str = "TAPLINE_LOG";

/// Install a stderr `fmt` subscriber filtered by [`LOG_ENV`].
///
/// Does nothing if a global subscriber is already set.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
