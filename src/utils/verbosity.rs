use clap::ValueEnum;
use serde::{Deserialize, Serialize};

// -----------------------------------------------------------------------------
// Verbosity
// -----------------------------------------------------------------------------

/// The output verbosity level, passed on to `env_logger` through `RUST_LOG`.
///
/// ```rust
/// use maptree::Verbosity;
/// assert_eq!(Verbosity::default().to_string(), "info");
/// assert_eq!(Verbosity::Debug.to_string(), "debug");
/// ```
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize, ValueEnum)]
pub enum Verbosity {
    #[default]
    Info,
    Warn,
    Debug,
    Error,
}

impl std::fmt::Display for Verbosity {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        // lowercase for RUST_LOG env var compatibility
        let level = match self {
            Verbosity::Info => "info",
            Verbosity::Warn => "warn",
            Verbosity::Debug => "debug",
            Verbosity::Error => "error",
        };
        write!(f, "{level}")
    }
}
