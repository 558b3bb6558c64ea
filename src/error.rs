//! Errors found throughout this crate

use thiserror::Error;
use x11rb::errors::ConnectError;

/// Errors that occur while reading state or reconciling monitors
#[derive(Debug, Error)]
pub(crate) enum Error {
    /// Failure to connect to the server
    #[error("failed to connect to the X11 server: {0}")]
    Connection(#[from] ConnectError),

    /// A required X11 extension is not available
    #[error("the {0} X11 extension is unsupported")]
    MissingExtension(&'static str),

    /// `bspc` could not be spawned or exited abnormally
    #[error("`bspc {args}` failed: {reason}")]
    Command {
        /// Arguments given to `bspc`, joined by spaces
        args:   String,
        /// Exit status and stderr, or the spawn error
        reason: String,
    },

    /// `bspc` wrote something that isn't UTF-8
    #[error("`bspc {0}` returned output that is not valid UTF-8")]
    Utf8(String),

    /// The state document did not match the expected schema
    #[error("failed to parse the state of monitor {monitor}: {source}")]
    Parse {
        /// Monitor that was queried
        monitor: String,
        /// Underlying deserialization error
        source:  serde_json::Error,
    },

    /// Zero or more than one enabled screen is marked as primary
    #[error("expected exactly one primary screen, found {0}")]
    PrimaryCount(usize),

    /// The primary screen has no matching bspwm monitor
    #[error("primary screen {0} has no matching active bspwm monitor")]
    PrimaryMonitorMissing(String),

    /// More active monitors than configured desktop layouts
    #[error("more than {layouts} monitors are unsupported (found {monitors})")]
    CapacityExceeded {
        /// Number of active monitors
        monitors: usize,
        /// Number of configured layouts
        layouts:  usize,
    },
}
