//! Exit code classification.
//!
//! Tasks report one of a small, fixed set of integer exit codes. Each code maps
//! to a display label and a CSS class used to tint its row in the exit log.

use serde::Serialize;
use tracing::warn;

pub const EXIT_OK: i64 = 1;
pub const EXIT_WARNING: i64 = 30;
pub const EXIT_ERROR: i64 = 40;
pub const EXIT_CRITICAL: i64 = 50;
pub const EXIT_FATAL: i64 = -999;

/// Display label and style class for an exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusDescriptor {
    label: &'static str,
    class: &'static str,
}

impl StatusDescriptor {
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// CSS class for the row. Empty for unrecognized codes.
    pub fn class(&self) -> &'static str {
        self.class
    }
}

const OK: StatusDescriptor = StatusDescriptor { label: "OK", class: "exit-ok" };
const WARNING: StatusDescriptor = StatusDescriptor { label: "WARNING", class: "exit-warning" };
const ERROR: StatusDescriptor = StatusDescriptor { label: "ERROR", class: "exit-error" };
const CRITICAL: StatusDescriptor = StatusDescriptor { label: "CRITICAL", class: "exit-critical" };
const FATAL: StatusDescriptor = StatusDescriptor { label: "FATAL", class: "exit-fatal" };
const UNKNOWN: StatusDescriptor = StatusDescriptor { label: "UNKNOWN", class: "" };

/// Labels in the order the status filter offers them.
pub const STATUS_LABELS: [&str; 6] = ["OK", "WARNING", "ERROR", "CRITICAL", "FATAL", "UNKNOWN"];

/// Closed set of known exit statuses. Codes are opaque categories, not severities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Ok,
    Warning,
    Error,
    Critical,
    Fatal,
    Unknown(i64),
}

impl ExitStatus {
    pub fn from_code(code: i64) -> Self {
        match code {
            EXIT_OK => ExitStatus::Ok,
            EXIT_WARNING => ExitStatus::Warning,
            EXIT_ERROR => ExitStatus::Error,
            EXIT_CRITICAL => ExitStatus::Critical,
            EXIT_FATAL => ExitStatus::Fatal,
            other => ExitStatus::Unknown(other),
        }
    }

    pub const fn descriptor(self) -> StatusDescriptor {
        match self {
            ExitStatus::Ok => OK,
            ExitStatus::Warning => WARNING,
            ExitStatus::Error => ERROR,
            ExitStatus::Critical => CRITICAL,
            ExitStatus::Fatal => FATAL,
            ExitStatus::Unknown(_) => UNKNOWN,
        }
    }
}

/// Classify an exit code, warning once when the code is not recognized.
pub fn classify(code: i64) -> StatusDescriptor {
    let status = ExitStatus::from_code(code);
    if let ExitStatus::Unknown(code) = status {
        warn!(code, "Unrecognized exit code");
    }
    status.descriptor()
}
