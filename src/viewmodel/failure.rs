use std::fmt;

use crate::app::NewsdeskError;

pub const NO_NETWORK_MESSAGE: &str = "No Internet Found";
pub const TRANSPORT_MESSAGE: &str = "Unable to connect";
pub const UNKNOWN_MESSAGE: &str = "No signal";
pub const FALLBACK_MESSAGE: &str = "Something went wrong";

/// Why a fetch produced no page. Every variant maps to a display message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// The pre-flight connectivity check failed; the api was never called.
    NoNetwork,
    Transport,
    Unknown,
    Server { status: u16, message: Option<String> },
}

impl FetchFailure {
    pub fn from_error(err: &NewsdeskError) -> Self {
        if err.is_transport() {
            FetchFailure::Transport
        } else {
            FetchFailure::Unknown
        }
    }

    pub fn message(&self) -> String {
        match self {
            FetchFailure::NoNetwork => NO_NETWORK_MESSAGE.to_string(),
            FetchFailure::Transport => TRANSPORT_MESSAGE.to_string(),
            FetchFailure::Unknown => UNKNOWN_MESSAGE.to_string(),
            FetchFailure::Server { message, .. } => message
                .clone()
                .unwrap_or_else(|| FALLBACK_MESSAGE.to_string()),
        }
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchFailure::Server { status, .. } => write!(f, "{} (HTTP {})", self.message(), status),
            _ => f.write_str(&self.message()),
        }
    }
}
