/// Errors reported by a browser driver.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DriverError {
    // ============================================================
    // Session Errors
    // ============================================================
    #[error("Not ready")]
    NotReady,

    #[error("Connection lost")]
    ConnectionLost,

    #[error("Navigation failed: {0}")]
    Navigation(String),

    // ============================================================
    // Element Errors
    // ============================================================
    #[error("Element for {locator} is stale (removed from DOM)")]
    StaleElement { locator: String },

    #[error("Element for {locator} is not interactable: {reason}")]
    NotInteractable { locator: String, reason: String },

    #[error("Invalid selector: {selector}")]
    InvalidSelector { selector: String },

    // ============================================================
    // Execution Errors
    // ============================================================
    #[error("Script execution error: {0}")]
    Script(String),

    #[error("Timeout: {operation}")]
    Timeout { operation: String },

    // ============================================================
    // System Errors
    // ============================================================
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Other: {0}")]
    Other(String),
}

impl From<std::io::Error> for DriverError {
    fn from(err: std::io::Error) -> Self {
        DriverError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for DriverError {
    fn from(err: serde_json::Error) -> Self {
        DriverError::Serialization(err.to_string())
    }
}

impl DriverError {
    /// Stable error code, used in command output and logs.
    pub fn code(&self) -> &'static str {
        match self {
            DriverError::NotReady => "NOT_READY",
            DriverError::ConnectionLost => "CONNECTION_LOST",
            DriverError::Navigation(_) => "NAVIGATION_ERROR",
            DriverError::StaleElement { .. } => "ELEMENT_STALE",
            DriverError::NotInteractable { .. } => "ELEMENT_NOT_INTERACTABLE",
            DriverError::InvalidSelector { .. } => "SELECTOR_INVALID",
            DriverError::Script(_) => "SCRIPT_ERROR",
            DriverError::Timeout { .. } => "TIMEOUT",
            DriverError::Io(_) => "IO_ERROR",
            DriverError::Serialization(_) => "SERIALIZATION_ERROR",
            DriverError::NotSupported(_) => "NOT_SUPPORTED",
            DriverError::Other(_) => "INTERNAL_ERROR",
        }
    }
}
