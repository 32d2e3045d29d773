use thiserror::Error;

/// Errors raised while resolving components and locating elements
#[derive(Debug, Error)]
pub enum PageprobeError {
    /// A locator query matched no element
    #[error("No element found using {strategy}: {selector}")]
    NotFound { selector: String, strategy: String },

    /// No component could be constructed for the identifier
    #[error("Unable to resolve component '{identifier}': {source}")]
    Resolution {
        identifier: String,
        #[source]
        source: anyhow::Error,
    },

    /// A caller handed over something that cannot be used as configured
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A test assertion did not hold
    #[error("{0}")]
    AssertionFailed(String),

    /// The WebDriver session reported a failure
    #[error("WebDriver command failed: {0}")]
    WebDriver(String),

    /// A bounded wait ran out of time
    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PageprobeError>;

impl PageprobeError {
    pub fn not_found(selector: impl Into<String>, strategy: impl Into<String>) -> Self {
        PageprobeError::NotFound {
            selector: selector.into(),
            strategy: strategy.into(),
        }
    }

    pub fn resolution(identifier: impl Into<String>, source: anyhow::Error) -> Self {
        PageprobeError::Resolution {
            identifier: identifier.into(),
            source,
        }
    }

    /// Whether this is a locator miss the caller may recover from
    pub fn is_not_found(&self) -> bool {
        matches!(self, PageprobeError::NotFound { .. })
    }
}

impl From<fantoccini::error::CmdError> for PageprobeError {
    fn from(err: fantoccini::error::CmdError) -> Self {
        let msg = err.to_string();
        if msg.contains("timeout") || msg.contains("timed out") {
            PageprobeError::Timeout(msg)
        } else {
            PageprobeError::WebDriver(msg)
        }
    }
}

#[cfg(test)]
#[path = "errors_test.rs"]
mod errors_test;
