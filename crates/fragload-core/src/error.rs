//! The one error a loading strategy reports to its caller.

/// Why a fragment download ended without success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Reason {
    /// The host gave up on the resource: network failure, HTTP error, or the
    /// fetched code finished without announcing success.
    Terminated,
}

/// Delivered to [`LoadTerminatedHandler::load_terminated`](crate::strategy::LoadTerminatedHandler).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CodeDownloadError {
    reason: Reason,
    message: String,
}

impl CodeDownloadError {
    pub fn new(message: impl Into<String>, reason: Reason) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }

    /// The error every host signal maps to.
    pub fn terminated() -> Self {
        Self::new("Code download terminated", Reason::Terminated)
    }

    pub fn reason(&self) -> Reason {
        self.reason
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminated_display_and_reason() {
        let e = CodeDownloadError::terminated();
        assert_eq!(e.reason(), Reason::Terminated);
        assert_eq!(e.to_string(), "Code download terminated");
    }
}
