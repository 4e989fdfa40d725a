use std::process::ExitCode;

/// Errors that cause likecount to exit with a specific code.
#[derive(Debug, thiserror::Error)]
pub enum ExitError {
    #[error("config error: {0}")]
    Config(String),

    #[error("directory listing failed: {0}")]
    Directory(String),

    #[error("history fetch failed for #{channel}: {message}")]
    History { channel: String, message: String },

    #[error("report delivery failed: {0}")]
    Delivery(String),

    #[error("{message}")]
    WithCode { code: u8, message: String },

    #[error("{0}")]
    Other(String),
}

impl ExitError {
    pub fn new(code: u8, message: String) -> Self {
        ExitError::WithCode { code, message }
    }

    pub fn exit_code(&self) -> ExitCode {
        match self {
            ExitError::Config(_) => ExitCode::from(2),
            ExitError::Directory(_) => ExitCode::from(3),
            ExitError::History { .. } => ExitCode::from(4),
            ExitError::Delivery(_) => ExitCode::from(5),
            ExitError::WithCode { code, .. } => ExitCode::from(*code),
            ExitError::Other(_) => ExitCode::from(1),
        }
    }
}
