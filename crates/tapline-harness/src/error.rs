use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use tapline_web::TraceError;

pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("trace error: {0}")]
    Trace(#[from] TraceError),

    #[error("required path does not exist: {path}")]
    MissingPath { path: PathBuf },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl HarnessError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Trace(_) => 3,
            Self::InvalidArgument { .. } => 64,
            _ => 1,
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::HarnessError;
    use crate::config::ConfigError;
    use tapline_web::TraceError;

    #[test]
    fn exit_codes_distinguish_failure_classes() {
        assert_eq!(HarnessError::from(ConfigError::Validation(vec![])).exit_code(), 2);
        assert_eq!(HarnessError::from(TraceError::MissingHeader).exit_code(), 3);
        assert_eq!(HarnessError::invalid("nope").exit_code(), 64);
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(HarnessError::from(io).exit_code(), 1);
    }

    #[test]
    fn messages_wrap_sources() {
        let error = HarnessError::from(TraceError::MissingHeader);
        assert_eq!(
            error.to_string(),
            "trace error: trace does not start with a trace_header record"
        );
    }
}
