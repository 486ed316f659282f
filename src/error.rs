use thiserror::Error;

use crate::parser::ParseError;

/// Top-level error taxonomy. Each variant maps to a distinct exit code so
/// callers and scripts can tell a bad key from a bad model response.
#[derive(Debug, Error)]
pub enum NlshError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("completion provider error: {0}")]
    Provider(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("execution error: {0}")]
    Execution(String),
}

impl NlshError {
    pub fn exit_code(&self) -> i32 {
        match self {
            NlshError::Configuration(_) => 2,
            NlshError::Parse(_) => 3,
            NlshError::Provider(_) => 4,
            NlshError::Execution(_) => 1,
        }
    }
}
