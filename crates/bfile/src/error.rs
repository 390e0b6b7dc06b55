use thiserror::Error;

/// Errors raised while editing a numbered buffer.
///
/// Every variant is recoverable: the session reports it and keeps running.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EditorError {
    #[error("Not a valid line: {0}")]
    InvalidLineNumber(i64),

    #[error("Illegal range of lines: {from}..{to}")]
    InvalidRange { from: i64, to: i64 },

    #[error("Pushing lines past line 0 (offset {offset})")]
    WouldUnderflow { offset: i64 },

    #[error("Pushing lines would overwrite line {0}")]
    LineCollision(i64),

    #[error("Not a valid command: {0}")]
    UnknownCommand(String),

    #[error("Not an allowed number of arguments for {command}: {given}")]
    ArityError { command: String, given: usize },

    #[error("Not a number: {0}")]
    MalformedArgument(String),
}
