//! Error types for console operations

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConsoleError {
    /// A standard stream handle could not be acquired. Nothing else can run.
    #[error("Unable to obtain {stream} handle during initialization: {source}")]
    Init {
        stream: &'static str,
        #[source]
        source: io::Error,
    },

    /// A caller-supplied value lies outside what the buffer or backend accepts.
    #[error("{name} = {value} is out of range: {reason}")]
    OutOfRange {
        name: &'static str,
        value: i64,
        reason: String,
    },

    #[error("Console I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ConsoleError {
    pub(crate) fn out_of_range(name: &'static str, value: impl Into<i64>, reason: impl Into<String>) -> Self {
        ConsoleError::OutOfRange {
            name,
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn is_out_of_range(&self) -> bool {
        matches!(self, ConsoleError::OutOfRange { .. })
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
