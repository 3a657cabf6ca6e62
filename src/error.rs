// ⚠️ Error Kinds
// One enum for the library so callers can branch on the cause

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum TombolaError {
    /// Submitted or stored text that does not parse
    #[error("invalid {field}: {message}")]
    Parse { field: &'static str, message: String },

    /// Backing store could not be opened, read or written
    #[error("entry store unavailable ({context}): {source}")]
    StoreUnavailable {
        context: String,
        #[source]
        source: BoxError,
    },

    #[error("no entries have been submitted yet")]
    NoEntries,

    /// Every stored entry failed to parse against the actual outcome
    #[error("no entry could be scored against the actual outcome")]
    NoValidWinner,

    #[error("chart rendering failed: {0}")]
    Chart(String),
}

impl TombolaError {
    pub fn parse(field: &'static str, message: impl Into<String>) -> Self {
        TombolaError::Parse {
            field,
            message: message.into(),
        }
    }

    pub fn store<E>(context: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        TombolaError::StoreUnavailable {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// True for errors caused by user input rather than the server
    pub fn is_user_error(&self) -> bool {
        matches!(self, TombolaError::Parse { .. })
    }
}

pub type Result<T> = std::result::Result<T, TombolaError>;
