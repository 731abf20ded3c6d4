use thiserror::Error;

/// Classified outcome when a piece of text does not yield a transaction.
///
/// `NotApplicable` is the expected, frequent case: the parser is fed every
/// incoming notification, and almost none of them are Vodafone Cash
/// messages. The remaining variants all mean the text looked relevant, so
/// they are worth surfacing as diagnostics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    /// Text is not a Vodafone Cash notification at all.
    #[error("text is not a Vodafone Cash notification")]
    NotApplicable,

    /// The transfer grammar matched but a captured field could not be
    /// converted.
    #[error("malformed transfer notification: {0}")]
    MalformedTransfer(String),

    /// The received grammar matched but a captured field could not be
    /// converted.
    #[error("malformed received notification: {0}")]
    MalformedReceived(String),

    /// Relevant text that matches neither grammar. Usually means the
    /// operator changed the message format.
    #[error("Vodafone Cash notification in an unrecognized format")]
    UnrecognizedFormat,
}

/// Errors raised at the key-value persistence boundary.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;
