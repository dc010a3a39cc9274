//! Error types for Marga

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Marga error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed or failed validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// Bounded mailbox stayed full past the sender's timeout
    #[error("Mailbox '{mailbox}' is full")]
    MailboxFull {
        /// Mailbox name
        mailbox: &'static str,
    },

    /// Receiving side of a mailbox has been dropped
    #[error("Mailbox '{0}' is closed")]
    MailboxClosed(&'static str),

    /// Tag byte does not belong to the message catalog
    #[error("Unknown message type: {0}")]
    UnknownMessageType(u8),

    /// Component received a message it has no handler for
    #[error("{component} cannot handle message type {tag}")]
    UnexpectedMessage {
        /// Receiving component
        component: &'static str,
        /// Raw tag byte of the offending frame
        tag: u8,
    },

    /// Sequence counter jumped on a channel running the halt gap policy
    #[error("Sequence gap on {channel}: expected {expected}, got {actual}")]
    SequenceGap {
        /// Channel name
        channel: &'static str,
        /// Expected sequence number
        expected: u8,
        /// Received sequence number
        actual: u8,
    },

    /// Path log reached capacity under the halt overflow policy
    #[error("Path log full ({capacity} segments)")]
    PathLogFull {
        /// Configured capacity
        capacity: usize,
    },

    /// Invalid packet or frame bytes
    #[error("Invalid packet: {0}")]
    InvalidPacket(String),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Other(format!("JSON error: {}", e))
    }
}
