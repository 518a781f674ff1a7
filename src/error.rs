use std::error::Error as StdError;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCategory {
    /// The environment failed: the random source, an unexpected I/O error,
    /// or the sealing primitive. May still have a user cause the code
    /// cannot see.
    Internal,

    /// Bad input from the user: missing or malformed files, wrong-length
    /// keys, key files in the way, or a message that does not open.
    User,
}

/// What went wrong, for tests and callers that match on specific failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A key file that would be written by key generation already exists.
    KeyFileExists,
    /// A key file is not valid base64.
    KeyDecode,
    /// A key file decoded to something other than exactly 32 bytes.
    KeyLength,
    /// The ciphertext input is not valid base64.
    InputDecode,
    /// Opening a sealed message failed: wrong key pair, tampering or
    /// corruption. Deliberately not more specific than that.
    AuthenticationFailed,
    /// The sealed box primitive refused to seal the input.
    SealFailure,
    /// The operating system random source failed.
    RandomSource,
    /// Interaction with the filesystem, stdin/stdout, or other I/O failed.
    Io,
}

#[derive(Debug, Error)]
#[error("{msg}")]
pub struct BoxsealError {
    pub category: ErrorCategory,
    /// Unset for errors that need no specific tag.
    pub kind: Option<ErrorKind>,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    msg: String,
}

impl BoxsealError {
    pub fn new(category: ErrorCategory, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: None,
            source: None,
            msg: msg.into(),
        }
    }

    pub fn with_kind(category: ErrorCategory, kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: None,
            msg: msg.into(),
        }
    }

    pub fn with_kind_and_source(
        category: ErrorCategory,
        kind: ErrorKind,
        msg: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: Some(Box::new(source)),
            msg: msg.into(),
        }
    }

    /// The message of this error alone, without its causes.
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Nest this error under `msg`, e.g. "cannot read input" over the
    /// underlying file error. Category and kind carry over.
    pub fn with_context(self, msg: impl Into<String>) -> Self {
        let category = self.category;
        let kind = self.kind;
        Self {
            category,
            kind,
            source: Some(Box::new(self)),
            msg: msg.into(),
        }
    }

    /// Renders the message and every cause below it as a single line.
    pub fn report(&self) -> String {
        let mut line = self.msg.clone();
        let mut cause = StdError::source(self);
        while let Some(err) = cause {
            line.push_str(": ");
            line.push_str(&err.to_string());
            cause = err.source();
        }
        line
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, BoxsealError>;
