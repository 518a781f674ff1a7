//! Base64 armoring for keys and sealed messages
//!
//! Everything this tool prints or stores is standard-alphabet base64 with
//! padding. Decoding ignores ASCII whitespace anywhere in the input, so a
//! trailing newline from `echo` or a line-wrapped paste still decodes.

use crate::error::{BoxsealError, ErrorCategory, ErrorKind, Result};
use base64::{Engine, engine::general_purpose::STANDARD};

/// Wrap bytes in armor, returning the armored string
pub fn wrap(body: &[u8]) -> String {
    STANDARD.encode(body)
}

/// Unwrap armored text, returning the original bytes
///
/// `kind` tags a decoding failure so callers can tell a bad key file from
/// bad ciphertext input.
pub fn unwrap(armored: &[u8], kind: ErrorKind) -> Result<Vec<u8>> {
    let compact: Vec<u8> = armored
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();

    STANDARD.decode(&compact).map_err(|e| {
        BoxsealError::with_kind_and_source(
            ErrorCategory::User,
            kind,
            format!("base64 decoding failed: {}", e),
            e,
        )
    })
}
