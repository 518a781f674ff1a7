//! Key material and key files
//!
//! A key pair is stored as two files next to each other: `<name>.pub`
//! holding the public key and `<name>.pvt` holding the private key. Both
//! contain the 32 raw key bytes as padded standard base64 with no newline.
//! The public key file is world readable; the private key file is readable
//! and writable by its owner only (Unix).

use crate::armor;
use crate::error::{BoxsealError, ErrorCategory, ErrorKind, Result};
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

/// Length in bytes of both halves of a key pair
pub const KEY_LEN: usize = 32;

/// Suffix appended to the base name for the public key file
pub const PUBLIC_KEY_SUFFIX: &str = ".pub";

/// Suffix appended to the base name for the private key file
pub const PRIVATE_KEY_SUFFIX: &str = ".pvt";

#[cfg(unix)]
const PUBLIC_KEY_MODE: u32 = 0o644;
#[cfg(unix)]
const PRIVATE_KEY_MODE: u32 = 0o600;

#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey([u8; KEY_LEN]);

impl PublicKey {
    pub fn from_array(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Exactly 32 bytes or a `KeyLength` error; never pads or truncates.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(Self(exact_key_bytes(bytes, "public")?))
    }

    pub fn from_armored(armored: &[u8]) -> Result<Self> {
        let bytes = armor::unwrap(armored, ErrorKind::KeyDecode)?;
        Self::from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    pub fn to_armored(&self) -> String {
        armor::wrap(&self.0)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey").field(&self.to_armored()).finish()
    }
}

/// The secret half of a key pair, wiped from memory on drop
#[derive(Clone)]
pub struct PrivateKey(Zeroizing<[u8; KEY_LEN]>);

impl PrivateKey {
    pub fn from_array(bytes: [u8; KEY_LEN]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let key = Zeroizing::new(exact_key_bytes(bytes, "private")?);
        Ok(Self(key))
    }

    pub fn from_armored(armored: &[u8]) -> Result<Self> {
        let bytes = Zeroizing::new(armor::unwrap(armored, ErrorKind::KeyDecode)?);
        Self::from_slice(&bytes)
    }

    pub fn expose(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    pub fn to_armored(&self) -> Zeroizing<String> {
        Zeroizing::new(armor::wrap(&self.0[..]))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

#[derive(Debug, Clone)]
pub struct KeyPair {
    pub public: PublicKey,
    pub private: PrivateKey,
}

/// Path of the public key file for a base name
pub fn public_key_path(base: &Path) -> PathBuf {
    with_suffix(base, PUBLIC_KEY_SUFFIX)
}

/// Path of the private key file for a base name
pub fn private_key_path(base: &Path) -> PathBuf {
    with_suffix(base, PRIVATE_KEY_SUFFIX)
}

/// Read and decode a public key file
pub fn read_public_key(path: &Path) -> Result<PublicKey> {
    let armored = fs::read(path).map_err(|e| {
        read_error(path, e).with_context(format!("cannot read public key file {:?}", path))
    })?;
    PublicKey::from_armored(&armored).map_err(|e| e.with_context("cannot decode public key"))
}

/// Read and decode a private key file
pub fn read_private_key(path: &Path) -> Result<PrivateKey> {
    let armored = Zeroizing::new(fs::read(path).map_err(|e| {
        read_error(path, e).with_context(format!("cannot read private key file {:?}", path))
    })?);
    PrivateKey::from_armored(&armored).map_err(|e| e.with_context("cannot decode private key"))
}

/// Fail with `KeyFileExists` if either file of the pair is already present.
///
/// The private key file is checked first. Dangling symlinks count as
/// present.
pub fn ensure_absent(public_path: &Path, private_path: &Path) -> Result<()> {
    for (path, what) in [(private_path, "private"), (public_path, "public")] {
        if fs::symlink_metadata(path).is_ok() {
            return Err(exists_error(path, what));
        }
    }
    Ok(())
}

/// Write a public key file with mode 0644, refusing to replace an existing file
pub fn write_public_key(path: &Path, key: &PublicKey) -> Result<()> {
    write_key_file(path, key.to_armored().as_bytes(), "public")
}

/// Write a private key file with mode 0600, refusing to replace an existing file
pub fn write_private_key(path: &Path, key: &PrivateKey) -> Result<()> {
    write_key_file(path, key.to_armored().as_bytes(), "private")
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn exact_key_bytes(bytes: &[u8], what: &str) -> Result<[u8; KEY_LEN]> {
    <[u8; KEY_LEN]>::try_from(bytes).map_err(|_| {
        BoxsealError::with_kind(
            ErrorCategory::User,
            ErrorKind::KeyLength,
            format!("{} key must be {} bytes, got {}", what, KEY_LEN, bytes.len()),
        )
    })
}

fn exists_error(path: &Path, what: &str) -> BoxsealError {
    BoxsealError::with_kind(
        ErrorCategory::User,
        ErrorKind::KeyFileExists,
        format!("{} key file {:?} already exists", what, path),
    )
}

/// Write a key file via a tempfile in the same directory.
///
/// The tempfile gets its final permissions and is fsynced before being
/// linked into place without clobbering, so the target either does not
/// exist or holds the complete key.
fn write_key_file(path: &Path, contents: &[u8], what: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let write_error = |msg: &str, e: io::Error| {
        BoxsealError::with_kind_and_source(ErrorCategory::Internal, ErrorKind::Io, msg, e)
            .with_context(format!("cannot write {} key {:?}", what, path))
    };

    let mut temp_file = tempfile::Builder::new()
        .prefix(".boxseal-")
        .tempfile_in(dir)
        .map_err(|e| write_error("failed to create tempfile", e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = if what == "private" {
            PRIVATE_KEY_MODE
        } else {
            PUBLIC_KEY_MODE
        };
        temp_file
            .as_file()
            .set_permissions(fs::Permissions::from_mode(mode))
            .map_err(|e| write_error("failed to set tempfile permissions", e))?;
    }

    temp_file
        .write_all(contents)
        .map_err(|e| write_error("failed to write to tempfile", e))?;
    temp_file
        .as_file()
        .sync_all()
        .map_err(|e| write_error("failed to sync tempfile", e))?;

    temp_file.persist_noclobber(path).map_err(|e| {
        if e.error.kind() == io::ErrorKind::AlreadyExists {
            exists_error(path, what)
        } else {
            write_error("failed to move tempfile into place", e.error)
        }
    })?;
    Ok(())
}

fn read_error(path: &Path, err: io::Error) -> BoxsealError {
    let category = if err.kind() == io::ErrorKind::NotFound {
        ErrorCategory::User
    } else {
        ErrorCategory::Internal
    };
    BoxsealError::with_kind_and_source(
        category,
        ErrorKind::Io,
        format!("failed to read from {}", path.display()),
        err,
    )
}
