//! Anonymous public-key encryption using NaCl sealed boxes
//!
//! A sealed box is X25519 key agreement between a fresh ephemeral key pair
//! and the recipient's public key, followed by XSalsa20Poly1305. The
//! ephemeral public key is prepended to the ciphertext and the ephemeral
//! secret is discarded, so the message authenticates nobody but the
//! recipient's ability to open it.
//!
//! The sealed format is:
//! - ephemeral public key: 32 bytes
//! - sealed box: variable length (includes 16-byte Poly1305 MAC)
//!
//! All of the cryptography is done by the `crypto_box` crate; this module
//! only handles key material and error mapping.

use crate::error::{BoxsealError, ErrorCategory, ErrorKind, Result};
use crate::keys::{KEY_LEN, KeyPair, PrivateKey, PublicKey};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

/// Length of the Poly1305 authentication tag in bytes
const TAG_LEN: usize = 16;

/// Bytes a sealed message adds on top of the plaintext
pub const SEAL_OVERHEAD: usize = KEY_LEN + TAG_LEN;

const DECRYPT_FAILED: &str = "cannot decrypt the input with provided key pair";

/// Generate a fresh key pair from the operating system random source
pub fn generate_keypair() -> Result<KeyPair> {
    generate_keypair_with_rng(&mut OsRng)
}

/// Generate a key pair from the provided random source
///
/// Fails instead of panicking if the random source cannot produce bytes.
pub fn generate_keypair_with_rng<R: RngCore + CryptoRng>(rng: &mut R) -> Result<KeyPair> {
    let mut secret = Zeroizing::new([0u8; KEY_LEN]);
    rng.try_fill_bytes(&mut secret[..]).map_err(|e| {
        BoxsealError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::RandomSource,
            "random source failed",
            e,
        )
    })?;

    let private = PrivateKey::from_array(*secret);
    let public = derive_public(&private);
    Ok(KeyPair { public, private })
}

/// Seal plaintext for the holder of the private key matching `recipient`
///
/// A new ephemeral key pair is drawn from the operating system random
/// source for every call.
pub fn seal(recipient: &PublicKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    seal_with_rng(recipient, plaintext, &mut OsRng)
}

/// Seal plaintext using the provided random source for the ephemeral key
///
/// Only tests should pass anything but `OsRng` here: a repeated random
/// stream produces a repeated ephemeral key.
pub fn seal_with_rng<R: RngCore + CryptoRng>(
    recipient: &PublicKey,
    plaintext: &[u8],
    rng: &mut R,
) -> Result<Vec<u8>> {
    let public = crypto_box::PublicKey::from(*recipient.as_bytes());
    public.seal(rng, plaintext).map_err(|_| {
        BoxsealError::with_kind(
            ErrorCategory::Internal,
            ErrorKind::SealFailure,
            "cannot encrypt the input with provided public key",
        )
    })
}

/// Open a sealed message with the recipient's key pair
///
/// The public key must be the one derived from `private`; a mismatched
/// pair fails exactly like a wrong key or tampered ciphertext does.
pub fn open(
    sealed: &[u8],
    public: &PublicKey,
    private: &PrivateKey,
) -> Result<Zeroizing<Vec<u8>>> {
    // Reject mismatched pairs and short input before touching the primitive.
    if derive_public(private) != *public || sealed.len() < SEAL_OVERHEAD {
        return Err(decrypt_failed());
    }

    let secret = crypto_box::SecretKey::from(*private.expose());
    let plaintext = secret.unseal(sealed).map_err(|_| decrypt_failed())?;
    Ok(Zeroizing::new(plaintext))
}

fn derive_public(private: &PrivateKey) -> PublicKey {
    let secret = crypto_box::SecretKey::from(*private.expose());
    PublicKey::from_array(*secret.public_key().as_bytes())
}

// No source is attached: every cause must look the same from outside.
fn decrypt_failed() -> BoxsealError {
    BoxsealError::with_kind(
        ErrorCategory::User,
        ErrorKind::AuthenticationFailed,
        DECRYPT_FAILED,
    )
}
