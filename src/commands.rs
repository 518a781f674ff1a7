//! The three operations behind the command line
//!
//! Each operation takes its inputs explicitly (paths, an input reader and
//! an output writer) so it can be driven from tests without a terminal.

use crate::armor;
use crate::error::{BoxsealError, ErrorCategory, ErrorKind, Result};
use crate::input::InputReader;
use crate::keys;
use crate::sealcrypt;
use std::io::{self, Write};
use std::path::Path;

/// Generate a key pair and write it to `<base>.pub` and `<base>.pvt`
///
/// Nothing is generated if either file already exists. Progress lines
/// naming each file are written to `out` before the file is written.
pub fn genkey(base: &Path, out: &mut dyn Write) -> Result<()> {
    let public_path = keys::public_key_path(base);
    let private_path = keys::private_key_path(base);

    keys::ensure_absent(&public_path, &private_path)?;

    let pair =
        sealcrypt::generate_keypair().map_err(|e| e.with_context("cannot generate key pair"))?;

    writeln!(out, "Writing public key {:?}", public_path).map_err(output_error)?;
    keys::write_public_key(&public_path, &pair.public)?;

    writeln!(out, "Writing private key {:?}", private_path).map_err(output_error)?;
    keys::write_private_key(&private_path, &pair.private)?;

    Ok(())
}

/// Seal the input for the public key in `public_key_path`
///
/// Writes the sealed message as base64 followed by a newline.
pub fn encrypt(
    input: &mut dyn InputReader,
    public_key_path: &Path,
    out: &mut dyn Write,
) -> Result<()> {
    let plaintext = input
        .read_input()
        .map_err(|e| e.with_context("cannot read input"))?;
    let public = keys::read_public_key(public_key_path)?;

    let sealed = sealcrypt::seal(&public, &plaintext)?;

    writeln!(out, "{}", armor::wrap(&sealed)).map_err(output_error)?;
    out.flush().map_err(output_error)?;
    Ok(())
}

/// Open the base64 sealed message from the input with the given key pair
///
/// Writes the recovered plaintext exactly as it was sealed. Nothing is
/// written if the message cannot be opened.
pub fn decrypt(
    input: &mut dyn InputReader,
    public_key_path: &Path,
    private_key_path: &Path,
    out: &mut dyn Write,
) -> Result<()> {
    let armored = input
        .read_input()
        .map_err(|e| e.with_context("cannot read input"))?;
    let sealed = armor::unwrap(&armored, ErrorKind::InputDecode)
        .map_err(|e| e.with_context("cannot decode input"))?;
    let public = keys::read_public_key(public_key_path)?;
    let private = keys::read_private_key(private_key_path)?;

    let plaintext = sealcrypt::open(&sealed, &public, &private)?;

    out.write_all(&plaintext).map_err(output_error)?;
    out.flush().map_err(output_error)?;
    Ok(())
}

fn output_error(err: io::Error) -> BoxsealError {
    BoxsealError::with_kind_and_source(
        ErrorCategory::Internal,
        ErrorKind::Io,
        "failed to write output",
        err,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ConstantInputReader;
    use crate::keys::{KEY_LEN, PrivateKey, PublicKey};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn genkey_in(dir: &TempDir, name: &str) -> PathBuf {
        let base = dir.path().join(name);
        let mut out = Vec::new();
        genkey(&base, &mut out).unwrap();
        base
    }

    fn encrypt_to_string(plaintext: &[u8], base: &Path) -> String {
        let mut input = ConstantInputReader::new(plaintext.to_vec());
        let mut out = Vec::new();
        encrypt(&mut input, &keys::public_key_path(base), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn decrypt_with(armored: &[u8], base: &Path) -> Result<Vec<u8>> {
        let mut input = ConstantInputReader::new(armored.to_vec());
        let mut out = Vec::new();
        decrypt(
            &mut input,
            &keys::public_key_path(base),
            &keys::private_key_path(base),
            &mut out,
        )?;
        Ok(out)
    }

    #[test]
    fn test_hello_world_scenario() {
        let temp_dir = TempDir::new().unwrap();
        let alice = genkey_in(&temp_dir, "alice");

        let armored = encrypt_to_string(b"hello world", &alice);
        assert!(armored.ends_with('\n'));

        let plaintext = decrypt_with(armored.as_bytes(), &alice).unwrap();
        assert_eq!(plaintext, b"hello world");
    }

    #[test]
    fn test_genkey_output_and_shape() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("shape");
        let mut out = Vec::new();
        genkey(&base, &mut out).unwrap();

        let public_path = keys::public_key_path(&base);
        let private_path = keys::private_key_path(&base);
        let printed = String::from_utf8(out).unwrap();
        assert_eq!(
            printed,
            format!(
                "Writing public key {:?}\nWriting private key {:?}\n",
                public_path, private_path
            )
        );

        let public = PublicKey::from_armored(&fs::read(&public_path).unwrap()).unwrap();
        let private = PrivateKey::from_armored(&fs::read(&private_path).unwrap()).unwrap();
        assert_eq!(public.as_bytes().len(), KEY_LEN);
        assert_eq!(private.expose().len(), KEY_LEN);
    }

    #[test]
    fn test_genkey_refuses_existing_public() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("dave");
        fs::write(keys::public_key_path(&base), b"old").unwrap();

        let mut out = Vec::new();
        let err = genkey(&base, &mut out).expect_err("expected existing file error");
        assert_eq!(err.kind, Some(ErrorKind::KeyFileExists));
        assert!(err.to_string().starts_with("public key file"));
        assert!(out.is_empty());
        assert!(!keys::private_key_path(&base).exists());
        assert_eq!(fs::read(keys::public_key_path(&base)).unwrap(), b"old");
    }

    #[test]
    fn test_genkey_refuses_existing_private() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("erin");
        fs::write(keys::private_key_path(&base), b"old").unwrap();

        let mut out = Vec::new();
        let err = genkey(&base, &mut out).expect_err("expected existing file error");
        assert_eq!(err.kind, Some(ErrorKind::KeyFileExists));
        assert!(!keys::public_key_path(&base).exists());
        assert_eq!(fs::read(keys::private_key_path(&base)).unwrap(), b"old");
    }

    #[test]
    fn test_genkey_twice_fails() {
        let temp_dir = TempDir::new().unwrap();
        let base = genkey_in(&temp_dir, "frank");
        let public_before = fs::read(keys::public_key_path(&base)).unwrap();

        let mut out = Vec::new();
        assert!(genkey(&base, &mut out).is_err());
        assert_eq!(fs::read(keys::public_key_path(&base)).unwrap(), public_before);
    }

    #[test]
    fn test_genkey_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("no-such-dir").join("gina");

        let mut out = Vec::new();
        let err = genkey(&base, &mut out).expect_err("expected write error");
        assert_eq!(err.kind, Some(ErrorKind::Io));
        assert!(err.to_string().starts_with("cannot write public key"));
    }

    #[test]
    fn test_binary_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let base = genkey_in(&temp_dir, "bin");
        let plaintext: Vec<u8> = (0..=255).cycle().take(4096).collect();

        let armored = encrypt_to_string(&plaintext, &base);
        assert_eq!(decrypt_with(armored.as_bytes(), &base).unwrap(), plaintext);
    }

    #[test]
    fn test_empty_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let base = genkey_in(&temp_dir, "empty");

        let armored = encrypt_to_string(b"", &base);
        assert_eq!(decrypt_with(armored.as_bytes(), &base).unwrap(), b"");
    }

    #[test]
    fn test_decrypt_with_other_key_pair() {
        let temp_dir = TempDir::new().unwrap();
        let alice = genkey_in(&temp_dir, "alice");
        let bob = genkey_in(&temp_dir, "bob");

        let armored = encrypt_to_string(b"for alice only", &alice);
        let err = decrypt_with(armored.as_bytes(), &bob).expect_err("expected failure");
        assert_eq!(err.kind, Some(ErrorKind::AuthenticationFailed));
        assert_eq!(err.report(), "cannot decrypt the input with provided key pair");
    }

    #[test]
    fn test_decrypt_bad_base64_input() {
        let temp_dir = TempDir::new().unwrap();
        let base = genkey_in(&temp_dir, "helen");

        let err = decrypt_with(b"%%% not base64 %%%", &base).expect_err("expected failure");
        assert_eq!(err.kind, Some(ErrorKind::InputDecode));
        assert_eq!(err.to_string(), "cannot decode input");
    }

    #[test]
    fn test_encrypt_rejects_short_public_key() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("short");
        fs::write(keys::public_key_path(&base), armor::wrap(&[1u8; 16])).unwrap();

        let mut input = ConstantInputReader::new(b"data".to_vec());
        let mut out = Vec::new();
        let err = encrypt(&mut input, &keys::public_key_path(&base), &mut out)
            .expect_err("expected length error");
        assert_eq!(err.kind, Some(ErrorKind::KeyLength));
        assert_eq!(
            err.report(),
            "cannot decode public key: public key must be 32 bytes, got 16"
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_decrypt_rejects_long_private_key() {
        let temp_dir = TempDir::new().unwrap();
        let base = genkey_in(&temp_dir, "ivan");
        let armored = encrypt_to_string(b"x", &base);
        fs::remove_file(keys::private_key_path(&base)).unwrap();
        fs::write(keys::private_key_path(&base), armor::wrap(&[1u8; 48])).unwrap();

        let err = decrypt_with(armored.as_bytes(), &base).expect_err("expected length error");
        assert_eq!(err.kind, Some(ErrorKind::KeyLength));
    }

    #[test]
    fn test_encrypt_missing_public_key() {
        let temp_dir = TempDir::new().unwrap();
        let mut input = ConstantInputReader::new(b"data".to_vec());
        let mut out = Vec::new();

        let err = encrypt(&mut input, &temp_dir.path().join("nobody.pub"), &mut out)
            .expect_err("expected read error");
        assert_eq!(err.kind, Some(ErrorKind::Io));
        assert!(err.to_string().starts_with("cannot read public key file"));
    }

    #[test]
    fn test_tampered_message_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let base = genkey_in(&temp_dir, "judy");
        let armored = encrypt_to_string(b"integrity", &base);

        let mut sealed = armor::unwrap(armored.as_bytes(), ErrorKind::InputDecode).unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 0x01;

        let mut input = ConstantInputReader::new(armor::wrap(&sealed).into_bytes());
        let mut out = Vec::new();
        let err = decrypt(
            &mut input,
            &keys::public_key_path(&base),
            &keys::private_key_path(&base),
            &mut out,
        )
        .expect_err("expected tamper detection");
        assert_eq!(err.kind, Some(ErrorKind::AuthenticationFailed));
        assert!(out.is_empty());
    }
}
