//! Signing capability and the Ed25519 signer.

use crate::auth::AuthHeader;
use ed25519_dalek::Signer as DalekSigner;
use ed25519_dalek::{SigningKey, VerifyingKey};
use pletyvo_core::{ContentHash, CoreError, CoreResult, Scheme};
use rand_core::{OsRng, RngCore};
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::debug;
use zeroize::Zeroizing;

const SEED_LEN: usize = 32;

/// Something that owns key material and can prove authorship
///
/// Implementations are shared across tasks, so signing must only need
/// read access to the key.
pub trait Signer: Send + Sync {
    /// Scheme implemented by this signer
    fn scheme(&self) -> Scheme;

    /// Sign `message`; the length is fixed by the scheme
    fn sign(&self, message: &[u8]) -> Vec<u8>;

    /// Raw public key bytes
    fn public(&self) -> Vec<u8>;

    /// Identity: the public key tagged with the scheme
    fn hash(&self) -> ContentHash;

    /// Auth header proving `message` was signed by this signer
    fn auth(&self, message: &[u8]) -> AuthHeader {
        AuthHeader::from_signer(self.scheme(), self.public(), self.sign(message))
    }
}

/// Ed25519 keypair
///
/// The private key never leaves this struct except as signatures; it is
/// zeroed on drop by `ed25519-dalek`.
pub struct Ed25519Signer {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl Ed25519Signer {
    /// Seed length in bytes
    pub const SEED_LEN: usize = SEED_LEN;

    /// Create a signer with a fresh random keypair
    #[must_use]
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::generate(&mut OsRng))
    }

    /// Derive the keypair from raw seed bytes
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if the seed is not 32 bytes
    pub fn from_seed(seed: &[u8]) -> CoreResult<Self> {
        let seed: &[u8; SEED_LEN] = seed.try_into().map_err(|_| {
            CoreError::validation(
                "seed",
                format!("expected {} bytes, got {}", Self::SEED_LEN, seed.len()),
            )
        })?;
        Ok(Self::from_signing_key(SigningKey::from_bytes(seed)))
    }

    /// Load a raw 32-byte seed from `path`
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Io`] if the file cannot be read and
    /// [`CoreError::Validation`] if it does not hold exactly 32 bytes
    pub fn from_key_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let seed = Zeroizing::new(fs::read(path).map_err(|err| io_error(path, &err))?);
        let signer = Self::from_seed(&seed)?;
        debug!(path = %path.display(), identity = %signer.hash(), "loaded ed25519 key file");
        Ok(signer)
    }

    /// Write a fresh random seed to `path` and return its signer
    ///
    /// Refuses to overwrite an existing file. A file that could not be
    /// written completely is removed again.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Io`] if the file exists or cannot be written
    pub fn generate_key_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let mut seed = Zeroizing::new([0u8; SEED_LEN]);
        OsRng.fill_bytes(&mut *seed);

        create_key_file(path, &seed[..], |file, seed| {
            file.write_all(seed)?;
            file.sync_all()
        })?;

        let signer = Self::from_signing_key(SigningKey::from_bytes(&seed));
        debug!(path = %path.display(), identity = %signer.hash(), "wrote ed25519 key file");
        Ok(signer)
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }
}

/// Create `path` exclusively and fill it with `write`, removing it again if
/// `write` fails
fn create_key_file<W>(path: &Path, seed: &[u8], write: W) -> CoreResult<()>
where
    W: FnOnce(&mut fs::File, &[u8]) -> io::Result<()>,
{
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path).map_err(|err| io_error(path, &err))?;
    if let Err(err) = write(&mut file, seed) {
        drop(file);
        // a partial key would block every later attempt at this path
        let _ = fs::remove_file(path);
        return Err(io_error(path, &err));
    }
    Ok(())
}

fn io_error(path: &Path, err: &io::Error) -> CoreError {
    CoreError::Io {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

impl Signer for Ed25519Signer {
    fn scheme(&self) -> Scheme {
        Scheme::Ed25519
    }

    fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.signing_key.sign(message).to_bytes().to_vec()
    }

    fn public(&self) -> Vec<u8> {
        self.verifying_key.to_bytes().to_vec()
    }

    fn hash(&self) -> ContentHash {
        ContentHash::new(Scheme::Ed25519, self.verifying_key.to_bytes())
    }
}

impl fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ed25519Signer")
            .field("identity", &format_args!("{}", self.hash()))
            .finish_non_exhaustive()
    }
}
