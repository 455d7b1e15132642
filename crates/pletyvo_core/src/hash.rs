//! Scheme-tagged content hashes.
//!
//! A [`ContentHash`] identifies a signer's public key (or any other content)
//! by scheme and digest. Binary form is `scheme || digest`; text form is the
//! unpadded base64url encoding of the binary form.

use crate::error::{CoreError, CoreResult};
use crate::text;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Digest length of every currently defined scheme
pub const DIGEST_LEN: usize = 32;

/// Signing/hashing scheme identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum Scheme {
    /// Ed25519 public keys and signatures
    #[default]
    Ed25519 = 1,
}

impl Scheme {
    /// Wire octet for this scheme
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Parse the wire octet
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] for undefined schemes
    pub fn from_u8(value: u8) -> CoreResult<Self> {
        match value {
            1 => Ok(Self::Ed25519),
            other => Err(CoreError::validation(
                "scheme",
                format!("unsupported scheme {other}"),
            )),
        }
    }

    /// Digest length carried by a [`ContentHash`] of this scheme
    #[must_use]
    pub const fn digest_len(self) -> usize {
        match self {
            Self::Ed25519 => DIGEST_LEN,
        }
    }

    /// Raw public key length
    #[must_use]
    pub const fn public_key_len(self) -> usize {
        match self {
            Self::Ed25519 => 32,
        }
    }

    /// Raw signature length
    #[must_use]
    pub const fn signature_len(self) -> usize {
        match self {
            Self::Ed25519 => 64,
        }
    }
}

impl TryFrom<u8> for Scheme {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ed25519 => write!(f, "ed25519"),
        }
    }
}

impl Serialize for Scheme {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for Scheme {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u8::deserialize(deserializer)?;
        Self::from_u8(value).map_err(serde::de::Error::custom)
    }
}

/// A scheme-tagged digest, usable as an author or event identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash {
    scheme: Scheme,
    digest: [u8; DIGEST_LEN],
}

impl ContentHash {
    /// Length of the binary form (`scheme || digest`)
    pub const LEN: usize = 1 + DIGEST_LEN;

    /// Create from an already sized digest
    #[must_use]
    pub const fn new(scheme: Scheme, digest: [u8; DIGEST_LEN]) -> Self {
        Self { scheme, digest }
    }

    /// Create from a raw scheme octet and digest bytes
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if the scheme is unknown or the
    /// digest length does not match it
    pub fn from_parts(scheme: u8, digest: &[u8]) -> CoreResult<Self> {
        let scheme = Scheme::from_u8(scheme)?;
        let digest: [u8; DIGEST_LEN] = digest.try_into().map_err(|_| {
            CoreError::validation(
                "digest",
                format!(
                    "expected {} bytes for {}, got {}",
                    scheme.digest_len(),
                    scheme,
                    digest.len()
                ),
            )
        })?;
        Ok(Self { scheme, digest })
    }

    /// Parse the binary form
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Decode`] on a wrong total length and
    /// [`CoreError::Validation`] on an unknown scheme
    pub fn decode(bytes: &[u8]) -> CoreResult<Self> {
        if bytes.len() != Self::LEN {
            return Err(CoreError::decode(format!(
                "content hash must be {} bytes, got {}",
                Self::LEN,
                bytes.len()
            )));
        }
        Self::from_parts(bytes[0], &bytes[1..])
    }

    /// Parse the text form
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Decode`] on malformed base64url or a wrong length
    pub fn from_text(s: &str) -> CoreResult<Self> {
        Self::decode(&text::decode(s)?)
    }

    /// Encode as unpadded base64url text
    #[must_use]
    pub fn to_text(&self) -> String {
        text::encode(&self.to_bytes())
    }

    /// Binary form: `scheme || digest`
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[0] = self.scheme.as_u8();
        out[1..].copy_from_slice(&self.digest);
        out
    }

    /// Scheme of this hash
    #[must_use]
    pub const fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Digest bytes without the scheme octet
    #[must_use]
    pub const fn digest(&self) -> &[u8; DIGEST_LEN] {
        &self.digest
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl FromStr for ContentHash {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_text())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_text(&s).map_err(serde::de::Error::custom)
    }
}
