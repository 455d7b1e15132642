//! Authentication header: who signed an envelope, and the signature.

use pletyvo_core::{CoreError, CoreResult, Scheme, text};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Scheme, public key and signature over an envelope's exact bytes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "AuthHeaderWire", into = "AuthHeaderWire")]
pub struct AuthHeader {
    scheme: Scheme,
    public: Vec<u8>,
    signature: Vec<u8>,
}

impl AuthHeader {
    /// Assemble from raw parts received off the wire
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if the scheme is unknown or a length
    /// does not match it
    pub fn from_parts(scheme: u8, public: &[u8], signature: &[u8]) -> CoreResult<Self> {
        let scheme = Scheme::from_u8(scheme)?;
        if public.len() != scheme.public_key_len() {
            return Err(CoreError::validation(
                "pub",
                format!(
                    "expected {} bytes for {scheme}, got {}",
                    scheme.public_key_len(),
                    public.len()
                ),
            ));
        }
        if signature.len() != scheme.signature_len() {
            return Err(CoreError::validation(
                "sig",
                format!(
                    "expected {} bytes for {scheme}, got {}",
                    scheme.signature_len(),
                    signature.len()
                ),
            ));
        }
        Ok(Self {
            scheme,
            public: public.to_vec(),
            signature: signature.to_vec(),
        })
    }

    /// Signers produce correctly sized parts by construction
    pub(crate) fn from_signer(scheme: Scheme, public: Vec<u8>, signature: Vec<u8>) -> Self {
        debug_assert_eq!(public.len(), scheme.public_key_len());
        debug_assert_eq!(signature.len(), scheme.signature_len());
        Self {
            scheme,
            public,
            signature,
        }
    }

    /// Signing scheme
    #[must_use]
    pub const fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Raw public key
    #[must_use]
    pub fn public(&self) -> &[u8] {
        &self.public
    }

    /// Raw signature
    #[must_use]
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Wire dictionary `{scheme, pub, sig}`
    #[must_use]
    pub fn to_value(&self) -> Value {
        json!(AuthHeaderWire::from(self))
    }

    /// Parse the wire dictionary
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Decode`] if a key is missing or mistyped, the
    /// text is not base64url, or a length does not match the scheme
    pub fn from_value(value: &Value) -> CoreResult<Self> {
        Self::deserialize(value)
            .map_err(|err| CoreError::decode(format!("invalid auth header: {err}")))
    }
}

/// Serde shape of [`AuthHeader`]
#[derive(Serialize, Deserialize)]
struct AuthHeaderWire {
    scheme: u8,
    #[serde(rename = "pub")]
    public: String,
    #[serde(rename = "sig")]
    signature: String,
}

impl From<AuthHeader> for AuthHeaderWire {
    fn from(auth: AuthHeader) -> Self {
        Self::from(&auth)
    }
}

impl From<&AuthHeader> for AuthHeaderWire {
    fn from(auth: &AuthHeader) -> Self {
        Self {
            scheme: auth.scheme.as_u8(),
            public: text::encode(&auth.public),
            signature: text::encode(&auth.signature),
        }
    }
}

impl TryFrom<AuthHeaderWire> for AuthHeader {
    type Error = CoreError;

    fn try_from(wire: AuthHeaderWire) -> Result<Self, Self::Error> {
        let public = text::decode(&wire.public)?;
        let signature = text::decode(&wire.signature)?;
        Self::from_parts(wire.scheme, &public, &signature)
    }
}
