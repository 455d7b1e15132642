//! Binary event envelope.
//!
//! Layout, fixed per version:
//!
//! | offset | size | field |
//! |---|---|---|
//! | 0 | 1 | version ([`EventBodyType`]) |
//! | 1 | 1 | data type ([`DataType`]) |
//! | 2 | 2 | event type ([`EventType`], big-endian) |
//! | 4 | 32 | parent digest, linked bodies only |
//! | 4 or 36 | rest | payload |
//!
//! The buffer is sized once at construction and never resized. Field
//! accessors decode lazily, so a body read off the wire is only validated
//! as far as the caller looks into it.

use crate::event_type::{DataType, EventBodyType, EventType};
use pletyvo_core::{ContentHash, CoreError, CoreResult, DIGEST_LEN, Scheme, text};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use tracing::debug;

/// Smallest valid envelope: version, data type, event type
pub const MIN_BODY_LEN: usize = 4;

const VERSION_OFFSET: usize = 0;
const DATA_TYPE_OFFSET: usize = 1;
const EVENT_TYPE_RANGE: Range<usize> = 2..4;
const PARENT_RANGE: Range<usize> = 4..4 + DIGEST_LEN;

/// Scheme reported for parent links; the wire carries the digest only.
const PARENT_SCHEME: Scheme = Scheme::Ed25519;

/// Decoded fixed header fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyHeader {
    /// Envelope version
    pub version: EventBodyType,
    /// Payload data type
    pub data_type: DataType,
    /// Event discriminator
    pub event_type: EventType,
}

/// Typed view of an envelope; the parent only exists on linked bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyLayout<'a> {
    /// No parent link
    Basic {
        /// Fixed header
        header: BodyHeader,
        /// Payload bytes
        payload: &'a [u8],
    },
    /// Parent-linked body
    Linked {
        /// Fixed header
        header: BodyHeader,
        /// Previous event in the chain
        parent: ContentHash,
        /// Payload bytes
        payload: &'a [u8],
    },
}

impl<'a> BodyLayout<'a> {
    /// Fixed header
    #[must_use]
    pub const fn header(&self) -> &BodyHeader {
        match self {
            Self::Basic { header, .. } | Self::Linked { header, .. } => header,
        }
    }

    /// Payload bytes
    #[must_use]
    pub const fn payload(&self) -> &'a [u8] {
        match self {
            Self::Basic { payload, .. } | Self::Linked { payload, .. } => *payload,
        }
    }

    /// Parent link, if any
    #[must_use]
    pub const fn parent(&self) -> Option<ContentHash> {
        match self {
            Self::Basic { .. } => None,
            Self::Linked { parent, .. } => Some(*parent),
        }
    }
}

/// A versioned event envelope owning its byte buffer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventBody {
    buf: Box<[u8]>,
}

impl EventBody {
    /// Build an envelope around `value` serialized as minified JSON
    ///
    /// Linked bodies take their parent here so no body ever exists with an
    /// unset parent field.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if the payload cannot be serialized,
    /// if a linked body has no parent, or if a basic body is given one
    pub fn create<T>(
        version: EventBodyType,
        data_type: DataType,
        event_type: EventType,
        parent: Option<&ContentHash>,
        value: &T,
    ) -> CoreResult<Self>
    where
        T: Serialize + ?Sized,
    {
        match (version, parent) {
            (EventBodyType::Basic, Some(_)) => {
                return Err(CoreError::validation(
                    "parent",
                    "basic bodies carry no parent link",
                ));
            }
            (EventBodyType::Linked, None) => {
                return Err(CoreError::validation(
                    "parent",
                    "linked bodies require a parent hash",
                ));
            }
            _ => {}
        }

        let data = match data_type {
            DataType::Json => serde_json::to_vec(value)?,
        };

        let header_size = version.header_size();
        let mut buf = vec![0u8; header_size + data.len()];
        buf[VERSION_OFFSET] = version.as_u8();
        buf[DATA_TYPE_OFFSET] = data_type.as_u8();
        buf[EVENT_TYPE_RANGE].copy_from_slice(&event_type.to_bytes());
        if let Some(parent) = parent {
            buf[PARENT_RANGE].copy_from_slice(parent.digest());
        }
        buf[header_size..].copy_from_slice(&data);

        debug!(
            version = ?version,
            event_type = event_type.to_uint16(),
            len = buf.len(),
            "created event body"
        );

        Ok(Self {
            buf: buf.into_boxed_slice(),
        })
    }

    /// Build a basic (unlinked) envelope
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if the payload cannot be serialized
    pub fn basic<T>(data_type: DataType, event_type: EventType, value: &T) -> CoreResult<Self>
    where
        T: Serialize + ?Sized,
    {
        Self::create(EventBodyType::Basic, data_type, event_type, None, value)
    }

    /// Build a linked envelope pointing at `parent`
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if the payload cannot be serialized
    pub fn linked<T>(
        data_type: DataType,
        event_type: EventType,
        parent: &ContentHash,
        value: &T,
    ) -> CoreResult<Self>
    where
        T: Serialize + ?Sized,
    {
        Self::create(
            EventBodyType::Linked,
            data_type,
            event_type,
            Some(parent),
            value,
        )
    }

    /// Wrap wire bytes
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if shorter than [`MIN_BODY_LEN`]
    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        Self::from_vec(bytes.to_vec())
    }

    /// Wrap an owned wire buffer without copying
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if shorter than [`MIN_BODY_LEN`]
    pub fn from_vec(bytes: Vec<u8>) -> CoreResult<Self> {
        if bytes.len() < MIN_BODY_LEN {
            return Err(CoreError::validation(
                "event_body",
                format!(
                    "must be at least {MIN_BODY_LEN} bytes long, got {}",
                    bytes.len()
                ),
            ));
        }
        Ok(Self {
            buf: bytes.into_boxed_slice(),
        })
    }

    /// Parse the base64url text form
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Decode`] on malformed text and
    /// [`CoreError::Validation`] if the decoded buffer is too short
    pub fn from_text(s: &str) -> CoreResult<Self> {
        Self::from_vec(text::decode(s)?)
    }

    /// Unpadded base64url text form
    #[must_use]
    pub fn to_text(&self) -> String {
        text::encode(&self.buf)
    }

    /// Wire bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Owned copy of the wire bytes
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.buf.to_vec()
    }

    /// Total buffer length
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty; never true for a constructed body
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Version octet as stored, without validation
    #[must_use]
    pub fn raw_version(&self) -> u8 {
        self.buf[VERSION_OFFSET]
    }

    /// Envelope version
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if the octet is not a declared version
    pub fn version(&self) -> CoreResult<EventBodyType> {
        EventBodyType::from_u8(self.raw_version())
    }

    /// Payload data type
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if the octet is not a known data type
    pub fn data_type(&self) -> CoreResult<DataType> {
        DataType::from_u8(self.buf[DATA_TYPE_OFFSET])
    }

    /// Event type, decoded on every call
    #[must_use]
    pub fn event_type(&self) -> EventType {
        EventType::new(self.buf[EVENT_TYPE_RANGE.start], self.buf[EVENT_TYPE_RANGE.start + 1])
    }

    /// All fixed header fields
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if version or data type is unknown
    pub fn header(&self) -> CoreResult<BodyHeader> {
        Ok(BodyHeader {
            version: self.version()?,
            data_type: self.data_type()?,
            event_type: self.event_type(),
        })
    }

    /// Bytes following the version-specific header
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] on an unknown version and
    /// [`CoreError::Decode`] if a linked body is shorter than its header
    pub fn payload(&self) -> CoreResult<&[u8]> {
        let version = self.version()?;
        self.buf
            .get(version.header_size()..)
            .ok_or_else(|| truncated(version, self.buf.len()))
    }

    /// Parent link of a linked body
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::State`] unless the body is linked
    pub fn parent(&self) -> CoreResult<ContentHash> {
        self.require_linked()?;
        let digest: [u8; DIGEST_LEN] = self
            .buf
            .get(PARENT_RANGE)
            .and_then(|slice| slice.try_into().ok())
            .ok_or_else(|| truncated(EventBodyType::Linked, self.buf.len()))?;
        Ok(ContentHash::new(PARENT_SCHEME, digest))
    }

    /// Overwrite the parent link of a linked body
    ///
    /// Only the digest is stored; the scheme is implicit.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::State`] unless the body is linked
    pub fn set_parent(&mut self, hash: &ContentHash) -> CoreResult<()> {
        self.require_linked()?;
        let len = self.buf.len();
        let field = self
            .buf
            .get_mut(PARENT_RANGE)
            .ok_or_else(|| truncated(EventBodyType::Linked, len))?;
        field.copy_from_slice(hash.digest());
        Ok(())
    }

    /// Overwrite the data type octet
    pub fn set_data_type(&mut self, data_type: DataType) {
        self.buf[DATA_TYPE_OFFSET] = data_type.as_u8();
    }

    /// Overwrite the event type field
    pub fn set_event_type(&mut self, event_type: EventType) {
        self.buf[EVENT_TYPE_RANGE].copy_from_slice(&event_type.to_bytes());
    }

    /// Fully decoded typed view
    ///
    /// # Errors
    ///
    /// Returns the first error any field accessor would return
    pub fn layout(&self) -> CoreResult<BodyLayout<'_>> {
        let header = self.header()?;
        let payload = self.payload()?;
        Ok(match header.version {
            EventBodyType::Basic => BodyLayout::Basic { header, payload },
            EventBodyType::Linked => BodyLayout::Linked {
                header,
                parent: self.parent()?,
                payload,
            },
        })
    }

    fn require_linked(&self) -> CoreResult<()> {
        match self.version() {
            Ok(EventBodyType::Linked) => Ok(()),
            _ => Err(CoreError::state(format!(
                "parent link requires a linked body, found version {}",
                self.raw_version()
            ))),
        }
    }
}

fn truncated(version: EventBodyType, len: usize) -> CoreError {
    CoreError::decode(format!(
        "{version:?} body needs at least {} bytes, got {len}",
        version.header_size()
    ))
}

impl AsRef<[u8]> for EventBody {
    fn as_ref(&self) -> &[u8] {
        &self.buf
    }
}

impl fmt::Display for EventBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl FromStr for EventBody {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

impl Serialize for EventBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_text())
    }
}

impl<'de> Deserialize<'de> for EventBody {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_text(&s).map_err(serde::de::Error::custom)
    }
}
