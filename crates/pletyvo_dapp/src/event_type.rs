//! Discriminators written into the envelope header.

use pletyvo_core::{CoreError, CoreResult};

/// Event type - two octets (major, minor), big-endian on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct EventType {
    major: u8,
    minor: u8,
}

impl EventType {
    /// Encoded length in bytes
    pub const LEN: usize = 2;

    /// Create from octets
    #[must_use]
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// Create from unchecked integers
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if either part exceeds 255
    pub fn try_new(major: u32, minor: u32) -> CoreResult<Self> {
        let major = u8::try_from(major)
            .map_err(|_| CoreError::validation("event_type.major", format!("{major} exceeds 255")))?;
        let minor = u8::try_from(minor)
            .map_err(|_| CoreError::validation("event_type.minor", format!("{minor} exceeds 255")))?;
        Ok(Self { major, minor })
    }

    /// Split a 16-bit value into `(value >> 8, value & 0xFF)`
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if the value is outside `0..=65535`
    pub fn from_uint16(value: i64) -> CoreResult<Self> {
        let value = u16::try_from(value).map_err(|_| {
            CoreError::validation("event_type", "must be a 16-bit unsigned integer")
        })?;
        Ok(Self::from(value))
    }

    /// Combined 16-bit value: `major << 8 | minor`
    #[must_use]
    pub const fn to_uint16(self) -> u16 {
        ((self.major as u16) << 8) | self.minor as u16
    }

    /// Parse exactly two bytes
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] for any other length
    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        match bytes {
            [major, minor] => Ok(Self::new(*major, *minor)),
            _ => Err(CoreError::validation(
                "event_type",
                format!("must be exactly 2 bytes, got {}", bytes.len()),
            )),
        }
    }

    /// Wire form `[major, minor]`
    #[must_use]
    pub const fn to_bytes(self) -> [u8; Self::LEN] {
        [self.major, self.minor]
    }

    /// Major octet
    #[must_use]
    pub const fn major(self) -> u8 {
        self.major
    }

    /// Minor octet
    #[must_use]
    pub const fn minor(self) -> u8 {
        self.minor
    }
}

impl From<u16> for EventType {
    fn from(value: u16) -> Self {
        let [major, minor] = value.to_be_bytes();
        Self { major, minor }
    }
}

impl From<EventType> for u16 {
    fn from(event_type: EventType) -> Self {
        event_type.to_uint16()
    }
}

/// Payload data type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum DataType {
    /// Minified UTF-8 JSON
    #[default]
    Json = 1,
}

impl DataType {
    /// Wire octet
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Parse the wire octet
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] for unrecognized data types
    pub fn from_u8(value: u8) -> CoreResult<Self> {
        match value {
            1 => Ok(Self::Json),
            other => Err(CoreError::validation(
                "data_type",
                format!("unsupported data type {other}"),
            )),
        }
    }
}

impl TryFrom<u8> for DataType {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value)
    }
}

/// Envelope version tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventBodyType {
    /// Header and payload only
    Basic = 1,
    /// Header, 32-byte parent digest, payload
    Linked = 2,
}

impl EventBodyType {
    /// Upper sentinel; never a valid version
    pub const MAX: u8 = 3;

    /// Wire octet
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Parse the wire octet
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] for values outside `1..MAX`
    pub fn from_u8(value: u8) -> CoreResult<Self> {
        match value {
            1 => Ok(Self::Basic),
            2 => Ok(Self::Linked),
            other => Err(CoreError::validation(
                "version",
                format!("unsupported event body version {other} (expected 1..{})", Self::MAX),
            )),
        }
    }

    /// Size of the fixed region preceding the payload
    #[must_use]
    pub const fn header_size(self) -> usize {
        match self {
            Self::Basic => 4,
            Self::Linked => 36,
        }
    }
}

impl TryFrom<u8> for EventBodyType {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value)
    }
}
