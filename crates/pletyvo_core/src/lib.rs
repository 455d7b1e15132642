//! Pletyvo Core Types
//!
//! Pure values with no I/O: scheme-tagged content hashes, the error type
//! shared by every crate, and the base64url text form used on the wire.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod hash;
pub mod text;

// Re-exports
pub use error::{CoreError, CoreResult};
pub use hash::{ContentHash, DIGEST_LEN, Scheme};
