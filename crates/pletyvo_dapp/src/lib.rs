//! Pletyvo dApp Protocol
//!
//! Signed, versioned, optionally parent-linked event envelopes. An envelope
//! is built from a payload, signed by a [`Signer`], and submitted as an
//! [`EventInput`]; the log answers with an [`EventResponse`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod body;
pub mod chain;
pub mod event;
pub mod event_type;
pub mod signer;

pub use auth::AuthHeader;
pub use body::{BodyHeader, BodyLayout, EventBody, MIN_BODY_LEN};
pub use chain::EventChain;
pub use event::{Event, EventHeader, EventInput, EventResponse};
pub use event_type::{DataType, EventBodyType, EventType};
pub use signer::{Ed25519Signer, Signer};

pub use pletyvo_core::{ContentHash, CoreError, CoreResult, Scheme};
