//! Pletyvo Client
//!
//! dApp event services: fetch stored events, look events up by hash and
//! submit signed envelopes. The network itself sits behind [`Transport`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dapp;
pub mod error;
pub mod transport;

pub use dapp::{DappService, EventService, HashService};
pub use error::{ClientError, ClientResult};
pub use transport::Transport;
