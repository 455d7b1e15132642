//! Parent-linked chain of one author's events.
//!
//! The first event of a chain is a basic body; every later one is a linked
//! body whose parent is the hash of the event before it.

use crate::body::EventBody;
use crate::event::EventInput;
use crate::event_type::{DataType, EventBodyType, EventType};
use crate::signer::Signer;
use pletyvo_core::{ContentHash, CoreError, CoreResult};
use serde::Serialize;
use tracing::debug;

/// Tip tracker producing correctly linked envelopes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventChain {
    tip: Option<ContentHash>,
    data_type: DataType,
    length: u64,
}

impl EventChain {
    /// Create an empty chain
    #[must_use]
    pub fn new() -> Self {
        Self {
            tip: None,
            data_type: DataType::default(),
            length: 0,
        }
    }

    /// Resume a chain of `length` events whose last one hashes to `tip`
    ///
    /// A zero length is raised to one: a chain with a tip holds at least
    /// that event.
    #[must_use]
    pub fn with_tip(tip: ContentHash, length: u64) -> Self {
        Self {
            tip: Some(tip),
            data_type: DataType::default(),
            length: length.max(1),
        }
    }

    /// Data type used for new bodies
    #[must_use]
    pub const fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    /// Hash of the latest acknowledged event
    #[must_use]
    pub const fn tip(&self) -> Option<ContentHash> {
        self.tip
    }

    /// Number of events acknowledged into this chain
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.length
    }

    /// Check if nothing has been acknowledged yet
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tip.is_none()
    }

    /// Envelope for the next event
    ///
    /// # Errors
    ///
    /// Returns the errors of [`EventBody::create`]
    pub fn next_body<T>(&self, event_type: EventType, value: &T) -> CoreResult<EventBody>
    where
        T: Serialize + ?Sized,
    {
        match &self.tip {
            None => EventBody::basic(self.data_type, event_type, value),
            Some(parent) => EventBody::linked(self.data_type, event_type, parent, value),
        }
    }

    /// Signed input for the next event
    ///
    /// # Errors
    ///
    /// Returns the errors of [`EventBody::create`]
    pub fn next_input<T, S>(
        &self,
        event_type: EventType,
        value: &T,
        signer: &S,
    ) -> CoreResult<EventInput>
    where
        T: Serialize + ?Sized,
        S: Signer + ?Sized,
    {
        let body = self.next_body(event_type, value)?;
        Ok(EventInput::sign(body, signer))
    }

    /// Check that `body` extends the current tip
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if the version octet is not a
    /// declared version, [`CoreError::Decode`] if a linked body is truncated
    /// and [`CoreError::State`] if the body would fork or restart the chain
    pub fn check_link(&self, body: &EventBody) -> CoreResult<()> {
        let parent = match body.version()? {
            EventBodyType::Basic => None,
            EventBodyType::Linked => Some(body.parent()?),
        };
        if parent == self.tip {
            return Ok(());
        }
        Err(CoreError::state(format!(
            "broken chain at position {}: tip {}, body parent {}",
            self.length,
            describe(self.tip.as_ref()),
            describe(parent.as_ref()),
        )))
    }

    /// Move the tip to the hash the log assigned to the latest event
    pub fn advance(&mut self, hash: ContentHash) {
        debug!(position = self.length, tip = %hash, "advanced event chain");
        self.tip = Some(hash);
        self.length += 1;
    }
}

fn describe(hash: Option<&ContentHash>) -> String {
    hash.map_or_else(|| "none".to_string(), ContentHash::to_text)
}

impl Default for EventChain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::Ed25519Signer;
    use pletyvo_core::Scheme;
    use serde_json::json;

    fn hash(byte: u8) -> ContentHash {
        ContentHash::new(Scheme::Ed25519, [byte; 32])
    }

    #[test]
    fn test_first_body_is_basic() {
        let chain = EventChain::new();
        assert!(chain.is_empty());
        let body = chain.next_body(EventType::new(1, 1), &json!({ "n": 0 })).unwrap();
        assert_eq!(body.version().unwrap(), EventBodyType::Basic);
        assert!(chain.check_link(&body).is_ok());
    }

    #[test]
    fn test_later_bodies_link_to_tip() {
        let mut chain = EventChain::new();
        chain.advance(hash(1));
        chain.advance(hash(2));
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.tip(), Some(hash(2)));

        let body = chain.next_body(EventType::new(1, 1), &json!({ "n": 2 })).unwrap();
        assert_eq!(body.version().unwrap(), EventBodyType::Linked);
        assert_eq!(body.parent().unwrap(), hash(2));
        assert!(chain.check_link(&body).is_ok());
    }

    #[test]
    fn test_check_link_rejects_fork() {
        let chain = EventChain::with_tip(hash(9), 3);
        let stale = EventBody::linked(DataType::Json, EventType::new(1, 1), &hash(8), &json!(1)).unwrap();
        assert!(matches!(chain.check_link(&stale), Err(CoreError::State { .. })));

        let restart = EventBody::basic(DataType::Json, EventType::new(1, 1), &json!(1)).unwrap();
        assert!(matches!(chain.check_link(&restart), Err(CoreError::State { .. })));
    }

    #[test]
    fn test_check_link_rejects_parent_on_empty_chain() {
        let chain = EventChain::new();
        let body = EventBody::linked(DataType::Json, EventType::new(1, 1), &hash(1), &json!(1)).unwrap();
        assert!(matches!(chain.check_link(&body), Err(CoreError::State { .. })));
    }

    #[test]
    fn test_check_link_rejects_undeclared_versions() {
        let chain = EventChain::new();
        for version in [0xFF, EventBodyType::MAX, 0] {
            let body = EventBody::from_bytes(&[version, 1, 1, 1, b'{', b'}']).unwrap();
            assert!(matches!(
                chain.check_link(&body),
                Err(CoreError::Validation { field, .. }) if field == "version"
            ));
        }

        let resumed = EventChain::with_tip(hash(1), 5);
        let garbage = EventBody::from_bytes(&[EventBodyType::MAX, 9, 1, 1]).unwrap();
        assert!(matches!(resumed.check_link(&garbage), Err(CoreError::Validation { .. })));
    }

    #[test]
    fn test_check_link_reports_truncated_linked_body() {
        let chain = EventChain::with_tip(hash(1), 1);
        let body = EventBody::from_bytes(&[2, 1, 1, 1, 0, 0]).unwrap();
        assert!(matches!(chain.check_link(&body), Err(CoreError::Decode { .. })));
    }

    #[test]
    fn test_with_tip_keeps_position() {
        let mut chain = EventChain::with_tip(hash(1), 41);
        assert_eq!(chain.len(), 41);
        chain.advance(hash(2));
        assert_eq!(chain.len(), 42);
        assert_eq!(EventChain::with_tip(hash(1), 0).len(), 1);
    }

    #[test]
    fn test_next_input_is_signed_by_signer() {
        let signer = Ed25519Signer::from_seed(&[5u8; 32]).unwrap();
        let chain = EventChain::with_tip(hash(4), 1);
        let input = chain.next_input(EventType::new(2, 1), &json!({ "k": "v" }), &signer).unwrap();
        assert_eq!(input.body().parent().unwrap(), hash(4));
        assert_eq!(input.auth().public(), signer.public().as_slice());
    }
}
