//! Submittable, read-side and acknowledgement event shapes.
//!
//! [`EventInput::assemble`] is the one path from a payload to a signed
//! envelope: the signature always covers exactly the bytes that are sent.

use crate::auth::AuthHeader;
use crate::body::EventBody;
use crate::event_type::{DataType, EventBodyType, EventType};
use crate::signer::Signer;
use pletyvo_core::{ContentHash, CoreError, CoreResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

/// A signed envelope ready to submit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventInput {
    body: EventBody,
    auth: AuthHeader,
}

impl EventInput {
    /// Pair a body with an auth header produced elsewhere
    #[must_use]
    pub const fn new(body: EventBody, auth: AuthHeader) -> Self {
        Self { body, auth }
    }

    /// Sign `body` as it stands
    #[must_use]
    pub fn sign<S: Signer + ?Sized>(body: EventBody, signer: &S) -> Self {
        let auth = signer.auth(body.as_bytes());
        debug!(
            author = %signer.hash(),
            event_type = body.event_type().to_uint16(),
            len = body.len(),
            "signed event body"
        );
        Self { body, auth }
    }

    /// Build the envelope for `value` and sign it
    ///
    /// # Errors
    ///
    /// Returns the errors of [`EventBody::create`]
    pub fn assemble<T, S>(
        version: EventBodyType,
        data_type: DataType,
        event_type: EventType,
        parent: Option<&ContentHash>,
        value: &T,
        signer: &S,
    ) -> CoreResult<Self>
    where
        T: Serialize + ?Sized,
        S: Signer + ?Sized,
    {
        let body = EventBody::create(version, data_type, event_type, parent, value)?;
        Ok(Self::sign(body, signer))
    }

    /// Envelope
    #[must_use]
    pub const fn body(&self) -> &EventBody {
        &self.body
    }

    /// Auth header
    #[must_use]
    pub const fn auth(&self) -> &AuthHeader {
        &self.auth
    }

    /// Split into body and auth header
    #[must_use]
    pub fn into_parts(self) -> (EventBody, AuthHeader) {
        (self.body, self.auth)
    }

    /// Wire dictionary `{body, auth}`
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "body": self.body.to_text(),
            "auth": self.auth.to_value(),
        })
    }
}

/// A stored event as returned by the log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    id: Uuid,
    body: EventBody,
    auth: AuthHeader,
}

impl Event {
    /// Server-assigned id
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Envelope
    #[must_use]
    pub const fn body(&self) -> &EventBody {
        &self.body
    }

    /// Auth header
    #[must_use]
    pub const fn auth(&self) -> &AuthHeader {
        &self.auth
    }

    /// Split into id, body and auth header
    #[must_use]
    pub fn into_parts(self) -> (Uuid, EventBody, AuthHeader) {
        (self.id, self.body, self.auth)
    }

    /// Parse a server response
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Decode`] if the value does not describe an event
    pub fn from_value(value: &Value) -> CoreResult<Self> {
        decode_value(value, "event")
    }
}

/// Id and content hash of a stored event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventHeader {
    id: Uuid,
    #[serde(rename = "author", alias = "hash")]
    hash: ContentHash,
}

impl EventHeader {
    /// Server-assigned id
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Content hash, sent by the server under `author`
    #[must_use]
    pub const fn hash(&self) -> ContentHash {
        self.hash
    }

    /// Parse a server response
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Decode`] if the value does not describe a header
    pub fn from_value(value: &Value) -> CoreResult<Self> {
        decode_value(value, "event header")
    }
}

/// Acknowledgement of a submitted event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventResponse {
    id: Uuid,
}

impl EventResponse {
    /// Id the server assigned
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Parse a server response
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Decode`] if the value has no valid `id`
    pub fn from_value(value: &Value) -> CoreResult<Self> {
        decode_value(value, "event response")
    }
}

fn decode_value<T: DeserializeOwned>(value: &Value, what: &str) -> CoreResult<T> {
    T::deserialize(value).map_err(|err| CoreError::decode(format!("invalid {what}: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::Ed25519Signer;
    use ed25519_dalek::{Signature, Verifier, VerifyingKey};
    use pletyvo_core::Scheme;
    use serde_json::json;

    fn signer() -> Ed25519Signer {
        Ed25519Signer::from_seed(&[42u8; 32]).unwrap()
    }

    #[test]
    fn test_assemble_signs_transmitted_bytes() {
        let signer = signer();
        let input = EventInput::assemble(
            EventBodyType::Basic,
            DataType::Json,
            EventType::new(1, 1),
            None,
            &json!({ "name": "general" }),
            &signer,
        )
        .unwrap();

        let public: [u8; 32] = input.auth().public().try_into().unwrap();
        let key = VerifyingKey::from_bytes(&public).unwrap();
        let sig = Signature::from_slice(input.auth().signature()).unwrap();

        // what goes over the wire is what was signed
        let wire = input.to_value();
        let sent = EventBody::from_text(wire["body"].as_str().unwrap()).unwrap();
        assert!(key.verify(sent.as_bytes(), &sig).is_ok());

        let mut flipped = sent.to_bytes();
        let last = flipped.len() - 1;
        flipped[last] ^= 0x80;
        assert!(key.verify(&flipped, &sig).is_err());
    }

    #[test]
    fn test_assemble_linked() {
        let parent = ContentHash::new(Scheme::Ed25519, [3u8; 32]);
        let input = EventInput::assemble(
            EventBodyType::Linked,
            DataType::Json,
            EventType::new(1, 2),
            Some(&parent),
            &json!({ "name": "renamed" }),
            &signer(),
        )
        .unwrap();
        assert_eq!(input.body().parent().unwrap(), parent);
    }

    #[test]
    fn test_assemble_propagates_body_errors() {
        let result = EventInput::assemble(
            EventBodyType::Linked,
            DataType::Json,
            EventType::new(1, 2),
            None,
            &json!({}),
            &signer(),
        );
        assert!(matches!(result, Err(CoreError::Validation { .. })));
    }

    #[test]
    fn test_input_wire_shape() {
        let signer = signer();
        let body = EventBody::basic(DataType::Json, EventType::new(1, 1), &json!({ "a": 1 })).unwrap();
        let input = EventInput::sign(body.clone(), &signer);
        let wire = input.to_value();

        assert_eq!(wire["body"], json!(body.to_text()));
        assert_eq!(wire["auth"]["scheme"], json!(1));
        assert_eq!(serde_json::to_value(&input).unwrap(), wire);

        let (restored_body, auth) = input.into_parts();
        assert_eq!(restored_body, body);
        assert_eq!(auth.public(), signer.public().as_slice());
    }

    #[test]
    fn test_event_from_value() {
        let signer = signer();
        let input = EventInput::sign(
            EventBody::basic(DataType::Json, EventType::new(1, 1), &json!({ "x": true })).unwrap(),
            &signer,
        );
        let id = Uuid::new_v4();
        let value = json!({
            "id": id.to_string(),
            "body": input.body().to_text(),
            "auth": input.auth().to_value(),
        });

        let event = Event::from_value(&value).unwrap();
        assert_eq!(event.id(), id);
        assert_eq!(event.body(), input.body());
        assert_eq!(event.auth(), input.auth());

        let (event_id, body, auth) = event.into_parts();
        assert_eq!(event_id, id);
        assert_eq!((&body, &auth), (input.body(), input.auth()));
    }

    #[test]
    fn test_event_header_reads_author_key() {
        let hash = signer().hash();
        let id = Uuid::new_v4();

        let header = EventHeader::from_value(&json!({ "id": id, "author": hash.to_text() })).unwrap();
        assert_eq!(header.id(), id);
        assert_eq!(header.hash(), hash);

        let header = EventHeader::from_value(&json!({ "id": id, "hash": hash.to_text() })).unwrap();
        assert_eq!(header.hash(), hash);
    }

    #[test]
    fn test_event_response() {
        let id = Uuid::new_v4();
        let response = EventResponse::from_value(&json!({ "id": id })).unwrap();
        assert_eq!(response.id(), id);

        assert!(matches!(
            EventResponse::from_value(&json!({ "id": "not-a-uuid" })),
            Err(CoreError::Decode { .. })
        ));
        assert!(EventResponse::from_value(&json!({})).is_err());
    }

    #[test]
    fn test_event_rejects_bad_body_text() {
        let value = json!({
            "id": Uuid::new_v4(),
            "body": "!!",
            "auth": signer().auth(b"x").to_value(),
        });
        assert!(matches!(Event::from_value(&value), Err(CoreError::Decode { .. })));
    }
}
