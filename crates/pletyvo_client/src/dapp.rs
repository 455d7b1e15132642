//! dApp event services.

use crate::error::{ClientError, ClientResult};
use crate::transport::Transport;
use pletyvo_core::{ContentHash, CoreResult};
use pletyvo_dapp::{
    DataType, Event, EventBodyType, EventChain, EventInput, EventResponse, EventType, Signer,
};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

const EVENTS_PATH: &str = "/api/dapp/v1/events";
const HASH_PATH: &str = "/api/dapp/v1/hash";

/// Lookup of stored events by content hash
#[derive(Clone)]
pub struct HashService {
    transport: Arc<dyn Transport>,
}

impl HashService {
    /// Create a service over `transport`
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Resolve the event whose content hash is `hash`
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the reply has no valid `id`
    pub async fn get_by_id(&self, hash: &ContentHash) -> ClientResult<EventResponse> {
        let path = format!("{HASH_PATH}/{hash}");
        let reply = self.transport.get(&path).await?;
        parse_reply(&path, EventResponse::from_value(&reply))
    }
}

/// Reading and submitting events
#[derive(Clone)]
pub struct EventService {
    transport: Arc<dyn Transport>,
    signer: Arc<dyn Signer>,
}

impl EventService {
    /// Create a service that signs with `signer`
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, signer: Arc<dyn Signer>) -> Self {
        Self { transport, signer }
    }

    /// Identity of the signer used by [`EventService::publish`]
    #[must_use]
    pub fn author(&self) -> ContentHash {
        self.signer.hash()
    }

    /// List stored events
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or any element is not an event
    pub async fn list(&self) -> ClientResult<Vec<Event>> {
        let reply = self.transport.get(EVENTS_PATH).await?;
        let Value::Array(items) = reply else {
            warn!(path = EVENTS_PATH, "event list reply is not an array");
            return Err(ClientError::invalid_response(format!(
                "{EVENTS_PATH}: expected an array of events"
            )));
        };
        items
            .iter()
            .map(|item| parse_reply(EVENTS_PATH, Event::from_value(item)))
            .collect()
    }

    /// Fetch one stored event
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the reply is not an event
    pub async fn get_by_id(&self, id: Uuid) -> ClientResult<Event> {
        let path = format!("{EVENTS_PATH}/{id}");
        let reply = self.transport.get(&path).await?;
        parse_reply(&path, Event::from_value(&reply))
    }

    /// Submit an already signed envelope
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the reply has no valid `id`
    pub async fn create(&self, input: &EventInput) -> ClientResult<EventResponse> {
        debug!(
            event_type = input.body().event_type().to_uint16(),
            len = input.body().len(),
            "submitting event"
        );
        let reply = self.transport.post(EVENTS_PATH, input.to_value()).await?;
        let response = parse_reply(EVENTS_PATH, EventResponse::from_value(&reply))?;
        debug!(id = %response.id(), "event accepted");
        Ok(response)
    }

    /// Build a basic JSON envelope for `value`, sign it and submit it
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Core`] if the payload cannot be encoded, and
    /// the errors of [`EventService::create`] otherwise
    pub async fn publish<T>(&self, event_type: EventType, value: &T) -> ClientResult<EventResponse>
    where
        T: Serialize + ?Sized,
    {
        let input = EventInput::assemble(
            EventBodyType::Basic,
            DataType::Json,
            event_type,
            None,
            value,
            &*self.signer,
        )?;
        self.create(&input).await
    }

    /// Sign and submit the next event of `chain`
    ///
    /// The chain is not advanced: the caller moves it once the content hash
    /// of the stored event is known.
    ///
    /// # Errors
    ///
    /// Same as [`EventService::publish`]
    pub async fn publish_next<T>(
        &self,
        chain: &EventChain,
        event_type: EventType,
        value: &T,
    ) -> ClientResult<EventResponse>
    where
        T: Serialize + ?Sized,
    {
        let input = chain.next_input(event_type, value, &*self.signer)?;
        self.create(&input).await
    }
}

impl fmt::Debug for EventService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventService")
            .field("author", &format_args!("{}", self.author()))
            .finish_non_exhaustive()
    }
}

/// Both dApp services over one transport
#[derive(Clone)]
pub struct DappService {
    /// Hash lookups
    pub hash: HashService,
    /// Event reads and submissions
    pub event: EventService,
}

impl DappService {
    /// Create both services
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, signer: Arc<dyn Signer>) -> Self {
        Self {
            hash: HashService::new(Arc::clone(&transport)),
            event: EventService::new(transport, signer),
        }
    }
}

fn parse_reply<T>(path: &str, parsed: CoreResult<T>) -> ClientResult<T> {
    parsed.map_err(|err| {
        warn!(path, error = %err, "rejected server reply");
        ClientError::invalid_response(format!("{path}: {err}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pletyvo_dapp::{Ed25519Signer, EventBody};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Canned replies keyed by path, recording every post
    #[derive(Default)]
    struct MemoryTransport {
        replies: HashMap<String, Value>,
        posted: Mutex<Vec<(String, Value)>>,
    }

    impl MemoryTransport {
        fn with(mut self, path: impl Into<String>, reply: Value) -> Self {
            self.replies.insert(path.into(), reply);
            self
        }

        fn posted(&self) -> Vec<(String, Value)> {
            self.posted.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for MemoryTransport {
        async fn get(&self, path: &str) -> ClientResult<Value> {
            self.replies
                .get(path)
                .cloned()
                .ok_or_else(|| ClientError::transport(format!("404 {path}")))
        }

        async fn post(&self, path: &str, body: Value) -> ClientResult<Value> {
            self.posted.lock().unwrap().push((path.to_string(), body));
            self.get(path).await
        }
    }

    fn signer() -> Arc<dyn Signer> {
        Arc::new(Ed25519Signer::from_seed(&[11u8; 32]).unwrap())
    }

    fn stored_event(signer: &dyn Signer, id: Uuid) -> Value {
        let body = EventBody::basic(DataType::Json, EventType::new(1, 1), &json!({ "n": 1 })).unwrap();
        let input = EventInput::sign(body, signer);
        json!({
            "id": id,
            "body": input.body().to_text(),
            "auth": input.auth().to_value(),
        })
    }

    #[tokio::test]
    async fn test_publish_posts_signed_envelope() {
        let id = Uuid::new_v4();
        let transport = Arc::new(MemoryTransport::default().with(EVENTS_PATH, json!({ "id": id })));
        let service = DappService::new(transport.clone(), signer());

        let response = service
            .event
            .publish(EventType::new(2, 1), &json!({ "name": "general" }))
            .await
            .unwrap();
        assert_eq!(response.id(), id);

        let posted = transport.posted();
        assert_eq!(posted.len(), 1);
        let (path, body) = &posted[0];
        assert_eq!(path, EVENTS_PATH);

        let input: EventInput = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(input.body().version().unwrap(), EventBodyType::Basic);
        assert_eq!(input.body().event_type(), EventType::new(2, 1));
        assert_eq!(input.body().payload().unwrap(), br#"{"name":"general"}"#);
        assert_eq!(input.auth().public(), service.event.author().digest().as_slice());
    }

    #[tokio::test]
    async fn test_publish_next_links_to_chain_tip() {
        let tip = signer().hash();
        let transport =
            Arc::new(MemoryTransport::default().with(EVENTS_PATH, json!({ "id": Uuid::new_v4() })));
        let service = EventService::new(transport.clone(), signer());

        let chain = EventChain::with_tip(tip, 1);
        service
            .publish_next(&chain, EventType::new(2, 2), &json!({ "name": "renamed" }))
            .await
            .unwrap();

        let input: EventInput = serde_json::from_value(transport.posted()[0].1.clone()).unwrap();
        assert_eq!(input.body().parent().unwrap(), tip);
        assert!(chain.check_link(input.body()).is_ok());
    }

    #[tokio::test]
    async fn test_create_rejects_reply_without_id() {
        let transport = Arc::new(MemoryTransport::default().with(EVENTS_PATH, json!({ "ok": true })));
        let service = EventService::new(transport, signer());
        let result = service.publish(EventType::new(1, 1), &json!({})).await;
        assert!(matches!(result, Err(ClientError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let signer = signer();
        let id = Uuid::new_v4();
        let transport = Arc::new(
            MemoryTransport::default().with(format!("{EVENTS_PATH}/{id}"), stored_event(&*signer, id)),
        );
        let service = EventService::new(transport, signer.clone());

        let event = service.get_by_id(id).await.unwrap();
        assert_eq!(event.id(), id);
        assert_eq!(event.auth().public(), signer.public().as_slice());

        let missing = service.get_by_id(Uuid::new_v4()).await;
        assert!(matches!(missing, Err(ClientError::Transport(_))));
    }

    #[tokio::test]
    async fn test_list() {
        let signer = signer();
        let ids = [Uuid::new_v4(), Uuid::new_v4()];
        let transport = Arc::new(MemoryTransport::default().with(
            EVENTS_PATH,
            json!([stored_event(&*signer, ids[0]), stored_event(&*signer, ids[1])]),
        ));
        let service = EventService::new(transport, signer);

        let events = service.list().await.unwrap();
        assert_eq!(events.iter().map(Event::id).collect::<Vec<_>>(), ids);
    }

    #[tokio::test]
    async fn test_list_rejects_non_array() {
        let transport = Arc::new(MemoryTransport::default().with(EVENTS_PATH, json!({ "id": 1 })));
        let service = EventService::new(transport, signer());
        assert!(matches!(service.list().await, Err(ClientError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_hash_lookup_uses_text_form() {
        let hash = signer().hash();
        let id = Uuid::new_v4();
        let transport = Arc::new(
            MemoryTransport::default().with(format!("{HASH_PATH}/{}", hash.to_text()), json!({ "id": id })),
        );
        let service = HashService::new(transport);
        assert_eq!(service.get_by_id(&hash).await.unwrap().id(), id);
    }

    #[test]
    fn test_debug_shows_author_only() {
        let service = EventService::new(Arc::new(MemoryTransport::default()), signer());
        let debug = format!("{service:?}");
        assert!(debug.contains(&service.author().to_text()));
    }
}
