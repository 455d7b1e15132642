#![no_main]
use libfuzzer_sys::fuzz_target;
use pletyvo_dapp::{BodyLayout, EventBody};

fuzz_target!(|data: &[u8]| {
    let Ok(body) = EventBody::from_bytes(data) else {
        assert!(data.len() < pletyvo_dapp::MIN_BODY_LEN);
        return;
    };

    // accessors may fail on hostile input but must never panic
    let _ = body.version();
    let _ = body.data_type();
    let _ = body.event_type();
    let _ = body.parent();

    if let Ok(layout) = body.layout() {
        let payload = layout.payload();
        assert!(payload.len() <= body.len());
        if let BodyLayout::Linked { parent, .. } = layout {
            assert_eq!(body.parent().ok(), Some(parent));
        }
    }
    assert_eq!(body.as_bytes(), data);
});
