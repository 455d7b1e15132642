#![no_main]
use libfuzzer_sys::fuzz_target;
use pletyvo_core::ContentHash;
use pletyvo_dapp::EventBody;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(body) = EventBody::from_text(text) {
        let again = EventBody::from_text(&body.to_text()).expect("re-encoded body must decode");
        assert_eq!(again, body);
    }

    if let Ok(hash) = ContentHash::from_text(text) {
        assert_eq!(ContentHash::from_text(&hash.to_text()).ok(), Some(hash));
    }
});
