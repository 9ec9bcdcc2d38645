#![no_main]

use hushcom_messages::{Message, MessageKind};
use libfuzzer_sys::fuzz_target;

// Payload parsing never panics for any kind, and parsed payloads
// survive a second trip through their JSON form.
fuzz_target!(|data: &[u8]| {
    for kind in MessageKind::ALL {
        if let Ok(message) = Message::from_parts(kind, data) {
            let again = message.to_data().expect("parsed payload serializes");
            assert_eq!(Message::from_parts(kind, &again).ok(), Some(message));
        }
    }
});
