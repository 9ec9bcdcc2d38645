#![no_main]

use std::sync::Arc;

use hushcom_nullables::{NullClock, NullRelay};
use hushcom_protocol::Handler;
use hushcom_server::ServerEngine;
use hushcom_types::PublicKey;
use libfuzzer_sys::fuzz_target;

// Arbitrary frames never panic the server, and a rejected frame never
// produces a reply.
fuzz_target!(|data: &[u8]| {
    let relay = Arc::new(NullRelay::with_key(PublicKey::Curve25519([1; 32])));
    let mut engine = ServerEngine::new(relay.clone(), "HushComServer", Arc::new(NullClock::new(0)));

    let mut frame = Handler::SERVER_ID.to_be_bytes().to_vec();
    frame.extend_from_slice(data);
    for input in [data, frame.as_slice()] {
        let before = relay.sent().len();
        if engine.handle(input).is_err() {
            assert_eq!(relay.sent().len(), before);
        }
    }
});
