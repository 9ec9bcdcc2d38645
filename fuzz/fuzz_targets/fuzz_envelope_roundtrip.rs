#![no_main]

use arbitrary::Arbitrary;
use hushcom_messages::Envelope;
use hushcom_protocol::{decode, encode, seal, verify};
use hushcom_types::{PublicKey, Timestamp};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
    from: String,
    timestamp: i64,
    msg_type: String,
    data: Vec<u8>,
    key: [u8; 32],
}

fuzz_target!(|input: Input| {
    let key = PublicKey::Curve25519(input.key);
    let envelope = seal(
        &key,
        Envelope {
            from: input.from,
            timestamp: Timestamp::new(input.timestamp),
            msg_type: input.msg_type,
            data: input.data,
            sig: Vec::new(),
        },
    );
    assert!(verify(&key, &envelope));

    if let Ok(bytes) = encode(&envelope) {
        let decoded = decode(&bytes).expect("encoded envelope decodes");
        assert_eq!(decoded, envelope);
        assert!(verify(&key, &decoded));
    }
});
