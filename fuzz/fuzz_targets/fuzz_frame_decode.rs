#![no_main]

use hushcom_protocol::{decode_frame, encode_frame};
use libfuzzer_sys::fuzz_target;

// Decoding arbitrary bytes never panics, and anything that decodes
// re-encodes to the same bytes.
fuzz_target!(|data: &[u8]| {
    if let Ok((handler, envelope)) = decode_frame(data) {
        let encoded = encode_frame(handler, &envelope).expect("decoded envelope re-encodes");
        assert_eq!(encoded, data);
    }
});
