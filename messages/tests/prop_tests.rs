use proptest::prelude::*;

use hushcom_messages::{ChannelMsg, Envelope, Message, MessageKind};
use hushcom_types::Timestamp;

fn arb_kind() -> impl Strategy<Value = MessageKind> {
    prop::sample::select(MessageKind::ALL.to_vec())
}

proptest! {
    /// Signing bytes are exactly From || LE timestamp || MsgType || Data.
    #[test]
    fn signing_bytes_concatenation(
        from in "[a-zA-Z0-9 ]{0,24}",
        ts in any::<i64>(),
        kind in arb_kind(),
        data in prop::collection::vec(any::<u8>(), 0..128),
    ) {
        let env = Envelope {
            from: from.clone(),
            timestamp: Timestamp::new(ts),
            msg_type: kind.tag().to_owned(),
            data: data.clone(),
            sig: vec![0xAA; 32],
        };
        let mut expected = from.into_bytes();
        expected.extend_from_slice(&ts.to_le_bytes());
        expected.extend_from_slice(kind.tag().as_bytes());
        expected.extend_from_slice(&data);
        prop_assert_eq!(env.signing_bytes(), expected);
    }

    /// Two envelopes differing only in timestamp never share signing bytes.
    #[test]
    fn timestamp_changes_signing_bytes(a in any::<i64>(), b in any::<i64>()) {
        prop_assume!(a != b);
        let base = Envelope {
            from: "alice".into(),
            timestamp: Timestamp::new(a),
            msg_type: "ListChans".into(),
            data: Vec::new(),
            sig: Vec::new(),
        };
        let other = Envelope { timestamp: Timestamp::new(b), ..base.clone() };
        prop_assert_ne!(base.signing_bytes(), other.signing_bytes());
    }

    /// Channel text of any content survives envelope construction and parsing.
    #[test]
    fn channel_text_survives_envelope(channel in ".{0,32}", text in ".{0,256}") {
        let msg = Message::Channel(ChannelMsg { channel, text });
        let env = Envelope::new("bob", Timestamp::new(7), &msg).unwrap();
        prop_assert_eq!(env.message().unwrap(), msg);
    }

    /// Tag lookup never panics and only recognises the closed set.
    #[test]
    fn from_tag_only_known(tag in "[A-Za-z]{0,16}") {
        match MessageKind::from_tag(&tag) {
            Some(kind) => prop_assert!(kind.tag() == tag || tag == "Unregister"),
            None => prop_assert!(MessageKind::ALL.iter().all(|k| k.tag() != tag)),
        }
    }
}
