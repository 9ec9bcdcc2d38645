//! Envelope codec: framing and binary serialization for the wire.
//!
//! A frame is a 2-byte big-endian dispatcher prefix naming the receiving
//! engine, followed by the envelope in bincode's fixed-int little-endian
//! form. Decoding rejects truncated input, trailing bytes, unknown
//! prefixes, and frames over [`MAX_FRAME_SIZE`].

use bincode::Options;
use hushcom_messages::Envelope;

use crate::ProtocolError;

/// Maximum encoded envelope size in bytes.
pub const MAX_FRAME_SIZE: usize = 1024 * 1024; // 1 MiB

const PREFIX_LEN: usize = 2;

/// The engine a frame is addressed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Handler {
    Server,
    Client,
}

impl Handler {
    pub const SERVER_ID: u16 = 0x72C1;
    pub const CLIENT_ID: u16 = 0x72C0;

    pub fn id(self) -> u16 {
        match self {
            Handler::Server => Self::SERVER_ID,
            Handler::Client => Self::CLIENT_ID,
        }
    }

    pub fn from_id(id: u16) -> Option<Self> {
        match id {
            Self::SERVER_ID => Some(Handler::Server),
            Self::CLIENT_ID => Some(Handler::Client),
            _ => None,
        }
    }
}

fn unbounded() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
}

fn options() -> impl Options {
    unbounded().with_limit(MAX_FRAME_SIZE as u64)
}

/// Encode an envelope without a dispatcher prefix.
pub fn encode(envelope: &Envelope) -> Result<Vec<u8>, ProtocolError> {
    let size = unbounded()
        .serialized_size(envelope)
        .map_err(|e| ProtocolError::Encode(e.to_string()))? as usize;
    if size > MAX_FRAME_SIZE {
        return Err(ProtocolError::FrameTooLarge {
            size,
            max: MAX_FRAME_SIZE,
        });
    }
    options()
        .serialize(envelope)
        .map_err(|e| ProtocolError::Encode(e.to_string()))
}

/// Decode an envelope without a dispatcher prefix.
pub fn decode(bytes: &[u8]) -> Result<Envelope, ProtocolError> {
    if bytes.len() > MAX_FRAME_SIZE {
        return Err(ProtocolError::Decode(format!(
            "frame of {} bytes exceeds {MAX_FRAME_SIZE}",
            bytes.len()
        )));
    }
    options()
        .deserialize(bytes)
        .map_err(|e| ProtocolError::Decode(e.to_string()))
}

/// Encode an envelope behind the dispatcher prefix of `handler`.
pub fn encode_frame(handler: Handler, envelope: &Envelope) -> Result<Vec<u8>, ProtocolError> {
    let body = encode(envelope)?;
    let mut frame = Vec::with_capacity(PREFIX_LEN + body.len());
    frame.extend_from_slice(&handler.id().to_be_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}

/// Split a frame into its handler and envelope.
pub fn decode_frame(frame: &[u8]) -> Result<(Handler, Envelope), ProtocolError> {
    if frame.len() < PREFIX_LEN {
        return Err(ProtocolError::Decode(format!(
            "frame of {} bytes has no dispatcher prefix",
            frame.len()
        )));
    }
    let id = u16::from_be_bytes([frame[0], frame[1]]);
    let handler = Handler::from_id(id)
        .ok_or_else(|| ProtocolError::Decode(format!("unknown dispatcher prefix {id:#06x}")))?;
    Ok((handler, decode(&frame[PREFIX_LEN..])?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hushcom_types::Timestamp;

    fn sample() -> Envelope {
        Envelope {
            from: "alice".into(),
            timestamp: Timestamp::new(-5),
            msg_type: "ListChans".into(),
            data: Vec::new(),
            sig: vec![9; 32],
        }
    }

    #[test]
    fn frame_roundtrip() {
        let frame = encode_frame(Handler::Server, &sample()).unwrap();
        assert_eq!(&frame[..2], &[0x72, 0xC1]);
        let (handler, env) = decode_frame(&frame).unwrap();
        assert_eq!(handler, Handler::Server);
        assert_eq!(env, sample());
    }

    #[test]
    fn field_order_on_the_wire() {
        let bytes = encode(&sample()).unwrap();
        // u64 length prefix, then the From bytes.
        assert_eq!(&bytes[..8], &5u64.to_le_bytes());
        assert_eq!(&bytes[8..13], b"alice");
        assert_eq!(&bytes[13..21], &(-5i64).to_le_bytes());
    }

    #[test]
    fn encoding_is_deterministic() {
        assert_eq!(encode(&sample()).unwrap(), encode(&sample()).unwrap());
    }

    #[test]
    fn truncated_input_rejected() {
        let bytes = encode(&sample()).unwrap();
        for cut in [0, 1, 8, bytes.len() - 1] {
            assert!(matches!(
                decode(&bytes[..cut]),
                Err(ProtocolError::Decode(_))
            ));
        }
    }

    #[test]
    fn trailing_bytes_rejected() {
        let mut bytes = encode(&sample()).unwrap();
        bytes.push(0);
        assert!(matches!(decode(&bytes), Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn unknown_prefix_rejected() {
        let mut frame = encode_frame(Handler::Client, &sample()).unwrap();
        frame[0] = 0x00;
        assert!(matches!(decode_frame(&frame), Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn short_frame_rejected() {
        assert!(matches!(decode_frame(&[0x72]), Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn huge_length_prefix_rejected_without_allocation() {
        let mut bytes = u64::MAX.to_le_bytes().to_vec();
        bytes.extend_from_slice(b"abc");
        assert!(matches!(decode(&bytes), Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn oversized_envelope_rejected_on_encode() {
        let mut env = sample();
        env.data = vec![0; MAX_FRAME_SIZE];
        // 86 bytes of framing around the payload in `sample`.
        assert!(matches!(
            encode(&env),
            Err(ProtocolError::FrameTooLarge { size, max })
                if size == MAX_FRAME_SIZE + 86 && max == MAX_FRAME_SIZE
        ));
        assert_eq!(encode(&sample()).unwrap().len(), 86);
    }

    #[test]
    fn handler_ids() {
        assert_eq!(Handler::from_id(0x72C0), Some(Handler::Client));
        assert_eq!(Handler::from_id(0x72C1), Some(Handler::Server));
        assert_eq!(Handler::from_id(0x0001), None);
    }
}
