//! The client engine: outbound constructors and inbound dispatch.

use std::sync::Arc;

use hushcom_crypto::{generate_keypair, public_from_secret};
use hushcom_messages::{
    ChannelMsg, Envelope, JoinChanMsg, JoinChanRespMsg, Message, MessageKind, NewChanMsg,
    RegisterMsg,
};
use hushcom_protocol::{authenticate, decode_frame, encode_frame, seal, Handler, ProtocolError};
use hushcom_relay::{Delivery, Relay, RelayError};
use hushcom_types::{Clock, PublicKey, SecretKey};

use crate::output::{OutputRecord, OutputSink};
use crate::peers::PeerKeys;
use crate::ClientError;

/// The identity this client speaks as.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub key: PublicKey,
}

pub struct ClientEngine<R> {
    relay: R,
    clock: Arc<dyn Clock>,
    server_name: String,
    server_key: PublicKey,
    profile: Option<Profile>,
    peers: PeerKeys,
    output: OutputSink,
}

impl<R: Relay> ClientEngine<R> {
    pub fn new(
        relay: R,
        server_name: impl Into<String>,
        server_key: PublicKey,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let server_name = server_name.into();
        Self {
            peers: PeerKeys::new(&server_name, server_key.clone()),
            relay,
            clock,
            server_name,
            server_key,
            profile: None,
            output: OutputSink::new(),
        }
    }

    /// Switch to the profile `name`, whose public key is `key`.
    pub fn load_profile(&mut self, name: impl Into<String>, key: PublicKey) {
        let profile = Profile {
            name: name.into(),
            key,
        };
        tracing::info!(profile = %profile.name, "profile loaded");
        self.profile = Some(profile);
    }

    pub fn profile(&self) -> Result<&Profile, ClientError> {
        self.profile.as_ref().ok_or(ClientError::NoProfileLoaded)
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    pub fn server_key(&self) -> &PublicKey {
        &self.server_key
    }

    pub fn peers(&self) -> &PeerKeys {
        &self.peers
    }

    pub fn relay(&self) -> &R {
        &self.relay
    }

    pub fn output(&self) -> &OutputSink {
        &self.output
    }

    /// Return and clear the pending notification log.
    pub fn drain_output(&mut self) -> String {
        self.output.drain()
    }

    // ── Outbound: server ────────────────────────────────────────────────

    /// Register the loaded profile with the server.
    pub fn register(&self) -> Result<Delivery, ClientError> {
        let key = self.profile()?.key.clone();
        self.to_server(&Message::Register(RegisterMsg { key }))
    }

    pub fn unregister(&self) -> Result<Delivery, ClientError> {
        self.to_server(&Message::UnRegister)
    }

    pub fn list_channels(&self) -> Result<Delivery, ClientError> {
        self.to_server(&Message::ListChans)
    }

    /// Announce a public channel to the server.
    pub fn create_channel(&self, name: &str, key: PublicKey) -> Result<Delivery, ClientError> {
        self.create_channel_with_password(name, key, "")
    }

    /// Announce a channel to the server; a non-empty password keeps it unlisted.
    pub fn create_channel_with_password(
        &self,
        name: &str,
        key: PublicKey,
        password: &str,
    ) -> Result<Delivery, ClientError> {
        self.to_server(&Message::NewChan(NewChanMsg {
            chan_name: name.to_owned(),
            chan_pub_key: key,
            chan_password: password.to_owned(),
        }))
    }

    /// Generate a key pair for a new channel, keep the private half in the
    /// relay's channel store, and build the announcement for the server.
    pub fn open_channel(&self, name: &str, password: &str) -> Result<Delivery, ClientError> {
        self.profile()?;
        let pair = generate_keypair()?;
        self.relay.add_channel(name, &pair.secret.to_b64())?;
        tracing::info!(channel = %name, "channel key generated");
        self.create_channel_with_password(name, pair.public, password)
    }

    // ── Outbound: peers ─────────────────────────────────────────────────

    /// Ask the holders of a channel key to admit us.
    pub fn request_join(
        &self,
        channel: &str,
        channel_key: &PublicKey,
        password: &str,
    ) -> Result<Delivery, ClientError> {
        let profile = self.profile()?;
        let message = Message::JoinChan(JoinChanMsg {
            channel: channel.to_owned(),
            req_pub_key: profile.key.clone(),
            password: password.to_owned(),
        });
        let frame = self.frame(Handler::Client, &message, &profile.key)?;
        Ok(Delivery::channel(channel, frame, Some(channel_key.clone())))
    }

    /// Hand channel private key material to an admitted user.
    pub fn respond_join(
        &self,
        channel: &str,
        channel_secret_b64: &str,
        to_user: &str,
        dest_key: &PublicKey,
    ) -> Result<Delivery, ClientError> {
        let profile = self.profile()?;
        let message = Message::JoinChanResp(JoinChanRespMsg {
            channel: channel.to_owned(),
            channel_key: channel_secret_b64.to_owned(),
        });
        let frame = self.frame(Handler::Client, &message, &profile.key)?;
        Ok(Delivery::direct(to_user, frame, Some(dest_key.clone())))
    }

    /// Content message for a channel whose key is in the local store.
    pub fn send_channel_text(&self, channel: &str, text: &str) -> Result<Delivery, ClientError> {
        let channel_key = self.channel_public_key(channel)?;
        self.channel_text(channel, text.to_owned(), &channel_key, None)
    }

    /// Hand a built delivery to the relay.
    pub fn send(&self, delivery: &Delivery) -> Result<(), ClientError> {
        self.relay.deliver(delivery)?;
        Ok(())
    }

    fn to_server(&self, message: &Message) -> Result<Delivery, ClientError> {
        let profile = self.profile()?;
        let frame = self.frame(Handler::Server, message, &profile.key)?;
        Ok(Delivery::direct(
            self.server_name.clone(),
            frame,
            Some(self.server_key.clone()),
        ))
    }

    fn channel_text(
        &self,
        channel: &str,
        text: String,
        sign_key: &PublicKey,
        dest_key: Option<PublicKey>,
    ) -> Result<Delivery, ClientError> {
        let message = Message::Channel(ChannelMsg {
            channel: channel.to_owned(),
            text,
        });
        let frame = self.frame(Handler::Client, &message, sign_key)?;
        Ok(Delivery::channel(channel, frame, dest_key))
    }

    fn frame(
        &self,
        handler: Handler,
        message: &Message,
        sign_key: &PublicKey,
    ) -> Result<Vec<u8>, ClientError> {
        let profile = self.profile()?;
        let envelope = Envelope::new(profile.name.clone(), self.clock.now(), message)?;
        let envelope = seal(sign_key, envelope);
        Ok(encode_frame(handler, &envelope)?)
    }

    fn channel_public_key(&self, channel: &str) -> Result<PublicKey, ClientError> {
        let secret_b64 = self.relay.channel_secret(channel).map_err(|e| match e {
            RelayError::UnknownChannel(name) => ClientError::MissingChannelKey(name),
            other => other.into(),
        })?;
        let secret = SecretKey::from_b64(&secret_b64)?;
        Ok(public_from_secret(&secret))
    }

    // ── Inbound ─────────────────────────────────────────────────────────

    /// Dispatch one inbound frame.
    pub fn handle(&mut self, frame: &[u8]) -> Result<(), ClientError> {
        let (handler, envelope) = decode_frame(frame)?;
        if handler != Handler::Client {
            return Err(ProtocolError::Decode(format!(
                "client received frame for {handler:?} handler"
            ))
            .into());
        }

        let kind = envelope.kind();
        if kind == Some(MessageKind::ListChansResp) {
            tracing::trace!(from = %envelope.from, msg_type = %envelope.msg_type, "client dispatch");
        } else {
            tracing::debug!(from = %envelope.from, msg_type = %envelope.msg_type, "client dispatch");
        }

        // Peer traffic: handshake and content, checked against nothing.
        match kind {
            Some(MessageKind::JoinChan | MessageKind::JoinChanResp | MessageKind::Channel) => {
                return self.handle_peer(&envelope);
            }
            _ => {}
        }

        authenticate(&self.server_key, &envelope)?;

        let unknown = || ProtocolError::UnknownMessageType {
            sender: envelope.from.clone(),
            msg_type: envelope.msg_type.clone(),
        };
        let kind = kind.ok_or_else(unknown)?;
        match Message::from_parts(kind, &envelope.data)? {
            Message::RegisterResp(resp) => {
                self.emit(&envelope, String::new(), to_value(&resp)?)
            }
            Message::ListChansResp(resp) => {
                self.emit(&envelope, String::new(), to_value(&resp)?)
            }
            Message::Register(_)
            | Message::UnRegister
            | Message::ListChans
            | Message::NewChan(_)
            | Message::JoinChan(_)
            | Message::JoinChanResp(_)
            | Message::Channel(_) => Err(unknown().into()),
        }
    }

    fn handle_peer(&mut self, envelope: &Envelope) -> Result<(), ClientError> {
        match envelope.message()? {
            Message::JoinChan(req) => self.admit(envelope, req),
            Message::JoinChanResp(resp) => self.accept_admission(envelope, resp),
            Message::Channel(msg) => {
                self.emit(envelope, msg.channel, serde_json::Value::String(msg.text))
            }
            _ => Err(ProtocolError::UnknownMessageType {
                sender: envelope.from.clone(),
                msg_type: envelope.msg_type.clone(),
            }
            .into()),
        }
    }

    /// Every join request is admitted; the password is carried but not checked.
    fn admit(&mut self, envelope: &Envelope, req: JoinChanMsg) -> Result<(), ClientError> {
        self.peers.insert(&envelope.from, req.req_pub_key.clone());
        let secret = self.relay.channel_secret(&req.channel).map_err(|e| match e {
            RelayError::UnknownChannel(name) => ClientError::MissingChannelKey(name),
            other => other.into(),
        })?;
        let reply = self.respond_join(&req.channel, &secret, &envelope.from, &req.req_pub_key)?;
        self.send(&reply)?;
        tracing::info!(channel = %req.channel, requester = %envelope.from, "join request admitted");
        Ok(())
    }

    /// Store the received channel key and announce ourselves to the channel.
    fn accept_admission(
        &mut self,
        envelope: &Envelope,
        resp: JoinChanRespMsg,
    ) -> Result<(), ClientError> {
        let me = self.profile()?.name.clone();
        let secret = SecretKey::from_b64(&resp.channel_key)?;
        let channel_key = public_from_secret(&secret);
        self.relay.add_channel(&resp.channel, &resp.channel_key)?;

        let text = format!("{} has admitted {} to channel.", envelope.from, me);
        let announcement =
            self.channel_text(&resp.channel, text, &channel_key, Some(channel_key.clone()))?;
        self.send(&announcement)?;
        tracing::info!(channel = %resp.channel, admitted_by = %envelope.from, "joined channel");
        Ok(())
    }

    fn emit(
        &mut self,
        envelope: &Envelope,
        channel: String,
        data: serde_json::Value,
    ) -> Result<(), ClientError> {
        self.output.push(&OutputRecord {
            from: envelope.from.clone(),
            msg_type: envelope.msg_type.clone(),
            channel,
            data,
        })
    }
}

fn to_value<T: serde::Serialize>(payload: &T) -> Result<serde_json::Value, ClientError> {
    serde_json::to_value(payload).map_err(|e| ClientError::Output(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hushcom_crypto::keypair_from_secret;
    use hushcom_messages::{ListChansRespMsg, RegisterRespMsg, DEFAULT_SERVER_NAME};
    use hushcom_nullables::{NullClock, NullRelay};
    use hushcom_protocol::verify;
    use hushcom_relay::Route;
    use hushcom_types::{KeyPair, Timestamp};

    fn pair(byte: u8) -> KeyPair {
        keypair_from_secret(SecretKey::from_bytes([byte; 32]))
    }

    struct Fixture {
        relay: Arc<NullRelay>,
        server: KeyPair,
        me: KeyPair,
        engine: ClientEngine<Arc<NullRelay>>,
    }

    fn fixture() -> Fixture {
        let server = pair(1);
        let me = pair(2);
        let relay = Arc::new(NullRelay::with_key(me.public.clone()));
        let clock = Arc::new(NullClock::new(1_000));
        let mut engine = ClientEngine::new(
            relay.clone(),
            DEFAULT_SERVER_NAME,
            server.public.clone(),
            clock,
        );
        engine.load_profile("alice", me.public.clone());
        Fixture {
            relay,
            server,
            me,
            engine,
        }
    }

    fn open(delivery: &Delivery) -> (Handler, Envelope) {
        decode_frame(&delivery.frame).unwrap()
    }

    fn inbound(from: &str, message: &Message, sign_key: Option<&PublicKey>) -> Vec<u8> {
        let envelope = Envelope::new(from, Timestamp::new(7), message).unwrap();
        let envelope = match sign_key {
            Some(key) => seal(key, envelope),
            None => envelope,
        };
        encode_frame(Handler::Client, &envelope).unwrap()
    }

    #[test]
    fn constructors_need_a_profile() {
        let engine = ClientEngine::new(
            NullRelay::with_key(pair(2).public),
            DEFAULT_SERVER_NAME,
            pair(1).public,
            Arc::new(NullClock::new(0)),
        );
        assert!(matches!(engine.register(), Err(ClientError::NoProfileLoaded)));
        assert!(matches!(
            engine.list_channels(),
            Err(ClientError::NoProfileLoaded)
        ));
        assert!(matches!(
            engine.open_channel("room1", ""),
            Err(ClientError::NoProfileLoaded)
        ));
    }

    #[test]
    fn register_is_signed_with_profile_key_and_addressed_to_server() {
        let f = fixture();
        let delivery = f.engine.register().unwrap();
        assert_eq!(delivery.route, Route::Direct(DEFAULT_SERVER_NAME.into()));
        assert_eq!(delivery.dest_key, Some(f.server.public.clone()));

        let (handler, envelope) = open(&delivery);
        assert_eq!(handler, Handler::Server);
        assert_eq!(envelope.from, "alice");
        assert_eq!(envelope.timestamp, Timestamp::new(1_000));
        assert!(verify(&f.me.public, &envelope));
        assert_eq!(
            envelope.message().unwrap(),
            Message::Register(RegisterMsg {
                key: f.me.public.clone()
            })
        );
    }

    #[test]
    fn unregister_uses_server_spelling() {
        let f = fixture();
        let (_, envelope) = open(&f.engine.unregister().unwrap());
        assert_eq!(envelope.msg_type, "UnRegister");
        assert!(envelope.data.is_empty());
    }

    #[test]
    fn create_channel_has_empty_password() {
        let f = fixture();
        let (_, envelope) = open(&f.engine.create_channel("room1", pair(3).public).unwrap());
        match envelope.message().unwrap() {
            Message::NewChan(msg) => {
                assert_eq!(msg.chan_name, "room1");
                assert_eq!(msg.chan_pub_key, pair(3).public);
                assert!(msg.chan_password.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn open_channel_stores_matching_secret() {
        let f = fixture();
        let (_, envelope) = open(&f.engine.open_channel("room1", "pw").unwrap());
        let stored = f.relay.stored_channel("room1").unwrap();
        let derived = public_from_secret(&SecretKey::from_b64(&stored).unwrap());
        match envelope.message().unwrap() {
            Message::NewChan(msg) => {
                assert_eq!(msg.chan_pub_key, derived);
                assert_eq!(msg.chan_password, "pw");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn request_join_goes_to_channel_key() {
        let f = fixture();
        let channel = pair(3);
        let delivery = f.engine.request_join("room1", &channel.public, "").unwrap();
        assert_eq!(delivery.route, Route::Channel("room1".into()));
        assert_eq!(delivery.dest_key, Some(channel.public.clone()));

        let (handler, envelope) = open(&delivery);
        assert_eq!(handler, Handler::Client);
        assert!(verify(&f.me.public, &envelope));
        match envelope.message().unwrap() {
            Message::JoinChan(msg) => assert_eq!(msg.req_pub_key, f.me.public),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn join_request_is_admitted_with_channel_secret() {
        let mut f = fixture();
        let channel = pair(3);
        let bob = pair(4);
        f.relay
            .add_channel("room1", &channel.secret.to_b64())
            .unwrap();

        let frame = inbound(
            "bob",
            &Message::JoinChan(JoinChanMsg {
                channel: "room1".into(),
                req_pub_key: bob.public.clone(),
                password: "ignored".into(),
            }),
            None,
        );
        f.engine.handle(&frame).unwrap();

        assert_eq!(f.engine.peers().get("bob"), Some(&bob.public));
        let sent = f.relay.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].route, Route::Direct("bob".into()));
        assert_eq!(sent[0].dest_key, Some(bob.public.clone()));
        let (_, envelope) = open(&sent[0]);
        assert_eq!(
            envelope.message().unwrap(),
            Message::JoinChanResp(JoinChanRespMsg {
                channel: "room1".into(),
                channel_key: channel.secret.to_b64(),
            })
        );
    }

    #[test]
    fn join_request_for_unknown_channel_fails() {
        let mut f = fixture();
        let frame = inbound(
            "bob",
            &Message::JoinChan(JoinChanMsg {
                channel: "nowhere".into(),
                req_pub_key: pair(4).public,
                password: String::new(),
            }),
            None,
        );
        assert!(matches!(
            f.engine.handle(&frame),
            Err(ClientError::MissingChannelKey(name)) if name == "nowhere"
        ));
        assert!(f.relay.sent().is_empty());
    }

    #[test]
    fn admission_stores_key_and_announces() {
        let mut f = fixture();
        let channel = pair(3);
        let frame = inbound(
            "carol",
            &Message::JoinChanResp(JoinChanRespMsg {
                channel: "room1".into(),
                channel_key: channel.secret.to_b64(),
            }),
            None,
        );
        f.engine.handle(&frame).unwrap();

        assert_eq!(
            f.relay.stored_channel("room1"),
            Some(channel.secret.to_b64())
        );
        let sent = f.relay.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].route, Route::Channel("room1".into()));
        assert_eq!(sent[0].dest_key, Some(channel.public.clone()));
        let (_, envelope) = open(&sent[0]);
        assert!(verify(&channel.public, &envelope));
        assert_eq!(
            envelope.message().unwrap(),
            Message::Channel(ChannelMsg {
                channel: "room1".into(),
                text: "carol has admitted alice to channel.".into(),
            })
        );
    }

    #[test]
    fn unavailable_relay_fails_join_response() {
        let mut f = fixture();
        let channel = pair(3);
        f.relay
            .add_channel("room1", &channel.secret.to_b64())
            .unwrap();
        f.relay.set_unavailable(true);

        let frame = inbound(
            "bob",
            &Message::JoinChan(JoinChanMsg {
                channel: "room1".into(),
                req_pub_key: pair(4).public,
                password: String::new(),
            }),
            None,
        );
        assert!(matches!(
            f.engine.handle(&frame),
            Err(ClientError::Relay(RelayError::Unavailable(_)))
        ));
        assert!(f.relay.sent().is_empty());
    }

    #[test]
    fn admission_without_profile_stores_nothing() {
        let relay = Arc::new(NullRelay::with_key(pair(2).public));
        let mut engine = ClientEngine::new(
            relay.clone(),
            DEFAULT_SERVER_NAME,
            pair(1).public,
            Arc::new(NullClock::new(0)),
        );
        let frame = inbound(
            "carol",
            &Message::JoinChanResp(JoinChanRespMsg {
                channel: "room1".into(),
                channel_key: pair(3).secret.to_b64(),
            }),
            None,
        );
        assert!(matches!(
            engine.handle(&frame),
            Err(ClientError::NoProfileLoaded)
        ));
        assert_eq!(relay.stored_channel("room1"), None);
        assert!(relay.sent().is_empty());
    }

    #[test]
    fn channel_content_passes_through_unsigned() {
        let mut f = fixture();
        let frame = inbound(
            "bob",
            &Message::Channel(ChannelMsg {
                channel: "room1".into(),
                text: "hello".into(),
            }),
            None,
        );
        f.engine.handle(&frame).unwrap();

        let records = f.engine.output().records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].from, "bob");
        assert_eq!(records[0].channel, "room1");
        assert_eq!(records[0].data, serde_json::json!("hello"));
    }

    #[test]
    fn server_response_must_verify() {
        let mut f = fixture();
        let resp = Message::RegisterResp(RegisterRespMsg { success: true });

        let forged = inbound(DEFAULT_SERVER_NAME, &resp, Some(&pair(9).public));
        assert!(matches!(
            f.engine.handle(&forged),
            Err(ClientError::Protocol(ProtocolError::Authentication { .. }))
        ));
        assert!(f.engine.output().is_empty());

        let genuine = inbound(DEFAULT_SERVER_NAME, &resp, Some(&f.server.public));
        f.engine.handle(&genuine).unwrap();
        let out = f.engine.drain_output();
        assert_eq!(
            out,
            "{\"From\":\"HushComServer\",\"MsgType\":\"RegisterResp\",\"Channel\":\"\",\"Data\":{\"Success\":true}}\n"
        );
        assert!(f.engine.output().is_empty());
    }

    #[test]
    fn channel_listing_reaches_output() {
        let mut f = fixture();
        let resp = Message::ListChansResp(ListChansRespMsg { channels: vec![] });
        let frame = inbound(DEFAULT_SERVER_NAME, &resp, Some(&f.server.public));
        f.engine.handle(&frame).unwrap();
        let records = f.engine.output().records();
        assert_eq!(records[0].msg_type, "ListChansResp");
        assert_eq!(records[0].data, serde_json::json!({ "Channels": [] }));
    }

    #[test]
    fn signed_request_kind_is_unknown_to_client() {
        let mut f = fixture();
        let frame = inbound(DEFAULT_SERVER_NAME, &Message::ListChans, Some(&f.server.public));
        assert!(matches!(
            f.engine.handle(&frame),
            Err(ClientError::Protocol(ProtocolError::UnknownMessageType { .. }))
        ));
    }

    #[test]
    fn server_prefixed_frame_rejected() {
        let mut f = fixture();
        let envelope = seal(
            &f.server.public,
            Envelope::new(DEFAULT_SERVER_NAME, Timestamp::new(1), &Message::ListChans).unwrap(),
        );
        let frame = encode_frame(Handler::Server, &envelope).unwrap();
        assert!(matches!(
            f.engine.handle(&frame),
            Err(ClientError::Protocol(ProtocolError::Decode(_)))
        ));
    }

    #[test]
    fn channel_text_needs_stored_key() {
        let f = fixture();
        assert!(matches!(
            f.engine.send_channel_text("room1", "hi"),
            Err(ClientError::MissingChannelKey(_))
        ));

        let channel = pair(3);
        f.relay
            .add_channel("room1", &channel.secret.to_b64())
            .unwrap();
        let delivery = f.engine.send_channel_text("room1", "hi").unwrap();
        f.engine.send(&delivery).unwrap();
        let sent = f.relay.sent();
        assert_eq!(sent[0].route, Route::Channel("room1".into()));
        assert!(verify(&channel.public, &open(&sent[0]).1));
    }
}
