//! The server engine: registries plus authenticated dispatch.

use std::sync::Arc;

use hushcom_messages::{
    ChannelInfo, Envelope, ListChansRespMsg, Message, MessageKind, NewChanMsg, RegisterMsg,
    RegisterRespMsg,
};
use hushcom_protocol::{authenticate, decode_frame, encode_frame, seal, Handler, ProtocolError};
use hushcom_registry::{ChannelRecord, ChannelRegistry, IdentityRegistry};
use hushcom_relay::Relay;
use hushcom_types::{Clock, PublicKey};

use crate::ServerError;

pub struct ServerEngine<R> {
    relay: R,
    clock: Arc<dyn Clock>,
    name: String,
    identities: IdentityRegistry,
    channels: ChannelRegistry,
}

impl<R: Relay> ServerEngine<R> {
    /// `name` is the nickname replies are sent from.
    pub fn new(relay: R, name: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            relay,
            clock,
            name: name.into(),
            identities: IdentityRegistry::new(),
            channels: ChannelRegistry::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn relay(&self) -> &R {
        &self.relay
    }

    pub fn is_registered(&self, nick: &str) -> bool {
        self.identities.contains(nick)
    }

    pub fn identity(&self, nick: &str) -> Option<&PublicKey> {
        self.identities.get(nick)
    }

    pub fn channel(&self, name: &str) -> Option<&ChannelRecord> {
        self.channels.get(name)
    }

    /// Public channels as they would be listed to a client.
    pub fn channel_listing(&self) -> Vec<ChannelInfo> {
        self.channels
            .public_channels()
            .map(|(name, key)| ChannelInfo {
                name: name.to_owned(),
                pub_key: key.clone(),
            })
            .collect()
    }

    /// Dispatch one inbound frame.
    ///
    /// Traffic from unknown senders other than `Register` is dropped without
    /// an error. Any failure leaves both registries untouched.
    pub fn handle(&mut self, frame: &[u8]) -> Result<(), ServerError> {
        let (handler, envelope) = decode_frame(frame)?;
        if handler != Handler::Server {
            return Err(ProtocolError::Decode(format!(
                "server received frame for {handler:?} handler"
            ))
            .into());
        }

        let kind = envelope.kind();
        if kind == Some(MessageKind::ListChans) {
            tracing::trace!(from = %envelope.from, msg_type = %envelope.msg_type, "server dispatch");
        } else {
            tracing::debug!(from = %envelope.from, msg_type = %envelope.msg_type, "server dispatch");
        }

        let Some(candidate) = self.candidate_key(&envelope, kind)? else {
            tracing::debug!(from = %envelope.from, msg_type = %envelope.msg_type, "dropping message from unregistered sender");
            return Ok(());
        };
        authenticate(&candidate, &envelope)?;

        let unknown = || ProtocolError::UnknownMessageType {
            sender: envelope.from.clone(),
            msg_type: envelope.msg_type.clone(),
        };
        let kind = kind.ok_or_else(unknown)?;
        let from = envelope.from.as_str();
        match Message::from_parts(kind, &envelope.data)? {
            Message::Register(_) => self.register(from, candidate),
            Message::UnRegister => {
                self.unregister(from);
                Ok(())
            }
            Message::ListChans => self.list_channels(from),
            Message::NewChan(msg) => self.new_channel(from, msg),
            Message::RegisterResp(_)
            | Message::ListChansResp(_)
            | Message::JoinChan(_)
            | Message::JoinChanResp(_)
            | Message::Channel(_) => Err(unknown().into()),
        }
    }

    /// The key a message must verify against: the registered key, or for a
    /// first `Register` the key it carries.
    fn candidate_key(
        &self,
        envelope: &Envelope,
        kind: Option<MessageKind>,
    ) -> Result<Option<PublicKey>, ServerError> {
        if let Some(key) = self.identities.get(&envelope.from) {
            return Ok(Some(key.clone()));
        }
        if kind != Some(MessageKind::Register) {
            return Ok(None);
        }
        match Message::from_parts(MessageKind::Register, &envelope.data)? {
            Message::Register(RegisterMsg { key }) => Ok(Some(key)),
            _ => Ok(None),
        }
    }

    fn register(&mut self, nick: &str, key: PublicKey) -> Result<(), ServerError> {
        if !self.identities.contains(nick) {
            self.relay.add_contact(nick, &key)?;
            self.identities.register(nick, key);
            tracing::info!(user = %nick, "user registered");
        } else {
            tracing::debug!(user = %nick, "user already registered");
        }
        self.send_to_client(&Message::RegisterResp(RegisterRespMsg { success: true }), nick)
    }

    fn unregister(&mut self, nick: &str) {
        let channels = self.channels.remove_member_everywhere(nick);
        self.identities.remove(nick);
        tracing::info!(user = %nick, channels, "user unregistered");
    }

    fn list_channels(&self, nick: &str) -> Result<(), ServerError> {
        let listing = ListChansRespMsg {
            channels: self.channel_listing(),
        };
        self.send_to_client(&Message::ListChansResp(listing), nick)
    }

    fn new_channel(&mut self, nick: &str, msg: NewChanMsg) -> Result<(), ServerError> {
        let public = msg.chan_password.is_empty();
        self.channels
            .create(&msg.chan_name, msg.chan_pub_key, msg.chan_password, nick)?;
        tracing::info!(channel = %msg.chan_name, admin = %nick, public, "channel created");
        Ok(())
    }

    /// Sign with this server's content key and hand to the relay.
    fn send_to_client(&self, message: &Message, dest: &str) -> Result<(), ServerError> {
        let content_key = self.relay.content_key()?;
        let envelope = Envelope::new(self.name.clone(), self.clock.now(), message)?;
        let frame = encode_frame(Handler::Client, &seal(&content_key, envelope))?;
        self.relay.send(dest, &frame, None)?;
        Ok(())
    }
}
