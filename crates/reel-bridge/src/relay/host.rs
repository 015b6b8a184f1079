use crate::error::BridgeError;
use crate::protocol::message::{InboundMessage, OutboundMessage, RawMessage};
use crate::protocol::origin::OriginPolicy;

/// Outbound half of the host channel. Fire-and-forget: an `Ok` only means
/// the platform accepted the message, not that the host saw it.
pub trait HostSink {
    fn post(&mut self, payload: &str, target_origin: &str) -> Result<(), BridgeError>;
}

/// Two-way channel between the page and the native host.
///
/// Inbound messages are only acted on while subscribed and only from
/// origins the policy allows.
pub struct HostRelay<S: HostSink> {
    sink: S,
    policy: OriginPolicy,
    subscribed: bool,
    sent: u32,
}

impl<S: HostSink> HostRelay<S> {
    pub fn new(sink: S, policy: OriginPolicy) -> Self {
        Self {
            sink,
            policy,
            subscribed: false,
            sent: 0,
        }
    }

    pub fn subscribe(&mut self) {
        self.subscribed = true;
    }

    pub fn unsubscribe(&mut self) {
        self.subscribed = false;
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    /// Classify an inbound message. Anything that should not be acted on
    /// comes back as `Unrecognized`.
    pub fn receive(&self, origin: &str, raw: &RawMessage) -> InboundMessage {
        if !self.subscribed {
            log::debug!("relay: not subscribed, ignoring message");
            return InboundMessage::Unrecognized;
        }
        if !self.policy.permits(origin) {
            log::warn!("relay: ignoring message from disallowed origin {origin:?}");
            return InboundMessage::Unrecognized;
        }
        match InboundMessage::parse(raw) {
            Ok(message) => {
                if message == InboundMessage::Unrecognized {
                    log::debug!("relay: unrecognized message {raw}");
                }
                message
            }
            Err(e) => {
                log::warn!("relay: dropping message: {e}");
                InboundMessage::Unrecognized
            }
        }
    }

    /// Post a message to the host. Returns whether the platform accepted it.
    pub fn send(&mut self, message: &OutboundMessage) -> bool {
        let posted = message
            .to_json()
            .and_then(|json| self.sink.post(&json, self.policy.host_target()));
        match posted {
            Ok(()) => {
                self.sent += 1;
                true
            }
            Err(e) => {
                log::error!("relay: failed to post {message:?}: {e}");
                false
            }
        }
    }

    /// Messages accepted by the platform so far.
    pub fn sent_count(&self) -> u32 {
        self.sent
    }

    pub fn policy(&self) -> &OriginPolicy {
        &self.policy
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

/// A sink that keeps everything it is given. Useful for headless hosts.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub posted: Vec<(String, String)>,
}

impl RecordingSink {
    pub fn payloads(&self) -> Vec<&str> {
        self.posted.iter().map(|(payload, _)| payload.as_str()).collect()
    }
}

impl HostSink for RecordingSink {
    fn post(&mut self, payload: &str, target_origin: &str) -> Result<(), BridgeError> {
        self.posted.push((payload.to_string(), target_origin.to_string()));
        Ok(())
    }
}
