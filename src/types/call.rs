use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the conversation a call is scoped to.
///
/// Both participants share it; every signaling frame for the call carries it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a participant account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(String);

impl PeerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Distinguishes re-calls within one conversation.
///
/// Generated by the caller, adopted by the callee from the offer. Frames
/// carrying a nonce that does not match the live session are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionNonce(u64);

impl SessionNonce {
    pub fn generate() -> Self {
        Self(rand::random())
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Which side of the call this client is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallRole {
    /// Initiated the call and produces the offer.
    Caller,
    /// Received the offer and produces the answer.
    Callee,
}

/// Whether the session carries video. Fixed for the session's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    pub fn is_video(self) -> bool {
        matches!(self, Self::Video)
    }
}

/// Why a call ended. Local bookkeeping only, never carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndCallReason {
    /// Local user hung up or declined.
    UserHangup,
    /// Peer sent an end frame.
    RemoteHangup,
    /// Nobody answered within the ring timeout.
    Timeout,
    /// Camera/microphone acquisition failed.
    MediaFailed,
    /// Offer/answer exchange failed.
    NegotiationFailed,
    /// Transport reported failed or disconnected.
    ConnectionLost,
}
