//! Wire format for call signaling over the shared relay channel.
//!
//! The relay is a dumb router: it forwards opaque text frames keyed by
//! conversation and recipient, and the same connection also carries chat
//! traffic. Call frames are JSON objects distinguished by a namespaced
//! `kind` tag. Exactly four kinds exist:
//!
//! | kind             | direction        | semantics                  |
//! |------------------|------------------|----------------------------|
//! | `call_offer`     | caller → callee  | initiates negotiation      |
//! | `call_answer`    | callee → caller  | completes negotiation      |
//! | `call_candidate` | either → either  | incremental, many per call |
//! | `call_end`       | either → either  | graceful termination       |

use serde::{Deserialize, Serialize};

use crate::types::call::{ConversationId, MediaKind, PeerId, SessionNonce};

/// SDP description type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    Offer,
    Answer,
}

/// A session description produced or consumed by a peer session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub kind: SdpKind,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Answer,
            sdp: sdp.into(),
        }
    }
}

/// A discovered network path, in the standard WebRTC candidate shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceCandidate {
    /// The candidate string (e.g., "candidate:1 1 UDP 2130706431 192.168.1.1 8888 typ host")
    pub candidate: String,
    /// SDP media stream identification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_mid: Option<String>,
    /// SDP media line index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_m_line_index: Option<u16>,
}

impl IceCandidate {
    pub fn new(candidate: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            sdp_mid: None,
            sdp_m_line_index: None,
        }
    }

    pub fn with_sdp_mid(mut self, sdp_mid: impl Into<String>) -> Self {
        self.sdp_mid = Some(sdp_mid.into());
        self
    }

    pub fn with_sdp_m_line_index(mut self, index: u16) -> Self {
        self.sdp_m_line_index = Some(index);
        self
    }
}

/// Payload of a call frame, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SignalBody {
    /// Initiates negotiation. Carries the call type so the callee can ring
    /// with the right UI and acquire the right devices.
    CallOffer {
        media_kind: MediaKind,
        description: SessionDescription,
    },
    CallAnswer { description: SessionDescription },
    CallCandidate { candidate: IceCandidate },
    CallEnd,
}

impl SignalBody {
    /// Tag name as it appears on the wire.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::CallOffer { .. } => "call_offer",
            Self::CallAnswer { .. } => "call_answer",
            Self::CallCandidate { .. } => "call_candidate",
            Self::CallEnd => "call_end",
        }
    }
}

/// One call signaling frame as carried on the shared channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSignal {
    pub conversation_id: ConversationId,
    pub sender_id: PeerId,
    pub recipient_id: PeerId,
    pub session: SessionNonce,
    #[serde(flatten)]
    pub body: SignalBody,
}

impl CallSignal {
    pub fn kind_name(&self) -> &'static str {
        self.body.kind_name()
    }
}
