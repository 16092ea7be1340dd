//! Call state machine implementation.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::call::{CallRole, ConversationId, EndCallReason, MediaKind, PeerId, SessionNonce};

/// Current state of a call session.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CallState {
    /// Callee ringing locally, or caller waiting for the callee to answer.
    Ringing { started_at: DateTime<Utc> },
    /// Media being acquired, offer/answer and candidates in flight.
    Connecting { accepted_at: DateTime<Utc> },
    /// Media flowing.
    Connected { connected_at: DateTime<Utc> },
    /// Call ended. Terminal; all resources released.
    Ended {
        reason: EndCallReason,
        ended_at: DateTime<Utc>,
        duration_secs: Option<i64>,
    },
}

impl CallState {
    pub fn is_ringing(&self) -> bool {
        matches!(self, Self::Ringing { .. })
    }

    pub fn is_connecting(&self) -> bool {
        matches!(self, Self::Connecting { .. })
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }

    pub fn is_ended(&self) -> bool {
        matches!(self, Self::Ended { .. })
    }
}

/// State transitions for calls.
#[derive(Debug, Clone)]
pub enum CallTransition {
    /// Callee answered locally.
    LocalAccepted,
    /// Caller received the remote answer.
    RemoteAnswered,
    /// Transport reported connectivity.
    MediaConnected,
    /// Terminal, from any non-ended state.
    Terminated { reason: EndCallReason },
}

/// Full call session information.
#[derive(Debug, Clone, Serialize)]
pub struct CallInfo {
    pub conversation_id: ConversationId,
    pub peer_id: PeerId,
    pub nonce: SessionNonce,
    pub role: CallRole,
    pub media_kind: MediaKind,
    pub state: CallState,
    pub created_at: DateTime<Utc>,
    /// Local audio toggle. Mutated only by local user action.
    pub muted: bool,
    /// Local video toggle. Forced true for the lifetime of audio sessions.
    pub video_suppressed: bool,
}

impl CallInfo {
    pub fn new_outgoing(
        conversation_id: ConversationId,
        peer_id: PeerId,
        media_kind: MediaKind,
    ) -> Self {
        Self {
            conversation_id,
            peer_id,
            nonce: SessionNonce::generate(),
            role: CallRole::Caller,
            media_kind,
            state: CallState::Ringing {
                started_at: Utc::now(),
            },
            created_at: Utc::now(),
            muted: false,
            video_suppressed: !media_kind.is_video(),
        }
    }

    pub fn new_incoming(
        conversation_id: ConversationId,
        peer_id: PeerId,
        nonce: SessionNonce,
        media_kind: MediaKind,
    ) -> Self {
        Self {
            conversation_id,
            peer_id,
            nonce,
            role: CallRole::Callee,
            media_kind,
            state: CallState::Ringing {
                started_at: Utc::now(),
            },
            created_at: Utc::now(),
            muted: false,
            video_suppressed: !media_kind.is_video(),
        }
    }

    /// Seconds connected so far. `None` before connectivity; frozen once ended.
    pub fn duration_secs(&self) -> Option<i64> {
        match &self.state {
            CallState::Connected { connected_at } => {
                Some(Utc::now().signed_duration_since(*connected_at).num_seconds())
            }
            CallState::Ended { duration_secs, .. } => *duration_secs,
            _ => None,
        }
    }

    /// Read-only view handed to the presentation layer.
    pub fn snapshot(&self) -> CallSnapshot {
        CallSnapshot {
            conversation_id: self.conversation_id.clone(),
            role: self.role,
            media_kind: self.media_kind,
            state: self.state.clone(),
            duration_secs: self.duration_secs(),
            muted: self.muted,
            video_suppressed: self.video_suppressed,
        }
    }

    /// Apply a state transition. Returns error if transition is invalid.
    pub fn apply_transition(
        &mut self,
        transition: CallTransition,
    ) -> Result<(), InvalidTransition> {
        let new_state = match (&self.state, &transition, self.role) {
            (CallState::Ringing { .. }, CallTransition::LocalAccepted, CallRole::Callee) => {
                CallState::Connecting {
                    accepted_at: Utc::now(),
                }
            }
            (CallState::Ringing { .. }, CallTransition::RemoteAnswered, CallRole::Caller) => {
                CallState::Connecting {
                    accepted_at: Utc::now(),
                }
            }
            (CallState::Connecting { .. }, CallTransition::MediaConnected, _) => {
                CallState::Connected {
                    connected_at: Utc::now(),
                }
            }
            (
                CallState::Ringing { .. } | CallState::Connecting { .. },
                CallTransition::Terminated { reason },
                _,
            ) => CallState::Ended {
                reason: *reason,
                ended_at: Utc::now(),
                duration_secs: None,
            },
            (CallState::Connected { connected_at }, CallTransition::Terminated { reason }, _) => {
                let duration = Utc::now()
                    .signed_duration_since(*connected_at)
                    .num_seconds();
                CallState::Ended {
                    reason: *reason,
                    ended_at: Utc::now(),
                    duration_secs: Some(duration),
                }
            }
            (current, attempted, _) => {
                return Err(InvalidTransition {
                    current_state: format!("{:?}", current),
                    attempted: format!("{:?}", attempted),
                });
            }
        };
        self.state = new_state;
        Ok(())
    }
}

/// Read-only state exposed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct CallSnapshot {
    pub conversation_id: ConversationId,
    pub role: CallRole,
    pub media_kind: MediaKind,
    #[serde(flatten)]
    pub state: CallState,
    pub duration_secs: Option<i64>,
    pub muted: bool,
    pub video_suppressed: bool,
}

#[derive(Debug, Clone)]
pub struct InvalidTransition {
    pub current_state: String,
    pub attempted: String,
}

impl std::fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid transition {} in state {}",
            self.attempted, self.current_state
        )
    }
}

impl std::error::Error for InvalidTransition {}
