//! Peer-to-peer call establishment and signaling.
//!
//! Negotiates an audio/video session between two clients through a relay
//! that only forwards opaque frames; all media-plane logic stays on the
//! clients.
//!
//! # Architecture
//!
//! - [`CallState`] & [`CallInfo`]: state machine tracking the call lifecycle
//!   (ringing → connecting → connected → ended)
//! - [`CallSignal`]: the four wire message kinds (offer, answer, candidate,
//!   end) carried as JSON on the shared channel
//! - [`CallSignalingAdapter`] & [`SignalingChannel`]: filter over the shared
//!   stream; everything non-call passes through untouched
//! - [`MediaSource`] & [`LocalMedia`]: camera/microphone acquisition with
//!   per-track toggles and unconditional release on teardown
//! - [`PeerSession`] & [`PeerLink`]: the negotiation primitives, with
//!   buffer-and-replay ordering for early remote candidates
//! - [`CallManager`]: the orchestrator; owns sessions, drives negotiation,
//!   and exposes commands plus observable state to the presentation layer
//!
//! # Flow
//!
//! The caller acquires media, creates an offer and pushes it through the
//! relay; the callee rings, and on accept acquires media, applies the offer
//! and returns an answer. Both sides then trade discovered candidates until
//! the transport reports connectivity and the call turns connected.

mod channel;
mod error;
mod manager;
mod media;
mod peer;
mod signaling;
mod state;

pub use channel::{CallSignalingAdapter, ChannelClosed, SignalingChannel};
pub use error::CallError;
pub use manager::{CallConfig, CallManager, CallObserver};
pub use media::{LocalMedia, MediaError, MediaSource, MediaTrack, RemoteStream};
pub use peer::{Connectivity, PeerConnector, PeerError, PeerEvent, PeerLink, PeerSession};
pub use signaling::{CallSignal, IceCandidate, SdpKind, SessionDescription, SignalBody};
pub use state::{CallInfo, CallSnapshot, CallState, CallTransition, InvalidTransition};
