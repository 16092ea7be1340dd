//! Peer connection seam and remote-candidate ordering.
//!
//! The crate never talks to a platform WebRTC stack directly. A
//! [`PeerConnector`] builds one [`PeerSession`] per call; the session
//! delivers [`PeerEvent`]s (discovered local candidates, the inbound stream,
//! coarse connectivity) over an mpsc channel owned by the manager.

use async_trait::async_trait;
use log::{debug, warn};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, mpsc};

use super::media::{LocalMedia, RemoteStream};
use super::signaling::{IceCandidate, SessionDescription};
use crate::types::call::MediaKind;

#[derive(Debug, Clone, Error)]
pub enum PeerError {
    #[error("negotiation failed: {0}")]
    Negotiation(String),

    #[error("peer connection closed")]
    Closed,
}

/// Coarse connectivity derived from the underlying connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    Connected,
    Disconnected,
    Failed,
}

/// Events emitted by a peer session while negotiation runs.
#[derive(Debug, Clone)]
pub enum PeerEvent {
    /// A local network candidate was discovered; forward it to the peer.
    LocalCandidate(IceCandidate),
    /// Inbound media tracks arrived.
    RemoteStream(RemoteStream),
    /// Connection state changed.
    Connectivity(Connectivity),
}

/// One peer-to-peer connection, exclusively owned by a call session.
#[async_trait]
pub trait PeerSession: Send + Sync {
    /// Attach local tracks. Must happen before creating a description.
    async fn attach_local_media(&self, media: &LocalMedia) -> Result<(), PeerError>;

    /// Produce the local offer. At most once per session.
    async fn create_offer(&self) -> Result<SessionDescription, PeerError>;

    /// Produce the local answer. At most once per session.
    async fn create_answer(&self) -> Result<SessionDescription, PeerError>;

    /// Apply the counterpart's offer or answer.
    async fn apply_remote_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), PeerError>;

    /// Feed one discovered network path.
    async fn add_remote_candidate(&self, candidate: IceCandidate) -> Result<(), PeerError>;

    /// Close the connection and discard all listeners.
    ///
    /// Safe to call even if negotiation never completed.
    async fn close(&self);
}

/// Builds one connection per session, handing back its event stream.
#[async_trait]
pub trait PeerConnector: Send + Sync {
    async fn create(
        &self,
        media_kind: MediaKind,
    ) -> Result<(Arc<dyn PeerSession>, mpsc::Receiver<PeerEvent>), PeerError>;
}

/// Orders remote candidates behind the remote description.
///
/// The signaling channel is ordered per conversation, but candidates are
/// discovered asynchronously on the far side and may legitimately arrive
/// before the description. Early arrivals are buffered and replayed once
/// the description is set.
pub struct PeerLink {
    session: Arc<dyn PeerSession>,
    gate: Mutex<CandidateGate>,
}

#[derive(Default)]
struct CandidateGate {
    description_applied: bool,
    pending: Vec<IceCandidate>,
}

impl PeerLink {
    pub fn new(session: Arc<dyn PeerSession>) -> Self {
        Self {
            session,
            gate: Mutex::new(CandidateGate::default()),
        }
    }

    pub fn session(&self) -> &Arc<dyn PeerSession> {
        &self.session
    }

    /// Apply the remote description, then replay any buffered candidates.
    pub async fn apply_remote_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), PeerError> {
        self.session.apply_remote_description(description).await?;

        let drained = {
            let mut gate = self.gate.lock().await;
            gate.description_applied = true;
            std::mem::take(&mut gate.pending)
        };
        if !drained.is_empty() {
            debug!("replaying {} buffered remote candidates", drained.len());
        }
        for candidate in drained {
            if let Err(e) = self.session.add_remote_candidate(candidate).await {
                warn!("discarding buffered remote candidate: {}", e);
            }
        }
        Ok(())
    }

    /// Feed one remote candidate, buffering it if the description has not
    /// been applied yet. Add failures are logged and swallowed, never fatal
    /// to the session.
    pub async fn add_remote_candidate(&self, candidate: IceCandidate) {
        {
            let mut gate = self.gate.lock().await;
            if !gate.description_applied {
                gate.pending.push(candidate);
                return;
            }
        }
        if let Err(e) = self.session.add_remote_candidate(candidate).await {
            warn!("discarding remote candidate: {}", e);
        }
    }

    pub async fn close(&self) {
        self.session.close().await;
    }
}
