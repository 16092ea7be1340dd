//! Call manager for orchestrating the call lifecycle.
//!
//! One [`CallManager`] lives for the lifetime of the client. It owns every
//! call session, drives media acquisition and peer negotiation in response
//! to local commands and inbound signaling, and reports observable state to
//! the presentation layer through [`CallObserver`].
//!
//! All collaborators are injected at construction; nothing is read from
//! ambient global state.

use async_trait::async_trait;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, mpsc};

use super::channel::{CallSignalingAdapter, SignalingChannel};
use super::error::CallError;
use super::media::{LocalMedia, MediaSource, RemoteStream};
use super::peer::{Connectivity, PeerConnector, PeerEvent, PeerLink};
use super::signaling::{CallSignal, SessionDescription, SignalBody};
use super::state::{CallInfo, CallSnapshot, CallTransition};
use crate::types::call::{CallRole, ConversationId, EndCallReason, MediaKind, PeerId, SessionNonce};

/// Callback trait for presentation-layer updates.
///
/// The UI implements this to render call state; it never sees errors, only
/// state changes. Stream handles are capabilities to bind to render targets,
/// not references into this crate.
#[async_trait]
pub trait CallObserver: Send + Sync {
    /// Called on every state change and once per second while connected.
    async fn on_call_state(&self, snapshot: CallSnapshot);

    /// Called when the inbound media stream arrives.
    async fn on_remote_stream(&self, conversation_id: ConversationId, stream: RemoteStream);
}

/// Configuration for the call manager.
#[derive(Clone)]
pub struct CallConfig {
    /// Seconds an unanswered call rings before auto-ending.
    pub ring_timeout_secs: u64,
    /// Optional presentation-layer observer.
    pub observer: Option<Arc<dyn CallObserver>>,
}

impl std::fmt::Debug for CallConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallConfig")
            .field("ring_timeout_secs", &self.ring_timeout_secs)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            ring_timeout_secs: 45,
            observer: None,
        }
    }
}

/// One live (or recently ended) call session and its resources.
struct ActiveCall {
    info: CallInfo,
    /// Exists iff negotiation has started and the session is not ended.
    peer: Option<Arc<PeerLink>>,
    local_media: Option<LocalMedia>,
    remote_stream: Option<RemoteStream>,
    /// Offer held for the callee until the user accepts.
    pending_offer: Option<SessionDescription>,
    /// Candidates received before the peer connection exists.
    early_candidates: Vec<super::signaling::IceCandidate>,
}

impl ActiveCall {
    fn new(info: CallInfo) -> Self {
        Self {
            info,
            peer: None,
            local_media: None,
            remote_stream: None,
            pending_offer: None,
            early_candidates: Vec::new(),
        }
    }

    fn is_current(&self, nonce: SessionNonce) -> bool {
        self.info.nonce == nonce && !self.info.state.is_ended()
    }
}

/// Manages call sessions and their state transitions.
pub struct CallManager {
    /// Our account id.
    our_id: PeerId,
    config: CallConfig,
    adapter: CallSignalingAdapter,
    media_source: Arc<dyn MediaSource>,
    connector: Arc<dyn PeerConnector>,
    /// Sessions indexed by conversation. At most one non-ended per key.
    calls: RwLock<HashMap<ConversationId, ActiveCall>>,
}

impl CallManager {
    /// Create a new call manager. All collaborators are injected.
    pub fn new(
        our_id: PeerId,
        channel: Arc<dyn SignalingChannel>,
        media_source: Arc<dyn MediaSource>,
        connector: Arc<dyn PeerConnector>,
        config: CallConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            our_id,
            config,
            adapter: CallSignalingAdapter::new(channel),
            media_source,
            connector,
            calls: RwLock::new(HashMap::new()),
        })
    }

    // ==================== Commands ====================

    /// Start an outgoing call.
    ///
    /// Creates the session in ringing and kicks off media acquisition and
    /// offer creation asynchronously. Any failure along that path routes the
    /// session to ended rather than surfacing here.
    pub async fn start_call(
        self: &Arc<Self>,
        conversation_id: ConversationId,
        peer_id: PeerId,
        media_kind: MediaKind,
    ) -> Result<(), CallError> {
        self.cleanup_ended_calls().await;

        let (nonce, snapshot) = {
            let mut calls = self.calls.write().await;
            if calls
                .get(&conversation_id)
                .is_some_and(|c| !c.info.state.is_ended())
            {
                return Err(CallError::AlreadyExists(conversation_id.to_string()));
            }

            let info = CallInfo::new_outgoing(conversation_id.clone(), peer_id, media_kind);
            let nonce = info.nonce;
            let snapshot = info.snapshot();
            calls.insert(conversation_id.clone(), ActiveCall::new(info));
            (nonce, snapshot)
        };

        info!(
            "starting {:?} call in {} (session {})",
            media_kind, conversation_id, nonce
        );
        self.notify_state(snapshot).await;

        tokio::spawn(
            self.clone()
                .run_ring_timeout(conversation_id.clone(), nonce),
        );
        tokio::spawn(
            self.clone()
                .run_negotiation(conversation_id, nonce, media_kind, None),
        );
        Ok(())
    }

    /// Accept an incoming call. Valid only while ringing as callee; a
    /// missing session or any other state is a logged no-op, so a second
    /// accept while the first is still acquiring media cannot create a
    /// second peer connection.
    pub async fn accept_call(
        self: &Arc<Self>,
        conversation_id: &ConversationId,
    ) -> Result<(), CallError> {
        let (nonce, media_kind, offer, snapshot) = {
            let mut calls = self.calls.write().await;
            let Some(call) = calls.get_mut(conversation_id) else {
                debug!("ignoring accept for {}: no session", conversation_id);
                return Ok(());
            };

            if call.info.role != CallRole::Callee || !call.info.state.is_ringing() {
                debug!(
                    "ignoring accept for {} ({:?}, {:?})",
                    conversation_id, call.info.role, call.info.state
                );
                return Ok(());
            }

            call.info.apply_transition(CallTransition::LocalAccepted)?;
            (
                call.info.nonce,
                call.info.media_kind,
                call.pending_offer.take(),
                call.info.snapshot(),
            )
        };

        info!("accepted call in {}", conversation_id);
        self.notify_state(snapshot).await;

        let Some(offer) = offer else {
            // The offer is stored when the session is registered; its
            // absence means the session was corrupted upstream.
            warn!("no pending offer for accepted call in {}", conversation_id);
            self.terminate_local(
                conversation_id,
                nonce,
                EndCallReason::NegotiationFailed,
                true,
            )
            .await;
            return Ok(());
        };

        tokio::spawn(self.clone().run_negotiation(
            conversation_id.clone(),
            nonce,
            media_kind,
            Some(offer),
        ));
        Ok(())
    }

    /// End a call in any non-ended state.
    ///
    /// Local cleanup is unconditional; notifying the peer is best-effort and
    /// never blocks or fails the local transition. A second hangup for the
    /// same session is a no-op and cannot send a second end frame.
    pub async fn end_call(&self, conversation_id: &ConversationId) {
        let nonce = {
            let calls = self.calls.read().await;
            match calls.get(conversation_id) {
                Some(call) => call.info.nonce,
                None => return,
            }
        };
        self.terminate_local(conversation_id, nonce, EndCallReason::UserHangup, true)
            .await;
    }

    /// Toggle the local microphone. No-op before a local stream exists.
    pub async fn toggle_mute(&self, conversation_id: &ConversationId) {
        let snapshot = {
            let mut calls = self.calls.write().await;
            let Some(call) = calls.get_mut(conversation_id) else {
                return;
            };
            if call.info.state.is_ended() {
                return;
            }
            let Some(media) = &call.local_media else {
                return;
            };
            call.info.muted = !call.info.muted;
            media.set_audio_enabled(!call.info.muted);
            call.info.snapshot()
        };
        self.notify_state(snapshot).await;
    }

    /// Toggle the local camera. No-op for audio-only sessions (video stays
    /// suppressed for their lifetime) and before a local stream exists.
    pub async fn toggle_video(&self, conversation_id: &ConversationId) {
        let snapshot = {
            let mut calls = self.calls.write().await;
            let Some(call) = calls.get_mut(conversation_id) else {
                return;
            };
            if call.info.state.is_ended() || !call.info.media_kind.is_video() {
                return;
            }
            let Some(media) = &call.local_media else {
                return;
            };
            call.info.video_suppressed = !call.info.video_suppressed;
            media.set_video_enabled(!call.info.video_suppressed);
            call.info.snapshot()
        };
        self.notify_state(snapshot).await;
    }

    // ==================== Inbound signaling ====================

    /// Feed one raw frame from the shared channel.
    ///
    /// Returns true when the frame was call traffic (consumed), false when
    /// it belongs to the rest of the client. Malformed call-shaped frames
    /// decode to nothing and fall through as unconsumed.
    pub async fn handle_frame(self: &Arc<Self>, raw: &str) -> bool {
        let Some(signal) = CallSignalingAdapter::decode(raw) else {
            return false;
        };
        if signal.recipient_id != self.our_id {
            debug!("ignoring call frame addressed to {}", signal.recipient_id);
            return true;
        }
        debug!(
            "received {} for {} (session {})",
            signal.kind_name(),
            signal.conversation_id,
            signal.session
        );
        self.route(signal).await;
        true
    }

    async fn route(self: &Arc<Self>, signal: CallSignal) {
        let conversation_id = signal.conversation_id.clone();
        match signal.body {
            SignalBody::CallOffer {
                media_kind,
                description,
            } => {
                self.handle_offer(conversation_id, signal.sender_id, signal.session, media_kind, description)
                    .await;
            }
            SignalBody::CallAnswer { description } => {
                self.handle_answer(conversation_id, signal.session, description)
                    .await;
            }
            SignalBody::CallCandidate { candidate } => {
                self.handle_candidate(conversation_id, signal.session, candidate)
                    .await;
            }
            SignalBody::CallEnd => {
                self.terminate_local(
                    &conversation_id,
                    signal.session,
                    EndCallReason::RemoteHangup,
                    // No outbound end: echoing would loop between clients.
                    false,
                )
                .await;
            }
        }
    }

    async fn handle_offer(
        self: &Arc<Self>,
        conversation_id: ConversationId,
        sender_id: PeerId,
        nonce: SessionNonce,
        media_kind: MediaKind,
        description: SessionDescription,
    ) {
        self.cleanup_ended_calls().await;

        let snapshot = {
            let mut calls = self.calls.write().await;
            if calls
                .get(&conversation_id)
                .is_some_and(|c| !c.info.state.is_ended())
            {
                debug!(
                    "dropping offer for {}: call already in progress",
                    conversation_id
                );
                return;
            }

            let info =
                CallInfo::new_incoming(conversation_id.clone(), sender_id, nonce, media_kind);
            let snapshot = info.snapshot();
            let mut call = ActiveCall::new(info);
            call.pending_offer = Some(description);
            calls.insert(conversation_id.clone(), call);
            snapshot
        };

        info!(
            "incoming {:?} call in {} (session {})",
            media_kind, conversation_id, nonce
        );
        self.notify_state(snapshot).await;
        tokio::spawn(self.clone().run_ring_timeout(conversation_id, nonce));
    }

    async fn handle_answer(
        self: &Arc<Self>,
        conversation_id: ConversationId,
        nonce: SessionNonce,
        description: SessionDescription,
    ) {
        let (link, snapshot) = {
            let mut calls = self.calls.write().await;
            let Some(call) = calls.get_mut(&conversation_id) else {
                debug!("dropping answer for {}: no session", conversation_id);
                return;
            };
            if !call.is_current(nonce)
                || call.info.role != CallRole::Caller
                || !call.info.state.is_ringing()
            {
                debug!("dropping answer for {}: not awaiting one", conversation_id);
                return;
            }
            if let Err(e) = call.info.apply_transition(CallTransition::RemoteAnswered) {
                warn!("answer for {} rejected: {}", conversation_id, e);
                return;
            }
            (call.peer.clone(), call.info.snapshot())
        };

        self.notify_state(snapshot).await;

        let Some(link) = link else {
            // The offer is only sent once the peer connection is installed,
            // so an answer without one means the session is being torn down.
            debug!("answer for {} arrived without a peer", conversation_id);
            return;
        };
        if let Err(e) = link.apply_remote_description(description).await {
            warn!("failed to apply answer for {}: {}", conversation_id, e);
            self.terminate_local(
                &conversation_id,
                nonce,
                EndCallReason::NegotiationFailed,
                true,
            )
            .await;
        }
    }

    async fn handle_candidate(
        &self,
        conversation_id: ConversationId,
        nonce: SessionNonce,
        candidate: super::signaling::IceCandidate,
    ) {
        let link = {
            let mut calls = self.calls.write().await;
            match calls.get_mut(&conversation_id) {
                Some(call) if call.is_current(nonce) => match &call.peer {
                    Some(link) => link.clone(),
                    None => {
                        call.early_candidates.push(candidate);
                        return;
                    }
                },
                _ => {
                    debug!(
                        "dropping candidate for {}: no active session",
                        conversation_id
                    );
                    return;
                }
            }
        };
        link.add_remote_candidate(candidate).await;
    }

    // ==================== Negotiation ====================

    /// The connecting-state pipeline: acquire media, build the peer
    /// connection, then either answer the stored offer (callee) or produce
    /// and send a fresh offer (caller). Every failure is converted into a
    /// single terminal transition; nothing propagates out of this task.
    async fn run_negotiation(
        self: Arc<Self>,
        conversation_id: ConversationId,
        nonce: SessionNonce,
        media_kind: MediaKind,
        remote_offer: Option<SessionDescription>,
    ) {
        let media = match self.media_source.acquire(media_kind).await {
            Ok(media) => media,
            Err(e) => {
                warn!("media acquisition failed for {}: {}", conversation_id, e);
                self.terminate_local(&conversation_id, nonce, EndCallReason::MediaFailed, true)
                    .await;
                return;
            }
        };

        let (session, events) = match self.connector.create(media_kind).await {
            Ok(pair) => pair,
            Err(e) => {
                warn!("peer connection failed for {}: {}", conversation_id, e);
                media.release();
                self.terminate_local(
                    &conversation_id,
                    nonce,
                    EndCallReason::NegotiationFailed,
                    true,
                )
                .await;
                return;
            }
        };

        if let Err(e) = session.attach_local_media(&media).await {
            warn!("failed to attach media for {}: {}", conversation_id, e);
            media.release();
            session.close().await;
            self.terminate_local(
                &conversation_id,
                nonce,
                EndCallReason::NegotiationFailed,
                true,
            )
            .await;
            return;
        }

        let installed = {
            let mut calls = self.calls.write().await;
            match calls.get_mut(&conversation_id) {
                Some(call) if call.is_current(nonce) => {
                    let link = Arc::new(PeerLink::new(session.clone()));
                    call.peer = Some(link.clone());
                    call.local_media = Some(media.clone());
                    let early = std::mem::take(&mut call.early_candidates);
                    Some((link, early, call.info.peer_id.clone()))
                }
                _ => None,
            }
        };
        let Some((link, early_candidates, peer_id)) = installed else {
            // Superseded while acquiring media: the devices must still be
            // returned even though the session will never use them.
            debug!("negotiation for {} superseded; releasing", conversation_id);
            media.release();
            session.close().await;
            return;
        };

        tokio::spawn(
            self.clone()
                .run_peer_events(conversation_id.clone(), nonce, events),
        );

        for candidate in early_candidates {
            link.add_remote_candidate(candidate).await;
        }

        match remote_offer {
            // Callee: answer the stored offer.
            Some(offer) => {
                if let Err(e) = link.apply_remote_description(offer).await {
                    warn!("failed to apply offer for {}: {}", conversation_id, e);
                    self.terminate_local(
                        &conversation_id,
                        nonce,
                        EndCallReason::NegotiationFailed,
                        true,
                    )
                    .await;
                    return;
                }
                let answer = match link.session().create_answer().await {
                    Ok(description) => description,
                    Err(e) => {
                        warn!("failed to create answer for {}: {}", conversation_id, e);
                        self.terminate_local(
                            &conversation_id,
                            nonce,
                            EndCallReason::NegotiationFailed,
                            true,
                        )
                        .await;
                        return;
                    }
                };
                let signal = self.signal(
                    &conversation_id,
                    &peer_id,
                    nonce,
                    SignalBody::CallAnswer {
                        description: answer,
                    },
                );
                self.adapter.send(&signal).await;
            }
            // Caller: produce and send a fresh offer.
            None => {
                let offer = match link.session().create_offer().await {
                    Ok(description) => description,
                    Err(e) => {
                        warn!("failed to create offer for {}: {}", conversation_id, e);
                        self.terminate_local(
                            &conversation_id,
                            nonce,
                            EndCallReason::NegotiationFailed,
                            true,
                        )
                        .await;
                        return;
                    }
                };
                let signal = self.signal(
                    &conversation_id,
                    &peer_id,
                    nonce,
                    SignalBody::CallOffer {
                        media_kind,
                        description: offer,
                    },
                );
                self.adapter.send(&signal).await;
            }
        }
    }

    /// Pump peer events into state transitions and outbound candidates.
    async fn run_peer_events(
        self: Arc<Self>,
        conversation_id: ConversationId,
        nonce: SessionNonce,
        mut events: mpsc::Receiver<PeerEvent>,
    ) {
        while let Some(event) = events.recv().await {
            match event {
                PeerEvent::LocalCandidate(candidate) => {
                    let outbound = {
                        let calls = self.calls.read().await;
                        calls
                            .get(&conversation_id)
                            .filter(|call| call.is_current(nonce))
                            .map(|call| {
                                self.signal(
                                    &conversation_id,
                                    &call.info.peer_id,
                                    nonce,
                                    SignalBody::CallCandidate { candidate },
                                )
                            })
                    };
                    match outbound {
                        Some(signal) => self.adapter.send(&signal).await,
                        None => break,
                    }
                }
                PeerEvent::RemoteStream(stream) => {
                    let current = {
                        let mut calls = self.calls.write().await;
                        match calls.get_mut(&conversation_id) {
                            Some(call) if call.is_current(nonce) => {
                                call.remote_stream = Some(stream.clone());
                                true
                            }
                            _ => false,
                        }
                    };
                    if !current {
                        break;
                    }
                    self.notify_remote_stream(conversation_id.clone(), stream)
                        .await;
                }
                PeerEvent::Connectivity(Connectivity::Connected) => {
                    let snapshot = {
                        let mut calls = self.calls.write().await;
                        calls
                            .get_mut(&conversation_id)
                            .filter(|call| call.is_current(nonce))
                            .and_then(|call| {
                                if !call.info.state.is_connecting() {
                                    return None;
                                }
                                call.info
                                    .apply_transition(CallTransition::MediaConnected)
                                    .ok()?;
                                Some(call.info.snapshot())
                            })
                    };
                    if let Some(snapshot) = snapshot {
                        info!("call in {} connected", conversation_id);
                        self.notify_state(snapshot).await;
                        tokio::spawn(
                            self.clone()
                                .run_duration_ticker(conversation_id.clone(), nonce),
                        );
                    }
                }
                PeerEvent::Connectivity(Connectivity::Disconnected | Connectivity::Failed) => {
                    self.terminate_local(
                        &conversation_id,
                        nonce,
                        EndCallReason::ConnectionLost,
                        true,
                    )
                    .await;
                    break;
                }
            }
        }
    }

    /// Push a snapshot to the observer once per second while connected, so
    /// the rendered duration ticks. Stops the moment the session leaves
    /// connected; the frozen duration is carried by the ended snapshot.
    async fn run_duration_ticker(
        self: Arc<Self>,
        conversation_id: ConversationId,
        nonce: SessionNonce,
    ) {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        interval.tick().await;
        loop {
            interval.tick().await;
            let snapshot = {
                let calls = self.calls.read().await;
                calls
                    .get(&conversation_id)
                    .filter(|call| call.is_current(nonce) && call.info.state.is_connected())
                    .map(|call| call.info.snapshot())
            };
            match snapshot {
                Some(snapshot) => self.notify_state(snapshot).await,
                None => break,
            }
        }
    }

    /// Auto-end a call nobody answered.
    async fn run_ring_timeout(self: Arc<Self>, conversation_id: ConversationId, nonce: SessionNonce) {
        tokio::time::sleep(Duration::from_secs(self.config.ring_timeout_secs)).await;
        let still_ringing = {
            let calls = self.calls.read().await;
            calls
                .get(&conversation_id)
                .is_some_and(|call| call.is_current(nonce) && call.info.state.is_ringing())
        };
        if still_ringing {
            info!("call in {} rang out", conversation_id);
            self.terminate_local(&conversation_id, nonce, EndCallReason::Timeout, true)
                .await;
        }
    }

    // ==================== Teardown ====================

    /// The single path into the ended state.
    ///
    /// Releases local media and closes the peer connection unconditionally,
    /// then best-effort notifies the peer (unless the end came from them).
    /// Stale nonces and already-ended sessions are no-ops, which also
    /// guarantees at most one outbound end frame per session.
    async fn terminate_local(
        &self,
        conversation_id: &ConversationId,
        nonce: SessionNonce,
        reason: EndCallReason,
        notify_peer: bool,
    ) {
        let (outbound, snapshot, peer, media) = {
            let mut calls = self.calls.write().await;
            let Some(call) = calls.get_mut(conversation_id) else {
                return;
            };
            if !call.is_current(nonce) {
                return;
            }
            if let Err(e) = call
                .info
                .apply_transition(CallTransition::Terminated { reason })
            {
                warn!("failed to end call in {}: {}", conversation_id, e);
                return;
            }

            let peer = call.peer.take();
            let media = call.local_media.take();
            call.remote_stream = None;
            call.pending_offer = None;
            call.early_candidates.clear();

            let outbound = notify_peer
                .then(|| self.signal(conversation_id, &call.info.peer_id, nonce, SignalBody::CallEnd));
            (outbound, call.info.snapshot(), peer, media)
        };

        // Local cleanup happens before, and regardless of, any network send.
        if let Some(media) = media {
            media.release();
        }
        if let Some(peer) = peer {
            peer.close().await;
        }
        if let Some(signal) = outbound {
            self.adapter.send(&signal).await;
        }

        info!("call in {} ended: {:?}", conversation_id, reason);
        self.notify_state(snapshot).await;
    }

    // ==================== Queries ====================

    /// Read-only state for one conversation's call, if any.
    pub async fn snapshot(&self, conversation_id: &ConversationId) -> Option<CallSnapshot> {
        self.calls
            .read()
            .await
            .get(conversation_id)
            .map(|call| call.info.snapshot())
    }

    /// Handle to the inbound stream, once it has arrived.
    pub async fn remote_stream(&self, conversation_id: &ConversationId) -> Option<RemoteStream> {
        self.calls
            .read()
            .await
            .get(conversation_id)
            .and_then(|call| call.remote_stream.clone())
    }

    /// Handle to the local capture, for self-view rendering.
    pub async fn local_media(&self, conversation_id: &ConversationId) -> Option<LocalMedia> {
        self.calls
            .read()
            .await
            .get(conversation_id)
            .and_then(|call| call.local_media.clone())
    }

    /// Whether any non-ended call exists.
    pub async fn has_active_call(&self) -> bool {
        self.calls
            .read()
            .await
            .values()
            .any(|call| !call.info.state.is_ended())
    }

    /// Drop ended sessions. Called before admitting a new call so the UI
    /// gets a window to show the terminal state.
    pub async fn cleanup_ended_calls(&self) {
        let mut calls = self.calls.write().await;
        calls.retain(|_, call| !call.info.state.is_ended());
    }

    // ==================== Internals ====================

    fn signal(
        &self,
        conversation_id: &ConversationId,
        peer_id: &PeerId,
        nonce: SessionNonce,
        body: SignalBody,
    ) -> CallSignal {
        CallSignal {
            conversation_id: conversation_id.clone(),
            sender_id: self.our_id.clone(),
            recipient_id: peer_id.clone(),
            session: nonce,
            body,
        }
    }

    async fn notify_state(&self, snapshot: CallSnapshot) {
        if let Some(observer) = &self.config.observer {
            observer.on_call_state(snapshot).await;
        }
    }

    async fn notify_remote_stream(&self, conversation_id: ConversationId, stream: RemoteStream) {
        if let Some(observer) = &self.config.observer {
            observer.on_remote_stream(conversation_id, stream).await;
        }
    }
}
