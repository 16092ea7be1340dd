// tests/call_e2e_test.rs
//
// End-to-end test simulating a call between two clients wired through an
// in-memory relay. The relay forwards opaque frames only; all call logic
// runs in the two managers.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

use emberly_calls::calls::{
    CallConfig, CallManager, CallState, ChannelClosed, Connectivity, IceCandidate, LocalMedia,
    MediaError, MediaSource, MediaTrack, PeerConnector, PeerError, PeerEvent, PeerSession,
    RemoteStream, SessionDescription, SignalingChannel,
};
use emberly_calls::types::call::{ConversationId, MediaKind, PeerId};

/// Shared log of every frame that crossed the relay, in order.
#[derive(Default)]
struct RelayLog {
    frames: StdMutex<Vec<String>>,
}

impl RelayLog {
    fn count_kind(&self, kind: &str) -> usize {
        let needle = format!("\"kind\":\"{kind}\"");
        self.frames
            .lock()
            .unwrap()
            .iter()
            .filter(|f| f.contains(&needle))
            .count()
    }
}

/// One direction of the relay: frames sent here land in the partner's inbox.
struct RelayChannel {
    inbox: mpsc::UnboundedSender<String>,
    log: Arc<RelayLog>,
}

#[async_trait]
impl SignalingChannel for RelayChannel {
    async fn send(&self, frame: String) -> Result<(), ChannelClosed> {
        self.log.frames.lock().unwrap().push(frame.clone());
        self.inbox.send(frame).map_err(|_| ChannelClosed)
    }
}

/// Capture source that records every handle it gives out.
#[derive(Default)]
struct CaptureFake {
    handles: StdMutex<Vec<LocalMedia>>,
}

#[async_trait]
impl MediaSource for CaptureFake {
    async fn acquire(&self, kind: MediaKind) -> Result<LocalMedia, MediaError> {
        let media = LocalMedia::new(MediaTrack::new(), kind.is_video().then(MediaTrack::new));
        self.handles.lock().unwrap().push(media.clone());
        Ok(media)
    }
}

/// Peer session that behaves like a cooperative transport: discovers one
/// candidate when media is attached, and reports a stream plus connectivity
/// once the remote description lands.
struct ActiveSession {
    label: &'static str,
    events: mpsc::Sender<PeerEvent>,
    connected_emitted: AtomicBool,
    remote_candidates: AtomicUsize,
    closed: AtomicBool,
}

#[async_trait]
impl PeerSession for ActiveSession {
    async fn attach_local_media(&self, _media: &LocalMedia) -> Result<(), PeerError> {
        let candidate = IceCandidate::new(format!(
            "candidate:{} 1 UDP 2130706431 10.0.0.1 5000 typ host",
            self.label
        ));
        let _ = self.events.send(PeerEvent::LocalCandidate(candidate)).await;
        Ok(())
    }

    async fn create_offer(&self) -> Result<SessionDescription, PeerError> {
        Ok(SessionDescription::offer(format!("sdp-offer-{}", self.label)))
    }

    async fn create_answer(&self) -> Result<SessionDescription, PeerError> {
        Ok(SessionDescription::answer(format!(
            "sdp-answer-{}",
            self.label
        )))
    }

    async fn apply_remote_description(
        &self,
        _description: SessionDescription,
    ) -> Result<(), PeerError> {
        if !self.connected_emitted.swap(true, Ordering::SeqCst) {
            let stream = RemoteStream::new(format!("stream-from-{}", self.label));
            let _ = self.events.send(PeerEvent::RemoteStream(stream)).await;
            let _ = self
                .events
                .send(PeerEvent::Connectivity(Connectivity::Connected))
                .await;
        }
        Ok(())
    }

    async fn add_remote_candidate(&self, _candidate: IceCandidate) -> Result<(), PeerError> {
        self.remote_candidates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

struct ActiveConnector {
    label: &'static str,
    sessions: StdMutex<Vec<Arc<ActiveSession>>>,
}

#[async_trait]
impl PeerConnector for ActiveConnector {
    async fn create(
        &self,
        _media_kind: MediaKind,
    ) -> Result<(Arc<dyn PeerSession>, mpsc::Receiver<PeerEvent>), PeerError> {
        let (tx, rx) = mpsc::channel(16);
        let session = Arc::new(ActiveSession {
            label: self.label,
            events: tx,
            connected_emitted: AtomicBool::new(false),
            remote_candidates: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
        });
        self.sessions.lock().unwrap().push(session.clone());
        Ok((session, rx))
    }
}

/// One client: a manager plus handles to its fakes.
struct Side {
    manager: Arc<CallManager>,
    media: Arc<CaptureFake>,
    connector: Arc<ActiveConnector>,
}

impl Side {
    fn session(&self, index: usize) -> Arc<ActiveSession> {
        self.connector.sessions.lock().unwrap()[index].clone()
    }
}

/// Two call managers wired through an in-memory relay.
struct CallHarness {
    alice: Side,
    bob: Side,
    log: Arc<RelayLog>,
}

impl CallHarness {
    fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let log = Arc::new(RelayLog::default());
        let (to_bob_tx, to_bob_rx) = mpsc::unbounded_channel();
        let (to_alice_tx, to_alice_rx) = mpsc::unbounded_channel();

        let alice = Self::side("alice", to_bob_tx, to_alice_rx, log.clone());
        let bob = Self::side("bob", to_alice_tx, to_bob_rx, log.clone());
        Self { alice, bob, log }
    }

    fn side(
        label: &'static str,
        outbox: mpsc::UnboundedSender<String>,
        mut inbox: mpsc::UnboundedReceiver<String>,
        log: Arc<RelayLog>,
    ) -> Side {
        let media = Arc::new(CaptureFake::default());
        let connector = Arc::new(ActiveConnector {
            label,
            sessions: StdMutex::new(Vec::new()),
        });
        let manager = CallManager::new(
            PeerId::new(label),
            Arc::new(RelayChannel { inbox: outbox, log }),
            media.clone(),
            connector.clone(),
            CallConfig::default(),
        );

        let pump = manager.clone();
        tokio::spawn(async move {
            while let Some(frame) = inbox.recv().await {
                pump.handle_frame(&frame).await;
            }
        });

        Side {
            manager,
            media,
            connector,
        }
    }
}

fn conv() -> ConversationId {
    ConversationId::new("match-42")
}

async fn wait_until(mut check: impl AsyncFnMut() -> bool) {
    for _ in 0..400 {
        if check().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}

async fn in_state(manager: &Arc<CallManager>, pred: impl Fn(&CallState) -> bool) -> bool {
    manager
        .snapshot(&conv())
        .await
        .is_some_and(|s| pred(&s.state))
}

/// Full audio call: offer/answer/candidates over the relay, both sides
/// connected, then a clean hangup with exactly one end frame.
#[tokio::test]
async fn test_audio_call_end_to_end() {
    let harness = CallHarness::new();

    harness
        .alice
        .manager
        .start_call(conv(), PeerId::new("bob"), MediaKind::Audio)
        .await
        .unwrap();

    // Bob rings
    wait_until(async || in_state(&harness.bob.manager, CallState::is_ringing).await).await;
    let snapshot = harness.bob.manager.snapshot(&conv()).await.unwrap();
    assert_eq!(snapshot.media_kind, MediaKind::Audio);

    harness.bob.manager.accept_call(&conv()).await.unwrap();

    // Both sides reach connected
    wait_until(async || in_state(&harness.alice.manager, CallState::is_connected).await).await;
    wait_until(async || in_state(&harness.bob.manager, CallState::is_connected).await).await;

    let snapshot = harness.alice.manager.snapshot(&conv()).await.unwrap();
    assert!(snapshot.duration_secs.is_some());

    // Candidates crossed in both directions; Alice's was sent before Bob
    // even had a session, so it went through the early buffer.
    let alice_session = harness.alice.session(0);
    let bob_session = harness.bob.session(0);
    wait_until(async || alice_session.remote_candidates.load(Ordering::SeqCst) >= 1).await;
    wait_until(async || bob_session.remote_candidates.load(Ordering::SeqCst) >= 1).await;

    // Each side sees the other's stream
    wait_until(async || harness.alice.manager.remote_stream(&conv()).await.is_some()).await;
    wait_until(async || harness.bob.manager.remote_stream(&conv()).await.is_some()).await;

    // Alice hangs up; Bob ends without echoing
    harness.alice.manager.end_call(&conv()).await;
    wait_until(async || in_state(&harness.bob.manager, CallState::is_ended).await).await;

    let snapshot = harness.bob.manager.snapshot(&conv()).await.unwrap();
    assert!(snapshot.duration_secs.is_some());
    assert_eq!(harness.log.count_kind("call_end"), 1);

    // Devices are released and connections closed on both sides
    assert!(harness.alice.media.handles.lock().unwrap()[0].audio().is_stopped());
    assert!(harness.bob.media.handles.lock().unwrap()[0].audio().is_stopped());
    assert!(alice_session.closed.load(Ordering::SeqCst));
    assert!(bob_session.closed.load(Ordering::SeqCst));
    assert!(!harness.alice.manager.has_active_call().await);
}

/// The callee declines by hanging up while ringing; the caller ends with
/// nothing acquired on the callee's side.
#[tokio::test]
async fn test_callee_declines_while_ringing() {
    let harness = CallHarness::new();

    harness
        .alice
        .manager
        .start_call(conv(), PeerId::new("bob"), MediaKind::Audio)
        .await
        .unwrap();
    wait_until(async || in_state(&harness.bob.manager, CallState::is_ringing).await).await;

    harness.bob.manager.end_call(&conv()).await;
    wait_until(async || in_state(&harness.alice.manager, CallState::is_ended).await).await;

    let snapshot = harness.alice.manager.snapshot(&conv()).await.unwrap();
    assert!(snapshot.duration_secs.is_none());
    assert_eq!(harness.log.count_kind("call_end"), 1);
    assert!(harness.bob.media.handles.lock().unwrap().is_empty());
}

/// Video call: both sides capture camera tracks, and toggling video on one
/// side only affects its own capture.
#[tokio::test]
async fn test_video_call_with_toggles() {
    let harness = CallHarness::new();

    harness
        .alice
        .manager
        .start_call(conv(), PeerId::new("bob"), MediaKind::Video)
        .await
        .unwrap();
    wait_until(async || in_state(&harness.bob.manager, CallState::is_ringing).await).await;

    let snapshot = harness.bob.manager.snapshot(&conv()).await.unwrap();
    assert_eq!(snapshot.media_kind, MediaKind::Video);
    assert!(!snapshot.video_suppressed);

    harness.bob.manager.accept_call(&conv()).await.unwrap();
    wait_until(async || in_state(&harness.alice.manager, CallState::is_connected).await).await;
    wait_until(async || in_state(&harness.bob.manager, CallState::is_connected).await).await;

    let alice_media = harness.alice.media.handles.lock().unwrap()[0].clone();
    let bob_media = harness.bob.media.handles.lock().unwrap()[0].clone();
    assert!(alice_media.video().is_some());
    assert!(bob_media.video().is_some());

    harness.alice.manager.toggle_video(&conv()).await;
    let snapshot = harness.alice.manager.snapshot(&conv()).await.unwrap();
    assert!(snapshot.video_suppressed);
    assert!(!alice_media.video().unwrap().is_enabled());
    assert!(bob_media.video().unwrap().is_enabled());

    harness.alice.manager.toggle_mute(&conv()).await;
    let snapshot = harness.alice.manager.snapshot(&conv()).await.unwrap();
    assert!(snapshot.muted);
    assert!(!alice_media.audio().is_enabled());

    harness.bob.manager.end_call(&conv()).await;
    wait_until(async || in_state(&harness.alice.manager, CallState::is_ended).await).await;
    assert!(alice_media.audio().is_stopped());
    assert!(bob_media.video().unwrap().is_stopped());
}
