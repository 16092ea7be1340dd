//! Local media acquisition and track handles.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

use crate::types::call::MediaKind;

/// A single local capture track (microphone or camera).
///
/// Cloning yields another handle to the same underlying track.
#[derive(Debug, Clone, Default)]
pub struct MediaTrack {
    inner: Arc<TrackInner>,
}

#[derive(Debug)]
struct TrackInner {
    enabled: AtomicBool,
    stopped: AtomicBool,
}

impl Default for TrackInner {
    fn default() -> Self {
        Self {
            enabled: AtomicBool::new(true),
            stopped: AtomicBool::new(false),
        }
    }
}

impl MediaTrack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.inner.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Release the underlying capture device.
    pub fn stop(&self) {
        self.inner.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::SeqCst)
    }
}

/// Handle to locally captured media.
///
/// Exclusively owned by one call session, which must call [`release`] on
/// every path out of connecting/connected, including error paths.
///
/// [`release`]: LocalMedia::release
#[derive(Debug, Clone)]
pub struct LocalMedia {
    audio: MediaTrack,
    video: Option<MediaTrack>,
}

impl LocalMedia {
    pub fn new(audio: MediaTrack, video: Option<MediaTrack>) -> Self {
        Self { audio, video }
    }

    pub fn audio(&self) -> &MediaTrack {
        &self.audio
    }

    pub fn video(&self) -> Option<&MediaTrack> {
        self.video.as_ref()
    }

    pub fn set_audio_enabled(&self, enabled: bool) {
        self.audio.set_enabled(enabled);
    }

    /// Returns false when there is no video track to toggle.
    pub fn set_video_enabled(&self, enabled: bool) -> bool {
        match &self.video {
            Some(track) => {
                track.set_enabled(enabled);
                true
            }
            None => false,
        }
    }

    /// Stop every acquired track.
    pub fn release(&self) {
        self.audio.stop();
        if let Some(video) = &self.video {
            video.stop();
        }
    }
}

/// Acquisition failure (permission denied, no device).
///
/// Distinct and catchable so the state machine can route the session to
/// ended instead of hanging in connecting.
#[derive(Debug, Clone, Error)]
#[error("media acquisition failed: {0}")]
pub struct MediaError(pub String);

/// Platform capture seam.
///
/// Audio is always requested; video only for [`MediaKind::Video`].
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn acquire(&self, kind: MediaKind) -> Result<LocalMedia, MediaError>;
}

/// Opaque handle to the inbound media stream.
///
/// Supplied by the peer session and only ever borrowed by the call session;
/// the presentation layer binds it to a render target. The call session
/// never stops tracks it did not acquire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStream {
    id: String,
}

impl RemoteStream {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}
