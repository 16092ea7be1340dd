//! Outbound signaling seam and the inbound call-frame filter.

use async_trait::async_trait;
use log::{debug, warn};
use std::sync::Arc;
use thiserror::Error;

use super::signaling::CallSignal;

/// The shared channel is not currently open.
#[derive(Debug, Clone, Copy, Error)]
#[error("signaling channel closed")]
pub struct ChannelClosed;

/// Outbound half of the shared relay connection.
///
/// Implemented by whatever owns the socket. The call core never learns about
/// connection lifecycle (open, close, reconnect); a closed channel simply
/// fails the send, and callers here treat that as non-fatal.
#[async_trait]
pub trait SignalingChannel: Send + Sync {
    async fn send(&self, frame: String) -> Result<(), ChannelClosed>;
}

/// Thin filter over the shared message stream for call traffic.
///
/// The stream also carries chat and other features; [`decode`] recognizes
/// call frames and leaves everything else to the rest of the client.
/// Malformed frames are dropped without disrupting the stream.
///
/// [`decode`]: CallSignalingAdapter::decode
pub struct CallSignalingAdapter {
    channel: Arc<dyn SignalingChannel>,
}

impl CallSignalingAdapter {
    pub fn new(channel: Arc<dyn SignalingChannel>) -> Self {
        Self { channel }
    }

    /// Try to interpret a raw frame as a call signal.
    ///
    /// Returns `None` for non-call traffic and for unparsable payloads.
    pub fn decode(raw: &str) -> Option<CallSignal> {
        serde_json::from_str(raw).ok()
    }

    /// Serialize and dispatch a signal over the shared channel.
    ///
    /// A closed channel is logged and swallowed: hangup must always complete
    /// locally regardless of transport state.
    pub async fn send(&self, signal: &CallSignal) {
        let frame = match serde_json::to_string(signal) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(
                    "failed to serialize {} for {}: {}",
                    signal.kind_name(),
                    signal.conversation_id,
                    e
                );
                return;
            }
        };

        if let Err(e) = self.channel.send(frame).await {
            debug!(
                "dropping outbound {} for {}: {}",
                signal.kind_name(),
                signal.conversation_id,
                e
            );
        }
    }
}
