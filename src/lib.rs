//! Peer-to-peer call core for the Emberly client.
//!
//! This crate implements the logic behind the call screen: negotiating an
//! audio/video session between two clients through a relay that only forwards
//! opaque signaling frames. The presentation layer, authentication, the chat
//! store, and the relay connection itself all live elsewhere and reach this
//! crate only through the traits in [`calls`].

pub mod calls;
pub mod types;
