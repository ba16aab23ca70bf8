//! Twinstick Pad
//!
//! Remote-control client turning two on-screen joystick gestures into move,
//! aim and shoot commands streamed to a game server over WebSocket.

pub mod channel;
pub mod config;
pub mod emission;
pub mod input;
pub mod pad;
pub mod protocol;
pub mod session;

pub use pad::TwinStickPad;
