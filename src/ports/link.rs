//! Link port - abstraction for the notification channel to the peer
//!
//! The radio stack (advertising, connections, MTU) lives outside the
//! crate. The session only needs "send this fixed-size frame to the
//! current peer" plus a pacing hook for inter-frame flow control.

use crate::protocol::FRAME_LEN;

/// Error type for link operations
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum LinkError {
    /// No peer connected
    NotConnected,
    /// Notification could not be queued or sent
    SendFailed,
}

/// Port for pushing protocol frames to the connected peer
///
/// A `FrameSink` value doubles as the connection handle: the session holds
/// at most one, and dropping it releases the reference to the peer. A send
/// failure is reported immediately and is not retried.
pub trait FrameSink {
    /// Send one fixed-size frame as a notification
    fn send_frame(
        &mut self,
        frame: &[u8; FRAME_LEN],
    ) -> impl core::future::Future<Output = Result<(), LinkError>>;
}

/// Port for the fixed delay inserted between frames
///
/// Flow control against notification backpressure on the link. Test
/// implementations may return immediately.
pub trait FramePacer {
    /// Wait out one inter-frame delay
    fn pause(&mut self) -> impl core::future::Future<Output = ()>;
}
