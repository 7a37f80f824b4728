//! Crate-wide error type
//!
//! One tagged result kind per failure class. Port implementations report
//! their own small error enums; those convert into this type at the core
//! boundary.

use crate::ports::flash::FlashError;
use crate::ports::link::LinkError;
use crate::ports::metadata::MetadataError;

/// Error kinds for store, session and control operations
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum Error {
    /// Store not initialized; all operations rejected until `init` succeeds
    NotReady,
    /// Read index not yet written and not buffered
    OutOfRange,
    /// Malformed control command or frame
    InvalidLength,
    /// Start requested while a session is active
    Busy,
    /// Send attempted with no peer
    NotConnected,
    /// Flash or persistence operation failed
    IoError,
}

impl From<FlashError> for Error {
    fn from(_: FlashError) -> Self {
        Error::IoError
    }
}

impl From<MetadataError> for Error {
    fn from(_: MetadataError) -> Self {
        Error::IoError
    }
}

impl From<LinkError> for Error {
    fn from(err: LinkError) -> Self {
        match err {
            LinkError::NotConnected => Error::NotConnected,
            LinkError::SendFailed => Error::IoError,
        }
    }
}
