//! Control channel - routes inbound control writes to the store and session
//!
//! One instance owns the transfer session. Writes arrive as raw
//! characteristic payloads; the channel parses them and applies the command.
//! A malformed write is reported back to the caller, but commands the
//! session cannot honor right now (a second Start while one is running) are
//! swallowed so a misbehaving peer cannot wedge the link.

use crate::error::Error;
use crate::ports::clock::Clock;
use crate::ports::flash::FlashPort;
use crate::ports::link::{FramePacer, FrameSink};
use crate::ports::metadata::MetadataPort;
use crate::protocol::{self, Command, STATUS_LEN};
use crate::store::RecordStore;
use crate::transfer::TransferSession;

pub struct ControlChannel<S, P>
where
    S: FrameSink,
    P: FramePacer,
{
    session: TransferSession<S, P>,
}

impl<S, P> ControlChannel<S, P>
where
    S: FrameSink,
    P: FramePacer,
{
    pub fn new(session: TransferSession<S, P>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &TransferSession<S, P> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut TransferSession<S, P> {
        &mut self.session
    }

    /// Whether an export is in flight (the exporter task polls this)
    pub fn is_transferring(&self) -> bool {
        self.session.is_sending()
    }

    /// Apply one inbound control write
    ///
    /// `peer` is the notification handle for the connection the write came
    /// in on; Start captures it for the duration of the session. Unknown
    /// opcodes and a Start during an active session are accepted and
    /// dropped; short payloads are errors.
    pub fn handle_write<F, M, C, const BATCH: usize>(
        &mut self,
        store: &mut RecordStore<F, M, C, BATCH>,
        peer: Option<S>,
        data: &[u8],
    ) -> Result<(), Error>
    where
        F: FlashPort,
        M: MetadataPort,
        C: Clock,
    {
        let Some(command) = Command::parse(data)? else {
            return Ok(());
        };
        match command {
            Command::StartTransfer { start_index } => {
                let sink = peer.ok_or(Error::NotConnected)?;
                match self.session.start(start_index as u32, store.count(), sink) {
                    Ok(()) | Err(Error::Busy) => Ok(()),
                    Err(e) => Err(e),
                }
            }
            Command::StopTransfer => {
                self.session.stop();
                Ok(())
            }
            Command::SetLastSent { index } => store.set_last_sent(index as u32),
        }
    }

    /// The link dropped: abandon any session bound to it
    pub fn handle_disconnect(&mut self) {
        self.session.stop();
    }

    /// Snapshot for the status characteristic
    pub fn status<F, M, C, const BATCH: usize>(
        &self,
        store: &RecordStore<F, M, C, BATCH>,
    ) -> [u8; STATUS_LEN]
    where
        F: FlashPort,
        M: MetadataPort,
        C: Clock,
    {
        protocol::encode_status(store.count(), store.last_sent())
    }
}
