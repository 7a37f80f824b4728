//! Transfer session: resumable packetized export state machine
//!
//! A single session streams a contiguous range of records from the store
//! to the connected peer as protocol frames. The session is driven by
//! repeated calls to [`step`](TransferSession::step), each of which does a
//! bounded amount of work and yields, so a long export never monopolizes
//! the executor. The captured [`FrameSink`] is the connection handle; it
//! is released exactly once, on completion, cancellation or send failure.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use heapless::Vec;

use crate::config;
use crate::domain::SensorRecord;
use crate::error::Error;
use crate::ports::clock::Clock;
use crate::ports::flash::FlashPort;
use crate::ports::link::{FramePacer, FrameSink};
use crate::ports::metadata::MetadataPort;
use crate::protocol::{Frame, RECORDS_PER_FRAME};
use crate::store::RecordStore;

/// Result of one cooperative step
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum StepOutcome {
    /// No session active
    Idle,
    /// More records remain; reschedule another step
    Yielded,
    /// End frame sent, session finished
    Complete,
}

#[derive(Clone, Copy, Debug, defmt::Format)]
enum SessionState {
    Idle,
    Sending {
        start_seq: u32,
        cursor: u32,
        total: u32,
        header_sent: bool,
    },
}

/// Export state machine, one instance system-wide
///
/// Sequence numbers within a session are strictly increasing, contiguous
/// and never duplicated. Across sessions overlap is allowed; the consumer
/// deduplicates by sequence number.
pub struct TransferSession<S, P>
where
    S: FrameSink,
    P: FramePacer,
{
    state: SessionState,
    sink: Option<S>,
    pacer: P,
    sample_interval_sec: u16,
}

impl<S, P> TransferSession<S, P>
where
    S: FrameSink,
    P: FramePacer,
{
    /// Create an idle session
    pub fn new(pacer: P) -> Self {
        Self::with_interval(pacer, config::SENSOR_READ_INTERVAL_SEC)
    }

    /// Create an idle session reporting a custom sampling interval
    pub fn with_interval(pacer: P, sample_interval_sec: u16) -> Self {
        Self {
            state: SessionState::Idle,
            sink: None,
            pacer,
            sample_interval_sec,
        }
    }

    /// Whether a session is currently active
    pub fn is_sending(&self) -> bool {
        matches!(self.state, SessionState::Sending { .. })
    }

    /// Begin a session exporting `available - start_seq` records
    ///
    /// `available` is the store count at start time; the range is captured
    /// here and never re-read, so records appended later belong to the next
    /// session. Rejected with `Busy` while a session is active.
    pub fn start(&mut self, start_seq: u32, available: u32, sink: S) -> Result<(), Error> {
        if self.is_sending() {
            return Err(Error::Busy);
        }
        let total = available.saturating_sub(start_seq);
        self.sink = Some(sink);
        self.state = SessionState::Sending {
            start_seq,
            cursor: 0,
            total,
            header_sent: false,
        };
        Ok(())
    }

    /// Cancel the active session, if any
    ///
    /// Idempotent. Takes effect at the step boundary: the current frame is
    /// never cut short, and no End frame is guaranteed. Releases the
    /// connection handle. Disconnection is handled identically.
    pub fn stop(&mut self) {
        self.state = SessionState::Idle;
        self.sink = None;
    }

    /// Run one bounded unit of export work
    ///
    /// The first step emits the Header frame. Each iteration reads up to
    /// [`RECORDS_PER_FRAME`] sequential records, emits a Data frame and
    /// waits out the inter-frame delay; after
    /// [`MAX_RECORDS_PER_STEP`](config::MAX_RECORDS_PER_STEP) records the
    /// session yields so the caller can reschedule it. A failed read means
    /// the range shrank under us: the session ends early with the records
    /// sent so far. A send failure aborts the session without retry.
    ///
    /// The store lock is taken only around reads, never across a send or
    /// the inter-frame pause, so the sampler can keep appending while an
    /// export is paced out.
    pub async fn step<R, F, M, C, const BATCH: usize>(
        &mut self,
        store: &Mutex<R, RecordStore<F, M, C, BATCH>>,
    ) -> Result<StepOutcome, Error>
    where
        R: RawMutex,
        F: FlashPort,
        M: MetadataPort,
        C: Clock,
    {
        let SessionState::Sending {
            start_seq,
            mut cursor,
            mut total,
            header_sent,
        } = self.state
        else {
            return Ok(StepOutcome::Idle);
        };
        let Some(mut sink) = self.sink.take() else {
            self.state = SessionState::Idle;
            return Err(Error::NotConnected);
        };

        if !header_sent {
            let last_sent = store.lock().await.last_sent();
            let header = Frame::header(self.sample_interval_sec, total, last_sent);
            if let Err(e) = sink.send_frame(&header.encode()).await {
                self.state = SessionState::Idle;
                return Err(e.into());
            }
            self.pacer.pause().await;
        }

        let mut sent_this_step: u32 = 0;
        while cursor < total && sent_this_step < config::MAX_RECORDS_PER_STEP {
            let mut records: Vec<SensorRecord, RECORDS_PER_FRAME> = Vec::new();
            let mut exhausted = false;
            {
                let store = store.lock().await;
                for i in 0..RECORDS_PER_FRAME as u32 {
                    if cursor + i >= total {
                        break;
                    }
                    match store.read(start_seq + cursor + i) {
                        Ok(record) => {
                            let _ = records.push(record);
                        }
                        Err(_) => {
                            exhausted = true;
                            break;
                        }
                    }
                }
            }
            if records.is_empty() {
                total = cursor;
                break;
            }

            let frame = Frame::data(start_seq + cursor, &records);
            if let Err(e) = sink.send_frame(&frame.encode()).await {
                self.state = SessionState::Idle;
                return Err(e.into());
            }
            cursor += records.len() as u32;
            sent_this_step += records.len() as u32;

            if exhausted {
                total = cursor;
                break;
            }
            self.pacer.pause().await;
        }

        if cursor >= total {
            let end = Frame::end(cursor);
            let result = sink.send_frame(&end.encode()).await;
            self.state = SessionState::Idle;
            result.map_err(Error::from)?;
            return Ok(StepOutcome::Complete);
        }

        self.state = SessionState::Sending {
            start_seq,
            cursor,
            total,
            header_sent: true,
        };
        self.sink = Some(sink);
        Ok(StepOutcome::Yielded)
    }

    /// Session progress as `(cursor, total)`, if active
    pub fn progress(&self) -> Option<(u32, u32)> {
        match self.state {
            SessionState::Sending { cursor, total, .. } => Some((cursor, total)),
            SessionState::Idle => None,
        }
    }
}
