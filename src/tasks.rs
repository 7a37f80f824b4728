//! Task bodies wiring the pieces together on an async executor
//!
//! Two long-running loops share the store behind an async mutex: the
//! sampler appends one record per interval, the exporter reacts to link
//! events and drives the transfer session one step at a time. Both are
//! plain generic `async fn`s; the firmware binary wraps them in executor
//! tasks with concrete types.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::mutex::Mutex;
use embassy_time::{Duration, Timer};
use heapless::Vec;

use crate::control::ControlChannel;
use crate::ports::clock::Clock;
use crate::ports::flash::FlashPort;
use crate::ports::link::{FramePacer, FrameSink};
use crate::ports::metadata::MetadataPort;
use crate::ports::sensor::SensorPort;
use crate::store::RecordStore;

/// Depth of the link event queue
pub const LINK_EVENT_QUEUE: usize = 4;

/// Largest control write we accept
pub const MAX_CONTROL_WRITE: usize = 4;

/// Events the link layer hands to the exporter
pub enum LinkEvent<S: FrameSink> {
    /// Inbound write on the control characteristic
    ControlWrite {
        data: Vec<u8, MAX_CONTROL_WRITE>,
        /// Notification handle for the writing connection
        peer: Option<S>,
    },
    /// The connection went away
    Disconnected,
}

/// Sample forever at the given interval
///
/// A failed reading is skipped; the next tick tries again. Append errors
/// are swallowed too, the store already did what it could.
pub async fn run_sampler<R, F, M, C, SN, const BATCH: usize>(
    store: &Mutex<R, RecordStore<F, M, C, BATCH>>,
    mut sensor: SN,
    interval: Duration,
) -> !
where
    R: RawMutex,
    F: FlashPort,
    M: MetadataPort,
    C: Clock,
    SN: SensorPort,
{
    loop {
        if let Ok(record) = sensor.sample().await {
            let _ = store.lock().await.append(&record);
        }
        Timer::after(interval).await;
    }
}

/// React to link events and push the active session forward
///
/// While idle this blocks on the event queue. While a session runs it
/// drains any queued events first (so Stop takes effect promptly), then
/// performs one bounded session step and loops.
pub async fn run_exporter<R, F, M, C, S, P, const BATCH: usize>(
    store: &Mutex<R, RecordStore<F, M, C, BATCH>>,
    control: &Mutex<R, ControlChannel<S, P>>,
    events: &Channel<R, LinkEvent<S>, LINK_EVENT_QUEUE>,
) -> !
where
    R: RawMutex,
    F: FlashPort,
    M: MetadataPort,
    C: Clock,
    S: FrameSink,
    P: FramePacer,
{
    loop {
        let transferring = control.lock().await.is_transferring();
        if transferring {
            while let Ok(event) = events.try_receive() {
                dispatch(store, control, event).await;
            }
            // lock order is control before store, everywhere
            let mut control = control.lock().await;
            // a step error means the session aborted itself
            let _ = control.session_mut().step(store).await;
        } else {
            let event = events.receive().await;
            dispatch(store, control, event).await;
        }
    }
}

async fn dispatch<R, F, M, C, S, P, const BATCH: usize>(
    store: &Mutex<R, RecordStore<F, M, C, BATCH>>,
    control: &Mutex<R, ControlChannel<S, P>>,
    event: LinkEvent<S>,
) where
    R: RawMutex,
    F: FlashPort,
    M: MetadataPort,
    C: Clock,
    S: FrameSink,
    P: FramePacer,
{
    let mut control = control.lock().await;
    match event {
        LinkEvent::ControlWrite { data, peer } => {
            let mut store = store.lock().await;
            // malformed writes are the peer's problem
            let _ = control.handle_write(&mut store, peer, &data);
        }
        LinkEvent::Disconnected => control.handle_disconnect(),
    }
}
