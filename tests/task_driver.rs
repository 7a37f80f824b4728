//! Drive the exporter task body by hand, no executor required.
//!
//! Every await point in the exporter resolves immediately under a noop
//! pacer and a noop mutex, except blocking on an empty event queue, so a
//! single poll runs the task until it has nothing left to do.

use std::cell::RefCell;
use std::future::{poll_fn, Future};
use std::pin::pin;
use std::rc::Rc;
use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

use bme_node::adapters::clock::ManualClock;
use bme_node::adapters::pacing::NoopPacer;
use bme_node::adapters::ram_flash::RamFlash;
use bme_node::adapters::ram_metadata::RamMetadata;
use bme_node::ports::link::{FramePacer, FrameSink, LinkError};
use bme_node::protocol::{Frame, FRAME_LEN};
use bme_node::store::StoreConfig;
use bme_node::tasks::{run_exporter, LinkEvent, LINK_EVENT_QUEUE};
use bme_node::transfer::TransferSession;
use bme_node::{Command, ControlChannel, RecordStore, SensorRecord};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::mutex::Mutex;
use heapless::Vec as HVec;

const PAGE: u32 = 4096;
const PARTITION: u32 = 24_576;

#[derive(Clone)]
struct VecSink(Rc<RefCell<Vec<[u8; FRAME_LEN]>>>);

impl VecSink {
    fn new() -> Self {
        Self(Rc::new(RefCell::new(Vec::new())))
    }
}

impl FrameSink for VecSink {
    async fn send_frame(&mut self, frame: &[u8; FRAME_LEN]) -> Result<(), LinkError> {
        self.0.borrow_mut().push(*frame);
        Ok(())
    }
}

const NOOP_VTABLE: RawWakerVTable =
    RawWakerVTable::new(noop_clone, noop_wake, noop_wake, noop_drop);

fn noop_clone(_: *const ()) -> RawWaker {
    RawWaker::new(core::ptr::null(), &NOOP_VTABLE)
}
fn noop_wake(_: *const ()) {}
fn noop_drop(_: *const ()) {}

fn noop_waker() -> Waker {
    unsafe { Waker::from_raw(noop_clone(core::ptr::null())) }
}

/// Poll until the task parks on the event queue.
fn poll_until_parked<F: Future>(fut: &mut core::pin::Pin<&mut F>) {
    let waker = noop_waker();
    let mut cx = Context::from_waker(&waker);
    for _ in 0..64 {
        if fut.as_mut().poll(&mut cx).is_pending() {
            return;
        }
    }
    panic!("exporter task returned");
}

fn control_write(command: Command, peer: Option<VecSink>) -> LinkEvent<VecSink> {
    let mut data = HVec::new();
    data.extend_from_slice(&command.encode()).unwrap();
    LinkEvent::ControlWrite { data, peer }
}

fn record(i: u32) -> SensorRecord {
    SensorRecord::new(i as i16, 1000, 50, 35)
}

#[test]
fn exporter_runs_session_to_completion() {
    let mut flash = RamFlash::<{ PARTITION as usize }>::new();
    let mut meta = RamMetadata::new();
    let clock = ManualClock::new();
    let cfg = StoreConfig {
        partition_size: PARTITION,
        page_size: PAGE,
        flush_interval_ms: 5_000,
    };
    let mut store = RecordStore::<_, _, _, 200>::new(&mut flash, &mut meta, &clock, cfg);
    store.init().unwrap();
    for i in 0..30 {
        store.append(&record(i)).unwrap();
    }

    let store: Mutex<NoopRawMutex, _> = Mutex::new(store);
    let control: Mutex<NoopRawMutex, ControlChannel<VecSink, NoopPacer>> =
        Mutex::new(ControlChannel::new(TransferSession::new(NoopPacer)));
    let events: Channel<NoopRawMutex, LinkEvent<VecSink>, LINK_EVENT_QUEUE> = Channel::new();

    let mut task = pin!(run_exporter(&store, &control, &events));
    poll_until_parked(&mut task);

    let sink = VecSink::new();
    let frames = sink.0.clone();
    assert!(events
        .try_send(control_write(
            Command::StartTransfer { start_index: 0 },
            Some(sink),
        ))
        .is_ok());
    poll_until_parked(&mut task);

    let frames = frames.borrow();
    // header + 15 data frames + end, all from a single wakeup
    assert_eq!(frames.len(), 17);
    assert_eq!(Frame::decode(&frames[0]).unwrap(), Frame::header(10, 30, 0));
    assert_eq!(
        Frame::decode(&frames[16]).unwrap(),
        Frame::End { total_sent: 30 }
    );
}

/// Pacer that stays pending until its gate opens.
struct GatePacer(Rc<RefCell<bool>>);

impl FramePacer for GatePacer {
    fn pause(&mut self) -> impl Future<Output = ()> {
        let gate = self.0.clone();
        poll_fn(move |_| {
            if *gate.borrow() {
                Poll::Ready(())
            } else {
                Poll::Pending
            }
        })
    }
}

#[test]
fn sampler_appends_proceed_while_export_is_paced() {
    let mut flash = RamFlash::<{ PARTITION as usize }>::new();
    let mut meta = RamMetadata::new();
    let clock = ManualClock::new();
    let cfg = StoreConfig {
        partition_size: PARTITION,
        page_size: PAGE,
        flush_interval_ms: 5_000,
    };
    let mut store = RecordStore::<_, _, _, 200>::new(&mut flash, &mut meta, &clock, cfg);
    store.init().unwrap();
    for i in 0..30 {
        store.append(&record(i)).unwrap();
    }

    let store: Mutex<NoopRawMutex, _> = Mutex::new(store);
    let gate = Rc::new(RefCell::new(false));
    let control: Mutex<NoopRawMutex, ControlChannel<VecSink, GatePacer>> =
        Mutex::new(ControlChannel::new(TransferSession::new(GatePacer(
            gate.clone(),
        ))));
    let events: Channel<NoopRawMutex, LinkEvent<VecSink>, LINK_EVENT_QUEUE> = Channel::new();

    let mut task = pin!(run_exporter(&store, &control, &events));
    poll_until_parked(&mut task);

    let sink = VecSink::new();
    let frames = sink.0.clone();
    assert!(events
        .try_send(control_write(
            Command::StartTransfer { start_index: 0 },
            Some(sink),
        ))
        .is_ok());
    // the task parks on the closed gate right after the header
    poll_until_parked(&mut task);
    assert_eq!(frames.borrow().len(), 1);

    // the store lock is free while the export waits out the delay
    store.try_lock().unwrap().append(&record(100)).unwrap();

    *gate.borrow_mut() = true;
    poll_until_parked(&mut task);
    // the session still covers exactly the 30 records captured at start
    assert_eq!(frames.borrow().len(), 17);
    assert_eq!(
        Frame::decode(&frames.borrow()[16]).unwrap(),
        Frame::End { total_sent: 30 }
    );
    assert_eq!(store.try_lock().unwrap().count(), 31);
}

#[test]
fn queued_stop_cancels_before_any_frame() {
    let mut flash = RamFlash::<{ PARTITION as usize }>::new();
    let mut meta = RamMetadata::new();
    let clock = ManualClock::new();
    let cfg = StoreConfig {
        partition_size: PARTITION,
        page_size: PAGE,
        flush_interval_ms: 5_000,
    };
    let mut store = RecordStore::<_, _, _, 200>::new(&mut flash, &mut meta, &clock, cfg);
    store.init().unwrap();
    for i in 0..30 {
        store.append(&record(i)).unwrap();
    }

    let store: Mutex<NoopRawMutex, _> = Mutex::new(store);
    let control: Mutex<NoopRawMutex, ControlChannel<VecSink, NoopPacer>> =
        Mutex::new(ControlChannel::new(TransferSession::new(NoopPacer)));
    let events: Channel<NoopRawMutex, LinkEvent<VecSink>, LINK_EVENT_QUEUE> = Channel::new();

    let mut task = pin!(run_exporter(&store, &control, &events));
    poll_until_parked(&mut task);

    let sink = VecSink::new();
    let frames = sink.0.clone();
    assert!(events
        .try_send(control_write(
            Command::StartTransfer { start_index: 0 },
            Some(sink),
        ))
        .is_ok());
    // queued behind the start: drained before the first step
    assert!(events.try_send(control_write(Command::StopTransfer, None)).is_ok());
    poll_until_parked(&mut task);

    assert!(frames.borrow().is_empty());
    assert!(!control.try_lock().unwrap().is_transferring());
}

#[test]
fn disconnect_event_abandons_session() {
    let mut flash = RamFlash::<{ PARTITION as usize }>::new();
    let mut meta = RamMetadata::new();
    let clock = ManualClock::new();
    let cfg = StoreConfig {
        partition_size: PARTITION,
        page_size: PAGE,
        flush_interval_ms: 5_000,
    };
    let mut store = RecordStore::<_, _, _, 200>::new(&mut flash, &mut meta, &clock, cfg);
    store.init().unwrap();

    let store: Mutex<NoopRawMutex, _> = Mutex::new(store);
    let control: Mutex<NoopRawMutex, ControlChannel<VecSink, NoopPacer>> =
        Mutex::new(ControlChannel::new(TransferSession::new(NoopPacer)));
    let events: Channel<NoopRawMutex, LinkEvent<VecSink>, LINK_EVENT_QUEUE> = Channel::new();

    let mut task = pin!(run_exporter(&store, &control, &events));
    poll_until_parked(&mut task);

    assert!(events
        .try_send(control_write(
            Command::StartTransfer { start_index: 0 },
            Some(VecSink::new()),
        ))
        .is_ok());
    assert!(events.try_send(LinkEvent::Disconnected).is_ok());
    poll_until_parked(&mut task);

    assert!(!control.try_lock().unwrap().is_transferring());
}
