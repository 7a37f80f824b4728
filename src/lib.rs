//! BME Sensor Node Core
//!
//! This library implements the core of a battery-powered BLE sensor logger:
//! periodic readings are batched in RAM, persisted in a fixed-capacity ring
//! buffer over raw flash, and exported on demand to a paired client through
//! a fixed 20-byte framed notification protocol.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Domain Layer                                 │
//! │  - SensorRecord entity (fixed 6-byte wire layout)               │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Ports (Traits)                               │
//! │  - SensorPort: acquire readings                                 │
//! │  - FlashPort: erase/program/read the raw data partition         │
//! │  - MetadataPort: crash-atomic key-value for indices             │
//! │  - FrameSink / FramePacer: notification link                    │
//! │  - Clock: monotonic milliseconds                                │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Core services                                │
//! │  - RecordStore: batched ring buffer with persisted indices      │
//! │  - TransferSession: resumable packetized export state machine   │
//! │  - ControlChannel: command dispatch from the peer               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The wireless stack itself stays outside the crate: the core only needs
//! "send this 20-byte frame to the current peer" (`FrameSink`) and "a peer
//! wrote these bytes to the control characteristic"
//! (`ControlChannel::handle_write`).

#![cfg_attr(not(any(test, feature = "std")), no_std)]

// ============================================================================
// Protocol (shared between host tooling and device)
// ============================================================================

pub mod protocol;

pub use protocol::{Command, Frame};

// ============================================================================
// Configuration and errors
// ============================================================================

pub mod config;
pub mod error;

pub use error::Error;

// ============================================================================
// Hexagonal architecture
// ============================================================================

/// Domain layer - pure entities
pub mod domain;

/// Ports - traits defining boundaries
pub mod ports;

/// Adapters - concrete implementations
pub mod adapters;

/// Core services
pub mod control;
pub mod store;
pub mod transfer;

/// Cooperative device tasks (sampler loop and export driver)
pub mod tasks;

pub use control::ControlChannel;
pub use domain::SensorRecord;
pub use store::{RecordStore, StoreConfig};
pub use transfer::{StepOutcome, TransferSession};
