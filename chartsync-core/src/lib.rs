//! # chartsync-core
//!
//! Pure logic for chartsync (no I/O, instant tests).
//!
//! This crate implements the decision-making pieces of the synchronizer
//! without any network or disk I/O:
//! - [`classify`] maps a raw remote error into one of the three failure
//!   outcomes
//! - [`SyncPhase`] derives the user-facing state machine phase from a
//!   status snapshot
//! - [`to_document`] shapes a local record into the outgoing remote
//!   document
//!
//! All functions here are pure: same input, same output, no side effects.
//! The actual I/O is performed by `chartsync-engine`, which applies the
//! outcomes these functions produce.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod classify;
pub mod document;
pub mod phase;

pub use classify::classify;
pub use document::to_document;
pub use phase::SyncPhase;
