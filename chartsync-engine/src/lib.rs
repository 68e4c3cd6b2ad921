//! # chartsync-engine
//!
//! The offline-first push synchronization service.
//!
//! This is the library applications embed to keep a local record store
//! consistent with a remote document store under intermittent
//! connectivity, sign-in/sign-out transitions, and periodic background
//! polling.
//!
//! # Architecture
//!
//! ```text
//! Application → SyncService → LocalStore / RemoteStore / AuthSessionProvider
//!                   ↓
//!            chartsync-core (pure classification and shaping)
//! ```
//!
//! [`SyncService`] owns the periodic scheduler and the shared
//! [`StatusMachine`]; each tick (or [`SyncService::force_sync`]) runs one
//! reconciliation pass that diffs local records against remote existence
//! and pushes the difference as per-collection batches. Failures are
//! classified into signed-out / offline / unexpected, and only the last
//! kind is ever surfaced as a user-visible error.
//!
//! # Example
//!
//! ```ignore
//! use chartsync_engine::{SyncConfig, SyncService};
//! use chartsync_types::CollectionSpec;
//!
//! let config = SyncConfig::new(vec![CollectionSpec::same("patients")]);
//! let service = SyncService::new(config, local, remote, auth);
//! service.start();
//! service.force_sync().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod reconcile;
pub mod service;
pub mod status;
pub mod store;

mod mock;

pub use mock::{MockAuthProvider, MockLocalStore, MockRemoteStore};
pub use reconcile::PassSummary;
pub use service::{SyncConfig, SyncService, DEFAULT_SYNC_INTERVAL};
pub use status::{StatusMachine, Subscription};
pub use store::{AuthSessionProvider, LocalStore, RemoteStore};
