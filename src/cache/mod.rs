//! Two-tier artifact cache.
//!
//! - **Local tier**: bounded, TTL-expiring, LRU in-process store.
//! - **Remote tier**: best-effort Redis store with a longer TTL.
//!
//! The local tier answers fast and expires quickly; the remote tier
//! survives restarts and is allowed to fail without affecting a
//! request. The admission gate bounds how much lookup work is in
//! flight at once, shedding the rest.

mod config;
mod gate;
mod keys;
mod lock;
mod remote;
mod store;

pub use config::CacheConfig;
pub use gate::{AdmissionGate, AdmissionPermit};
pub use keys::artifact_key;
pub use remote::{RemoteError, RemoteStore, RemoteTier};
pub use store::ArtifactStore;
