//! Store port: the flat key/value root shared with the field hardware.
//!
//! The store is the single source of truth for readings, actuator states
//! and the control mode. Adapters only move raw JSON values; parsing
//! happens in the domain ([`Snapshot::from_root`](greenguard_domain::snapshot::Snapshot::from_root)).

use std::future::Future;

use greenguard_domain::error::GreenGuardError;
use greenguard_domain::snapshot::{RawRoot, StoreKey};

/// Read/write access to the greenhouse store root.
pub trait GreenhouseStore {
    /// Read every key at the root. Keys never written are simply absent.
    fn read_root(&self) -> impl Future<Output = Result<RawRoot, GreenGuardError>> + Send;

    /// Set the value at one key, replacing whatever was there.
    fn write(
        &self,
        key: StoreKey,
        value: serde_json::Value,
    ) -> impl Future<Output = Result<(), GreenGuardError>> + Send;
}

impl<T: GreenhouseStore + Send + Sync> GreenhouseStore for std::sync::Arc<T> {
    fn read_root(&self) -> impl Future<Output = Result<RawRoot, GreenGuardError>> + Send {
        (**self).read_root()
    }

    fn write(
        &self,
        key: StoreKey,
        value: serde_json::Value,
    ) -> impl Future<Output = Result<(), GreenGuardError>> + Send {
        (**self).write(key, value)
    }
}
