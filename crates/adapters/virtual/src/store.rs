//! In-memory implementation of [`GreenhouseStore`].

use std::future::Future;
use std::sync::RwLock;

use greenguard_app::ports::GreenhouseStore;
use greenguard_domain::actuator::ActuatorStates;
use greenguard_domain::error::GreenGuardError;
use greenguard_domain::mode::ControlMode;
use greenguard_domain::sensor::SensorSnapshot;
use greenguard_domain::snapshot::{RawRoot, Snapshot, StoreKey};
use greenguard_domain::time::now;

/// Store root held in memory. Lost on restart.
pub struct InMemoryGreenhouseStore {
    root: RwLock<RawRoot>,
}

impl Default for InMemoryGreenhouseStore {
    /// Actuators known and off, manual mode, no readings.
    fn default() -> Self {
        let seed = Snapshot {
            sensors: SensorSnapshot::default(),
            actuators: ActuatorStates::all_off(),
            mode: Some(ControlMode::Manual),
            observed_at: now(),
        };
        Self::with_root(seed.to_root())
    }
}

impl InMemoryGreenhouseStore {
    /// Start from an arbitrary root (may be empty).
    #[must_use]
    pub fn with_root(root: RawRoot) -> Self {
        Self {
            root: RwLock::new(root),
        }
    }
}

fn poisoned() -> GreenGuardError {
    GreenGuardError::Storage("in-memory store lock poisoned".into())
}

impl GreenhouseStore for InMemoryGreenhouseStore {
    fn read_root(&self) -> impl Future<Output = Result<RawRoot, GreenGuardError>> + Send {
        let result = self.root.read().map(|root| root.clone()).map_err(|_| poisoned());
        async { result }
    }

    fn write(
        &self,
        key: StoreKey,
        value: serde_json::Value,
    ) -> impl Future<Output = Result<(), GreenGuardError>> + Send {
        let result = self
            .root
            .write()
            .map(|mut root| {
                root.insert(key.as_str().to_string(), value);
            })
            .map_err(|_| poisoned());
        async { result }
    }
}
