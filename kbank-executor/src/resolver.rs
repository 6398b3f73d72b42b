//! Binding-to-unit resolution wrapping a [`UnitBackend`].
//!
//! Starts a unit the first time its binding is resolved and hands out
//! forwarders to it afterwards. Each binding maps to exactly one unit.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use kbank_core::{Binding, UnitId};
use sha2::{Digest, Sha256};
use tokio::sync::{Mutex, OnceCell};

use crate::{ExecutorError, Forward, UnitBackend, UnitConfig, UnitForwarder, UnitHandle};

/// Obtains a forwarder for a binding.
#[async_trait]
pub trait Resolve: Send + Sync {
    /// Return a forwarder bound to the unit serving `binding`.
    ///
    /// Repeated calls with the same binding address the same unit.
    ///
    /// # Errors
    /// Returns [`ExecutorError::UnknownBinding`] if the binding is not
    /// configured, or the backend's error if the unit cannot be started.
    async fn resolve(&self, binding: &Binding) -> Result<Arc<dyn Forward>, ExecutorError>;
}

/// Derive the identity of the unit serving `binding`.
///
/// `id = SHA-256(name)[..16]`, so a binding names the same unit across
/// restarts of the resolver.
#[must_use]
pub fn derive_unit_id(binding: &Binding) -> UnitId {
    let digest = Sha256::digest(binding.as_str().as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    UnitId::from_bytes(bytes)
}

/// A started unit: the forwarder handed to callers plus the process handle
/// kept for teardown.
struct RunningUnit {
    forwarder: UnitForwarder,
    handle: Mutex<Option<UnitHandle>>,
}

/// Lazily started slot for one binding.
type UnitSlot = Arc<OnceCell<Arc<RunningUnit>>>;

/// Resolver that starts one unit per binding on first use.
///
/// Concurrent first resolutions of the same binding start a single unit. A
/// failed start is not cached; the next resolution tries again.
pub struct UnitResolver<B: UnitBackend> {
    backend: B,
    configs: HashMap<Binding, UnitConfig>,
    units: Mutex<HashMap<Binding, UnitSlot>>,
}

impl<B: UnitBackend> UnitResolver<B> {
    /// Create a resolver with no bindings.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            configs: HashMap::new(),
            units: Mutex::new(HashMap::new()),
        }
    }

    /// Declare how to start the unit for `binding`, replacing any earlier config.
    ///
    /// A unit already running for the binding keeps running with its old config.
    #[must_use]
    pub fn with_binding(mut self, binding: Binding, config: UnitConfig) -> Self {
        self.register(binding, config);
        self
    }

    /// Declare how to start the unit for `binding`.
    pub fn register(&mut self, binding: Binding, config: UnitConfig) {
        self.configs.insert(binding, config);
    }

    /// Resolve `binding` to its running unit's forwarder, starting it if needed.
    ///
    /// # Errors
    /// Returns [`ExecutorError::UnknownBinding`] if the binding is not
    /// registered. Propagates errors from [`UnitBackend::spawn`].
    pub async fn forwarder(&self, binding: &Binding) -> Result<UnitForwarder, ExecutorError> {
        let config = self
            .configs
            .get(binding)
            .ok_or_else(|| ExecutorError::UnknownBinding(binding.clone()))?;

        loop {
            let slot = Arc::clone(self.units.lock().await.entry(binding.clone()).or_default());

            let unit = slot
                .get_or_try_init(|| async {
                    let handle = self.backend.spawn(config, binding).await?;
                    Ok::<_, ExecutorError>(Arc::new(RunningUnit {
                        forwarder: UnitForwarder::new(handle.id, handle.addr),
                        handle: Mutex::new(Some(handle)),
                    }))
                })
                .await?;

            // A slot whose handle is gone was torn down after we cloned it;
            // `terminate` has removed it from the table, so retry.
            if unit.handle.lock().await.is_some() {
                return Ok(unit.forwarder);
            }
        }
    }

    /// Stop the unit serving `binding`.
    ///
    /// A start still in progress is awaited and then stopped. The next
    /// resolution of the binding starts a fresh unit, once the old one is gone.
    ///
    /// # Errors
    /// Returns [`ExecutorError::UnitNotFound`] if no unit is running or
    /// starting for the binding. Propagates errors from
    /// [`UnitBackend::terminate`].
    pub async fn terminate(&self, binding: &Binding) -> Result<(), ExecutorError> {
        let not_found = || ExecutorError::UnitNotFound(derive_unit_id(binding));

        let slot = self.units.lock().await.get(binding).cloned().ok_or_else(not_found)?;

        // Waits for an in-flight start; fails without starting one otherwise.
        let unit = Arc::clone(slot.get_or_try_init(|| async { Err(not_found()) }).await?);

        // The table stays locked until the process is gone, so no second unit
        // can start on the same port in the meantime.
        let mut units = self.units.lock().await;
        if units.get(binding).is_some_and(|current| Arc::ptr_eq(current, &slot)) {
            units.remove(binding);
        }
        let handle = unit.handle.lock().await.take();
        match handle {
            Some(handle) => self.backend.terminate(handle).await,
            None => Err(ExecutorError::UnitNotFound(unit.forwarder.unit_id())),
        }
    }

    /// Return the number of currently running units.
    pub async fn active_count(&self) -> usize {
        self.units
            .lock()
            .await
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }
}

#[async_trait]
impl<B: UnitBackend> Resolve for UnitResolver<B> {
    async fn resolve(&self, binding: &Binding) -> Result<Arc<dyn Forward>, ExecutorError> {
        let forwarder = self.forwarder(binding).await?;
        Ok(Arc::new(forwarder))
    }
}
