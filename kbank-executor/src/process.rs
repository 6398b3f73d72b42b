//! Local process backend.
//!
//! Runs each execution unit as a child process on the loopback interface and
//! waits for its HTTP port to accept connections.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use kbank_core::Binding;
use tokio::net::TcpStream;
use tokio::process::{Child, Command};

use crate::resolver::derive_unit_id;
use crate::{ExecutorError, UnitBackend, UnitConfig, UnitHandle};

/// Interval between readiness probes.
const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Default time a unit has to start accepting connections.
const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(5);

/// Execution unit backend running units as local child processes.
#[derive(Debug, Clone)]
pub struct ProcessBackend {
    /// Address units are reached on.
    host: IpAddr,

    /// How long a unit has to open its port after spawn.
    ready_timeout: Duration,
}

impl ProcessBackend {
    /// Create a backend reaching units on `host`.
    #[must_use]
    pub fn new(host: IpAddr) -> Self {
        Self {
            host,
            ready_timeout: DEFAULT_READY_TIMEOUT,
        }
    }

    /// Create a backend using loopback and the default readiness timeout.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(IpAddr::V4(Ipv4Addr::LOCALHOST))
    }

    /// Override how long a unit has to become ready.
    #[must_use]
    pub fn with_ready_timeout(mut self, ready_timeout: Duration) -> Self {
        self.ready_timeout = ready_timeout;
        self
    }

    /// Wait for the unit to accept TCP connections on `addr`.
    ///
    /// The port must be free before exec (see [`ensure_port_free`]), so a
    /// successful connect while the child is still alive means the child owns
    /// it. Fails early if the process exits before it is ready.
    async fn wait_for_port(
        &self,
        addr: SocketAddr,
        process: &mut Child,
    ) -> Result<(), ExecutorError> {
        let deadline = tokio::time::Instant::now() + self.ready_timeout;
        loop {
            exited_early(process, addr)?;
            if TcpStream::connect(addr).await.is_ok() {
                // The child may have died between the two checks.
                exited_early(process, addr)?;
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(ExecutorError::SpawnFailed(format!(
                    "unit did not listen on {addr} within {}ms",
                    self.ready_timeout.as_millis()
                )));
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }
}

/// Fail if `process` has already exited.
fn exited_early(process: &mut Child, addr: SocketAddr) -> Result<(), ExecutorError> {
    match process.try_wait()? {
        Some(status) => Err(ExecutorError::SpawnFailed(format!(
            "unit exited with {status} before listening on {addr}"
        ))),
        None => Ok(()),
    }
}

/// Fail if something already accepts connections on `addr`.
///
/// A unit started on an occupied port would look ready without ever
/// listening itself.
async fn ensure_port_free(addr: SocketAddr) -> Result<(), ExecutorError> {
    if TcpStream::connect(addr).await.is_ok() {
        return Err(ExecutorError::SpawnFailed(format!(
            "port {} is already in use on {}",
            addr.port(),
            addr.ip()
        )));
    }
    Ok(())
}

impl Default for ProcessBackend {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[async_trait]
impl UnitBackend for ProcessBackend {
    async fn spawn(
        &self,
        config: &UnitConfig,
        binding: &Binding,
    ) -> Result<UnitHandle, ExecutorError> {
        let program = which_binary(&config.program)?;
        let unit_id = derive_unit_id(binding);
        let addr = SocketAddr::new(self.host, config.port);

        tracing::info!(
            %binding,
            unit_id = %unit_id,
            program = %program.display(),
            %addr,
            "starting execution unit"
        );

        ensure_port_free(addr).await?;

        let mut process = Command::new(&program)
            .args(&config.args)
            .envs(config.environment())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ExecutorError::SpawnFailed(format!("exec {}: {e}", program.display())))?;

        self.wait_for_port(addr, &mut process).await?;

        tracing::info!(%binding, unit_id = %unit_id, %addr, "execution unit ready");

        Ok(UnitHandle::new(unit_id, binding.clone(), addr, process))
    }

    async fn terminate(&self, mut handle: UnitHandle) -> Result<(), ExecutorError> {
        tracing::info!(binding = %handle.binding, unit_id = %handle.id, "terminating unit");

        handle.process.kill().await?;

        tracing::info!(binding = %handle.binding, unit_id = %handle.id, "unit terminated");

        Ok(())
    }

    async fn health_check(&self, config: &UnitConfig) -> Result<(), ExecutorError> {
        which_binary(&config.program).map(|_| ())
    }
}

/// Resolve a program to a path, either as given or through `PATH`.
fn which_binary(path: &Path) -> Result<PathBuf, ExecutorError> {
    if path.is_absolute() || path.components().count() > 1 {
        if path.exists() {
            return Ok(path.to_owned());
        }
        return Err(ExecutorError::BinaryNotFound { path: path.to_owned() });
    }

    // Bare name: search PATH
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).collect::<Vec<_>>())
        .unwrap_or_default()
        .into_iter()
        .map(|dir| dir.join(path))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| ExecutorError::BinaryNotFound { path: path.to_owned() })
}
