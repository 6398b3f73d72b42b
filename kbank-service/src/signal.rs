//! Termination signals that stop the backing service.

use std::fmt;
use std::io;

/// Which signal requested shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ShutdownSignal {
    /// `SIGTERM`.
    Terminate,
    /// `SIGINT` (Ctrl+C).
    Interrupt,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownSignal::Terminate => f.write_str("SIGTERM"),
            ShutdownSignal::Interrupt => f.write_str("SIGINT"),
        }
    }
}

/// Installed `SIGTERM` and `SIGINT` handlers.
///
/// Signals delivered after [`ShutdownSignals::install`] returns are queued
/// until [`ShutdownSignals::recv`] is awaited. Must be created inside a tokio
/// runtime.
#[derive(Debug)]
pub struct ShutdownSignals {
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
}

impl ShutdownSignals {
    /// Install the handlers.
    ///
    /// # Errors
    /// Returns the I/O error if a handler cannot be installed.
    #[cfg(unix)]
    pub fn install() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            terminate: signal(SignalKind::terminate())?,
            interrupt: signal(SignalKind::interrupt())?,
        })
    }

    /// Install the handlers.
    ///
    /// # Errors
    /// Never fails on this platform; Ctrl+C is registered on first `recv`.
    #[cfg(not(unix))]
    pub fn install() -> io::Result<Self> {
        Ok(Self {})
    }

    /// Wait for the first termination signal.
    #[cfg(unix)]
    pub async fn recv(mut self) -> ShutdownSignal {
        tokio::select! {
            _ = self.terminate.recv() => ShutdownSignal::Terminate,
            _ = self.interrupt.recv() => ShutdownSignal::Interrupt,
        }
    }

    /// Wait for Ctrl+C.
    #[cfg(not(unix))]
    pub async fn recv(self) -> ShutdownSignal {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
        ShutdownSignal::Interrupt
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn shutdown_signal_display_names_signal() {
        assert_eq!(ShutdownSignal::Terminate.to_string(), "SIGTERM");
        assert_eq!(ShutdownSignal::Interrupt.to_string(), "SIGINT");
    }

    #[tokio::test]
    async fn recv_waits_while_no_signal_arrives() {
        let signals = match ShutdownSignals::install() {
            Ok(s) => s,
            Err(e) => panic!("failed to install handlers: {e}"),
        };
        let result = tokio::time::timeout(Duration::from_millis(50), signals.recv()).await;
        assert!(result.is_err(), "recv must pend until a signal is delivered");
    }
}
