use std::cell::Cell;
use std::io;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};

#[cfg(test)]
use std::cell::RefCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WaitOutcome {
    Elapsed,
    Cancelled,
}

/// Suspension point of the polling loop.
pub(crate) trait Waiter {
    fn wait(&self, interval: Duration) -> WaitOutcome;
}

/// Sleeps on a cancel channel so that a message ends the wait early. Once
/// cancelled, every later wait returns immediately.
pub(crate) struct CancelWaiter {
    cancel_rx: mpsc::Receiver<()>,
    cancelled: Cell<bool>,
}

impl CancelWaiter {
    pub(crate) fn new(cancel_rx: mpsc::Receiver<()>) -> Self {
        Self {
            cancel_rx,
            cancelled: Cell::new(false),
        }
    }

    /// Cancels on the first SIGINT/Ctrl-C or SIGTERM delivered to the process.
    pub(crate) fn on_interrupt() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("build signal runtime")?;
        let (cancel_tx, cancel_rx) = mpsc::channel();
        thread::spawn(move || {
            if runtime.block_on(shutdown_signal()).is_ok() {
                let _ = cancel_tx.send(());
            }
        });
        Ok(Self::new(cancel_rx))
    }
}

#[cfg(unix)]
async fn shutdown_signal() -> io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> io::Result<()> {
    tokio::signal::ctrl_c().await
}

impl Waiter for CancelWaiter {
    fn wait(&self, interval: Duration) -> WaitOutcome {
        if self.cancelled.get() {
            return WaitOutcome::Cancelled;
        }
        match self.cancel_rx.recv_timeout(interval) {
            Ok(()) => {
                self.cancelled.set(true);
                WaitOutcome::Cancelled
            }
            Err(RecvTimeoutError::Timeout) => WaitOutcome::Elapsed,
            // Nobody can cancel any more; plain sleep.
            Err(RecvTimeoutError::Disconnected) => {
                thread::sleep(interval);
                WaitOutcome::Elapsed
            }
        }
    }
}

/// Records requested waits without sleeping; optionally reports cancellation on
/// the n-th wait (1-based).
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingWaiter {
    waits: RefCell<Vec<Duration>>,
    cancel_on: Option<usize>,
}

#[cfg(test)]
impl RecordingWaiter {
    pub(crate) fn cancelling_on(wait_number: usize) -> Self {
        Self {
            waits: RefCell::default(),
            cancel_on: Some(wait_number),
        }
    }

    pub(crate) fn waits(&self) -> Vec<Duration> {
        self.waits.borrow().clone()
    }
}

#[cfg(test)]
impl Waiter for RecordingWaiter {
    fn wait(&self, interval: Duration) -> WaitOutcome {
        let mut waits = self.waits.borrow_mut();
        waits.push(interval);
        if self.cancel_on == Some(waits.len()) {
            WaitOutcome::Cancelled
        } else {
            WaitOutcome::Elapsed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn message_cancels_and_sticks() {
        let (tx, rx) = mpsc::channel();
        let waiter = CancelWaiter::new(rx);
        tx.send(()).unwrap();
        assert_eq!(waiter.wait(Duration::from_secs(5)), WaitOutcome::Cancelled);
        assert_eq!(waiter.wait(Duration::from_secs(5)), WaitOutcome::Cancelled);
    }

    #[test]
    fn live_channel_times_out() {
        let (_tx, rx) = mpsc::channel();
        let waiter = CancelWaiter::new(rx);
        assert_eq!(waiter.wait(Duration::from_millis(5)), WaitOutcome::Elapsed);
    }

    #[test]
    fn dropped_sender_still_waits() {
        let (tx, rx) = mpsc::channel::<()>();
        drop(tx);
        let waiter = CancelWaiter::new(rx);
        let started = Instant::now();
        assert_eq!(waiter.wait(Duration::from_millis(20)), WaitOutcome::Elapsed);
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[cfg(unix)]
    #[test]
    fn terminate_signal_resolves_shutdown_signal() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let result = runtime.block_on(async {
            let waiting = tokio::spawn(shutdown_signal());
            // Let the handlers register before the signal is raised.
            tokio::task::yield_now().await;
            tokio::time::sleep(Duration::from_millis(20)).await;
            // SAFETY: raising SIGTERM on our own process while a tokio handler is
            // installed for it.
            unsafe { libc::raise(libc::SIGTERM) };
            tokio::time::timeout(Duration::from_secs(5), waiting).await
        });
        assert!(matches!(result, Ok(Ok(Ok(())))));
    }

    #[test]
    fn cancel_from_another_thread_ends_wait_early() {
        let (tx, rx) = mpsc::channel();
        let waiter = CancelWaiter::new(rx);
        let sender = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            tx.send(()).unwrap();
        });
        let started = Instant::now();
        assert_eq!(waiter.wait(Duration::from_secs(30)), WaitOutcome::Cancelled);
        assert!(started.elapsed() < Duration::from_secs(30));
        sender.join().unwrap();
    }
}
