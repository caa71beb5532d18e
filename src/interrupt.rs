//! Ctrl+C handling that never leaves an export file half written.
//!
//! Outside an export an interrupt ends the process at once. While a
//! [`WriteGuard`] is alive the interrupt is only recorded; the session checks
//! [`InterruptGate::is_pending`] once the sinks are closed and winds down.
//! Both sides move one atomic state with compare-exchange, so a write can
//! never start after the handler has decided to exit.

use crate::error::{Result, SeekError};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tracing::info;

pub const INTERRUPTED_EXIT_CODE: u8 = 130;

const IDLE: u8 = 0;
const WRITING: u8 = 1;
/// Writing, with an interrupt waiting for the guard to drop.
const DEFERRED: u8 = 2;
const STOPPING: u8 = 3;

#[derive(Debug, Clone, Default)]
pub struct InterruptGate {
    state: Arc<AtomicU8>,
}

impl InterruptGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the process-wide Ctrl+C handler. Only one gate may be installed.
    pub fn install(&self) -> Result<()> {
        let gate = self.clone();
        ctrlc::set_handler(move || {
            if gate.record_interrupt() {
                info!("Received Ctrl+C, exiting");
                std::process::exit(i32::from(INTERRUPTED_EXIT_CODE));
            }
            info!("Received Ctrl+C, finishing current export first");
        })
        .map_err(|e| SeekError::InterruptHandler(e.to_string()))
    }

    /// Records an interrupt. Returns true when nothing is being written and
    /// the caller may exit immediately.
    pub(crate) fn record_interrupt(&self) -> bool {
        let previous = self
            .state
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |state| match state {
                IDLE => Some(STOPPING),
                WRITING => Some(DEFERRED),
                _ => None,
            })
            .unwrap_or_else(|state| state);
        matches!(previous, IDLE | STOPPING)
    }

    /// Starts a write. `None` once an interrupt has been recorded: the
    /// process is on its way out and no new file may be opened.
    pub fn hold(&self) -> Option<WriteGuard<'_>> {
        self.state
            .compare_exchange(IDLE, WRITING, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| WriteGuard { gate: self })
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state.load(Ordering::SeqCst), DEFERRED | STOPPING)
    }
}

/// Defers interrupts until dropped.
pub struct WriteGuard<'a> {
    gate: &'a InterruptGate,
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        let _ = self
            .gate
            .state
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |state| match state {
                WRITING => Some(IDLE),
                DEFERRED => Some(STOPPING),
                _ => None,
            });
    }
}
