//! Cancellable per-second countdown task.
//!
//! At most one countdown thread is alive per [`Countdown`]. Every arming gets
//! a fresh [`TimerId`], and the thread is joined on cancel, so once
//! [`Countdown::cancel`] returns no further events for the old id are sent.
//! Events already queued for an old id are recognised via
//! [`Countdown::is_current`] and dropped by the consumer.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, trace};

use crate::drill::TimerKey;
use crate::runtime::AppEvent;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

#[derive(Debug)]
struct ActiveTimer {
    id: TimerId,
    key: TimerKey,
    cancel_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

#[derive(Debug)]
pub struct Countdown {
    interval: Duration,
    next_id: u64,
    active: Option<ActiveTimer>,
}

impl Countdown {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_id: 0,
            active: None,
        }
    }

    /// Make the running countdown match `desired`: keep it if the key is
    /// unchanged, otherwise cancel it and arm a new one when `desired` is set.
    pub fn sync(&mut self, desired: Option<TimerKey>, events: &Sender<AppEvent>) {
        if self.active.as_ref().map(|a| a.key) == desired {
            return;
        }
        self.cancel();
        if let Some(key) = desired {
            self.arm(key, events.clone());
        }
    }

    fn arm(&mut self, key: TimerKey, events: Sender<AppEvent>) {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        let interval = self.interval;
        let (cancel_tx, cancel_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || loop {
            match cancel_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    trace!(timer = id.0, "countdown tick");
                    if events.send(AppEvent::Countdown(id)).is_err() {
                        break;
                    }
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });

        debug!(timer = id.0, run = key.run_id, step = key.step, "countdown armed");
        self.active = Some(ActiveTimer {
            id,
            key,
            cancel_tx,
            handle: Some(handle),
        });
    }

    /// Stop the running countdown, waiting for its thread to exit.
    pub fn cancel(&mut self) {
        if let Some(mut active) = self.active.take() {
            let _ = active.cancel_tx.send(());
            if let Some(handle) = active.handle.take() {
                let _ = handle.join();
            }
            debug!(timer = active.id.0, "countdown cancelled");
        }
    }

    pub fn is_current(&self, id: TimerId) -> bool {
        self.active.as_ref().is_some_and(|a| a.id == id)
    }

    pub fn active_id(&self) -> Option<TimerId> {
        self.active.as_ref().map(|a| a.id)
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::Receiver;

    fn key(run_id: u64, step: usize) -> TimerKey {
        TimerKey { run_id, step }
    }

    fn next_countdown(rx: &Receiver<AppEvent>) -> Option<TimerId> {
        match rx.recv_timeout(Duration::from_millis(500)) {
            Ok(AppEvent::Countdown(id)) => Some(id),
            _ => None,
        }
    }

    #[test]
    fn test_armed_countdown_emits_ticks() {
        let (tx, rx) = mpsc::channel();
        let mut countdown = Countdown::new(Duration::from_millis(5));

        countdown.sync(Some(key(1, 0)), &tx);
        let id = countdown.active_id().unwrap();

        assert_eq!(next_countdown(&rx), Some(id));
        assert_eq!(next_countdown(&rx), Some(id));
    }

    #[test]
    fn test_cancel_stops_ticks() {
        let (tx, rx) = mpsc::channel();
        let mut countdown = Countdown::new(Duration::from_millis(5));
        countdown.sync(Some(key(1, 0)), &tx);
        next_countdown(&rx);

        countdown.cancel();
        // drain whatever was queued before the join
        while rx.try_recv().is_ok() {}

        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
        assert!(countdown.active_id().is_none());
    }

    #[test]
    fn test_sync_same_key_keeps_timer() {
        let (tx, _rx) = mpsc::channel();
        let mut countdown = Countdown::new(Duration::from_millis(50));

        countdown.sync(Some(key(1, 0)), &tx);
        let first = countdown.active_id();
        countdown.sync(Some(key(1, 0)), &tx);

        assert_eq!(countdown.active_id(), first);
    }

    #[test]
    fn test_sync_new_key_rearms_with_fresh_id() {
        let (tx, _rx) = mpsc::channel();
        let mut countdown = Countdown::new(Duration::from_millis(50));

        countdown.sync(Some(key(1, 0)), &tx);
        let first = countdown.active_id().unwrap();
        countdown.sync(Some(key(1, 1)), &tx);
        let second = countdown.active_id().unwrap();

        assert_ne!(first, second);
        assert!(!countdown.is_current(first));
        assert!(countdown.is_current(second));
    }

    #[test]
    fn test_sync_none_cancels() {
        let (tx, _rx) = mpsc::channel();
        let mut countdown = Countdown::new(Duration::from_millis(50));
        countdown.sync(Some(key(1, 0)), &tx);

        countdown.sync(None, &tx);

        assert!(countdown.active_id().is_none());
    }

    #[test]
    fn test_rearming_same_key_after_cancel_gets_new_id() {
        let (tx, _rx) = mpsc::channel();
        let mut countdown = Countdown::new(Duration::from_millis(50));
        countdown.sync(Some(key(1, 0)), &tx);
        let before_pause = countdown.active_id().unwrap();

        countdown.sync(None, &tx);
        countdown.sync(Some(key(1, 0)), &tx);

        assert!(!countdown.is_current(before_pause));
    }

    #[test]
    fn test_thread_exits_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel();
        let mut countdown = Countdown::new(Duration::from_millis(1));
        countdown.sync(Some(key(1, 0)), &tx);
        drop(rx);

        // cancel joins; must not hang even though the thread may already be gone
        countdown.cancel();
        assert!(countdown.active_id().is_none());
    }
}
