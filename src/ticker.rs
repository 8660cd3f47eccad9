//! Periodic tick scheduler
//!
//! A dedicated worker thread fires the callback once per interval. The
//! callback runs synchronously on the worker, so at most one invocation is
//! ever in flight; a slow callback delays the next tick rather than
//! overlapping it. Cancellation goes through a condvar so `cancel` returns
//! promptly and only after the worker has exited.

use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

struct Shared {
    cancelled: Mutex<bool>,
    signal: Condvar,
}

pub struct Ticker {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn spawn(interval: Duration, mut callback: impl FnMut() + Send + 'static) -> Self {
        let shared = Arc::new(Shared {
            cancelled: Mutex::new(false),
            signal: Condvar::new(),
        });
        let worker = Arc::clone(&shared);
        let handle = thread::spawn(move || loop {
            let guard = worker.cancelled.lock().expect("ticker lock poisoned");
            let (guard, _timeout) = worker
                .signal
                .wait_timeout_while(guard, interval, |cancelled| !*cancelled)
                .expect("ticker lock poisoned");
            if *guard {
                break;
            }
            drop(guard);
            callback();
        });
        Self {
            shared,
            handle: Some(handle),
        }
    }

    /// Stops the worker and joins it. No callback runs after this returns.
    /// Idempotent.
    pub fn cancel(&mut self) {
        {
            let mut cancelled = self.shared.cancelled.lock().expect("ticker lock poisoned");
            *cancelled = true;
        }
        self.shared.signal.notify_all();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}
