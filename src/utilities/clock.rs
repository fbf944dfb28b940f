/// ----- CLOCK -----
/// Time source for every loop in the fleet. Waits go through `Clock::delay`
/// so they can be cut short by a `CancelToken`, and so tests can swap in a
/// clock that never actually sleeps.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Select, Sender, TryRecvError};
use parking_lot::Mutex;

use super::error::Interrupted;

/// One-shot cancellation signal shared between threads.
///
/// Nothing is ever sent on the inner channel; cancelling drops the only
/// sender, and every receiver observes the disconnect at once.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<Mutex<Option<Sender<()>>>>,
    rx: Receiver<()>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, rx) = bounded(0);
        CancelToken {
            tx: Arc::new(Mutex::new(Some(tx))),
            rx,
        }
    }

    pub fn cancel(&self) {
        self.tx.lock().take();
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.rx.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// Becomes ready (disconnected) once the token is cancelled. Meant for `select!`.
    pub fn receiver(&self) -> &Receiver<()> {
        &self.rx
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    /// Suspends the calling thread for `duration`, or until one of `tokens`
    /// is cancelled, whichever comes first.
    fn delay(&self, duration: Duration, tokens: &[&CancelToken]) -> Result<(), Interrupted>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn delay(&self, duration: Duration, tokens: &[&CancelToken]) -> Result<(), Interrupted> {
        if tokens.iter().any(|token| token.is_cancelled()) {
            return Err(Interrupted);
        }
        if tokens.is_empty() {
            thread::sleep(duration);
            return Ok(());
        }
        let mut select = Select::new();
        for token in tokens {
            select.recv(token.receiver());
        }
        match select.ready_timeout(duration) {
            Ok(_) => Err(Interrupted),
            Err(_) => Ok(()),
        }
    }
}

/// Clock for tests: every delay finishes immediately unless a token is
/// already cancelled.
#[derive(Debug, Default, Clone, Copy)]
pub struct InstantClock;

impl Clock for InstantClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn delay(&self, _duration: Duration, tokens: &[&CancelToken]) -> Result<(), Interrupted> {
        if tokens.iter().any(|token| token.is_cancelled()) {
            return Err(Interrupted);
        }
        thread::yield_now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_seen_by_every_clone() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
        // cancelling twice is harmless
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn system_clock_delay_runs_to_completion() {
        let token = CancelToken::new();
        let start = Instant::now();
        assert_eq!(SystemClock.delay(Duration::from_millis(20), &[&token]), Ok(()));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn system_clock_delay_is_cut_short_by_cancel() {
        let token = CancelToken::new();
        let canceller = token.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            canceller.cancel();
        });
        let start = Instant::now();
        let result = SystemClock.delay(Duration::from_secs(10), &[&CancelToken::new(), &token]);
        assert_eq!(result, Err(Interrupted));
        assert!(start.elapsed() < Duration::from_secs(5));
        handle.join().unwrap();
    }

    #[test]
    fn instant_clock_only_fails_on_cancelled_tokens() {
        let token = CancelToken::new();
        assert_eq!(InstantClock.delay(Duration::from_secs(3600), &[&token]), Ok(()));
        token.cancel();
        assert_eq!(InstantClock.delay(Duration::from_secs(3600), &[&token]), Err(Interrupted));
    }
}
