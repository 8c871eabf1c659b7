use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::foundation::error::{ReelError, ReelResult};

/// Callback run on the timer thread after each automatic advance, with the new index.
pub type TickFn = Box<dyn FnMut(usize) + Send + 'static>;

#[derive(Debug, Default)]
struct Cursor {
    index: usize,
    count: usize,
}

impl Cursor {
    fn step(&mut self, forward: bool) -> usize {
        if self.count == 0 {
            self.index = 0;
        } else if forward {
            self.index = (self.index + 1) % self.count;
        } else {
            self.index = (self.index + self.count - 1) % self.count;
        }
        self.index
    }
}

struct Ticker {
    stop: mpsc::Sender<()>,
    thread: JoinHandle<()>,
}

/// Cycles the preview index on a repeating timer while playing.
///
/// Independent of any encoding job. Stopping is immediate: the timer thread waits on a channel
/// rather than sleeping.
pub struct PreviewClock {
    cursor: Arc<Mutex<Cursor>>,
    ticker: Option<Ticker>,
}

impl PreviewClock {
    pub fn new(count: usize) -> Self {
        Self {
            cursor: Arc::new(Mutex::new(Cursor { index: 0, count })),
            ticker: None,
        }
    }

    pub fn index(&self) -> usize {
        self.lock().index
    }

    pub fn count(&self) -> usize {
        self.lock().count
    }

    /// `index = (index + 1) mod count`.
    pub fn next(&self) -> usize {
        self.lock().step(true)
    }

    /// `index = (index - 1) mod count`.
    pub fn previous(&self) -> usize {
        self.lock().step(false)
    }

    /// Track a collection size change, clamping the index into range.
    pub fn set_count(&self, count: usize) {
        let mut c = self.lock();
        c.count = count;
        c.index = c.index.min(count.saturating_sub(1));
    }

    pub fn set_index(&self, index: usize) -> ReelResult<()> {
        let mut c = self.lock();
        if index >= c.count {
            return Err(ReelError::IndexOutOfRange {
                index,
                len: c.count,
            });
        }
        c.index = index;
        Ok(())
    }

    pub fn is_playing(&self) -> bool {
        self.ticker.is_some()
    }

    /// Start advancing every `period`. Restarts the timer if already playing.
    pub fn play(&mut self, period: Duration, mut on_tick: Option<TickFn>) -> ReelResult<()> {
        if period.is_zero() {
            return Err(ReelError::validation("preview period must be non-zero"));
        }
        self.pause();

        let (stop, stop_rx) = mpsc::channel::<()>();
        let cursor = Arc::clone(&self.cursor);
        let thread = std::thread::spawn(move || {
            loop {
                match stop_rx.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => {
                        let index = cursor.lock().unwrap_or_else(PoisonError::into_inner).step(true);
                        if let Some(f) = on_tick.as_mut() {
                            f(index);
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });
        tracing::debug!(period_ms = period.as_millis() as u64, "preview playing");
        self.ticker = Some(Ticker { stop, thread });
        Ok(())
    }

    /// Stop the timer. Returns once the timer thread has exited.
    pub fn pause(&mut self) {
        if let Some(t) = self.ticker.take() {
            let _ = t.stop.send(());
            if t.thread.join().is_err() {
                tracing::warn!("preview tick callback panicked");
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Cursor> {
        self.cursor.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for PreviewClock {
    fn drop(&mut self) {
        self.pause();
    }
}

impl std::fmt::Debug for PreviewClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let c = self.lock();
        f.debug_struct("PreviewClock")
            .field("index", &c.index)
            .field("count", &c.count)
            .field("playing", &self.ticker.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/preview.rs"]
mod tests;
