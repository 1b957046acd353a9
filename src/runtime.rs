use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent};
use tracing::{debug, warn};

/// Default cadence of the live metrics refresh.
pub const TICK_RATE_MS: u64 = 100;

/// Unified event type consumed by the app loop
#[derive(Clone, Debug, PartialEq)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Source of application events (keyboard, resize, refresh ticks)
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let reader_tx = tx.clone();

        thread::spawn(move || loop {
            let forwarded = match event::read() {
                Ok(CtEvent::Key(key)) => reader_tx.send(AppEvent::Key(key)),
                Ok(CtEvent::Resize(_, _)) => reader_tx.send(AppEvent::Resize),
                Ok(_) => Ok(()),
                Err(e) => {
                    warn!(error = %e, "terminal event reader stopped");
                    break;
                }
            };
            if forwarded.is_err() {
                break;
            }
        });

        Self { tx, rx }
    }

    /// Handle for posting events (ticks) into the same queue.
    pub fn sender(&self) -> Sender<AppEvent> {
        self.tx.clone()
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Periodic `Tick` producer that lives exactly as long as its handle.
///
/// Started when a session begins and cancelled when it finishes, resets or the
/// owner is dropped. Once [`RefreshTicker::cancel`] returns no further ticks
/// are sent.
#[derive(Debug)]
pub struct RefreshTicker {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl RefreshTicker {
    pub fn start(tx: Sender<AppEvent>, interval: Duration) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let handle = thread::spawn(move || {
            let mut next = Instant::now() + interval;
            loop {
                if flag.load(Ordering::Acquire) {
                    break;
                }

                let now = Instant::now();
                if now < next {
                    thread::park_timeout(next - now);
                    continue;
                }

                if tx.send(AppEvent::Tick).is_err() {
                    break;
                }

                // missed deadlines are skipped, not caught up
                next += interval;
                if next < now {
                    next = now + interval;
                }
            }
        });

        debug!(interval_ms = interval.as_millis() as u64, "refresh ticker started");
        Self {
            stop,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn cancel(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            let _ = handle.join();
            debug!("refresh ticker stopped");
        }
    }
}

impl Drop for RefreshTicker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Runner that advances the application one event at a time
pub struct Runner<E: EventSource> {
    event_source: E,
    poll: Duration,
}

impl<E: EventSource> Runner<E> {
    pub fn new(event_source: E, poll: Duration) -> Self {
        Self { event_source, poll }
    }

    /// Blocks up to the poll interval and returns the next event, if any
    pub fn step(&self) -> Option<AppEvent> {
        match self.event_source.recv_timeout(self.poll) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}
