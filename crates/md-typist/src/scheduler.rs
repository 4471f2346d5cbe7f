//! Paced delivery of text into a session.
//!
//! Text is cut into units (single characters, word-bounded chunks, or
//! random model-like tokens) and fed one unit per tick. A unit is always
//! fully processed before the next tick starts, and the only suspension
//! point is the delay between units.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::{mpsc, Notify};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::render::{Renderer, Surface};
use crate::session::Session;

/// Something text can be fed into, one unit per tick.
pub trait Feed {
    fn feed(&mut self, unit: &str);
}

impl Feed for Session {
    fn feed(&mut self, unit: &str) {
        self.append(unit);
    }
}

impl<S: Surface> Feed for Renderer<S> {
    fn feed(&mut self, unit: &str) {
        self.append(unit);
    }
}

/// Shared across threads: the lock is held for exactly one tick.
impl<T: Feed> Feed for Arc<Mutex<T>> {
    fn feed(&mut self, unit: &str) {
        let mut guard = match self.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.feed(unit);
    }
}

/// How text is cut up and how long to wait between pieces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pacing {
    /// One character per tick
    Characters { delay: Duration },

    /// Word-bounded chunks of at least `target` characters
    Chunks { target: usize, delay: Duration },

    /// Random token lengths in `min..=max` characters, like a model's output
    Tokens {
        min: usize,
        max: usize,
        delay: Duration,
        seed: u64,
    },
}

impl Default for Pacing {
    fn default() -> Self {
        Pacing::Characters {
            delay: Duration::from_millis(50),
        }
    }
}

impl Pacing {
    /// Word-bounded chunks of 50 characters every 10ms.
    pub fn chunks() -> Self {
        Pacing::Chunks {
            target: 50,
            delay: Duration::from_millis(10),
        }
    }

    /// Single-character chunks every 30ms.
    pub fn character_by_character() -> Self {
        Pacing::Chunks {
            target: 1,
            delay: Duration::from_millis(30),
        }
    }

    /// Tokens of 2 to 20 characters every 20ms.
    pub fn model_tokens(seed: u64) -> Self {
        Pacing::Tokens {
            min: 2,
            max: 20,
            delay: Duration::from_millis(20),
            seed,
        }
    }

    pub fn delay(&self) -> Duration {
        match self {
            Pacing::Characters { delay }
            | Pacing::Chunks { delay, .. }
            | Pacing::Tokens { delay, .. } => *delay,
        }
    }

    pub fn with_delay(mut self, new_delay: Duration) -> Self {
        match &mut self {
            Pacing::Characters { delay }
            | Pacing::Chunks { delay, .. }
            | Pacing::Tokens { delay, .. } => *delay = new_delay,
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            Pacing::Chunks { target: 0, .. } => Err(Error::InvalidChunkSize),
            Pacing::Tokens { min, max, .. } if min == 0 || min > max => {
                Err(Error::InvalidTokenRange { min, max })
            }
            _ => Ok(()),
        }
    }

    /// Cut `text` into the units this pacing delivers.
    pub fn units(&self, text: &str) -> Vec<String> {
        match *self {
            Pacing::Characters { .. } => text.chars().map(String::from).collect(),
            Pacing::Chunks { target, .. } => smart_chunks(text, target),
            Pacing::Tokens { min, max, seed, .. } => {
                random_tokens(text, min, max, &mut StdRng::seed_from_u64(seed))
            }
        }
    }
}

fn is_boundary(c: char) -> bool {
    c.is_whitespace()
}

/// Split `text` into chunks of at least `target` characters that never cut a
/// word: once the target is reached the chunk runs on to the next
/// whitespace, which then starts the following chunk.
pub fn smart_chunks(text: &str, target: usize) -> Vec<String> {
    let target = target.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut len = 0;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        len += 1;

        if len >= target {
            while let Some(&next) = chars.peek() {
                if is_boundary(next) {
                    break;
                }
                current.push(next);
                chars.next();
            }
            chunks.push(std::mem::take(&mut current));
            len = 0;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Split `text` into tokens of random length between `min` and `max`
/// characters. The last token may be shorter.
pub fn random_tokens<R: Rng>(text: &str, min: usize, max: usize, rng: &mut R) -> Vec<String> {
    let min = min.max(1);
    let max = max.max(min);
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while chars.peek().is_some() {
        let len = rng.random_range(min..=max);
        tokens.push(chars.by_ref().take(len).collect());
    }

    tokens
}

/// Stops a running scheduler at the next tick boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<CancelState>);

#[derive(Debug, Default)]
struct CancelState {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.cancelled.store(true, Ordering::Release);
        self.0.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.cancelled.load(Ordering::Acquire)
    }

    /// Resolves once [`CancelHandle::cancel`] has been called.
    pub async fn cancelled(&self) {
        // registered before the flag check so a cancel in between is not lost
        let notified = self.0.notify.notified();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

/// How a paced run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed { units: usize },
    Cancelled { delivered: usize },
}

/// Sending side of a fragment queue. Cloneable; the queue closes once every
/// sender is dropped.
#[derive(Debug, Clone)]
pub struct Feeder {
    tx: mpsc::UnboundedSender<String>,
}

impl Feeder {
    /// Queue a fragment behind everything sent before it. Returns false if
    /// the scheduler side is gone.
    pub fn append(&self, fragment: impl Into<String>) -> bool {
        self.tx.send(fragment.into()).is_ok()
    }
}

/// Fragments waiting for their turn, in arrival order.
#[derive(Debug)]
pub struct FragmentQueue {
    rx: mpsc::UnboundedReceiver<String>,
}

pub fn fragment_queue() -> (Feeder, FragmentQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Feeder { tx }, FragmentQueue { rx })
}

/// Feeds text into a sink at the pace of its [`Pacing`].
#[derive(Debug)]
pub struct Scheduler {
    pacing: Pacing,
    cancel: CancelHandle,
}

impl Scheduler {
    pub fn new(pacing: Pacing) -> Result<Self> {
        pacing.validate()?;
        Ok(Self {
            pacing,
            cancel: CancelHandle::new(),
        })
    }

    pub fn pacing(&self) -> &Pacing {
        &self.pacing
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Deliver all of `text` to `sink`, one unit per tick.
    pub async fn run<F: Feed>(&self, text: &str, sink: &mut F) -> Outcome {
        self.deliver(text, sink, false).await
    }

    /// Deliver queued fragments in arrival order until the queue closes.
    ///
    /// Fragments that arrive while a batch is running wait until it is done.
    /// Pacing carries over from one batch to the next, so a queued fragment
    /// starts one delay after the previous one ended.
    pub async fn drain<F: Feed>(&self, queue: &mut FragmentQueue, sink: &mut F) -> Outcome {
        let mut delivered = 0;

        loop {
            let fragment = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    debug!("cancelled while waiting for input, {delivered} units delivered");
                    return Outcome::Cancelled { delivered };
                }
                fragment = queue.rx.recv() => fragment,
            };
            let Some(fragment) = fragment else {
                break;
            };

            match self.deliver(&fragment, sink, delivered > 0).await {
                Outcome::Completed { units } => delivered += units,
                Outcome::Cancelled { delivered: partial } => {
                    return Outcome::Cancelled {
                        delivered: delivered + partial,
                    }
                }
            }
        }

        Outcome::Completed { units: delivered }
    }

    /// Feed the units of `text`, waiting one delay before each unit except
    /// the first. With `after_previous` the first unit waits too.
    async fn deliver<F: Feed>(&self, text: &str, sink: &mut F, after_previous: bool) -> Outcome {
        let units = self.pacing.units(text);
        let delay = self.pacing.delay();
        debug!("streaming {} units, {:?} apart", units.len(), delay);

        for (i, unit) in units.iter().enumerate() {
            if (i > 0 || after_previous) && !delay.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = self.cancel.cancelled() => {}
                }
            }
            if self.cancel.is_cancelled() {
                debug!("cancelled after {i} of {} units", units.len());
                return Outcome::Cancelled { delivered: i };
            }
            trace!("tick {i}: {:?}", unit);
            sink.feed(unit);
        }

        Outcome::Completed { units: units.len() }
    }
}
