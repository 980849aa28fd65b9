//! Cancellable once-per-interval tick source.
//!
//! The worker thread never touches engine state: it only posts
//! [`SignalMessage::Tick`] to the host channel and the host applies the tick
//! on its own thread. Every start bumps the generation so ticks still queued
//! from a cancelled worker can be recognized and dropped.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, TryRecvError, channel};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::common::constants::{TICK_CANCEL_POLL, TICK_INTERVAL};
use crate::io::signals::SignalMessage;
use crate::time::source::TimeSource;

struct Worker {
    // Dropping the sender wakes and stops the worker
    cancel: Sender<()>,
    handle: JoinHandle<()>,
}

/// Repeating tick scheduler.
///
/// Without a sink the ticker only tracks whether it is armed and which
/// generation is current; the host then drives ticks itself.
pub struct Ticker {
    clock: Arc<dyn TimeSource>,
    interval: Duration,
    sink: Option<Sender<SignalMessage>>,
    generation: u64,
    armed: bool,
    worker: Option<Worker>,
}

impl Ticker {
    pub fn new(clock: Arc<dyn TimeSource>) -> Self {
        Self {
            clock,
            interval: TICK_INTERVAL,
            sink: None,
            generation: 0,
            armed: false,
            worker: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.set_interval(interval);
        self
    }

    /// Takes effect on the next start.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Post ticks to `sink` from a worker thread once started.
    pub fn set_sink(&mut self, sink: Sender<SignalMessage>) {
        self.sink = Some(sink);
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a tick stamped with `generation` belongs to the running ticker.
    pub fn is_current(&self, generation: u64) -> bool {
        self.armed && generation == self.generation
    }

    /// Start ticking, replacing any running worker. Returns the new generation.
    pub fn start(&mut self) -> u64 {
        self.cancel();
        self.generation += 1;
        self.armed = true;

        if let Some(sink) = self.sink.clone() {
            let (cancel, cancelled) = channel::<()>();
            let clock = Arc::clone(&self.clock);
            let interval = self.interval;
            let generation = self.generation;

            let handle = thread::spawn(move || {
                loop {
                    let stop = if clock.is_simulated() {
                        sleep_simulated(clock.as_ref(), interval, &cancelled)
                    } else {
                        !matches!(
                            cancelled.recv_timeout(interval),
                            Err(RecvTimeoutError::Timeout)
                        )
                    };

                    if stop || sink.send(SignalMessage::Tick { generation }).is_err() {
                        break;
                    }

                    if clock.is_ended() {
                        break;
                    }
                }
            });

            self.worker = Some(Worker { cancel, handle });
        }

        self.generation
    }

    /// Stop ticking and wait for the worker to exit. Safe to call repeatedly.
    pub fn cancel(&mut self) {
        self.armed = false;
        if let Some(Worker { cancel, handle }) = self.worker.take() {
            drop(cancel);
            let _ = handle.join();
        }
    }
}

/// Sleep `interval` of simulated time in slices that each take at most
/// [`TICK_CANCEL_POLL`] of real time. Returns true once cancelled.
fn sleep_simulated(clock: &dyn TimeSource, interval: Duration, cancelled: &Receiver<()>) -> bool {
    let real = clock.real_duration(interval);
    let slices = u32::try_from(real.as_nanos().div_ceil(TICK_CANCEL_POLL.as_nanos()))
        .unwrap_or(u32::MAX)
        .max(1);
    let slice = interval / slices;

    for index in 0..slices {
        let step = if index + 1 == slices {
            interval.saturating_sub(slice * (slices - 1))
        } else {
            slice
        };
        clock.sleep(step);
        if !matches!(cancelled.try_recv(), Err(TryRecvError::Empty)) {
            return true;
        }
    }
    false
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}
