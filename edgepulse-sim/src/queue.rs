//! Inter-Core Queues
//!
//! ## Overview
//!
//! The two cores share exactly two channels:
//!
//! ```text
//! acquisition ──offer()──► SampleQueue (bounded) ──recv_timeout()──► inference
//! inference   ──push()───► ResultQueue (unbounded) ──recv()────────► consumer
//! ```
//!
//! ## Sample Queue
//!
//! Bounded, single producer, single consumer. The producer never waits: when
//! the queue is full the sample is dropped and counted. The consumer waits at
//! most a fixed timeout so it can notice a stop request while the producer is
//! silent.
//!
//! ## Result Queue
//!
//! Unbounded, so the inference core is never held up by a slow consumer.
//!
//! ## Statistics
//!
//! Counters are relaxed atomics; they describe queue health and carry no
//! ordering guarantees relative to the data.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use edgepulse_core::{PredictionResult, Sample};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{TryRecvError, TrySendError};

/// Sample queue counters
#[derive(Debug, Default)]
pub struct QueueStats {
    offered: AtomicU64,
    accepted: AtomicU64,
    dropped: AtomicU64,
    max_depth: AtomicU64,
}

/// Point-in-time copy of [`QueueStats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct QueueSnapshot {
    /// Samples handed to `offer`
    pub offered: u64,
    /// Samples that entered the queue
    pub accepted: u64,
    /// Samples discarded because the queue was full or closed
    pub dropped: u64,
    /// Highest observed depth right after an accepted offer
    pub max_depth: u64,
}

impl QueueSnapshot {
    /// Fraction of offered samples that were dropped
    pub fn drop_rate(&self) -> f64 {
        if self.offered == 0 {
            0.0
        } else {
            self.dropped as f64 / self.offered as f64
        }
    }
}

impl QueueStats {
    /// Copy the counters
    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            offered: self.offered.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            max_depth: self.max_depth.load(Ordering::Relaxed),
        }
    }

    fn update_max_depth(&self, current: u64) {
        let mut max = self.max_depth.load(Ordering::Relaxed);
        while current > max {
            match self.max_depth.compare_exchange_weak(
                max,
                current,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => max = actual,
            }
        }
    }
}

/// Create a sample queue holding at most `capacity` samples
///
/// # Panics
///
/// If `capacity` is zero; [`SimConfig::validate`](crate::SimConfig::validate)
/// rejects that before boot.
pub fn sample_queue(capacity: usize) -> (SampleSender, SampleReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    let stats = Arc::new(QueueStats::default());
    (
        SampleSender {
            tx,
            stats: Arc::clone(&stats),
        },
        SampleReceiver { rx, stats },
    )
}

/// Producer half of the sample queue
#[derive(Debug)]
pub struct SampleSender {
    tx: mpsc::Sender<Sample>,
    stats: Arc<QueueStats>,
}

impl SampleSender {
    /// Enqueue without waiting
    ///
    /// Returns `false` if the sample was dropped. Never blocks and never fails.
    pub fn offer(&self, sample: Sample) -> bool {
        self.stats.offered.fetch_add(1, Ordering::Relaxed);
        match self.tx.try_send(sample) {
            Ok(()) => {
                self.stats.accepted.fetch_add(1, Ordering::Relaxed);
                self.stats.update_max_depth(self.len() as u64);
                true
            }
            Err(TrySendError::Full(_)) | Err(TrySendError::Closed(_)) => {
                let dropped = self.stats.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                // first drop, then every thousandth
                if dropped == 1 || dropped % 1000 == 0 {
                    log::debug!("sample queue full, {dropped} samples dropped so far");
                }
                false
            }
        }
    }

    /// Samples currently queued
    pub fn len(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Queue capacity
    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    /// Shared counters
    pub fn stats(&self) -> Arc<QueueStats> {
        Arc::clone(&self.stats)
    }
}

/// Outcome of a bounded wait on the sample queue
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Recv {
    /// A sample arrived
    Sample(Sample),
    /// Nothing arrived before the timeout
    TimedOut,
    /// The producer is gone and the queue is drained
    Closed,
}

/// Consumer half of the sample queue
#[derive(Debug)]
pub struct SampleReceiver {
    rx: mpsc::Receiver<Sample>,
    stats: Arc<QueueStats>,
}

impl SampleReceiver {
    /// Wait at most `timeout` for the next sample
    pub async fn recv_timeout(&mut self, timeout: Duration) -> Recv {
        match tokio::time::timeout(timeout, self.rx.recv()).await {
            Ok(Some(sample)) => Recv::Sample(sample),
            Ok(None) => Recv::Closed,
            Err(_) => Recv::TimedOut,
        }
    }

    /// Take a sample if one is queued
    pub fn try_recv(&mut self) -> Option<Sample> {
        self.rx.try_recv().ok()
    }

    /// Samples currently queued
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Shared counters
    pub fn stats(&self) -> Arc<QueueStats> {
        Arc::clone(&self.stats)
    }
}

/// Create the unbounded result queue
pub fn result_queue() -> (ResultSender, ResultReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ResultSender { tx }, ResultReceiver { rx })
}

/// Producer half of the result queue
#[derive(Debug, Clone)]
pub struct ResultSender {
    tx: mpsc::UnboundedSender<PredictionResult>,
}

impl ResultSender {
    /// Publish a result; `false` if no consumer is left
    pub fn push(&self, result: PredictionResult) -> bool {
        self.tx.send(result).is_ok()
    }
}

/// Consumer half of the result queue
#[derive(Debug)]
pub struct ResultReceiver {
    rx: mpsc::UnboundedReceiver<PredictionResult>,
}

impl ResultReceiver {
    /// Wait for the next result; `None` once the producer is gone and drained
    pub async fn recv(&mut self) -> Option<PredictionResult> {
        self.rx.recv().await
    }

    /// Take a result if one is queued
    pub fn try_recv(&mut self) -> Option<PredictionResult> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Take every queued result
    pub fn drain(&mut self) -> Vec<PredictionResult> {
        let mut results = Vec::new();
        while let Some(result) = self.try_recv() {
            results.push(result);
        }
        results
    }
}
