//! Console result consumer
//!
//! Drains the result queue and prints one line per prediction, then a run
//! summary with the average prediction frequency and the queue and unit
//! counters from shutdown.

use std::io::{self, Write};
use std::time::Duration;

use edgepulse_core::constants::N_CLASSES;
use edgepulse_core::PredictionResult;
use tokio::time::{timeout_at, Instant};

use crate::device::ShutdownReport;
use crate::queue::ResultReceiver;
use crate::unit::{TaskLabel, UnitStats};

/// Prints predictions as they arrive
pub struct ConsoleReporter<W> {
    out: W,
    received: u64,
    class_counts: [u64; N_CLASSES],
}

impl ConsoleReporter<io::Stdout> {
    /// Reporter writing to stdout
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    /// Reporter writing to `out`
    pub fn new(out: W) -> Self {
        Self {
            out,
            received: 0,
            class_counts: [0; N_CLASSES],
        }
    }

    /// Predictions printed so far
    pub fn received(&self) -> u64 {
        self.received
    }

    /// How often each class was predicted
    pub fn class_counts(&self) -> [u64; N_CLASSES] {
        self.class_counts
    }

    /// Underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Print one prediction
    pub fn report(&mut self, result: &PredictionResult) -> io::Result<()> {
        let class = result.predicted_class();
        self.received += 1;
        self.class_counts[class] += 1;

        write!(
            self.out,
            "#{:<5} window {:>7} |",
            result.sequence, result.window_total
        )?;
        for (idx, p) in result.probabilities.iter().enumerate() {
            write!(self.out, " class {idx}: {p:.4}")?;
        }
        writeln!(self.out, " | predicted {class}")
    }

    /// Print results until `duration` has passed or the producer is gone
    pub async fn run_for(
        &mut self,
        results: &mut ResultReceiver,
        duration: Duration,
    ) -> io::Result<u64> {
        let before = self.received;
        let deadline = Instant::now() + duration;
        while let Ok(Some(result)) = timeout_at(deadline, results.recv()).await {
            self.report(&result)?;
        }
        Ok(self.received - before)
    }

    /// Print prediction count and average frequency over `elapsed`
    pub fn summary(&mut self, elapsed: Duration) -> io::Result<()> {
        let secs = elapsed.as_secs_f64();
        let frequency = if secs > 0.0 {
            self.received as f64 / secs
        } else {
            0.0
        };
        writeln!(
            self.out,
            "{} predictions in {:.1} s ({:.2} Hz)",
            self.received, secs, frequency
        )?;
        for (idx, count) in self.class_counts.iter().enumerate() {
            writeln!(self.out, "  class {idx}: {count}")?;
        }
        Ok(())
    }

    /// Print queue, loop and unit counters from a shutdown
    pub fn shutdown(&mut self, report: &ShutdownReport) -> io::Result<()> {
        let q = &report.queue;
        writeln!(
            self.out,
            "sample queue: {} offered, {} accepted, {} dropped ({:.1}%), max depth {}",
            q.offered,
            q.accepted,
            q.dropped,
            q.drop_rate() * 100.0,
            q.max_depth
        )?;
        writeln!(
            self.out,
            "inference: {} samples, {} predictions, {} failed cycles, {} empty waits",
            report.inference.samples,
            report.inference.predictions,
            report.inference.failed_cycles,
            report.inference.timeouts
        )?;
        writeln!(
            self.out,
            "memory: fast {}/{} bytes, extended {}/{} bytes",
            report.memory.fast_used,
            report.memory.fast_capacity,
            report.memory.extended_used,
            report.memory.extended_capacity
        )?;
        self.unit_line(&report.acquisition_unit)?;
        self.unit_line(&report.inference_unit)
    }

    fn unit_line(&mut self, stats: &UnitStats) -> io::Result<()> {
        write!(self.out, "unit {}:", stats.id)?;
        for label in TaskLabel::ALL {
            write!(self.out, " {}={}", label, stats.completed(label))?;
        }
        writeln!(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::result_queue;

    fn result(sequence: u64, probabilities: [f32; 3]) -> PredictionResult {
        PredictionResult {
            sequence,
            window_total: 1500 + sequence,
            probabilities,
        }
    }

    #[test]
    fn prints_probabilities_and_class() {
        let mut reporter = ConsoleReporter::new(Vec::new());
        reporter.report(&result(0, [0.1, 0.2, 0.7])).unwrap();

        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(text.contains("class 2: 0.7000"));
        assert!(text.trim_end().ends_with("predicted 2"));
    }

    #[test]
    fn summary_reports_frequency() {
        let mut reporter = ConsoleReporter::new(Vec::new());
        for i in 0..30 {
            reporter.report(&result(i, [0.6, 0.2, 0.2])).unwrap();
        }
        reporter.summary(Duration::from_secs(30)).unwrap();
        assert_eq!(reporter.class_counts(), [30, 0, 0]);

        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(text.contains("30 predictions in 30.0 s (1.00 Hz)"));
    }

    #[tokio::test(start_paused = true)]
    async fn run_for_stops_at_deadline() {
        let (tx, mut rx) = result_queue();
        tx.push(result(0, [0.3, 0.3, 0.4]));
        tx.push(result(1, [0.3, 0.3, 0.4]));

        let mut reporter = ConsoleReporter::new(Vec::new());
        let start = Instant::now();
        let printed = reporter
            .run_for(&mut rx, Duration::from_secs(2))
            .await
            .unwrap();

        assert_eq!(printed, 2);
        assert_eq!(start.elapsed(), Duration::from_secs(2));
        drop(tx);
    }
}
