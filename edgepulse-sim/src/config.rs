//! Simulator configuration
//!
//! Every section has defaults matching the target device, so an empty JSON
//! object is a valid configuration:
//!
//! ```json
//! {
//!   "timing":  { "tick_period_ms": 10, "dequeue_timeout_ms": 100 },
//!   "queues":  { "sample_capacity": 100 },
//!   "memory":  { "tensor_arena_bytes": 204800 },
//!   "sensor":  { "seed": 42 },
//!   "trigger": "every_append_after_fill"
//! }
//! ```
//!
//! The model shape is not configurable; it is fixed by the artifact.

use std::fs;
use std::path::Path;
use std::time::Duration;

use edgepulse_core::constants::{
    sensor, ACQUISITION_TICK_MS, DEQUEUE_TIMEOUT_MS, EXTENDED_REGION_BYTES, FAST_REGION_BYTES,
    INFERENCE_LATENCY_MS, NORMALIZE_LATENCY_MS, SAMPLE_QUEUE_CAPACITY, TENSOR_ARENA_BYTES,
};
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// When the inference core runs a prediction cycle
///
/// ```text
/// total_seen:            1499  1500  1501  ...  2999  3000
/// EveryAppendAfterFill:    -     P     P    ...    P     P
/// PerWindow:               -     P     -    ...    -     P
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerPolicy {
    /// Predict after every append once the window has filled
    #[default]
    EveryAppendAfterFill,
    /// Predict once per `capacity` new samples
    PerWindow,
}

impl TriggerPolicy {
    /// Whether a cycle should run for the current window state
    ///
    /// `last_prediction_at` is the `total_seen` value of the previous cycle.
    /// Both policies return false when nothing was appended since then.
    pub fn should_predict(
        self,
        total_seen: u64,
        last_prediction_at: Option<u64>,
        capacity: usize,
    ) -> bool {
        let capacity = capacity as u64;
        if total_seen < capacity || last_prediction_at == Some(total_seen) {
            return false;
        }
        match (self, last_prediction_at) {
            (Self::EveryAppendAfterFill, _) | (Self::PerWindow, None) => true,
            (Self::PerWindow, Some(last)) => total_seen - last >= capacity,
        }
    }
}

/// Loop periods and simulated task latencies, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Acquisition tick period
    pub tick_period_ms: u64,
    /// How long the inference core waits for a sample before re-checking stop
    pub dequeue_timeout_ms: u64,
    /// Added latency of a normalization task
    pub normalize_latency_ms: u64,
    /// Added latency of a prediction task
    pub inference_latency_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: ACQUISITION_TICK_MS,
            dequeue_timeout_ms: DEQUEUE_TIMEOUT_MS,
            normalize_latency_ms: NORMALIZE_LATENCY_MS,
            inference_latency_ms: INFERENCE_LATENCY_MS,
        }
    }
}

impl TimingConfig {
    /// Acquisition tick period
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    /// Dequeue wait
    pub fn dequeue_timeout(&self) -> Duration {
        Duration::from_millis(self.dequeue_timeout_ms)
    }

    /// Upper bound on how long shutdown waits for both loops
    pub fn shutdown_bound(&self) -> Duration {
        self.tick_period().max(self.dequeue_timeout())
    }
}

/// Queue sizes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Capacity of the sample queue between the cores
    pub sample_capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            sample_capacity: SAMPLE_QUEUE_CAPACITY,
        }
    }
}

/// Region capacities and boot reservations, in bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// On-chip RAM
    pub fast_bytes: usize,
    /// External PSRAM
    pub extended_bytes: usize,
    /// Interpreter scratch space reserved next to the model
    pub tensor_arena_bytes: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            fast_bytes: FAST_REGION_BYTES,
            extended_bytes: EXTENDED_REGION_BYTES,
            tensor_arena_bytes: TENSOR_ARENA_BYTES,
        }
    }
}

/// Synthetic signal parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Mean of the infrared channel
    pub ir_mean: f64,
    /// Standard deviation of the infrared channel
    pub ir_std_dev: f64,
    /// Upper clamp of the infrared channel
    pub ir_max: f64,
    /// Mean of the red channel
    pub red_mean: f64,
    /// Standard deviation of the red channel
    pub red_std_dev: f64,
    /// Upper clamp of the red channel
    pub red_max: f64,
    /// RNG seed; entropy-seeded when absent
    pub seed: Option<u64>,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            ir_mean: sensor::IR_MEAN,
            ir_std_dev: sensor::IR_STD_DEV,
            ir_max: sensor::IR_MAX,
            red_mean: sensor::RED_MEAN,
            red_std_dev: sensor::RED_STD_DEV,
            red_max: sensor::RED_MAX,
            seed: None,
        }
    }
}

/// Complete simulator configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Loop timing
    pub timing: TimingConfig,
    /// Queue sizes
    pub queues: QueueConfig,
    /// Memory regions
    pub memory: MemoryConfig,
    /// Synthetic sensor
    pub sensor: SensorConfig,
    /// Prediction trigger
    pub trigger: TriggerPolicy,
}

impl SimConfig {
    /// Parse a configuration from JSON text
    pub fn from_json_str(text: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read a configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| SimError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Render the configuration in the form [`SimConfig::from_json_str`] reads
    pub fn to_json_pretty(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the device cannot run with
    pub fn validate(&self) -> SimResult<()> {
        if self.timing.tick_period_ms == 0 {
            return Err(SimError::Config("tick_period_ms must be positive".into()));
        }
        if self.timing.dequeue_timeout_ms == 0 {
            return Err(SimError::Config(
                "dequeue_timeout_ms must be positive".into(),
            ));
        }
        if self.queues.sample_capacity == 0 {
            return Err(SimError::Config("sample_capacity must be positive".into()));
        }

        let s = &self.sensor;
        for (name, std_dev) in [("ir_std_dev", s.ir_std_dev), ("red_std_dev", s.red_std_dev)] {
            if !std_dev.is_finite() || std_dev < 0.0 {
                return Err(SimError::Config(format!(
                    "{name} must be finite and non-negative, got {std_dev}"
                )));
            }
        }
        for (name, max) in [("ir_max", s.ir_max), ("red_max", s.red_max)] {
            if !max.is_finite() || max <= 0.0 {
                return Err(SimError::Config(format!(
                    "{name} must be finite and positive, got {max}"
                )));
            }
        }
        if !s.ir_mean.is_finite() || !s.red_mean.is_finite() {
            return Err(SimError::Config("sensor means must be finite".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_device() {
        let config = SimConfig::default();
        assert_eq!(config.timing.tick_period(), Duration::from_millis(10));
        assert_eq!(config.timing.dequeue_timeout(), Duration::from_millis(100));
        assert_eq!(config.timing.shutdown_bound(), Duration::from_millis(100));
        assert_eq!(config.queues.sample_capacity, 100);
        assert_eq!(config.memory.tensor_arena_bytes, 200 * 1024);
        assert_eq!(config.trigger, TriggerPolicy::EveryAppendAfterFill);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_object_is_default() {
        assert_eq!(SimConfig::from_json_str("{}").unwrap(), SimConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = SimConfig::from_json_str(
            r#"{ "timing": { "tick_period_ms": 5 }, "trigger": "per_window", "sensor": { "seed": 9 } }"#,
        )
        .unwrap();
        assert_eq!(config.timing.tick_period_ms, 5);
        assert_eq!(config.timing.dequeue_timeout_ms, 100);
        assert_eq!(config.trigger, TriggerPolicy::PerWindow);
        assert_eq!(config.sensor.seed, Some(9));
        assert_eq!(config.sensor.ir_mean, 1000.0);
    }

    #[test]
    fn rejects_zero_capacity() {
        let mut config = SimConfig::default();
        config.queues.sample_capacity = 0;
        assert!(matches!(config.validate(), Err(SimError::Config(_))));
    }

    #[test]
    fn rejects_negative_std_dev() {
        let mut config = SimConfig::default();
        config.sensor.red_std_dev = -1.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("red_std_dev"));
    }

    #[test]
    fn literal_trigger_fires_on_every_append() {
        let policy = TriggerPolicy::EveryAppendAfterFill;
        assert!(!policy.should_predict(1499, None, 1500));
        assert!(policy.should_predict(1500, None, 1500));
        assert!(policy.should_predict(1501, Some(1500), 1500));
        assert!(!policy.should_predict(1501, Some(1501), 1500));
    }

    #[test]
    fn per_window_trigger_waits_for_fresh_window() {
        let policy = TriggerPolicy::PerWindow;
        assert!(policy.should_predict(1500, None, 1500));
        assert!(!policy.should_predict(1501, Some(1500), 1500));
        assert!(!policy.should_predict(2999, Some(1500), 1500));
        assert!(policy.should_predict(3000, Some(1500), 1500));
    }
}
