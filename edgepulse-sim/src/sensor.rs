//! Sample sources for the acquisition core
//!
//! [`SyntheticSensor`] stands in for the pulse oximeter front end: each read
//! draws both channels from independent normal distributions and clamps them
//! to the ADC range `[0, max]`. [`load_dataset_csv`] reads a recorded session
//! for playback through [`ReplaySource`].

use std::f64::consts::PI;
use std::fs;
use std::path::Path;

use edgepulse_core::{ReplaySource, Sample, SensorSource};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SensorConfig;
use crate::error::{SimError, SimResult};

/// Gaussian two-channel signal generator
#[derive(Debug, Clone)]
pub struct SyntheticSensor {
    rng: StdRng,
    config: SensorConfig,
}

impl SyntheticSensor {
    /// Generator with the given distribution; seeded from entropy if
    /// `config.seed` is `None`
    pub fn new(config: SensorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng, config }
    }

    /// Two independent standard normal values (Box-Muller)
    fn standard_normal_pair(&mut self) -> (f64, f64) {
        // u1 in (0, 1] keeps ln() finite
        let u1 = 1.0 - self.rng.gen::<f64>();
        let u2 = self.rng.gen::<f64>();
        let radius = libm::sqrt(-2.0 * libm::log(u1));
        let angle = 2.0 * PI * u2;
        (radius * libm::cos(angle), radius * libm::sin(angle))
    }
}

impl SensorSource for SyntheticSensor {
    fn read(&mut self) -> Sample {
        let (z_ir, z_red) = self.standard_normal_pair();
        let c = &self.config;
        Sample::new(
            (c.ir_mean + c.ir_std_dev * z_ir).clamp(0.0, c.ir_max),
            (c.red_mean + c.red_std_dev * z_red).clamp(0.0, c.red_max),
        )
    }
}

/// Read a recorded session of `ir,red` lines
///
/// A first line that is not numeric is taken as a header. Blank lines are
/// skipped. Any other malformed line is an error naming its line number.
pub fn load_dataset_csv(path: impl AsRef<Path>) -> SimResult<Vec<Sample>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| SimError::DatasetIo {
        path: path.to_path_buf(),
        source,
    })?;
    let samples = parse_dataset(&text)?;
    log::info!("loaded {} samples from {}", samples.len(), path.display());
    Ok(samples)
}

/// Load a dataset and wrap it for cyclic playback
pub fn dataset_source(path: impl AsRef<Path>) -> SimResult<ReplaySource> {
    ReplaySource::new(load_dataset_csv(path)?).ok_or(SimError::EmptyDataset)
}

fn parse_dataset(text: &str) -> SimResult<Vec<Sample>> {
    let mut samples = Vec::new();
    let mut first = true;

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let is_first = std::mem::replace(&mut first, false);

        match parse_line(line) {
            Ok(sample) => samples.push(sample),
            Err(_) if is_first && line.chars().any(char::is_alphabetic) => {}
            Err(reason) => {
                return Err(SimError::Dataset {
                    line: idx + 1,
                    reason,
                })
            }
        }
    }
    Ok(samples)
}

fn parse_line(line: &str) -> Result<Sample, String> {
    let mut fields = line.split(',').map(str::trim);
    let (Some(ir), Some(red), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(format!("expected 2 fields, got {:?}", line));
    };
    let ir: f64 = ir.parse().map_err(|_| format!("bad ir value {ir:?}"))?;
    let red: f64 = red.parse().map_err(|_| format!("bad red value {red:?}"))?;
    let sample = Sample::new(ir, red);
    if !sample.is_finite() {
        return Err(format!("non-finite sample {ir}, {red}"));
    }
    Ok(sample)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_values_stay_in_range() {
        let mut sensor = SyntheticSensor::new(SensorConfig {
            seed: Some(1),
            ..SensorConfig::default()
        });
        for _ in 0..10_000 {
            let s = sensor.read();
            assert!((0.0..=2000.0).contains(&s.ir));
            assert!((0.0..=1600.0).contains(&s.red));
        }
    }

    #[test]
    fn synthetic_mean_is_near_configured() {
        let mut sensor = SyntheticSensor::new(SensorConfig {
            seed: Some(2),
            ..SensorConfig::default()
        });
        let n = 20_000;
        let (mut ir, mut red) = (0.0, 0.0);
        for _ in 0..n {
            let s = sensor.read();
            ir += s.ir;
            red += s.red;
        }
        assert!((ir / n as f64 - 1000.0).abs() < 5.0);
        assert!((red / n as f64 - 800.0).abs() < 5.0);
    }

    #[test]
    fn clamps_wide_distribution() {
        let mut sensor = SyntheticSensor::new(SensorConfig {
            ir_std_dev: 10_000.0,
            red_std_dev: 10_000.0,
            seed: Some(3),
            ..SensorConfig::default()
        });
        let samples: Vec<Sample> = (0..1000).map(|_| sensor.read()).collect();
        assert!(samples.iter().any(|s| s.ir == 0.0));
        assert!(samples.iter().any(|s| s.ir == 2000.0));
        assert!(samples.iter().all(|s| s.red <= 1600.0));
    }

    #[test]
    fn same_seed_same_signal() {
        let config = SensorConfig {
            seed: Some(42),
            ..SensorConfig::default()
        };
        let mut a = SyntheticSensor::new(config.clone());
        let mut b = SyntheticSensor::new(config);
        for _ in 0..100 {
            assert_eq!(a.read(), b.read());
        }
    }

    #[test]
    fn parses_header_and_blank_lines() {
        let samples = parse_dataset("ir,red\n1000,800\n\n 1001.5 , 799 \n").unwrap();
        assert_eq!(
            samples,
            vec![Sample::new(1000.0, 800.0), Sample::new(1001.5, 799.0)]
        );
    }

    #[test]
    fn malformed_line_reports_number() {
        let err = parse_dataset("1000,800\n1000\n").unwrap_err();
        match err {
            SimError::Dataset { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn header_only_after_first_line() {
        assert!(parse_dataset("1000,800\nir,red\n").is_err());
    }
}
