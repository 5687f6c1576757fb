//! Inference Engines for EdgePulse
//!
//! ## Overview
//!
//! The device treats the classifier as an opaque component behind
//! [`edgepulse_core::InferenceEngine`]. This crate provides the engines the
//! simulator boots with and the loader for the model file:
//!
//! - [`DenseSoftmaxModel`]: a single dense layer followed by softmax, read
//!   from a JSON artifact. Small enough to sit in the extended region next to
//!   its tensor arena.
//! - [`FixedOutputEngine`]: answers every valid input with the same
//!   distribution and records its invocations. Used for dry runs and for
//!   observing the inference loop in tests.
//!
//! ## Boot Sequence
//!
//! ```text
//! model.json ──► ModelArtifact::load ──► size_bytes() ──► extended region
//!                        │
//!                        └─► into_engine() ──► ensure_shape() ──► inference core
//! ```
//!
//! Any failure here happens before the loops start and is fatal to the run.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod artifact;
pub mod dense;
pub mod error;
pub mod fixed;

pub use artifact::{ModelArtifact, ModelSpec};
pub use dense::{softmax, DenseSoftmaxModel};
pub use error::{ModelError, ModelResult};
pub use fixed::{EngineProbe, FixedOutputEngine, ProbeState};
