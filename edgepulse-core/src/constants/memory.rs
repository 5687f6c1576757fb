//! Memory Budgets of the Simulated Device
//!
//! The target is a dual-core microcontroller with on-chip SRAM and an external
//! PSRAM chip. Both are modeled as byte counters with a hard ceiling.

/// On-chip SRAM budget ("fast" region).
///
/// - 520 KiB total on the target part
/// - Holds the rolling window and loop state
pub const FAST_REGION_BYTES: usize = 520 * 1024;

/// External PSRAM budget ("extended" region).
///
/// - 4 MiB module
/// - Holds the model weights and the interpreter tensor arena
pub const EXTENDED_REGION_BYTES: usize = 4 * 1024 * 1024;

/// Scratch memory reserved for the interpreter at boot.
///
/// Matches the arena size the firmware hands to its micro interpreter.
pub const TENSOR_ARENA_BYTES: usize = 200 * 1024;
