//! Region-Based Memory Accounting
//!
//! ## Overview
//!
//! The target device has two memory pools with very different sizes and
//! speeds: on-chip SRAM and external PSRAM. The simulator does not manage real
//! memory layout; it keeps a byte counter per pool and refuses any allocation
//! that would push the counter past the pool's capacity. This is enough to
//! catch a model or window that would not fit before anything is flashed.
//!
//! ```text
//! MemoryAllocator
//! ├── fast      (SRAM)   520 KiB   window storage
//! └── extended  (PSRAM)  4 MiB     model bytes, tensor arena
//! ```
//!
//! ## Invariants
//!
//! - `used <= capacity` for both regions, checked before every increment
//! - A failed allocation leaves `used` unchanged
//! - A free larger than `used` is rejected and leaves `used` unchanged
//!
//! The allocator is owned by the device and only touched during boot, so it
//! needs no synchronization.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::constants::{EXTENDED_REGION_BYTES, FAST_REGION_BYTES};
use crate::errors::{DeviceError, DeviceResult};

/// Which memory pool a request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RegionKind {
    /// On-chip SRAM
    Fast,
    /// External PSRAM
    Extended,
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fast => f.write_str("fast"),
            Self::Extended => f.write_str("extended"),
        }
    }
}

/// Byte counter with a hard ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRegion {
    kind: RegionKind,
    capacity: usize,
    used: usize,
}

impl MemoryRegion {
    /// Create an empty region
    pub const fn new(kind: RegionKind, capacity: usize) -> Self {
        Self {
            kind,
            capacity,
            used: 0,
        }
    }

    /// Region identity
    pub fn kind(&self) -> RegionKind {
        self.kind
    }

    /// Total bytes
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes currently reserved
    pub fn used(&self) -> usize {
        self.used
    }

    /// Bytes still free
    pub fn available(&self) -> usize {
        self.capacity - self.used
    }

    fn reserve(&mut self, size: usize) -> DeviceResult<()> {
        // checked_add so a huge request cannot wrap past the test
        match self.used.checked_add(size) {
            Some(total) if total <= self.capacity => {
                self.used = total;
                Ok(())
            }
            _ => {
                log_warn!(
                    "{} region full: {} bytes requested, {} of {} in use",
                    self.kind,
                    size,
                    self.used,
                    self.capacity
                );
                Err(DeviceError::OutOfMemory {
                    region: self.kind,
                    requested: size,
                    available: self.available(),
                })
            }
        }
    }

    fn release(&mut self, size: usize) -> DeviceResult<()> {
        if size > self.used {
            log_warn!(
                "{} region: free of {} bytes with only {} in use",
                self.kind,
                size,
                self.used
            );
            return Err(DeviceError::InvalidFree {
                region: self.kind,
                size,
                used: self.used,
            });
        }
        self.used -= size;
        Ok(())
    }
}

/// Zero-initialized buffer handed out by [`MemoryAllocator::allocate`]
///
/// Dropping the buffer does not return its bytes to the region; callers free
/// explicitly, the same way firmware pairs `ps_malloc` with `free`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionBuffer {
    region: RegionKind,
    bytes: Vec<u8>,
}

impl RegionBuffer {
    /// Region the bytes were charged to
    pub fn region(&self) -> RegionKind {
        self.region
    }

    /// Buffer size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the buffer is zero-sized
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Raw contents
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

/// Two-region allocator of the simulated device
#[derive(Debug, Clone)]
pub struct MemoryAllocator {
    fast: MemoryRegion,
    extended: MemoryRegion,
}

impl MemoryAllocator {
    /// Allocator with the target part's capacities
    pub fn new() -> Self {
        Self::with_capacities(FAST_REGION_BYTES, EXTENDED_REGION_BYTES)
    }

    /// Allocator with custom capacities
    pub fn with_capacities(fast: usize, extended: usize) -> Self {
        Self {
            fast: MemoryRegion::new(RegionKind::Fast, fast),
            extended: MemoryRegion::new(RegionKind::Extended, extended),
        }
    }

    /// Reserve `size` bytes in `region` and return a zeroed buffer
    ///
    /// Fails with [`DeviceError::OutOfMemory`] iff `used + size > capacity`.
    pub fn allocate(&mut self, size: usize, region: RegionKind) -> DeviceResult<RegionBuffer> {
        self.region_mut(region).reserve(size)?;
        Ok(RegionBuffer {
            region,
            bytes: vec![0u8; size],
        })
    }

    /// Return `size` bytes to `region`
    ///
    /// Freeing more than is in use is rejected with
    /// [`DeviceError::InvalidFree`] rather than wrapping the counter.
    pub fn free(&mut self, size: usize, region: RegionKind) -> DeviceResult<()> {
        self.region_mut(region).release(size)
    }

    /// Release a buffer obtained from [`allocate`](Self::allocate)
    pub fn release(&mut self, buffer: RegionBuffer) -> DeviceResult<()> {
        self.free(buffer.len(), buffer.region)
    }

    /// Read-only view of a region
    pub fn region(&self, region: RegionKind) -> &MemoryRegion {
        match region {
            RegionKind::Fast => &self.fast,
            RegionKind::Extended => &self.extended,
        }
    }

    /// Bytes in use in a region
    pub fn used(&self, region: RegionKind) -> usize {
        self.region(region).used()
    }

    /// Capacity of a region
    pub fn capacity(&self, region: RegionKind) -> usize {
        self.region(region).capacity()
    }

    fn region_mut(&mut self, region: RegionKind) -> &mut MemoryRegion {
        match region {
            RegionKind::Fast => &mut self.fast,
            RegionKind::Extended => &mut self.extended,
        }
    }
}

impl Default for MemoryAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_capacities() {
        let allocator = MemoryAllocator::new();
        assert_eq!(allocator.capacity(RegionKind::Fast), 520 * 1024);
        assert_eq!(allocator.capacity(RegionKind::Extended), 4 * 1024 * 1024);
        assert_eq!(allocator.used(RegionKind::Fast), 0);
    }

    #[test]
    fn allocate_returns_zeroed_buffer() {
        let mut allocator = MemoryAllocator::with_capacities(64, 64);
        let buf = allocator.allocate(16, RegionKind::Fast).unwrap();
        assert_eq!(buf.len(), 16);
        assert!(buf.as_slice().iter().all(|&b| b == 0));
        assert_eq!(buf.region(), RegionKind::Fast);
        assert_eq!(allocator.used(RegionKind::Fast), 16);
        assert_eq!(allocator.used(RegionKind::Extended), 0);
    }

    #[test]
    fn exact_fit_succeeds() {
        let mut allocator = MemoryAllocator::with_capacities(64, 64);
        assert!(allocator.allocate(64, RegionKind::Extended).is_ok());
        assert_eq!(allocator.region(RegionKind::Extended).available(), 0);
    }

    #[test]
    fn overflow_leaves_usage_untouched() {
        let mut allocator = MemoryAllocator::with_capacities(64, 64);
        allocator.allocate(63, RegionKind::Fast).unwrap();

        let err = allocator.allocate(2, RegionKind::Fast).unwrap_err();
        assert_eq!(
            err,
            DeviceError::OutOfMemory {
                region: RegionKind::Fast,
                requested: 2,
                available: 1,
            }
        );
        assert_eq!(allocator.used(RegionKind::Fast), 63);
    }

    #[test]
    fn huge_request_does_not_wrap() {
        let mut allocator = MemoryAllocator::with_capacities(64, 64);
        allocator.allocate(1, RegionKind::Fast).unwrap();
        assert!(allocator.allocate(usize::MAX, RegionKind::Fast).is_err());
        assert_eq!(allocator.used(RegionKind::Fast), 1);
    }

    #[test]
    fn free_and_reuse() {
        let mut allocator = MemoryAllocator::with_capacities(64, 64);
        let buf = allocator.allocate(40, RegionKind::Fast).unwrap();
        allocator.release(buf).unwrap();
        assert_eq!(allocator.used(RegionKind::Fast), 0);
        assert!(allocator.allocate(64, RegionKind::Fast).is_ok());
    }

    #[test]
    fn over_free_is_rejected() {
        let mut allocator = MemoryAllocator::with_capacities(64, 64);
        allocator.allocate(8, RegionKind::Extended).unwrap();

        let err = allocator.free(9, RegionKind::Extended).unwrap_err();
        assert_eq!(
            err,
            DeviceError::InvalidFree {
                region: RegionKind::Extended,
                size: 9,
                used: 8,
            }
        );
        assert_eq!(allocator.used(RegionKind::Extended), 8);
    }
}
