// SPDX-License-Identifier: AGPL-3.0-only

//! Memory-mapped PCI BAR region
//!
//! Maps `/sys/bus/pci/devices/{addr}/resource{N}` with `rustix` and gives
//! bounds-checked volatile access to 32-bit MAC registers.

use crate::error::{EepromError, Result};
use crate::poll::RegisterIo;
use rustix::mm::{mmap, munmap, MapFlags, ProtFlags};
use std::fs::{File, OpenOptions};
use std::os::unix::io::AsFd;
use std::ptr::NonNull;

/// Memory-mapped PCI BAR region
///
/// Unsafe operations are confined to mapping, unmapping and the two
/// volatile accessors.
#[derive(Debug)]
pub struct MmapRegion {
    ptr: NonNull<u8>,
    size: usize,
    _file: File,
    pcie_address: String,
    bar_index: usize,
}

impl MmapRegion {
    /// Map a PCI BAR through sysfs
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Resource file doesn't exist or cannot be opened
    /// - BAR has zero size
    /// - mmap fails
    pub fn new(pcie_address: &str, bar_index: usize) -> Result<Self> {
        let path = format!("/sys/bus/pci/devices/{pcie_address}/resource{bar_index}");

        tracing::debug!("Mapping PCI BAR: {path}");

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| EepromError::map_failed(format!("Cannot open {path}: {e}")))?;

        let size = usize::try_from(
            file.metadata()
                .map_err(|e| EepromError::map_failed(format!("Cannot stat BAR: {e}")))?
                .len(),
        )
        .map_err(|_| EepromError::map_failed("BAR larger than address space"))?;

        if size == 0 {
            return Err(EepromError::map_failed("BAR size is 0 (device not enabled?)"));
        }

        // SAFETY: mmap of a sysfs PCI resource file.
        // - fd is valid (just opened) and kept open in `_file` for the mapping's lifetime
        // - size is non-zero and equals the resource length
        // - MAP_SHARED + READ|WRITE is how sysfs resources are mapped for MMIO
        // - the mapping is released in Drop
        let addr = unsafe {
            mmap(
                std::ptr::null_mut(),
                size,
                ProtFlags::READ | ProtFlags::WRITE,
                MapFlags::SHARED,
                file.as_fd(),
                0,
            )
        }
        .map_err(|e| EepromError::map_failed(format!("mmap failed: {e}")))?;

        let ptr = NonNull::new(addr.cast::<u8>())
            .ok_or_else(|| EepromError::map_failed("mmap returned a null mapping"))?;

        tracing::info!(
            "Mapped BAR{bar_index} for {pcie_address} ({} KB at {ptr:p})",
            size / 1024,
        );

        Ok(Self {
            ptr,
            size,
            _file: file,
            pcie_address: pcie_address.to_string(),
            bar_index,
        })
    }

    fn check(&self, offset: usize) -> Result<()> {
        if offset % 4 != 0 || offset + 4 > self.size {
            return Err(EepromError::map_failed(format!(
                "Register {offset:#x} outside BAR{} (limit {:#x})",
                self.bar_index, self.size
            )));
        }
        Ok(())
    }

    /// Read 32-bit register at offset
    ///
    /// # Errors
    ///
    /// Returns error if offset is out of bounds or unaligned
    pub fn read_u32(&self, offset: usize) -> Result<u32> {
        self.check(offset)?;

        // SAFETY: volatile read of a mapped MMIO register.
        // - offset + 4 <= size and offset is 4-byte aligned (checked above)
        // - ptr comes from a successful mmap that lives as long as self
        #[allow(clippy::cast_ptr_alignment)]
        let value = unsafe { self.ptr.as_ptr().add(offset).cast::<u32>().read_volatile() };

        tracing::trace!("Read u32 @ {offset:#x} = {value:#x}");
        Ok(value)
    }

    /// Write 32-bit register at offset
    ///
    /// # Errors
    ///
    /// Returns error if offset is out of bounds or unaligned
    pub fn write_u32(&mut self, offset: usize, value: u32) -> Result<()> {
        self.check(offset)?;

        tracing::trace!("Write u32 @ {offset:#x} = {value:#x}");

        // SAFETY: volatile write to a mapped MMIO register.
        // - offset + 4 <= size and offset is 4-byte aligned (checked above)
        // - &mut self gives exclusive access to the mapping
        #[allow(clippy::cast_ptr_alignment)]
        unsafe {
            self.ptr.as_ptr().add(offset).cast::<u32>().write_volatile(value);
        }

        Ok(())
    }

    /// Get region size
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Get PCI address
    #[must_use]
    pub fn pcie_address(&self) -> &str {
        &self.pcie_address
    }
}

impl RegisterIo for MmapRegion {
    fn read32(&self, reg: u32) -> Result<u32> {
        self.read_u32(reg as usize)
    }

    fn write32(&mut self, reg: u32, value: u32) -> Result<()> {
        self.write_u32(reg as usize, value)
    }
}

impl Drop for MmapRegion {
    fn drop(&mut self) {
        tracing::debug!("Unmapping BAR{} for {}", self.bar_index, self.pcie_address);

        // SAFETY: ptr/size are exactly what mmap returned in new(); Drop runs once.
        unsafe {
            if let Err(e) = munmap(self.ptr.as_ptr().cast(), self.size) {
                tracing::error!("munmap failed during drop: {e}");
            }
        }
    }
}

// SAFETY: MmapRegion owns its mapping exclusively; moving it between threads
// does not invalidate the mapping.
unsafe impl Send for MmapRegion {}
