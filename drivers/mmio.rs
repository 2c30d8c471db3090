//! 32-bit register access
//!
//! [`RegisterAccess`] is the only way this crate touches hardware. The
//! production backend performs volatile loads and stores on identity-mapped
//! device memory; tests swap in the simulated register file.

use core::ptr::NonNull;

use volatile::VolatilePtr;

/// Read and write 32-bit registers at absolute addresses
pub trait RegisterAccess {
    /// Read the register at `addr`
    fn read32(&self, addr: usize) -> u32;

    /// Write `value` to the register at `addr`
    fn write32(&self, addr: usize, value: u32);

    /// Read-modify-write setting `mask`
    fn set_bits32(&self, addr: usize, mask: u32) {
        let value = self.read32(addr);
        self.write32(addr, value | mask);
    }

    /// Read-modify-write clearing `mask`
    fn clear_bits32(&self, addr: usize, mask: u32) {
        let value = self.read32(addr);
        self.write32(addr, value & !mask);
    }
}

impl<T: RegisterAccess + ?Sized> RegisterAccess for &T {
    #[inline]
    fn read32(&self, addr: usize) -> u32 {
        (**self).read32(addr)
    }

    #[inline]
    fn write32(&self, addr: usize, value: u32) {
        (**self).write32(addr, value)
    }
}

/// Memory-mapped register backend
#[derive(Debug, Clone, Copy)]
pub struct MmioRegisters {
    _private: (),
}

impl MmioRegisters {
    /// Create the MMIO backend.
    ///
    /// # Safety
    ///
    /// Every address later passed to [`RegisterAccess`] must be a non-null,
    /// 4-byte aligned device register mapped at the same virtual address,
    /// and no other code may assume exclusive access to those registers.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }

    #[inline]
    fn register(addr: usize) -> VolatilePtr<'static, u32> {
        // SAFETY: `new` obliges the caller to only hand out valid register
        // addresses, which are never null.
        unsafe { VolatilePtr::new(NonNull::new_unchecked(addr as *mut u32)) }
    }
}

impl RegisterAccess for MmioRegisters {
    #[inline]
    fn read32(&self, addr: usize) -> u32 {
        Self::register(addr).read()
    }

    #[inline]
    fn write32(&self, addr: usize, value: u32) {
        Self::register(addr).write(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mmio_round_trip_on_plain_memory() {
        let mut word: u32 = 0x10;
        let addr = &mut word as *mut u32 as usize;
        // SAFETY: `word` outlives the backend and is only used through it.
        let regs = unsafe { MmioRegisters::new() };

        regs.set_bits32(addr, 1 << 31);
        regs.clear_bits32(addr, 0x10);
        assert_eq!(regs.read32(addr), 0x8000_0000);
        regs.write32(addr, 0xdead_beef);
        assert_eq!(regs.read32(addr), 0xdead_beef);
    }

    #[test]
    fn test_reference_forwards() {
        let mut word: u32 = 0;
        let addr = &mut word as *mut u32 as usize;
        // SAFETY: as above.
        let regs = unsafe { MmioRegisters::new() };
        let by_ref = &regs;
        by_ref.write32(addr, 5);
        assert_eq!(regs.read32(addr), 5);
    }
}
