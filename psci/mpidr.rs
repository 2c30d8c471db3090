//! Multiprocessor affinity values

/// CPU MPIDR (Multiprocessor Affinity Register)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mpidr {
    pub raw: u64,
}

impl Mpidr {
    /// Mask of the affinity fields
    pub const AFFINITY_MASK: u64 = 0xFF_00FF_FFFF;

    /// Create from raw MPIDR value
    pub const fn new(raw: u64) -> Self {
        Self { raw }
    }

    /// Create from affinity levels
    pub const fn from_affinity(aff3: u8, aff2: u8, aff1: u8, aff0: u8) -> Self {
        let raw = ((aff3 as u64) << 32) | ((aff2 as u64) << 16) | ((aff1 as u64) << 8) | aff0 as u64;
        Self { raw }
    }

    /// Get affinity level 0 (core)
    pub const fn aff0(&self) -> u8 {
        (self.raw & 0xFF) as u8
    }

    /// Get affinity level 1 (cluster)
    pub const fn aff1(&self) -> u8 {
        ((self.raw >> 8) & 0xFF) as u8
    }

    /// Get affinity level 2
    pub const fn aff2(&self) -> u8 {
        ((self.raw >> 16) & 0xFF) as u8
    }

    /// Get affinity level 3
    pub const fn aff3(&self) -> u8 {
        ((self.raw >> 32) & 0xFF) as u8
    }

    /// Drop the non-affinity bits (U, MT, RES1)
    pub const fn affinity(&self) -> Self {
        Self::new(self.raw & Self::AFFINITY_MASK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mpidr_fields() {
        let mpidr = Mpidr::from_affinity(0, 0, 1, 0);
        assert_eq!(mpidr.raw, 0x100);
        assert_eq!(mpidr.aff0(), 0);
        assert_eq!(mpidr.aff1(), 1);

        // RES1 bit 31 as read back from MPIDR_EL1
        let hw = Mpidr::new(0x8000_0101);
        assert_eq!(hw.affinity(), Mpidr::from_affinity(0, 0, 1, 1));
        assert_eq!(hw.aff2(), 0);
        assert_eq!(hw.aff3(), 0);
    }
}
