//! Raw register access
//!
//! Every peripheral register is reached through a [`RegisterBus`]. On the
//! chip that is [`Mmio`], which performs volatile loads and stores; host
//! tests substitute a simulated bus. Drivers never touch raw pointers.
//!
//! Registers carry an [`Access`] discipline. The ESP32 exposes most GPIO
//! state through separate write-1-to-set and write-1-to-clear aliases, which
//! are the lock-free way to change single bits while other contexts touch
//! neighbouring bits. Plain read/write registers go through read-modify-write
//! and are only safe against interrupts when wrapped in [`RegisterAccess::modify`].

use core::ptr::{read_volatile, write_volatile};

/// How a register may be written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Access {
    /// Ordinary read/write register
    Direct,
    /// Write-1-to-set alias; zero bits are ignored by hardware
    SetOnly,
    /// Write-1-to-clear alias; zero bits are ignored by hardware
    ClearOnly,
    /// Writes have no effect
    ReadOnly,
}

/// A memory-mapped register address and its access discipline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Register {
    pub addr: u32,
    pub access: Access,
}

impl Register {
    pub const fn new(addr: u32, access: Access) -> Self {
        Self { addr, access }
    }

    /// Register `offset` bytes into the block at `base`
    pub const fn at(base: u32, offset: u32, access: Access) -> Self {
        Self::new(base + offset, access)
    }
}

/// Word-sized load/store on peripheral address space
pub trait RegisterBus {
    /// Read a 32-bit register
    fn read(&self, addr: u32) -> u32;

    /// Write a 32-bit register
    fn write(&self, addr: u32, value: u32);
}

impl<B: RegisterBus + ?Sized> RegisterBus for &B {
    fn read(&self, addr: u32) -> u32 {
        (**self).read(addr)
    }

    fn write(&self, addr: u32, value: u32) {
        (**self).write(addr, value)
    }
}

/// Volatile access to the real peripheral address space
#[derive(Debug)]
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// Get the memory-mapped bus
    ///
    /// # Safety
    ///
    /// Only valid on the ESP32 itself. The caller must ensure no other
    /// driver reprograms the GPIO, IO-MUX or DPORT interrupt-map registers
    /// behind this driver's back.
    pub const unsafe fn steal() -> Self {
        Self { _private: () }
    }
}

impl RegisterBus for Mmio {
    #[inline(always)]
    fn read(&self, addr: u32) -> u32 {
        // SAFETY: `steal` guarantees we run on the chip, and every address
        // reaching the bus comes from the validated register map.
        unsafe { read_volatile(addr as usize as *const u32) }
    }

    #[inline(always)]
    fn write(&self, addr: u32, value: u32) {
        // SAFETY: see `read`.
        unsafe { write_volatile(addr as usize as *mut u32, value) }
    }
}

/// Disciplined register operations, available on every [`RegisterBus`]
pub trait RegisterAccess: RegisterBus {
    /// Read the current register value
    fn read_reg(&self, reg: Register) -> u32 {
        self.read(reg.addr)
    }

    /// Write a whole word to a [`Access::Direct`] register
    fn write_reg(&self, reg: Register, value: u32) {
        if reg.access != Access::Direct {
            misuse(reg, "write_reg");
            return;
        }
        self.write(reg.addr, value);
    }

    /// Set the bits in `mask`
    ///
    /// On a set-only alias this is a single store of `mask`. On a direct
    /// register it is a read-modify-write that an interrupt touching the
    /// same register can tear; use [`Self::modify`] there instead.
    fn set_bits(&self, reg: Register, mask: u32) {
        match reg.access {
            Access::SetOnly => self.write(reg.addr, mask),
            Access::Direct => {
                let value = self.read(reg.addr);
                self.write(reg.addr, value | mask);
            }
            Access::ClearOnly | Access::ReadOnly => misuse(reg, "set_bits"),
        }
    }

    /// Clear the bits in `mask`
    ///
    /// Same tearing caveat as [`Self::set_bits`] for direct registers.
    fn clear_bits(&self, reg: Register, mask: u32) {
        match reg.access {
            Access::ClearOnly => self.write(reg.addr, mask),
            Access::Direct => {
                let value = self.read(reg.addr);
                self.write(reg.addr, value & !mask);
            }
            Access::SetOnly | Access::ReadOnly => misuse(reg, "clear_bits"),
        }
    }

    /// Clear `clear` then set `set` in one store, inside a critical section
    fn modify(&self, reg: Register, set: u32, clear: u32) {
        if reg.access != Access::Direct {
            misuse(reg, "modify");
            return;
        }
        critical_section::with(|_| {
            let value = self.read(reg.addr);
            self.write(reg.addr, (value & !clear) | set);
        });
    }
}

impl<B: RegisterBus + ?Sized> RegisterAccess for B {}

#[track_caller]
fn misuse(reg: Register, op: &'static str) {
    error!("{} not allowed on register {:#x}", op, reg.addr);
    debug_assert!(false, "{} not allowed on {:?}", op, reg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimBus;

    const DIRECT: Register = Register::new(0x3FF4_9044, Access::Direct);
    const SET: Register = Register::new(0x3FF4_4008, Access::SetOnly);
    const CLEAR: Register = Register::new(0x3FF4_400C, Access::ClearOnly);

    #[test]
    fn test_set_only_writes_mask() {
        let bus = SimBus::new();
        bus.set_bits(SET, 1 << 5);
        assert_eq!(bus.writes(), [(SET.addr, 1 << 5)]);
    }

    #[test]
    fn test_clear_only_writes_mask() {
        let bus = SimBus::new();
        bus.clear_bits(CLEAR, 1 << 7);
        assert_eq!(bus.writes(), [(CLEAR.addr, 1 << 7)]);
    }

    #[test]
    fn test_direct_read_modify_write() {
        let bus = SimBus::new();
        bus.preset(DIRECT.addr, 0b1010);
        bus.set_bits(DIRECT, 0b0001);
        assert_eq!(bus.read_reg(DIRECT), 0b1011);
        bus.clear_bits(DIRECT, 0b1000);
        assert_eq!(bus.read_reg(DIRECT), 0b0011);
    }

    #[test]
    fn test_modify_is_single_store() {
        let bus = SimBus::new();
        bus.preset(DIRECT.addr, 0x0000_7180);
        bus.modify(DIRECT, 2 << 12, 0x7 << 12);
        assert_eq!(bus.writes(), [(DIRECT.addr, 0x0000_2180)]);
    }

    #[test]
    #[should_panic]
    fn test_set_on_clear_register_is_rejected() {
        let bus = SimBus::new();
        bus.set_bits(CLEAR, 1);
    }

    #[test]
    #[should_panic]
    fn test_write_read_only_is_rejected() {
        let bus = SimBus::new();
        bus.write_reg(Register::new(0x3FF4_403C, Access::ReadOnly), 1);
    }
}
