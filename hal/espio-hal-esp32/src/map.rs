//! ESP32 GPIO register map
//!
//! The whole hardware description lives in this file as data: block bases,
//! fixed GPIO registers, per-pin register arrays, IO-MUX bit fields and the
//! IO-MUX pad table. [`validate`] checks the description once at startup so
//! a typo in an offset surfaces as an error instead of a stray write.

use crate::error::MapError;
use crate::regs::{Access, Register};

/// Number of GPIO numbers the register map covers
pub const PIN_COUNT: usize = 40;

/// Peripheral block a register lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Block {
    Gpio,
    IoMux,
    Dport,
}

impl Block {
    pub const fn base(self) -> u32 {
        match self {
            Block::Gpio => 0x3FF4_4000,
            Block::IoMux => 0x3FF4_9000,
            Block::Dport => 0x3FF0_0000,
        }
    }

    /// Size of the block's address window in bytes
    pub const fn size(self) -> u32 {
        0x1000
    }
}

/// A named register at a fixed offset in a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterDesc {
    pub name: &'static str,
    pub block: Block,
    pub offset: u32,
    pub access: Access,
}

impl RegisterDesc {
    const fn gpio(name: &'static str, offset: u32, access: Access) -> Self {
        Self {
            name,
            block: Block::Gpio,
            offset,
            access,
        }
    }

    pub const fn reg(&self) -> Register {
        Register::at(self.block.base(), self.offset, self.access)
    }
}

/// A register repeated once per pin at a fixed stride
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterArray {
    pub name: &'static str,
    pub block: Block,
    pub offset: u32,
    pub stride: u32,
    pub count: u32,
    pub access: Access,
}

impl RegisterArray {
    /// Register for entry `n`; the caller validates `n`
    pub const fn reg(&self, n: u8) -> Register {
        Register::at(
            self.block.base(),
            self.offset + self.stride * n as u32,
            self.access,
        )
    }

    /// Byte offset one past the last entry
    pub const fn end(&self) -> u32 {
        self.offset + self.stride * self.count
    }
}

// Bank 0: pins 0-31
pub const OUT: RegisterDesc = RegisterDesc::gpio("OUT", 0x04, Access::Direct);
pub const OUT_W1TS: RegisterDesc = RegisterDesc::gpio("OUT_W1TS", 0x08, Access::SetOnly);
pub const OUT_W1TC: RegisterDesc = RegisterDesc::gpio("OUT_W1TC", 0x0C, Access::ClearOnly);
pub const ENABLE: RegisterDesc = RegisterDesc::gpio("ENABLE", 0x20, Access::Direct);
pub const ENABLE_W1TS: RegisterDesc = RegisterDesc::gpio("ENABLE_W1TS", 0x24, Access::SetOnly);
pub const ENABLE_W1TC: RegisterDesc =
    RegisterDesc::gpio("ENABLE_W1TC", 0x28, Access::ClearOnly);
pub const IN: RegisterDesc = RegisterDesc::gpio("IN", 0x3C, Access::ReadOnly);
pub const STATUS: RegisterDesc = RegisterDesc::gpio("STATUS", 0x44, Access::Direct);
pub const STATUS_W1TS: RegisterDesc = RegisterDesc::gpio("STATUS_W1TS", 0x48, Access::SetOnly);
pub const STATUS_W1TC: RegisterDesc =
    RegisterDesc::gpio("STATUS_W1TC", 0x4C, Access::ClearOnly);

// Bank 1: pins 32-39
pub const OUT1: RegisterDesc = RegisterDesc::gpio("OUT1", 0x10, Access::Direct);
pub const OUT1_W1TS: RegisterDesc = RegisterDesc::gpio("OUT1_W1TS", 0x14, Access::SetOnly);
pub const OUT1_W1TC: RegisterDesc = RegisterDesc::gpio("OUT1_W1TC", 0x18, Access::ClearOnly);
pub const ENABLE1: RegisterDesc = RegisterDesc::gpio("ENABLE1", 0x2C, Access::Direct);
pub const ENABLE1_W1TS: RegisterDesc =
    RegisterDesc::gpio("ENABLE1_W1TS", 0x30, Access::SetOnly);
pub const ENABLE1_W1TC: RegisterDesc =
    RegisterDesc::gpio("ENABLE1_W1TC", 0x34, Access::ClearOnly);
pub const IN1: RegisterDesc = RegisterDesc::gpio("IN1", 0x40, Access::ReadOnly);
pub const STATUS1: RegisterDesc = RegisterDesc::gpio("STATUS1", 0x50, Access::Direct);
pub const STATUS1_W1TS: RegisterDesc =
    RegisterDesc::gpio("STATUS1_W1TS", 0x54, Access::SetOnly);
pub const STATUS1_W1TC: RegisterDesc =
    RegisterDesc::gpio("STATUS1_W1TC", 0x58, Access::ClearOnly);

/// Every fixed GPIO register
pub const GPIO_REGISTERS: &[RegisterDesc] = &[
    OUT,
    OUT_W1TS,
    OUT_W1TC,
    OUT1,
    OUT1_W1TS,
    OUT1_W1TC,
    ENABLE,
    ENABLE_W1TS,
    ENABLE_W1TC,
    ENABLE1,
    ENABLE1_W1TS,
    ENABLE1_W1TC,
    IN,
    IN1,
    STATUS,
    STATUS_W1TS,
    STATUS_W1TC,
    STATUS1,
    STATUS1_W1TS,
    STATUS1_W1TC,
];

/// `GPIO_PINn_REG`: interrupt type/enable and pad driver
pub const PIN: RegisterArray = RegisterArray {
    name: "PIN",
    block: Block::Gpio,
    offset: 0x88,
    stride: 4,
    count: PIN_COUNT as u32,
    access: Access::Direct,
};

/// `GPIO_FUNCn_OUT_SEL_CFG_REG`: output signal routing
pub const FUNC_OUT_SEL_CFG: RegisterArray = RegisterArray {
    name: "FUNC_OUT_SEL_CFG",
    block: Block::Gpio,
    offset: 0x530,
    stride: 4,
    count: PIN_COUNT as u32,
    access: Access::Direct,
};

pub const GPIO_ARRAYS: &[RegisterArray] = &[PIN, FUNC_OUT_SEL_CFG];

/// GPIO interrupt source number in the interrupt matrix
pub const GPIO_INTERRUPT_SOURCE: u32 = 22;

/// `DPORT_PRO_GPIO_INTERRUPT_MAP_REG`: routes the GPIO source to a PRO CPU line
pub const PRO_GPIO_INTERRUPT_MAP: RegisterDesc = RegisterDesc {
    name: "PRO_GPIO_INTERRUPT_MAP",
    block: Block::Dport,
    offset: 0x104 + 4 * GPIO_INTERRUPT_SOURCE,
    access: Access::Direct,
};

/// IO-MUX pad register offset per GPIO number
///
/// The pad order in IO-MUX follows the package pinout, not the GPIO
/// numbering. GPIO24 and GPIO28-31 do not exist.
pub const IO_MUX_OFFSETS: [Option<u16>; PIN_COUNT] = [
    Some(0x44), // 0
    Some(0x88), // 1
    Some(0x40), // 2
    Some(0x84), // 3
    Some(0x48), // 4
    Some(0x6C), // 5
    Some(0x60), // 6
    Some(0x64), // 7
    Some(0x68), // 8
    Some(0x54), // 9
    Some(0x58), // 10
    Some(0x5C), // 11
    Some(0x34), // 12
    Some(0x38), // 13
    Some(0x30), // 14
    Some(0x3C), // 15
    Some(0x4C), // 16
    Some(0x50), // 17
    Some(0x70), // 18
    Some(0x74), // 19
    Some(0x78), // 20
    Some(0x7C), // 21
    Some(0x80), // 22
    Some(0x8C), // 23
    None,       // 24
    Some(0x24), // 25
    Some(0x28), // 26
    Some(0x2C), // 27
    None,       // 28
    None,       // 29
    None,       // 30
    None,       // 31
    Some(0x1C), // 32
    Some(0x20), // 33
    Some(0x14), // 34
    Some(0x18), // 35
    Some(0x04), // 36
    Some(0x08), // 37
    Some(0x0C), // 38
    Some(0x10), // 39
];

/// Bit fields of the GPIO and IO-MUX registers
pub mod fields {
    // GPIO_PINn_REG
    pub const PIN_PAD_DRIVER: u32 = 1 << 2;
    pub const PIN_INT_TYPE_SHIFT: u32 = 7;
    pub const PIN_INT_TYPE_MASK: u32 = 0x7 << PIN_INT_TYPE_SHIFT;
    pub const PIN_INT_ENA_SHIFT: u32 = 13;
    pub const PIN_INT_ENA_MASK: u32 = 0x1F << PIN_INT_ENA_SHIFT;
    /// Interrupt enable bit for the PRO CPU (non-NMI)
    pub const PIN_INT_ENA_PRO_CPU: u32 = 1 << 15;

    // GPIO_FUNCn_OUT_SEL_CFG_REG
    /// Output signal index 256: drive the pad from the GPIO OUT register
    pub const FUNC_OUT_SEL_GPIO: u32 = 0x100;

    // IO_MUX_x_REG
    pub const MCU_SEL_SHIFT: u32 = 12;
    pub const MCU_SEL_MASK: u32 = 0x7 << MCU_SEL_SHIFT;
    pub const FUN_DRV_SHIFT: u32 = 10;
    pub const FUN_DRV_MASK: u32 = 0x3 << FUN_DRV_SHIFT;
    pub const FUN_IE: u32 = 1 << 9;
    pub const FUN_WPU: u32 = 1 << 8;
    pub const FUN_WPD: u32 = 1 << 7;
    pub const MCU_IE: u32 = 1 << 4;
    pub const MCU_WPU: u32 = 1 << 3;
    pub const MCU_WPD: u32 = 1 << 2;
    pub const SLP_SEL: u32 = 1 << 1;
    pub const MCU_OE: u32 = 1 << 0;

    /// IO-MUX function number that routes a pad to the GPIO matrix
    pub const FUNCTION_GPIO: u32 = 2;
    /// Highest IO-MUX function number
    pub const FUNCTION_MAX: u8 = 5;
}

/// Check the compiled-in register map
pub fn validate() -> Result<(), MapError> {
    check_fixed(GPIO_REGISTERS, GPIO_ARRAYS)?;
    check_fixed(&[PRO_GPIO_INTERRUPT_MAP], &[])?;
    check_iomux(&IO_MUX_OFFSETS)?;
    debug!(
        "register map ok: {} GPIO registers, {} pads",
        GPIO_REGISTERS.len(),
        IO_MUX_OFFSETS.iter().flatten().count()
    );
    Ok(())
}

fn check_offset(block: Block, offset: u32) -> Result<(), MapError> {
    if offset % 4 != 0 {
        return Err(MapError::Misaligned(offset));
    }
    if offset >= block.size() {
        return Err(MapError::OutOfBlock(offset));
    }
    Ok(())
}

/// Fixed registers of one block plus the per-pin arrays in that block
fn check_fixed(regs: &[RegisterDesc], arrays: &[RegisterArray]) -> Result<(), MapError> {
    for (i, reg) in regs.iter().enumerate() {
        check_offset(reg.block, reg.offset)?;
        if regs[..i]
            .iter()
            .any(|other| other.block == reg.block && other.offset == reg.offset)
        {
            return Err(MapError::Duplicate(reg.offset));
        }
        if let Some(array) = arrays
            .iter()
            .find(|a| a.block == reg.block && (a.offset..a.end()).contains(&reg.offset))
        {
            debug!("{} overlaps {}", reg.name, array.name);
            return Err(MapError::Overlap(reg.offset));
        }
    }

    for (i, array) in arrays.iter().enumerate() {
        check_offset(array.block, array.offset)?;
        if array.stride % 4 != 0 {
            return Err(MapError::Misaligned(array.stride));
        }
        if array.end() > array.block.size() {
            return Err(MapError::OutOfBlock(array.end()));
        }
        if arrays[..i].iter().any(|other| {
            other.block == array.block && array.offset < other.end() && other.offset < array.end()
        }) {
            return Err(MapError::Overlap(array.offset));
        }
    }

    Ok(())
}

fn check_iomux(table: &[Option<u16>]) -> Result<(), MapError> {
    for (i, offset) in table.iter().enumerate() {
        let Some(offset) = *offset else { continue };
        let offset = offset as u32;
        check_offset(Block::IoMux, offset)?;
        if table[..i].iter().flatten().any(|&other| other as u32 == offset) {
            return Err(MapError::Duplicate(offset));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_map_is_valid() {
        assert_eq!(validate(), Ok(()));
    }

    #[test]
    fn test_known_addresses() {
        assert_eq!(OUT_W1TS.reg().addr, 0x3FF4_4008);
        assert_eq!(ENABLE1_W1TC.reg().addr, 0x3FF4_4034);
        assert_eq!(PIN.reg(4).addr, 0x3FF4_4098);
        assert_eq!(FUNC_OUT_SEL_CFG.reg(27).addr, 0x3FF4_459C);
        assert_eq!(PRO_GPIO_INTERRUPT_MAP.reg().addr, 0x3FF0_015C);
    }

    #[test]
    fn test_iomux_table_spot_checks() {
        assert_eq!(IO_MUX_OFFSETS[0], Some(0x44));
        assert_eq!(IO_MUX_OFFSETS[21], Some(0x7C));
        assert_eq!(IO_MUX_OFFSETS[27], Some(0x2C));
        assert_eq!(IO_MUX_OFFSETS[24], None);
        assert!(IO_MUX_OFFSETS[28..32].iter().all(Option::is_none));
    }

    #[test]
    fn test_misaligned_offset_rejected() {
        let regs = [RegisterDesc::gpio("BAD", 0x06, Access::Direct)];
        assert_eq!(check_fixed(&regs, &[]), Err(MapError::Misaligned(0x06)));
    }

    #[test]
    fn test_out_of_block_rejected() {
        let regs = [RegisterDesc::gpio("FAR", 0x1000, Access::Direct)];
        assert_eq!(check_fixed(&regs, &[]), Err(MapError::OutOfBlock(0x1000)));
        assert_eq!(
            check_iomux(&[Some(0x44), Some(0x2000)]),
            Err(MapError::OutOfBlock(0x2000))
        );
    }

    #[test]
    fn test_duplicate_rejected() {
        let regs = [OUT, RegisterDesc::gpio("OUT_AGAIN", 0x04, Access::Direct)];
        assert_eq!(check_fixed(&regs, &[]), Err(MapError::Duplicate(0x04)));
        assert_eq!(
            check_iomux(&[Some(0x44), None, Some(0x44)]),
            Err(MapError::Duplicate(0x44))
        );
    }

    #[test]
    fn test_overlap_with_pin_array_rejected() {
        // PIN array covers 0x88..0x128
        let regs = [RegisterDesc::gpio("INSIDE", 0x100, Access::Direct)];
        assert_eq!(check_fixed(&regs, &[PIN]), Err(MapError::Overlap(0x100)));

        let clash = RegisterArray {
            offset: 0x120,
            ..FUNC_OUT_SEL_CFG
        };
        assert_eq!(check_fixed(&[], &[PIN, clash]), Err(MapError::Overlap(0x120)));
    }
}
