//! IO-MUX pad configuration
//!
//! Each pad has one IO-MUX register selecting its function, drive strength,
//! input buffer and pull resistors. Every update here is a single masked
//! store inside a critical section, so an interrupt handler reconfiguring
//! the same pad cannot observe or produce a half-written register.

use espio_hal::PullConfig;

use crate::error::GpioError;
use crate::map::fields::*;
use crate::pins::{iomux_register, pin_info};
use crate::regs::{RegisterAccess, RegisterBus};

/// Pad output drive strength
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriveStrength {
    /// ~5 mA
    I5mA = 0,
    /// ~10 mA
    I10mA = 1,
    /// ~20 mA (reset default)
    #[default]
    I20mA = 2,
    /// ~40 mA
    I40mA = 3,
}

impl DriveStrength {
    fn from_bits(bits: u32) -> Self {
        match bits & 0x3 {
            0 => DriveStrength::I5mA,
            1 => DriveStrength::I10mA,
            2 => DriveStrength::I20mA,
            _ => DriveStrength::I40mA,
        }
    }
}

/// Decoded view of a pad's IO-MUX register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IoMuxConfig {
    pub function: u8,
    pub drive: DriveStrength,
    pub input_enable: bool,
    pub pull: PullConfig,
}

/// IO-MUX pad controller
pub struct IoMuxController<'a, B: RegisterBus> {
    bus: &'a B,
}

impl<'a, B: RegisterBus> IoMuxController<'a, B> {
    pub fn new(bus: &'a B) -> Self {
        Self { bus }
    }

    /// Enable the pull-up and disable the pull-down
    ///
    /// On pins without pull resistors (34-39) this succeeds with no
    /// electrical effect.
    pub fn enable_pullup(&self, pin: u8) -> Result<(), GpioError> {
        self.update_pull(pin, FUN_WPU, FUN_WPD)
    }

    /// Enable the pull-down and disable the pull-up
    pub fn enable_pulldown(&self, pin: u8) -> Result<(), GpioError> {
        self.update_pull(pin, FUN_WPD, FUN_WPU)
    }

    /// Disconnect both pull resistors
    pub fn disable_pulls(&self, pin: u8) -> Result<(), GpioError> {
        self.update_pull(pin, 0, FUN_WPU | FUN_WPD)
    }

    pub fn set_pull(&self, pin: u8, pull: PullConfig) -> Result<(), GpioError> {
        match pull {
            PullConfig::None => self.disable_pulls(pin),
            PullConfig::PullUp => self.enable_pullup(pin),
            PullConfig::PullDown => self.enable_pulldown(pin),
        }
    }

    fn update_pull(&self, pin: u8, set: u32, clear: u32) -> Result<(), GpioError> {
        let reg = iomux_register(pin)?;
        if set != 0 && !pin_info(pin)?.has_pulls {
            warn!("GPIO{} has no pull resistors, request ignored by hardware", pin);
        }
        self.bus.modify(reg, set, clear);
        Ok(())
    }

    /// Select the pad's IO-MUX function (0-5)
    ///
    /// Function 2 routes the pad through the GPIO matrix; the others
    /// connect it directly to a peripheral.
    pub fn set_function(&self, pin: u8, function: u8) -> Result<(), GpioError> {
        let reg = iomux_register(pin)?;
        if function > FUNCTION_MAX {
            return Err(GpioError::InvalidMode);
        }
        self.bus
            .modify(reg, (function as u32) << MCU_SEL_SHIFT, MCU_SEL_MASK);
        Ok(())
    }

    pub fn set_drive_strength(&self, pin: u8, drive: DriveStrength) -> Result<(), GpioError> {
        let reg = iomux_register(pin)?;
        self.bus
            .modify(reg, (drive as u32) << FUN_DRV_SHIFT, FUN_DRV_MASK);
        Ok(())
    }

    pub fn set_input_enable(&self, pin: u8, enable: bool) -> Result<(), GpioError> {
        let reg = iomux_register(pin)?;
        if enable {
            self.bus.modify(reg, FUN_IE, 0);
        } else {
            self.bus.modify(reg, 0, FUN_IE);
        }
        Ok(())
    }

    /// Read back the pad configuration
    pub fn config(&self, pin: u8) -> Result<IoMuxConfig, GpioError> {
        let value = self.bus.read_reg(iomux_register(pin)?);
        let pull = match (value & FUN_WPU != 0, value & FUN_WPD != 0) {
            (true, false) => PullConfig::PullUp,
            (false, true) => PullConfig::PullDown,
            _ => PullConfig::None,
        };
        Ok(IoMuxConfig {
            function: ((value & MCU_SEL_MASK) >> MCU_SEL_SHIFT) as u8,
            drive: DriveStrength::from_bits(value >> FUN_DRV_SHIFT),
            input_enable: value & FUN_IE != 0,
            pull,
        })
    }
}
