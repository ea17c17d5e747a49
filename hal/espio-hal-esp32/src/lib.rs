//! ESP32 GPIO / IO-MUX driver
//!
//! Register-level implementation of the `espio-hal` traits for the ESP32:
//!
//! - Register map and disciplined register access
//! - Pin registry (bank bits, IO-MUX pads, pin capabilities)
//! - Pin mode and level control, plus a [`gpio::Flex`] pin handle
//! - IO-MUX pull resistors, function select and drive strength
//! - Edge interrupt binding and dispatch
//! - UART pin routing
//!
//! Everything goes through a [`regs::RegisterBus`], so the whole driver
//! runs against a simulated bus in host tests.

#![no_std]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod error;
pub mod gpio;
pub mod interrupt;
pub mod iomux;
pub mod map;
pub mod pins;
pub mod regs;
pub mod uart;

#[cfg(test)]
mod sim;

pub use error::{ConfigFailure, GpioError, MapError};
pub use gpio::{Flex, GpioController};
pub use interrupt::{
    CoreMask, EdgeCounter, HandlerTable, InterruptBinding, InterruptMask, InterruptMatrix,
    IsrService,
};
pub use iomux::IoMuxController;
pub use regs::{Mmio, RegisterBus};

// Re-export shared traits from espio-hal for convenience
pub use espio_hal::{EdgeHandler, EdgeType, InputPin, OutputPin, PinMode, PinState, PullConfig};

/// Entry point: a register bus whose register map passed validation
pub struct Io<B: RegisterBus> {
    bus: B,
}

impl<B: RegisterBus> Io<B> {
    /// Validate the register map and take the bus
    pub fn new(bus: B) -> Result<Self, GpioError> {
        map::validate()?;
        info!("ESP32 GPIO ready");
        Ok(Self { bus })
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn gpio(&self) -> GpioController<'_, B> {
        GpioController::new(&self.bus)
    }

    pub fn iomux(&self) -> IoMuxController<'_, B> {
        IoMuxController::new(&self.bus)
    }

    /// Interrupt binding using `table` and `service`
    pub fn interrupts<'a, S: IsrService>(
        &'a self,
        table: &'a HandlerTable,
        service: &'a S,
    ) -> InterruptBinding<'a, B, S> {
        InterruptBinding::new(&self.bus, table, service)
    }
}
