//! GPIO pin mode and level control
//!
//! [`GpioController`] programs pins by number, which is what config-driven
//! callers need. [`Flex`] wraps one validated pin and implements both the
//! espio pin traits and the `embedded-hal` 1.0 digital traits.
//!
//! Level changes always go through the W1TS/W1TC aliases, so writing one
//! pin never disturbs another pin's bit even if an interrupt handler writes
//! concurrently. Multi-bit pad updates use masked writes inside a critical
//! section.

use core::convert::Infallible;

use espio_core::config::PinConfig;
use espio_hal::{InputPin, OutputPin, PinMode, PinState};

use crate::error::GpioError;
use crate::iomux::IoMuxController;
use crate::map::fields::*;
use crate::pins::{self, gpio_bit, iomux_register, out_sel_register, pin_info, GpioBit};
use crate::regs::{RegisterAccess, RegisterBus};

/// Pin-number based GPIO driver
pub struct GpioController<'a, B: RegisterBus> {
    bus: &'a B,
}

impl<'a, B: RegisterBus> GpioController<'a, B> {
    pub fn new(bus: &'a B) -> Self {
        Self { bus }
    }

    /// Configure a pin as plain GPIO input or output
    ///
    /// Fails with [`GpioError::InvalidMode`] when asking an input-only pin
    /// (34-39) to drive. Nothing is written unless the request is valid.
    pub fn init(&self, pin: u8, mode: PinMode) -> Result<(), GpioError> {
        let bit = gpio_bit(pin)?;
        let mux = iomux_register(pin)?;
        if mode == PinMode::Output && pin_info(pin)?.input_only {
            return Err(GpioError::InvalidMode);
        }

        let gpio_function = FUNCTION_GPIO << MCU_SEL_SHIFT;
        match mode {
            PinMode::Output => {
                self.bus.modify(mux, gpio_function, MCU_SEL_MASK);
                self.bus
                    .write_reg(out_sel_register(pin)?, FUNC_OUT_SEL_GPIO);
                // Push-pull
                self.bus.modify(pins::pin_register(pin)?, 0, PIN_PAD_DRIVER);
                self.bus.set_bits(bit.bank.enable_set(), bit.mask());
            }
            PinMode::Input => {
                self.bus
                    .modify(mux, gpio_function | FUN_IE, MCU_SEL_MASK);
                self.bus.clear_bits(bit.bank.enable_clear(), bit.mask());
            }
        }

        trace!("GPIO{} -> {}", pin, mode);
        Ok(())
    }

    /// [`Self::init`] with a raw mode code (1 = input, 2 = output)
    pub fn init_raw(&self, pin: u8, mode: u8) -> Result<(), GpioError> {
        let mode = PinMode::from_code(mode).ok_or(GpioError::InvalidMode)?;
        self.init(pin, mode)
    }

    /// Drive a pin's output level
    pub fn write(&self, pin: u8, state: PinState) -> Result<(), GpioError> {
        let bit = gpio_bit(pin)?;
        write_bit(self.bus, bit, state);
        Ok(())
    }

    /// [`Self::write`] with a raw level (0 = low, 1 = high)
    pub fn write_raw(&self, pin: u8, state: u8) -> Result<(), GpioError> {
        let state = PinState::from_code(state).ok_or(GpioError::InvalidMode)?;
        self.write(pin, state)
    }

    /// Invert a pin's driven level
    pub fn toggle(&self, pin: u8) -> Result<(), GpioError> {
        let bit = gpio_bit(pin)?;
        write_bit(self.bus, bit, driven(self.bus, bit).toggled());
        Ok(())
    }

    /// Read a pin's level
    ///
    /// Output pins report the level they are driving; input pins report the
    /// level sensed on the pad.
    pub fn read(&self, pin: u8) -> Result<PinState, GpioError> {
        let bit = gpio_bit(pin)?;
        Ok(level(self.bus, bit))
    }

    /// Current direction, from the output-enable register
    pub fn mode(&self, pin: u8) -> Result<PinMode, GpioError> {
        let bit = gpio_bit(pin)?;
        Ok(mode_of(self.bus, bit))
    }

    /// Apply a parsed pin configuration
    ///
    /// Outputs are set to their inactive level before the driver is enabled
    /// so an inverted pin does not pulse active during setup.
    pub fn apply(&self, config: &PinConfig) -> Result<(), GpioError> {
        let info = pin_info(config.pin)?;
        if config.mode == PinMode::Output {
            if info.input_only {
                return Err(GpioError::InvalidMode);
            }
            self.write(config.pin, config.inactive_level())?;
        }
        self.init(config.pin, config.mode)?;
        IoMuxController::new(self.bus).set_pull(config.pin, config.pull)?;

        debug!(
            "GPIO{} configured: {} pull={} inverted={}",
            config.pin,
            config.mode,
            config.pull,
            config.inverted
        );
        Ok(())
    }

    /// Get a handle for a single pin
    ///
    /// The handle does not change the pin's mode.
    pub fn pin(&self, pin: u8) -> Result<Flex<'a, B>, GpioError> {
        Ok(Flex {
            bus: self.bus,
            pin,
            bit: gpio_bit(pin)?,
        })
    }
}

fn write_bit<B: RegisterBus>(bus: &B, bit: GpioBit, state: PinState) {
    match state {
        PinState::High => bus.set_bits(bit.bank.out_set(), bit.mask()),
        PinState::Low => bus.clear_bits(bit.bank.out_clear(), bit.mask()),
    }
}

fn driven<B: RegisterBus>(bus: &B, bit: GpioBit) -> PinState {
    PinState::from(bus.read_reg(bit.bank.out()) & bit.mask() != 0)
}

fn sensed<B: RegisterBus>(bus: &B, bit: GpioBit) -> PinState {
    PinState::from(bus.read_reg(bit.bank.input()) & bit.mask() != 0)
}

fn mode_of<B: RegisterBus>(bus: &B, bit: GpioBit) -> PinMode {
    if bus.read_reg(bit.bank.enable()) & bit.mask() != 0 {
        PinMode::Output
    } else {
        PinMode::Input
    }
}

fn level<B: RegisterBus>(bus: &B, bit: GpioBit) -> PinState {
    match mode_of(bus, bit) {
        PinMode::Output => driven(bus, bit),
        PinMode::Input => sensed(bus, bit),
    }
}

/// Handle for one validated GPIO pin
pub struct Flex<'a, B: RegisterBus> {
    bus: &'a B,
    pin: u8,
    bit: GpioBit,
}

impl<'a, B: RegisterBus> Flex<'a, B> {
    /// GPIO number
    pub fn pin(&self) -> u8 {
        self.pin
    }

    pub fn set_as_output(&mut self) -> Result<(), GpioError> {
        GpioController::new(self.bus).init(self.pin, PinMode::Output)
    }

    pub fn set_as_input(&mut self) -> Result<(), GpioError> {
        GpioController::new(self.bus).init(self.pin, PinMode::Input)
    }

    pub fn mode(&self) -> PinMode {
        mode_of(self.bus, self.bit)
    }

    /// Level as reported by [`GpioController::read`]
    pub fn level(&self) -> PinState {
        level(self.bus, self.bit)
    }
}

impl<B: RegisterBus> OutputPin for Flex<'_, B> {
    fn set_high(&mut self) {
        write_bit(self.bus, self.bit, PinState::High);
    }

    fn set_low(&mut self) {
        write_bit(self.bus, self.bit, PinState::Low);
    }

    fn toggle(&mut self) {
        let next = driven(self.bus, self.bit).toggled();
        write_bit(self.bus, self.bit, next);
    }

    fn is_set_high(&self) -> bool {
        driven(self.bus, self.bit).is_high()
    }
}

impl<B: RegisterBus> InputPin for Flex<'_, B> {
    fn is_high(&self) -> bool {
        sensed(self.bus, self.bit).is_high()
    }
}

impl<B: RegisterBus> embedded_hal::digital::ErrorType for Flex<'_, B> {
    type Error = Infallible;
}

impl<B: RegisterBus> embedded_hal::digital::OutputPin for Flex<'_, B> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        write_bit(self.bus, self.bit, PinState::Low);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        write_bit(self.bus, self.bit, PinState::High);
        Ok(())
    }
}

impl<B: RegisterBus> embedded_hal::digital::StatefulOutputPin for Flex<'_, B> {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(driven(self.bus, self.bit).is_high())
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!driven(self.bus, self.bit).is_high())
    }
}

impl<B: RegisterBus> embedded_hal::digital::InputPin for Flex<'_, B> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(sensed(self.bus, self.bit).is_high())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!sensed(self.bus, self.bit).is_high())
    }
}
