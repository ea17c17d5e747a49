//! GPIO pin abstractions
//!
//! Provides traits for digital input and output pins that can be implemented
//! by chip-specific HALs, plus the value types those HALs speak in.

/// Direction of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PinMode {
    /// Output driver disabled, pad level sensed through the input register
    Input,
    /// Output driver enabled, pad driven from the output register
    Output,
}

impl PinMode {
    /// Raw code used by config-driven callers for [`PinMode::Input`]
    pub const INPUT_CODE: u8 = 1;
    /// Raw code used by config-driven callers for [`PinMode::Output`]
    pub const OUTPUT_CODE: u8 = 2;

    /// Decode a raw mode code
    ///
    /// Returns `None` for any code other than [`Self::INPUT_CODE`] or
    /// [`Self::OUTPUT_CODE`].
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            Self::INPUT_CODE => Some(PinMode::Input),
            Self::OUTPUT_CODE => Some(PinMode::Output),
            _ => None,
        }
    }

    /// Get the raw code for this mode
    pub fn code(self) -> u8 {
        match self {
            PinMode::Input => Self::INPUT_CODE,
            PinMode::Output => Self::OUTPUT_CODE,
        }
    }
}

/// Digital level of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PinState {
    /// Logic 0
    Low,
    /// Logic 1
    High,
}

impl PinState {
    /// Decode a raw level (0 = low, 1 = high)
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(PinState::Low),
            1 => Some(PinState::High),
            _ => None,
        }
    }

    /// The opposite level
    pub fn toggled(self) -> Self {
        match self {
            PinState::Low => PinState::High,
            PinState::High => PinState::Low,
        }
    }

    /// Check if this is the high level
    pub fn is_high(self) -> bool {
        self == PinState::High
    }
}

impl From<bool> for PinState {
    fn from(high: bool) -> Self {
        if high {
            PinState::High
        } else {
            PinState::Low
        }
    }
}

/// Internal pull resistor selection
///
/// Pull-up and pull-down are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PullConfig {
    /// Both resistors disconnected
    #[default]
    None,
    /// Bias an undriven input high
    PullUp,
    /// Bias an undriven input low
    PullDown,
}

/// Digital output pin
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific chip.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Toggle the pin state
    fn toggle(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, state: PinState) {
        match state {
            PinState::High => self.set_high(),
            PinState::Low => self.set_low(),
        }
    }

    /// Check if the pin is currently driven high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently driven low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Digital input pin
///
/// Implementations should handle the actual hardware register reading
/// for the specific chip.
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

/// Pin that can be used for both input and output
///
/// Some applications need to read the state of an output pin or
/// dynamically switch between input and output modes.
pub trait IoPin: OutputPin + InputPin {}

// Blanket implementation for types that implement both traits
impl<T: OutputPin + InputPin> IoPin for T {}
