//! Driver errors
//!
//! Register writes themselves cannot fail; every error here is detected
//! before the first write of the failing operation.

use core::fmt;

/// Top-level error returned by the GPIO driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioError {
    /// Pin number is out of range or has no pad on this chip
    InvalidPin,
    /// Mode, level or function not allowed for this pin
    InvalidMode,
    /// Interrupt binding could not be set up or changed
    ConfigurationFailure(ConfigFailure),
    /// Compiled-in register map failed its startup check
    RegisterMap(MapError),
}

/// Reason an interrupt binding operation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigFailure {
    /// Pin could not be prepared as an interrupt input
    PinSetup,
    /// The GPIO interrupt could not be routed to a CPU
    ServiceInstall,
    /// Pin already has a handler; use `replace_interruption`
    AlreadyBound,
    /// Pin has no handler to replace
    NotBound,
}

/// Register map inconsistency, carrying the offending offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MapError {
    /// Offset is not word aligned
    Misaligned(u32),
    /// Offset lies outside its peripheral block
    OutOfBlock(u32),
    /// Two registers share an offset
    Duplicate(u32),
    /// A per-pin register array overlaps another register
    Overlap(u32),
}

impl From<ConfigFailure> for GpioError {
    fn from(failure: ConfigFailure) -> Self {
        GpioError::ConfigurationFailure(failure)
    }
}

impl From<MapError> for GpioError {
    fn from(err: MapError) -> Self {
        GpioError::RegisterMap(err)
    }
}

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpioError::InvalidPin => write!(f, "invalid GPIO pin"),
            GpioError::InvalidMode => write!(f, "invalid pin mode"),
            GpioError::ConfigurationFailure(failure) => {
                write!(f, "interrupt configuration failed: {}", failure)
            }
            GpioError::RegisterMap(err) => write!(f, "register map error: {}", err),
        }
    }
}

impl fmt::Display for ConfigFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigFailure::PinSetup => write!(f, "pin setup failed"),
            ConfigFailure::ServiceInstall => write!(f, "ISR service install failed"),
            ConfigFailure::AlreadyBound => write!(f, "pin already has a handler"),
            ConfigFailure::NotBound => write!(f, "pin has no handler"),
        }
    }
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::Misaligned(offset) => write!(f, "offset {:#x} not word aligned", offset),
            MapError::OutOfBlock(offset) => write!(f, "offset {:#x} outside block", offset),
            MapError::Duplicate(offset) => write!(f, "duplicate offset {:#x}", offset),
            MapError::Overlap(offset) => write!(f, "offset {:#x} overlaps pin array", offset),
        }
    }
}
