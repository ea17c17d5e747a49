//! Pin configuration and pin-string parsing

use espio_hal::{PinMode, PinState, PullConfig};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Highest GPIO number a pin string may name
///
/// Whether a number in range actually exists on the chip is decided by the
/// chip HAL's pin registry.
pub const MAX_PIN: u8 = 39;

/// Pin configuration with optional inversion and pull resistor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinConfig {
    /// GPIO pin number (0-39 for ESP32)
    pub pin: u8,
    /// Direction
    pub mode: PinMode,
    /// Internal pull resistor
    pub pull: PullConfig,
    /// Pin is active-low (inverted)
    pub inverted: bool,
}

impl PinConfig {
    /// Create a plain input pin config
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            mode: PinMode::Input,
            pull: PullConfig::None,
            inverted: false,
        }
    }

    /// Create an output pin config
    pub const fn output(pin: u8) -> Self {
        Self {
            pin,
            mode: PinMode::Output,
            pull: PullConfig::None,
            inverted: false,
        }
    }

    /// Create an input with pull-up enabled
    pub const fn with_pullup(pin: u8) -> Self {
        Self {
            pin,
            mode: PinMode::Input,
            pull: PullConfig::PullUp,
            inverted: false,
        }
    }

    /// Create an input with pull-down enabled
    pub const fn with_pulldown(pin: u8) -> Self {
        Self {
            pin,
            mode: PinMode::Input,
            pull: PullConfig::PullDown,
            inverted: false,
        }
    }

    /// Same config with a different direction
    pub const fn with_mode(mut self, mode: PinMode) -> Self {
        self.mode = mode;
        self
    }

    /// Electrical level that means "on" for this pin
    pub fn active_level(&self) -> PinState {
        if self.inverted {
            PinState::Low
        } else {
            PinState::High
        }
    }

    /// Electrical level that means "off" for this pin
    ///
    /// Outputs are driven to this level when they are first configured.
    pub fn inactive_level(&self) -> PinState {
        self.active_level().toggled()
    }
}

/// Parse a pin string from config
///
/// Supports formats:
/// - "gpio27" -> pin 27
/// - "!gpio2" -> pin 2, inverted (active-low)
/// - "^gpio21" -> pin 21 with pull-up
/// - "~gpio4" -> pin 4 with pull-down
///
/// Modifiers may be combined ("!^gpio0") but pull-up and pull-down are
/// mutually exclusive. The returned config is an input; callers set the
/// direction separately.
pub fn parse_pin_string(s: &str) -> Option<PinConfig> {
    let mut s = s.trim();
    let mut inverted = false;
    let mut pull = PullConfig::None;

    loop {
        let rest = if let Some(rest) = s.strip_prefix('!') {
            if inverted {
                return None;
            }
            inverted = true;
            rest
        } else if let Some(rest) = s.strip_prefix('^') {
            if pull != PullConfig::None {
                return None;
            }
            pull = PullConfig::PullUp;
            rest
        } else if let Some(rest) = s.strip_prefix('~') {
            if pull != PullConfig::None {
                return None;
            }
            pull = PullConfig::PullDown;
            rest
        } else {
            break;
        };
        s = rest;
    }

    let num_str = s.strip_prefix("gpio")?;
    if num_str.is_empty() || !num_str.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let pin: u8 = num_str.parse().ok()?;

    if pin > MAX_PIN {
        return None;
    }

    Some(PinConfig {
        pin,
        mode: PinMode::Input,
        pull,
        inverted,
    })
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use proptest::prelude::*;
    use std::format;

    #[test]
    fn test_parse_pin_string() {
        assert_eq!(parse_pin_string("gpio27"), Some(PinConfig::new(27)));
        assert_eq!(parse_pin_string("gpio0"), Some(PinConfig::new(0)));
        assert_eq!(parse_pin_string("gpio39"), Some(PinConfig::new(39)));
        assert_eq!(parse_pin_string("  gpio5 "), Some(PinConfig::new(5)));

        let inverted = parse_pin_string("!gpio2").unwrap();
        assert_eq!(inverted.pin, 2);
        assert!(inverted.inverted);

        assert_eq!(parse_pin_string("^gpio21"), Some(PinConfig::with_pullup(21)));
        assert_eq!(parse_pin_string("~gpio4"), Some(PinConfig::with_pulldown(4)));

        let both = parse_pin_string("!^gpio0").unwrap();
        assert!(both.inverted);
        assert_eq!(both.pull, PullConfig::PullUp);
    }

    #[test]
    fn test_parse_rejects_invalid() {
        assert_eq!(parse_pin_string("gpio40"), None);
        assert_eq!(parse_pin_string("pin11"), None);
        assert_eq!(parse_pin_string(""), None);
        assert_eq!(parse_pin_string("gpio"), None);
        assert_eq!(parse_pin_string("gpio+1"), None);
        assert_eq!(parse_pin_string("^~gpio4"), None);
        assert_eq!(parse_pin_string("!!gpio4"), None);
    }

    #[test]
    fn test_levels_follow_inversion() {
        let led = PinConfig::output(2);
        assert_eq!(led.active_level(), PinState::High);
        assert_eq!(led.inactive_level(), PinState::Low);

        let parsed = parse_pin_string("!gpio2").unwrap().with_mode(PinMode::Output);
        assert_eq!(parsed.active_level(), PinState::Low);
        assert_eq!(parsed.inactive_level(), PinState::High);
    }

    proptest! {
        #[test]
        fn prop_parse_never_panics(s in "\\PC*") {
            let _ = parse_pin_string(&s);
        }

        #[test]
        fn prop_valid_numbers_round_trip(pin in 0u8..=MAX_PIN, inverted in any::<bool>()) {
            let text = if inverted {
                format!("!gpio{}", pin)
            } else {
                format!("gpio{}", pin)
            };
            let parsed = parse_pin_string(&text).unwrap();
            prop_assert_eq!(parsed.pin, pin);
            prop_assert_eq!(parsed.inverted, inverted);
        }

        #[test]
        fn prop_out_of_range_rejected(pin in (MAX_PIN as u32 + 1)..1000u32) {
            let text = format!("gpio{}", pin);
            prop_assert!(parse_pin_string(&text).is_none());
        }
    }
}
