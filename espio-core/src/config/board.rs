//! Board pin description
//!
//! A board is described by one named pin per line:
//!
//! ```text
//! # outputs
//! led      = !gpio2  out
//! buzzer   = gpio27  out
//! # inputs
//! button   = ^gpio4
//! i2c_scl  = ^gpio22 in
//! ```
//!
//! The direction token is optional and defaults to `in`. Blank lines and
//! lines starting with `#` are ignored.

use espio_hal::PinMode;
use heapless::{String, Vec};

use super::pin::{parse_pin_string, PinConfig};

/// Maximum named pins per board
pub const MAX_BOARD_PINS: usize = 40;

/// Maximum pin name length
pub const MAX_NAME_LEN: usize = 16;

/// Errors from parsing a board description
///
/// Line numbers are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Line is not `name = pin [in|out]`
    Syntax { line: usize },
    /// Pin string could not be parsed
    InvalidPin { line: usize },
    /// Name longer than [`MAX_NAME_LEN`]
    NameTooLong { line: usize },
    /// Name already used on an earlier line
    DuplicateName { line: usize },
    /// GPIO number already assigned on an earlier line
    DuplicatePin { line: usize },
    /// More than [`MAX_BOARD_PINS`] entries
    TooManyPins,
}

/// One named pin
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PinEntry {
    /// Name used by application code (e.g., "led", "button")
    pub name: String<MAX_NAME_LEN>,
    /// Parsed configuration
    pub config: PinConfig,
}

/// Named pin assignments for a board
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoardConfig {
    entries: Vec<PinEntry, MAX_BOARD_PINS>,
}

impl BoardConfig {
    /// Parse a board description
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut board = Self::default();
        // Bitmask of GPIO numbers already assigned
        let mut used: u64 = 0;

        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let content = raw.trim();
            if content.is_empty() || content.starts_with('#') {
                continue;
            }

            let (name, rhs) = content
                .split_once('=')
                .ok_or(ConfigError::Syntax { line })?;
            let name = name.trim();
            if name.is_empty() || name.contains(char::is_whitespace) {
                return Err(ConfigError::Syntax { line });
            }

            let mut tokens = rhs.split_whitespace();
            let pin_str = tokens.next().ok_or(ConfigError::Syntax { line })?;
            let mode = match tokens.next() {
                None | Some("in") => PinMode::Input,
                Some("out") => PinMode::Output,
                Some(_) => return Err(ConfigError::Syntax { line }),
            };
            if tokens.next().is_some() {
                return Err(ConfigError::Syntax { line });
            }

            let config = parse_pin_string(pin_str)
                .ok_or(ConfigError::InvalidPin { line })?
                .with_mode(mode);

            if board.find(name).is_some() {
                return Err(ConfigError::DuplicateName { line });
            }
            let bit = 1u64 << config.pin;
            if used & bit != 0 {
                return Err(ConfigError::DuplicatePin { line });
            }
            used |= bit;

            let name = String::try_from(name).map_err(|_| ConfigError::NameTooLong { line })?;
            board
                .entries
                .push(PinEntry { name, config })
                .map_err(|_| ConfigError::TooManyPins)?;
        }

        Ok(board)
    }

    /// Look a pin up by name
    pub fn find(&self, name: &str) -> Option<&PinConfig> {
        self.entries
            .iter()
            .find(|entry| entry.name.as_str() == name)
            .map(|entry| &entry.config)
    }

    /// All entries in declaration order
    pub fn entries(&self) -> &[PinEntry] {
        &self.entries
    }

    /// Number of named pins
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no pins are named
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use espio_hal::PullConfig;

    const DEVKIT: &str = "
        # outputs
        led    = !gpio2 out
        buzzer = gpio27 out

        # inputs
        button = ^gpio4
        sensor = ~gpio34 in
    ";

    #[test]
    fn test_parse_devkit() {
        let board = BoardConfig::parse(DEVKIT).unwrap();
        assert_eq!(board.len(), 4);

        let led = board.find("led").unwrap();
        assert_eq!(led.pin, 2);
        assert_eq!(led.mode, PinMode::Output);
        assert!(led.inverted);

        let button = board.find("button").unwrap();
        assert_eq!(button.mode, PinMode::Input);
        assert_eq!(button.pull, PullConfig::PullUp);

        assert_eq!(board.find("sensor").unwrap().pull, PullConfig::PullDown);
        assert!(board.find("missing").is_none());

        // Declaration order is preserved
        assert_eq!(board.entries()[1].name.as_str(), "buzzer");
    }

    #[test]
    fn test_empty_board() {
        let board = BoardConfig::parse("# nothing here\n\n").unwrap();
        assert!(board.is_empty());
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(
            BoardConfig::parse("led gpio2"),
            Err(ConfigError::Syntax { line: 1 })
        );
        assert_eq!(
            BoardConfig::parse("led = gpio2 sideways"),
            Err(ConfigError::Syntax { line: 1 })
        );
        assert_eq!(
            BoardConfig::parse("led =\n"),
            Err(ConfigError::Syntax { line: 1 })
        );
        assert_eq!(
            BoardConfig::parse("\nmy led = gpio2"),
            Err(ConfigError::Syntax { line: 2 })
        );
        assert_eq!(
            BoardConfig::parse("led = gpio2 out extra"),
            Err(ConfigError::Syntax { line: 1 })
        );
    }

    #[test]
    fn test_invalid_pin() {
        assert_eq!(
            BoardConfig::parse("led = gpio44"),
            Err(ConfigError::InvalidPin { line: 1 })
        );
    }

    #[test]
    fn test_duplicates_rejected() {
        assert_eq!(
            BoardConfig::parse("a = gpio2\na = gpio4"),
            Err(ConfigError::DuplicateName { line: 2 })
        );
        assert_eq!(
            BoardConfig::parse("a = gpio2\nb = !gpio2"),
            Err(ConfigError::DuplicatePin { line: 2 })
        );
    }

    #[test]
    fn test_name_too_long() {
        assert_eq!(
            BoardConfig::parse("a_very_long_pin_name = gpio2"),
            Err(ConfigError::NameTooLong { line: 1 })
        );
    }
}
