//! Pin registry
//!
//! Maps a GPIO number to the bank bit and IO-MUX pad register that control
//! it, and records what each pad can do. All pin validation in the driver
//! goes through here.

use crate::error::GpioError;
use crate::map::{self, Block, RegisterDesc, IO_MUX_OFFSETS};
use crate::regs::{Access, Register};

pub use crate::map::PIN_COUNT;

/// First GPIO number that is input-only (34-39)
pub const FIRST_INPUT_ONLY: u8 = 34;

/// GPIO register bank
///
/// The ESP32 splits its 40 GPIOs over two 32-bit register sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bank {
    /// GPIO 0-31
    Bank0,
    /// GPIO 32-39
    Bank1,
}

impl Bank {
    const fn pick(self, bank0: RegisterDesc, bank1: RegisterDesc) -> Register {
        match self {
            Bank::Bank0 => bank0.reg(),
            Bank::Bank1 => bank1.reg(),
        }
    }

    pub const fn first_pin(self) -> u8 {
        match self {
            Bank::Bank0 => 0,
            Bank::Bank1 => 32,
        }
    }

    pub const fn out(self) -> Register {
        self.pick(map::OUT, map::OUT1)
    }

    pub const fn out_set(self) -> Register {
        self.pick(map::OUT_W1TS, map::OUT1_W1TS)
    }

    pub const fn out_clear(self) -> Register {
        self.pick(map::OUT_W1TC, map::OUT1_W1TC)
    }

    pub const fn enable(self) -> Register {
        self.pick(map::ENABLE, map::ENABLE1)
    }

    pub const fn enable_set(self) -> Register {
        self.pick(map::ENABLE_W1TS, map::ENABLE1_W1TS)
    }

    pub const fn enable_clear(self) -> Register {
        self.pick(map::ENABLE_W1TC, map::ENABLE1_W1TC)
    }

    pub const fn input(self) -> Register {
        self.pick(map::IN, map::IN1)
    }

    pub const fn status(self) -> Register {
        self.pick(map::STATUS, map::STATUS1)
    }

    pub const fn status_clear(self) -> Register {
        self.pick(map::STATUS_W1TC, map::STATUS1_W1TC)
    }
}

/// Position of a pin in its bank's registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GpioBit {
    pub bank: Bank,
    pub bit: u8,
}

impl GpioBit {
    pub const fn mask(self) -> u32 {
        1 << self.bit
    }
}

/// What a pad is capable of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinInfo {
    /// Pad has no output driver
    pub input_only: bool,
    /// Pad has internal pull resistors
    pub has_pulls: bool,
}

fn check(pin: u8) -> Result<usize, GpioError> {
    let index = pin as usize;
    match IO_MUX_OFFSETS.get(index) {
        Some(Some(_)) => Ok(index),
        _ => Err(GpioError::InvalidPin),
    }
}

/// Check that a GPIO number names a real pad
pub fn is_valid(pin: u8) -> bool {
    check(pin).is_ok()
}

/// Bank and bit for a pin
pub fn gpio_bit(pin: u8) -> Result<GpioBit, GpioError> {
    check(pin)?;
    let bank = if pin < 32 { Bank::Bank0 } else { Bank::Bank1 };
    Ok(GpioBit { bank, bit: pin % 32 })
}

/// IO-MUX pad register for a pin
pub fn iomux_register(pin: u8) -> Result<Register, GpioError> {
    let index = check(pin)?;
    let offset = IO_MUX_OFFSETS[index].ok_or(GpioError::InvalidPin)?;
    Ok(Register::at(Block::IoMux.base(), offset as u32, Access::Direct))
}

/// `GPIO_PINn_REG` for a pin
pub fn pin_register(pin: u8) -> Result<Register, GpioError> {
    check(pin)?;
    Ok(map::PIN.reg(pin))
}

/// `GPIO_FUNCn_OUT_SEL_CFG_REG` for a pin
pub fn out_sel_register(pin: u8) -> Result<Register, GpioError> {
    check(pin)?;
    Ok(map::FUNC_OUT_SEL_CFG.reg(pin))
}

/// Capabilities of a pin
pub fn pin_info(pin: u8) -> Result<PinInfo, GpioError> {
    check(pin)?;
    let input_only = pin >= FIRST_INPUT_ONLY;
    Ok(PinInfo {
        input_only,
        has_pulls: !input_only,
    })
}

/// Pin names from the ESP32 DevKit header
pub mod board {
    pub const D0: u8 = 0;
    pub const D2: u8 = 2;
    pub const D4: u8 = 4;
    pub const D5: u8 = 5;
    pub const D12: u8 = 12;
    pub const D13: u8 = 13;
    pub const D14: u8 = 14;
    pub const D15: u8 = 15;
    pub const D16: u8 = 16;
    pub const D17: u8 = 17;
    pub const D18: u8 = 18;
    pub const D19: u8 = 19;
    pub const D21: u8 = 21;
    pub const D22: u8 = 22;
    pub const D23: u8 = 23;
    pub const D25: u8 = 25;
    pub const D26: u8 = 26;
    pub const D27: u8 = 27;
    pub const D32: u8 = 32;
    pub const D33: u8 = 33;
    pub const D34: u8 = 34;
    pub const D35: u8 = 35;
    pub const VP: u8 = 36;
    pub const VN: u8 = 39;

    pub const BUILTIN_LED: u8 = 2;

    // UART0 goes to the USB bridge
    pub const TX_0: u8 = 1;
    pub const RX_0: u8 = 3;
    pub const TX_2: u8 = 17;
    pub const RX_2: u8 = 16;

    pub const SDA: u8 = 21;
    pub const SCL: u8 = 22;

    pub const VSPI_MOSI: u8 = 23;
    pub const VSPI_MISO: u8 = 19;
    pub const VSPI_SCK: u8 = 18;
    pub const VSPI_SS: u8 = 5;
    pub const HSPI_MOSI: u8 = 13;
    pub const HSPI_MISO: u8 = 12;
    pub const HSPI_SCK: u8 = 14;
    pub const HSPI_SS: u8 = 15;

    // Default SPI is VSPI
    pub const MOSI: u8 = VSPI_MOSI;
    pub const MISO: u8 = VSPI_MISO;
    pub const SCK: u8 = VSPI_SCK;
    pub const CS: u8 = VSPI_SS;

    pub const ADC1_0: u8 = 36;
    pub const ADC1_3: u8 = 39;
    pub const ADC1_4: u8 = 32;
    pub const ADC1_5: u8 = 33;
    pub const ADC1_6: u8 = 34;
    pub const ADC1_7: u8 = 35;

    // ADC2 is unavailable while the radio is running
    pub const ADC2_0: u8 = 4;
    pub const ADC2_1: u8 = 0;
    pub const ADC2_2: u8 = 2;
    pub const ADC2_3: u8 = 15;
    pub const ADC2_4: u8 = 13;
    pub const ADC2_5: u8 = 12;
    pub const ADC2_6: u8 = 14;
    pub const ADC2_7: u8 = 27;
    pub const ADC2_8: u8 = 25;
    pub const ADC2_9: u8 = 26;

    pub const DAC1: u8 = 25;
    pub const DAC2: u8 = 26;

    pub const TOUCH0: u8 = 4;
    pub const TOUCH1: u8 = 0;
    pub const TOUCH2: u8 = 2;
    pub const TOUCH3: u8 = 15;
    pub const TOUCH4: u8 = 13;
    pub const TOUCH5: u8 = 12;
    pub const TOUCH6: u8 = 14;
    pub const TOUCH7: u8 = 27;
    pub const TOUCH8: u8 = 33;
    pub const TOUCH9: u8 = 32;

    // Pins that stay usable from the RTC domain in deep sleep
    pub const RTC_GPIO00: u8 = 36;
    pub const RTC_GPIO03: u8 = 39;
    pub const RTC_GPIO04: u8 = 34;
    pub const RTC_GPIO05: u8 = 35;
    pub const RTC_GPIO06: u8 = 25;
    pub const RTC_GPIO07: u8 = 26;
    pub const RTC_GPIO08: u8 = 33;
    pub const RTC_GPIO09: u8 = 32;
    pub const RTC_GPIO10: u8 = 4;
    pub const RTC_GPIO11: u8 = 0;
    pub const RTC_GPIO12: u8 = 2;
    pub const RTC_GPIO13: u8 = 15;
    pub const RTC_GPIO14: u8 = 13;
    pub const RTC_GPIO15: u8 = 12;
    pub const RTC_GPIO16: u8 = 14;
    pub const RTC_GPIO17: u8 = 27;

    pub const ADC1: [u8; 6] = [ADC1_0, ADC1_3, ADC1_4, ADC1_5, ADC1_6, ADC1_7];
    pub const ADC2: [u8; 10] = [
        ADC2_0, ADC2_1, ADC2_2, ADC2_3, ADC2_4, ADC2_5, ADC2_6, ADC2_7, ADC2_8, ADC2_9,
    ];
    pub const DAC: [u8; 2] = [DAC1, DAC2];
    pub const TOUCH: [u8; 10] = [
        TOUCH0, TOUCH1, TOUCH2, TOUCH3, TOUCH4, TOUCH5, TOUCH6, TOUCH7, TOUCH8, TOUCH9,
    ];
    pub const RTC_GPIO: [u8; 16] = [
        RTC_GPIO00, RTC_GPIO03, RTC_GPIO04, RTC_GPIO05, RTC_GPIO06, RTC_GPIO07, RTC_GPIO08,
        RTC_GPIO09, RTC_GPIO10, RTC_GPIO11, RTC_GPIO12, RTC_GPIO13, RTC_GPIO14, RTC_GPIO15,
        RTC_GPIO16, RTC_GPIO17,
    ];

    /// Sampled at reset; external circuitry on these can change the boot mode
    pub const STRAPPING: [u8; 5] = [0, 2, 5, 12, 15];
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_bank_split() {
        assert_eq!(gpio_bit(0), Ok(GpioBit { bank: Bank::Bank0, bit: 0 }));
        assert_eq!(gpio_bit(27), Ok(GpioBit { bank: Bank::Bank0, bit: 27 }));
        assert_eq!(gpio_bit(32), Ok(GpioBit { bank: Bank::Bank1, bit: 0 }));
        assert_eq!(gpio_bit(39), Ok(GpioBit { bank: Bank::Bank1, bit: 7 }));
        assert_eq!(Bank::Bank1.out_set().addr, 0x3FF4_4014);
    }

    #[test]
    fn test_missing_pads_rejected() {
        for pin in [24, 28, 29, 30, 31, 40, 255] {
            assert_eq!(gpio_bit(pin), Err(GpioError::InvalidPin));
            assert_eq!(iomux_register(pin), Err(GpioError::InvalidPin));
            assert!(!is_valid(pin));
        }
    }

    #[test]
    fn test_iomux_lookup() {
        assert_eq!(iomux_register(21).unwrap().addr, 0x3FF4_907C);
        assert_eq!(iomux_register(27).unwrap().addr, 0x3FF4_902C);
        assert_eq!(iomux_register(0).unwrap().addr, 0x3FF4_9044);
    }

    #[test]
    fn test_input_only_pins() {
        let info = pin_info(board::D34).unwrap();
        assert!(info.input_only);
        assert!(!info.has_pulls);

        let info = pin_info(board::BUILTIN_LED).unwrap();
        assert!(!info.input_only);
        assert!(info.has_pulls);
    }

    #[test]
    fn test_board_aliases_are_valid() {
        let aliases = [
            board::TX_0,
            board::RX_0,
            board::TX_2,
            board::RX_2,
            board::SDA,
            board::SCL,
            board::VSPI_MOSI,
            board::HSPI_SS,
            board::VP,
            board::VN,
            board::MOSI,
            board::MISO,
            board::SCK,
            board::CS,
        ];
        assert!(aliases.iter().all(|&pin| is_valid(pin)));

        let groups: [&[u8]; 6] = [
            &board::ADC1,
            &board::ADC2,
            &board::DAC,
            &board::TOUCH,
            &board::RTC_GPIO,
            &board::STRAPPING,
        ];
        for group in groups {
            assert!(group.iter().all(|&pin| is_valid(pin)));
        }
    }

    #[test]
    fn test_analog_aliases() {
        // ADC1 sits on the input-only pads and GPIO32/33
        assert!(board::ADC1
            .iter()
            .all(|&pin| pin >= board::D32 && pin_info(pin).is_ok()));
        assert!(pin_info(board::ADC1_0).unwrap().input_only);

        // Touch and ADC2 pads all have an output driver
        assert!(board::TOUCH
            .iter()
            .chain(board::ADC2.iter())
            .all(|&pin| !pin_info(pin).unwrap().input_only));

        // DACs share their pads with ADC2 and RTC GPIO
        assert_eq!(board::DAC, [board::ADC2_8, board::ADC2_9]);
        assert_eq!(board::DAC1, board::RTC_GPIO06);
        assert_eq!(
            (board::MOSI, board::MISO, board::SCK, board::CS),
            (board::VSPI_MOSI, board::VSPI_MISO, board::VSPI_SCK, board::VSPI_SS)
        );
    }

    proptest! {
        #[test]
        fn prop_valid_pins_have_distinct_bits(a in 0u8..40, b in 0u8..40) {
            prop_assume!(a != b && is_valid(a) && is_valid(b));
            prop_assert_ne!(gpio_bit(a).unwrap(), gpio_bit(b).unwrap());
            prop_assert_ne!(iomux_register(a).unwrap(), iomux_register(b).unwrap());
        }
    }
}
