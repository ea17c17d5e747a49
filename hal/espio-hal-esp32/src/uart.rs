//! UART pin routing
//!
//! The UART driver itself lives outside this crate; it asks here which
//! port a TX/RX pair belongs to and has the pads routed to that port
//! before installing.

use crate::error::GpioError;
use crate::iomux::IoMuxController;
use crate::pins::board::{RX_0, RX_2, TX_0, TX_2};
use crate::regs::RegisterBus;

/// UART port with a fixed IO-MUX pin assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartPort {
    /// TX = GPIO1, RX = GPIO3 (USB bridge on DevKit boards)
    Uart0,
    /// TX = GPIO17, RX = GPIO16
    Uart2,
}

impl UartPort {
    /// Identify the port for a TX/RX pair
    pub fn from_pins(tx: u8, rx: u8) -> Result<Self, GpioError> {
        match (tx, rx) {
            (TX_0, RX_0) => Ok(UartPort::Uart0),
            (TX_2, RX_2) => Ok(UartPort::Uart2),
            _ => Err(GpioError::InvalidPin),
        }
    }

    /// `(tx, rx)` pins
    pub const fn pins(self) -> (u8, u8) {
        match self {
            UartPort::Uart0 => (TX_0, RX_0),
            UartPort::Uart2 => (TX_2, RX_2),
        }
    }

    /// IO-MUX function that connects this port's pads
    pub const fn iomux_function(self) -> u8 {
        match self {
            UartPort::Uart0 => 0,
            UartPort::Uart2 => 4,
        }
    }

    /// Connect the port's pads to the UART
    ///
    /// RX gets its input buffer and a pull-up so an unconnected line idles
    /// high instead of reading noise as start bits.
    pub fn route_pins<B: RegisterBus>(
        self,
        iomux: &IoMuxController<'_, B>,
    ) -> Result<(), GpioError> {
        let (tx, rx) = self.pins();
        let function = self.iomux_function();

        iomux.set_function(tx, function)?;
        iomux.set_function(rx, function)?;
        iomux.set_input_enable(rx, true)?;
        iomux.enable_pullup(rx)?;

        debug!("{} routed: tx=GPIO{} rx=GPIO{}", self, tx, rx);
        Ok(())
    }
}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits per frame
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
    /// RTS/CTS hardware flow control
    pub flow_control: bool,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: 115_200,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: false,
        }
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    OneAndHalf,
    Two,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::fields::FUN_WPU;
    use crate::pins::iomux_register;
    use crate::sim::SimBus;

    #[test]
    fn test_port_from_pins() {
        assert_eq!(UartPort::from_pins(1, 3), Ok(UartPort::Uart0));
        assert_eq!(UartPort::from_pins(17, 16), Ok(UartPort::Uart2));
        // Swapped or mixed pairs are not a port
        assert_eq!(UartPort::from_pins(3, 1), Err(GpioError::InvalidPin));
        assert_eq!(UartPort::from_pins(1, 16), Err(GpioError::InvalidPin));
        assert_eq!(UartPort::Uart2.pins(), (17, 16));
    }

    #[test]
    fn test_route_uart2() {
        let bus = SimBus::new();
        let iomux = IoMuxController::new(&bus);
        UartPort::Uart2.route_pins(&iomux).unwrap();

        let tx = iomux.config(17).unwrap();
        let rx = iomux.config(16).unwrap();
        assert_eq!(tx.function, 4);
        assert_eq!(rx.function, 4);
        assert!(rx.input_enable);
        assert_ne!(bus.word(iomux_register(16).unwrap().addr) & FUN_WPU, 0);
    }

    #[test]
    fn test_default_config_is_115200_8n1() {
        let config = UartConfig::default();
        assert_eq!(config.baudrate, 115_200);
        assert_eq!(config.data_bits, DataBits::Eight);
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.stop_bits, StopBits::One);
        assert!(!config.flow_control);
    }
}
