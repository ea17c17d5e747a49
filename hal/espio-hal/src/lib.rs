//! espio Hardware Abstraction Layer
//!
//! This crate defines the portable GPIO traits and pin value types shared
//! by chip-specific HALs. Application code written against these traits
//! does not need to know which register map sits underneath.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (blink, button, uart, ...) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  espio-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  espio-hal-esp32 (GPIO / IO-MUX regs)   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O
//! - [`interrupt::EdgeHandler`] - Callback invoked on a pin edge

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod interrupt;

// Re-export key items at crate root for convenience
pub use gpio::{InputPin, IoPin, OutputPin, PinMode, PinState, PullConfig};
pub use interrupt::{EdgeHandler, EdgeType};
