//! Configuration types
//!
//! Pin configuration as written by a board author: Klipper-style pin
//! strings and a small `name = pin` board description.

pub mod board;
pub mod pin;

pub use board::*;
pub use pin::*;
