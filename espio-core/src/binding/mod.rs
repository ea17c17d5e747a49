//! Interrupt binding state machine
//!
//! Every pin's interrupt binding moves through
//! `Unbound -> Configuring -> Bound -> Unbound`. The transitions are
//! explicit, finite, and deterministic; the chip HAL drives them while it
//! programs the hardware.

pub mod events;
pub mod machine;

pub use events::BindingEvent;
pub use machine::BindingState;
