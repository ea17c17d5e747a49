//! Board-agnostic logic for the espio GPIO HAL
//!
//! This crate contains the parts of the HAL that do not touch registers:
//!
//! - Interrupt binding state machine (per-pin lifecycle)
//! - Pin configuration types and the pin-string / board-config parser

#![no_std]
#![deny(unsafe_code)]

pub mod binding;
pub mod config;
