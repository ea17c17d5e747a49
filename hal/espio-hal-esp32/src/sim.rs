//! Simulated register bus for host tests
//!
//! Behaves like the GPIO block where it matters: set/clear aliases act on
//! their base register and read back as zero, the input registers follow
//! [`SimBus::set_input`], and input changes latch interrupt status bits
//! according to each pin's programmed interrupt type.

extern crate std;

use core::cell::RefCell;
use std::collections::BTreeMap;
use std::vec::Vec;

use espio_hal::EdgeType;

use crate::map::{self, fields, RegisterDesc};
use crate::pins::{gpio_bit, pin_register};
use crate::regs::RegisterBus;

/// Aliases and the register they act on
const ALIASES: &[(RegisterDesc, RegisterDesc, RegisterDesc)] = &[
    (map::OUT, map::OUT_W1TS, map::OUT_W1TC),
    (map::OUT1, map::OUT1_W1TS, map::OUT1_W1TC),
    (map::ENABLE, map::ENABLE_W1TS, map::ENABLE_W1TC),
    (map::ENABLE1, map::ENABLE1_W1TS, map::ENABLE1_W1TC),
    (map::STATUS, map::STATUS_W1TS, map::STATUS_W1TC),
    (map::STATUS1, map::STATUS1_W1TS, map::STATUS1_W1TC),
];

#[derive(Default)]
pub struct SimBus {
    words: RefCell<BTreeMap<u32, u32>>,
    log: RefCell<Vec<(u32, u32)>>,
}

impl SimBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every driver write so far, in order
    pub fn writes(&self) -> Vec<(u32, u32)> {
        self.log.borrow().clone()
    }

    pub fn clear_log(&self) {
        self.log.borrow_mut().clear();
    }

    /// Raw stored value, bypassing alias handling
    pub fn word(&self, addr: u32) -> u32 {
        self.words.borrow().get(&addr).copied().unwrap_or(0)
    }

    /// Set a register's contents without logging a write
    pub fn preset(&self, addr: u32, value: u32) {
        self.words.borrow_mut().insert(addr, value);
    }

    /// Drive the external level on a pin's pad
    pub fn set_input(&self, pin: u8, high: bool) {
        let bit = gpio_bit(pin).unwrap();
        let input = bit.bank.input().addr;
        let was_high = self.word(input) & bit.mask() != 0;
        let value = if high {
            self.word(input) | bit.mask()
        } else {
            self.word(input) & !bit.mask()
        };
        self.preset(input, value);

        let config = self.word(pin_register(pin).unwrap().addr);
        if config & fields::PIN_INT_ENA_MASK == 0 {
            return;
        }
        let latch = match (config & fields::PIN_INT_TYPE_MASK) >> fields::PIN_INT_TYPE_SHIFT {
            1 => EdgeType::Rising.matches(was_high, high),
            2 => EdgeType::Falling.matches(was_high, high),
            3 => EdgeType::Any.matches(was_high, high),
            // Level types
            4 => !high,
            5 => high,
            _ => false,
        };
        if latch {
            let status = bit.bank.status().addr;
            self.preset(status, self.word(status) | bit.mask());
        }
    }

    fn alias(addr: u32) -> Option<(u32, bool)> {
        ALIASES.iter().find_map(|(base, set, clear)| {
            if addr == set.reg().addr {
                Some((base.reg().addr, true))
            } else if addr == clear.reg().addr {
                Some((base.reg().addr, false))
            } else {
                None
            }
        })
    }
}

impl RegisterBus for SimBus {
    fn read(&self, addr: u32) -> u32 {
        if Self::alias(addr).is_some() {
            return 0;
        }
        self.word(addr)
    }

    fn write(&self, addr: u32, value: u32) {
        self.log.borrow_mut().push((addr, value));

        if addr == map::IN.reg().addr || addr == map::IN1.reg().addr {
            return;
        }
        match Self::alias(addr) {
            Some((base, true)) => self.preset(base, self.word(base) | value),
            Some((base, false)) => self.preset(base, self.word(base) & !value),
            None => self.preset(addr, value),
        }
    }
}
