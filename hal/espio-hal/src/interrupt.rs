//! Pin interrupt abstractions
//!
//! An [`EdgeHandler`] is the capability a HAL invokes when a bound pin sees
//! its configured edge. Handlers run in interrupt context, preempting
//! whatever the main flow was doing, so they must return quickly and must
//! not block or busy-wait.

/// Which transition of the input level raises the interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EdgeType {
    /// Low to high
    Rising,
    /// High to low
    Falling,
    /// Either transition
    Any,
}

impl EdgeType {
    /// Check if a transition from `was_high` to `is_high` matches this edge
    pub fn matches(self, was_high: bool, is_high: bool) -> bool {
        match self {
            EdgeType::Rising => !was_high && is_high,
            EdgeType::Falling => was_high && !is_high,
            EdgeType::Any => was_high != is_high,
        }
    }
}

/// Callback invoked from interrupt context when a bound pin fires
///
/// Handlers are stored as `&'static dyn EdgeHandler`, so any state they
/// touch must be reachable through `&self` and safe to share with the main
/// flow (atomics or a critical-section mutex).
pub trait EdgeHandler: Sync {
    /// Called once per detected edge with the pin that fired
    fn on_edge(&self, pin: u8);
}

impl<F> EdgeHandler for F
where
    F: Fn(u8) + Sync,
{
    fn on_edge(&self, pin: u8) {
        self(pin)
    }
}
