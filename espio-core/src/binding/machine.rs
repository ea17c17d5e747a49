//! Binding state definition
//!
//! What the interrupt dispatcher does for a pin is a function of that pin's
//! binding state alone.

use espio_hal::EdgeType;

use super::events::BindingEvent;

/// Per-pin interrupt binding states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BindingState {
    /// No handler attached, pin interrupt disabled
    #[default]
    Unbound,
    /// Pin setup and edge programming in progress; no handler is invoked
    Configuring,
    /// Handler attached, pin interrupt enabled for the given edge
    Bound(EdgeType),
}

impl BindingState {
    /// Check if a handler is attached
    pub fn is_bound(&self) -> bool {
        matches!(self, BindingState::Bound(_))
    }

    /// Check if a new binding may start from this state
    pub fn accepts_configure(&self) -> bool {
        matches!(self, BindingState::Unbound)
    }

    /// Edge the pin is bound to, if any
    pub fn edge(&self) -> Option<EdgeType> {
        match self {
            BindingState::Bound(edge) => Some(*edge),
            _ => None,
        }
    }

    /// Process an event and return the next state
    ///
    /// Events that make no sense in the current state leave it unchanged.
    pub fn transition(self, event: BindingEvent) -> Self {
        use BindingEvent::*;
        use BindingState::*;

        match (self, event) {
            (Unbound, Configure) => Configuring,

            (Configuring, Configured(edge)) => Bound(edge),
            (Configuring, Failed) => Unbound,

            (Bound(_), Replace(edge)) => Bound(edge),
            (Bound(_), Exclude) => Unbound,

            // Excluding an unbound pin is a no-op
            (Unbound, Exclude) => Unbound,

            _ => self,
        }
    }
}
