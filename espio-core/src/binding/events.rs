//! Events that trigger binding transitions

use espio_hal::EdgeType;

/// Events that can trigger binding transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BindingEvent {
    /// Caller asked to bind a handler to an unbound pin
    Configure,
    /// Pin setup, edge programming and service installation succeeded
    Configured(EdgeType),
    /// A configuration step failed; nothing stays attached
    Failed,
    /// Caller asked to swap the handler of a bound pin in place
    Replace(EdgeType),
    /// Caller asked to detach the handler
    Exclude,
}
