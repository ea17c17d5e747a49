//! Edge-triggered pin interrupts
//!
//! All GPIO pins share one interrupt source. The application routes it to
//! a CPU interrupt line once ([`IsrService`]), binds handlers to pins
//! ([`InterruptBinding`]) and calls [`HandlerTable::dispatch`] from its
//! interrupt vector:
//!
//! ```ignore
//! static HANDLERS: HandlerTable = HandlerTable::new();
//! static PRESSES: EdgeCounter = EdgeCounter::new();
//!
//! let bus = unsafe { Mmio::steal() };
//! // Routes the GPIO source to CPU interrupt 1 and unmasks it on install
//! let service = InterruptMatrix::new(&bus, 1);
//! let binding = InterruptBinding::new(&bus, &HANDLERS, &service);
//! binding.config_interruption(board::D4, EdgeType::Falling, &PRESSES)?;
//!
//! // in the CPU interrupt 1 vector
//! HANDLERS.dispatch(&unsafe { Mmio::steal() });
//! ```
//!
//! Each pin moves through `Unbound -> Configuring -> Bound -> Unbound`.
//! Handlers are only ever invoked in the `Bound` state, and always outside
//! the table's critical section, so a handler may unbind its own pin.

use core::cell::RefCell;

use critical_section::{CriticalSection, Mutex};
use espio_core::binding::{BindingEvent, BindingState};
use espio_hal::{EdgeHandler, EdgeType, PinMode};
use portable_atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use crate::error::{ConfigFailure, GpioError};
use crate::gpio::GpioController;
use crate::iomux::IoMuxController;
use crate::map::fields::*;
use crate::map::PRO_GPIO_INTERRUPT_MAP;
use crate::pins::{gpio_bit, pin_register, Bank, GpioBit, PIN_COUNT};
use crate::regs::{Register, RegisterAccess, RegisterBus};

/// `GPIO_PINn_REG` interrupt type code for an edge
pub const fn int_type_code(edge: EdgeType) -> u32 {
    match edge {
        EdgeType::Rising => 1,
        EdgeType::Falling => 2,
        EdgeType::Any => 3,
    }
}

/// Check if a CPU interrupt line can take the GPIO source
///
/// Only level-triggered, priority 1-3 lines that are not wired to a CPU
/// internal source (timers, profiling, software) qualify.
pub fn is_usable_cpu_interrupt(line: u8) -> bool {
    matches!(line, 0..=5 | 8 | 9 | 12 | 13 | 17..=21 | 23 | 27)
}

/// Routes the shared GPIO interrupt source to a CPU
pub trait IsrService {
    fn is_installed(&self) -> bool;

    /// Install the service; calling again once installed does nothing
    fn install(&self) -> Result<(), ConfigFailure>;
}

/// Enables CPU interrupt lines on the core that runs the dispatcher
pub trait InterruptMask {
    fn unmask(&self, line: u8);
}

/// `INTENABLE` of the running core
///
/// Off target there is no interrupt controller and unmasking does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreMask;

impl InterruptMask for CoreMask {
    #[cfg(target_arch = "xtensa")]
    fn unmask(&self, line: u8) {
        // SAFETY: only the validated GPIO line is added to the mask; every
        // other enable bit is preserved.
        unsafe {
            xtensa_lx::interrupt::enable_mask(xtensa_lx::interrupt::get_mask() | 1 << line);
        }
    }

    #[cfg(not(target_arch = "xtensa"))]
    fn unmask(&self, _line: u8) {}
}

/// [`IsrService`] backed by the ESP32 interrupt matrix (PRO CPU)
///
/// Installing routes the GPIO source to the CPU line and unmasks that line,
/// so the vector calling [`HandlerTable::dispatch`] starts firing.
pub struct InterruptMatrix<'a, B: RegisterBus, M: InterruptMask = CoreMask> {
    bus: &'a B,
    cpu_interrupt: u8,
    mask: M,
    installed: AtomicBool,
}

impl<'a, B: RegisterBus> InterruptMatrix<'a, B> {
    pub fn new(bus: &'a B, cpu_interrupt: u8) -> Self {
        Self::with_mask(bus, cpu_interrupt, CoreMask)
    }
}

impl<'a, B: RegisterBus, M: InterruptMask> InterruptMatrix<'a, B, M> {
    pub fn with_mask(bus: &'a B, cpu_interrupt: u8, mask: M) -> Self {
        Self {
            bus,
            cpu_interrupt,
            mask,
            installed: AtomicBool::new(false),
        }
    }

    pub fn cpu_interrupt(&self) -> u8 {
        self.cpu_interrupt
    }
}

impl<B: RegisterBus, M: InterruptMask> IsrService for InterruptMatrix<'_, B, M> {
    fn is_installed(&self) -> bool {
        self.installed.load(Ordering::Acquire)
    }

    fn install(&self) -> Result<(), ConfigFailure> {
        if self.is_installed() {
            return Ok(());
        }
        if !is_usable_cpu_interrupt(self.cpu_interrupt) {
            error!(
                "CPU interrupt {} cannot take the GPIO source",
                self.cpu_interrupt
            );
            return Err(ConfigFailure::ServiceInstall);
        }

        self.bus
            .write_reg(PRO_GPIO_INTERRUPT_MAP.reg(), self.cpu_interrupt as u32);
        self.mask.unmask(self.cpu_interrupt);
        self.installed.store(true, Ordering::Release);
        info!("GPIO interrupt routed to CPU interrupt {}", self.cpu_interrupt);
        Ok(())
    }
}

#[derive(Clone, Copy)]
struct Slot {
    state: BindingState,
    handler: Option<&'static dyn EdgeHandler>,
}

impl Slot {
    const EMPTY: Slot = Slot {
        state: BindingState::Unbound,
        handler: None,
    };
}

/// Per-pin binding state and handlers
///
/// Meant to live in a `static` shared by the code that binds pins and the
/// interrupt vector.
pub struct HandlerTable {
    slots: Mutex<RefCell<[Slot; PIN_COUNT]>>,
}

impl Default for HandlerTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerTable {
    pub const fn new() -> Self {
        Self {
            slots: Mutex::new(RefCell::new([Slot::EMPTY; PIN_COUNT])),
        }
    }

    pub fn state(&self, pin: u8) -> BindingState {
        critical_section::with(|cs| self.state_in(cs, pin))
    }

    fn state_in(&self, cs: CriticalSection<'_>, pin: u8) -> BindingState {
        self.slots
            .borrow_ref(cs)
            .get(pin as usize)
            .map(|slot| slot.state)
            .unwrap_or_default()
    }

    /// Apply `event` to a pin's state and return the new state
    fn apply(&self, cs: CriticalSection<'_>, pin: u8, event: BindingEvent) -> BindingState {
        let mut slots = self.slots.borrow_ref_mut(cs);
        match slots.get_mut(pin as usize) {
            Some(slot) => {
                slot.state = slot.state.transition(event);
                if !slot.state.is_bound() {
                    slot.handler = None;
                }
                slot.state
            }
            None => BindingState::Unbound,
        }
    }

    fn attach(&self, cs: CriticalSection<'_>, pin: u8, handler: &'static dyn EdgeHandler) {
        if let Some(slot) = self.slots.borrow_ref_mut(cs).get_mut(pin as usize) {
            slot.handler = Some(handler);
        }
    }

    fn bound_handler(&self, pin: u8) -> Option<&'static dyn EdgeHandler> {
        critical_section::with(|cs| {
            self.slots
                .borrow_ref(cs)
                .get(pin as usize)
                .filter(|slot| slot.state.is_bound())
                .and_then(|slot| slot.handler)
        })
    }

    /// Service pending GPIO interrupts
    ///
    /// Call from the CPU interrupt vector the GPIO source is routed to.
    /// Acknowledges every pending pin and invokes each bound pin's handler
    /// once. Returns the number of handlers invoked.
    pub fn dispatch<B: RegisterBus>(&self, bus: &B) -> u32 {
        let mut invoked = 0;

        for bank in [Bank::Bank0, Bank::Bank1] {
            let status = bus.read_reg(bank.status());
            if status == 0 {
                continue;
            }
            bus.clear_bits(bank.status_clear(), status);

            let mut pending = status;
            while pending != 0 {
                let bit = pending.trailing_zeros();
                pending &= pending - 1;
                let pin = bank.first_pin() + bit as u8;

                // Lookup holds the lock; the call itself does not
                match self.bound_handler(pin) {
                    Some(handler) => {
                        handler.on_edge(pin);
                        invoked += 1;
                    }
                    None => trace!("spurious GPIO{} interrupt", pin),
                }
            }
        }

        invoked
    }
}

/// Disable a pin's interrupt and drop anything it latched
///
/// Caller holds a critical section.
fn disarm<B: RegisterBus>(bus: &B, reg: Register, bit: GpioBit) {
    let value = bus.read_reg(reg);
    bus.write_reg(reg, value & !(PIN_INT_TYPE_MASK | PIN_INT_ENA_MASK));
    bus.clear_bits(bit.bank.status_clear(), bit.mask());
}

/// Program a pin's interrupt edge for the PRO CPU
///
/// Caller holds a critical section.
fn arm<B: RegisterBus>(bus: &B, reg: Register, edge: EdgeType) {
    let value = bus.read_reg(reg) & !(PIN_INT_TYPE_MASK | PIN_INT_ENA_MASK);
    let config = (int_type_code(edge) << PIN_INT_TYPE_SHIFT) | PIN_INT_ENA_PRO_CPU;
    bus.write_reg(reg, value | config);
}

/// Binds edge handlers to pins
pub struct InterruptBinding<'a, B: RegisterBus, S: IsrService> {
    bus: &'a B,
    table: &'a HandlerTable,
    service: &'a S,
}

impl<'a, B: RegisterBus, S: IsrService> InterruptBinding<'a, B, S> {
    pub fn new(bus: &'a B, table: &'a HandlerTable, service: &'a S) -> Self {
        Self {
            bus,
            table,
            service,
        }
    }

    /// Bind `handler` to `edge` on `pin`
    ///
    /// The pin becomes a pulled-up input. Fails with `AlreadyBound` if the
    /// pin has a handler; [`Self::replace_interruption`] swaps one. The
    /// edge is armed only after the handler is attached. On any other
    /// failure the pin's interrupt stays disabled and the pin is left
    /// unbound.
    pub fn config_interruption(
        &self,
        pin: u8,
        edge: EdgeType,
        handler: &'static dyn EdgeHandler,
    ) -> Result<(), GpioError> {
        let bit = gpio_bit(pin)?;
        let reg = pin_register(pin)?;

        critical_section::with(|cs| {
            if !self.table.state_in(cs, pin).accepts_configure() {
                warn!("GPIO{} already bound, rebind rejected", pin);
                return Err(ConfigFailure::AlreadyBound);
            }
            self.table.apply(cs, pin, BindingEvent::Configure);
            Ok(())
        })?;

        match self.setup(pin) {
            Ok(()) => {
                // Handler is in place before the edge can fire
                critical_section::with(|cs| {
                    self.table.attach(cs, pin, handler);
                    self.table.apply(cs, pin, BindingEvent::Configured(edge));
                    self.bus.clear_bits(bit.bank.status_clear(), bit.mask());
                    arm(self.bus, reg, edge);
                });
                info!("GPIO{} bound on {}", pin, edge);
                Ok(())
            }
            Err(failure) => {
                critical_section::with(|cs| {
                    disarm(self.bus, reg, bit);
                    self.table.apply(cs, pin, BindingEvent::Failed);
                });
                warn!("GPIO{} bind failed: {}", pin, failure);
                Err(failure.into())
            }
        }
    }

    fn setup(&self, pin: u8) -> Result<(), ConfigFailure> {
        GpioController::new(self.bus)
            .init(pin, PinMode::Input)
            .map_err(|_| ConfigFailure::PinSetup)?;
        IoMuxController::new(self.bus)
            .enable_pullup(pin)
            .map_err(|_| ConfigFailure::PinSetup)?;
        self.service.install()
    }

    /// Atomically swap the edge and handler of a bound pin
    pub fn replace_interruption(
        &self,
        pin: u8,
        edge: EdgeType,
        handler: &'static dyn EdgeHandler,
    ) -> Result<(), GpioError> {
        let bit = gpio_bit(pin)?;
        let reg = pin_register(pin)?;

        critical_section::with(|cs| {
            if !self.table.state_in(cs, pin).is_bound() {
                return Err(ConfigFailure::NotBound);
            }
            arm(self.bus, reg, edge);
            self.bus.clear_bits(bit.bank.status_clear(), bit.mask());
            self.table.attach(cs, pin, handler);
            self.table.apply(cs, pin, BindingEvent::Replace(edge));
            Ok(())
        })?;

        debug!("GPIO{} rebound on {}", pin, edge);
        Ok(())
    }

    /// Unbind a pin
    ///
    /// The interrupt is disabled and pending status cleared before this
    /// returns, so the handler will not be called again. Unbinding a pin
    /// with no handler does nothing.
    pub fn exclude_interruption(&self, pin: u8) -> Result<(), GpioError> {
        let bit = gpio_bit(pin)?;
        let reg = pin_register(pin)?;

        let removed = critical_section::with(|cs| {
            if !self.table.state_in(cs, pin).is_bound() {
                return false;
            }
            disarm(self.bus, reg, bit);
            self.table.apply(cs, pin, BindingEvent::Exclude);
            true
        });

        if removed {
            info!("GPIO{} unbound", pin);
        }
        Ok(())
    }

    pub fn state(&self, pin: u8) -> BindingState {
        self.table.state(pin)
    }

    pub fn is_bound(&self, pin: u8) -> bool {
        self.table.state(pin).is_bound()
    }

    /// [`HandlerTable::dispatch`] on this binding's bus
    pub fn dispatch(&self) -> u32 {
        self.table.dispatch(self.bus)
    }
}

/// Edge handler that counts edges for the main loop
pub struct EdgeCounter {
    count: AtomicU32,
    last_pin: AtomicU8,
}

impl Default for EdgeCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeCounter {
    const NO_PIN: u8 = u8::MAX;

    pub const fn new() -> Self {
        Self {
            count: AtomicU32::new(0),
            last_pin: AtomicU8::new(Self::NO_PIN),
        }
    }

    /// Edges seen so far
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Acquire)
    }

    /// Read and reset the count
    pub fn take(&self) -> u32 {
        self.count.swap(0, Ordering::AcqRel)
    }

    /// Pin of the most recent edge
    pub fn last_pin(&self) -> Option<u8> {
        match self.last_pin.load(Ordering::Acquire) {
            Self::NO_PIN => None,
            pin => Some(pin),
        }
    }
}

impl EdgeHandler for EdgeCounter {
    fn on_edge(&self, pin: u8) {
        self.last_pin.store(pin, Ordering::Release);
        self.count.fetch_add(1, Ordering::AcqRel);
    }
}
