/// Platform contract for display bring-up.
///
/// The platform owns a bounded pool of display-bus and display slots and
/// the hardware constructors that bind them to pins. Boards reach it only
/// through [`Platform`]. [`DisplayPool`] is an in-memory implementation
/// that keeps the slot bookkeeping and validates what it is asked to build;
/// firmware without a display stack and the host tests both use it.
use core::fmt;

use heapless::Vec;

use crate::display::{DisplayConfig, ParallelBusConfig};
use crate::init_sequence::SequenceError;
use crate::pins::{BoardObject, PinRef};

/// Board bring-up failure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoardError {
    /// Every display-bus slot is in use.
    NoFreeDisplayBus,
    /// Every display slot is in use.
    NoFreeDisplay,
    /// `init` called again without `deinit`.
    AlreadyInitialized,
    /// A slot that was never allocated (or already released) was used.
    InvalidSlot,
    /// A configuration record failed validation.
    InvalidConfig(&'static str),
    /// The display init sequence does not decode.
    MalformedInitSequence(SequenceError),
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::NoFreeDisplayBus => write!(f, "too many display buses"),
            BoardError::NoFreeDisplay => write!(f, "too many displays"),
            BoardError::AlreadyInitialized => write!(f, "board already initialized"),
            BoardError::InvalidSlot => write!(f, "display slot not allocated"),
            BoardError::InvalidConfig(reason) => write!(f, "invalid display config: {}", reason),
            BoardError::MalformedInitSequence(e) => write!(f, "{}", e),
        }
    }
}

/// Index of an allocated display-bus slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusSlot(u8);

impl BusSlot {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of an allocated display slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplaySlot(u8);

impl DisplaySlot {
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Slot as exported through a board's `DISPLAY` name.
    pub const fn object(self) -> BoardObject {
        BoardObject::Display(self.0)
    }
}

/// Display resources and pin policy provided by the platform layer.
pub trait Platform {
    /// Claim a free bus slot. Fails when the pool is exhausted.
    fn allocate_display_bus(&mut self) -> Result<BusSlot, BoardError>;

    /// Claim a free display slot. Fails when the pool is exhausted.
    fn allocate_display(&mut self) -> Result<DisplaySlot, BoardError>;

    /// Bind an allocated bus slot to a parallel bus.
    fn construct_parallel_bus(&mut self, slot: BusSlot, config: &ParallelBusConfig) -> Result<(), BoardError>;

    /// Bind an allocated display slot to a constructed bus.
    fn construct_display(
        &mut self,
        slot: DisplaySlot,
        bus: BusSlot,
        config: &DisplayConfig,
    ) -> Result<(), BoardError>;

    /// Free one bus slot. Returns `false` if it was not held.
    fn release_display_bus(&mut self, slot: BusSlot) -> bool;

    /// Free one display slot. Returns `false` if it was not held.
    fn release_display(&mut self, slot: DisplaySlot) -> bool;

    /// Free every slot in the pool. Returns how many were held.
    fn release_displays(&mut self) -> usize;

    /// Exempt `pin` from the reset-on-restart sweep.
    fn never_reset_pin(&mut self, pin: PinRef);
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BusState {
    Free,
    Allocated,
    Parallel(ParallelBusConfig),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DisplayState {
    Free,
    Allocated,
    Active { bus: BusSlot, config: DisplayConfig },
}

/// Most pins a pool can mark as never-reset.
pub const MAX_NEVER_RESET: usize = 32;

/// Bounded display-resource pool with `BUSES` bus slots and `DISPLAYS`
/// display slots.
pub struct DisplayPool<const BUSES: usize, const DISPLAYS: usize> {
    buses: [BusState; BUSES],
    displays: [DisplayState; DISPLAYS],
    never_reset: Vec<PinRef, MAX_NEVER_RESET>,
}

impl<const BUSES: usize, const DISPLAYS: usize> DisplayPool<BUSES, DISPLAYS> {
    pub const fn new() -> Self {
        Self {
            buses: [BusState::Free; BUSES],
            displays: [DisplayState::Free; DISPLAYS],
            never_reset: Vec::new(),
        }
    }

    /// Number of bus slots currently held.
    pub fn active_buses(&self) -> usize {
        self.buses.iter().filter(|s| **s != BusState::Free).count()
    }

    /// Number of display slots currently held.
    pub fn active_displays(&self) -> usize {
        self.displays
            .iter()
            .filter(|s| **s != DisplayState::Free)
            .count()
    }

    /// Configuration of a constructed parallel bus.
    pub fn bus(&self, slot: BusSlot) -> Option<&ParallelBusConfig> {
        match self.buses.get(slot.index()) {
            Some(BusState::Parallel(config)) => Some(config),
            _ => None,
        }
    }

    /// Configuration and bus of a constructed display.
    pub fn display(&self, slot: DisplaySlot) -> Option<(BusSlot, &DisplayConfig)> {
        match self.displays.get(slot.index()) {
            Some(DisplayState::Active { bus, config }) => Some((*bus, config)),
            _ => None,
        }
    }

    pub fn is_never_reset(&self, pin: PinRef) -> bool {
        self.never_reset.contains(&pin)
    }

    pub fn never_reset_pins(&self) -> &[PinRef] {
        &self.never_reset
    }
}

impl<const BUSES: usize, const DISPLAYS: usize> Default for DisplayPool<BUSES, DISPLAYS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const BUSES: usize, const DISPLAYS: usize> Platform for DisplayPool<BUSES, DISPLAYS> {
    fn allocate_display_bus(&mut self) -> Result<BusSlot, BoardError> {
        let Some(index) = self.buses.iter().position(|s| *s == BusState::Free) else {
            log::warn!("No free display bus ({} slots)", BUSES);
            return Err(BoardError::NoFreeDisplayBus);
        };
        self.buses[index] = BusState::Allocated;
        Ok(BusSlot(index as u8))
    }

    fn allocate_display(&mut self) -> Result<DisplaySlot, BoardError> {
        let Some(index) = self.displays.iter().position(|s| *s == DisplayState::Free) else {
            log::warn!("No free display ({} slots)", DISPLAYS);
            return Err(BoardError::NoFreeDisplay);
        };
        self.displays[index] = DisplayState::Allocated;
        Ok(DisplaySlot(index as u8))
    }

    fn construct_parallel_bus(&mut self, slot: BusSlot, config: &ParallelBusConfig) -> Result<(), BoardError> {
        match self.buses.get(slot.index()) {
            Some(BusState::Allocated) => {}
            _ => return Err(BoardError::InvalidSlot),
        }
        config.validate()?;
        self.buses[slot.index()] = BusState::Parallel(*config);
        log::debug!(
            "Parallel bus {}: data0={} dc={} cs={} wr={} @ {} Hz",
            slot.index(),
            config.data0,
            config.command,
            config.chip_select,
            config.write,
            config.frequency_hz
        );
        Ok(())
    }

    fn construct_display(
        &mut self,
        slot: DisplaySlot,
        bus: BusSlot,
        config: &DisplayConfig,
    ) -> Result<(), BoardError> {
        match self.displays.get(slot.index()) {
            Some(DisplayState::Allocated) => {}
            _ => return Err(BoardError::InvalidSlot),
        }
        if self.bus(bus).is_none() {
            return Err(BoardError::InvalidSlot);
        }
        config.validate()?;
        self.displays[slot.index()] = DisplayState::Active { bus, config: *config };
        log::debug!(
            "Display {}: {}x{} {}bpp on bus {}, {} init bytes",
            slot.index(),
            config.width,
            config.height,
            config.color_depth,
            bus.index(),
            config.init_sequence.len()
        );
        Ok(())
    }

    fn release_display_bus(&mut self, slot: BusSlot) -> bool {
        match self.buses.get_mut(slot.index()) {
            Some(state) if *state != BusState::Free => {
                *state = BusState::Free;
                true
            }
            _ => false,
        }
    }

    fn release_display(&mut self, slot: DisplaySlot) -> bool {
        match self.displays.get_mut(slot.index()) {
            Some(state) if *state != DisplayState::Free => {
                *state = DisplayState::Free;
                true
            }
            _ => false,
        }
    }

    fn release_displays(&mut self) -> usize {
        let released = self.active_buses() + self.active_displays();
        self.displays = [DisplayState::Free; DISPLAYS];
        self.buses = [BusState::Free; BUSES];
        released
    }

    fn never_reset_pin(&mut self, pin: PinRef) {
        if self.never_reset.contains(&pin) {
            return;
        }
        if self.never_reset.push(pin).is_err() {
            log::warn!("Never-reset list full, {} will be reset", pin);
        }
    }
}
