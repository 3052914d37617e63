/// Board identity, lifecycle hooks, and the compile-time active board.
///
/// Each board module under [`crate::boards`] defines its pin assignments
/// and display wiring; the active one is selected at compile time via
/// feature flags and re-exported here.
use crate::pins::{BoardObject, PinRef, PinTable};
use crate::platform::{BoardError, Platform};

/// Compiled-in board and MCU names, as reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardIdentity {
    pub name: &'static str,
    pub mcu_name: &'static str,
}

/// Fixed pins of the board's default I2C bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct I2cPins {
    pub scl: PinRef,
    pub sda: PinRef,
}

/// Fixed pins of the board's default UART.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartPins {
    pub tx: PinRef,
    pub rx: PinRef,
}

/// Per-board hooks called by the boot and reset sequence.
///
/// `init` runs once during boot before anything else touches the display
/// pool; `deinit` runs once on shutdown or soft reset.
pub trait Board {
    const IDENTITY: BoardIdentity;

    /// Pin export table for the runtime's `board` module.
    fn pins(&self) -> &'static PinTable;

    /// Resolve an exported name against the board's current state. Boards
    /// that build displays map [`BoardObject::Display`] to the pool slot
    /// they actually constructed.
    fn resolve(&self, name: &str) -> Option<BoardObject> {
        self.pins().lookup(name)
    }

    /// Acquire and construct the board's onboard peripherals.
    fn init<P: Platform>(&mut self, platform: &mut P) -> Result<(), BoardError>;

    /// Whether boot-time conditions ask for a degraded boot.
    fn requests_safe_mode(&self) -> bool {
        false
    }

    /// Soft-reset hook.
    fn reset(&mut self) {}

    /// Release whatever `init` acquired. Returns the number of slots
    /// released; a second call releases nothing.
    fn deinit<P: Platform>(&mut self, platform: &mut P) -> usize;
}

#[cfg(feature = "board-waveshare-s3-pico")]
mod hw {
    use crate::boards::waveshare_s3_pico as b;

    pub use b::WaveshareS3Pico as ActiveBoard;
    pub const BOARD_NAME: &str = b::IDENTITY.name;
    pub const MCU_NAME: &str = b::IDENTITY.mcu_name;
    pub const BOARD_ID: &str = b::BOARD_ID;
    pub const STATUS_LED_PIN: u8 = b::NEOPIXEL.number();
    pub const HAS_DISPLAY: bool = false;
}

#[cfg(all(feature = "board-tufty2040", not(feature = "board-waveshare-s3-pico")))]
mod hw {
    use crate::boards::tufty2040 as b;

    pub use b::Tufty2040 as ActiveBoard;
    pub const BOARD_NAME: &str = b::IDENTITY.name;
    pub const MCU_NAME: &str = b::IDENTITY.mcu_name;
    pub const BOARD_ID: &str = b::BOARD_ID;
    pub const STATUS_LED_PIN: u8 = b::STATUS_LED.number();
    pub const HAS_DISPLAY: bool = true;
    pub const DISPLAY_WIDTH: u16 = b::WIDTH;
    pub const DISPLAY_HEIGHT: u16 = b::HEIGHT;
}

#[cfg(not(any(feature = "board-waveshare-s3-pico", feature = "board-tufty2040")))]
mod hw {
    pub const BOARD_NAME: &str = "unknown";
    pub const MCU_NAME: &str = "unknown";
    pub const BOARD_ID: &str = "unknown";
    pub const HAS_DISPLAY: bool = false;
}

pub use hw::*;
