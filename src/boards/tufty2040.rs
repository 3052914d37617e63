/// Pimoroni Tufty 2040 (RP2040).
///
/// 320x240 ST7789 panel on an 8-bit parallel bus (GPIO14..21 data,
/// GPIO10..13 control), PWM backlight on GPIO2, five user buttons, light
/// sensor and battery sense.
use crate::board::{Board, BoardIdentity, I2cPins, UartPins};
use crate::display::{DisplayConfig, ParallelBusConfig};
use crate::init_sequence::{self, InitSequence, DELAY};
use crate::madctl::{Madctl, MADCTL};
use crate::pins::{BoardObject, PinRef, PinTable};
use crate::platform::{BoardError, BusSlot, DisplaySlot, Platform};

pub const IDENTITY: BoardIdentity = BoardIdentity {
    name: "Pimoroni Tufty 2040",
    mcu_name: "rp2040",
};

pub const BOARD_ID: &str = "pimoroni_tufty2040";

pub const STATUS_LED: PinRef = PinRef::gpio(25);
pub const BOARD_I2C: I2cPins = I2cPins {
    scl: PinRef::gpio(5),
    sda: PinRef::gpio(4),
};
pub const BOARD_UART: UartPins = UartPins {
    tx: PinRef::gpio(0),
    rx: PinRef::gpio(1),
};

pub const BACKLIGHT: PinRef = PinRef::gpio(2);

pub const WIDTH: u16 = 320;
pub const HEIGHT: u16 = 240;

/// ST7789 command bytes.
#[allow(dead_code)]
mod reg {
    pub const SWRESET: u8 = 0x01;
    pub const SLPOUT: u8 = 0x11;
    pub const INVOFF: u8 = 0x20;
    pub const INVON: u8 = 0x21;
    pub const GAMSET: u8 = 0x26;
    pub const DISPOFF: u8 = 0x28;
    pub const DISPON: u8 = 0x29;
    pub const CASET: u8 = 0x2A;
    pub const RASET: u8 = 0x2B;
    pub const RAMWR: u8 = 0x2C;
    pub const TEOFF: u8 = 0x34;
    pub const TEON: u8 = 0x35;
    pub const COLMOD: u8 = 0x3A;
    pub const PORCTRL: u8 = 0xB2;
    pub const GCTRL: u8 = 0xB7;
    pub const VCOMS: u8 = 0xBB;
    pub const LCMCTRL: u8 = 0xC0;
    pub const VDVVRHEN: u8 = 0xC2;
    pub const VRHS: u8 = 0xC3;
    pub const VDVS: u8 = 0xC4;
    pub const FRCTRL2: u8 = 0xC6;
    pub const PWMFRSEL: u8 = 0xCC;
    pub const PWCTRL1: u8 = 0xD0;
    pub const GMCTRP1: u8 = 0xE0;
    pub const GMCTRN1: u8 = 0xE1;
}

use reg::*;

/// Panel is mounted rotated: rows bottom-to-top, axes swapped, reversed
/// vertical refresh.
pub const PANEL_MADCTL: Madctl = Madctl::ROW_ORDER
    .union(Madctl::SWAP_XY)
    .union(Madctl::SCAN_ORDER);

pub const INIT_SEQUENCE_LEN: usize = 100;

/// ST7789 power-up sequence. Byte-exact: gamma, timing and orientation all
/// come from these values.
#[rustfmt::skip]
pub const INIT_SEQUENCE: [u8; INIT_SEQUENCE_LEN] = [
    SWRESET, DELAY, 0x64, // 100ms
    TEON, DELAY, 0x64,
    COLMOD, 1, 0x05,
    PORCTRL, 5, 0x0c, 0x0c, 0x00, 0x33, 0x33,
    LCMCTRL, 1, 0x2c,
    VDVVRHEN, 1, 0x01,
    VRHS, 1, 0x12,
    VDVS, 1, 0x20,
    PWCTRL1, 2, 0xa4, 0xa1,
    FRCTRL2, 1, 0x0f,
    GCTRL, 1, 0x35,
    VCOMS, 1, 0x1f,
    0xd6, 1, 0xa1,
    GMCTRP1, 14, 0xd0, 0x08, 0x11, 0x08, 0x0c, 0x15, 0x39, 0x33, 0x50, 0x36, 0x13, 0x14, 0x29, 0x2D,
    GMCTRN1, 14, 0xd0, 0x08, 0x10, 0x08, 0x06, 0x06, 0x39, 0x44, 0x51, 0x0b, 0x16, 0x14, 0x2f, 0x31,
    INVON, DELAY, 0x64,
    SLPOUT, DELAY, 0x64,
    DISPON, DELAY, 0x64,
    CASET, 4, 0x00, 0x00, 0x01, 0x3F,
    RASET, 4, 0x00, 0x00, 0x00, 0xEF,
    MADCTL, 1, PANEL_MADCTL.bits(),
];

const _: () = assert!(init_sequence::is_well_formed(&INIT_SEQUENCE));

/// 2.5 MHz is below what 60 Hz refresh needs, but faster clocks show
/// ghosting on this panel.
pub const BUS_FREQUENCY_HZ: u32 = 2_500_000;

pub const BUS_CONFIG: ParallelBusConfig = ParallelBusConfig {
    data0: PinRef::gpio(14),
    command: PinRef::gpio(11),
    chip_select: PinRef::gpio(10),
    write: PinRef::gpio(12),
    read: Some(PinRef::gpio(13)),
    reset: None,
    frequency_hz: BUS_FREQUENCY_HZ,
};

pub const DISPLAY_CONFIG: DisplayConfig = DisplayConfig {
    width: WIDTH,
    height: HEIGHT,
    colstart: 0,
    rowstart: 0,
    rotation: 0,
    color_depth: 16,
    grayscale: false,
    pixels_in_byte_share_row: false,
    bytes_per_cell: 1,
    reverse_pixels_in_byte: false,
    reverse_pixels_in_word: true,
    set_column_command: CASET,
    set_row_command: RASET,
    write_ram_command: RAMWR,
    init_sequence: InitSequence::new(&INIT_SEQUENCE),
    backlight_pin: Some(BACKLIGHT),
    brightness_command: None,
    // ignored without a brightness command
    brightness: 1.0,
    single_byte_bounds: false,
    data_as_commands: false,
    auto_refresh: true,
    native_frames_per_second: 60,
    backlight_on_high: true,
    sh1107_addressing: false,
    // highest that still shows an image at 0.01 brightness
    backlight_pwm_frequency_hz: 250,
};

const fn pin(n: u8) -> BoardObject {
    BoardObject::Pin(PinRef::gpio(n))
}

const PIN_ENTRIES: &[(&str, BoardObject)] = &[
    ("board_id", BoardObject::BoardId(BOARD_ID)),
    ("TX", pin(0)),
    ("GP0", pin(0)),
    ("RX", pin(1)),
    ("GP1", pin(1)),
    ("LCD_BACKLIGHT", pin(2)),
    ("INT", pin(3)),
    ("SDA", pin(4)),
    ("SCL", pin(5)),
    ("SW_DOWN", pin(6)),
    ("SW_A", pin(7)),
    ("SW_B", pin(8)),
    ("SW_C", pin(9)),
    ("SW_UP", pin(22)),
    ("LCD_CS", pin(10)),
    ("LCD_RS", pin(11)),
    ("LCD_WR", pin(12)),
    ("LCD_RD", pin(13)),
    ("LCD_DB0", pin(14)),
    ("LCD_DB1", pin(15)),
    ("LCD_DB2", pin(16)),
    ("LCD_DB3", pin(17)),
    ("LCD_DB4", pin(18)),
    ("LCD_DB5", pin(19)),
    ("LCD_DB6", pin(20)),
    ("LCD_DB7", pin(21)),
    ("USER_SW", pin(23)),
    ("VBUS_DETECT", pin(24)),
    ("USER_LED", pin(25)),
    ("LIGHT_SENSE", pin(26)),
    ("SENSOR_POWER", pin(27)),
    ("REF_1V2", pin(28)),
    ("VBAT_SENSE", pin(29)),
    ("I2C", BoardObject::I2c),
    ("UART", BoardObject::Uart),
    ("DISPLAY", BoardObject::Display(0)),
];

/// GPIO0/GPIO1 are exported under both their UART and GPIO names.
const PIN_ALIASES: &[(&str, &str)] = &[("TX", "GP0"), ("RX", "GP1")];

pub static PINS: PinTable = PinTable::new(PIN_ENTRIES, PIN_ALIASES);

/// Lifecycle state: the slots taken from the platform pool.
#[derive(Debug, Default)]
pub struct Tufty2040 {
    bus: Option<BusSlot>,
    display: Option<DisplaySlot>,
}

impl Tufty2040 {
    pub const fn new() -> Self {
        Self {
            bus: None,
            display: None,
        }
    }

    pub fn display_slot(&self) -> Option<DisplaySlot> {
        self.display
    }
}

impl Board for Tufty2040 {
    const IDENTITY: BoardIdentity = IDENTITY;

    fn pins(&self) -> &'static PinTable {
        &PINS
    }

    /// `DISPLAY` only resolves once `init` has constructed it.
    fn resolve(&self, name: &str) -> Option<BoardObject> {
        match PINS.lookup(name)? {
            BoardObject::Display(_) => self.display.map(DisplaySlot::object),
            object => Some(object),
        }
    }

    /// Slots are recorded as soon as they are allocated, so `deinit`
    /// can undo a partial init.
    fn init<P: Platform>(&mut self, platform: &mut P) -> Result<(), BoardError> {
        if self.bus.is_some() || self.display.is_some() {
            return Err(BoardError::AlreadyInitialized);
        }

        let bus = platform.allocate_display_bus()?;
        self.bus = Some(bus);
        platform.construct_parallel_bus(bus, &BUS_CONFIG)?;

        let display = platform.allocate_display()?;
        self.display = Some(display);
        platform.construct_display(display, bus, &DISPLAY_CONFIG)?;

        platform.never_reset_pin(BACKLIGHT);

        log::info!(
            "{}: display {}x{} on parallel bus @ {} Hz",
            IDENTITY.name,
            WIDTH,
            HEIGHT,
            BUS_FREQUENCY_HZ
        );
        Ok(())
    }

    fn deinit<P: Platform>(&mut self, platform: &mut P) -> usize {
        let mut released = 0;
        if let Some(display) = self.display.take() {
            if platform.release_display(display) {
                released += 1;
            }
        }
        if let Some(bus) = self.bus.take() {
            if platform.release_display_bus(bus) {
                released += 1;
            }
        }
        if released > 0 {
            log::info!("{}: released {} display resources", IDENTITY.name, released);
        }
        released
    }
}
