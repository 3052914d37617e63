/// Waveshare ESP32-S3-Pico (Raspberry Pi Pico compatible footprint).
///
/// No onboard display: the lifecycle hooks only report the board.
use crate::board::{Board, BoardIdentity, I2cPins};
use crate::pins::{BoardObject, PinRef, PinTable};
use crate::platform::{BoardError, Platform};

pub const IDENTITY: BoardIdentity = BoardIdentity {
    name: "Waveshare ESP32-S3-Pico Compat",
    mcu_name: "ESP32S3",
};

pub const BOARD_ID: &str = "waveshare_esp32_s3_pico_c";

/// Status NeoPixel (WS2812).
pub const NEOPIXEL: PinRef = PinRef::gpio(21);

pub const BOARD_I2C: I2cPins = I2cPins {
    scl: PinRef::gpio(16),
    sda: PinRef::gpio(15),
};

const PIN_ENTRIES: &[(&str, BoardObject)] = &[
    ("board_id", BoardObject::BoardId(BOARD_ID)),
    ("NEOPIXEL", BoardObject::Pin(NEOPIXEL)),
    ("SCL", BoardObject::Pin(BOARD_I2C.scl)),
    ("SDA", BoardObject::Pin(BOARD_I2C.sda)),
    ("I2C", BoardObject::I2c),
];

pub static PINS: PinTable = PinTable::new(PIN_ENTRIES, &[]);

#[derive(Debug, Default)]
pub struct WaveshareS3Pico;

impl WaveshareS3Pico {
    pub const fn new() -> Self {
        Self
    }
}

impl Board for WaveshareS3Pico {
    const IDENTITY: BoardIdentity = IDENTITY;

    fn pins(&self) -> &'static PinTable {
        &PINS
    }

    fn init<P: Platform>(&mut self, _platform: &mut P) -> Result<(), BoardError> {
        log::info!("{} ({}): no onboard display", IDENTITY.name, IDENTITY.mcu_name);
        Ok(())
    }

    fn deinit<P: Platform>(&mut self, _platform: &mut P) -> usize {
        0
    }
}
