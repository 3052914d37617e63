/// Display bus and display configuration records.
///
/// These are the exact parameter sets handed to the platform's bus and
/// display constructors. Units: frequencies in Hz, dimensions in pixels,
/// rotation in degrees.
use crate::init_sequence::InitSequence;
use crate::pins::PinRef;
use crate::platform::BoardError;

/// Number of data lines on an 8-bit parallel bus.
pub const PARALLEL_DATA_LINES: u8 = 8;

/// 8-bit parallel (8080-style) display bus. The data lines are the eight
/// consecutive GPIOs starting at `data0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelBusConfig {
    pub data0: PinRef,
    /// Command/data select (D/C, a.k.a. RS)
    pub command: PinRef,
    pub chip_select: PinRef,
    pub write: PinRef,
    pub read: Option<PinRef>,
    pub reset: Option<PinRef>,
    pub frequency_hz: u32,
}

impl ParallelBusConfig {
    /// The data lines, lowest bit first. Lines that would run past the last
    /// GPIO number are left out; [`validate`](Self::validate) rejects such
    /// a bus.
    pub fn data_pins(&self) -> impl Iterator<Item = PinRef> {
        let base = self.data0.number();
        (0..PARALLEL_DATA_LINES).filter_map(move |i| base.checked_add(i).map(PinRef::gpio))
    }

    fn control_pins(&self) -> [Option<PinRef>; 5] {
        [
            Some(self.command),
            Some(self.chip_select),
            Some(self.write),
            self.read,
            self.reset,
        ]
    }

    pub fn validate(&self) -> Result<(), BoardError> {
        if self.frequency_hz == 0 {
            return Err(BoardError::InvalidConfig("bus frequency is zero"));
        }
        if self.data0.number() > u8::MAX - (PARALLEL_DATA_LINES - 1) {
            return Err(BoardError::InvalidConfig("data lines run past the last GPIO"));
        }
        let control = self.control_pins();
        for (i, pin) in control.iter().enumerate() {
            let Some(pin) = *pin else { continue };
            if self.data_pins().any(|d| d == pin) {
                return Err(BoardError::InvalidConfig("control pin overlaps a data line"));
            }
            if control[i + 1..].iter().any(|other| *other == Some(pin)) {
                return Err(BoardError::InvalidConfig("control pin used twice"));
            }
        }
        Ok(())
    }
}

/// Colour depths the display core can drive.
pub const COLOR_DEPTHS: &[u16] = &[1, 2, 4, 8, 16, 24, 32];

/// Display geometry, addressing commands and backlight setup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayConfig {
    pub width: u16,
    pub height: u16,
    pub colstart: i16,
    pub rowstart: i16,
    /// Degrees; one of 0, 90, 180, 270
    pub rotation: u16,
    pub color_depth: u16,
    pub grayscale: bool,
    /// Unused for depths > 8
    pub pixels_in_byte_share_row: bool,
    /// Only valid for depths < 8
    pub bytes_per_cell: u8,
    /// Only valid for depths < 8
    pub reverse_pixels_in_byte: bool,
    pub reverse_pixels_in_word: bool,
    pub set_column_command: u8,
    pub set_row_command: u8,
    pub write_ram_command: u8,
    pub init_sequence: InitSequence<'static>,
    pub backlight_pin: Option<PinRef>,
    /// `None` when brightness is driven by backlight PWM only
    pub brightness_command: Option<u8>,
    pub brightness: f32,
    pub single_byte_bounds: bool,
    pub data_as_commands: bool,
    pub auto_refresh: bool,
    pub native_frames_per_second: u16,
    pub backlight_on_high: bool,
    pub sh1107_addressing: bool,
    pub backlight_pwm_frequency_hz: u32,
}

impl DisplayConfig {
    /// Width and height after applying `rotation`.
    pub fn logical_size(&self) -> (u16, u16) {
        if self.rotation % 180 == 90 {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }

    pub fn validate(&self) -> Result<(), BoardError> {
        if self.width == 0 || self.height == 0 {
            return Err(BoardError::InvalidConfig("display has zero size"));
        }
        if !matches!(self.rotation, 0 | 90 | 180 | 270) {
            return Err(BoardError::InvalidConfig("rotation must be 0, 90, 180 or 270"));
        }
        if !COLOR_DEPTHS.contains(&self.color_depth) {
            return Err(BoardError::InvalidConfig("unsupported colour depth"));
        }
        if !(0.0..=1.0).contains(&self.brightness) {
            return Err(BoardError::InvalidConfig("brightness out of range"));
        }
        if self.native_frames_per_second == 0 {
            return Err(BoardError::InvalidConfig("frame rate is zero"));
        }
        if self.backlight_pin.is_some() && self.backlight_pwm_frequency_hz == 0 {
            return Err(BoardError::InvalidConfig("backlight PWM frequency is zero"));
        }
        self.init_sequence
            .validate()
            .map_err(BoardError::MalformedInitSequence)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init_sequence::SequenceError;

    const BUS: ParallelBusConfig = ParallelBusConfig {
        data0: PinRef::gpio(14),
        command: PinRef::gpio(11),
        chip_select: PinRef::gpio(10),
        write: PinRef::gpio(12),
        read: Some(PinRef::gpio(13)),
        reset: None,
        frequency_hz: 2_500_000,
    };

    const DISPLAY: DisplayConfig = DisplayConfig {
        width: 320,
        height: 240,
        colstart: 0,
        rowstart: 0,
        rotation: 0,
        color_depth: 16,
        grayscale: false,
        pixels_in_byte_share_row: false,
        bytes_per_cell: 1,
        reverse_pixels_in_byte: false,
        reverse_pixels_in_word: true,
        set_column_command: 0x2A,
        set_row_command: 0x2B,
        write_ram_command: 0x2C,
        init_sequence: InitSequence::new(&[0x01, 0x80, 0x64, 0x29, 0x00]),
        backlight_pin: Some(PinRef::gpio(2)),
        brightness_command: None,
        brightness: 1.0,
        single_byte_bounds: false,
        data_as_commands: false,
        auto_refresh: true,
        native_frames_per_second: 60,
        backlight_on_high: true,
        sh1107_addressing: false,
        backlight_pwm_frequency_hz: 250,
    };

    #[test]
    fn data_pins_are_consecutive() {
        let pins: heapless::Vec<u8, 8> = BUS.data_pins().map(PinRef::number).collect();
        assert_eq!(pins.as_slice(), &[14, 15, 16, 17, 18, 19, 20, 21]);
    }

    #[test]
    fn data_pins_stop_at_last_gpio() {
        let bus = ParallelBusConfig {
            data0: PinRef::gpio(250),
            ..BUS
        };
        let pins: heapless::Vec<u8, 8> = bus.data_pins().map(PinRef::number).collect();
        assert_eq!(pins.as_slice(), &[250, 251, 252, 253, 254, 255]);
        assert!(matches!(bus.validate(), Err(BoardError::InvalidConfig(_))));
    }

    #[test]
    fn valid_bus() {
        assert_eq!(BUS.validate(), Ok(()));
    }

    #[test]
    fn control_pin_on_data_line_rejected() {
        let bus = ParallelBusConfig {
            write: PinRef::gpio(16),
            ..BUS
        };
        assert!(matches!(bus.validate(), Err(BoardError::InvalidConfig(_))));
    }

    #[test]
    fn repeated_control_pin_rejected() {
        let bus = ParallelBusConfig {
            read: Some(PinRef::gpio(10)),
            ..BUS
        };
        assert!(matches!(bus.validate(), Err(BoardError::InvalidConfig(_))));
    }

    #[test]
    fn zero_frequency_rejected() {
        let bus = ParallelBusConfig {
            frequency_hz: 0,
            ..BUS
        };
        assert!(bus.validate().is_err());
    }

    #[test]
    fn data_lines_past_last_gpio_rejected() {
        let bus = ParallelBusConfig {
            data0: PinRef::gpio(250),
            ..BUS
        };
        assert!(bus.validate().is_err());
    }

    #[test]
    fn valid_display() {
        assert_eq!(DISPLAY.validate(), Ok(()));
    }

    #[test]
    fn bad_rotation_rejected() {
        let display = DisplayConfig {
            rotation: 45,
            ..DISPLAY
        };
        assert!(display.validate().is_err());
    }

    #[test]
    fn bad_depth_rejected() {
        let display = DisplayConfig {
            color_depth: 12,
            ..DISPLAY
        };
        assert!(display.validate().is_err());
    }

    #[test]
    fn brightness_out_of_range_rejected() {
        let display = DisplayConfig {
            brightness: 1.5,
            ..DISPLAY
        };
        assert!(display.validate().is_err());
    }

    #[test]
    fn malformed_sequence_rejected() {
        let display = DisplayConfig {
            init_sequence: InitSequence::new(&[0x2A, 0x04, 0x00]),
            ..DISPLAY
        };
        assert_eq!(
            display.validate(),
            Err(BoardError::MalformedInitSequence(SequenceError::Truncated { offset: 0 }))
        );
    }

    #[test]
    fn logical_size_swaps_on_quarter_turn() {
        assert_eq!(DISPLAY.logical_size(), (320, 240));
        let rotated = DisplayConfig {
            rotation: 270,
            ..DISPLAY
        };
        assert_eq!(rotated.logical_size(), (240, 320));
    }
}
