/// ILI9488 init data for the Waveshare Pico-ResTouch 3.5" panel.
///
/// The panel sits behind two SIPO shift registers that turn SPI into a
/// 16-bit parallel bus, so every data byte goes out as a 16-bit word. The
/// plain 8-bit sequence is kept for ILI9488s wired directly to 4-wire SPI.
///
/// Rotation is done by the controller (via MADCTL) rather than by the
/// display core, so the logical rotation handed on is always 0. MADCTL must
/// be the last step; [`init_sequence`] appends the rotation's value.
use heapless::Vec;

use crate::display::DisplayConfig;
use crate::init_sequence::{self, InitSequence};
use crate::madctl::{Madctl, MADCTL};

pub const SWRESET: u8 = 0x01;
pub const SLPOUT: u8 = 0x11;
pub const INVON: u8 = 0x21;
pub const DISPON: u8 = 0x29;
pub const PIXFMT: u8 = 0x3A;
pub const DFUNCTR: u8 = 0xB6;
pub const PWCTRL3: u8 = 0xC2;
pub const CASET: u8 = 0x2A;
pub const RASET: u8 = 0x2B;
pub const RAMWR: u8 = 0x2C;

/// Minimal sequence for an SPI-4wire ILI9488, without its MADCTL value.
#[rustfmt::skip]
pub const INIT_SEQUENCE: &[u8] = &[
    SWRESET, 0x80, 0x78,        // + 120ms
    INVON, 0x00,
    PWCTRL3, 0x01, 0x33,
    PIXFMT, 0x01, 0x55,
    DFUNCTR, 0x03, 0x02, 0x02, 0x3b,
    SLPOUT, 0x80, 0x05,         // + 5ms
    DISPON, 0x00,
    MADCTL, 0x01,
];

/// Same sequence for the 16-bit bus, without its MADCTL value.
#[rustfmt::skip]
pub const INIT_SEQUENCE_16: &[u8] = &[
    SWRESET, 0x80, 0x78,
    INVON, 0x00,
    PWCTRL3, 0x02, 0x00, 0x33,
    PIXFMT, 0x02, 0x00, 0x55,
    DFUNCTR, 0x06, 0x00, 0x02, 0x00, 0x02, 0x00, 0x3b,
    SLPOUT, 0x80, 0x05,
    DISPON, 0x00,
    MADCTL, 0x02, 0x00,
];

/// Capacity for an assembled sequence.
pub const MAX_SEQUENCE_LEN: usize = 48;

/// Bus the controller is wired to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusWidth {
    Eight,
    Sixteen,
}

/// Panel size and MADCTL value for one rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: u16,
    pub height: u16,
    pub madctl: Madctl,
}

const ROTATIONS: [(u16, Geometry); 4] = [
    (
        0,
        Geometry {
            width: 480,
            height: 320,
            madctl: Madctl::ROW_ORDER
                .union(Madctl::COL_ORDER)
                .union(Madctl::SWAP_XY)
                .union(Madctl::RGB_BGR),
        },
    ),
    (
        90,
        Geometry {
            width: 320,
            height: 480,
            madctl: Madctl::COL_ORDER.union(Madctl::RGB_BGR),
        },
    ),
    (
        180,
        Geometry {
            width: 480,
            height: 320,
            madctl: Madctl::SWAP_XY.union(Madctl::RGB_BGR),
        },
    ),
    (
        270,
        Geometry {
            width: 320,
            height: 480,
            madctl: Madctl::ROW_ORDER.union(Madctl::RGB_BGR),
        },
    ),
];

const LEN_8: usize = INIT_SEQUENCE.len() + 1;
const LEN_16: usize = INIT_SEQUENCE_16.len() + 1;

/// `base` with each rotation's MADCTL value appended, in table order.
const fn assemble<const N: usize>(base: &[u8]) -> [[u8; N]; ROTATIONS.len()] {
    assert!(base.len() + 1 == N);
    let mut out = [[0u8; N]; ROTATIONS.len()];
    let mut r = 0;
    while r < ROTATIONS.len() {
        let mut i = 0;
        while i < base.len() {
            out[r][i] = base[i];
            i += 1;
        }
        out[r][N - 1] = ROTATIONS[r].1.madctl.byte();
        r += 1;
    }
    out
}

const fn all_well_formed<const N: usize>(sequences: &[[u8; N]]) -> bool {
    let mut r = 0;
    while r < sequences.len() {
        if !init_sequence::is_well_formed(&sequences[r]) {
            return false;
        }
        r += 1;
    }
    true
}

const ASSEMBLED_8: [[u8; LEN_8]; ROTATIONS.len()] = assemble(INIT_SEQUENCE);
const ASSEMBLED_16: [[u8; LEN_16]; ROTATIONS.len()] = assemble(INIT_SEQUENCE_16);
const _: () = assert!(all_well_formed(&ASSEMBLED_8));
const _: () = assert!(all_well_formed(&ASSEMBLED_16));
const _: () = assert!(LEN_16 <= MAX_SEQUENCE_LEN);

static SEQUENCES_8: [[u8; LEN_8]; ROTATIONS.len()] = ASSEMBLED_8;
static SEQUENCES_16: [[u8; LEN_16]; ROTATIONS.len()] = ASSEMBLED_16;

fn rotation_index(rotation: u16) -> Option<usize> {
    ROTATIONS.iter().position(|&(r, _)| r == rotation)
}

/// Geometry for `rotation` degrees; `None` unless 0, 90, 180 or 270.
pub fn geometry(rotation: u16) -> Option<Geometry> {
    rotation_index(rotation).map(|i| ROTATIONS[i].1)
}

/// Complete init sequence for `rotation` on the given bus, as static data.
pub fn sequence(rotation: u16, bus: BusWidth) -> Option<InitSequence<'static>> {
    let i = rotation_index(rotation)?;
    Some(match bus {
        BusWidth::Eight => InitSequence::new(&SEQUENCES_8[i]),
        BusWidth::Sixteen => InitSequence::new(&SEQUENCES_16[i]),
    })
}

/// Complete init sequence for `rotation` on the given bus, as an owned copy.
pub fn init_sequence(rotation: u16, bus: BusWidth) -> Option<Vec<u8, MAX_SEQUENCE_LEN>> {
    Vec::from_slice(sequence(rotation, bus)?.as_bytes()).ok()
}

/// Display configuration for the panel at `rotation` degrees.
///
/// Width and height are the rotation's; the rotation handed to the display
/// core is 0. No backlight pin is set; boards that drive one fill in
/// `backlight_pin` themselves.
pub fn display_config(rotation: u16, bus: BusWidth) -> Option<DisplayConfig> {
    let geometry = geometry(rotation)?;
    Some(DisplayConfig {
        width: geometry.width,
        height: geometry.height,
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
        init_sequence: sequence(rotation, bus)?,
        backlight_pin: None,
        brightness_command: None,
        brightness: 1.0,
        single_byte_bounds: false,
        data_as_commands: false,
        auto_refresh: true,
        native_frames_per_second: 60,
        backlight_on_high: true,
        sh1107_addressing: false,
        backlight_pwm_frequency_hz: 50_000,
    })
}

/// Check that an assembled sequence ends with MADCTL.
pub fn ends_with_madctl(sequence: InitSequence<'_>) -> bool {
    sequence
        .last_step()
        .is_some_and(|step| step.command() == MADCTL && !step.data().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_table_bytes() {
        let bytes: heapless::Vec<(u16, u8), 4> = ROTATIONS
            .iter()
            .map(|(r, g)| (*r, g.madctl.byte()))
            .collect();
        assert_eq!(
            bytes.as_slice(),
            &[(0, 0xE8), (90, 0x48), (180, 0x28), (270, 0x88)]
        );
    }

    #[test]
    fn quarter_turns_are_portrait() {
        assert_eq!(geometry(0).map(|g| (g.width, g.height)), Some((480, 320)));
        assert_eq!(geometry(90).map(|g| (g.width, g.height)), Some((320, 480)));
        assert_eq!(geometry(270).map(|g| (g.width, g.height)), Some((320, 480)));
    }

    #[test]
    fn unknown_rotation() {
        assert_eq!(geometry(45), None);
        assert_eq!(init_sequence(45, BusWidth::Eight), None);
    }

    #[test]
    fn base_sequences_are_incomplete_without_madctl() {
        assert!(!init_sequence::is_well_formed(INIT_SEQUENCE));
        assert!(!init_sequence::is_well_formed(INIT_SEQUENCE_16));
    }

    #[test]
    fn assembled_sequence_is_well_formed() {
        for rotation in [0, 90, 180, 270] {
            for bus in [BusWidth::Eight, BusWidth::Sixteen] {
                let seq = init_sequence(rotation, bus).unwrap();
                assert!(init_sequence::is_well_formed(&seq), "{rotation} {bus:?}");
                assert!(ends_with_madctl(InitSequence::new(&seq)));
            }
        }
    }

    #[test]
    fn sixteen_bit_sequence_is_widened_eight_bit() {
        for rotation in [0, 90, 180, 270] {
            let narrow = init_sequence(rotation, BusWidth::Eight).unwrap();
            let wide = init_sequence(rotation, BusWidth::Sixteen).unwrap();
            let widened: Vec<u8, MAX_SEQUENCE_LEN> =
                init_sequence::widen_16bit(InitSequence::new(&narrow)).unwrap();
            assert_eq!(widened, wide);
        }
    }

    #[test]
    fn landscape_eight_bit_tail() {
        let seq = init_sequence(0, BusWidth::Eight).unwrap();
        assert_eq!(&seq[seq.len() - 3..], &[MADCTL, 0x01, 0xE8]);
    }

    #[test]
    fn static_sequence_matches_owned_copy() {
        for rotation in [0, 90, 180, 270] {
            for bus in [BusWidth::Eight, BusWidth::Sixteen] {
                let owned = init_sequence(rotation, bus).unwrap();
                let seq = sequence(rotation, bus).unwrap();
                assert_eq!(seq.as_bytes(), owned.as_slice());
            }
        }
        assert!(sequence(45, BusWidth::Sixteen).is_none());
    }

    #[test]
    fn display_config_takes_rotated_size() {
        let config = display_config(90, BusWidth::Sixteen).unwrap();
        assert_eq!((config.width, config.height), (320, 480));
        assert_eq!(config.rotation, 0);
        assert_eq!(config.logical_size(), (320, 480));
        assert!(ends_with_madctl(config.init_sequence));
        assert_eq!(config.init_sequence.as_bytes().last(), Some(&0x48));
        assert_eq!(config.validate(), Ok(()));

        assert_eq!(display_config(0, BusWidth::Eight).map(|c| c.width), Some(480));
        assert!(display_config(45, BusWidth::Eight).is_none());
    }

    #[test]
    fn display_config_constructs_through_platform() {
        use crate::display::ParallelBusConfig;
        use crate::pins::PinRef;
        use crate::platform::{DisplayPool, Platform};

        const BUS: ParallelBusConfig = ParallelBusConfig {
            data0: PinRef::gpio(0),
            command: PinRef::gpio(8),
            chip_select: PinRef::gpio(9),
            write: PinRef::gpio(10),
            read: None,
            reset: Some(PinRef::gpio(15)),
            frequency_hz: 20_000_000,
        };

        let mut pool: DisplayPool<1, 1> = DisplayPool::new();
        let bus = pool.allocate_display_bus().unwrap();
        pool.construct_parallel_bus(bus, &BUS).unwrap();
        let slot = pool.allocate_display().unwrap();
        let config = display_config(270, BusWidth::Sixteen).unwrap();
        pool.construct_display(slot, bus, &config).unwrap();

        let (_, stored) = pool.display(slot).unwrap();
        assert_eq!((stored.width, stored.height), (320, 480));
        assert_eq!(stored.init_sequence.as_bytes().last(), Some(&0x88));
    }

    #[test]
    fn step_delays() {
        let seq = init_sequence(0, BusWidth::Sixteen).unwrap();
        let delays: heapless::Vec<(u8, u16), 4> = InitSequence::new(&seq)
            .steps()
            .map(|s| s.unwrap())
            .filter_map(|s| s.delay_ms().map(|ms| (s.command(), ms)))
            .collect();
        assert_eq!(delays.as_slice(), &[(SWRESET, 120), (SLPOUT, 5)]);
    }
}
