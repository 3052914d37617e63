/// Memory access control (MADCTL) register flags.
///
/// MADCTL sets scan direction, axis swap and colour channel order on
/// MIPI-DCS style controllers (ST7789, ILI9488, ...). The value depends on
/// how the panel is physically mounted, so each board computes its own mask
/// from these flags instead of copying another board's byte.
use bitflags::bitflags;

/// MADCTL command byte.
pub const MADCTL: u8 = 0x36;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Madctl: u8 {
        /// MY: bottom-to-top row address order
        const ROW_ORDER = 0b1000_0000;
        /// MX: right-to-left column address order
        const COL_ORDER = 0b0100_0000;
        /// MV: swap row and column
        const SWAP_XY = 0b0010_0000;
        /// ML: vertical refresh order
        const SCAN_ORDER = 0b0001_0000;
        /// BGR colour filter order
        const RGB_BGR = 0b0000_1000;
        /// MH: horizontal refresh order
        const HORIZ_ORDER = 0b0000_0100;
    }
}

/// Flag-to-bit mapping, in register bit order.
pub static MADCTL_FLAGS: &[(&str, Madctl)] = &[
    ("ROW_ORDER", Madctl::ROW_ORDER),
    ("COL_ORDER", Madctl::COL_ORDER),
    ("SWAP_XY", Madctl::SWAP_XY),
    ("SCAN_ORDER", Madctl::SCAN_ORDER),
    ("RGB_BGR", Madctl::RGB_BGR),
    ("HORIZ_ORDER", Madctl::HORIZ_ORDER),
];

impl Madctl {
    /// Register value written after the MADCTL command.
    pub const fn byte(self) -> u8 {
        self.bits()
    }

    /// Names of the set flags, in register bit order.
    pub fn flag_names(self) -> impl Iterator<Item = &'static str> {
        MADCTL_FLAGS
            .iter()
            .filter(move |(_, flag)| self.contains(*flag))
            .map(|(name, _)| *name)
    }
}
