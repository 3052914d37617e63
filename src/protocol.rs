/// JSON message protocol between the board and a host-side tool.
///
/// All messages are newline-delimited JSON (NDJSON) on the serial console.
/// Uses `heapless` types for no_std/no-alloc operation.
use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

/// Maximum length of a pin name in a host query
pub type PinName = String<32>;

/// Messages sent from the board to the host
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum DeviceMessage<'a> {
    /// Board identity report
    #[serde(rename = "board")]
    Board {
        name: &'static str,
        mcu: &'static str,
        /// Firmware version
        version: &'static str,
        /// Number of entries in the pin export table
        pins: u16,
        /// Whether the board exports an onboard display
        display: bool,
    },
    /// Result of a pin lookup
    #[serde(rename = "pin")]
    Pin {
        name: &'a str,
        /// Object kind: "pin", "board_id", "i2c", "uart", "display"
        #[serde(skip_serializing_if = "Option::is_none")]
        object: Option<&'static str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        gpio: Option<u8>,
        /// Display pool slot, for display objects
        #[serde(skip_serializing_if = "Option::is_none")]
        slot: Option<u8>,
        found: bool,
    },
    /// Periodic status report
    #[serde(rename = "status")]
    Status {
        board: &'static str,
        /// Uptime in seconds
        uptime: u32,
        safe_mode: bool,
    },
}

/// Queries sent from the host to the board.
///
/// Deserialized via [`RawQuery`] in `comm::parse_query()` because
/// `serde_json_core` does not support internally tagged enums.
#[derive(Debug, PartialEq)]
pub enum HostQuery {
    /// Report board identity
    Board,
    /// Look up one name in the pin export table
    Pin { name: PinName },
    /// Report status
    Status,
}

/// Wire format for host queries.
#[derive(Deserialize)]
pub(crate) struct RawQuery {
    pub cmd: String<16>,
    #[serde(default)]
    pub name: Option<PinName>,
}

/// Firmware version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum size of a serialized JSON message
pub const MAX_MSG_LEN: usize = 256;

/// Buffer type for serialized JSON messages
pub type MsgBuffer = Vec<u8, MAX_MSG_LEN>;
