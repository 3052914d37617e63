/// Serial NDJSON transport for board introspection.
///
/// The host sends one query per line; the board answers with one
/// [`DeviceMessage`] per line. The firmware also pushes a status line
/// periodically.
use heapless::Vec;

use crate::board::Board;
use crate::pins::BoardObject;
use crate::protocol::{DeviceMessage, HostQuery, RawQuery, MAX_MSG_LEN, VERSION};

/// Interval between unsolicited status reports, in seconds
pub const STATUS_INTERVAL_SECS: u64 = 30;

// ── Serialization helpers ──────────────────────────────────────────────

/// Serialize a DeviceMessage to JSON bytes and write to the output buffer.
/// Returns the number of bytes written, or None if the message (plus its
/// newline) does not fit.
pub fn serialize_message(msg: &DeviceMessage, buf: &mut [u8]) -> Option<usize> {
    let len = serde_json_core::to_slice(msg, buf).ok()?;
    let newline = buf.get_mut(len)?;
    *newline = b'\n';
    Some(len + 1)
}

/// Deserialize a HostQuery from a JSON byte slice.
pub fn parse_query(data: &[u8]) -> Option<HostQuery> {
    let trimmed = trim_trailing_whitespace(data);
    if trimmed.is_empty() {
        return None;
    }
    let (raw, _) = serde_json_core::from_slice::<RawQuery>(trimmed).ok()?;
    match raw.cmd.as_str() {
        "board" => Some(HostQuery::Board),
        "pin" => raw.name.map(|name| HostQuery::Pin { name }),
        "status" => Some(HostQuery::Status),
        other => {
            log::debug!("Ignoring unknown query {}", other);
            None
        }
    }
}

/// Answer a host query. Names resolve through the board, so `DISPLAY`
/// reports the slot the board actually constructed.
pub fn handle_query<'a, B: Board>(query: &'a HostQuery, board: &B, uptime: u32) -> DeviceMessage<'a> {
    match query {
        HostQuery::Board => board_report(board),
        HostQuery::Pin { name } => {
            let object = board.resolve(name);
            DeviceMessage::Pin {
                name: name.as_str(),
                object: object.map(|o| o.kind()),
                gpio: object.and_then(|o| o.as_pin()).map(|p| p.number()),
                slot: match object {
                    Some(BoardObject::Display(slot)) => Some(slot),
                    _ => None,
                },
                found: object.is_some(),
            }
        }
        HostQuery::Status => status_report(board, uptime),
    }
}

/// Identity report, sent once after boot and on request.
pub fn board_report<B: Board>(board: &B) -> DeviceMessage<'static> {
    let pins = board.pins();
    DeviceMessage::Board {
        name: B::IDENTITY.name,
        mcu: B::IDENTITY.mcu_name,
        version: VERSION,
        pins: u16::try_from(pins.len()).unwrap_or(u16::MAX),
        display: pins.lookup("DISPLAY").is_some(),
    }
}

pub fn status_report<B: Board>(board: &B, uptime: u32) -> DeviceMessage<'static> {
    DeviceMessage::Status {
        board: B::IDENTITY.name,
        uptime,
        safe_mode: board.requests_safe_mode(),
    }
}

// ── Line reader ────────────────────────────────────────────────────────

/// Splits a serial byte stream into query lines.
///
/// A line longer than [`MAX_MSG_LEN`] can't be a valid query; it is dropped
/// whole, up to and including its terminator.
pub struct LineReader {
    line: Vec<u8, MAX_MSG_LEN>,
    /// The previous call handed out `line`; empty it before reuse.
    delivered: bool,
    overflowed: bool,
}

impl LineReader {
    pub const fn new() -> Self {
        Self {
            line: Vec::new(),
            delivered: false,
            overflowed: false,
        }
    }

    /// Feed one byte. Returns the finished line, without its terminator,
    /// when `byte` ends a non-empty line.
    pub fn feed(&mut self, byte: u8) -> Option<&[u8]> {
        if core::mem::take(&mut self.delivered) {
            self.line.clear();
        }
        if !matches!(byte, b'\n' | b'\r') {
            if !self.overflowed && self.line.push(byte).is_err() {
                log::warn!("Query longer than {} bytes discarded", MAX_MSG_LEN);
                self.overflowed = true;
            }
            return None;
        }
        if core::mem::take(&mut self.overflowed) {
            self.line.clear();
            return None;
        }
        if self.line.is_empty() {
            return None;
        }
        self.delivered = true;
        Some(self.line.as_slice())
    }
}

impl Default for LineReader {
    fn default() -> Self {
        Self::new()
    }
}

fn trim_trailing_whitespace(data: &[u8]) -> &[u8] {
    let end = data
        .iter()
        .rposition(|b| !matches!(b, b' ' | b'\n' | b'\r' | b'\t'))
        .map_or(0, |i| i + 1);
    &data[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boards::{tufty2040::Tufty2040, waveshare_s3_pico::WaveshareS3Pico};
    use crate::platform::{DisplayPool, Platform};
    use crate::protocol::{MsgBuffer, PinName};

    fn render(msg: &DeviceMessage) -> MsgBuffer {
        let mut buf = [0u8; MAX_MSG_LEN];
        let len = serialize_message(msg, &mut buf).unwrap();
        MsgBuffer::from_slice(&buf[..len]).unwrap()
    }

    fn as_str(buf: &MsgBuffer) -> &str {
        core::str::from_utf8(buf).unwrap()
    }

    // ── parse_query ────────────────────────────────────────────────

    #[test]
    fn parse_board_query() {
        assert_eq!(parse_query(br#"{"cmd":"board"}"#), Some(HostQuery::Board));
    }

    #[test]
    fn parse_status_query_with_trailing_newline() {
        assert_eq!(parse_query(b"{\"cmd\":\"status\"}\r\n"), Some(HostQuery::Status));
    }

    #[test]
    fn parse_pin_query() {
        assert_eq!(
            parse_query(br#"{"cmd":"pin","name":"LCD_CS"}"#),
            Some(HostQuery::Pin {
                name: PinName::try_from("LCD_CS").unwrap()
            })
        );
    }

    #[test]
    fn pin_query_without_name_is_ignored() {
        assert_eq!(parse_query(br#"{"cmd":"pin"}"#), None);
    }

    #[test]
    fn unknown_query_is_ignored() {
        assert_eq!(parse_query(br#"{"cmd":"reboot"}"#), None);
    }

    #[test]
    fn garbage_is_ignored() {
        assert_eq!(parse_query(b"not json"), None);
        assert_eq!(parse_query(b"   \n"), None);
        assert_eq!(parse_query(b""), None);
    }

    // ── handle_query ───────────────────────────────────────────────

    #[test]
    fn board_report_for_tufty() {
        let board = Tufty2040::new();
        let out = render(&handle_query(&HostQuery::Board, &board, 0));
        let json = as_str(&out);
        assert!(json.contains(r#""name":"Pimoroni Tufty 2040""#));
        assert!(json.contains(r#""mcu":"rp2040""#));
        assert!(json.contains(r#""pins":36"#));
        assert!(json.contains(r#""display":true"#));
        assert!(json.ends_with('\n'));
    }

    #[test]
    fn board_report_for_waveshare() {
        let board = WaveshareS3Pico::new();
        let out = render(&board_report(&board));
        let json = as_str(&out);
        assert!(json.contains(r#""mcu":"ESP32S3""#));
        assert!(json.contains(r#""display":false"#));
    }

    #[test]
    fn pin_lookup_hit() {
        let board = Tufty2040::new();
        let query = HostQuery::Pin {
            name: PinName::try_from("LCD_CS").unwrap(),
        };
        let out = render(&handle_query(&query, &board, 0));
        let json = as_str(&out);
        assert!(json.contains(r#""gpio":10"#));
        assert!(json.contains(r#""found":true"#));
    }

    #[test]
    fn pin_lookup_non_pin_object() {
        let board = Tufty2040::new();
        let query = HostQuery::Pin {
            name: PinName::try_from("I2C").unwrap(),
        };
        let out = render(&handle_query(&query, &board, 0));
        let json = as_str(&out);
        assert!(json.contains(r#""object":"i2c""#));
        assert!(!json.contains("gpio"));
    }

    #[test]
    fn pin_lookup_miss() {
        let board = Tufty2040::new();
        let query = HostQuery::Pin {
            name: PinName::try_from("lcd_cs").unwrap(),
        };
        let out = render(&handle_query(&query, &board, 0));
        assert_eq!(as_str(&out), "{\"type\":\"pin\",\"name\":\"lcd_cs\",\"found\":false}\n");
    }

    #[test]
    fn display_query_reports_constructed_slot() {
        let mut pool: DisplayPool<2, 2> = DisplayPool::new();
        pool.allocate_display().unwrap();
        let mut board = Tufty2040::new();
        let query = HostQuery::Pin {
            name: PinName::try_from("DISPLAY").unwrap(),
        };

        let before = render(&handle_query(&query, &board, 0));
        assert!(as_str(&before).contains(r#""found":false"#));

        board.init(&mut pool).unwrap();
        let after = render(&handle_query(&query, &board, 0));
        let json = as_str(&after);
        assert!(json.contains(r#""object":"display""#));
        assert!(json.contains(r#""slot":1"#));
        assert!(json.contains(r#""found":true"#));
    }

    #[test]
    fn status_reports_uptime_and_safe_mode() {
        let board = Tufty2040::new();
        let out = render(&handle_query(&HostQuery::Status, &board, 42));
        let json = as_str(&out);
        assert!(json.contains(r#""uptime":42"#));
        assert!(json.contains(r#""safe_mode":false"#));
    }

    // ── serialize_message ──────────────────────────────────────────

    #[test]
    fn serialize_needs_room_for_newline() {
        let msg = DeviceMessage::Status {
            board: "b",
            uptime: 1,
            safe_mode: false,
        };
        let mut big = [0u8; 64];
        let len = serialize_message(&msg, &mut big).unwrap();
        let mut exact = [0u8; 64];
        assert_eq!(serialize_message(&msg, &mut exact[..len - 1]), None);
        assert_eq!(serialize_message(&msg, &mut exact[..len]), Some(len));
    }

    // ── LineReader ─────────────────────────────────────────────────

    #[test]
    fn line_reader_splits_lines() {
        let mut reader = LineReader::new();
        let mut lines = 0;
        for &b in b"{\"cmd\":\"board\"}\r\n{\"cmd\":\"status\"}\n" {
            if let Some(line) = reader.feed(b) {
                assert!(parse_query(line).is_some());
                lines += 1;
            }
        }
        assert_eq!(lines, 2);
    }

    #[test]
    fn line_reader_drops_overlong_line_whole() {
        let mut reader = LineReader::new();
        for _ in 0..MAX_MSG_LEN + 1 {
            assert!(reader.feed(b'x').is_none());
        }
        // The tail of the overlong line goes too
        for &b in b"{\"cmd\":\"board\"}" {
            assert!(reader.feed(b).is_none());
        }
        assert!(reader.feed(b'\n').is_none());

        for &b in b"ab" {
            reader.feed(b);
        }
        assert_eq!(reader.feed(b'\n'), Some(&b"ab"[..]));
    }

    #[test]
    fn line_reader_skips_blank_lines() {
        let mut reader = LineReader::new();
        assert!(reader.feed(b'\r').is_none());
        assert!(reader.feed(b'\n').is_none());
        reader.feed(b'a');
        assert_eq!(reader.feed(b'\n'), Some(&b"a"[..]));
        reader.feed(b'b');
        assert_eq!(reader.feed(b'\r'), Some(&b"b"[..]));
    }

    #[test]
    fn trim_whitespace() {
        assert_eq!(trim_trailing_whitespace(b"abc \t\r\n"), b"abc");
        assert_eq!(trim_trailing_whitespace(b" \n"), b"");
    }
}
