/// Display controller init sequences.
///
/// A sequence is a flat byte array sent once at power-up. Each step is
/// encoded as
///
/// ```text
/// command, flags_len, data[flags_len & 0x7F], [wait]
/// ```
///
/// The low seven bits of `flags_len` are the data length. Bit [`DELAY`]
/// overloads the same byte: when set, one wait byte follows the data and the
/// controller must be given that many milliseconds (`0xFF` meaning 500 ms)
/// before the next step. Every reader of this format goes through
/// [`decode_step`], so all boards share one decoder.
use core::fmt;

use heapless::Vec;

/// Flag bit in the length byte marking a trailing wait byte.
pub const DELAY: u8 = 0x80;

/// Mask for the data length in the length byte.
pub const LEN_MASK: u8 = 0x7F;

/// Wait byte value that stands for [`LONG_DELAY_MS`] instead of 255 ms.
pub const LONG_DELAY: u8 = 0xFF;

/// Delay in milliseconds encoded by a [`LONG_DELAY`] wait byte.
pub const LONG_DELAY_MS: u16 = 500;

/// Longest data payload a single step can carry.
pub const MAX_DATA_LEN: usize = LEN_MASK as usize;

/// One decoded step of an init sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStep<'a> {
    /// Register write: send `command` followed by `data`.
    Command { command: u8, data: &'a [u8] },
    /// Register write followed by a wait. `wait` is the raw byte as stored
    /// in the array; use [`InitStep::delay_ms`] for the duration.
    Delay {
        command: u8,
        data: &'a [u8],
        wait: u8,
    },
}

impl<'a> InitStep<'a> {
    pub fn command(&self) -> u8 {
        match *self {
            InitStep::Command { command, .. } | InitStep::Delay { command, .. } => command,
        }
    }

    pub fn data(&self) -> &'a [u8] {
        match *self {
            InitStep::Command { data, .. } | InitStep::Delay { data, .. } => data,
        }
    }

    pub fn is_delay(&self) -> bool {
        matches!(self, InitStep::Delay { .. })
    }

    /// Milliseconds to wait after this step, if it is a delay step.
    pub fn delay_ms(&self) -> Option<u16> {
        match *self {
            InitStep::Command { .. } => None,
            InitStep::Delay { wait: LONG_DELAY, .. } => Some(LONG_DELAY_MS),
            InitStep::Delay { wait, .. } => Some(u16::from(wait)),
        }
    }

    /// Number of bytes this step occupies in the flat array.
    pub fn encoded_len(&self) -> usize {
        2 + self.data().len() + usize::from(self.is_delay())
    }

    /// Append the flat encoding of this step to `out`.
    pub fn encode_into<const N: usize>(&self, out: &mut Vec<u8, N>) -> Result<(), SequenceError> {
        let data = self.data();
        if data.len() > MAX_DATA_LEN {
            return Err(SequenceError::DataTooLong { len: data.len() });
        }
        let mut flags_len = data.len() as u8;
        if self.is_delay() {
            flags_len |= DELAY;
        }
        out.push(self.command()).map_err(|_| SequenceError::BufferFull)?;
        out.push(flags_len).map_err(|_| SequenceError::BufferFull)?;
        out.extend_from_slice(data)
            .map_err(|_| SequenceError::BufferFull)?;
        if let InitStep::Delay { wait, .. } = *self {
            out.push(wait).map_err(|_| SequenceError::BufferFull)?;
        }
        Ok(())
    }
}

/// Malformed or unencodable init sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceError {
    /// The step starting at `offset` runs past the end of the array.
    Truncated { offset: usize },
    /// A payload does not fit the 7-bit length field.
    DataTooLong { len: usize },
    /// The output buffer is full.
    BufferFull,
}

impl fmt::Display for SequenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceError::Truncated { offset } => {
                write!(f, "init sequence step at byte {} is truncated", offset)
            }
            SequenceError::DataTooLong { len } => {
                write!(f, "step payload of {} bytes exceeds {}", len, MAX_DATA_LEN)
            }
            SequenceError::BufferFull => write!(f, "init sequence buffer full"),
        }
    }
}

/// Footprint of the step starting at `offset`, or `None` if it does not fit.
///
/// `const` so that board tables can be checked at build time; the runtime
/// decoder uses the same arithmetic.
pub const fn step_footprint(bytes: &[u8], offset: usize) -> Option<usize> {
    // Compare against the bytes left so no offset can overflow
    if offset >= bytes.len() || bytes.len() - offset < 2 {
        return None;
    }
    let flags_len = bytes[offset + 1];
    let mut len = 2 + (flags_len & LEN_MASK) as usize;
    if flags_len & DELAY != 0 {
        len += 1;
    }
    if bytes.len() - offset < len {
        return None;
    }
    Some(len)
}

/// Whether `bytes` splits into whole steps with nothing left over.
pub const fn is_well_formed(bytes: &[u8]) -> bool {
    let mut offset = 0;
    while offset < bytes.len() {
        match step_footprint(bytes, offset) {
            Some(len) => offset += len,
            None => return false,
        }
    }
    true
}

/// Decode the step starting at `offset`. Returns the step and the offset of
/// the next one.
pub fn decode_step(bytes: &[u8], offset: usize) -> Result<(InitStep<'_>, usize), SequenceError> {
    let len = step_footprint(bytes, offset).ok_or(SequenceError::Truncated { offset })?;
    let command = bytes[offset];
    let flags_len = bytes[offset + 1];
    let data_len = (flags_len & LEN_MASK) as usize;
    let data = &bytes[offset + 2..offset + 2 + data_len];
    let step = if flags_len & DELAY != 0 {
        InitStep::Delay {
            command,
            data,
            wait: bytes[offset + 2 + data_len],
        }
    } else {
        InitStep::Command { command, data }
    };
    Ok((step, offset + len))
}

/// A borrowed init sequence in its flat encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitSequence<'a> {
    bytes: &'a [u8],
}

impl<'a> InitSequence<'a> {
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub const fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn steps(&self) -> Steps<'a> {
        Steps {
            bytes: self.bytes,
            offset: 0,
            failed: false,
        }
    }

    /// Check the whole array and return its step count.
    pub fn validate(&self) -> Result<usize, SequenceError> {
        self.steps().try_fold(0, |count, step| step.map(|_| count + 1))
    }

    pub fn last_step(&self) -> Option<InitStep<'a>> {
        self.steps().filter_map(Result::ok).last()
    }
}

/// Iterator over the steps of an [`InitSequence`]. Yields one error and then
/// stops if the array is malformed.
pub struct Steps<'a> {
    bytes: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> Iterator for Steps<'a> {
    type Item = Result<InitStep<'a>, SequenceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.bytes.len() {
            return None;
        }
        match decode_step(self.bytes, self.offset) {
            Ok((step, next)) => {
                self.offset = next;
                Some(Ok(step))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Encode `steps` into a flat array.
pub fn encode<const N: usize>(steps: &[InitStep<'_>]) -> Result<Vec<u8, N>, SequenceError> {
    let mut out = Vec::new();
    for step in steps {
        step.encode_into(&mut out)?;
    }
    Ok(out)
}

/// Re-encode a sequence for a controller wired to a 16-bit bus: every data
/// byte is sent as a `0x00` high byte followed by the original value, so
/// each length doubles. Commands and wait bytes are unchanged.
pub fn widen_16bit<const N: usize>(sequence: InitSequence<'_>) -> Result<Vec<u8, N>, SequenceError> {
    let mut out: Vec<u8, N> = Vec::new();
    for step in sequence.steps() {
        let step = step?;
        let data = step.data();
        let wide_len = data.len() * 2;
        if wide_len > MAX_DATA_LEN {
            return Err(SequenceError::DataTooLong { len: wide_len });
        }
        let mut flags_len = wide_len as u8;
        if step.is_delay() {
            flags_len |= DELAY;
        }
        out.push(step.command()).map_err(|_| SequenceError::BufferFull)?;
        out.push(flags_len).map_err(|_| SequenceError::BufferFull)?;
        for &b in data {
            out.extend_from_slice(&[0x00, b])
                .map_err(|_| SequenceError::BufferFull)?;
        }
        if let InitStep::Delay { wait, .. } = step {
            out.push(wait).map_err(|_| SequenceError::BufferFull)?;
        }
    }
    Ok(out)
}
