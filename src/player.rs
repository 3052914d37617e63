/// Replays an init sequence into a display interface.
///
/// Steps go out strictly in array order. Delay steps send their command
/// first and then block for the decoded wait. A malformed sequence is
/// rejected before the first byte is sent, so the controller never sees a
/// partial bring-up.
use core::fmt;

use embedded_hal::delay::DelayNs;

use crate::init_sequence::{InitSequence, SequenceError};

/// Something that can send a command byte with its parameters.
pub trait CommandSink {
    type Error: fmt::Debug;

    fn send_command(&mut self, command: u8, data: &[u8]) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayError<E> {
    Sequence(SequenceError),
    Bus(E),
}

impl<E: fmt::Debug> fmt::Display for PlayError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayError::Sequence(e) => write!(f, "{}", e),
            PlayError::Bus(e) => write!(f, "bus error: {:?}", e),
        }
    }
}

/// Send every step of `sequence`. Returns the number of steps sent.
pub fn play<S, D>(sequence: InitSequence<'_>, sink: &mut S, delay: &mut D) -> Result<usize, PlayError<S::Error>>
where
    S: CommandSink,
    D: DelayNs,
{
    let total = sequence.validate().map_err(PlayError::Sequence)?;
    log::debug!("Playing {} init steps ({} bytes)", total, sequence.len());

    let mut sent = 0;
    for step in sequence.steps() {
        let step = step.map_err(PlayError::Sequence)?;
        sink.send_command(step.command(), step.data())
            .map_err(PlayError::Bus)?;
        if let Some(ms) = step.delay_ms() {
            delay.delay_ms(u32::from(ms));
        }
        sent += 1;
    }
    Ok(sent)
}

/// Adapter for any mipidsi display interface (SPI, parallel GPIO, ...).
#[cfg(feature = "mipidsi")]
pub struct InterfaceSink<DI>(pub DI);

#[cfg(feature = "mipidsi")]
impl<DI: mipidsi::interface::Interface> CommandSink for InterfaceSink<DI> {
    type Error = DI::Error;

    fn send_command(&mut self, command: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.0.send_command(command, data)
    }
}
