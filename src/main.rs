//! boardkit firmware
//!
//! Brings up the compiled-in board through its lifecycle hooks, reports
//! its identity over the serial console as NDJSON, then answers host
//! queries read from USB serial and pushes a status line periodically.

#![no_std]
#![no_main]

use esp_backtrace as _;

esp_bootloader_esp_idf::esp_app_desc!();

pub(crate) use boardkit::{board, comm, platform, protocol};

use board::{ActiveBoard, Board};
use comm::LineReader;
use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Instant, Timer};
use esp_hal::interrupt::software::SoftwareInterruptControl;
use esp_hal::timer::timg::TimerGroup;
use esp_hal::usb_serial_jtag::UsbSerialJtag;
use platform::DisplayPool;
use protocol::{DeviceMessage, MsgBuffer, MAX_MSG_LEN, VERSION};

/// Write a message to the serial console as one NDJSON line.
fn emit(msg: &DeviceMessage) {
    let mut buf = MsgBuffer::new();
    buf.resize_default(MAX_MSG_LEN).ok();
    match comm::serialize_message(msg, &mut buf) {
        Some(len) => {
            buf.truncate(len);
            if let Ok(s) = core::str::from_utf8(&buf) {
                log::info!("{}", s.trim_end());
            }
        }
        None => log::warn!("Message did not fit in {} bytes", MAX_MSG_LEN),
    }
}

fn uptime_secs() -> u32 {
    (Instant::now().as_millis() / 1000) as u32
}

#[esp_rtos::main]
async fn main(_spawner: embassy_executor::Spawner) {
    esp_println::logger::init_logger_from_env();

    let peripherals = esp_hal::init(esp_hal::Config::default());

    // The RTOS needs a timer and a software interrupt
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let sw_int = SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    esp_rtos::start(timg0.timer0, sw_int.software_interrupt0);

    log::info!(
        "boardkit v{} starting on {} ({})",
        VERSION,
        board::BOARD_NAME,
        board::MCU_NAME
    );

    let mut pool: DisplayPool<1, 1> = DisplayPool::new();
    let mut active = ActiveBoard::new();

    if active.requests_safe_mode() {
        log::warn!("Board requested safe mode");
    }

    if let Err(e) = active.init(&mut pool) {
        panic!("board init failed: {}", e);
    }
    log::info!(
        "{} display bus(es), {} display(s) active",
        pool.active_buses(),
        pool.active_displays()
    );

    emit(&comm::board_report(&active));

    // Host queries arrive on USB serial; replies go out through the logger
    let (mut serial_rx, _serial_tx) = UsbSerialJtag::new(peripherals.USB_DEVICE)
        .into_async()
        .split();
    let mut line_reader = LineReader::new();
    let mut rx_buf = [0u8; 64];

    let status_every = Duration::from_secs(comm::STATUS_INTERVAL_SECS);
    let mut next_status = Instant::now() + status_every;

    loop {
        let read = embedded_io_async::Read::read(&mut serial_rx, &mut rx_buf);
        match select(Timer::at(next_status), read).await {
            Either::First(()) => {
                next_status += status_every;
                emit(&comm::status_report(&active, uptime_secs()));
            }
            Either::Second(Ok(n)) => {
                for &byte in &rx_buf[..n] {
                    if let Some(line) = line_reader.feed(byte) {
                        if let Some(query) = comm::parse_query(line) {
                            emit(&comm::handle_query(&query, &active, uptime_secs()));
                        }
                    }
                }
            }
            Either::Second(Err(e)) => log::warn!("USB serial read failed: {:?}", e),
        }
    }
}
