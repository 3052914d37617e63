//! Per-board definitions.
//!
//! Every board is always compiled so that host tests cover all of them;
//! [`crate::board`] picks the one the firmware is built for.

pub mod tufty2040;
pub mod waveshare_s3_pico;
