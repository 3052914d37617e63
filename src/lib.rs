//! boardkit: board support tables and display bring-up.
//!
//! Static per-board data (identity, pin export tables, display controller
//! init sequences) plus the one-shot lifecycle hooks that wire a display to
//! the platform's display-resource pool. Everything here is `no_std`, uses no
//! allocator, and is testable on any host with `cargo test`. The firmware
//! binary (`src/main.rs`) is a thin consumer for the ESP32-S3 board.
//!
//! The library is organized in three layers:
//! - **Data**: `init_sequence`, `madctl`, `pins`, `display`. Byte formats,
//!   register flags and configuration records shared by every board.
//! - **Boards**: `board`, `boards`. Per-board constants and the
//!   compile-time selection of the active board.
//! - **Glue**: `platform`, `player`, `protocol`, `comm`, `ili9488`. The
//!   platform contract, sequence replay and host introspection.

#![cfg_attr(not(test), no_std)]

pub mod board;
pub mod boards;
pub mod comm;
pub mod display;
pub mod ili9488;
pub mod init_sequence;
pub mod madctl;
pub mod pins;
pub mod platform;
pub mod player;
pub mod protocol;
