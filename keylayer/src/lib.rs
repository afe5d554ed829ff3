//! Key-layer engine for keyboard firmware.
//!
//! Resolves physical key positions into actions through a stack of layers, composes tri-layers and decides
//! between the tap and hold roles of dual-role keys. Matrix scanning and the HID transport live outside this
//! crate: key events come in through [`keyboard::Keyboard::process`], keycodes go out through a
//! [`report::Reporter`].
#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
#[macro_use]
mod fmt;

pub use keylayer_types as types;

pub mod config;
pub mod error;
pub mod event;
pub mod keyboard;
pub mod keymap;
pub mod layer;
pub mod layout_macro;
pub mod report;
pub mod storage;
pub mod tap_hold;

pub use error::Error;
