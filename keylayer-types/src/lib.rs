//! # keylayer types
//!
//! Fundamental type definitions shared by the keylayer core and the keymaps built on it.
//!
//! - [`action`] - Key actions stored in keymaps (simple keys, layer keys, dual-role keys, custom actions)
//! - [`keycode`] - HID keycodes
//! - [`modifier`] - Modifier key combinations

#![no_std]

pub mod action;
pub mod keycode;
pub mod modifier;
