//! Preonic keymap: a 5x12 ortholinear board with a rotary encoder and two DIP switches.
//!
//! QWERTY, GAME and PROG are the default layers, switched persistently from the adjust layer. LOWER and RAISE
//! are momentary, holding both brings up ADJUST.
#![cfg_attr(not(test), no_std)]

mod handler;
mod keymap;
mod unicode;

pub use handler::{Effect, PreonicHandler, Song, music_mask};
pub use keymap::{
    ACCENT_BASE, COL, CustomKey, Layer, NUM_ENCODER, NUM_LAYER, ROW, get_default_encoder_map, get_default_keymap,
};
pub use unicode::{Accent, UnicodeMode};

use keylayer::Error;
use keylayer::config::BehaviorConfig;
use keylayer::keyboard::Keyboard;
use keylayer::keymap::KeyMap;
use keylayer::types::action::{EncoderAction, KeyAction};

pub type PreonicKeyMap<'a> = KeyMap<'a, ROW, COL, NUM_LAYER, NUM_ENCODER>;
pub type PreonicKeyboard<'a, R, S> = Keyboard<'a, R, S, PreonicHandler, ROW, COL, NUM_LAYER, NUM_ENCODER>;

/// Build the keymap from the layer tables. GAME and PROG are switched to by custom keycodes, so they are
/// registered as default layers here.
pub fn create_keymap<'a>(
    layers: &'a mut [[[KeyAction; COL]; ROW]; NUM_LAYER],
    encoders: &'a mut [[EncoderAction; NUM_ENCODER]; NUM_LAYER],
) -> Result<PreonicKeyMap<'a>, Error> {
    let mut keymap = KeyMap::new(layers, Some(encoders))?;
    keymap.allow_default_layer(Layer::Game as u8)?;
    keymap.allow_default_layer(Layer::Prog as u8)?;
    Ok(keymap)
}

/// LOWER and RAISE update the tri-layer themselves
pub fn behavior_config() -> BehaviorConfig {
    BehaviorConfig {
        tri_layer: None,
        ..Default::default()
    }
}

/// Create the keyboard with the default keymap
pub fn create_keyboard<'a, R: keylayer::report::Reporter, S: keylayer::storage::DefaultLayerStorage>(
    layers: &'a mut [[[KeyAction; COL]; ROW]; NUM_LAYER],
    encoders: &'a mut [[EncoderAction; NUM_ENCODER]; NUM_LAYER],
    reporter: R,
    storage: S,
) -> Result<PreonicKeyboard<'a, R, S>, Error> {
    let keymap = create_keymap(layers, encoders)?;
    Keyboard::new(keymap, behavior_config(), reporter, storage, PreonicHandler::new())
}
