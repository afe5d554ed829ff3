use heapless::Deque;
use keylayer::event::Direction;
use keylayer::keyboard::{LayerControl, UserHandler};
use keylayer::types::action::{Action, KeyAction};
use keylayer::types::keycode::HidKeyCode;
use log::{debug, info, warn};

use crate::keymap::{ACCENT_BASE, CustomKey, Layer};
use crate::unicode::{Accent, UnicodeMode};

const EFFECT_QUEUE_SIZE: usize = 16;

/// Tunes played when the default layer is switched
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Song {
    Qwerty,
    Game,
    Prog,
}

/// Side effects on the board's peripherals, drained by the audio, backlight and unicode drivers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Effect {
    PlaySong(Song),
    BacklightStep,
    /// Type a character through the host's unicode input method
    Unicode { mode: UnicodeMode, code_point: u32 },
    MuseOffset(u8),
    MuseTempo(u16),
}

/// Custom keycodes, encoder and DIP switches of the Preonic.
#[derive(Debug)]
pub struct PreonicHandler {
    effects: Deque<Effect, EFFECT_QUEUE_SIZE>,
    muse_mode: bool,
    muse_offset: u8,
    muse_tempo: u16,
    unicode_mode: UnicodeMode,
}

impl Default for PreonicHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl PreonicHandler {
    pub fn new() -> Self {
        Self {
            effects: Deque::new(),
            muse_mode: false,
            muse_offset: 70,
            muse_tempo: 50,
            unicode_mode: UnicodeMode::default(),
        }
    }

    /// Take the oldest effect
    pub fn take_effect(&mut self) -> Option<Effect> {
        self.effects.pop_front()
    }

    pub fn muse_mode(&self) -> bool {
        self.muse_mode
    }

    pub fn muse_offset(&self) -> u8 {
        self.muse_offset
    }

    pub fn muse_tempo(&self) -> u16 {
        self.muse_tempo
    }

    pub fn unicode_mode(&self) -> UnicodeMode {
        self.unicode_mode
    }

    fn push_effect(&mut self, effect: Effect) {
        if self.effects.is_full() {
            warn!("Effect queue is full, dropping the oldest effect");
            self.effects.pop_front();
        }
        let _ = self.effects.push_back(effect);
    }

    fn switch_default_layer(&mut self, layer: Layer, song: Song, ctrl: &mut dyn LayerControl) {
        ctrl.set_default_layer(layer as u8);
        self.push_effect(Effect::PlaySong(song));
    }

    fn type_accent(&mut self, accent: Accent, ctrl: &mut dyn LayerControl) {
        let code_point = accent.code_point(ctrl.modifiers().shifted());
        debug!("Type {:?}: U+{:04X}", accent, code_point);
        self.push_effect(Effect::Unicode {
            mode: self.unicode_mode,
            code_point,
        });
    }
}

impl UserHandler for PreonicHandler {
    fn on_user_action(&mut self, id: u8, pressed: bool, ctrl: &mut dyn LayerControl) -> bool {
        if id >= ACCENT_BASE {
            let Some(accent) = Accent::from_repr(id - ACCENT_BASE) else {
                return false;
            };
            if pressed {
                self.type_accent(accent, ctrl);
            }
            return true;
        }

        let Some(key) = CustomKey::from_repr(id) else {
            return false;
        };
        match key {
            CustomKey::Qwerty | CustomKey::Game | CustomKey::Prog => {
                if pressed {
                    let (layer, song) = match key {
                        CustomKey::Game => (Layer::Game, Song::Game),
                        CustomKey::Prog => (Layer::Prog, Song::Prog),
                        _ => (Layer::Qwerty, Song::Qwerty),
                    };
                    self.switch_default_layer(layer, song, ctrl);
                }
            }
            CustomKey::Lower | CustomKey::Raise => {
                let layer = if key == CustomKey::Lower { Layer::Lower } else { Layer::Raise };
                if pressed {
                    ctrl.activate_layer(layer as u8);
                } else {
                    ctrl.deactivate_layer(layer as u8);
                }
                ctrl.update_tri_layer(Layer::Lower as u8, Layer::Raise as u8, Layer::Adjust as u8);
            }
            CustomKey::Backlit => {
                if pressed {
                    ctrl.register_key(HidKeyCode::RShift);
                    self.push_effect(Effect::BacklightStep);
                } else {
                    ctrl.unregister_key(HidKeyCode::RShift);
                }
            }
            CustomKey::UnicodeLinux | CustomKey::UnicodeMacOs | CustomKey::UnicodeWinCompose => {
                if pressed {
                    self.unicode_mode = match key {
                        CustomKey::UnicodeMacOs => UnicodeMode::MacOs,
                        CustomKey::UnicodeWinCompose => UnicodeMode::WinCompose,
                        _ => UnicodeMode::Linux,
                    };
                    info!("Unicode input mode: {:?}", self.unicode_mode);
                }
            }
            // Reset, audio, music and midi keys belong to the firmware
            _ => return false,
        }
        true
    }

    fn on_encoder(&mut self, _id: u8, direction: Direction, ctrl: &mut dyn LayerControl) -> bool {
        if !self.muse_mode {
            return false;
        }
        let clockwise = direction == Direction::Clockwise;
        if ctrl.is_layer_active(Layer::Raise as u8) {
            self.muse_offset = if clockwise {
                self.muse_offset.wrapping_add(1)
            } else {
                self.muse_offset.wrapping_sub(1)
            };
            self.push_effect(Effect::MuseOffset(self.muse_offset));
        } else {
            // The tempo divides the scan rate, it never reaches 0
            self.muse_tempo = if clockwise {
                self.muse_tempo.saturating_add(1)
            } else {
                self.muse_tempo.saturating_sub(1).max(1)
            };
            self.push_effect(Effect::MuseTempo(self.muse_tempo));
        }
        true
    }

    fn on_dip_switch(&mut self, index: u8, active: bool, ctrl: &mut dyn LayerControl) {
        match index {
            0 => {
                if active {
                    ctrl.activate_layer(Layer::Adjust as u8);
                } else {
                    ctrl.deactivate_layer(Layer::Adjust as u8);
                }
            }
            1 => {
                info!("Music mode {}", if active { "on" } else { "off" });
                self.muse_mode = active;
            }
            _ => warn!("Unknown DIP switch {}", index),
        }
    }
}

/// Whether music mode swallows the action, the layer keys always go through
pub fn music_mask(action: KeyAction) -> bool {
    match action {
        KeyAction::Single(Action::User(id)) => {
            !matches!(CustomKey::from_repr(id), Some(CustomKey::Lower | CustomKey::Raise))
        }
        _ => true,
    }
}
