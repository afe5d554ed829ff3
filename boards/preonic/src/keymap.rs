use keylayer::types::action::{EncoderAction, KeyAction};
use keylayer::types::modifier::ModifierCombination;
use keylayer::{a, encoder, k, layer, lt, mo, mt, shifted, user, wm};
use strum::FromRepr;

use crate::unicode::Accent;

pub const COL: usize = 12;
pub const ROW: usize = 5;
pub const NUM_LAYER: usize = 9;
pub const NUM_ENCODER: usize = 1;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Layer {
    Qwerty,
    Game,
    Prog,
    Lower,
    Raise,
    Adjust,
    Accent,
    Nav,
    GuiMgr,
}

/// Custom keycodes, dispatched to [`crate::PreonicHandler`] as `Action::User`
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, FromRepr)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CustomKey {
    Qwerty,
    Game,
    Prog,
    Lower,
    Raise,
    Backlit,
    // Firmware keys, the keymap doesn't handle them
    Reset,
    Debug,
    TermOn,
    TermOff,
    MusicModeCycle,
    AudioOn,
    AudioOff,
    AltGuiNormal,
    AltGuiSwap,
    VoiceDec,
    VoiceInc,
    MusicOn,
    MusicOff,
    MidiOn,
    MidiOff,
    // Unicode input modes
    UnicodeLinux,
    UnicodeMacOs,
    UnicodeWinCompose,
}

/// User action ids from this one on are accent characters
pub const ACCENT_BASE: u8 = 0x80;

const fn custom(key: CustomKey) -> KeyAction {
    user!(key as u8)
}

const fn accent(accent: Accent) -> KeyAction {
    user!(ACCENT_BASE + accent as u8)
}

const CX_ESC: KeyAction = mt!(Escape, ModifierCombination::LCTRL);
const SX_ENT: KeyAction = mt!(Enter, ModifierCombination::RSHIFT);
const X_SCLN: KeyAction = lt!(Layer::Nav as u8, Semicolon);
const X_ACC: KeyAction = mo!(Layer::Accent as u8);
const X_GUI: KeyAction = mo!(Layer::GuiMgr as u8);
const ALT_F4: KeyAction = wm!(F4, ModifierCombination::LALT);
const LOWER: KeyAction = custom(CustomKey::Lower);
const RAISE: KeyAction = custom(CustomKey::Raise);

/// The space bar is 2u wide, the column next to it has no switch
#[rustfmt::skip]
pub const fn get_default_keymap() -> [[[KeyAction; COL]; ROW]; NUM_LAYER] {
    [
        // Qwerty
        layer!([
            [k!(Grave), k!(Kc1), k!(Kc2), k!(Kc3), k!(Kc4), k!(Kc5), k!(Kc6), k!(Kc7), k!(Kc8), k!(Kc9), k!(Kc0), k!(Backslash)],
            [k!(Tab), k!(Q), k!(W), k!(E), k!(R), k!(T), k!(Y), k!(U), k!(I), k!(O), k!(P), k!(Backspace)],
            [k!(Escape), k!(A), k!(S), k!(D), k!(F), k!(G), k!(H), k!(J), k!(K), k!(L), k!(Semicolon), k!(Quote)],
            [k!(LShift), k!(Z), k!(X), k!(C), k!(V), k!(B), k!(N), k!(M), k!(Comma), k!(Dot), k!(Slash), k!(Enter)],
            [k!(LCtrl), k!(LGui), k!(LAlt), X_ACC, LOWER, k!(Space), a!(No), RAISE, k!(Left), k!(Down), k!(Up), k!(Right)]
        ]),
        // Game
        layer!([
            [k!(Grave), k!(Kc1), k!(Kc2), k!(Kc3), k!(Kc4), k!(Kc5), k!(Kc6), k!(Kc7), k!(Kc8), k!(Kc9), k!(Kc0), k!(Backslash)],
            [k!(Tab), k!(Q), k!(W), k!(E), k!(R), k!(T), k!(Y), k!(U), k!(I), k!(O), k!(P), k!(Backspace)],
            [k!(LCtrl), k!(A), k!(S), k!(D), k!(F), k!(G), k!(H), k!(J), k!(K), k!(L), k!(Semicolon), k!(Quote)],
            [k!(LShift), k!(Z), k!(X), k!(C), k!(V), k!(B), k!(N), k!(M), k!(Comma), k!(Dot), k!(Slash), k!(Enter)],
            [k!(F13), k!(F14), k!(LAlt), k!(F15), LOWER, k!(Space), a!(No), RAISE, k!(Left), k!(Down), k!(Up), k!(Right)]
        ]),
        // Prog
        layer!([
            [k!(Grave), k!(Kc1), k!(Kc2), k!(Kc3), k!(Kc4), k!(Kc5), k!(Kc6), k!(Kc7), k!(Kc8), k!(Kc9), k!(Kc0), k!(Backslash)],
            [k!(Tab), k!(Q), k!(W), k!(E), k!(R), k!(T), k!(Y), k!(U), k!(I), k!(O), k!(P), k!(Backspace)],
            [CX_ESC, k!(A), k!(S), k!(D), k!(F), k!(G), k!(H), k!(J), k!(K), k!(L), X_SCLN, k!(Quote)],
            [k!(LShift), k!(Z), k!(X), k!(C), k!(V), k!(B), k!(N), k!(M), k!(Comma), k!(Dot), k!(Slash), SX_ENT],
            [X_GUI, k!(LGui), k!(LAlt), X_ACC, LOWER, k!(Space), a!(No), RAISE, X_ACC, k!(RAlt), k!(RGui), X_GUI]
        ]),
        // Lower
        layer!([
            [k!(Escape), shifted!(Kc1), shifted!(Kc2), shifted!(Kc3), shifted!(Kc4), shifted!(Kc5), shifted!(Kc6), shifted!(Kc7), shifted!(Kc8), shifted!(Kc9), shifted!(Kc0), a!(Transparent)],
            [shifted!(Grave), k!(F9), k!(F10), k!(F11), k!(F12), a!(Transparent), k!(Kc5), k!(Kc6), k!(Kc7), k!(Kc8), k!(Kc9), k!(Delete)],
            [k!(Escape), k!(F5), k!(F6), k!(F7), k!(F8), a!(Transparent), k!(Kc0), k!(Kc1), k!(Kc2), k!(Kc3), k!(Kc4), k!(Backslash)],
            [k!(LShift), k!(F1), k!(F2), k!(F3), k!(F4), a!(Transparent), shifted!(Equal), k!(Minus), k!(Equal), a!(Transparent), shifted!(Minus), k!(RShift)],
            [k!(LCtrl), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), k!(Backspace), a!(Transparent), a!(Transparent), k!(AudioMute), k!(AudioVolDown), k!(AudioVolUp), a!(Transparent)]
        ]),
        // Raise
        layer!([
            [k!(Escape), shifted!(Kc1), shifted!(Kc2), shifted!(Kc3), shifted!(Kc4), shifted!(Kc5), shifted!(Kc6), shifted!(Kc7), shifted!(Kc8), shifted!(Kc9), shifted!(Kc0), a!(Transparent)],
            [k!(Grave), k!(F9), k!(F10), k!(F11), k!(F12), a!(Transparent), shifted!(Kc1), shifted!(Kc9), shifted!(Kc0), shifted!(LeftBracket), shifted!(RightBracket), k!(Delete)],
            [k!(LCtrl), k!(F5), k!(F6), k!(F7), k!(F8), a!(Transparent), shifted!(Kc3), k!(LeftBracket), k!(RightBracket), k!(Minus), k!(Equal), shifted!(Backslash)],
            [k!(LShift), k!(F1), k!(F2), k!(F3), k!(F4), a!(Transparent), shifted!(Kc8), shifted!(Minus), shifted!(Equal), a!(No), shifted!(Kc4), a!(Transparent)],
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), k!(Delete), a!(Transparent), a!(Transparent), k!(AudioMute), k!(AudioVolDown), k!(AudioVolUp), a!(Transparent)]
        ]),
        // Adjust
        layer!([
            [k!(F1), k!(F2), k!(F3), k!(F4), k!(F5), k!(F6), k!(F7), k!(F8), k!(F9), k!(F10), k!(F11), k!(F12)],
            [a!(Transparent), custom(CustomKey::Reset), custom(CustomKey::Debug), custom(CustomKey::TermOn), custom(CustomKey::TermOff), a!(Transparent), a!(Transparent), custom(CustomKey::UnicodeLinux), custom(CustomKey::UnicodeMacOs), custom(CustomKey::UnicodeWinCompose), a!(Transparent), k!(Delete)],
            [a!(Transparent), a!(Transparent), custom(CustomKey::MusicModeCycle), custom(CustomKey::AudioOn), custom(CustomKey::AudioOff), custom(CustomKey::AltGuiNormal), custom(CustomKey::AltGuiSwap), custom(CustomKey::Qwerty), custom(CustomKey::Game), custom(CustomKey::Prog), a!(Transparent), a!(Transparent)],
            [a!(Transparent), custom(CustomKey::VoiceDec), custom(CustomKey::VoiceInc), custom(CustomKey::MusicOn), custom(CustomKey::MusicOff), custom(CustomKey::MidiOn), custom(CustomKey::MidiOff), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)],
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)]
        ]),
        // Accent
        layer!([
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)],
            [a!(Transparent), a!(Transparent), accent(Accent::Euro), accent(Accent::EAcute), a!(Transparent), a!(Transparent), a!(Transparent), accent(Accent::UAcute), accent(Accent::IAcute), accent(Accent::OAcute), a!(Transparent), a!(Transparent)],
            [a!(Transparent), accent(Accent::AAcute), accent(Accent::SharpS), a!(Transparent), a!(Transparent), a!(Transparent), accent(Accent::UDoubleAcute), accent(Accent::UUmlaut), accent(Accent::ODoubleAcute), accent(Accent::OUmlaut), a!(Transparent), a!(Transparent)],
            [k!(LShift), accent(Accent::AUmlaut), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), k!(RShift)],
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), k!(F20), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)]
        ]),
        // Nav
        layer!([
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)],
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), k!(Home), k!(Up), k!(End), a!(Transparent), a!(Transparent)],
            [k!(LCtrl), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), k!(PageUp), k!(Left), k!(Down), k!(Right), X_SCLN, a!(Transparent)],
            [k!(LShift), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), k!(PageDown), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)],
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)]
        ]),
        // GuiMgr
        layer!([
            [ALT_F4, a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)],
            [a!(Transparent), k!(MouseBtn1), k!(MouseUp), k!(MouseBtn2), k!(MouseWheelUp), k!(MouseAccel0), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)],
            [k!(LCtrl), k!(MouseLeft), k!(MouseDown), k!(MouseRight), k!(MouseWheelDown), k!(MouseAccel1), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), k!(RCtrl)],
            [k!(LShift), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), k!(MouseAccel2), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), k!(RShift)],
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)]
        ]),
    ]
}

/// Page down / page up on every layer, music mode takes the encoder in the handler
pub const fn get_default_encoder_map() -> [[EncoderAction; NUM_ENCODER]; NUM_LAYER] {
    let mut map = [[encoder!(a!(Transparent), a!(Transparent))]; NUM_LAYER];
    map[Layer::Qwerty as usize] = [encoder!(k!(PageDown), k!(PageUp))];
    map[Layer::Game as usize] = [encoder!(k!(PageDown), k!(PageUp))];
    map[Layer::Prog as usize] = [encoder!(k!(PageDown), k!(PageUp))];
    map
}
