use core::ops::{BitOr, BitOrAssign};

use bitfield_struct::bitfield;
use serde::{Deserialize, Serialize};

use crate::keycode::HidKeyCode;

/// A combination of modifiers, in the same bit layout as the modifier byte of a HID keyboard report.
///
/// | bit7 | bit6 | bit5 | bit4 | bit3 | bit2 | bit1 | bit0 |
/// | --- | --- | --- | --- | --- | --- | --- | --- |
/// | RGUI | RALT | RSHIFT | RCTRL | LGUI | LALT | LSHIFT | LCTRL |
#[bitfield(u8, order = Lsb, defmt = cfg(feature = "defmt"))]
#[derive(Serialize, Deserialize, Eq, PartialEq)]
pub struct ModifierCombination {
    #[bits(1)]
    pub left_ctrl: bool,
    #[bits(1)]
    pub left_shift: bool,
    #[bits(1)]
    pub left_alt: bool,
    #[bits(1)]
    pub left_gui: bool,
    #[bits(1)]
    pub right_ctrl: bool,
    #[bits(1)]
    pub right_shift: bool,
    #[bits(1)]
    pub right_alt: bool,
    #[bits(1)]
    pub right_gui: bool,
}

impl BitOr for ModifierCombination {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::from_bits(self.into_bits() | rhs.into_bits())
    }
}

impl BitOrAssign for ModifierCombination {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

/// The modifier keycodes, indexed by their bit in the modifier byte.
const MODIFIER_KEYCODES: [HidKeyCode; 8] = [
    HidKeyCode::LCtrl,
    HidKeyCode::LShift,
    HidKeyCode::LAlt,
    HidKeyCode::LGui,
    HidKeyCode::RCtrl,
    HidKeyCode::RShift,
    HidKeyCode::RAlt,
    HidKeyCode::RGui,
];

impl ModifierCombination {
    pub const LCTRL: Self = Self::new().with_left_ctrl(true);
    pub const LSHIFT: Self = Self::new().with_left_shift(true);
    pub const LALT: Self = Self::new().with_left_alt(true);
    pub const LGUI: Self = Self::new().with_left_gui(true);
    pub const RCTRL: Self = Self::new().with_right_ctrl(true);
    pub const RSHIFT: Self = Self::new().with_right_shift(true);
    pub const RALT: Self = Self::new().with_right_alt(true);
    pub const RGUI: Self = Self::new().with_right_gui(true);

    /// Either shift key
    pub const fn shifted(self) -> bool {
        self.left_shift() || self.right_shift()
    }

    pub const fn is_empty(self) -> bool {
        self.into_bits() == 0
    }

    /// Iterate the modifier keycodes contained in this combination, left modifiers first.
    pub fn keycodes(self) -> impl Iterator<Item = HidKeyCode> {
        let bits = self.into_bits();
        MODIFIER_KEYCODES
            .into_iter()
            .enumerate()
            .filter(move |(i, _)| bits & (1 << i) != 0)
            .map(|(_, k)| k)
    }

    /// Bit index of a modifier keycode in the modifier byte, `None` for other keycodes.
    pub fn bit_of(key: HidKeyCode) -> Option<usize> {
        MODIFIER_KEYCODES.iter().position(|&k| k == key)
    }
}
