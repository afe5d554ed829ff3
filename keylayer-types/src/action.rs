//! Keyboard actions.
//!
//! A [`KeyAction`] is what a keymap stores at a position of a layer. Most positions hold a
//! [`KeyAction::Single`] wrapping one [`Action`]; dual-role positions hold a tap keycode together
//! with a hold role and a [`TapHoldProfile`].

use crate::keycode::HidKeyCode;
use crate::modifier::ModifierCombination;

/// How a dual-role key decides between tap and hold when another key interrupts it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HoldMode {
    /// The decision is made only by the hold timeout, other keys can roll over the dual-role key
    Normal,
    /// Trigger hold immediately when any other non dual-role key is pressed while the key is undecided
    HoldOnOtherPress,
    /// Trigger hold when another key is pressed and released while the key is undecided
    PermissiveHold,
}

/// Per-key tap-hold settings. Unset fields fall back to the keyboard's `TapHoldConfig`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TapHoldProfile {
    mode: Option<HoldMode>,
    hold_timeout_ms: Option<u16>,
}

impl TapHoldProfile {
    pub const fn new(mode: Option<HoldMode>, hold_timeout_ms: Option<u16>) -> Self {
        // Zero timeout is treated as unset
        let hold_timeout_ms = match hold_timeout_ms {
            Some(0) => None,
            t => t,
        };
        Self { mode, hold_timeout_ms }
    }

    pub const fn const_default() -> Self {
        Self::new(None, None)
    }

    pub const fn with_mode(self, mode: HoldMode) -> Self {
        Self::new(Some(mode), self.hold_timeout_ms)
    }

    pub const fn with_hold_timeout_ms(self, t: u16) -> Self {
        Self::new(self.mode, Some(t))
    }

    pub fn mode(self) -> Option<HoldMode> {
        self.mode
    }

    pub fn hold_timeout_ms(self) -> Option<u16> {
        self.hold_timeout_ms
    }
}

/// EncoderAction is the action at a encoder position, stored in encoder map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderAction {
    clockwise: KeyAction,
    counter_clockwise: KeyAction,
}

impl Default for EncoderAction {
    fn default() -> Self {
        Self {
            clockwise: KeyAction::No,
            counter_clockwise: KeyAction::No,
        }
    }
}

impl EncoderAction {
    pub const fn new(clockwise: KeyAction, counter_clockwise: KeyAction) -> Self {
        Self {
            clockwise,
            counter_clockwise,
        }
    }

    pub fn clockwise(&self) -> KeyAction {
        self.clockwise
    }

    pub fn counter_clockwise(&self) -> KeyAction {
        self.counter_clockwise
    }
}

/// A KeyAction is the action at a keyboard position, stored in keymap.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyAction {
    /// No action, resolution stops here.
    No,
    /// Transparent action, next layer will be checked.
    Transparent,
    /// A single action, triggered when pressed and cancelled when released.
    Single(Action),
    /// Tap the keycode, or hold the modifiers
    ModifierTapHold(HidKeyCode, ModifierCombination, TapHoldProfile),
    /// Tap the keycode, or hold the layer
    LayerTapHold(HidKeyCode, u8, TapHoldProfile),
}

impl KeyAction {
    /// Dual-role keys need a tap/hold decision before anything is emitted.
    pub fn is_dual_role(&self) -> bool {
        matches!(self, KeyAction::ModifierTapHold(..) | KeyAction::LayerTapHold(..))
    }

    /// The layers this action refers to, if any.
    pub fn layer(&self) -> Option<u8> {
        match self {
            KeyAction::Single(a) => a.layer(),
            KeyAction::LayerTapHold(_, l, _) => Some(*l),
            _ => None,
        }
    }
}

/// A single basic action that a keyboard can execute.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// A normal key stroke
    Key(HidKeyCode),
    /// Key stroke with modifier combination triggered, such as `!` or `Alt+F4`
    KeyWithModifier(HidKeyCode, ModifierCombination),
    /// Modifier combination, held while the key is pressed
    Modifier(ModifierCombination),
    /// Activate a layer while the key is pressed
    LayerOn(u8),
    /// Set the persistent default layer
    DefaultLayer(u8),
    /// User defined action, handled by the keymap's custom action handler
    User(u8),
}

impl Action {
    pub fn layer(&self) -> Option<u8> {
        match self {
            Action::LayerOn(l) | Action::DefaultLayer(l) => Some(*l),
            _ => None,
        }
    }
}
