use embassy_time::{Duration, Instant};

use crate::config::TapHoldConfig;
use crate::event::KeyPos;
use crate::types::action::{HoldMode, KeyAction};
use crate::types::keycode::HidKeyCode;
use crate::types::modifier::ModifierCombination;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TapHoldState {
    /// Not pressed
    Idle,
    /// Pressed, the timer is running and the role is not committed yet
    Undecided,
    /// Committed to the hold role, waiting for the release
    CommittedHold,
    /// Committed to the tap role, the tap is being emitted
    CommittedTap,
}

/// What a dual-role key does when held
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HoldRole {
    Modifier(ModifierCombination),
    Layer(u8),
}

/// Output of the tap-hold state machine
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TapHoldEvent {
    /// Emit press and release of the tap keycode
    Tap(HidKeyCode),
    /// Modifier down or layer on
    HoldStart(HoldRole),
    /// Modifier up or layer off
    HoldEnd(HoldRole),
}

/// Another key event which happens while a dual-role key is undecided
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Interrupt {
    /// Another key is pressed
    Press { dual_role: bool },
    /// A key pressed after the dual-role key is released
    Release,
}

/// A dual-role key instance, created when the key is resolved on press.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DualRoleKey {
    pub(crate) pos: KeyPos,
    tap: HidKeyCode,
    hold: HoldRole,
    mode: HoldMode,
    timeout: Duration,
    state: TapHoldState,
    press_time: Instant,
}

impl DualRoleKey {
    /// Create an idle dual-role key from its action, `None` if the action is not dual-role.
    pub fn new(pos: KeyPos, action: KeyAction, config: &TapHoldConfig) -> Option<Self> {
        let (tap, hold, profile) = match action {
            KeyAction::ModifierTapHold(tap, modifiers, profile) => (tap, HoldRole::Modifier(modifiers), profile),
            KeyAction::LayerTapHold(tap, layer, profile) => (tap, HoldRole::Layer(layer), profile),
            _ => return None,
        };
        Some(Self {
            pos,
            tap,
            hold,
            mode: config.mode_of(profile),
            timeout: config.hold_timeout_of(profile),
            state: TapHoldState::Idle,
            press_time: Instant::from_ticks(0),
        })
    }

    pub fn state(&self) -> TapHoldState {
        self.state
    }

    pub fn hold_role(&self) -> HoldRole {
        self.hold
    }

    pub fn mode(&self) -> HoldMode {
        self.mode
    }

    /// Idle -> Undecided, the timer starts at `time`
    pub fn press(&mut self, time: Instant) {
        if self.state == TapHoldState::Idle {
            self.press_time = time;
            self.state = TapHoldState::Undecided;
        }
    }

    /// Advance the timer, commits to hold when the timeout is reached.
    ///
    /// A timestamp earlier than the press time means the tick counter wrapped, the timer is re-armed from it.
    pub fn poll(&mut self, now: Instant) -> Option<TapHoldEvent> {
        if self.state != TapHoldState::Undecided {
            return None;
        }
        match now.checked_duration_since(self.press_time) {
            Some(elapsed) if elapsed >= self.timeout => {
                debug!("Dual-role key {:?} timeout, hold", self.pos);
                self.commit_hold()
            }
            Some(_) => None,
            None => {
                warn!("Timer wrapped while {:?} is undecided, re-arm", self.pos);
                self.press_time = now;
                None
            }
        }
    }

    /// Another key event happened while the key is undecided, commits to hold according to the hold mode.
    pub fn interrupt(&mut self, interrupt: Interrupt) -> Option<TapHoldEvent> {
        if self.state != TapHoldState::Undecided {
            return None;
        }
        let hold = match (self.mode, interrupt) {
            (HoldMode::Normal, _) => false,
            (HoldMode::HoldOnOtherPress, Interrupt::Press { dual_role }) => !dual_role,
            (HoldMode::PermissiveHold, Interrupt::Press { .. }) => false,
            (HoldMode::HoldOnOtherPress | HoldMode::PermissiveHold, Interrupt::Release) => true,
        };
        if hold {
            debug!("Dual-role key {:?} interrupted by {:?}, hold", self.pos, interrupt);
            return self.commit_hold();
        }
        None
    }

    /// Undecided -> CommittedHold, regardless of the timer
    pub fn commit_hold(&mut self) -> Option<TapHoldEvent> {
        if self.state != TapHoldState::Undecided {
            return None;
        }
        self.state = TapHoldState::CommittedHold;
        Some(TapHoldEvent::HoldStart(self.hold))
    }

    /// Release the key.
    ///
    /// Undecided -> CommittedTap, the tap should be emitted and then `finish_tap` called.
    /// CommittedHold -> Idle, the hold role ends.
    pub fn release(&mut self) -> Option<TapHoldEvent> {
        match self.state {
            TapHoldState::Undecided => {
                self.state = TapHoldState::CommittedTap;
                Some(TapHoldEvent::Tap(self.tap))
            }
            TapHoldState::CommittedHold => {
                self.state = TapHoldState::Idle;
                Some(TapHoldEvent::HoldEnd(self.hold))
            }
            _ => None,
        }
    }

    /// CommittedTap -> Idle, after the tap is emitted
    pub fn finish_tap(&mut self) {
        if self.state == TapHoldState::CommittedTap {
            self.state = TapHoldState::Idle;
        }
    }

    /// Force the key back to idle without emitting anything
    pub fn cancel(&mut self) {
        self.state = TapHoldState::Idle;
    }
}
