use embassy_time::Duration;

use crate::types::action::{HoldMode, TapHoldProfile};

/// Config for configurable action behavior
#[derive(Clone, Copy, Debug, Default)]
pub struct BehaviorConfig {
    /// `[lower, raise, adjust]`, `adjust` is active iff both `lower` and `raise` are active.
    ///
    /// Recomputed whenever `lower` or `raise` changes. Leave it `None` if the keymap calls
    /// `update_tri_layer` itself.
    pub tri_layer: Option<[u8; 3]>,
    pub tap_hold: TapHoldConfig,
    pub layer_priority: LayerPriority,
}

/// Configurations for tap hold behavior
#[derive(Clone, Copy, Debug)]
pub struct TapHoldConfig {
    /// A dual-role key held longer than this commits to its hold role
    pub hold_timeout: Duration,
    /// Interrupt policy used by keys whose profile doesn't set one
    pub mode: HoldMode,
}

impl Default for TapHoldConfig {
    fn default() -> Self {
        Self {
            hold_timeout: Duration::from_millis(200),
            mode: HoldMode::Normal,
        }
    }
}

impl TapHoldConfig {
    /// Effective timeout for a key, per-key profile first
    pub fn hold_timeout_of(&self, profile: TapHoldProfile) -> Duration {
        profile
            .hold_timeout_ms()
            .map(|t| Duration::from_millis(t as u64))
            .unwrap_or(self.hold_timeout)
    }

    /// Effective interrupt policy for a key, per-key profile first
    pub fn mode_of(&self, profile: TapHoldProfile) -> HoldMode {
        profile.mode().unwrap_or(self.mode)
    }
}

/// Which active layer wins when several of them have a non-transparent entry at the same position.
///
/// The default layer always has the lowest priority.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LayerPriority {
    /// Higher layer id wins
    #[default]
    HighestIndex,
    /// The most recently activated layer wins
    MostRecent,
}
