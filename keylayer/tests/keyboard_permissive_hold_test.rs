pub mod common;

use keylayer::config::{BehaviorConfig, TapHoldConfig};
use keylayer::types::action::HoldMode;

use crate::common::{KC_LSHIFT, create_test_keyboard_with_config, run_key_sequence_test};

fn permissive_hold_config() -> BehaviorConfig {
    BehaviorConfig {
        tap_hold: TapHoldConfig {
            mode: HoldMode::PermissiveHold,
            ..TapHoldConfig::default()
        },
        ..BehaviorConfig::default()
    }
}

#[test]
fn test_permissive_hold_nested_release() {
    key_sequence_test! {
        keyboard: create_test_keyboard_with_config(permissive_hold_config()),
        sequence: [
            [2, 1, true, 10],  // Press mt!(A, LShift)
            [2, 3, true, 30],  // Press D
            [2, 3, false, 30], // Release D, A is hold
            [2, 1, false, 30], // Release A
        ],
        expected_reports: [
            [KC_LSHIFT, [0, 0, 0, 0, 0, 0]],
            [KC_LSHIFT, [kc8!(D), 0, 0, 0, 0, 0]],
            [KC_LSHIFT, [0, 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
        ]
    };
}

#[test]
fn test_permissive_hold_rolling_keys() {
    key_sequence_test! {
        keyboard: create_test_keyboard_with_config(permissive_hold_config()),
        sequence: [
            [2, 1, true, 10],  // Press mt!(A, LShift)
            [2, 3, true, 30],  // Press D
            [2, 1, false, 30], // Release A first, tap
            [2, 3, false, 30], // Release D
        ],
        expected_reports: [
            [0, [kc8!(A), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
            [0, [kc8!(D), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
        ]
    };
}

#[test]
fn test_permissive_hold_release_of_earlier_key() {
    // D is pressed before A, releasing it doesn't decide A
    key_sequence_test! {
        keyboard: create_test_keyboard_with_config(permissive_hold_config()),
        sequence: [
            [2, 3, true, 10],  // Press D
            [2, 1, true, 10],  // Press mt!(A, LShift)
            [2, 3, false, 10], // Release D
            [2, 1, false, 10], // Release A, tap
        ],
        expected_reports: [
            [0, [kc8!(D), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
            [0, [kc8!(A), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
        ]
    };
}

#[test]
fn test_permissive_hold_timeout() {
    key_sequence_test! {
        keyboard: create_test_keyboard_with_config(permissive_hold_config()),
        sequence: [
            [2, 1, true, 10],   // Press mt!(A, LShift)
            [2, 3, true, 30],   // Press D
            [2, 1, false, 250], // Release A after timeout
            [2, 3, false, 10],  // Release D
        ],
        expected_reports: [
            [KC_LSHIFT, [0, 0, 0, 0, 0, 0]],
            [KC_LSHIFT, [kc8!(D), 0, 0, 0, 0, 0]],
            [0, [kc8!(D), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
        ]
    };
}
