pub mod common;

use embassy_time::Instant;
use keylayer::config::BehaviorConfig;
use keylayer::event::{Direction, KeyboardEvent};
use keylayer::keyboard::{Keyboard, LayerControl, UserHandler};
use keylayer::keymap::KeyMap;
use keylayer::report::{MediaKeyboardReport, Report};
use keylayer::storage::NoStorage;
use keylayer::types::action::{EncoderAction, KeyAction};
use keylayer::types::keycode::HidKeyCode;
use keylayer::{a, encoder, k, user};

use crate::common::{TestReporter, run_key_sequence_test};

const KC_RSHIFT: u8 = 1 << 5;

const MOMENTARY: u8 = 0;
const BACKLIT: u8 = 1;
const SWITCH: u8 = 2;
const UNHANDLED: u8 = 9;

#[derive(Default)]
struct TestHandler {
    calls: Vec<(u8, bool)>,
    shifted: Vec<bool>,
    scrolls: Vec<Direction>,
}

impl UserHandler for TestHandler {
    fn on_user_action(&mut self, id: u8, pressed: bool, ctrl: &mut dyn LayerControl) -> bool {
        self.calls.push((id, pressed));
        match id {
            MOMENTARY => {
                if pressed {
                    ctrl.activate_layer(1);
                } else {
                    ctrl.deactivate_layer(1);
                }
                true
            }
            BACKLIT => {
                if pressed {
                    ctrl.register_key(HidKeyCode::RShift);
                } else {
                    ctrl.unregister_key(HidKeyCode::RShift);
                }
                self.shifted.push(ctrl.modifiers().shifted());
                true
            }
            SWITCH => {
                if pressed {
                    ctrl.set_default_layer(1);
                }
                true
            }
            _ => false,
        }
    }

    fn on_encoder(&mut self, _id: u8, direction: Direction, ctrl: &mut dyn LayerControl) -> bool {
        if ctrl.is_layer_active(1) && direction == Direction::CounterClockwise {
            self.scrolls.push(direction);
            return true;
        }
        false
    }

    fn on_dip_switch(&mut self, index: u8, active: bool, ctrl: &mut dyn LayerControl) {
        if index == 0 {
            if active {
                ctrl.activate_layer(1);
            } else {
                ctrl.deactivate_layer(1);
            }
        }
    }
}

type UserKeyboard = Keyboard<'static, TestReporter, NoStorage, TestHandler, 1, 5, 2, 1>;

fn create_keyboard() -> UserKeyboard {
    let layers: &'static mut [[[KeyAction; 5]; 1]; 2] = Box::leak(Box::new([
        [[user!(MOMENTARY), user!(BACKLIT), user!(SWITCH), user!(UNHANDLED), k!(A)]],
        [[k!(B), k!(C), k!(D), k!(E), k!(AudioMute)]],
    ]));
    let encoders: &'static mut [[EncoderAction; 1]; 2] = Box::leak(Box::new([
        [encoder!(k!(PageDown), k!(PageUp))],
        [encoder!(a!(Transparent), a!(Transparent))],
    ]));
    let mut keymap = KeyMap::new(layers, Some(encoders)).unwrap();
    keymap.allow_default_layer(1).unwrap();
    Keyboard::new(
        keymap,
        BehaviorConfig::default(),
        TestReporter::default(),
        NoStorage,
        TestHandler::default(),
    )
    .unwrap()
}

fn ms(t: u64) -> Instant {
    Instant::from_millis(t)
}

#[test]
fn test_handler_activates_layer() {
    let mut keyboard = create_keyboard();
    run_key_sequence_test(
        &mut keyboard,
        &key_sequence![
            [0, 0, true, 10],  // Layer 1 on
            [0, 1, true, 10],  // C
            [0, 1, false, 10],
            [0, 0, false, 10], // Layer 1 off
        ],
        &key_report![
            [0, [kc8!(C), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
        ],
    );
    assert_eq!(keyboard.handler().calls, vec![(MOMENTARY, true), (MOMENTARY, false)]);
    assert_eq!(keyboard.reporter().layer_changes, vec![(1, true), (1, false)]);
}

#[test]
fn test_handler_registers_key() {
    let mut keyboard = create_keyboard();
    run_key_sequence_test(
        &mut keyboard,
        &key_sequence![[0, 1, true, 10], [0, 1, false, 10]],
        &key_report![
            [KC_RSHIFT, [0, 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
        ],
    );
    assert_eq!(keyboard.handler().shifted, vec![true, false]);
}

#[test]
fn test_unhandled_action_is_forwarded() {
    let mut keyboard = create_keyboard();
    run_key_sequence_test(&mut keyboard, &key_sequence![[0, 3, true, 10], [0, 3, false, 10]], &[]);
    assert_eq!(keyboard.handler().calls, vec![(UNHANDLED, true), (UNHANDLED, false)]);
    assert_eq!(keyboard.reporter().user_actions, vec![(UNHANDLED, true), (UNHANDLED, false)]);
}

#[test]
fn test_handler_switches_default_layer() {
    let mut keyboard = create_keyboard();
    run_key_sequence_test(
        &mut keyboard,
        &key_sequence![
            [0, 2, true, 10], // Switch default layer to 1
            [0, 2, false, 10],
            [0, 0, true, 10], // B
            [0, 0, false, 10],
        ],
        &key_report![
            [0, [kc8!(B), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
        ],
    );
    assert_eq!(keyboard.layer_state().default_layer(), 1);
    assert_eq!(keyboard.reporter().default_layers, vec![1]);
}

#[test]
fn test_encoder() {
    let mut keyboard = create_keyboard();
    keyboard.process_encoder(0, Direction::Clockwise, ms(10));
    keyboard.process_encoder(0, Direction::CounterClockwise, ms(20));
    assert_eq!(
        keyboard.reporter_mut().keyboard_reports(),
        key_report![
            [0, [kc8!(PageDown), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
            [0, [kc8!(PageUp), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
        ]
    );

    // On layer 1 the handler takes counter-clockwise steps, clockwise falls through to layer 0
    keyboard.process_dip_switch(0, true);
    keyboard.process_encoder(0, Direction::CounterClockwise, ms(30));
    keyboard.process_encoder(0, Direction::Clockwise, ms(40));
    assert_eq!(keyboard.handler().scrolls, vec![Direction::CounterClockwise]);
    assert_eq!(
        keyboard.reporter_mut().keyboard_reports(),
        key_report![
            [0, [kc8!(PageDown), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
        ]
    );

    keyboard.process_dip_switch(0, false);
    assert!(!keyboard.layer_state().is_active(1));
}

#[test]
fn test_encoder_event_in_sequence() {
    // Encoder steps go through the same event path as keys
    let mut keyboard = create_keyboard();
    keyboard.process(KeyboardEvent::rotary_encoder(0, Direction::Clockwise, ms(10)));
    assert_eq!(keyboard.reporter().keys, vec![(HidKeyCode::PageDown, true), (HidKeyCode::PageDown, false)]);
}

#[test]
fn test_media_key() {
    let mut keyboard = create_keyboard();
    keyboard.process_dip_switch(0, true);
    keyboard.process(KeyboardEvent::key(0, 4, true, ms(10)));
    keyboard.process(KeyboardEvent::key(0, 4, false, ms(20)));
    assert_eq!(
        keyboard.reporter_mut().other_reports(),
        vec![
            Report::MediaKeyboardReport(MediaKeyboardReport { usage_id: 0xE2 }),
            Report::MediaKeyboardReport(MediaKeyboardReport { usage_id: 0 }),
        ]
    );
}
