pub mod test_macro;

use embassy_time::Instant;
use keylayer::config::BehaviorConfig;
use keylayer::event::KeyboardEvent;
use keylayer::keyboard::{Keyboard, UserHandler};
use keylayer::keymap::KeyMap;
use keylayer::report::{KeyboardReport, Report, ReportBuilder, Reporter};
use keylayer::storage::{DefaultLayerStorage, NoStorage};
use keylayer::types::action::KeyAction;
use keylayer::types::keycode::HidKeyCode;
use keylayer::types::modifier::ModifierCombination;
use keylayer::{a, k, layer, lt, mo, mt, shifted};
use log::debug;

// Init logger for tests
#[ctor::ctor]
pub fn init_log() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

pub(crate) const KC_LSHIFT: u8 = 1 << 1;
pub(crate) const KC_LALT: u8 = 1 << 2;
pub(crate) const KC_LGUI: u8 = 1 << 3;

pub(crate) const LOWER: u8 = 1;
pub(crate) const RAISE: u8 = 2;
pub(crate) const ADJUST: u8 = 3;

#[derive(Debug, Clone)]
pub struct TestKeyPress {
    pub row: u8,
    pub col: u8,
    pub pressed: bool,
    pub delay: u64, // Delay before this key event in milliseconds
}

/// A reporter which records everything the keyboard tells it
#[derive(Default)]
pub struct TestReporter {
    pub builder: ReportBuilder<128>,
    pub layer_changes: Vec<(u8, bool)>,
    pub default_layers: Vec<u8>,
    pub user_actions: Vec<(u8, bool)>,
    pub keys: Vec<(HidKeyCode, bool)>,
}

impl TestReporter {
    /// Drain the keyboard reports built so far
    pub fn keyboard_reports(&mut self) -> Vec<KeyboardReport> {
        let mut reports = Vec::new();
        while let Some(report) = self.builder.pop() {
            match report {
                Report::KeyboardReport(report) => reports.push(report),
                report => debug!("other reports {:?}", report),
            }
        }
        reports
    }

    pub fn other_reports(&mut self) -> Vec<Report> {
        let mut reports = Vec::new();
        while let Some(report) = self.builder.pop() {
            if !matches!(report, Report::KeyboardReport(_)) {
                reports.push(report);
            }
        }
        reports
    }
}

impl Reporter for TestReporter {
    fn emit(&mut self, key: HidKeyCode, pressed: bool) {
        self.keys.push((key, pressed));
        self.builder.emit(key, pressed);
    }

    fn notify_layer_changed(&mut self, layer: u8, active: bool) {
        self.layer_changes.push((layer, active));
    }

    fn notify_default_layer_changed(&mut self, layer: u8) {
        self.default_layers.push(layer);
    }

    fn forward_user_action(&mut self, id: u8, pressed: bool) {
        self.user_actions.push((id, pressed));
    }

    fn release_all(&mut self) {
        self.builder.release_all();
    }
}

pub type TestKeyboard<S = NoStorage, H = ()> = Keyboard<'static, TestReporter, S, H, 5, 14, 4>;

// Run a keyboard test: input is a sequence of key events with delays, the expected reports verify the output
pub fn run_key_sequence_test<
    S: DefaultLayerStorage,
    H: UserHandler,
    const ROW: usize,
    const COL: usize,
    const NUM_LAYER: usize,
    const NUM_ENCODER: usize,
>(
    keyboard: &mut Keyboard<'_, TestReporter, S, H, ROW, COL, NUM_LAYER, NUM_ENCODER>,
    key_sequence: &[TestKeyPress],
    expected_reports: &[KeyboardReport],
) {
    let mut time = 0;
    for key in key_sequence {
        time += key.delay;
        let now = Instant::from_millis(time);
        keyboard.scan([KeyboardEvent::key(key.row, key.col, key.pressed, now)], now);
    }

    let reports = keyboard.reporter_mut().keyboard_reports();
    for (report_index, expected) in expected_reports.iter().enumerate() {
        assert_eq!(
            Some(expected),
            reports.get(report_index),
            "on #{} reports, expected left but actually right",
            report_index
        );
    }
    assert_eq!(
        reports.len(),
        expected_reports.len(),
        "unexpected reports: {:?}",
        &reports[expected_reports.len().min(reports.len())..]
    );
}

#[rustfmt::skip]
pub const fn get_keymap() -> [[[KeyAction; 14]; 5]; 4] {
    [
        layer!([
            [k!(Grave), k!(Kc1), k!(Kc2), k!(Kc3), k!(Kc4), k!(Kc5), k!(Kc6), k!(Kc7), k!(Kc8), k!(Kc9), k!(Kc0), k!(Minus), k!(Equal), k!(Backspace)],
            [k!(Tab), k!(Q), k!(W), k!(E), k!(R), k!(T), k!(Y), k!(U), k!(I), k!(O), k!(P), k!(LeftBracket), k!(RightBracket), k!(Backslash)],
            [k!(Escape), mt!(A, ModifierCombination::LSHIFT), mt!(S, ModifierCombination::LGUI), k!(D), k!(F), k!(G), k!(H), k!(J), k!(K), k!(L), k!(Semicolon), k!(Quote), a!(No), k!(Enter)],
            [k!(LShift), k!(Z), k!(X), k!(C), k!(V), k!(B), k!(N), k!(M), k!(Comma), k!(Dot), k!(Slash), a!(No), a!(No), k!(RShift)],
            [k!(LCtrl), k!(LGui), k!(LAlt), a!(No), a!(No), lt!(LOWER, Space), a!(No), a!(No), a!(No), mo!(LOWER), mo!(RAISE), a!(No), k!(RGui), k!(RCtrl)]
        ]),
        [
            [k!(Grave), k!(F1), k!(F2), k!(F3), k!(F4), k!(F5), k!(F6), k!(F7), k!(F8), k!(F9), k!(F10), k!(F11), k!(F12), k!(Delete)],
            [a!(Transparent); 14],
            [k!(CapsLock), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), k!(Left), k!(Down), k!(Up), k!(Right), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)],
            [a!(Transparent); 14],
            [a!(Transparent); 14]
        ],
        [
            [a!(Transparent), shifted!(Kc1), shifted!(Kc2), shifted!(Kc3), shifted!(Kc4), shifted!(Kc5), shifted!(Kc6), shifted!(Kc7), shifted!(Kc8), shifted!(Kc9), shifted!(Kc0), a!(Transparent), a!(Transparent), a!(Transparent)],
            [a!(Transparent); 14],
            [a!(Transparent); 14],
            [a!(Transparent); 14],
            [a!(Transparent); 14]
        ],
        [
            [a!(Transparent), k!(F13), k!(F14), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)],
            [a!(Transparent); 14],
            [a!(Transparent); 14],
            [a!(Transparent); 14],
            [a!(Transparent); 14]
        ],
    ]
}

pub fn wrap_keymap<const R: usize, const C: usize, const L: usize>(
    keymap: [[[KeyAction; C]; R]; L],
) -> KeyMap<'static, R, C, L> {
    // Box::leak is acceptable in tests
    let leaked_keymap = Box::leak(Box::new(keymap));
    KeyMap::new(leaked_keymap, None).unwrap()
}

pub fn create_test_keyboard_with_config(config: BehaviorConfig) -> TestKeyboard {
    Keyboard::new(wrap_keymap(get_keymap()), config, TestReporter::default(), NoStorage, ()).unwrap()
}

pub fn create_test_keyboard() -> TestKeyboard {
    create_test_keyboard_with_config(BehaviorConfig::default())
}

pub fn tri_layer_config() -> BehaviorConfig {
    BehaviorConfig {
        tri_layer: Some([LOWER, RAISE, ADJUST]),
        ..BehaviorConfig::default()
    }
}
