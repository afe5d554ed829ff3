use embassy_time::Instant;
use keylayer::event::KeyboardEvent;
use keylayer::report::Reporter;
use keylayer::storage::DefaultLayerStorage;
use keylayer::types::keycode::HidKeyCode;
use preonic_keymap::{PreonicKeyboard, create_keyboard, get_default_encoder_map, get_default_keymap};

// Init logger for tests
#[ctor::ctor]
pub fn init_log() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

/// Records everything the keyboard tells the host side
#[derive(Default, Debug)]
pub struct Recorder {
    pub keys: Vec<(HidKeyCode, bool)>,
    pub layer_changes: Vec<(u8, bool)>,
    pub default_layers: Vec<u8>,
    pub user_actions: Vec<(u8, bool)>,
}

impl Recorder {
    pub fn pressed_keys(&self) -> Vec<HidKeyCode> {
        self.keys.iter().filter(|(_, pressed)| *pressed).map(|(k, _)| *k).collect()
    }
}

impl Reporter for Recorder {
    fn emit(&mut self, key: HidKeyCode, pressed: bool) {
        self.keys.push((key, pressed));
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
}

pub fn create_preonic<S: DefaultLayerStorage>(storage: S) -> PreonicKeyboard<'static, Recorder, S> {
    let layers = Box::leak(Box::new(get_default_keymap()));
    let encoders = Box::leak(Box::new(get_default_encoder_map()));
    create_keyboard(layers, encoders, Recorder::default(), storage).unwrap()
}

/// Feed one key event at `time` ms and advance the timers to it
pub fn key<S: DefaultLayerStorage>(keyboard: &mut PreonicKeyboard<'static, Recorder, S>, row: u8, col: u8, pressed: bool, time: u64) {
    let now = Instant::from_millis(time);
    keyboard.scan([KeyboardEvent::key(row, col, pressed, now)], now);
}

/// Press and release a key, 10 ms apart
pub fn tap<S: DefaultLayerStorage>(keyboard: &mut PreonicKeyboard<'static, Recorder, S>, row: u8, col: u8, time: u64) {
    key(keyboard, row, col, true, time);
    key(keyboard, row, col, false, time + 10);
}
