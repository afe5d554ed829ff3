pub mod common;

use keylayer::Error;
use keylayer::config::BehaviorConfig;
use keylayer::keyboard::Keyboard;
use keylayer::storage::{DefaultLayerStorage, EepromStorage, RamStorage};
use keylayer::types::action::KeyAction;
use keylayer::{df, k};

use crate::common::{TestReporter, run_key_sequence_test, wrap_keymap};

#[rustfmt::skip]
fn keymap() -> [[[KeyAction; 3]; 1]; 2] {
    [
        [[k!(A), df!(1), df!(0)]],
        [[k!(B), df!(0), df!(1)]],
    ]
}

fn create_keyboard<S: DefaultLayerStorage>(storage: S) -> Keyboard<'static, TestReporter, S, (), 1, 3, 2> {
    Keyboard::new(wrap_keymap(keymap()), BehaviorConfig::default(), TestReporter::default(), storage, ()).unwrap()
}

/// Records every store
#[derive(Default)]
struct RecordingStorage {
    layer: u8,
    stores: Vec<u8>,
}

impl DefaultLayerStorage for RecordingStorage {
    fn load_default_layer(&mut self) -> Result<u8, Error> {
        Ok(self.layer)
    }

    fn store_default_layer(&mut self, layer: u8) -> Result<(), Error> {
        self.layer = layer;
        self.stores.push(layer);
        Ok(())
    }
}

struct BrokenStorage;

impl DefaultLayerStorage for BrokenStorage {
    fn load_default_layer(&mut self) -> Result<u8, Error> {
        Err(Error::Storage)
    }

    fn store_default_layer(&mut self, _layer: u8) -> Result<(), Error> {
        Err(Error::Storage)
    }
}

#[test]
fn test_default_layer_survives_restart() {
    let mut storage = EepromStorage::new(RamStorage::<16>::new());
    {
        let mut keyboard = create_keyboard(&mut storage);
        assert_eq!(keyboard.layer_state().default_layer(), 0);
        run_key_sequence_test(
            &mut keyboard,
            &key_sequence![
                [0, 1, true, 10], // Switch to layer 1
                [0, 1, false, 10],
                [0, 0, true, 10], // B
                [0, 0, false, 10],
            ],
            &key_report![
                [0, [kc8!(B), 0, 0, 0, 0, 0]],
                [0, [0, 0, 0, 0, 0, 0]],
            ],
        );
        assert_eq!(keyboard.reporter().default_layers, vec![1]);
    }

    // Power cycle
    let mut keyboard = create_keyboard(&mut storage);
    assert_eq!(keyboard.layer_state().default_layer(), 1);
    run_key_sequence_test(
        &mut keyboard,
        &key_sequence![[0, 0, true, 10], [0, 0, false, 10]],
        &key_report![
            [0, [kc8!(B), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
        ],
    );
}

#[test]
fn test_store_only_on_change() {
    let mut storage = RecordingStorage::default();
    let mut keyboard = create_keyboard(&mut storage);
    run_key_sequence_test(
        &mut keyboard,
        &key_sequence![
            [0, 2, true, 10], // Already on layer 0
            [0, 2, false, 10],
            [0, 1, true, 10], // Switch to layer 1
            [0, 1, false, 10],
            [0, 2, true, 10], // Already on layer 1
            [0, 2, false, 10],
        ],
        &[],
    );
    drop(keyboard);
    assert_eq!(storage.stores, vec![1]);
}

#[test]
fn test_invalid_stored_layer() {
    let mut storage = RecordingStorage {
        layer: 5,
        ..Default::default()
    };
    let keyboard = create_keyboard(&mut storage);
    assert_eq!(keyboard.layer_state().default_layer(), 0);
}

#[test]
fn test_broken_storage() {
    let mut keyboard = create_keyboard(BrokenStorage);
    assert_eq!(keyboard.layer_state().default_layer(), 0);

    // The switch still happens, it's just not persisted
    run_key_sequence_test(&mut keyboard, &key_sequence![[0, 1, true, 10], [0, 1, false, 10]], &[]);
    assert_eq!(keyboard.layer_state().default_layer(), 1);
}
