use crate::error::Error;
use crate::event::{Direction, KeyPos};
use crate::types::action::{Action, EncoderAction, KeyAction};

/// Keymap represents the stack of layers.
///
/// The conception of Keymap is borrowed from qmk: <https://docs.qmk.fm/#/keymap>.
///
/// Keymap should be binded to the actual pcb matrix definition.
/// The keyboard uses tuple `(layer, row, col)` to retrieve the action from Keymap.
pub struct KeyMap<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize, const NUM_ENCODER: usize = 0> {
    /// Layers
    layers: &'a mut [[[KeyAction; COL]; ROW]; NUM_LAYER],
    /// Rotary encoders, each rotary encoder is represented as (Clockwise, CounterClockwise)
    encoders: Option<&'a mut [[EncoderAction; NUM_ENCODER]; NUM_LAYER]>,
    /// Layers that can become the default layer, one bit per layer
    default_capable: u32,
}

impl<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize, const NUM_ENCODER: usize>
    KeyMap<'a, ROW, COL, NUM_LAYER, NUM_ENCODER>
{
    /// Create and validate a keymap.
    ///
    /// Layer 0 and every layer targeted by a `DefaultLayer` action must be fully covered, i.e. must not contain
    /// any `Transparent` entry. Every layer referenced by an action must exist.
    pub fn new(
        action_map: &'a mut [[[KeyAction; COL]; ROW]; NUM_LAYER],
        encoder_map: Option<&'a mut [[EncoderAction; NUM_ENCODER]; NUM_LAYER]>,
    ) -> Result<Self, Error> {
        const {
            assert!(NUM_LAYER > 0 && NUM_LAYER <= 32, "the number of layers must be in 1..=32");
            assert!(ROW <= 256 && COL <= 256, "rows and columns are addressed by u8");
        }

        let mut keymap = KeyMap {
            layers: action_map,
            encoders: encoder_map,
            default_capable: 0,
        };

        let mut default_layers = 1u32;
        for layer in keymap.layers.iter() {
            for action in layer.iter().flatten() {
                default_layers |= Self::check_action(action)?;
            }
        }
        if let Some(encoders) = &keymap.encoders {
            for encoder in encoders.iter().flatten() {
                default_layers |= Self::check_action(&encoder.clockwise())?;
                default_layers |= Self::check_action(&encoder.counter_clockwise())?;
            }
        }

        for layer in 0..NUM_LAYER as u8 {
            if default_layers & (1 << layer) != 0 {
                keymap.allow_default_layer(layer)?;
            }
        }

        Ok(keymap)
    }

    /// Mark a layer as a valid default layer, for keymaps which switch the default layer from custom actions.
    pub fn allow_default_layer(&mut self, layer: u8) -> Result<(), Error> {
        if layer as usize >= NUM_LAYER {
            return Err(Error::InvalidLayer(layer));
        }
        for (row, keys) in self.layers[layer as usize].iter().enumerate() {
            if let Some(col) = keys.iter().position(|a| *a == KeyAction::Transparent) {
                error!("Layer {} can be the default layer, but ({}, {}) is transparent", layer, row, col);
                return Err(Error::Configuration {
                    layer,
                    row: row as u8,
                    col: col as u8,
                });
            }
        }
        self.default_capable |= 1 << layer;
        Ok(())
    }

    pub fn is_default_capable(&self, layer: u8) -> bool {
        (layer as usize) < NUM_LAYER && self.default_capable & (1 << layer) != 0
    }

    /// Check the layer referenced by an action, returns the default layer bit it adds
    fn check_action(action: &KeyAction) -> Result<u32, Error> {
        match action.layer() {
            Some(l) if l as usize >= NUM_LAYER => Err(Error::InvalidLayer(l)),
            Some(l) if matches!(action, KeyAction::Single(Action::DefaultLayer(_))) => Ok(1 << l),
            _ => Ok(0),
        }
    }

    /// Fetch the action in keymap. Positions outside the matrix are transparent.
    ///
    /// # Panics
    ///
    /// Panics if `layer` doesn't exist.
    pub fn lookup(&self, layer: u8, pos: KeyPos) -> KeyAction {
        assert!((layer as usize) < NUM_LAYER, "Layer {} doesn't exist", layer);
        self.layers[layer as usize]
            .get(pos.row as usize)
            .and_then(|keys| keys.get(pos.col as usize))
            .copied()
            .unwrap_or(KeyAction::Transparent)
    }

    /// Fetch the encoder action in the given direction, transparent if there is no such encoder.
    pub fn encoder(&self, layer: u8, id: u8, direction: Direction) -> KeyAction {
        assert!((layer as usize) < NUM_LAYER, "Layer {} doesn't exist", layer);
        match self
            .encoders
            .as_ref()
            .and_then(|encoders| encoders[layer as usize].get(id as usize))
        {
            Some(encoder) => match direction {
                Direction::Clockwise => encoder.clockwise(),
                Direction::CounterClockwise => encoder.counter_clockwise(),
            },
            None => KeyAction::Transparent,
        }
    }

    /// Replace the action at the given position, keeping the keymap valid.
    pub fn set_action_at(&mut self, layer: u8, pos: KeyPos, action: KeyAction) -> Result<(), Error> {
        if layer as usize >= NUM_LAYER {
            return Err(Error::InvalidLayer(layer));
        }
        let (row, col) = (pos.row as usize, pos.col as usize);
        if row >= ROW || col >= COL {
            warn!("Position ({}, {}) is out of the matrix", pos.row, pos.col);
            return Ok(());
        }
        if action == KeyAction::Transparent && self.is_default_capable(layer) {
            return Err(Error::Configuration {
                layer,
                row: pos.row,
                col: pos.col,
            });
        }
        let new_default = Self::check_action(&action)?;
        let old = core::mem::replace(&mut self.layers[layer as usize][row][col], action);
        if new_default != 0 {
            let target = new_default.trailing_zeros() as u8;
            if let Err(e) = self.allow_default_layer(target) {
                self.layers[layer as usize][row][col] = old;
                return Err(e);
            }
        }
        Ok(())
    }

    pub fn num_layer(&self) -> usize {
        NUM_LAYER
    }
}
