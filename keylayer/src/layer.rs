use heapless::Vec;

use crate::config::LayerPriority;
use crate::event::KeyPos;
use crate::keymap::KeyMap;
use crate::types::action::KeyAction;

/// The layer stack: a persistent default layer plus the momentarily activated layers.
#[derive(Clone, Debug)]
pub struct LayerState<const NUM_LAYER: usize> {
    /// Default layer number, it has the lowest priority
    default_layer: u8,
    /// Momentary layers, in activation order
    active: Vec<u8, NUM_LAYER>,
    /// Tri layer config, `[lower, raise, adjust]`
    tri_layer: Option<[u8; 3]>,
    priority: LayerPriority,
}

impl<const NUM_LAYER: usize> Default for LayerState<NUM_LAYER> {
    fn default() -> Self {
        Self::new(None, LayerPriority::default())
    }
}

impl<const NUM_LAYER: usize> LayerState<NUM_LAYER> {
    pub fn new(tri_layer: Option<[u8; 3]>, priority: LayerPriority) -> Self {
        const { assert!(NUM_LAYER > 0 && NUM_LAYER <= 32, "the number of layers must be in 1..=32") };
        Self {
            default_layer: 0,
            active: Vec::new(),
            tri_layer,
            priority,
        }
    }

    /// Resolve the action at the given position, returns the action and the layer it comes from.
    ///
    /// Active layers are checked from the highest priority down to the default layer, transparent entries fall
    /// through. The default layer's entry is returned when every active layer is transparent at `pos`. A position
    /// that is transparent even at the default layer (i.e. outside the matrix) resolves to `KeyAction::No`.
    pub fn resolve<const ROW: usize, const COL: usize, const NUM_ENCODER: usize>(
        &self,
        keymap: &KeyMap<'_, ROW, COL, NUM_LAYER, NUM_ENCODER>,
        pos: KeyPos,
    ) -> (KeyAction, u8) {
        self.resolve_with(|layer| keymap.lookup(layer, pos))
    }

    /// Resolve an action with a custom per-layer lookup
    pub fn resolve_with<F: Fn(u8) -> KeyAction>(&self, lookup: F) -> (KeyAction, u8) {
        for layer in self.priority_order() {
            let action = lookup(layer);
            if action != KeyAction::Transparent {
                return (action, layer);
            }
        }

        match lookup(self.default_layer) {
            KeyAction::Transparent => (KeyAction::No, self.default_layer),
            action => (action, self.default_layer),
        }
    }

    /// Momentary layers from the highest priority to the lowest, the default layer excluded
    fn priority_order(&self) -> Vec<u8, NUM_LAYER> {
        let mut order = self.active.clone();
        match self.priority {
            LayerPriority::HighestIndex => order.sort_unstable_by(|a, b| b.cmp(a)),
            LayerPriority::MostRecent => order.reverse(),
        }
        order.retain(|&l| l != self.default_layer);
        order
    }

    /// The layer checked first by `resolve`
    pub fn highest_active(&self) -> u8 {
        self.priority_order().first().copied().unwrap_or(self.default_layer)
    }

    fn check_layer(layer: u8) -> bool {
        if layer as usize >= NUM_LAYER {
            warn!(
                "Not a valid layer {}, keyboard supports only {} layers",
                layer, NUM_LAYER
            );
            return false;
        }
        true
    }

    fn set_active(&mut self, layer: u8, active: bool) {
        match (self.is_active(layer), active) {
            (false, true) => {
                // Every layer is in the list at most once, so there is always room
                let _ = self.active.push(layer);
            }
            (true, false) => self.active.retain(|&l| l != layer),
            _ => (),
        }
    }

    /// Recompute the configured tri layer if `layer` is one of its sources
    fn update_configured_tri_layer(&mut self, layer: u8) {
        if let Some([l1, l2, l3]) = self.tri_layer {
            if layer == l1 || layer == l2 {
                self.update_tri_layer(l1, l2, l3);
            }
        }
    }

    /// Activate given layer
    pub fn activate_layer(&mut self, layer: u8) {
        if !Self::check_layer(layer) {
            return;
        }
        self.set_active(layer, true);
        self.update_configured_tri_layer(layer);
    }

    /// Deactivate given layer
    pub fn deactivate_layer(&mut self, layer: u8) {
        if !Self::check_layer(layer) {
            return;
        }
        self.set_active(layer, false);
        self.update_configured_tri_layer(layer);
    }

    /// Toggle given layer
    pub fn toggle_layer(&mut self, layer: u8) {
        if self.is_active(layer) {
            self.deactivate_layer(layer);
        } else {
            self.activate_layer(layer);
        }
    }

    /// Set `l3` active iff both `l1` and `l2` are active
    pub fn update_tri_layer(&mut self, l1: u8, l2: u8, l3: u8) {
        if !(Self::check_layer(l1) && Self::check_layer(l2) && Self::check_layer(l3)) {
            return;
        }
        let both = self.is_active(l1) && self.is_active(l2);
        self.set_active(l3, both);
    }

    /// Whether the layer is momentarily activated
    pub fn is_active(&self, layer: u8) -> bool {
        self.active.contains(&layer)
    }

    /// The momentary layers as a bitmask, bit `n` for layer `n`
    pub fn active_mask(&self) -> u32 {
        self.active.iter().fold(0, |mask, &l| mask | (1 << l))
    }

    pub fn default_layer(&self) -> u8 {
        self.default_layer
    }

    /// Set the default layer number, observed by the next `resolve`
    pub fn set_default_layer(&mut self, layer: u8) {
        if !Self::check_layer(layer) {
            return;
        }
        self.default_layer = layer;
    }

    /// Deactivate all momentary layers, the default layer is kept
    pub fn clear(&mut self) {
        self.active.clear();
    }

    pub fn tri_layer(&self) -> Option<[u8; 3]> {
        self.tri_layer
    }
}
