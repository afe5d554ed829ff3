use embassy_time::Instant;
use heapless::{Deque, Vec};

use crate::config::BehaviorConfig;
use crate::error::Error;
use crate::event::{Direction, KeyPos, KeyboardEvent, KeyboardEventPos, RotaryEncoderPos};
use crate::keymap::KeyMap;
use crate::layer::LayerState;
use crate::report::Reporter;
use crate::storage::DefaultLayerStorage;
use crate::tap_hold::{DualRoleKey, HoldRole, Interrupt, TapHoldEvent, TapHoldState};
use crate::types::action::{Action, KeyAction};
use crate::types::keycode::HidKeyCode;
use crate::types::modifier::ModifierCombination;

/// Size of the buffer of events received while a dual-role key is undecided
const EVENT_BUFFER_SIZE: usize = 16;
/// Max number of dual-role keys committed to hold at the same time
const HOLDING_KEYS: usize = 8;

/// Keyboard state that custom action handlers can change.
pub trait LayerControl {
    fn activate_layer(&mut self, layer: u8);
    fn deactivate_layer(&mut self, layer: u8);
    fn toggle_layer(&mut self, layer: u8);
    /// Set `l3` active iff both `l1` and `l2` are active
    fn update_tri_layer(&mut self, l1: u8, l2: u8, l3: u8);
    /// Switch and persist the default layer
    fn set_default_layer(&mut self, layer: u8);
    fn is_layer_active(&self, layer: u8) -> bool;
    fn default_layer(&self) -> u8;
    /// Press a keycode, modifiers are reference counted
    fn register_key(&mut self, key: HidKeyCode);
    fn unregister_key(&mut self, key: HidKeyCode);
    /// Modifiers currently held by any action
    fn modifiers(&self) -> ModifierCombination;
}

/// The custom-action dispatcher of a keymap.
pub trait UserHandler {
    /// Handle `Action::User(id)`, returns `true` if the action is consumed.
    ///
    /// Actions which are not consumed are forwarded to `Reporter::forward_user_action`.
    fn on_user_action(&mut self, id: u8, pressed: bool, ctrl: &mut dyn LayerControl) -> bool;

    /// Handle an encoder step before the keymap does, returns `true` if the step is consumed.
    fn on_encoder(&mut self, _id: u8, _direction: Direction, _ctrl: &mut dyn LayerControl) -> bool {
        false
    }

    /// A DIP switch changed
    fn on_dip_switch(&mut self, _index: u8, _active: bool, _ctrl: &mut dyn LayerControl) {}
}

impl UserHandler for () {
    fn on_user_action(&mut self, _id: u8, _pressed: bool, _ctrl: &mut dyn LayerControl) -> bool {
        false
    }
}

/// The part of the keyboard a `UserHandler` gets access to
struct Core<'a, R, S, const ROW: usize, const COL: usize, const NUM_LAYER: usize, const NUM_ENCODER: usize> {
    keymap: KeyMap<'a, ROW, COL, NUM_LAYER, NUM_ENCODER>,
    layers: LayerState<NUM_LAYER>,
    reporter: R,
    storage: S,
    /// Number of actions holding each modifier, indexed by modifier bit
    modifier_count: [u8; 8],
    /// Momentary layers reported to the reporter
    notified_layers: u32,
}

impl<'a, R: Reporter, S: DefaultLayerStorage, const ROW: usize, const COL: usize, const NUM_LAYER: usize, const NUM_ENCODER: usize>
    Core<'a, R, S, ROW, COL, NUM_LAYER, NUM_ENCODER>
{
    /// Press or release a keycode, modifier keycodes are emitted on the first press and the last release
    fn key(&mut self, key: HidKeyCode, pressed: bool) {
        match ModifierCombination::bit_of(key) {
            Some(bit) => {
                let count = &mut self.modifier_count[bit];
                if pressed {
                    *count = count.saturating_add(1);
                    if *count == 1 {
                        self.reporter.emit(key, true);
                    }
                } else if *count > 0 {
                    *count -= 1;
                    if *count == 0 {
                        self.reporter.emit(key, false);
                    }
                }
            }
            None => self.reporter.emit(key, pressed),
        }
    }

    fn register_modifiers(&mut self, modifiers: ModifierCombination) {
        for key in modifiers.keycodes() {
            self.key(key, true);
        }
    }

    fn unregister_modifiers(&mut self, modifiers: ModifierCombination) {
        for key in modifiers.keycodes() {
            self.key(key, false);
        }
    }

    fn held_modifiers(&self) -> ModifierCombination {
        let bits = self
            .modifier_count
            .iter()
            .enumerate()
            .filter(|(_, c)| **c > 0)
            .fold(0u8, |bits, (i, _)| bits | (1 << i));
        ModifierCombination::from_bits(bits)
    }

    /// Notify the reporter of every momentary layer changed since the last call
    fn sync_layers(&mut self) {
        let mask = self.layers.active_mask();
        let changed = mask ^ self.notified_layers;
        for layer in 0..NUM_LAYER as u8 {
            if changed & (1 << layer) != 0 {
                self.reporter.notify_layer_changed(layer, mask & (1 << layer) != 0);
            }
        }
        self.notified_layers = mask;
    }

    fn switch_default_layer(&mut self, layer: u8) {
        if !self.keymap.is_default_capable(layer) {
            warn!("Layer {} can't be the default layer", layer);
            return;
        }
        if self.layers.default_layer() == layer {
            return;
        }
        info!("Switch default layer to {}", layer);
        self.layers.set_default_layer(layer);
        if let Err(e) = self.storage.store_default_layer(layer) {
            error!("Failed to save default layer {}: {:?}", layer, e);
        }
        self.reporter.notify_default_layer_changed(layer);
    }
}

impl<'a, R: Reporter, S: DefaultLayerStorage, const ROW: usize, const COL: usize, const NUM_LAYER: usize, const NUM_ENCODER: usize>
    LayerControl for Core<'a, R, S, ROW, COL, NUM_LAYER, NUM_ENCODER>
{
    fn activate_layer(&mut self, layer: u8) {
        self.layers.activate_layer(layer);
        self.sync_layers();
    }

    fn deactivate_layer(&mut self, layer: u8) {
        self.layers.deactivate_layer(layer);
        self.sync_layers();
    }

    fn toggle_layer(&mut self, layer: u8) {
        self.layers.toggle_layer(layer);
        self.sync_layers();
    }

    fn update_tri_layer(&mut self, l1: u8, l2: u8, l3: u8) {
        self.layers.update_tri_layer(l1, l2, l3);
        self.sync_layers();
    }

    fn set_default_layer(&mut self, layer: u8) {
        self.switch_default_layer(layer);
    }

    fn is_layer_active(&self, layer: u8) -> bool {
        self.layers.is_active(layer)
    }

    fn default_layer(&self) -> u8 {
        self.layers.default_layer()
    }

    fn register_key(&mut self, key: HidKeyCode) {
        self.key(key, true);
    }

    fn unregister_key(&mut self, key: HidKeyCode) {
        self.key(key, false);
    }

    fn modifiers(&self) -> ModifierCombination {
        self.held_modifiers()
    }
}

/// The keyboard: owns the layer state and the tap-hold decisions, turns key events into keycodes.
///
/// Everything runs in the caller's scan context. Feed key events in arrival order with [`Keyboard::process`], then
/// call [`Keyboard::tick`] once per scan, it's the only driver of hold timeouts.
pub struct Keyboard<
    'a,
    R,
    S,
    H,
    const ROW: usize,
    const COL: usize,
    const NUM_LAYER: usize,
    const NUM_ENCODER: usize = 0,
> {
    core: Core<'a, R, S, ROW, COL, NUM_LAYER, NUM_ENCODER>,

    /// Custom action handler
    handler: H,

    /// Options for configurable action behavior
    behavior: BehaviorConfig,

    /// The dual-role key waiting for the tap/hold decision
    pending: Option<DualRoleKey>,

    /// Events received while `pending` is undecided, replayed in order after the decision
    buffer: Deque<KeyboardEvent, EVENT_BUFFER_SIZE>,

    /// Dual-role keys committed to hold
    holding: Vec<DualRoleKey, HOLDING_KEYS>,

    /// The layer each pressed key was resolved from, so that a release always matches its press
    layer_cache: [[u8; COL]; ROW],
}

impl<
    'a,
    R: Reporter,
    S: DefaultLayerStorage,
    H: UserHandler,
    const ROW: usize,
    const COL: usize,
    const NUM_LAYER: usize,
    const NUM_ENCODER: usize,
> Keyboard<'a, R, S, H, ROW, COL, NUM_LAYER, NUM_ENCODER>
{
    /// Create a keyboard, the default layer is loaded from `storage`.
    ///
    /// A default layer that can't be loaded, or that is not a valid default layer of the keymap, falls back to 0.
    pub fn new(
        keymap: KeyMap<'a, ROW, COL, NUM_LAYER, NUM_ENCODER>,
        behavior: BehaviorConfig,
        reporter: R,
        mut storage: S,
        handler: H,
    ) -> Result<Self, Error> {
        if let Some(tri_layer) = behavior.tri_layer {
            if let Some(&l) = tri_layer.iter().find(|&&l| l as usize >= NUM_LAYER) {
                return Err(Error::InvalidLayer(l));
            }
        }

        let default_layer = match storage.load_default_layer() {
            Ok(l) if keymap.is_default_capable(l) => l,
            Ok(l) => {
                warn!("Saved default layer {} is not valid, use layer 0", l);
                0
            }
            Err(e) => {
                error!("Failed to load default layer: {:?}", e);
                0
            }
        };
        let mut layers = LayerState::new(behavior.tri_layer, behavior.layer_priority);
        layers.set_default_layer(default_layer);

        Ok(Keyboard {
            core: Core {
                keymap,
                layers,
                reporter,
                storage,
                modifier_count: [0; 8],
                notified_layers: 0,
            },
            handler,
            behavior,
            pending: None,
            buffer: Deque::new(),
            holding: Vec::new(),
            layer_cache: [[default_layer; COL]; ROW],
        })
    }

    /// Process a key event
    pub fn process(&mut self, event: KeyboardEvent) {
        // Timeouts which happened before the event come first
        self.expire_pending(event.time);

        if self.pending.is_some() {
            self.process_while_pending(event);
        } else {
            self.process_event(event);
        }
    }

    /// Process an encoder step, the keymap's handler gets it first
    pub fn process_encoder(&mut self, id: u8, direction: Direction, time: Instant) {
        if self.handler.on_encoder(id, direction, &mut self.core) {
            return;
        }
        self.process(KeyboardEvent::rotary_encoder(id, direction, time));
    }

    /// Process a DIP switch change
    pub fn process_dip_switch(&mut self, index: u8, active: bool) {
        self.handler.on_dip_switch(index, active, &mut self.core);
    }

    /// Advance the timers
    pub fn tick(&mut self, now: Instant) {
        self.expire_pending(now);
    }

    /// Process the events of one scan in arrival order, then advance the timers
    pub fn scan<I: IntoIterator<Item = KeyboardEvent>>(&mut self, events: I, now: Instant) {
        for event in events {
            self.process(event);
        }
        self.tick(now);
    }

    /// Cancel the pending decision, drop the buffered events, deactivate all momentary layers and release all keys.
    ///
    /// The default layer is kept.
    pub fn reset(&mut self) {
        if let Some(mut key) = self.pending.take() {
            key.cancel();
        }
        self.buffer.clear();
        while let Some(mut key) = self.holding.pop() {
            key.cancel();
        }
        self.core.modifier_count = [0; 8];
        self.core.layers.clear();
        self.core.sync_layers();
        self.core.reporter.release_all();
        let default_layer = self.core.layers.default_layer();
        self.layer_cache = [[default_layer; COL]; ROW];
        info!("Keyboard reset, default layer {}", default_layer);
    }

    /// Replace an action of the keymap. The pending tap-hold decision is cancelled.
    pub fn set_action(&mut self, layer: u8, pos: KeyPos, action: KeyAction) -> Result<(), Error> {
        self.core.keymap.set_action_at(layer, pos, action)?;
        if let Some(mut key) = self.pending.take() {
            debug!("Keymap changed, cancel dual-role key {:?}", key.pos);
            key.cancel();
            self.pop_layer_cache(key.pos);
            self.replay_buffer();
        }
        Ok(())
    }

    pub fn layer_state(&self) -> &LayerState<NUM_LAYER> {
        &self.core.layers
    }

    pub fn keymap(&self) -> &KeyMap<'a, ROW, COL, NUM_LAYER, NUM_ENCODER> {
        &self.core.keymap
    }

    pub fn reporter(&self) -> &R {
        &self.core.reporter
    }

    pub fn reporter_mut(&mut self) -> &mut R {
        &mut self.core.reporter
    }

    pub fn storage(&self) -> &S {
        &self.core.storage
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Modifiers currently held by any action
    pub fn modifiers(&self) -> ModifierCombination {
        self.core.held_modifiers()
    }

    /// State of the undecided dual-role key, if any
    pub fn pending_state(&self) -> Option<TapHoldState> {
        self.pending.as_ref().map(|k| k.state())
    }

    /// Commit the pending key to hold if its timeout is reached at `now`.
    ///
    /// Replaying the buffer may make another dual-role key pending, which can be expired as well.
    fn expire_pending(&mut self, now: Instant) {
        while self.pending.as_mut().and_then(|k| k.poll(now)).is_some() {
            self.start_pending_hold();
        }
    }

    fn process_while_pending(&mut self, event: KeyboardEvent) {
        let Some(pending_pos) = self.pending.as_ref().map(|k| k.pos) else {
            self.process_event(event);
            return;
        };

        if !event.pressed {
            if event.pos == KeyboardEventPos::Key(pending_pos) {
                self.tap_pending();
                return;
            }
            if !self.buffer.iter().any(|e| e.pressed && e.pos == event.pos) {
                // Pressed before the pending key, the decision doesn't affect it
                self.process_event(event);
                return;
            }
        }

        if self.buffer.is_full() {
            warn!("Event buffer is full, {:?} is committed to hold", pending_pos);
            if let Some(key) = self.pending.as_mut() {
                key.commit_hold();
            }
            self.start_pending_hold();
            self.process(event);
            return;
        }

        let interrupt = if event.pressed {
            Interrupt::Press {
                dual_role: self.peek_dual_role(event.pos),
            }
        } else {
            Interrupt::Release
        };
        let _ = self.buffer.push_back(event);

        if self.pending.as_mut().and_then(|k| k.interrupt(interrupt)).is_some() {
            self.start_pending_hold();
        }
    }

    fn peek_dual_role(&self, pos: KeyboardEventPos) -> bool {
        match pos {
            KeyboardEventPos::Key(pos) => self.core.layers.resolve(&self.core.keymap, pos).0.is_dual_role(),
            KeyboardEventPos::RotaryEncoder(_) => false,
        }
    }

    /// The pending key is committed to hold, start the hold role and replay the buffer
    fn start_pending_hold(&mut self) {
        let Some(key) = self.pending.take() else {
            return;
        };
        self.hold_start(key.hold_role());
        if let Err(mut key) = self.holding.push(key) {
            error!("Too many held dual-role keys, release {:?}", key.pos);
            if let Some(TapHoldEvent::HoldEnd(role)) = key.release() {
                self.hold_end(role);
            }
        }
        self.replay_buffer();
    }

    /// The pending key is released before any hold decision, tap it and replay the buffer
    fn tap_pending(&mut self) {
        let Some(mut key) = self.pending.take() else {
            return;
        };
        self.pop_layer_cache(key.pos);
        if let Some(TapHoldEvent::Tap(keycode)) = key.release() {
            debug!("Dual-role key {:?} tapped: {:?}", key.pos, keycode);
            self.core.key(keycode, true);
            self.core.key(keycode, false);
            key.finish_tap();
        }
        self.replay_buffer();
    }

    fn replay_buffer(&mut self) {
        let mut events = core::mem::replace(&mut self.buffer, Deque::new());
        while let Some(event) = events.pop_front() {
            self.process(event);
        }
    }

    fn hold_start(&mut self, role: HoldRole) {
        match role {
            HoldRole::Modifier(modifiers) => self.core.register_modifiers(modifiers),
            HoldRole::Layer(layer) => {
                self.core.layers.activate_layer(layer);
                self.core.sync_layers();
            }
        }
    }

    fn hold_end(&mut self, role: HoldRole) {
        match role {
            HoldRole::Modifier(modifiers) => self.core.unregister_modifiers(modifiers),
            HoldRole::Layer(layer) => {
                self.core.layers.deactivate_layer(layer);
                self.core.sync_layers();
            }
        }
    }

    fn process_event(&mut self, event: KeyboardEvent) {
        match event.pos {
            KeyboardEventPos::Key(pos) => {
                if event.pressed {
                    self.press_key(pos, event.time);
                } else {
                    self.release_key(pos);
                }
            }
            KeyboardEventPos::RotaryEncoder(encoder) => {
                if event.pressed {
                    self.tap_encoder(encoder);
                }
            }
        }
    }

    fn press_key(&mut self, pos: KeyPos, time: Instant) {
        let (action, layer) = self.core.layers.resolve(&self.core.keymap, pos);
        debug!("Press {:?} on layer {}: {:?}", pos, layer, action);
        self.save_layer_cache(pos, layer);

        if let Some(mut key) = DualRoleKey::new(pos, action, &self.behavior.tap_hold) {
            key.press(time);
            self.pending = Some(key);
            return;
        }
        self.process_action(action, true);
    }

    fn release_key(&mut self, pos: KeyPos) {
        let layer = self.pop_layer_cache(pos);

        if let Some(i) = self.holding.iter().position(|k| k.pos == pos) {
            let mut key = self.holding.swap_remove(i);
            if let Some(TapHoldEvent::HoldEnd(role)) = key.release() {
                self.hold_end(role);
            }
            return;
        }

        let action = self.core.keymap.lookup(layer, pos);
        if action.is_dual_role() {
            // The press was cancelled
            return;
        }
        self.process_action(action, false);
    }

    fn tap_encoder(&mut self, encoder: RotaryEncoderPos) {
        let keymap = &self.core.keymap;
        let (action, layer) = self
            .core
            .layers
            .resolve_with(|l| keymap.encoder(l, encoder.id, encoder.direction));
        debug!("Encoder {:?} on layer {}: {:?}", encoder, layer, action);
        self.process_action(action, true);
        self.process_action(action, false);
    }

    fn process_action(&mut self, action: KeyAction, pressed: bool) {
        match action {
            KeyAction::No | KeyAction::Transparent => (),
            KeyAction::Single(action) => self.process_single(action, pressed),
            // Keys resolve dual-role actions on press, only encoders get here and they always tap
            KeyAction::ModifierTapHold(keycode, _, _) | KeyAction::LayerTapHold(keycode, _, _) => {
                self.core.key(keycode, pressed)
            }
        }
    }

    fn process_single(&mut self, action: Action, pressed: bool) {
        match action {
            Action::Key(keycode) => self.core.key(keycode, pressed),
            Action::KeyWithModifier(keycode, modifiers) => {
                if pressed {
                    self.core.register_modifiers(modifiers);
                    self.core.key(keycode, true);
                } else {
                    self.core.key(keycode, false);
                    self.core.unregister_modifiers(modifiers);
                }
            }
            Action::Modifier(modifiers) => {
                if pressed {
                    self.core.register_modifiers(modifiers);
                } else {
                    self.core.unregister_modifiers(modifiers);
                }
            }
            Action::LayerOn(layer) => {
                if pressed {
                    self.core.layers.activate_layer(layer);
                } else {
                    self.core.layers.deactivate_layer(layer);
                }
                self.core.sync_layers();
            }
            Action::DefaultLayer(layer) => {
                if pressed {
                    self.core.switch_default_layer(layer);
                }
            }
            Action::User(id) => {
                if !self.handler.on_user_action(id, pressed, &mut self.core) {
                    self.core.reporter.forward_user_action(id, pressed);
                }
            }
        }
    }

    fn save_layer_cache(&mut self, pos: KeyPos, layer: u8) {
        if let Some(cached) = self
            .layer_cache
            .get_mut(pos.row as usize)
            .and_then(|r| r.get_mut(pos.col as usize))
        {
            *cached = layer;
        }
    }

    /// Take the cached layer of a key and restore the cache to the default layer
    fn pop_layer_cache(&mut self, pos: KeyPos) -> u8 {
        let default_layer = self.core.layers.default_layer();
        match self
            .layer_cache
            .get_mut(pos.row as usize)
            .and_then(|r| r.get_mut(pos.col as usize))
        {
            Some(cached) => core::mem::replace(cached, default_layer),
            None => default_layer,
        }
    }
}
