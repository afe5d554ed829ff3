/// Create a layer in keymap
#[macro_export]
macro_rules! layer {
    ([$([$($x: expr), +]), +]) => {
        [$([$($x), +]),+]
    };
}

/// Create a normal key. For example, `k!(A)` represents `KeyAction::Single(Action::Key(HidKeyCode::A))`
#[macro_export]
macro_rules! k {
    ($k: ident) => {
        $crate::types::action::KeyAction::Single($crate::types::action::Action::Key(
            $crate::types::keycode::HidKeyCode::$k,
        ))
    };
}

/// Create a normal key with modifier action, such as `wm!(F4, ModifierCombination::LALT)`
#[macro_export]
macro_rules! wm {
    ($x: ident, $m: expr) => {
        $crate::types::action::KeyAction::Single($crate::types::action::Action::KeyWithModifier(
            $crate::types::keycode::HidKeyCode::$x,
            $m,
        ))
    };
}

/// Create a normal action: `KeyAction`
#[macro_export]
macro_rules! a {
    ($a: ident) => {
        $crate::types::action::KeyAction::$a
    };
}

/// Create a layer activate action. For example, `mo!(1)` activates layer 1.
#[macro_export]
macro_rules! mo {
    ($x: expr) => {
        $crate::types::action::KeyAction::Single($crate::types::action::Action::LayerOn($x))
    };
}

/// Create a layer activate action or tap key(tap/hold)
#[macro_export]
macro_rules! lt {
    ($x: expr, $k: ident) => {
        $crate::types::action::KeyAction::LayerTapHold(
            $crate::types::keycode::HidKeyCode::$k,
            $x,
            $crate::types::action::TapHoldProfile::const_default(),
        )
    };
    ($x: expr, $k: ident, $p: expr) => {
        $crate::types::action::KeyAction::LayerTapHold($crate::types::keycode::HidKeyCode::$k, $x, $p)
    };
}

/// Create a modifier-tap-hold action
#[macro_export]
macro_rules! mt {
    ($k: ident, $m: expr) => {
        $crate::types::action::KeyAction::ModifierTapHold(
            $crate::types::keycode::HidKeyCode::$k,
            $m,
            $crate::types::action::TapHoldProfile::const_default(),
        )
    };
    ($k: ident, $m: expr, $p: expr) => {
        $crate::types::action::KeyAction::ModifierTapHold($crate::types::keycode::HidKeyCode::$k, $m, $p)
    };
}

/// create a switch default layer action, `n` is the layer number
#[macro_export]
macro_rules! df {
    ($x: expr) => {
        $crate::types::action::KeyAction::Single($crate::types::action::Action::DefaultLayer($x))
    };
}

/// Create a custom action, dispatched to the keymap's `UserHandler`
#[macro_export]
macro_rules! user {
    ($id: expr) => {
        $crate::types::action::KeyAction::Single($crate::types::action::Action::User($id))
    };
}

/// Create a shifted key
#[macro_export]
macro_rules! shifted {
    ($x: ident) => {
        $crate::wm!($x, $crate::types::modifier::ModifierCombination::LSHIFT)
    };
}

/// Create an encoder action, the first argument is the clockwise action, the second is the counter-clockwise action
#[macro_export]
macro_rules! encoder {
    ($clockwise: expr, $counter_clockwise: expr) => {
        $crate::types::action::EncoderAction::new($clockwise, $counter_clockwise)
    };
}
