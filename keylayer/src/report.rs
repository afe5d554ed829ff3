//! Output side of the keyboard.
//!
//! [`Reporter`] is the sink the keyboard drives. [`ReportBuilder`] is a ready-made sink which folds keycode
//! transitions into HID reports, for the transport layer to send.

use heapless::Deque;

use crate::types::keycode::HidKeyCode;

/// The output-emission collaborator.
pub trait Reporter {
    /// A resolved keycode is pressed or released
    fn emit(&mut self, key: HidKeyCode, pressed: bool);

    /// A momentary layer is activated or deactivated
    fn notify_layer_changed(&mut self, _layer: u8, _active: bool) {}

    /// The default layer is switched
    fn notify_default_layer_changed(&mut self, _layer: u8) {}

    /// A custom action that the keymap's handler didn't consume
    fn forward_user_action(&mut self, _id: u8, _pressed: bool) {}

    /// Release everything, called when the keyboard is reset
    fn release_all(&mut self) {}
}

/// Normal keyboard hid report, 6KRO
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyboardReport {
    pub modifier: u8,
    pub reserved: u8,
    pub leds: u8,
    pub keycodes: [u8; 6],
}

/// Consumer page report
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MediaKeyboardReport {
    pub usage_id: u16,
}

/// Mouse hid report
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MouseReport {
    pub buttons: u8,
    pub x: i8,
    pub y: i8,
    pub wheel: i8,
    pub pan: i8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Report {
    /// Normal keyboard hid report
    KeyboardReport(KeyboardReport),
    /// Mouse hid report
    MouseReport(MouseReport),
    /// Media keyboard report
    MediaKeyboardReport(MediaKeyboardReport),
}

/// Distance of one mouse key step
const MOUSE_STEP: i8 = 8;

/// Folds `emit` calls into HID reports and queues them.
///
/// When the queue is full, the oldest report is dropped.
#[derive(Debug)]
pub struct ReportBuilder<const N: usize = 16> {
    report: KeyboardReport,
    mouse: MouseReport,
    reports: Deque<Report, N>,
}

impl<const N: usize> Default for ReportBuilder<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ReportBuilder<N> {
    pub fn new() -> Self {
        Self {
            report: KeyboardReport::default(),
            mouse: MouseReport::default(),
            reports: Deque::new(),
        }
    }

    /// Current keyboard report
    pub fn keyboard_report(&self) -> &KeyboardReport {
        &self.report
    }

    /// Take the oldest report
    pub fn pop(&mut self) -> Option<Report> {
        self.reports.pop_front()
    }

    pub fn pending_reports(&self) -> usize {
        self.reports.len()
    }

    fn push(&mut self, report: Report) {
        if self.reports.is_full() {
            warn!("Report queue is full, dropping the oldest report");
            self.reports.pop_front();
        }
        let _ = self.reports.push_back(report);
    }

    fn push_keyboard_report(&mut self) {
        self.push(Report::KeyboardReport(self.report));
    }

    fn update_keycode(&mut self, key: HidKeyCode, pressed: bool) {
        let code = key as u8;
        if pressed {
            if self.report.keycodes.contains(&code) {
                return;
            }
            match self.report.keycodes.iter_mut().find(|k| **k == 0) {
                Some(slot) => *slot = code,
                None => {
                    warn!("Keyboard report is full, {:?} is dropped", key);
                    return;
                }
            }
        } else {
            match self.report.keycodes.iter_mut().find(|k| **k == code) {
                Some(slot) => *slot = 0,
                None => return,
            }
        }
        self.push_keyboard_report();
    }

    fn update_modifier(&mut self, key: HidKeyCode, pressed: bool) {
        let bit = key.to_modifier().into_bits();
        if pressed {
            self.report.modifier |= bit;
        } else {
            self.report.modifier &= !bit;
        }
        self.push_keyboard_report();
    }

    fn update_media(&mut self, key: HidKeyCode, pressed: bool) {
        let usage_id = if pressed { key.consumer_usage().unwrap_or(0) } else { 0 };
        self.push(Report::MediaKeyboardReport(MediaKeyboardReport { usage_id }));
    }

    fn update_mouse(&mut self, key: HidKeyCode, pressed: bool) {
        let step = if pressed { MOUSE_STEP } else { 0 };
        let wheel = if pressed { 1 } else { 0 };
        match key {
            HidKeyCode::MouseUp => self.mouse.y = -step,
            HidKeyCode::MouseDown => self.mouse.y = step,
            HidKeyCode::MouseLeft => self.mouse.x = -step,
            HidKeyCode::MouseRight => self.mouse.x = step,
            HidKeyCode::MouseWheelUp => self.mouse.wheel = wheel,
            HidKeyCode::MouseWheelDown => self.mouse.wheel = -wheel,
            HidKeyCode::MouseWheelLeft => self.mouse.pan = -wheel,
            HidKeyCode::MouseWheelRight => self.mouse.pan = wheel,
            HidKeyCode::MouseBtn1
            | HidKeyCode::MouseBtn2
            | HidKeyCode::MouseBtn3
            | HidKeyCode::MouseBtn4
            | HidKeyCode::MouseBtn5 => {
                let bit = 1 << (key as u8 - HidKeyCode::MouseBtn1 as u8);
                if pressed {
                    self.mouse.buttons |= bit;
                } else {
                    self.mouse.buttons &= !bit;
                }
            }
            _ => {
                debug!("Mouse acceleration key {:?} is not supported", key);
                return;
            }
        }
        self.push(Report::MouseReport(self.mouse));
    }
}

impl<const N: usize> Reporter for ReportBuilder<N> {
    fn emit(&mut self, key: HidKeyCode, pressed: bool) {
        if key == HidKeyCode::No {
            return;
        }
        if key.is_modifier() {
            self.update_modifier(key, pressed);
        } else if key.is_consumer() {
            self.update_media(key, pressed);
        } else if key.is_mouse_key() {
            self.update_mouse(key, pressed);
        } else {
            self.update_keycode(key, pressed);
        }
    }

    fn notify_layer_changed(&mut self, layer: u8, active: bool) {
        debug!("Layer {} is {}", layer, if active { "on" } else { "off" });
    }

    fn forward_user_action(&mut self, id: u8, pressed: bool) {
        debug!("Custom action {} is not handled, pressed: {}", id, pressed);
    }

    fn release_all(&mut self) {
        if self.report != KeyboardReport::default() {
            self.report = KeyboardReport::default();
            self.push_keyboard_report();
        }
        if self.mouse != MouseReport::default() {
            self.mouse = MouseReport::default();
            self.push(Report::MouseReport(self.mouse));
        }
    }
}
