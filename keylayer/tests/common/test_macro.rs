extern crate keylayer;

#[macro_export]
macro_rules! key_sequence_test {
    (keyboard: $keyboard:expr, sequence: [$([$row:expr, $col:expr, $pressed:expr, $delay:expr]),* $(,)?], expected_reports: [$([$modifier:expr, $keys:expr]),* $(,)?]) => {{
        let mut keyboard = $keyboard;
        let sequence = $crate::key_sequence![$([$row, $col, $pressed, $delay]),*];
        let expected_reports = $crate::key_report![$([$modifier, $keys]),*];
        $crate::common::run_key_sequence_test(&mut keyboard, &sequence, &expected_reports);
    }};
}

// Map a key name to its keycode in u8
#[macro_export]
macro_rules! kc8 {
    ($key: ident) => {
        keylayer::types::keycode::HidKeyCode::$key as u8
    };
}

// Create a key sequence which simulates key presses
#[macro_export]
macro_rules! key_sequence {
    ($([$row:expr, $col:expr, $pressed:expr, $delay:expr]),* $(,)?) => {
        vec![
            $(
                $crate::common::TestKeyPress {
                    row: $row,
                    col: $col,
                    pressed: $pressed,
                    delay: $delay,
                },
            )*
        ]
    };
}

// Create keyboard reports
#[macro_export]
macro_rules! key_report {
    ($([$modifier:expr, $keys:expr]),* $(,)?) => {
        {
            let reports: Vec<keylayer::report::KeyboardReport> = vec![
                $(
                    keylayer::report::KeyboardReport {
                        modifier: $modifier,
                        keycodes: $keys,
                        leds: 0,
                        reserved: 0,
                    },
                )*
            ];
            reports
        }
    };
}
