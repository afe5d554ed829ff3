//! Accented characters typed from the accent layer.

use strum::FromRepr;

/// How the host turns a code point into a character
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UnicodeMode {
    /// IBus: `Ctrl+Shift+U`, hex digits, space
    #[default]
    Linux,
    /// Unicode Hex Input: hex digits while `Option` is held
    MacOs,
    /// WinCompose: compose key, `u`, hex digits, enter
    WinCompose,
}

/// Characters of the accent layer.
///
/// Most of them come in pairs: the lowercase form is typed by default, the uppercase one when shift is held.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, FromRepr)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Accent {
    /// Á á
    AAcute,
    /// Ä ä
    AUmlaut,
    /// É é
    EAcute,
    /// Í í
    IAcute,
    /// Ó ó
    OAcute,
    /// Ö ö
    OUmlaut,
    /// Ő ő
    ODoubleAcute,
    /// Ú ú
    UAcute,
    /// Ü ü
    UUmlaut,
    /// Ű ű
    UDoubleAcute,
    /// €
    Euro,
    /// ß
    SharpS,
}

impl Accent {
    /// Code point of the character, `shifted` selects the uppercase form of a pair
    pub const fn code_point(self, shifted: bool) -> u32 {
        let upper = match self {
            Accent::AAcute => 0x00C1,
            Accent::AUmlaut => 0x00C4,
            Accent::EAcute => 0x00C9,
            Accent::IAcute => 0x00CD,
            Accent::OAcute => 0x00D3,
            Accent::OUmlaut => 0x00D6,
            Accent::UAcute => 0x00DA,
            Accent::UUmlaut => 0x00DC,
            // Latin Extended-A, lowercase follows uppercase
            Accent::ODoubleAcute => return if shifted { 0x0150 } else { 0x0151 },
            Accent::UDoubleAcute => return if shifted { 0x0170 } else { 0x0171 },
            Accent::Euro => return 0x20AC,
            Accent::SharpS => return 0x00DF,
        };
        if shifted { upper } else { upper + 0x20 }
    }
}
