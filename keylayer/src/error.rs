use core::fmt;

/// Errors reported to whoever embeds the keyboard core.
///
/// All of them are configuration or persistence faults. Runtime operations on the layer stack never fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A layer that can become the default layer has a transparent entry, so there is no fallback for it
    Configuration { layer: u8, row: u8, col: u8 },
    /// A layer id is out of range
    InvalidLayer(u8),
    /// The persistence collaborator failed
    Storage,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration { layer, row, col } => write!(
                f,
                "Transparent entry at ({}, {}) of layer {}, which can be the default layer",
                row, col, layer
            ),
            Error::InvalidLayer(layer) => write!(f, "Invalid layer {}", layer),
            Error::Storage => write!(f, "Storage error"),
        }
    }
}

impl core::error::Error for Error {}
