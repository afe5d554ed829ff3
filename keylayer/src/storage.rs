//! Persistence of the default layer.

use byteorder::{BigEndian, ByteOrder};
use embedded_storage::{ReadStorage, Storage};
use postcard::experimental::max_size::MaxSize;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The persistence collaborator of the keyboard.
///
/// Stores must be durable across power loss.
pub trait DefaultLayerStorage {
    fn load_default_layer(&mut self) -> Result<u8, Error>;
    fn store_default_layer(&mut self, layer: u8) -> Result<(), Error>;
}

impl<T: DefaultLayerStorage + ?Sized> DefaultLayerStorage for &mut T {
    fn load_default_layer(&mut self) -> Result<u8, Error> {
        (**self).load_default_layer()
    }

    fn store_default_layer(&mut self, layer: u8) -> Result<(), Error> {
        (**self).store_default_layer(layer)
    }
}

/// A storage which persists nothing, the default layer is always 0 after restart
#[derive(Debug, Default, Clone, Copy)]
pub struct NoStorage;

impl DefaultLayerStorage for NoStorage {
    fn load_default_layer(&mut self) -> Result<u8, Error> {
        Ok(0)
    }

    fn store_default_layer(&mut self, _layer: u8) -> Result<(), Error> {
        Ok(())
    }
}

/// EEPROM magic value.
/// If the first 2 bytes of eeprom equals it, eeprom is enabled.
pub(crate) const EEPROM_MAGIC: u16 = 0xFEE6;
const EEPROM_DISABLED_MAGIC: u16 = 0xFFFF;

/// Start address of eeprom magic value
const MAGIC_ADDR: u32 = 0;
/// Size of eeprom magic value: 2 bytes
const MAGIC_SIZE: usize = 2;
/// Start address of the config record
const CONFIG_ADDR: u32 = 2;

/// Keyboard configurations which should be saved in eeprom.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) struct Eeconfig {
    pub(crate) default_layer: u8,
}

/// Keeps the default layer in a byte-addressable storage, e.g. EEPROM or its emulation.
///
/// Layout: the 2-byte magic `0xFEE6` (big endian), followed by the postcard-encoded config record.
pub struct EepromStorage<S: Storage> {
    storage: S,
    base: u32,
}

impl<S: Storage> EepromStorage<S> {
    pub fn new(storage: S) -> Self {
        Self::with_offset(storage, 0)
    }

    /// Use the storage starting at `base`
    pub fn with_offset(storage: S, base: u32) -> Self {
        Self { storage, base }
    }

    pub fn release(self) -> S {
        self.storage
    }

    pub fn inner(&self) -> &S {
        &self.storage
    }

    /// Enable or disable eeprom by writing magic value
    pub fn set_enable(&mut self, enabled: bool) -> Result<(), Error> {
        let magic = if enabled {
            EEPROM_MAGIC
        } else {
            EEPROM_DISABLED_MAGIC
        };
        let mut buf = [0xFF; MAGIC_SIZE];
        BigEndian::write_u16(&mut buf, magic);
        self.storage
            .write(self.base + MAGIC_ADDR, &buf)
            .map_err(|_| Error::Storage)
    }

    /// Returns eeprom magic value stored in EEPROM
    pub fn get_magic(&mut self) -> Result<u16, Error> {
        let mut buf = [0; MAGIC_SIZE];
        self.storage
            .read(self.base + MAGIC_ADDR, &mut buf)
            .map_err(|_| Error::Storage)?;
        Ok(BigEndian::read_u16(&buf))
    }

    fn read_config(&mut self) -> Result<Eeconfig, Error> {
        let mut buf = [0; Eeconfig::POSTCARD_MAX_SIZE];
        self.storage
            .read(self.base + CONFIG_ADDR, &mut buf)
            .map_err(|_| Error::Storage)?;
        postcard::from_bytes(&buf).map_err(|_| Error::Storage)
    }

    fn write_config(&mut self, config: &Eeconfig) -> Result<(), Error> {
        let mut buf = [0; Eeconfig::POSTCARD_MAX_SIZE];
        let bytes = postcard::to_slice(config, &mut buf).map_err(|_| Error::Storage)?;
        self.storage
            .write(self.base + CONFIG_ADDR, bytes)
            .map_err(|_| Error::Storage)
    }
}

impl<S: Storage> DefaultLayerStorage for EepromStorage<S> {
    fn load_default_layer(&mut self) -> Result<u8, Error> {
        if self.get_magic()? != EEPROM_MAGIC {
            info!("EEPROM is not initialized, writing default config");
            self.write_config(&Eeconfig::default())?;
            self.set_enable(true)?;
            return Ok(0);
        }
        Ok(self.read_config()?.default_layer)
    }

    fn store_default_layer(&mut self, layer: u8) -> Result<(), Error> {
        self.write_config(&Eeconfig { default_layer: layer })?;
        if self.get_magic()? != EEPROM_MAGIC {
            self.set_enable(true)?;
        }
        Ok(())
    }
}

/// Storage errors of [`RamStorage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutOfBounds;

/// A byte-addressable storage in RAM, erased to `0xFF`.
///
/// Useful on hosts and in tests, or as a stand-in when the board has no persistent memory.
#[derive(Debug, Clone)]
pub struct RamStorage<const N: usize> {
    data: [u8; N],
}

impl<const N: usize> Default for RamStorage<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RamStorage<N> {
    pub const fn new() -> Self {
        Self { data: [0xFF; N] }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn range(offset: u32, len: usize) -> Result<core::ops::Range<usize>, OutOfBounds> {
        let start = offset as usize;
        let end = start.checked_add(len).ok_or(OutOfBounds)?;
        if end > N {
            return Err(OutOfBounds);
        }
        Ok(start..end)
    }
}

impl<const N: usize> ReadStorage for RamStorage<N> {
    type Error = OutOfBounds;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let range = Self::range(offset, bytes.len())?;
        bytes.copy_from_slice(&self.data[range]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Storage for RamStorage<N> {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        let range = Self::range(offset, bytes.len())?;
        self.data[range].copy_from_slice(bytes);
        Ok(())
    }
}
