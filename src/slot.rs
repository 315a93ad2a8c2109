use crate::error::Error;
use crate::platform::{Crc16, Platform};
use crate::record::{StoredRecord, calculate_crc16};
use crate::{CHECKSUM_SIZE, DEFAULT_ADDRESS};
use bytemuck::Pod;
use core::fmt;
use core::marker::PhantomData;
#[cfg(feature = "defmt")]
use defmt::{trace, warn};

const ERASED_BYTE: u8 = 0xFF;

/// Result of [`TypedSlot::inspect`].
#[derive(strum::Display, strum::EnumIs, Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordState {
    /// The checksum matches the stored value.
    Valid,

    /// Every byte of the record reads as 0xFF, the state of freshly erased EEPROM or flash.
    Erased,

    /// The checksum doesn't match and the bytes are not in the erased state. Either the record
    /// was damaged, a write was interrupted or the address holds data of a different layout.
    Corrupt,
}

/// Handle to a single checksummed value of type `T` at a fixed address of the storage.
///
/// The handle only carries the address. The storage is passed to every operation, so slots
/// can be created in a const context and shared freely:
///
/// ```ignore
/// const SETTINGS: TypedSlot<Settings> = TypedSlot::at(0x40);
///
/// let mut settings = Settings::default();
/// if !SETTINGS.get_or_set(&mut eeprom, &mut settings)? {
///     // first boot, the defaults have been written
/// }
/// ```
///
/// On the storage a record occupies `size_of::<T>() + 2` bytes: the raw bytes of the value
/// followed by a CRC-16 over those bytes in native byte order.
pub struct TypedSlot<T> {
    address: u16,
    _value: PhantomData<fn() -> T>,
}

impl<T: Pod> TypedSlot<T> {
    /// Number of bytes a record of `T` occupies on the storage.
    pub const RECORD_SIZE: usize = StoredRecord::<T>::SIZE;

    /// Slot at [`DEFAULT_ADDRESS`].
    pub const DEFAULT: Self = Self::at(DEFAULT_ADDRESS);

    const FITS_ADDRESS_SPACE: () = assert!(
        Self::RECORD_SIZE <= u16::MAX as usize + 1,
        "record does not fit into a 16-bit address space"
    );

    pub const fn at(address: u16) -> Self {
        let () = Self::FITS_ADDRESS_SPACE;
        Self {
            address,
            _value: PhantomData,
        }
    }

    pub const fn address(&self) -> u16 {
        self.address
    }

    pub const fn record_size(&self) -> usize {
        Self::RECORD_SIZE
    }

    /// First address behind this record. Handy to place the next slot without overlap.
    pub const fn end(&self) -> usize {
        self.address as usize + Self::RECORD_SIZE
    }

    /// CRC-16 over the raw bytes of `value`, folded with `C::crc16_update` from an accumulator
    /// of zero. Equal bytes always yield equal checksums.
    pub fn compute_checksum<C: Crc16>(value: &T) -> u16 {
        calculate_crc16(value, C::crc16_update)
    }

    /// Writes `value` together with its checksum, overwriting `RECORD_SIZE` bytes at the slot
    /// address.
    pub fn set<P: Platform>(&self, hal: &mut P, value: &T) -> Result<(), Error> {
        self.check_bounds(hal.capacity())?;

        #[cfg(feature = "defmt")]
        trace!("set: @{:#06x}", self.address);

        #[cfg(feature = "debug-logs")]
        println!("TypedSlot: set @0x{:0>4x}", self.address);

        StoredRecord::new(*value, P::crc16_update).write(hal, self.address)
    }

    /// Loads the record at the slot address and copies its value into `value` if the stored
    /// checksum matches the one recomputed from the stored value bytes.
    ///
    /// Returns `Ok(false)` on a mismatch, in which case `value` is left untouched. Uninitialized
    /// storage fails the check with very high probability, though not with certainty as two
    /// bytes of checksum collide once in 65536 patterns.
    pub fn get_if_valid<P: Platform>(&self, hal: &mut P, value: &mut T) -> Result<bool, Error> {
        self.check_bounds(hal.capacity())?;

        let record = StoredRecord::<T>::read(hal, self.address)?;
        if !record.is_valid(P::crc16_update) {
            #[cfg(feature = "defmt")]
            warn!("get_if_valid: checksum mismatch @{:#06x}", self.address);

            #[cfg(feature = "debug-logs")]
            println!("TypedSlot: checksum mismatch @0x{:0>4x}", self.address);

            return Ok(false);
        }

        *value = record.value;
        Ok(true)
    }

    /// Like [`Self::get_if_valid`], but on a mismatch the unchanged `value` is written as the new
    /// record. Afterwards the slot always holds a valid record.
    ///
    /// Returns `Ok(true)` if existing data was loaded and `Ok(false)` if `value` was written.
    pub fn get_or_set<P: Platform>(&self, hal: &mut P, value: &mut T) -> Result<bool, Error> {
        if self.get_if_valid(hal, value)? {
            return Ok(true);
        }

        self.set(hal, value)?;
        Ok(false)
    }

    /// Classifies the stored bytes without handing out the value.
    pub fn inspect<P: Platform>(&self, hal: &mut P) -> Result<RecordState, Error> {
        self.check_bounds(hal.capacity())?;

        let record = StoredRecord::<T>::read(hal, self.address)?;
        if record.is_valid(P::crc16_update) {
            return Ok(RecordState::Valid);
        }

        let erased = bytemuck::bytes_of(&record.value)
            .iter()
            .chain(record.checksum_bytes().iter())
            .all(|&byte| byte == ERASED_BYTE);

        if erased {
            Ok(RecordState::Erased)
        } else {
            Ok(RecordState::Corrupt)
        }
    }

    /// Overwrites the whole record with 0xFF so that it no longer validates.
    pub fn erase<P: Platform>(&self, hal: &mut P) -> Result<(), Error> {
        self.check_bounds(hal.capacity())?;

        #[cfg(feature = "defmt")]
        trace!("erase: @{:#06x}", self.address);

        #[cfg(feature = "debug-logs")]
        println!("TypedSlot: erase @0x{:0>4x}", self.address);

        let chunk = [ERASED_BYTE; 16];
        let mut offset = self.address as u32;
        let mut remaining = Self::RECORD_SIZE;
        while remaining > 0 {
            let len = remaining.min(chunk.len());
            hal.write(offset, &chunk[..len]).map_err(|_| Error::StorageError)?;
            offset += len as u32;
            remaining -= len;
        }

        Ok(())
    }

    fn check_bounds(&self, capacity: usize) -> Result<(), Error> {
        if self.end() > capacity {
            return Err(Error::OutOfBounds);
        }
        Ok(())
    }
}

impl<T: Pod> Default for TypedSlot<T> {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl<T> Clone for TypedSlot<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TypedSlot<T> {}

impl<T> PartialEq for TypedSlot<T> {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl<T> Eq for TypedSlot<T> {}

impl<T> fmt::Debug for TypedSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TypedSlot(0x{:0>4x}[{} + {}])",
            self.address,
            size_of::<T>(),
            CHECKSUM_SIZE
        )
    }
}
