use crate::CHECKSUM_SIZE;
use crate::error::Error;
use crate::platform::{FnCrc16Update, Platform};
use bytemuck::Pod;
#[cfg(feature = "defmt")]
use defmt::trace;

/// A value together with the checksum over its raw bytes, laid out on the storage as
/// `[value bytes][checksum, native byte order]`. Built fresh for every slot operation and
/// dropped when it returns.
pub(crate) struct StoredRecord<T: Pod> {
    pub(crate) value: T,
    pub(crate) checksum: u16,
}

impl<T: Pod> StoredRecord<T> {
    pub(crate) const SIZE: usize = size_of::<T>() + CHECKSUM_SIZE;

    pub(crate) fn new(value: T, crc16_update: FnCrc16Update) -> Self {
        Self {
            value,
            checksum: calculate_crc16(&value, crc16_update),
        }
    }

    pub(crate) fn is_valid(&self, crc16_update: FnCrc16Update) -> bool {
        self.checksum == calculate_crc16(&self.value, crc16_update)
    }

    /// Raw checksum bytes exactly as they sit behind the value on the storage.
    pub(crate) fn checksum_bytes(&self) -> [u8; CHECKSUM_SIZE] {
        self.checksum.to_ne_bytes()
    }

    pub(crate) fn read<P: Platform>(hal: &mut P, address: u16) -> Result<Self, Error> {
        #[cfg(feature = "defmt")]
        trace!("read_record @{:#06x}: [{}]", address, Self::SIZE);

        #[cfg(feature = "debug-logs")]
        println!("  record: read @0x{address:0>4x}[{}]", Self::SIZE);

        let mut value = T::zeroed();
        let mut checksum = [0u8; CHECKSUM_SIZE];

        hal.read(address as u32, bytemuck::bytes_of_mut(&mut value))
            .map_err(|_| Error::StorageError)?;
        hal.read(checksum_offset::<T>(address), &mut checksum)
            .map_err(|_| Error::StorageError)?;

        Ok(Self {
            value,
            checksum: u16::from_ne_bytes(checksum),
        })
    }

    /// Writes the value first and the checksum last. An interruption in between leaves a
    /// checksum that no longer matches, so a torn record reads as invalid.
    pub(crate) fn write<P: Platform>(&self, hal: &mut P, address: u16) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        trace!("write_record @{:#06x}: [{}]", address, Self::SIZE);

        #[cfg(feature = "debug-logs")]
        println!(
            "  record: write @0x{address:0>4x}[{}] checksum: 0x{:0>4x}",
            Self::SIZE,
            self.checksum
        );

        hal.write(address as u32, bytemuck::bytes_of(&self.value))
            .map_err(|_| Error::StorageError)?;
        hal.write(checksum_offset::<T>(address), &self.checksum_bytes())
            .map_err(|_| Error::StorageError)
    }
}

#[inline(always)]
fn checksum_offset<T>(address: u16) -> u32 {
    address as u32 + size_of::<T>() as u32
}

/// Folds `crc16_update` over the raw bytes of `value`, lowest address first, starting at zero.
pub(crate) fn calculate_crc16<T: Pod>(value: &T, crc16_update: FnCrc16Update) -> u16 {
    bytemuck::bytes_of(value)
        .iter()
        .fold(0, |crc, &byte| crc16_update(crc, byte))
}
