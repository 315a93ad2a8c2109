use crate::error::Error;
use crate::platform::Crc16;
use embedded_storage::{ReadStorage, Storage};

/// A window `[offset, offset + size)` of a larger storage, addressed from zero.
///
/// Every access is moved behind `offset` and `size` is reported as the capacity, so slots can't
/// reach outside of the window. Required on flash chips, where the low addresses hold the
/// bootloader and the partition table.
pub struct Partition<S> {
    inner: S,
    offset: u32,
    size: usize,
}

#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PartitionError<E> {
    /// The access crosses the end of the partition.
    OutOfBounds,
    Storage(E),
}

impl<S: ReadStorage> Partition<S> {
    pub fn new(inner: S, offset: usize, size: usize) -> Result<Self, Error> {
        if offset > u32::MAX as usize {
            return Err(Error::InvalidPartitionOffset);
        }

        match offset.checked_add(size) {
            Some(end) if end <= inner.capacity() => {}
            _ => return Err(Error::InvalidPartitionSize),
        }

        Ok(Self {
            inner,
            offset: offset as u32,
            size,
        })
    }

    pub fn offset(&self) -> usize {
        self.offset as usize
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn translate(&self, offset: u32, len: usize) -> Result<u32, PartitionError<S::Error>> {
        match (offset as usize).checked_add(len) {
            Some(end) if end <= self.size => Ok(self.offset + offset),
            _ => Err(PartitionError::OutOfBounds),
        }
    }
}

impl<S: ReadStorage> ReadStorage for Partition<S> {
    type Error = PartitionError<S::Error>;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let offset = self.translate(offset, bytes.len())?;
        self.inner.read(offset, bytes).map_err(PartitionError::Storage)
    }

    fn capacity(&self) -> usize {
        self.size
    }
}

impl<S: Storage> Storage for Partition<S> {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        let offset = self.translate(offset, bytes.len())?;
        self.inner.write(offset, bytes).map_err(PartitionError::Storage)
    }
}

impl<S> Crc16 for Partition<S> {}

#[cfg(any(
    feature = "esp32",
    feature = "esp32s2",
    feature = "esp32s3",
    feature = "esp32c2",
    feature = "esp32c3",
    feature = "esp32c6",
    feature = "esp32h2",
))]
mod chip {
    use super::Partition;
    use crate::error::Error;
    use esp_storage::FlashStorage;

    pub const FLASH_SECTOR_SIZE: usize = 4096;

    /// Data partition on the SPI flash of an ESP chip.
    ///
    /// Every `Storage::write` of `esp-storage` erases and reprograms the whole 4 KiB sector it
    /// touches, and a record is written in two steps, so place slots that change often in
    /// different sectors and keep the number of `set` calls low.
    pub type EspPartition<'d> = Partition<FlashStorage<'d>>;

    impl<'d> Partition<FlashStorage<'d>> {
        /// `partition_offset` and `partition_size` have to be aligned to the flash sector size,
        /// usually taken from a `data` entry of the partition table.
        pub fn esp(
            flash: FlashStorage<'d>,
            partition_offset: usize,
            partition_size: usize,
        ) -> Result<Self, Error> {
            if !partition_offset.is_multiple_of(FLASH_SECTOR_SIZE) {
                return Err(Error::InvalidPartitionOffset);
            }

            if partition_size == 0 || !partition_size.is_multiple_of(FLASH_SECTOR_SIZE) {
                return Err(Error::InvalidPartitionSize);
            }

            Self::new(flash, partition_offset, partition_size)
        }
    }
}

#[cfg(any(
    feature = "esp32",
    feature = "esp32s2",
    feature = "esp32s3",
    feature = "esp32c2",
    feature = "esp32c3",
    feature = "esp32c6",
    feature = "esp32h2",
))]
pub use chip::*;
