use embedded_storage::Storage;

/// See README.md for an example implementation.
pub trait Platform: Crc16 + Storage {}

impl<T: Crc16 + Storage> Platform for T {}

pub type FnCrc16Update = fn(crc: u16, data: u8) -> u16;

/// Source of the checksum primitive. The default uses the software CRC-16/ARC from
/// [`crate::crc`], so `impl Crc16 for MyEeprom {}` is enough unless the chip has a CRC unit
/// producing the same values.
pub trait Crc16 {
    fn crc16_update(crc: u16, data: u8) -> u16 {
        crate::crc::crc16_update(crc, data)
    }
}
