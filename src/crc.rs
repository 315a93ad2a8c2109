//! Software CRC-16/ARC, bit compatible with avr-libc's `_crc16_update`.

/// Reflected form of the CRC-16 polynomial x^16 + x^15 + x^2 + 1.
pub const POLYNOMIAL: u16 = 0xA001;

/// Folds a single byte into the running checksum.
pub const fn crc16_update(crc: u16, data: u8) -> u16 {
    let mut crc = crc ^ data as u16;
    let mut i = 0;
    while i < 8 {
        if crc & 1 != 0 {
            crc = (crc >> 1) ^ POLYNOMIAL;
        } else {
            crc >>= 1;
        }
        i += 1;
    }
    crc
}

/// Checksum of `data` starting from an accumulator of zero.
pub const fn crc16(data: &[u8]) -> u16 {
    let mut crc = 0;
    let mut i = 0;
    while i < data.len() {
        crc = crc16_update(crc, data[i]);
        i += 1;
    }
    crc
}
