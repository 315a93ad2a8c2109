#![allow(dead_code)]

// filename according to https://doc.rust-lang.org/book/ch11-03-test-organization.html
use bytemuck::{Pod, Zeroable};
use eeprom_slot::platform::Crc16;
use embedded_storage::{ReadStorage, Storage};

/// Size of the EEPROM found on an ATmega328P.
pub const EEPROM_SIZE: usize = 1024;
pub const ERASED: u8 = 0xFF;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct Point {
    pub x: u16,
    pub y: u16,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct Settings {
    pub serial: u32,
    pub brightness: u8,
    pub volume: u8,
    pub flags: u16,
    pub calibration: [i16; 4],
}

/// Byte addressable EEPROM kept in memory. Every access is logged and any access can be made
/// to fail, similar to a real device losing power.
#[derive(Default)]
pub struct Eeprom {
    pub buf: Vec<u8>,
    pub fail_after_operation: usize,
    pub operations: Vec<Operation>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Operation {
    Read { offset: u32, len: usize },
    Write { offset: u32, len: usize },
}

impl Eeprom {
    pub fn new(size: usize) -> Self {
        Self {
            buf: vec![ERASED; size],
            fail_after_operation: usize::MAX,
            ..Default::default()
        }
    }

    pub fn new_with_fault(size: usize, fail_after_operation: usize) -> Self {
        Self {
            buf: vec![ERASED; size],
            fail_after_operation,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn disable_faults(&mut self) {
        self.fail_after_operation = usize::MAX;
    }

    pub fn fill(&mut self, offset: usize, len: usize, value: u8) {
        self.buf[offset..offset + len].fill(value);
    }

    pub fn flip_bit(&mut self, offset: usize, bit: u8) {
        self.buf[offset] ^= 1 << bit;
    }

    pub fn writes(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| matches!(op, Operation::Write { .. }))
            .count()
    }

    pub fn dump_operations(&self) {
        println!("Operations:");
        for op in &self.operations {
            println!("  {:?}", op);
        }
    }

    fn check_fault(&self) -> Result<(), EepromError> {
        if self.operations.len() >= self.fail_after_operation {
            println!("    eeprom: FAULT");
            return Err(EepromError);
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct EepromError;

impl ReadStorage for Eeprom {
    type Error = EepromError;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        println!(
            "    eeprom: read:  0x{offset:04X}[0x{:04X}] #{:>2}",
            bytes.len(),
            self.operations.len()
        );
        self.check_fault()?;
        self.operations.push(Operation::Read {
            offset,
            len: bytes.len(),
        });

        let offset = offset as usize;
        bytes.copy_from_slice(&self.buf[offset..offset + bytes.len()]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.buf.len()
    }
}

impl Storage for Eeprom {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        println!(
            "    eeprom: write: 0x{offset:04X}[0x{:04X}] #{:>2}",
            bytes.len(),
            self.operations.len()
        );
        self.check_fault()?;
        self.operations.push(Operation::Write {
            offset,
            len: bytes.len(),
        });

        // unlike flash, EEPROM cells can be rewritten in both directions
        let offset = offset as usize;
        self.buf[offset..offset + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }
}

impl Crc16 for Eeprom {}

/// xorshift32, keeps the corruption patterns reproducible between runs.
pub struct XorShift(pub u32);

impl XorShift {
    pub fn next(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        x
    }
}
