#![doc = include_str ! ("../README.md")]
#![cfg_attr(not(target_arch = "x86_64"), no_std)]

pub mod crc;
pub mod error;
pub mod partition;
pub mod platform;
mod record;
mod slot;

pub use slot::{RecordState, TypedSlot};

/// Address used when a slot is created without an explicit one.
pub const DEFAULT_ADDRESS: u16 = 0;

/// Size of the checksum trailing every record.
pub const CHECKSUM_SIZE: usize = size_of::<u16>();
