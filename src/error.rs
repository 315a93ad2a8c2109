use thiserror::Error;

/// Errors that can occur while opening a partition or accessing a slot. A checksum mismatch is
/// not among them: a slot without valid data is reported as `Ok(false)` because that is the
/// normal state of a fresh device. Marked as non-exhaustive to allow for future additions without
/// breaking the API.
#[derive(Error, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// The partition offset doesn't fit the storage or, for flash, isn't aligned to a sector (4k)
    #[error("invalid partition offset")]
    InvalidPartitionOffset,

    /// The partition reaches past the end of the storage or, for flash, isn't a multiple of the
    /// sector size (4k)
    #[error("invalid partition size")]
    InvalidPartitionSize,

    /// The record starting at the slot address does not fit into the capacity reported by the
    /// storage. Nothing was read or written.
    #[error("record out of bounds")]
    OutOfBounds,

    /// The internal error value is returned from the provided `&mut impl Storage`
    #[error("internal storage error")]
    StorageError,
}
