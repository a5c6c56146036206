#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// Error and result types shared by every table in this crate.
pub mod error;

pub mod hash_table;

/// A keyed, fixed-capacity table built on [`hash_table::HashTable`].
///
/// This module provides [`SlotTable`], which hashes keys with a configurable
/// hasher builder and exposes map-style lookup, removal, snapshot views and
/// content equality.
pub mod slot_table;

pub use error::Error;
pub use error::Result;
pub use hash_table::HashTable;
pub use slot_table::DEFAULT_CAPACITY_FACTOR;
pub use slot_table::SlotTable;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used when none is given.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used when none is given.
        pub type DefaultHashBuilder = std::hash::RandomState;
    } else {
        /// Placeholder hasher builder when neither `foldhash` nor `std` is
        /// enabled. It does not implement `BuildHasher`, so tables must be
        /// built with an explicit hasher.
        #[derive(Clone, Copy, Debug, Default)]
        pub struct DefaultHashBuilder;
    }
}
