/// Errors reported by [`HashTable`](crate::hash_table::HashTable) and
/// [`SlotTable`](crate::SlotTable).
///
/// Every error is local to the call that produced it. A failed operation
/// never leaves a table partially modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A table was requested with fewer than one slot.
    #[error("capacity must be a positive number, got {capacity}")]
    InvalidCapacity {
        /// The rejected capacity.
        capacity: usize,
    },
    /// The key is not present in the table.
    #[error("key not found")]
    KeyNotFound,
    /// A full probe cycle found neither the key nor a free slot.
    ///
    /// Tables never grow on their own; rebuild into a larger table and retry.
    #[error("table is full ({capacity} slots occupied)")]
    TableFull {
        /// Capacity of the table that rejected the insert.
        capacity: usize,
    },
}

/// Shorthand for results carrying an [`Error`].
pub type Result<T> = core::result::Result<T, Error>;
