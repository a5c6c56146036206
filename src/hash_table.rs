//! A fixed-capacity open-addressed hash table using linear probing.
//!
//! [`HashTable<V>`] is the engine underneath [`SlotTable`](crate::SlotTable).
//! It knows nothing about keys: every operation takes the precomputed `u64`
//! hash of the value it is looking for and an equality predicate, so the
//! caller decides what "the same key" means.
//!
//! Deleted slots become tombstones. A probe walk stops at the first empty
//! slot, skips over tombstones, and gives up after visiting every slot once.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::iter::FusedIterator;

use crate::error::Error;
use crate::error::Result;

/// Top seven bits of a hash, used when rendering the slot map.
#[inline(always)]
fn hashtag(hash: u64) -> u8 {
    (hash >> 57) as u8
}

enum Slot<V> {
    Empty,
    Occupied { hash: u64, value: V },
    Tombstone,
}

impl<V> Slot<V> {
    /// The caller must only call this on a slot it has already observed to be
    /// occupied.
    #[inline(always)]
    fn occupant(&self) -> &V {
        match self {
            Slot::Occupied { value, .. } => value,
            _ => unreachable!("slot is not occupied"),
        }
    }

    #[inline(always)]
    fn occupant_mut(&mut self) -> &mut V {
        match self {
            Slot::Occupied { value, .. } => value,
            _ => unreachable!("slot is not occupied"),
        }
    }
}

/// Outcome of walking the probe sequence for a hash.
#[derive(Clone, Copy)]
enum Probe {
    /// A live slot whose occupant matched.
    Found(usize),
    /// No match; the first tombstone or empty slot on the walk.
    Vacant(usize),
    /// No match and no free slot anywhere in the table.
    Full,
}

/// The indices visited when probing for a hash.
///
/// Starts at `hash % capacity` and steps forward one slot at a time, wrapping
/// at the end of the table. Yields exactly `capacity` distinct indices.
///
/// This struct is created by [`HashTable::probe_sequence`].
#[derive(Debug, Clone)]
pub struct ProbeSequence {
    start: usize,
    step: usize,
    capacity: usize,
}

impl ProbeSequence {
    fn new(hash: u64, capacity: usize) -> Self {
        debug_assert!(capacity > 0);
        Self {
            start: (hash % capacity as u64) as usize,
            step: 0,
            capacity,
        }
    }
}

impl Iterator for ProbeSequence {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.step == self.capacity {
            return None;
        }

        // start < capacity and step < capacity, so a single subtraction wraps.
        let mut index = self.start + self.step;
        if index >= self.capacity {
            index -= self.capacity;
        }
        self.step += 1;
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.capacity - self.step;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ProbeSequence {}

impl FusedIterator for ProbeSequence {}

/// Debug statistics describing the physical state of a table.
///
/// Available with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, PartialEq)]
pub struct DebugStats {
    /// Number of live entries.
    pub populated: usize,
    /// Number of tombstoned slots.
    pub tombstones: usize,
    /// Number of never-used slots.
    pub empty: usize,
    /// Total number of slots.
    pub capacity: usize,
    /// `populated / capacity`.
    pub load_factor: f64,
    /// Longest run of consecutive non-empty slots, wrapping around the end of
    /// the table. An unsuccessful lookup never probes more than this plus one
    /// slot.
    pub longest_run: usize,
    /// Largest distance of a live entry from its starting index.
    pub max_displacement: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Slot Table Debug Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load factor)",
            self.populated,
            self.capacity,
            self.load_factor * 100.0
        );
        println!(
            "Slots: {} empty, {} tombstones",
            self.empty, self.tombstones
        );
        println!("Longest run: {} slots", self.longest_run);
        println!("Max displacement: {} slots", self.max_displacement);
    }
}

/// A fixed-capacity hash table using linear probing with tombstones.
///
/// `HashTable<V>` stores values of type `V`. Like a raw table, it requires
/// the caller to supply both the hash of the value and an equality predicate
/// for each operation. Hashes must be consistent with the predicate: two
/// values the predicate considers equal must have been given the same hash.
///
/// The table never grows. Once every slot holds a live entry, inserting a new
/// value fails with [`Error::TableFull`].
///
/// ## Example
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use siphasher::sip::SipHasher;
/// # use slot_table::hash_table::Entry;
/// # use slot_table::hash_table::HashTable;
/// #
/// # #[derive(Debug, PartialEq)]
/// # struct Person {
/// #     id: u64,
/// #     name: String,
/// # }
/// #
/// # fn hash_id(id: u64) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     id.hash(&mut hasher);
/// #     hasher.finish()
/// # }
///
/// let mut table = HashTable::with_capacity(100)?;
/// let hash = hash_id(123);
///
/// match table.entry(hash, |p: &Person| p.id == 123)? {
///     Entry::Vacant(entry) => {
///         entry.insert(Person {
///             id: 123,
///             name: "Alice".to_string(),
///         });
///     }
///     Entry::Occupied(_) => {
///         println!("Person already exists");
///     }
/// }
/// assert_eq!(table.len(), 1);
/// # Ok::<(), slot_table::Error>(())
/// ```
pub struct HashTable<V> {
    slots: Box<[Slot<V>]>,
    populated: usize,
    tombstones: usize,
}

impl<V> Debug for HashTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::format;
        use alloc::string::String;
        use alloc::string::ToString;

        f.debug_struct("HashTable")
            .field(
                "slots",
                &self
                    .slots
                    .chunks(16)
                    .map(|w| {
                        w.iter()
                            .map(|slot| match slot {
                                Slot::Empty => "..".to_string(),
                                Slot::Tombstone => "xx".to_string(),
                                Slot::Occupied { hash, .. } => format!("{:02x}", hashtag(*hash)),
                            })
                            .collect::<Vec<String>>()
                            .join(", ")
                    })
                    .collect::<Vec<_>>(),
            )
            .field("populated", &self.populated)
            .field("tombstones", &self.tombstones)
            .field("capacity", &self.capacity())
            .finish()
    }
}

/// Cloning compacts: live entries are reinserted into a fresh table of the
/// same capacity and tombstones are dropped.
impl<V> Clone for HashTable<V>
where
    V: Clone,
{
    fn clone(&self) -> Self {
        let capacity = self.slots.len();
        let mut slots = empty_slots(capacity);

        for slot in self.slots.iter() {
            if let Slot::Occupied { hash, value } = slot {
                for index in ProbeSequence::new(*hash, capacity) {
                    if matches!(slots[index], Slot::Empty) {
                        slots[index] = Slot::Occupied {
                            hash: *hash,
                            value: value.clone(),
                        };
                        break;
                    }
                }
            }
        }

        Self {
            slots,
            populated: self.populated,
            tombstones: 0,
        }
    }
}

fn empty_slots<V>(capacity: usize) -> Box<[Slot<V>]> {
    (0..capacity).map(|_| Slot::Empty).collect()
}

impl<V> HashTable<V> {
    /// Creates a new hash table with exactly `capacity` slots.
    ///
    /// Fails with [`Error::InvalidCapacity`] when `capacity` is zero.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use slot_table::Error;
    /// # use slot_table::hash_table::HashTable;
    /// #
    /// let table: HashTable<String> = HashTable::with_capacity(100)?;
    /// assert_eq!(table.capacity(), 100);
    ///
    /// assert_eq!(
    ///     HashTable::<String>::with_capacity(0).unwrap_err(),
    ///     Error::InvalidCapacity { capacity: 0 }
    /// );
    /// # Ok::<(), Error>(())
    /// ```
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity < 1 {
            return Err(Error::InvalidCapacity { capacity });
        }

        Ok(Self {
            slots: empty_slots(capacity),
            populated: 0,
            tombstones: 0,
        })
    }

    /// Returns the number of slots in the table.
    ///
    /// This is fixed at construction and is also the maximum number of
    /// entries the table can hold.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of live entries in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table contains no live entries.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the sequence of slot indices probed for `hash`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use slot_table::hash_table::HashTable;
    /// #
    /// let table: HashTable<u64> = HashTable::with_capacity(4)?;
    /// let order: Vec<usize> = table.probe_sequence(6).collect();
    /// assert_eq!(order, [2, 3, 0, 1]);
    /// # Ok::<(), slot_table::Error>(())
    /// ```
    pub fn probe_sequence(&self, hash: u64) -> ProbeSequence {
        ProbeSequence::new(hash, self.slots.len())
    }

    fn probe(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Probe {
        let mut first_free = None;

        for index in self.probe_sequence(hash) {
            match &self.slots[index] {
                Slot::Empty => return Probe::Vacant(first_free.unwrap_or(index)),
                Slot::Tombstone => {
                    if first_free.is_none() {
                        first_free = Some(index);
                    }
                }
                Slot::Occupied { hash: stored, value } => {
                    if *stored == hash && eq(value) {
                        return Probe::Found(index);
                    }
                }
            }
        }

        match first_free {
            Some(index) => Probe::Vacant(index),
            None => Probe::Full,
        }
    }

    /// Finds a value in the table by hash and equality predicate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use siphasher::sip::SipHasher;
    /// # use slot_table::hash_table::HashTable;
    /// #
    /// # fn hash_str(s: &str) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     s.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table = HashTable::with_capacity(10)?;
    /// table
    ///     .entry(hash_str("key"), |s: &String| s == "key")?
    ///     .or_insert("key".to_string());
    ///
    /// assert_eq!(
    ///     table.find(hash_str("key"), |s| s == "key"),
    ///     Some(&"key".to_string())
    /// );
    /// assert_eq!(table.find(hash_str("missing"), |s| s == "missing"), None);
    /// # Ok::<(), slot_table::Error>(())
    /// ```
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        match self.probe(hash, eq) {
            Probe::Found(index) => Some(self.slots[index].occupant()),
            Probe::Vacant(_) | Probe::Full => None,
        }
    }

    /// Finds a value in the table by hash and equality predicate, returning a
    /// mutable reference.
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        match self.probe(hash, eq) {
            Probe::Found(index) => Some(self.slots[index].occupant_mut()),
            Probe::Vacant(_) | Probe::Full => None,
        }
    }

    /// Removes a value from the table by hash and equality predicate.
    ///
    /// The vacated slot becomes a tombstone so probe walks for other values
    /// passing through it are not cut short.
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        match self.probe(hash, eq) {
            Probe::Found(index) => Some(OccupiedEntry { table: self, index }.remove()),
            Probe::Vacant(_) | Probe::Full => None,
        }
    }

    /// Gets an entry for in-place manipulation of a value.
    ///
    /// Returns [`Entry::Occupied`] if a value matching `eq` is present, and
    /// [`Entry::Vacant`] pointing at the slot a new value would take
    /// otherwise. The vacant slot is the first tombstone on the probe walk if
    /// there is one, else the empty slot that ended the walk.
    ///
    /// Fails with [`Error::TableFull`] when the value is absent and every slot
    /// is live.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use slot_table::Error;
    /// # use slot_table::hash_table::Entry;
    /// # use slot_table::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(1)?;
    /// table.entry(7, |&v: &u64| v == 7)?.or_insert(7);
    ///
    /// assert!(matches!(table.entry(7, |&v| v == 7)?, Entry::Occupied(_)));
    /// assert_eq!(
    ///     table.entry(8, |&v| v == 8).err(),
    ///     Some(Error::TableFull { capacity: 1 })
    /// );
    /// # Ok::<(), Error>(())
    /// ```
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Result<Entry<'_, V>> {
        match self.probe(hash, eq) {
            Probe::Found(index) => Ok(Entry::Occupied(OccupiedEntry { table: self, index })),
            Probe::Vacant(index) => Ok(Entry::Vacant(VacantEntry {
                table: self,
                index,
                hash,
            })),
            Probe::Full => Err(Error::TableFull {
                capacity: self.capacity(),
            }),
        }
    }

    /// Returns an iterator over all live values in the table.
    ///
    /// Values are yielded in slot order, which is unrelated to insertion
    /// order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            slots: self.slots.iter(),
            remaining: self.populated,
        }
    }

    /// Returns statistics about slot usage and clustering.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let capacity = self.slots.len();
        let empty = capacity - self.populated - self.tombstones;

        let longest_run = match self.slots.iter().position(|s| matches!(s, Slot::Empty)) {
            None => capacity,
            Some(first_empty) => {
                let mut longest = 0;
                let mut run = 0;
                for step in 1..=capacity {
                    let index = (first_empty + step) % capacity;
                    if matches!(self.slots[index], Slot::Empty) {
                        run = 0;
                    } else {
                        run += 1;
                        longest = longest.max(run);
                    }
                }
                longest
            }
        };

        let max_displacement = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match slot {
                Slot::Occupied { hash, .. } => {
                    let start = (*hash % capacity as u64) as usize;
                    Some((index + capacity - start) % capacity)
                }
                _ => None,
            })
            .max()
            .unwrap_or(0);

        DebugStats {
            populated: self.populated,
            tombstones: self.tombstones,
            empty,
            capacity,
            load_factor: self.populated as f64 / capacity as f64,
            longest_run,
            max_displacement,
        }
    }
}

/// A view into a single entry in the hash table, which may be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashTable`].
///
/// [`entry`]: HashTable::entry
pub enum Entry<'a, V> {
    /// A vacant entry - no matching value is present in the table
    Vacant(VacantEntry<'a, V>),
    /// An occupied entry - a matching value is present in the table
    Occupied(OccupiedEntry<'a, V>),
}

impl<'a, V> Entry<'a, V> {
    /// Inserts a default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts a value computed from a closure if the entry is vacant and
    /// returns a mutable reference.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts.
    pub fn and_modify(self, f: impl FnOnce(&mut V)) -> Self {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }
}

/// A view into a vacant slot of a [`HashTable`].
pub struct VacantEntry<'a, V> {
    table: &'a mut HashTable<V>,
    index: usize,
    hash: u64,
}

impl<'a, V> VacantEntry<'a, V> {
    /// Inserts the value into the slot and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        let VacantEntry { table, index, hash } = self;

        if matches!(table.slots[index], Slot::Tombstone) {
            table.tombstones -= 1;
        }
        table.populated += 1;
        debug_assert!(table.populated <= table.slots.len());

        let slot = &mut table.slots[index];
        *slot = Slot::Occupied { hash, value };
        slot.occupant_mut()
    }
}

/// A view into a live slot of a [`HashTable`].
pub struct OccupiedEntry<'a, V> {
    table: &'a mut HashTable<V>,
    index: usize,
}

impl<'a, V> OccupiedEntry<'a, V> {
    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        self.table.slots[self.index].occupant()
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        self.table.slots[self.index].occupant_mut()
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        self.table.slots[self.index].occupant_mut()
    }

    /// Removes the value, leaving a tombstone in its slot.
    pub fn remove(self) -> V {
        let OccupiedEntry { table, index } = self;
        let slot = core::mem::replace(&mut table.slots[index], Slot::Tombstone);
        table.populated -= 1;
        table.tombstones += 1;

        match slot {
            Slot::Occupied { value, .. } => value,
            _ => unreachable!("occupied entry points at a live slot"),
        }
    }
}

/// An iterator over the live values in a [`HashTable`].
///
/// This struct is created by the [`iter`] method on [`HashTable`].
///
/// [`iter`]: HashTable::iter
pub struct Iter<'a, V> {
    slots: core::slice::Iter<'a, Slot<V>>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        for slot in self.slots.by_ref() {
            if let Slot::Occupied { value, .. } = slot {
                self.remaining -= 1;
                return Some(value);
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}
