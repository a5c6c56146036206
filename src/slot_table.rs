use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt::Debug;
use core::fmt::Display;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::iter::FusedIterator;

use hashbrown::HashSet;

use crate::DefaultHashBuilder;
use crate::error::Error;
use crate::error::Result;
use crate::hash_table::Entry as TableEntry;
use crate::hash_table::HashTable;

/// Capacity used by [`SlotTable::from_mapping`] when none is given, as a
/// multiple of the number of entries.
pub const DEFAULT_CAPACITY_FACTOR: usize = 10;

/// A fixed-capacity key-value table backed by the linear-probing
/// [`HashTable`].
///
/// `SlotTable<K, V, S>` stores key-value pairs where keys implement
/// `Hash + Eq` and are hashed by a configurable hasher builder `S`. Keys are
/// unique: inserting an existing key replaces its value in place.
///
/// The number of slots is fixed when the table is built. When every slot is
/// live, inserting a new key fails with [`Error::TableFull`] and the caller is
/// expected to rebuild into a larger table.
///
/// Two tables compare equal when they hold the same pairs, whatever their
/// capacities or slot layouts.
#[derive(Clone)]
pub struct SlotTable<K, V, S = DefaultHashBuilder> {
    table: HashTable<(K, V)>,
    hash_builder: S,
}

/// Renders the pairs as `{key: value, ...}` in table order.
impl<K, V, S> Display for SlotTable<K, V, S>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Renders the table as the constructor call that would rebuild it:
/// `SlotTable::from_mapping({key: value, ...})`.
impl<K, V, S> Debug for SlotTable<K, V, S>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SlotTable::from_mapping(")?;
        Display::fmt(self, f)?;
        f.write_str(")")
    }
}

impl<K, V, S> PartialEq for SlotTable<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if core::ptr::eq(self, other) {
            return true;
        }
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K, V, S> Eq for SlotTable<K, V, S>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, V, S> SlotTable<K, V, S> {
    /// Returns the number of pairs in the table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use slot_table::SlotTable;
    /// #
    /// let mut table = SlotTable::with_capacity(10)?;
    /// assert_eq!(table.len(), 0);
    /// table.insert(1, "a")?;
    /// assert_eq!(table.len(), 1);
    /// # Ok::<(), slot_table::Error>(())
    /// ```
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the table contains no pairs.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of slots, fixed at construction.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns a reference to the table's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns an iterator over the key-value pairs of the table.
    ///
    /// The iterator yields `(&K, &V)` pairs in an arbitrary order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns slot usage statistics of the underlying table.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> crate::hash_table::DebugStats {
        self.table.debug_stats()
    }
}

impl<K, V, S> SlotTable<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates a table with exactly `capacity` slots and the given hasher
    /// builder.
    ///
    /// Fails with [`Error::InvalidCapacity`] when `capacity` is zero.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasherDefault;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use slot_table::SlotTable;
    /// #
    /// let table: SlotTable<i32, String, _> =
    ///     SlotTable::with_capacity_and_hasher(100, BuildHasherDefault::<SipHasher>::default())?;
    /// assert_eq!(table.capacity(), 100);
    /// # Ok::<(), slot_table::Error>(())
    /// ```
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Result<Self> {
        Ok(Self {
            table: HashTable::with_capacity(capacity)?,
            hash_builder,
        })
    }

    /// Builds a table from a mapping, inserting pairs in iteration order.
    ///
    /// Without an explicit `capacity` the table gets
    /// [`DEFAULT_CAPACITY_FACTOR`] slots per entry, so an empty mapping with
    /// no capacity fails with [`Error::InvalidCapacity`]. A later pair with a
    /// key equal to an earlier one replaces it.
    pub fn from_mapping_with_hasher<I>(
        mapping: I,
        capacity: Option<usize>,
        hash_builder: S,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        I::IntoIter: ExactSizeIterator,
    {
        let pairs = mapping.into_iter();
        let capacity =
            capacity.unwrap_or_else(|| pairs.len().saturating_mul(DEFAULT_CAPACITY_FACTOR));

        let mut table = Self::with_capacity_and_hasher(capacity, hash_builder)?;
        for (key, value) in pairs {
            table.insert(key, value)?;
        }
        Ok(table)
    }

    /// Inserts a key-value pair into the table.
    ///
    /// Returns `Ok(None)` if the key was absent and `Ok(Some(old))` if it was
    /// present, in which case its value is replaced in place and the length
    /// is unchanged. Fails with [`Error::TableFull`] if the key is absent and
    /// every slot is live.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use slot_table::SlotTable;
    /// #
    /// let mut table = SlotTable::with_capacity(1)?;
    /// assert_eq!(table.insert(37, "a")?, None);
    /// assert_eq!(table.insert(37, "b")?, Some("a"));
    /// assert!(table.insert(38, "c").is_err());
    /// # Ok::<(), slot_table::Error>(())
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>> {
        let hash = self.hash_builder.hash_one(&key);
        match self.table.entry(hash, |(k, _)| k == &key)? {
            TableEntry::Occupied(mut entry) => {
                let old_value = core::mem::replace(&mut entry.get_mut().1, value);
                Ok(Some(old_value))
            }
            TableEntry::Vacant(entry) => {
                entry.insert((key, value));
                Ok(None)
            }
        }
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table
            .find(hash, |(k, _)| k.borrow() == key)
            .map(|(_, v)| v)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table
            .find_mut(hash, |(k, _)| k.borrow() == key)
            .map(|(_, v)| v)
    }

    /// Returns the value corresponding to the key, failing with
    /// [`Error::KeyNotFound`] if it is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use slot_table::Error;
    /// # use slot_table::SlotTable;
    /// #
    /// let mut table = SlotTable::with_capacity(10)?;
    /// table.insert("hola".to_string(), "hello")?;
    ///
    /// assert_eq!(table.lookup("hola")?, &"hello");
    /// assert_eq!(table.lookup("missing"), Err(Error::KeyNotFound));
    /// # Ok::<(), Error>(())
    /// ```
    pub fn lookup<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).ok_or(Error::KeyNotFound)
    }

    /// Returns the value corresponding to the key, or `default` if the key is
    /// absent.
    pub fn get_or<'a, Q>(&'a self, key: &Q, default: &'a V) -> &'a V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).unwrap_or(default)
    }

    /// Returns `true` if the table contains a value for the key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Removes a key from the table, returning its value.
    ///
    /// Fails with [`Error::KeyNotFound`] if the key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use slot_table::Error;
    /// # use slot_table::SlotTable;
    /// #
    /// let mut table = SlotTable::with_capacity(10)?;
    /// table.insert(1, "a")?;
    /// assert_eq!(table.remove(&1), Ok("a"));
    /// assert_eq!(table.remove(&1), Err(Error::KeyNotFound));
    /// # Ok::<(), Error>(())
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes a key from the table, returning the stored key and value.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Result<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table
            .remove(hash, |(k, _)| k.borrow() == key)
            .ok_or(Error::KeyNotFound)
    }

    /// Returns a snapshot of the keys.
    ///
    /// The set is a fresh copy built with a clone of this table's hasher
    /// builder; later changes to either side do not affect the other.
    pub fn keys(&self) -> HashSet<K, S>
    where
        K: Clone,
        S: Clone,
    {
        let mut keys = HashSet::with_capacity_and_hasher(self.len(), self.hash_builder.clone());
        keys.extend(self.iter().map(|(k, _)| k.clone()));
        keys
    }

    /// Returns a snapshot of the values.
    ///
    /// Values need not be unique, so this is a list in table order rather
    /// than a set.
    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.iter().map(|(_, v)| v.clone()).collect()
    }

    /// Returns a snapshot of the key-value pairs.
    pub fn pairs(&self) -> HashSet<(K, V), S>
    where
        K: Clone,
        V: Clone + Hash + Eq,
        S: Clone,
    {
        let mut pairs = HashSet::with_capacity_and_hasher(self.len(), self.hash_builder.clone());
        pairs.extend(self.iter().map(|(k, v)| (k.clone(), v.clone())));
        pairs
    }
}

#[cfg(any(feature = "foldhash", feature = "std"))]
impl<K, V> SlotTable<K, V, DefaultHashBuilder>
where
    K: Hash + Eq,
{
    /// Creates a table with exactly `capacity` slots using the default hasher
    /// builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use slot_table::Error;
    /// # use slot_table::SlotTable;
    /// #
    /// let table: SlotTable<i32, String> = SlotTable::with_capacity(100)?;
    /// assert_eq!(table.capacity(), 100);
    /// assert!(table.is_empty());
    ///
    /// assert_eq!(
    ///     SlotTable::<i32, String>::with_capacity(0).err(),
    ///     Some(Error::InvalidCapacity { capacity: 0 })
    /// );
    /// # Ok::<(), Error>(())
    /// ```
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::with_capacity_and_hasher(capacity, DefaultHashBuilder::default())
    }

    /// Builds a table from a mapping using the default hasher builder.
    ///
    /// See [`from_mapping_with_hasher`](Self::from_mapping_with_hasher).
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use std::collections::BTreeMap;
    /// #
    /// # use slot_table::SlotTable;
    /// #
    /// let mapping = BTreeMap::from([("a", 1), ("b", 2), ("c", 3)]);
    ///
    /// let table = SlotTable::from_mapping(mapping.clone(), None)?;
    /// assert_eq!(table.capacity(), 30);
    ///
    /// let roomy = SlotTable::from_mapping(mapping, Some(100))?;
    /// assert_eq!(roomy.capacity(), 100);
    /// assert_eq!(table, roomy);
    /// # Ok::<(), slot_table::Error>(())
    /// ```
    pub fn from_mapping<I>(mapping: I, capacity: Option<usize>) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        I::IntoIter: ExactSizeIterator,
    {
        Self::from_mapping_with_hasher(mapping, capacity, DefaultHashBuilder::default())
    }
}

/// An iterator over the key-value pairs of a [`SlotTable`].
pub struct Iter<'a, K, V> {
    inner: crate::hash_table::Iter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<'a, K, V, S> IntoIterator for &'a SlotTable<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
