//! Insertion-ordered map that allows duplicate keys.
//!
//! Keys and values live in two parallel vectors of equal length. Lookups are
//! linear scans, which is fine for the handful of entries a query string or a
//! form usually holds.

use std::fmt;

/// An ordered multimap backed by parallel vectors.
#[derive(Clone, PartialEq, Eq)]
pub struct TableMap<K, V> {
    keys: Vec<K>,
    values: Vec<V>,
}

impl<K, V> TableMap<K, V> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self {
            keys: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Create an empty map with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    /// Append an entry. Existing entries with the same key are kept.
    pub fn put(&mut self, key: K, value: V) {
        self.keys.push(key);
        self.values.push(value);
    }

    /// Number of entries, counting duplicates.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.keys.clear();
        self.values.clear();
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.keys.iter().zip(self.values.iter())
    }

    /// Keys in insertion order, duplicates included.
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Values in insertion order.
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Value of the first entry whose key equals `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: PartialEq<Q>,
        Q: ?Sized,
    {
        self.position(key).map(|i| &self.values[i])
    }

    /// All values stored under `key`, in insertion order.
    pub fn get_values<Q>(&self, key: &Q) -> Vec<&V>
    where
        K: PartialEq<Q>,
        Q: ?Sized,
    {
        self.iter().filter(|(k, _)| *k == key).map(|(_, v)| v).collect()
    }

    /// All keys that hold `value`, in insertion order.
    pub fn get_keys<Q>(&self, value: &Q) -> Vec<&K>
    where
        V: PartialEq<Q>,
        Q: ?Sized,
    {
        self.iter().filter(|(_, v)| *v == value).map(|(k, _)| k).collect()
    }

    /// Whether any entry has this key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: PartialEq<Q>,
        Q: ?Sized,
    {
        self.position(key).is_some()
    }

    /// Whether any entry has this value.
    pub fn contains_value<Q>(&self, value: &Q) -> bool
    where
        V: PartialEq<Q>,
        Q: ?Sized,
    {
        self.values.iter().any(|v| v == value)
    }

    /// Remove the first entry with this key and return its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: PartialEq<Q>,
        Q: ?Sized,
    {
        let index = self.position(key)?;
        self.keys.remove(index);
        Some(self.values.remove(index))
    }

    fn position<Q>(&self, key: &Q) -> Option<usize>
    where
        K: PartialEq<Q>,
        Q: ?Sized,
    {
        self.keys.iter().position(|k| k == key)
    }
}

impl<K, V> Default for TableMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for TableMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<K, V> FromIterator<(K, V)> for TableMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K, V> Extend<(K, V)> for TableMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

impl<K, V> IntoIterator for TableMap<K, V> {
    type Item = (K, V);
    type IntoIter = std::iter::Zip<std::vec::IntoIter<K>, std::vec::IntoIter<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.into_iter().zip(self.values)
    }
}
