//! Insertion-ordered name map
//!
//! Backs table columns, stored formulas and configuration sections, which
//! all iterate in the order names were first inserted.

use ahash::AHashMap;

/// Map from names to values that iterates in insertion order
///
/// Replacing the value of an existing name keeps its position; removing a
/// name keeps the relative order of the rest.
///
/// # Example
/// ```rust
/// use colcalc_core::OrderedMap;
///
/// let mut map = OrderedMap::new();
/// map.insert("b", 1);
/// map.insert("a", 2);
/// assert_eq!(map.insert("b", 3), Some(1));
/// assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "a"]);
/// ```
#[derive(Debug, Clone)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
    index: AHashMap<String, usize>,
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: AHashMap::new(),
        }
    }
}

impl<V> OrderedMap<V> {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the one it replaced
    pub fn insert(&mut self, name: impl Into<String>, value: V) -> Option<V> {
        let name = name.into();
        if let Some(&idx) = self.index.get(&name) {
            return Some(std::mem::replace(&mut self.entries[idx].1, value));
        }
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push((name, value));
        None
    }

    /// Get the value for a name
    pub fn get(&self, name: &str) -> Option<&V> {
        self.index.get(name).map(|&idx| &self.entries[idx].1)
    }

    /// Get the value for a name, mutably
    pub fn get_mut(&mut self, name: &str) -> Option<&mut V> {
        let idx = *self.index.get(name)?;
        Some(&mut self.entries[idx].1)
    }

    /// Check if a name is present
    pub fn contains_key(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Remove a name, returning its value
    pub fn remove(&mut self, name: &str) -> Option<V> {
        let idx = self.index.remove(name)?;
        let (_, value) = self.entries.remove(idx);
        for (later, _) in &self.entries[idx..] {
            if let Some(i) = self.index.get_mut(later) {
                *i -= 1;
            }
        }
        Some(value)
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, value)` pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> + '_ {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Names in order
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Values in order
    pub fn values(&self) -> Values<'_, V> {
        Values {
            inner: self.entries.iter(),
        }
    }
}

/// Iterator over the values of an [`OrderedMap`], in order
#[derive(Debug, Clone)]
pub struct Values<'a, V> {
    inner: std::slice::Iter<'a, (String, V)>,
}

impl<'a, V> Iterator for Values<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Values<'_, V> {}

impl<V: PartialEq> PartialEq for OrderedMap<V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<V: Eq> Eq for OrderedMap<V> {}

impl<N: Into<String>, V> FromIterator<(N, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<N: Into<String>, V> Extend<(N, V)> for OrderedMap<V> {
    fn extend<I: IntoIterator<Item = (N, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

impl<V> IntoIterator for OrderedMap<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Serialised as a map in insertion order; a repeated key in the input
/// keeps its first position and its last value
#[cfg(feature = "serde")]
mod serde_impl {
    use super::OrderedMap;
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::fmt;
    use std::marker::PhantomData;

    impl<V: Serialize> Serialize for OrderedMap<V> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.len()))?;
            for (name, value) in self.iter() {
                map.serialize_entry(name, value)?;
            }
            map.end()
        }
    }

    struct OrderedMapVisitor<V>(PhantomData<V>);

    impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
        type Value = OrderedMap<V>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of names to values")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<OrderedMap<V>, A::Error> {
            let mut map = OrderedMap::new();
            while let Some((name, value)) = access.next_entry::<String, V>()? {
                map.insert(name, value);
            }
            Ok(map)
        }
    }

    impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_overwrite_keeps_position() {
        let mut map: OrderedMap<i32> = [("x", 1), ("y", 2)].into_iter().collect();
        assert_eq!(map.insert("x", 3), Some(1));
        assert_eq!(map.iter().collect::<Vec<_>>(), vec![("x", &3), ("y", &2)]);
    }

    #[test]
    fn test_remove_reindexes() {
        let mut map: OrderedMap<i32> = [("a", 1), ("b", 2), ("c", 3)].into_iter().collect();
        assert_eq!(map.remove("a"), Some(1));
        assert_eq!(map.remove("a"), None);
        assert_eq!(map.get("c"), Some(&3));

        *map.get_mut("b").unwrap() = 20;
        assert_eq!(map.values().copied().collect::<Vec<_>>(), vec![20, 3]);

        map.clear();
        assert!(map.is_empty());
        assert!(!map.contains_key("c"));
    }

    #[test]
    fn test_equality_ignores_index_layout() {
        let mut a: OrderedMap<i32> = [("a", 1), ("b", 2)].into_iter().collect();
        a.remove("a");
        a.insert("a", 1);
        let b: OrderedMap<i32> = [("b", 2), ("a", 1)].into_iter().collect();
        assert_eq!(a, b);
    }
}
