//! # Group Map
//!
//! The result type shared by every grouping operation: a mapping from a derived
//! key to the records that produced it.
//!
//! ## Ordering
//!
//! - Within a group, records are kept in the order they were encountered.
//! - The order of keys is unspecified. Use [`GroupMap::into_sorted`] when a
//!   deterministic key order is needed.

use std::borrow::Borrow;
use std::collections::hash_map;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Mapping from a key to the ordered records grouped under it.
#[derive(Clone)]
pub struct GroupMap<K, E> {
  groups: HashMap<K, Vec<E>>,
}

impl<K, E> GroupMap<K, E>
where
  K: Hash + Eq,
{
  /// Creates an empty map.
  #[must_use]
  pub fn new() -> Self {
    Self {
      groups: HashMap::new(),
    }
  }

  /// Appends `record` to the group for `key`, creating the group if needed.
  ///
  /// Returns `true` if this created a new group.
  pub(crate) fn push(&mut self, key: K, record: E) -> bool {
    match self.groups.entry(key) {
      hash_map::Entry::Occupied(mut group) => {
        group.get_mut().push(record);
        false
      }
      hash_map::Entry::Vacant(slot) => {
        slot.insert(vec![record]);
        true
      }
    }
  }

  /// Returns the records grouped under `key`.
  ///
  /// The key may be any borrowed form of `K`, so a `String`-keyed map can be
  /// queried with a `&str`.
  pub fn get<Q>(&self, key: &Q) -> Option<&[E]>
  where
    K: Borrow<Q>,
    Q: ?Sized + Hash + Eq,
  {
    self.groups.get(key).map(Vec::as_slice)
  }

  /// Returns `true` if a group exists for `key`.
  pub fn contains_key<Q>(&self, key: &Q) -> bool
  where
    K: Borrow<Q>,
    Q: ?Sized + Hash + Eq,
  {
    self.groups.contains_key(key)
  }

  /// Returns the number of groups.
  pub fn len(&self) -> usize {
    self.groups.len()
  }

  /// Returns `true` if there are no groups.
  pub fn is_empty(&self) -> bool {
    self.groups.is_empty()
  }

  /// Returns the sum of all group sizes.
  pub fn total_records(&self) -> usize {
    self.groups.values().map(Vec::len).sum()
  }

  /// Iterates over the keys in unspecified order.
  pub fn keys(&self) -> impl Iterator<Item = &K> {
    self.groups.keys()
  }

  /// Iterates over `(key, records)` pairs in unspecified key order.
  pub fn iter(&self) -> impl Iterator<Item = (&K, &[E])> {
    self.groups.iter().map(|(key, group)| (key, group.as_slice()))
  }

  /// Consumes the map and returns the underlying `HashMap`.
  pub fn into_inner(self) -> HashMap<K, Vec<E>> {
    self.groups
  }

  /// Consumes the map and returns the groups sorted by key.
  pub fn into_sorted(self) -> Vec<(K, Vec<E>)>
  where
    K: Ord,
  {
    let mut groups = self.groups.into_iter().collect::<Vec<_>>();
    groups.sort_by(|(a, _), (b, _)| a.cmp(b));
    groups
  }
}

impl<K, E> Default for GroupMap<K, E>
where
  K: Hash + Eq,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<K, E> fmt::Debug for GroupMap<K, E>
where
  K: fmt::Debug,
  E: fmt::Debug,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_map().entries(self.groups.iter()).finish()
  }
}

impl<K, E> PartialEq for GroupMap<K, E>
where
  K: Hash + Eq,
  E: PartialEq,
{
  fn eq(&self, other: &Self) -> bool {
    self.groups == other.groups
  }
}

impl<K, E> Eq for GroupMap<K, E>
where
  K: Hash + Eq,
  E: Eq,
{
}

impl<K, E> Extend<(K, E)> for GroupMap<K, E>
where
  K: Hash + Eq,
{
  fn extend<I: IntoIterator<Item = (K, E)>>(&mut self, iter: I) {
    for (key, record) in iter {
      self.push(key, record);
    }
  }
}

impl<K, E> FromIterator<(K, E)> for GroupMap<K, E>
where
  K: Hash + Eq,
{
  fn from_iter<I: IntoIterator<Item = (K, E)>>(iter: I) -> Self {
    let mut groups = Self::new();
    groups.extend(iter);
    groups
  }
}

impl<K, E> IntoIterator for GroupMap<K, E> {
  type Item = (K, Vec<E>);
  type IntoIter = hash_map::IntoIter<K, Vec<E>>;

  fn into_iter(self) -> Self::IntoIter {
    self.groups.into_iter()
  }
}

impl<K, E> From<GroupMap<K, E>> for HashMap<K, Vec<E>> {
  fn from(groups: GroupMap<K, E>) -> Self {
    groups.groups
  }
}
