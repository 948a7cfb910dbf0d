//! # Function Grouping
//!
//! Groups records by a key computed by a caller-supplied function.
//!
//! The key function is called exactly once per record, in input order, and
//! always receives the dereferenced record: when the input holds `&T` (or
//! `Box<T>`, `Arc<T>`, ...) the function is still handed `&T`. The grouped
//! output keeps the original element.
//!
//! ## Example
//!
//! ```rust
//! use groupweave::group_by_func;
//!
//! let values = vec![0, 1, 1, 3, 3];
//! let groups = group_by_func(&values, |c: &i32| c * 2);
//! assert_eq!(groups.get(&2), Some(&[&1, &1][..]));
//! ```

use crate::error::{BoxError, GroupByError};
use crate::group_map::GroupMap;
use crate::grouper::Grouper;
use std::borrow::Borrow;
use std::hash::Hash;
use tracing::{debug, trace, warn};

impl Grouper {
  /// Groups `records` by the key returned from `key_fn`.
  ///
  /// A panic inside `key_fn` unwinds through this call; nothing is returned.
  #[tracing::instrument(
    level = "debug",
    skip_all,
    fields(grouper = %self.component_name(), strategy = "func")
  )]
  pub fn by_func<I, E, R, K, F>(&self, records: I, mut key_fn: F) -> GroupMap<K, E>
  where
    I: IntoIterator<Item = E>,
    E: Borrow<R>,
    R: ?Sized,
    K: Hash + Eq,
    F: FnMut(&R) -> K,
  {
    let mut groups = GroupMap::new();
    let mut count = 0usize;

    for record in records {
      let key = key_fn(record.borrow());
      if groups.push(key, record) {
        trace!(record = count, groups = groups.len(), "created group");
      }
      count += 1;
    }

    debug!(records = count, groups = groups.len(), "func grouping complete");
    groups
  }

  /// Groups `records` by the key returned from a fallible `key_fn`.
  ///
  /// # Errors
  ///
  /// The first error returned by `key_fn` aborts the call and is returned as
  /// [`GroupByError::KeyFunction`], with the original error as its source.
  #[tracing::instrument(
    level = "debug",
    skip_all,
    fields(grouper = %self.component_name(), strategy = "func")
  )]
  pub fn try_by_func<I, E, R, K, F, X>(
    &self,
    records: I,
    mut key_fn: F,
  ) -> Result<GroupMap<K, E>, GroupByError>
  where
    I: IntoIterator<Item = E>,
    E: Borrow<R>,
    R: ?Sized,
    K: Hash + Eq,
    F: FnMut(&R) -> Result<K, X>,
    X: Into<BoxError>,
  {
    let mut groups = GroupMap::new();
    let mut count = 0usize;

    for record in records {
      let key = key_fn(record.borrow()).map_err(|e| {
        let error = GroupByError::key_function(e);
        warn!(record = count, error = %error, "func grouping aborted");
        error
      })?;
      if groups.push(key, record) {
        trace!(record = count, groups = groups.len(), "created group");
      }
      count += 1;
    }

    debug!(records = count, groups = groups.len(), "func grouping complete");
    Ok(groups)
  }
}

/// Groups `records` by `key_fn` using a default [`Grouper`].
///
/// See [`Grouper::by_func`].
pub fn group_by_func<I, E, R, K, F>(records: I, key_fn: F) -> GroupMap<K, E>
where
  I: IntoIterator<Item = E>,
  E: Borrow<R>,
  R: ?Sized,
  K: Hash + Eq,
  F: FnMut(&R) -> K,
{
  Grouper::default().by_func(records, key_fn)
}

/// Groups `records` by a fallible `key_fn` using a default [`Grouper`].
///
/// See [`Grouper::try_by_func`].
pub fn try_group_by_func<I, E, R, K, F, X>(records: I, key_fn: F) -> Result<GroupMap<K, E>, GroupByError>
where
  I: IntoIterator<Item = E>,
  E: Borrow<R>,
  R: ?Sized,
  K: Hash + Eq,
  F: FnMut(&R) -> Result<K, X>,
  X: Into<BoxError>,
{
  Grouper::default().try_by_func(records, key_fn)
}
