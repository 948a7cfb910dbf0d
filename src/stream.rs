//! # Stream Grouping
//!
//! Groups records by zero or more keys emitted by a caller-supplied stream.
//!
//! For each record, in input order, the key stream function is called on the
//! dereferenced record and the returned stream is drained to completion before
//! the next record is looked at. The record is added to the group of every key
//! emitted, in emission order:
//!
//! - A record whose stream emits nothing lands in no group.
//! - A record whose stream emits the same key twice appears twice in that group.
//!
//! Only one stream is alive at a time. Streams that run their producer on
//! another task (see [`spawn_keys`](crate::spawn_keys)) therefore never have
//! more than one producer running alongside the grouping loop.
//!
//! Streams must terminate. There is no timeout: a stream that never ends
//! blocks the call forever.
//!
//! ## Example
//!
//! ```rust
//! use futures::stream;
//! use groupweave::group_by_stream;
//!
//! # async fn example() {
//! let tags = vec![vec![0, 4], vec![0, 1], vec![]];
//! let groups = group_by_stream(&tags, |t: &Vec<i32>| stream::iter(t.clone())).await;
//! assert_eq!(groups.get(&0).map(<[_]>::len), Some(2));
//! assert_eq!(groups.total_records(), 4);
//! # }
//! ```

use crate::error::{BoxError, GroupByError};
use crate::group_map::GroupMap;
use crate::grouper::Grouper;
use futures::{Stream, StreamExt};
use std::borrow::Borrow;
use std::future::Future;
use std::hash::Hash;
use tracing::{debug, trace, warn};

impl Grouper {
  /// Groups `records` under every key emitted by `key_stream_fn`.
  ///
  /// Records are cloned once per emitted key; group references or `Arc`s to
  /// share a single record between groups.
  #[tracing::instrument(
    level = "debug",
    skip_all,
    fields(grouper = %self.component_name(), strategy = "stream")
  )]
  pub async fn by_stream<I, E, R, K, F, S>(&self, records: I, mut key_stream_fn: F) -> GroupMap<K, E>
  where
    I: IntoIterator<Item = E>,
    E: Borrow<R> + Clone,
    R: ?Sized,
    K: Hash + Eq,
    F: FnMut(&R) -> S,
    S: Stream<Item = K>,
  {
    let mut groups = GroupMap::new();
    let mut count = 0usize;
    let mut emitted = 0usize;

    for record in records {
      let keys = key_stream_fn(record.borrow());
      futures::pin_mut!(keys);

      while let Some(key) = keys.next().await {
        if groups.push(key, record.clone()) {
          trace!(record = count, groups = groups.len(), "created group");
        }
        emitted += 1;
      }
      count += 1;
    }

    debug!(
      records = count,
      keys = emitted,
      groups = groups.len(),
      "stream grouping complete"
    );
    groups
  }

  /// Groups `records` under every key emitted by a fallible `key_stream_fn`.
  ///
  /// # Errors
  ///
  /// The first `Err` yielded by a key stream aborts the call and is returned
  /// as [`GroupByError::KeyFunction`]. Errors that already are a
  /// `GroupByError`, such as those yielded by a [`KeyStream`](crate::KeyStream),
  /// are returned as they are.
  #[tracing::instrument(
    level = "debug",
    skip_all,
    fields(grouper = %self.component_name(), strategy = "stream")
  )]
  pub async fn try_by_stream<I, E, R, K, F, S, X>(
    &self,
    records: I,
    mut key_stream_fn: F,
  ) -> Result<GroupMap<K, E>, GroupByError>
  where
    I: IntoIterator<Item = E>,
    E: Borrow<R> + Clone,
    R: ?Sized,
    K: Hash + Eq,
    F: FnMut(&R) -> S,
    S: Stream<Item = Result<K, X>>,
    X: Into<BoxError>,
  {
    let mut groups = GroupMap::new();
    let mut count = 0usize;
    let mut emitted = 0usize;

    for record in records {
      let keys = key_stream_fn(record.borrow());
      futures::pin_mut!(keys);

      while let Some(key) = keys.next().await {
        let key = key.map_err(|e| {
          let error = GroupByError::key_function(e);
          warn!(record = count, keys = emitted, error = %error, "stream grouping aborted");
          error
        })?;
        if groups.push(key, record.clone()) {
          trace!(record = count, groups = groups.len(), "created group");
        }
        emitted += 1;
      }
      count += 1;
    }

    debug!(
      records = count,
      keys = emitted,
      groups = groups.len(),
      "stream grouping complete"
    );
    Ok(groups)
  }

  /// Blocking form of [`Grouper::by_stream`].
  ///
  /// Runs the grouping on a new current-thread tokio runtime, so producers
  /// started with [`Grouper::spawn_keys`] work from synchronous code.
  ///
  /// # Errors
  ///
  /// Returns [`GroupByError::Runtime`] if the runtime cannot be built.
  ///
  /// # Panics
  ///
  /// Panics if called from within an async runtime.
  pub fn by_stream_blocking<I, E, R, K, F, S>(
    &self,
    records: I,
    key_stream_fn: F,
  ) -> Result<GroupMap<K, E>, GroupByError>
  where
    I: IntoIterator<Item = E>,
    E: Borrow<R> + Clone,
    R: ?Sized,
    K: Hash + Eq,
    F: FnMut(&R) -> S,
    S: Stream<Item = K>,
  {
    block_on(self.by_stream(records, key_stream_fn))
  }

  /// Blocking form of [`Grouper::try_by_stream`].
  ///
  /// # Errors
  ///
  /// Returns [`GroupByError::Runtime`] if the runtime cannot be built, and
  /// otherwise the same errors as [`Grouper::try_by_stream`].
  ///
  /// # Panics
  ///
  /// Panics if called from within an async runtime.
  pub fn try_by_stream_blocking<I, E, R, K, F, S, X>(
    &self,
    records: I,
    key_stream_fn: F,
  ) -> Result<GroupMap<K, E>, GroupByError>
  where
    I: IntoIterator<Item = E>,
    E: Borrow<R> + Clone,
    R: ?Sized,
    K: Hash + Eq,
    F: FnMut(&R) -> S,
    S: Stream<Item = Result<K, X>>,
    X: Into<BoxError>,
  {
    block_on(self.try_by_stream(records, key_stream_fn))?
  }
}

fn block_on<T>(future: impl Future<Output = T>) -> Result<T, GroupByError> {
  let runtime = tokio::runtime::Builder::new_current_thread()
    .enable_all()
    .build()?;
  Ok(runtime.block_on(future))
}

/// Groups `records` by the keys emitted by `key_stream_fn` using a default [`Grouper`].
///
/// See [`Grouper::by_stream`].
pub async fn group_by_stream<I, E, R, K, F, S>(records: I, key_stream_fn: F) -> GroupMap<K, E>
where
  I: IntoIterator<Item = E>,
  E: Borrow<R> + Clone,
  R: ?Sized,
  K: Hash + Eq,
  F: FnMut(&R) -> S,
  S: Stream<Item = K>,
{
  Grouper::default().by_stream(records, key_stream_fn).await
}

/// Fallible form of [`group_by_stream`].
///
/// See [`Grouper::try_by_stream`].
pub async fn try_group_by_stream<I, E, R, K, F, S, X>(
  records: I,
  key_stream_fn: F,
) -> Result<GroupMap<K, E>, GroupByError>
where
  I: IntoIterator<Item = E>,
  E: Borrow<R> + Clone,
  R: ?Sized,
  K: Hash + Eq,
  F: FnMut(&R) -> S,
  S: Stream<Item = Result<K, X>>,
  X: Into<BoxError>,
{
  Grouper::default().try_by_stream(records, key_stream_fn).await
}

/// Blocking form of [`group_by_stream`].
///
/// See [`Grouper::by_stream_blocking`].
pub fn group_by_stream_blocking<I, E, R, K, F, S>(
  records: I,
  key_stream_fn: F,
) -> Result<GroupMap<K, E>, GroupByError>
where
  I: IntoIterator<Item = E>,
  E: Borrow<R> + Clone,
  R: ?Sized,
  K: Hash + Eq,
  F: FnMut(&R) -> S,
  S: Stream<Item = K>,
{
  Grouper::default().by_stream_blocking(records, key_stream_fn)
}

/// Blocking form of [`try_group_by_stream`].
///
/// See [`Grouper::try_by_stream_blocking`].
pub fn try_group_by_stream_blocking<I, E, R, K, F, S, X>(
  records: I,
  key_stream_fn: F,
) -> Result<GroupMap<K, E>, GroupByError>
where
  I: IntoIterator<Item = E>,
  E: Borrow<R> + Clone,
  R: ?Sized,
  K: Hash + Eq,
  F: FnMut(&R) -> S,
  S: Stream<Item = Result<K, X>>,
  X: Into<BoxError>,
{
  Grouper::default().try_by_stream_blocking(records, key_stream_fn)
}
