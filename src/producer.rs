//! # Key Producers
//!
//! Helpers for running a key producer as its own task.
//!
//! [`spawn_keys`] creates a bounded channel, spawns the producer on the tokio
//! runtime with the sending half, and returns the receiving half as a
//! [`KeyStream`]. The stream ends when the producer returns, since returning
//! drops the last [`KeySender`] and closes the channel.
//!
//! If the producer returns an error, or panics, the stream yields one final
//! `Err` carrying [`GroupByError::KeyFunction`].
//!
//! A producer must always return. A producer that never finishes keeps the
//! channel open and the grouping call waiting on it forever.
//!
//! ## Example
//!
//! ```rust
//! use groupweave::{spawn_keys, try_group_by_stream, GroupByError};
//!
//! # async fn example() -> Result<(), GroupByError> {
//! let words = vec!["apple", "avocado", "banana"];
//! let groups = try_group_by_stream(&words, |word: &&str| {
//!   let first = word.chars().next();
//!   spawn_keys(move |keys| async move {
//!     if let Some(c) = first {
//!       keys.send(c).await?;
//!     }
//!     Ok::<_, GroupByError>(())
//!   })
//! })
//! .await?;
//! assert_eq!(groups.get(&'a').map(<[_]>::len), Some(2));
//! # Ok(())
//! # }
//! ```

use crate::error::{BoxError, GroupByError};
use crate::grouper::Grouper;
use futures::{Stream, StreamExt};
use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{trace, warn};

/// Stream of keys produced by a spawned key producer.
pub type KeyStream<K> = Pin<Box<dyn Stream<Item = Result<K, GroupByError>> + Send>>;

/// Sending half handed to a spawned key producer.
pub struct KeySender<K> {
  tx: mpsc::Sender<K>,
}

impl<K> KeySender<K> {
  /// Sends a key, waiting for channel capacity.
  ///
  /// # Errors
  ///
  /// Returns [`GroupByError::ConsumerClosed`] if the key stream was dropped.
  pub async fn send(&self, key: K) -> Result<(), GroupByError> {
    self
      .tx
      .send(key)
      .await
      .map_err(|_| GroupByError::ConsumerClosed)
  }

  /// Returns `true` if the key stream was dropped.
  pub fn is_closed(&self) -> bool {
    self.tx.is_closed()
  }
}

impl<K> Clone for KeySender<K> {
  fn clone(&self) -> Self {
    Self {
      tx: self.tx.clone(),
    }
  }
}

impl Grouper {
  /// Spawns `producer` as a task and returns the keys it sends.
  ///
  /// The channel capacity comes from
  /// [`GroupByConfig::key_channel_capacity`](crate::GroupByConfig::key_channel_capacity).
  ///
  /// # Panics
  ///
  /// Panics if called outside of a tokio runtime.
  pub fn spawn_keys<K, F, Fut, X>(&self, producer: F) -> KeyStream<K>
  where
    K: Send + 'static,
    F: FnOnce(KeySender<K>) -> Fut,
    Fut: Future<Output = Result<(), X>> + Send + 'static,
    X: Into<BoxError> + Send + 'static,
  {
    // tokio rejects zero-capacity channels
    let (tx, rx) = mpsc::channel(self.config().key_channel_capacity.max(1));
    let handle = tokio::spawn(producer(KeySender { tx }));
    let name = self.component_name().to_string();

    Box::pin(async_stream::stream! {
      let mut keys = ReceiverStream::new(rx);
      let mut sent = 0usize;
      while let Some(key) = keys.next().await {
        sent += 1;
        yield Ok(key);
      }

      match handle.await {
        Ok(Ok(())) => {
          trace!(grouper = %name, keys = sent, "key producer finished");
        }
        Ok(Err(e)) => {
          let error = GroupByError::key_function(e);
          warn!(grouper = %name, keys = sent, error = %error, "key producer failed");
          yield Err(error);
        }
        Err(e) => {
          warn!(grouper = %name, keys = sent, error = %e, "key producer task failed");
          yield Err(GroupByError::key_function(e));
        }
      }
    })
  }
}

/// Spawns `producer` using a default [`Grouper`].
///
/// See [`Grouper::spawn_keys`].
pub fn spawn_keys<K, F, Fut, X>(producer: F) -> KeyStream<K>
where
  K: Send + 'static,
  F: FnOnce(KeySender<K>) -> Fut,
  Fut: Future<Output = Result<(), X>> + Send + 'static,
  X: Into<BoxError> + Send + 'static,
{
  Grouper::default().spawn_keys(producer)
}
