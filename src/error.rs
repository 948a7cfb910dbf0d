//! # Error Handling
//!
//! Errors raised by the grouping engine.
//!
//! ## Overview
//!
//! Grouping either fully succeeds or fails as a whole. There are no retries and
//! no partial results: the first error aborts the call and is returned to the
//! caller as a [`GroupByError`].
//!
//! ## Error Types
//!
//! - **InvalidField**: Field grouping was asked for an attribute the record does not have
//! - **NonHashableKey**: The attribute exists but is a container and cannot be a key
//! - **KeyFunction**: A caller-supplied key function or key producer failed
//! - **ConsumerClosed**: A key producer sent a key after the consumer went away
//! - **Serialization**: A record's `Serialize` impl reported an error
//! - **Runtime**: The runtime backing a blocking call could not be built
//!
//! ## Example
//!
//! ```rust
//! use groupweave::{group_by_field, GroupByError};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Row {
//!   name: String,
//! }
//!
//! let rows = vec![Row { name: "a".to_string() }];
//! match group_by_field(&rows, "missing") {
//!   Err(GroupByError::InvalidField { field, .. }) => assert_eq!(field, "missing"),
//!   _ => unreachable!(),
//! }
//! ```

use std::error::Error;
use std::fmt;

/// Boxed error returned by caller-supplied key functions and producers.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Error type for all grouping operations.
#[derive(Debug, thiserror::Error)]
pub enum GroupByError {
  /// The named attribute does not exist on the record shape.
  #[error("no field `{field}` on record shape `{shape}`")]
  InvalidField {
    /// The requested field name.
    field: String,
    /// The type name of the record that was inspected.
    shape: String,
  },

  /// The named attribute holds a value that cannot be used as a map key.
  #[error("field `{field}` holds {kind}, which cannot be used as a group key")]
  NonHashableKey {
    /// The requested field name.
    field: String,
    /// What kind of value was found (e.g. "an array").
    kind: &'static str,
  },

  /// A caller-supplied key function or key producer failed.
  #[error("key function failed: {0}")]
  KeyFunction(#[source] BoxError),

  /// The key consumer was dropped while a producer was still sending.
  #[error("key consumer closed before the producer finished")]
  ConsumerClosed,

  /// A record's `Serialize` impl failed during field lookup.
  #[error("record serialization failed: {0}")]
  Serialization(#[from] serde_json::Error),

  /// The runtime for a blocking call could not be created.
  #[error("failed to build runtime: {0}")]
  Runtime(#[from] std::io::Error),
}

impl GroupByError {
  /// Wraps a caller error as [`GroupByError::KeyFunction`].
  ///
  /// A caller error that already is a `GroupByError` (for example one yielded
  /// by a [`KeyStream`](crate::KeyStream)) is returned unchanged.
  pub fn key_function<E>(error: E) -> Self
  where
    E: Into<BoxError>,
  {
    let error: BoxError = error.into();
    match error.downcast::<GroupByError>() {
      Ok(error) => *error,
      Err(other) => Self::KeyFunction(other),
    }
  }

  /// Returns `true` if the error came from caller-supplied code.
  #[must_use]
  pub fn is_key_function(&self) -> bool {
    matches!(self, Self::KeyFunction(_))
  }

  /// Returns the caller's original error, if this is a key function failure.
  #[must_use]
  pub fn key_function_source(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
    match self {
      Self::KeyFunction(source) => Some(source.as_ref()),
      _ => None,
    }
  }
}

impl serde::ser::Error for GroupByError {
  fn custom<T: fmt::Display>(msg: T) -> Self {
    Self::Serialization(<serde_json::Error as serde::ser::Error>::custom(msg))
  }
}
