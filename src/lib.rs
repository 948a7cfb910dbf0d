//! # groupweave
//!
//! Group in-memory records into buckets keyed by a derived value.
//!
//! groupweave is a "group by" for slices, vectors and any other iterable of
//! records. Three strategies share one result type, [`GroupMap`]:
//!
//! - **Field Grouping** ([`group_by_field`]): key is the value of a named
//!   attribute, read at runtime through `serde`.
//! - **Function Grouping** ([`group_by_func`], [`try_group_by_func`]): key is
//!   computed by a caller-supplied function.
//! - **Stream Grouping** ([`group_by_stream`], [`try_group_by_stream`]): keys
//!   are emitted by a caller-supplied stream, so a record can land in zero,
//!   one or many groups. Producers can run on their own task with
//!   [`spawn_keys`].
//!
//! ## Key Concepts
//!
//! - **Record**: An element of the input. Inputs of values and inputs of
//!   references (`&T`, `Box<T>`, `Arc<T>`) are both supported, and the output
//!   keeps whichever was passed in.
//! - **Key**: Anything `Hash + Eq`. Field grouping uses [`FieldKey`].
//! - **Order**: Within a group, records keep input order (then emission order
//!   for stream grouping). Key order is unspecified.
//! - **Errors**: A call either returns a complete map or a [`GroupByError`].
//!
//! ## Quick Start
//!
//! ```rust
//! use groupweave::{group_by_field, group_by_func, FieldKey};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Order {
//!   region: String,
//!   total: u32,
//! }
//!
//! let orders = vec![
//!   Order { region: "eu".to_string(), total: 10 },
//!   Order { region: "us".to_string(), total: 25 },
//!   Order { region: "eu".to_string(), total: 40 },
//! ];
//!
//! let by_region = group_by_field(&orders, "region").unwrap();
//! assert_eq!(by_region.get(&FieldKey::from("eu")).map(<[_]>::len), Some(2));
//!
//! let by_size = group_by_func(&orders, |o: &Order| o.total >= 20);
//! assert_eq!(by_size.get(&true).map(<[_]>::len), Some(2));
//! ```

#![deny(missing_docs)]

/// Grouping configuration.
pub mod config;
/// Error types for grouping operations.
pub mod error;
mod extract;
/// Grouping by a named field.
pub mod field;
/// Grouping by a key function.
pub mod func;
/// The grouping result type.
pub mod group_map;
/// The configurable grouping engine.
pub mod grouper;
/// Runtime-typed field keys.
pub mod key;
/// Spawned key producers for stream grouping.
pub mod producer;
/// Grouping by streams of keys.
pub mod stream;

pub use config::{GroupByConfig, DEFAULT_KEY_CHANNEL_CAPACITY};
pub use error::{BoxError, GroupByError};
pub use field::group_by_field;
pub use func::{group_by_func, try_group_by_func};
pub use group_map::GroupMap;
pub use grouper::Grouper;
pub use key::FieldKey;
pub use producer::{spawn_keys, KeySender, KeyStream};
pub use stream::{
  group_by_stream, group_by_stream_blocking, try_group_by_stream, try_group_by_stream_blocking,
};

#[cfg(test)]
mod stream_test;
