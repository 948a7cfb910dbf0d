//! # Grouper
//!
//! A configured instance of the grouping engine.
//!
//! The grouping strategies are implemented as methods on [`Grouper`], one
//! module each:
//!
//! - [`crate::field`]: `by_field`
//! - [`crate::func`]: `by_func`, `try_by_func`
//! - [`crate::stream`]: `by_stream`, `try_by_stream` and their blocking forms
//! - [`crate::producer`]: `spawn_keys`
//!
//! A `Grouper` holds no state besides its configuration; every call builds a
//! fresh [`GroupMap`](crate::GroupMap).
//!
//! ## Example
//!
//! ```rust
//! use groupweave::Grouper;
//!
//! let grouper = Grouper::default().with_name("parity".to_string());
//! let groups = grouper.by_func(vec![1, 2, 3, 4], |x: &i32| x % 2);
//! assert_eq!(groups.get(&0), Some(&[2, 4][..]));
//! ```

use crate::config::GroupByConfig;

/// Name reported in logs when the grouper has not been named.
const DEFAULT_COMPONENT_NAME: &str = "grouper";

/// Grouping engine with its configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grouper {
  config: GroupByConfig,
}

impl Grouper {
  /// Creates a grouper from a configuration.
  #[must_use]
  pub fn new(config: GroupByConfig) -> Self {
    Self { config }
  }

  /// Sets the name used in log output.
  pub fn with_name(mut self, name: String) -> Self {
    self.config = self.config.with_name(name);
    self
  }

  /// Sets the capacity of channels created by [`Grouper::spawn_keys`].
  pub fn with_key_channel_capacity(mut self, capacity: usize) -> Self {
    self.config = self.config.with_key_channel_capacity(capacity);
    self
  }

  /// Returns the configuration.
  pub fn config(&self) -> &GroupByConfig {
    &self.config
  }

  /// Returns the name reported in logs.
  pub fn component_name(&self) -> &str {
    self
      .config
      .name
      .as_deref()
      .unwrap_or(DEFAULT_COMPONENT_NAME)
  }
}
