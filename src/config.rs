//! Configuration for a [`Grouper`](crate::Grouper).

use serde::{Deserialize, Serialize};

/// Default capacity of the channel between a spawned key producer and the grouping loop.
pub const DEFAULT_KEY_CHANNEL_CAPACITY: usize = 16;

/// Configuration for grouping calls, including naming and producer channel sizing.
///
/// Missing fields take their defaults when deserialized, so a partial JSON
/// document such as `{"name": "orders"}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupByConfig {
  /// Optional name for identifying this grouper in logs.
  pub name: Option<String>,
  /// Capacity of the channel used by [`Grouper::spawn_keys`](crate::Grouper::spawn_keys).
  pub key_channel_capacity: usize,
}

impl Default for GroupByConfig {
  fn default() -> Self {
    Self {
      name: None,
      key_channel_capacity: DEFAULT_KEY_CHANNEL_CAPACITY,
    }
  }
}

impl GroupByConfig {
  /// Sets the name used in log output.
  pub fn with_name(mut self, name: String) -> Self {
    self.name = Some(name);
    self
  }

  /// Sets the capacity of spawned key producer channels.
  ///
  /// A capacity of zero is treated as one when the channel is created.
  pub fn with_key_channel_capacity(mut self, capacity: usize) -> Self {
    self.key_channel_capacity = capacity;
    self
  }

  /// Returns the configured name.
  pub fn name(&self) -> Option<String> {
    self.name.clone()
  }
}
