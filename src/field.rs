//! # Field Grouping
//!
//! Groups records by the value of a named attribute, looked up at runtime.
//!
//! Records are introspected through `serde`: each record's `Serialize` impl is
//! driven far enough to capture the named attribute, and no other attribute is
//! serialized. Attribute names are the serialized names, so `#[serde(rename)]`
//! applies. Serde treats references, `Box`, `Rc` and `Arc` transparently, so a
//! slice of values and a slice of references to the same values group
//! identically. The attribute itself is dereferenced the same way: `Some(x)`
//! groups under `x` and `None` groups under [`FieldKey::Null`].
//!
//! Tuple structs are addressed by position (`"0"`, `"1"`, ...). Maps such as
//! dynamic `serde_json::Value` records are addressed by key.
//!
//! ## Example
//!
//! ```rust
//! use groupweave::{group_by_field, FieldKey};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Row {
//!   b: &'static str,
//! }
//!
//! let rows = vec![Row { b: "b" }, Row { b: "c" }, Row { b: "b" }];
//! let groups = group_by_field(&rows, "b").unwrap();
//! assert_eq!(groups.get(&FieldKey::from("b")).map(<[_]>::len), Some(2));
//! ```

use crate::error::GroupByError;
use crate::extract::RecordSerializer;
use crate::group_map::GroupMap;
use crate::grouper::Grouper;
use crate::key::FieldKey;
use serde::Serialize;
use tracing::{debug, trace, warn};

impl Grouper {
  /// Groups `records` by the value of the attribute named `field`.
  ///
  /// Every record is appended, in input order, to the group for its attribute
  /// value. The original element (value or reference) is stored.
  ///
  /// # Errors
  ///
  /// - [`GroupByError::InvalidField`] if a record has no such attribute.
  /// - [`GroupByError::NonHashableKey`] if the attribute is an array or object.
  /// - [`GroupByError::Serialization`] if the attribute's `Serialize` impl fails.
  ///
  /// No partial map is returned on error.
  #[tracing::instrument(
    level = "debug",
    skip_all,
    fields(grouper = %self.component_name(), strategy = "field", field = %field)
  )]
  pub fn by_field<I, E>(&self, records: I, field: &str) -> Result<GroupMap<FieldKey, E>, GroupByError>
  where
    I: IntoIterator<Item = E>,
    E: Serialize,
  {
    let mut groups = GroupMap::new();
    let mut count = 0usize;

    for record in records {
      let key = match field_key(&record, field) {
        Ok(key) => key,
        Err(e) => {
          warn!(record = count, error = %e, "field grouping aborted");
          return Err(e);
        }
      };
      trace!(record = count, key = %key, "grouping record");
      if groups.push(key, record) {
        trace!(groups = groups.len(), "created group");
      }
      count += 1;
    }

    debug!(records = count, groups = groups.len(), "field grouping complete");
    Ok(groups)
  }
}

/// Groups `records` by the attribute named `field` using a default [`Grouper`].
///
/// See [`Grouper::by_field`].
pub fn group_by_field<I, E>(records: I, field: &str) -> Result<GroupMap<FieldKey, E>, GroupByError>
where
  I: IntoIterator<Item = E>,
  E: Serialize,
{
  Grouper::default().by_field(records, field)
}

/// Reads the attribute named `field` from `record` as a key.
pub(crate) fn field_key<E>(record: &E, field: &str) -> Result<FieldKey, GroupByError>
where
  E: Serialize + ?Sized,
{
  record
    .serialize(RecordSerializer::new(field))?
    .ok_or_else(|| GroupByError::InvalidField {
      field: field.to_string(),
      shape: std::any::type_name::<E>().to_string(),
    })
}
