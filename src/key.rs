//! Runtime-typed keys produced by field grouping.
//!
//! Field values are read from records at runtime, so their Rust type is not
//! known to the caller. [`FieldKey`] is the hashable subset of those values.
//! Numbers are normalised so that the same value collapses to one key whatever
//! integer width the field was declared with.

use crate::error::GroupByError;
use crate::extract::KeySerializer;
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A hashable value read from a record field.
#[derive(Debug, Clone)]
pub enum FieldKey {
  /// A `None` or unit value.
  Null,
  /// A boolean.
  Bool(bool),
  /// An integer that fits in `i128`.
  Int(i128),
  /// An unsigned integer above `i128::MAX`.
  UInt(u128),
  /// A floating point number, compared by bit pattern. Every NaN is the same
  /// key, and so are `0.0` and `-0.0`.
  Float(f64),
  /// A string, char, or unit enum variant name.
  Str(String),
}

impl FieldKey {
  /// Converts a field value into a key.
  ///
  /// Arrays and objects have no key semantics and are rejected with
  /// [`GroupByError::NonHashableKey`].
  pub fn from_value(field: &str, value: Value) -> Result<Self, GroupByError> {
    value.serialize(KeySerializer::new(field))
  }

  /// Returns the string value, if this is a string key.
  pub fn as_str(&self) -> Option<&str> {
    match self {
      Self::Str(s) => Some(s),
      _ => None,
    }
  }

  /// Returns the integer value, if this key holds one that fits in `i64`.
  pub fn as_i64(&self) -> Option<i64> {
    match self {
      Self::Int(i) => i64::try_from(*i).ok(),
      _ => None,
    }
  }

  fn float_bits(f: f64) -> u64 {
    Self::normalize(f).to_bits()
  }

  // One bit pattern per float key: -0.0 folds into 0.0, every NaN into NAN.
  fn normalize(f: f64) -> f64 {
    if f == 0.0 {
      0.0
    } else if f.is_nan() {
      f64::NAN
    } else {
      f
    }
  }

  fn rank(&self) -> u8 {
    match self {
      Self::Null => 0,
      Self::Bool(_) => 1,
      Self::Int(_) => 2,
      Self::UInt(_) => 3,
      Self::Float(_) => 4,
      Self::Str(_) => 5,
    }
  }
}

impl PartialEq for FieldKey {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Self::Null, Self::Null) => true,
      (Self::Bool(a), Self::Bool(b)) => a == b,
      (Self::Int(a), Self::Int(b)) => a == b,
      (Self::UInt(a), Self::UInt(b)) => a == b,
      (Self::Float(a), Self::Float(b)) => Self::float_bits(*a) == Self::float_bits(*b),
      (Self::Str(a), Self::Str(b)) => a == b,
      _ => false,
    }
  }
}

impl Eq for FieldKey {}

impl Hash for FieldKey {
  fn hash<H: Hasher>(&self, state: &mut H) {
    std::mem::discriminant(self).hash(state);
    match self {
      Self::Null => {}
      Self::Bool(b) => b.hash(state),
      Self::Int(i) => i.hash(state),
      Self::UInt(u) => u.hash(state),
      Self::Float(f) => Self::float_bits(*f).hash(state),
      Self::Str(s) => s.hash(state),
    }
  }
}

impl PartialOrd for FieldKey {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

/// Keys of different kinds order by kind: null, bool, int, uint, float, string.
impl Ord for FieldKey {
  fn cmp(&self, other: &Self) -> Ordering {
    match (self, other) {
      (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
      (Self::Int(a), Self::Int(b)) => a.cmp(b),
      (Self::UInt(a), Self::UInt(b)) => a.cmp(b),
      (Self::Float(a), Self::Float(b)) => Self::normalize(*a).total_cmp(&Self::normalize(*b)),
      (Self::Str(a), Self::Str(b)) => a.cmp(b),
      _ => self.rank().cmp(&other.rank()),
    }
  }
}

impl fmt::Display for FieldKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Null => write!(f, "null"),
      Self::Bool(b) => write!(f, "{}", b),
      Self::Int(i) => write!(f, "{}", i),
      Self::UInt(u) => write!(f, "{}", u),
      Self::Float(x) => write!(f, "{}", x),
      Self::Str(s) => write!(f, "{}", s),
    }
  }
}

impl From<&str> for FieldKey {
  fn from(s: &str) -> Self {
    Self::Str(s.to_string())
  }
}

impl From<String> for FieldKey {
  fn from(s: String) -> Self {
    Self::Str(s)
  }
}

impl From<bool> for FieldKey {
  fn from(b: bool) -> Self {
    Self::Bool(b)
  }
}

impl From<f64> for FieldKey {
  fn from(f: f64) -> Self {
    Self::Float(f)
  }
}

impl From<u128> for FieldKey {
  fn from(u: u128) -> Self {
    match i128::try_from(u) {
      Ok(i) => Self::Int(i),
      Err(_) => Self::UInt(u),
    }
  }
}

macro_rules! field_key_from_int {
  ($($t:ty),*) => {
    $(
      impl From<$t> for FieldKey {
        fn from(i: $t) -> Self {
          Self::Int(i128::from(i))
        }
      }
    )*
  };
}

field_key_from_int!(i8, i16, i32, i64, i128, u8, u16, u32, u64);
