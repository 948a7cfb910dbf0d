//! Attribute extraction through `serde`.
//!
//! [`RecordSerializer`] drives a record's `Serialize` impl and captures only
//! the attribute with the requested name. Every other attribute is skipped
//! without being serialized. The captured attribute goes through
//! [`KeySerializer`], which turns scalars into a [`FieldKey`] directly, so
//! non-finite floats and 128-bit integers keep their value.
//!
//! Records may be structs, struct variants, maps with scalar keys, or
//! tuple-like values addressed by position. Newtype wrappers and `Some` are
//! looked through.

use crate::error::GroupByError;
use crate::key::FieldKey;
use serde::ser::{
  Impossible, Serialize, SerializeMap, SerializeSeq, SerializeStruct, SerializeStructVariant,
  SerializeTuple, SerializeTupleStruct, SerializeTupleVariant, Serializer,
};

/// Finds the attribute named `field` in a record.
///
/// Resolves to `None` when the record has no such attribute.
pub(crate) struct RecordSerializer<'a> {
  field: &'a str,
}

impl<'a> RecordSerializer<'a> {
  pub(crate) fn new(field: &'a str) -> Self {
    Self { field }
  }
}

macro_rules! no_attributes {
  ($($method:ident($ty:ty)),* $(,)?) => {
    $(
      fn $method(self, _v: $ty) -> Result<Self::Ok, Self::Error> {
        Ok(None)
      }
    )*
  };
}

impl<'a> Serializer for RecordSerializer<'a> {
  type Ok = Option<FieldKey>;
  type Error = GroupByError;
  type SerializeSeq = PositionLookup<'a>;
  type SerializeTuple = PositionLookup<'a>;
  type SerializeTupleStruct = PositionLookup<'a>;
  type SerializeTupleVariant = PositionLookup<'a>;
  type SerializeMap = EntryLookup<'a>;
  type SerializeStruct = NameLookup<'a>;
  type SerializeStructVariant = NameLookup<'a>;

  no_attributes!(
    serialize_bool(bool),
    serialize_i8(i8),
    serialize_i16(i16),
    serialize_i32(i32),
    serialize_i64(i64),
    serialize_i128(i128),
    serialize_u8(u8),
    serialize_u16(u16),
    serialize_u32(u32),
    serialize_u64(u64),
    serialize_u128(u128),
    serialize_f32(f32),
    serialize_f64(f64),
    serialize_char(char),
    serialize_str(&str),
    serialize_bytes(&[u8]),
  );

  fn serialize_none(self) -> Result<Self::Ok, Self::Error> {
    Ok(None)
  }

  fn serialize_some<T>(self, value: &T) -> Result<Self::Ok, Self::Error>
  where
    T: ?Sized + Serialize,
  {
    value.serialize(self)
  }

  fn serialize_unit(self) -> Result<Self::Ok, Self::Error> {
    Ok(None)
  }

  fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok, Self::Error> {
    Ok(None)
  }

  fn serialize_unit_variant(
    self,
    _name: &'static str,
    _index: u32,
    _variant: &'static str,
  ) -> Result<Self::Ok, Self::Error> {
    Ok(None)
  }

  fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Self::Ok, Self::Error>
  where
    T: ?Sized + Serialize,
  {
    value.serialize(self)
  }

  fn serialize_newtype_variant<T>(
    self,
    _name: &'static str,
    _index: u32,
    _variant: &'static str,
    value: &T,
  ) -> Result<Self::Ok, Self::Error>
  where
    T: ?Sized + Serialize,
  {
    value.serialize(self)
  }

  fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
    Ok(PositionLookup::new(self.field))
  }

  fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Self::Error> {
    Ok(PositionLookup::new(self.field))
  }

  fn serialize_tuple_struct(
    self,
    _name: &'static str,
    _len: usize,
  ) -> Result<Self::SerializeTupleStruct, Self::Error> {
    Ok(PositionLookup::new(self.field))
  }

  fn serialize_tuple_variant(
    self,
    _name: &'static str,
    _index: u32,
    _variant: &'static str,
    _len: usize,
  ) -> Result<Self::SerializeTupleVariant, Self::Error> {
    Ok(PositionLookup::new(self.field))
  }

  fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
    Ok(EntryLookup::new(self.field))
  }

  fn serialize_struct(
    self,
    _name: &'static str,
    _len: usize,
  ) -> Result<Self::SerializeStruct, Self::Error> {
    Ok(NameLookup::new(self.field))
  }

  fn serialize_struct_variant(
    self,
    _name: &'static str,
    _index: u32,
    _variant: &'static str,
    _len: usize,
  ) -> Result<Self::SerializeStructVariant, Self::Error> {
    Ok(NameLookup::new(self.field))
  }
}

/// Captures a named struct attribute.
pub(crate) struct NameLookup<'a> {
  field: &'a str,
  found: Option<FieldKey>,
}

impl<'a> NameLookup<'a> {
  fn new(field: &'a str) -> Self {
    Self { field, found: None }
  }

  fn attribute<T>(&mut self, name: &str, value: &T) -> Result<(), GroupByError>
  where
    T: ?Sized + Serialize,
  {
    if self.found.is_none() && name == self.field {
      self.found = Some(value.serialize(KeySerializer::new(self.field))?);
    }
    Ok(())
  }
}

impl SerializeStruct for NameLookup<'_> {
  type Ok = Option<FieldKey>;
  type Error = GroupByError;

  fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), Self::Error>
  where
    T: ?Sized + Serialize,
  {
    self.attribute(key, value)
  }

  fn end(self) -> Result<Self::Ok, Self::Error> {
    Ok(self.found)
  }
}

impl SerializeStructVariant for NameLookup<'_> {
  type Ok = Option<FieldKey>;
  type Error = GroupByError;

  fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), Self::Error>
  where
    T: ?Sized + Serialize,
  {
    self.attribute(key, value)
  }

  fn end(self) -> Result<Self::Ok, Self::Error> {
    Ok(self.found)
  }
}

/// Captures the map entry whose key prints as the attribute name.
///
/// Scalar keys match by their display form, so `{1: ..}` answers to `"1"`.
/// Keys that cannot be keys themselves never match.
pub(crate) struct EntryLookup<'a> {
  field: &'a str,
  matched: bool,
  found: Option<FieldKey>,
}

impl<'a> EntryLookup<'a> {
  fn new(field: &'a str) -> Self {
    Self {
      field,
      matched: false,
      found: None,
    }
  }
}

impl SerializeMap for EntryLookup<'_> {
  type Ok = Option<FieldKey>;
  type Error = GroupByError;

  fn serialize_key<T>(&mut self, key: &T) -> Result<(), Self::Error>
  where
    T: ?Sized + Serialize,
  {
    self.matched = self.found.is_none()
      && key
        .serialize(KeySerializer::new(self.field))
        .map_or(false, |key| key.to_string() == self.field);
    Ok(())
  }

  fn serialize_value<T>(&mut self, value: &T) -> Result<(), Self::Error>
  where
    T: ?Sized + Serialize,
  {
    if self.matched {
      self.found = Some(value.serialize(KeySerializer::new(self.field))?);
      self.matched = false;
    }
    Ok(())
  }

  fn end(self) -> Result<Self::Ok, Self::Error> {
    Ok(self.found)
  }
}

/// Captures a tuple element addressed by a numeric attribute name.
pub(crate) struct PositionLookup<'a> {
  field: &'a str,
  index: Option<usize>,
  next: usize,
  found: Option<FieldKey>,
}

impl<'a> PositionLookup<'a> {
  fn new(field: &'a str) -> Self {
    Self {
      field,
      index: field.parse().ok(),
      next: 0,
      found: None,
    }
  }

  fn element<T>(&mut self, value: &T) -> Result<(), GroupByError>
  where
    T: ?Sized + Serialize,
  {
    if self.index == Some(self.next) {
      self.found = Some(value.serialize(KeySerializer::new(self.field))?);
    }
    self.next += 1;
    Ok(())
  }
}

impl SerializeSeq for PositionLookup<'_> {
  type Ok = Option<FieldKey>;
  type Error = GroupByError;

  fn serialize_element<T>(&mut self, value: &T) -> Result<(), Self::Error>
  where
    T: ?Sized + Serialize,
  {
    self.element(value)
  }

  fn end(self) -> Result<Self::Ok, Self::Error> {
    Ok(self.found)
  }
}

impl SerializeTuple for PositionLookup<'_> {
  type Ok = Option<FieldKey>;
  type Error = GroupByError;

  fn serialize_element<T>(&mut self, value: &T) -> Result<(), Self::Error>
  where
    T: ?Sized + Serialize,
  {
    self.element(value)
  }

  fn end(self) -> Result<Self::Ok, Self::Error> {
    Ok(self.found)
  }
}

impl SerializeTupleStruct for PositionLookup<'_> {
  type Ok = Option<FieldKey>;
  type Error = GroupByError;

  fn serialize_field<T>(&mut self, value: &T) -> Result<(), Self::Error>
  where
    T: ?Sized + Serialize,
  {
    self.element(value)
  }

  fn end(self) -> Result<Self::Ok, Self::Error> {
    Ok(self.found)
  }
}

impl SerializeTupleVariant for PositionLookup<'_> {
  type Ok = Option<FieldKey>;
  type Error = GroupByError;

  fn serialize_field<T>(&mut self, value: &T) -> Result<(), Self::Error>
  where
    T: ?Sized + Serialize,
  {
    self.element(value)
  }

  fn end(self) -> Result<Self::Ok, Self::Error> {
    Ok(self.found)
  }
}

/// Converts a single attribute value into a [`FieldKey`].
///
/// Containers are rejected with [`GroupByError::NonHashableKey`].
pub(crate) struct KeySerializer<'a> {
  field: &'a str,
}

impl<'a> KeySerializer<'a> {
  pub(crate) fn new(field: &'a str) -> Self {
    Self { field }
  }

  fn non_hashable(&self, kind: &'static str) -> GroupByError {
    GroupByError::NonHashableKey {
      field: self.field.to_string(),
      kind,
    }
  }
}

macro_rules! scalar_keys {
  ($($method:ident($ty:ty)),* $(,)?) => {
    $(
      fn $method(self, v: $ty) -> Result<Self::Ok, Self::Error> {
        Ok(FieldKey::from(v))
      }
    )*
  };
}

impl Serializer for KeySerializer<'_> {
  type Ok = FieldKey;
  type Error = GroupByError;
  type SerializeSeq = Impossible<FieldKey, GroupByError>;
  type SerializeTuple = Impossible<FieldKey, GroupByError>;
  type SerializeTupleStruct = Impossible<FieldKey, GroupByError>;
  type SerializeTupleVariant = Impossible<FieldKey, GroupByError>;
  type SerializeMap = Impossible<FieldKey, GroupByError>;
  type SerializeStruct = Impossible<FieldKey, GroupByError>;
  type SerializeStructVariant = Impossible<FieldKey, GroupByError>;

  scalar_keys!(
    serialize_bool(bool),
    serialize_i8(i8),
    serialize_i16(i16),
    serialize_i32(i32),
    serialize_i64(i64),
    serialize_i128(i128),
    serialize_u8(u8),
    serialize_u16(u16),
    serialize_u32(u32),
    serialize_u64(u64),
    serialize_u128(u128),
    serialize_f64(f64),
    serialize_str(&str),
  );

  fn serialize_f32(self, v: f32) -> Result<Self::Ok, Self::Error> {
    Ok(FieldKey::Float(f64::from(v)))
  }

  fn serialize_char(self, v: char) -> Result<Self::Ok, Self::Error> {
    Ok(FieldKey::Str(v.to_string()))
  }

  fn serialize_bytes(self, _v: &[u8]) -> Result<Self::Ok, Self::Error> {
    Err(self.non_hashable("an array"))
  }

  fn serialize_none(self) -> Result<Self::Ok, Self::Error> {
    Ok(FieldKey::Null)
  }

  fn serialize_some<T>(self, value: &T) -> Result<Self::Ok, Self::Error>
  where
    T: ?Sized + Serialize,
  {
    value.serialize(self)
  }

  fn serialize_unit(self) -> Result<Self::Ok, Self::Error> {
    Ok(FieldKey::Null)
  }

  fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok, Self::Error> {
    Ok(FieldKey::Null)
  }

  fn serialize_unit_variant(
    self,
    _name: &'static str,
    _index: u32,
    variant: &'static str,
  ) -> Result<Self::Ok, Self::Error> {
    Ok(FieldKey::from(variant))
  }

  fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Self::Ok, Self::Error>
  where
    T: ?Sized + Serialize,
  {
    value.serialize(self)
  }

  fn serialize_newtype_variant<T>(
    self,
    _name: &'static str,
    _index: u32,
    _variant: &'static str,
    _value: &T,
  ) -> Result<Self::Ok, Self::Error>
  where
    T: ?Sized + Serialize,
  {
    Err(self.non_hashable("an object"))
  }

  fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
    Err(self.non_hashable("an array"))
  }

  fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Self::Error> {
    Err(self.non_hashable("an array"))
  }

  fn serialize_tuple_struct(
    self,
    _name: &'static str,
    _len: usize,
  ) -> Result<Self::SerializeTupleStruct, Self::Error> {
    Err(self.non_hashable("an array"))
  }

  fn serialize_tuple_variant(
    self,
    _name: &'static str,
    _index: u32,
    _variant: &'static str,
    _len: usize,
  ) -> Result<Self::SerializeTupleVariant, Self::Error> {
    Err(self.non_hashable("an object"))
  }

  fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
    Err(self.non_hashable("an object"))
  }

  fn serialize_struct(
    self,
    _name: &'static str,
    _len: usize,
  ) -> Result<Self::SerializeStruct, Self::Error> {
    Err(self.non_hashable("an object"))
  }

  fn serialize_struct_variant(
    self,
    _name: &'static str,
    _index: u32,
    _variant: &'static str,
    _len: usize,
  ) -> Result<Self::SerializeStructVariant, Self::Error> {
    Err(self.non_hashable("an object"))
  }
}
