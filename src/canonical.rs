//! Canonical serialization used by the default hash.
//!
//! `serde_json::to_value` rejects maps keyed by anything but strings and
//! integers outside the 64-bit range. This serializer accepts every serde data
//! model value and still produces a `serde_json::Value`:
//!
//! - maps whose keys all serialize to strings become objects;
//! - any other map becomes an array of `[key, value]` pairs;
//! - in both cases entries are sorted by their canonical text, so two maps
//!   with the same contents produce the same value whatever their iteration
//!   order;
//! - 128-bit integers outside the 64-bit range become `{"$int": "<decimal>"}`;
//! - `-0.0` is folded into `0.0`, since the two compare equal.
//!
//! Everything else matches `serde_json::to_value`.

use serde::ser::{self, Serialize};
use serde_json::{Error, Map, Value};

pub(crate) fn to_value<T>(value: &T) -> Result<Value, Error>
where
    T: Serialize + ?Sized,
{
    value.serialize(Serializer)
}

fn big_integer(decimal: String) -> Value {
    let mut wrapped = Map::new();
    wrapped.insert("$int".to_owned(), Value::String(decimal));
    Value::Object(wrapped)
}

fn float(v: f64) -> Value {
    if v == 0.0 {
        Value::from(0.0)
    } else {
        Value::from(v)
    }
}

fn tagged(variant: &'static str, inner: Value) -> Value {
    let mut object = Map::new();
    object.insert(variant.to_owned(), inner);
    Value::Object(object)
}

pub(crate) struct Serializer;

pub(crate) struct SerializeSeq(Vec<Value>);

impl SerializeSeq {
    fn push<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        self.0.push(value.serialize(Serializer)?);
        Ok(())
    }
}

impl ser::SerializeSeq for SerializeSeq {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        self.push(value)
    }

    fn end(self) -> Result<Value, Error> {
        Ok(Value::Array(self.0))
    }
}

impl ser::SerializeTuple for SerializeSeq {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        self.push(value)
    }

    fn end(self) -> Result<Value, Error> {
        Ok(Value::Array(self.0))
    }
}

impl ser::SerializeTupleStruct for SerializeSeq {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        self.push(value)
    }

    fn end(self) -> Result<Value, Error> {
        Ok(Value::Array(self.0))
    }
}

pub(crate) struct SerializeTupleVariant(&'static str, SerializeSeq);

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        self.1.push(value)
    }

    fn end(self) -> Result<Value, Error> {
        Ok(tagged(self.0, Value::Array((self.1).0)))
    }
}

pub(crate) struct SerializeStruct(Map<String, Value>);

impl SerializeStruct {
    fn field<T: Serialize + ?Sized>(&mut self, name: &'static str, value: &T) -> Result<(), Error> {
        self.0.insert(name.to_owned(), value.serialize(Serializer)?);
        Ok(())
    }
}

impl ser::SerializeStruct for SerializeStruct {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        name: &'static str,
        value: &T,
    ) -> Result<(), Error> {
        self.field(name, value)
    }

    fn end(self) -> Result<Value, Error> {
        Ok(Value::Object(self.0))
    }
}

pub(crate) struct SerializeStructVariant(&'static str, SerializeStruct);

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        name: &'static str,
        value: &T,
    ) -> Result<(), Error> {
        self.1.field(name, value)
    }

    fn end(self) -> Result<Value, Error> {
        Ok(tagged(self.0, Value::Object((self.1).0)))
    }
}

pub(crate) struct SerializeMap(Vec<(Value, Value)>, Option<Value>);

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), Error> {
        if self.1.is_some() {
            return Err(ser::Error::custom("map key without a value"));
        }
        self.1 = Some(key.serialize(Serializer)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        match self.1.take() {
            Some(k) => {
                self.0.push((k, value.serialize(Serializer)?));
                Ok(())
            }
            None => Err(ser::Error::custom("map value without a key")),
        }
    }

    fn end(self) -> Result<Value, Error> {
        if self.1.is_some() {
            return Err(ser::Error::custom("map key without a value"));
        }
        let mut entries = self.0;
        entries.sort_by_cached_key(|(k, v)| (k.to_string(), v.to_string()));

        if entries.iter().all(|(k, _)| k.is_string()) {
            let mut object = Map::new();
            for (k, v) in entries {
                if let Value::String(k) = k {
                    object.insert(k, v);
                }
            }
            Ok(Value::Object(object))
        } else {
            Ok(Value::Array(
                entries
                    .into_iter()
                    .map(|(k, v)| Value::Array(vec![k, v]))
                    .collect(),
            ))
        }
    }
}

impl ser::Serializer for Serializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeSeq;
    type SerializeTuple = SerializeSeq;
    type SerializeTupleStruct = SerializeSeq;
    type SerializeTupleVariant = SerializeTupleVariant;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeStruct;
    type SerializeStructVariant = SerializeStructVariant;

    fn serialize_bool(self, v: bool) -> Result<Value, Error> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value, Error> {
        Ok(Value::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value, Error> {
        Ok(Value::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value, Error> {
        Ok(Value::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value, Error> {
        Ok(Value::from(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value, Error> {
        if let Ok(small) = i64::try_from(v) {
            Ok(Value::from(small))
        } else if let Ok(small) = u64::try_from(v) {
            Ok(Value::from(small))
        } else {
            Ok(big_integer(v.to_string()))
        }
    }

    fn serialize_u8(self, v: u8) -> Result<Value, Error> {
        Ok(Value::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value, Error> {
        Ok(Value::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value, Error> {
        Ok(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value, Error> {
        Ok(Value::from(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Value, Error> {
        match u64::try_from(v) {
            Ok(small) => Ok(Value::from(small)),
            Err(_) => Ok(big_integer(v.to_string())),
        }
    }

    fn serialize_f32(self, v: f32) -> Result<Value, Error> {
        Ok(float(f64::from(v)))
    }

    fn serialize_f64(self, v: f64) -> Result<Value, Error> {
        Ok(float(v))
    }

    fn serialize_char(self, v: char) -> Result<Value, Error> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value, Error> {
        Ok(Value::String(v.to_owned()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value, Error> {
        Ok(Value::Array(v.iter().map(|&b| Value::from(b)).collect()))
    }

    fn serialize_none(self) -> Result<Value, Error> {
        Ok(Value::Null)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Value, Error> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value, Error> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, Error> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<Value, Error> {
        Ok(Value::String(variant.to_owned()))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value, Error> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, Error> {
        Ok(tagged(variant, value.serialize(self)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeSeq, Error> {
        Ok(SerializeSeq(Vec::with_capacity(len.unwrap_or(0))))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeSeq, Error> {
        Ok(SerializeSeq(Vec::with_capacity(len)))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SerializeSeq, Error> {
        Ok(SerializeSeq(Vec::with_capacity(len)))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeTupleVariant, Error> {
        Ok(SerializeTupleVariant(
            variant,
            SerializeSeq(Vec::with_capacity(len)),
        ))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap, Error> {
        Ok(SerializeMap(Vec::with_capacity(len.unwrap_or(0)), None))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<SerializeStruct, Error> {
        Ok(SerializeStruct(Map::new()))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeStructVariant, Error> {
        Ok(SerializeStructVariant(variant, SerializeStruct(Map::new())))
    }
}
