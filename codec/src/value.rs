//! In-memory values understood by the codec.
//!
//! [Value] is the boundary between native Rust data and the wire format: one variant per
//! built-in kind plus [Value::Instance] for values of registered types.
//!
//! # Registered types
//!
//! A registered type identifies itself through [Instance::type_name], the marker the encoder
//! consults to pick a tag. Nothing about the concrete Rust type is inspected. Values of a type
//! registered without a reviver decode to a [Record], which carries the same identifier and
//! the decoded fields, so re-encoding it produces the original bytes.
//!
//! # Ordering
//!
//! [Map], [Set], and [Object] preserve insertion order and are hash-indexed. Keys (and set
//! members) are compared with [Value]'s structural equality, and [Value]'s [Hash] agrees with
//! it: every NaN hashes alike, `-0.0` hashes as `0.0`, and instances hash by name and entries.

use crate::{Error, Tag};
use indexmap::{IndexMap, IndexSet};
use std::{
    any::Any,
    fmt::Debug,
    hash::{Hash, Hasher},
    mem,
    sync::Arc,
};

/// A value of a registered type.
pub trait Instance: Any + Debug + Send + Sync {
    /// Identifier the type was registered under.
    fn type_name(&self) -> &str;

    /// Enumerable fields, in a stable order.
    ///
    /// Used to encode the value when its type has no custom encoder, and to compare instances.
    fn entries(&self) -> Object;

    /// Returns `self` as [Any] so custom codecs can recover the concrete type.
    fn as_any(&self) -> &dyn Any;
}

impl dyn Instance {
    /// Returns the concrete value if it is a `T`.
    pub fn downcast_ref<T: Instance>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Types with a declared name to register under.
pub trait Named {
    const NAME: &'static str;
}

/// A registered-type value rebuilt from its fields alone.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    name: String,
    fields: Object,
}

impl Record {
    pub fn new(name: impl Into<String>, fields: Object) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &Object {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn into_fields(self) -> Object {
        self.fields
    }
}

impl Instance for Record {
    fn type_name(&self) -> &str {
        &self.name
    }

    fn entries(&self) -> Object {
        self.fields.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A regular expression carried as data: its pattern source and flag string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Regex {
    pub source: String,
    pub flags: String,
}

impl Regex {
    pub fn new(source: impl Into<String>, flags: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            flags: flags.into(),
        }
    }
}

/// String-keyed fields in insertion order.
#[derive(Clone, Debug, Default)]
pub struct Object(IndexMap<String, Value>);

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, returning the previous value.
    ///
    /// An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Removes `key`, shifting later fields down to keep their order.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Builds an object from decoded `[key, value]` entries.
    pub(crate) fn from_entries(entries: Vec<Value>) -> Result<Self, Error> {
        let mut object = Self(IndexMap::with_capacity(entries.len()));
        for entry in entries {
            match into_pair(entry, "object")? {
                (Value::String(key), value) => {
                    object.insert(key, value);
                }
                _ => return Err(Error::InvalidData("object", "key is not a string")),
            }
        }
        Ok(object)
    }
}

// Field order is part of the encoding, so equality and hashing follow it.
impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for Object {}

impl Hash for Object {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for (key, value) in self.iter() {
            key.hash(state);
            value.hash(state);
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut object = Self::new();
        for (k, v) in iter {
            object.insert(k, v);
        }
        object
    }
}

impl IntoIterator for Object {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Key/value pairs of arbitrary values in insertion order.
#[derive(Clone, Debug, Default)]
pub struct Map(IndexMap<Value, Value>);

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, returning the previous value.
    ///
    /// An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<Value>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, Value, Value> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Builds a map from decoded `[key, value]` entries.
    pub(crate) fn from_entries(entries: Vec<Value>) -> Result<Self, Error> {
        let mut map = Self(IndexMap::with_capacity(entries.len()));
        for entry in entries {
            let (key, value) = into_pair(entry, "map")?;
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for Map {}

impl Hash for Map {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for (key, value) in self.iter() {
            key.hash(state);
            value.hash(state);
        }
    }
}

impl<K: Into<Value>, V: Into<Value>> FromIterator<(K, V)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl IntoIterator for Map {
    type Item = (Value, Value);
    type IntoIter = indexmap::map::IntoIter<Value, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Unique values in insertion order.
#[derive(Clone, Debug, Default)]
pub struct Set(IndexSet<Value>);

impl Set {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `value`, returning false if an equal value is already present.
    pub fn insert(&mut self, value: impl Into<Value>) -> bool {
        self.0.insert(value.into())
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.0.contains(value)
    }

    pub fn iter(&self) -> indexmap::set::Iter<'_, Value> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for Set {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for Set {}

impl Hash for Set {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for value in self.iter() {
            value.hash(state);
        }
    }
}

impl<V: Into<Value>> FromIterator<V> for Set {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut set = Self(IndexSet::with_capacity(iter.size_hint().0));
        for v in iter {
            set.insert(v);
        }
        set
    }
}

impl IntoIterator for Set {
    type Item = Value;
    type IntoIter = indexmap::set::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Splits a decoded 2-element array into its halves.
pub(crate) fn into_pair(value: Value, context: &'static str) -> Result<(Value, Value), Error> {
    let Value::Array(items) = value else {
        return Err(Error::InvalidData(context, "entry is not an array"));
    };
    match <[Value; 2]>::try_from(items) {
        Ok([key, value]) => Ok((key, value)),
        Err(_) => Err(Error::InvalidData(context, "entry is not a key/value pair")),
    }
}

/// A value the codec can encode.
#[derive(Clone, Debug)]
pub enum Value {
    Bool(bool),
    String(String),
    /// Always carried as a 64-bit float.
    Number(f64),
    /// Always carried as a 64-bit signed integer.
    BigInt(i64),
    Null,
    Undefined,
    Array(Vec<Value>),
    Map(Map),
    Set(Set),
    Regex(Regex),
    Object(Object),
    Instance(Arc<dyn Instance>),
}

impl Value {
    /// Wraps a value of a registered type.
    pub fn instance<T: Instance>(value: T) -> Self {
        Self::Instance(Arc::new(value))
    }

    /// Returns the tag of a built-in value, or `None` for [Value::Instance] (whose tag depends
    /// on the registry).
    pub fn tag(&self) -> Option<Tag> {
        let tag = match self {
            Self::Bool(_) => Tag::BOOLEAN,
            Self::String(_) => Tag::STRING,
            Self::Number(_) => Tag::NUMBER,
            Self::BigInt(_) => Tag::BIGINT,
            Self::Null => Tag::NULL,
            Self::Undefined => Tag::UNDEFINED,
            Self::Array(_) => Tag::ARRAY,
            Self::Map(_) => Tag::MAP,
            Self::Set(_) => Tag::SET,
            Self::Regex(_) => Tag::REGEX,
            Self::Object(_) => Tag::OBJECT,
            Self::Instance(_) => return None,
        };
        Some(tag)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bigint(&self) -> Option<i64> {
        match self {
            Self::BigInt(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&Set> {
        match self {
            Self::Set(set) => Some(set),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&dyn Instance> {
        match self {
            Self::Instance(instance) => Some(instance.as_ref()),
            _ => None,
        }
    }

    /// Returns the concrete value of an instance if it is a `T`.
    pub fn downcast_ref<T: Instance>(&self) -> Option<&T> {
        self.as_instance()?.as_any().downcast_ref::<T>()
    }
}

// NaN equals NaN so that decoded values compare equal to their source.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Self::BigInt(a), Self::BigInt(b)) => a == b,
            (Self::Null, Self::Null) | (Self::Undefined, Self::Undefined) => true,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Set(a), Self::Set(b)) => a == b,
            (Self::Regex(a), Self::Regex(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::Instance(a), Self::Instance(b)) => {
                a.type_name() == b.type_name() && a.entries() == b.entries()
            }
            _ => false,
        }
    }
}

impl Eq for Value {}

/// Bits of `n` with every NaN and both zeros collapsed, matching [Value]'s equality.
fn canonical_bits(n: f64) -> u64 {
    if n.is_nan() {
        f64::NAN.to_bits()
    } else if n == 0.0 {
        0
    } else {
        n.to_bits()
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            Self::Bool(b) => b.hash(state),
            Self::String(s) => s.hash(state),
            Self::Number(n) => canonical_bits(*n).hash(state),
            Self::BigInt(n) => n.hash(state),
            Self::Null | Self::Undefined => {}
            Self::Array(items) => items.hash(state),
            Self::Map(map) => map.hash(state),
            Self::Set(set) => set.hash(state),
            Self::Regex(regex) => regex.hash(state),
            Self::Object(object) => object.hash(state),
            Self::Instance(instance) => {
                instance.type_name().hash(state);
                instance.entries().hash(state);
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Number(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::BigInt(value)
    }
}

/// Big integers are carried in 64 bits: values outside the `i64` range wrap silently.
impl From<i128> for Value {
    fn from(value: i128) -> Self {
        Self::BigInt(value as i64)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::Array(value)
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Self::Map(value)
    }
}

impl From<Set> for Value {
    fn from(value: Set) -> Self {
        Self::Set(value)
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Self::Object(value)
    }
}

impl From<Regex> for Value {
    fn from(value: Regex) -> Self {
        Self::Regex(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Self::instance(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
