//! Encoder.
//!
//! Values are written as a tag followed by a payload. Composites are framed with
//! [crate::frame]: each element is encoded into its own buffer first so its length can be
//! checked against [crate::frame::MAX_ELEMENT_SIZE] before it is copied in.
//!
//! Dispatch for registered types relies only on [Instance::type_name]. A registered type with a
//! custom encoder is framed as the fields that encoder returns; any other instance (and every
//! [Value::Object]) is framed as its `[name, value]` field entries.

use crate::{frame, registry::Deconstruct, Error, Instance, Registry, Tag, Value, Write};
use bytes::{Bytes, BytesMut};

/// One element of a composite, borrowed from the value being encoded.
#[derive(Clone, Copy)]
enum Item<'a> {
    Value(&'a Value),
    /// A bare string (object key, regex source or flags).
    Str(&'a str),
    /// A `[key, value]` map entry.
    Entry(&'a Value, &'a Value),
    /// A `[name, value]` object field.
    Field(&'a str, &'a Value),
}

impl Registry {
    /// Encodes a value.
    ///
    /// Fails if a nested element encodes to more than 65,535 bytes, if an instance's type is
    /// not registered, or if a registered custom encoder is missing or fails.
    pub fn encode(&self, value: &Value) -> Result<Bytes, Error> {
        let mut buf = BytesMut::new();
        self.write_value(&mut buf, value)?;
        Ok(buf.freeze())
    }

    fn write_value(&self, buf: &mut BytesMut, value: &Value) -> Result<(), Error> {
        match value {
            Value::Null => Tag::NULL.write(buf),
            Value::Undefined => Tag::UNDEFINED.write(buf),
            Value::Bool(b) => {
                Tag::BOOLEAN.write(buf);
                b.write(buf);
            }
            Value::String(s) => write_str(buf, s)?,
            Value::Number(n) => {
                Tag::NUMBER.write(buf);
                n.write(buf);
            }
            Value::BigInt(n) => {
                Tag::BIGINT.write(buf);
                n.write(buf);
            }
            Value::Regex(regex) => {
                Tag::REGEX.write(buf);
                self.write_frame(
                    buf,
                    [Item::Str(&regex.source), Item::Str(&regex.flags)].into_iter(),
                )?;
            }
            Value::Array(items) => {
                Tag::ARRAY.write(buf);
                self.write_frame(buf, items.iter().map(Item::Value))?;
            }
            Value::Map(map) => {
                Tag::MAP.write(buf);
                self.write_frame(buf, map.iter().map(|(k, v)| Item::Entry(k, v)))?;
            }
            Value::Set(set) => {
                Tag::SET.write(buf);
                self.write_frame(buf, set.iter().map(Item::Value))?;
            }
            Value::Object(object) => {
                Tag::OBJECT.write(buf);
                self.write_frame(buf, object.iter().map(|(k, v)| Item::Field(k, v)))?;
            }
            Value::Instance(instance) => self.write_instance(buf, instance.as_ref())?,
        }
        Ok(())
    }

    fn write_instance(&self, buf: &mut BytesMut, instance: &dyn Instance) -> Result<(), Error> {
        let name = instance.type_name();
        let tag = self
            .tag(name)
            .filter(|tag| !tag.is_builtin())
            .ok_or_else(|| Error::UnknownType(name.to_string()))?;
        tag.write(buf);

        match self.encoder(tag) {
            Some(Deconstruct::Custom(encode)) => {
                let fields = encode(instance)?;
                self.write_frame(buf, fields.iter().map(Item::Value))
            }
            Some(Deconstruct::Missing) => Err(Error::InvalidCustomCodec(
                name.to_string(),
                "no encoder registered",
            )),
            Some(Deconstruct::Entries) | None => {
                let entries = instance.entries();
                self.write_frame(buf, entries.iter().map(|(k, v)| Item::Field(k, v)))
            }
        }
    }

    fn write_item(&self, buf: &mut BytesMut, item: Item<'_>) -> Result<(), Error> {
        match item {
            Item::Value(value) => self.write_value(buf, value),
            Item::Str(s) => write_str(buf, s),
            Item::Entry(key, value) => {
                Tag::ARRAY.write(buf);
                self.write_frame(buf, [Item::Value(key), Item::Value(value)].into_iter())
            }
            Item::Field(name, value) => {
                Tag::ARRAY.write(buf);
                self.write_frame(buf, [Item::Str(name), Item::Value(value)].into_iter())
            }
        }
    }

    /// Writes the array-like payload of a composite.
    fn write_frame<'a>(
        &self,
        buf: &mut BytesMut,
        items: impl ExactSizeIterator<Item = Item<'a>>,
    ) -> Result<(), Error> {
        frame::write_count(buf, items.len())?;
        let mut element = BytesMut::new();
        for item in items {
            element.clear();
            self.write_item(&mut element, item)?;
            frame::write_element(buf, &element)?;
        }
        Ok(())
    }
}

fn write_str(buf: &mut BytesMut, s: &str) -> Result<(), Error> {
    if u32::try_from(s.len()).is_err() {
        return Err(Error::LengthExceeded(s.len(), u32::MAX as usize));
    }
    Tag::STRING.write(buf);
    s.write(buf);
    Ok(())
}
