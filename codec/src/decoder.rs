//! Decoder.
//!
//! Decoding dispatches on the leading tag alone. Every length and count is checked against the
//! bytes actually remaining before anything is split off, and each framed element must be
//! consumed exactly.
//!
//! A tag that is neither built-in nor registered decodes to [Value::Undefined] rather than
//! failing, discarding the rest of its own buffer.

use crate::{
    frame,
    registry::Reconstruct,
    value::{into_pair, Map, Object, Record, Regex, Set},
    Decode, Error, Read, ReadExt, Registry, Tag, Value,
};
use bytes::{Buf, Bytes};
use std::sync::Arc;
use tracing::{trace, warn};

/// Reads one value, leaving any bytes after it in `buf`.
impl Read for Value {
    type Cfg = Registry;

    fn read_cfg(buf: &mut impl Buf, registry: &Registry) -> Result<Self, Error> {
        registry.read_value(buf, 0)
    }
}

impl Registry {
    /// Decodes a value, requiring `bytes` to hold exactly one encoded value.
    pub fn decode(&self, bytes: impl Into<Bytes>) -> Result<Value, Error> {
        Value::decode_cfg(bytes.into(), self)
    }

    fn read_value(&self, buf: &mut impl Buf, depth: usize) -> Result<Value, Error> {
        if depth > self.config().max_depth {
            return Err(Error::DepthExceeded(depth));
        }

        let tag = Tag::read(buf)?;
        let value = match tag {
            Tag::BOOLEAN => Value::Bool(bool::read(buf)?),
            Tag::STRING => Value::String(String::read(buf)?),
            Tag::NUMBER => Value::Number(f64::read(buf)?),
            Tag::BIGINT => Value::BigInt(i64::read(buf)?),
            Tag::NULL => Value::Null,
            Tag::UNDEFINED => Value::Undefined,
            Tag::ARRAY => Value::Array(self.read_frame(buf, depth)?),
            Tag::MAP => Value::Map(Map::from_entries(self.read_frame(buf, depth)?)?),
            Tag::SET => Value::Set(self.read_frame(buf, depth)?.into_iter().collect::<Set>()),
            Tag::REGEX => {
                let fields = self.read_frame(buf, depth)?;
                match into_pair(Value::Array(fields), "regex")? {
                    (Value::String(source), Value::String(flags)) => {
                        Value::Regex(Regex { source, flags })
                    }
                    _ => return Err(Error::InvalidData("regex", "fields are not strings")),
                }
            }
            Tag::OBJECT => Value::Object(Object::from_entries(self.read_frame(buf, depth)?)?),
            _ => self.read_registered(buf, tag, depth)?,
        };
        Ok(value)
    }

    fn read_registered(
        &self,
        buf: &mut impl Buf,
        tag: Tag,
        depth: usize,
    ) -> Result<Value, Error> {
        let Some(reconstruct) = self.decoder(tag) else {
            warn!(%tag, skipped = buf.remaining(), "unrecognized tag");
            buf.advance(buf.remaining());
            return Ok(Value::Undefined);
        };

        let fields = self.read_frame(buf, depth)?;
        match reconstruct {
            Reconstruct::Revive(revive) => Ok(Value::Instance(revive(fields)?)),
            Reconstruct::Generic(name) => {
                trace!(name = %name, fields = fields.len(), "rebuilding record");
                let record = Record::new(name.clone(), Object::from_entries(fields)?);
                Ok(Value::Instance(Arc::new(record)))
            }
        }
    }

    /// Reads the array-like payload of a composite.
    fn read_frame(&self, buf: &mut impl Buf, depth: usize) -> Result<Vec<Value>, Error> {
        let count = frame::read_count(buf, &self.config().elements)?;

        // Every element takes at least its 2-byte length prefix
        let mut items = Vec::with_capacity(count.min(buf.remaining() / 2));
        for _ in 0..count {
            let mut element = frame::read_element(buf)?;
            items.push(self.read_value(&mut element, depth + 1)?);
            if element.has_remaining() {
                return Err(Error::ExtraData(element.remaining()));
            }
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Config, CustomCodec, Instance, RangeCfg};
    use bytes::BytesMut;

    #[test]
    fn test_scalars() {
        let registry = Registry::new();
        assert_eq!(registry.decode(vec![4]).unwrap(), Value::Null);
        assert_eq!(registry.decode(vec![5]).unwrap(), Value::Undefined);
        assert_eq!(registry.decode(vec![0, 0]).unwrap(), Value::Bool(false));
        assert_eq!(
            registry.decode(vec![1, 2, 0, 0, 0, b'h', b'i']).unwrap(),
            Value::from("hi")
        );
        assert_eq!(
            registry
                .decode(vec![3, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F])
                .unwrap(),
            Value::BigInt(i64::MAX)
        );
    }

    #[test]
    fn test_single_empty_payload_element() {
        let registry = Registry::new();
        let decoded = registry.decode(vec![6, 1, 0, 0, 0, 1, 0, 5]).unwrap();
        assert_eq!(decoded, Value::Array(vec![Value::Undefined]));
    }

    #[test]
    fn test_unrecognized_tag_is_undefined() {
        let registry = Registry::new();
        assert_eq!(registry.decode(vec![200, 1, 2, 3]).unwrap(), Value::Undefined);

        // Nested, only the element is skipped
        let decoded = registry
            .decode(vec![6, 2, 0, 0, 0, 3, 0, 42, 9, 9, 1, 0, 4])
            .unwrap();
        assert_eq!(decoded, Value::Array(vec![Value::Undefined, Value::Null]));
    }

    #[test]
    fn test_empty_buffer() {
        let registry = Registry::new();
        assert!(matches!(
            registry.decode(Vec::<u8>::new()),
            Err(Error::MalformedBuffer(1, 0))
        ));

        // A zero-length element has no tag
        assert!(matches!(
            registry.decode(vec![6, 1, 0, 0, 0, 0, 0]),
            Err(Error::MalformedBuffer(1, 0))
        ));
    }

    #[test]
    fn test_count_past_end() {
        let registry = Registry::new();

        // Claims 3 elements, carries 1
        assert!(matches!(
            registry.decode(vec![6, 3, 0, 0, 0, 1, 0, 4]),
            Err(Error::MalformedBuffer(2, 0))
        ));

        // Element length points past the end
        assert!(matches!(
            registry.decode(vec![6, 1, 0, 0, 0, 9, 0, 4]),
            Err(Error::MalformedBuffer(9, 1))
        ));

        // Truncated count
        assert!(matches!(
            registry.decode(vec![6, 1, 0]),
            Err(Error::MalformedBuffer(4, 2))
        ));
    }

    #[test]
    fn test_huge_count_does_not_preallocate() {
        let registry = Registry::new();
        assert!(matches!(
            registry.decode(vec![6, 0xFF, 0xFF, 0xFF, 0xFF]),
            Err(Error::MalformedBuffer(2, 0))
        ));
    }

    #[test]
    fn test_extra_data() {
        let registry = Registry::new();
        assert!(matches!(
            registry.decode(vec![4, 4]),
            Err(Error::ExtraData(1))
        ));

        // Element longer than the value inside it
        assert!(matches!(
            registry.decode(vec![6, 1, 0, 0, 0, 2, 0, 4, 4]),
            Err(Error::ExtraData(1))
        ));
    }

    #[test]
    fn test_malformed_entries() {
        let registry = Registry::new();

        // Map entry that is not a pair: [null]
        assert!(matches!(
            registry.decode(vec![7, 1, 0, 0, 0, 1, 0, 4]),
            Err(Error::InvalidData("map", _))
        ));

        // Object entry with a non-string key: [[null, null]]
        assert!(matches!(
            registry.decode(vec![10, 1, 0, 0, 0, 11, 0, 6, 2, 0, 0, 0, 1, 0, 4, 1, 0, 4]),
            Err(Error::InvalidData("object", _))
        ));

        // Regex with a single field
        assert!(matches!(
            registry.decode(vec![9, 1, 0, 0, 0, 1, 0, 4]),
            Err(Error::InvalidData("regex", _))
        ));
    }

    #[test]
    fn test_max_depth() {
        let registry = Registry::with_config(Config {
            max_depth: 1,
            ..Config::default()
        });
        let one = Value::Array(vec![Value::Null]);
        let two = Value::Array(vec![one.clone()]);

        let encoded = registry.encode(&one).unwrap();
        assert_eq!(registry.decode(encoded).unwrap(), one);

        let encoded = registry.encode(&two).unwrap();
        assert!(matches!(
            registry.decode(encoded),
            Err(Error::DepthExceeded(2))
        ));
    }

    #[test]
    fn test_element_limit() {
        let registry = Registry::with_config(Config {
            elements: RangeCfg::new(..=2),
            ..Config::default()
        });
        let ok = Value::Array(vec![Value::Null; 2]);
        let too_many = Value::Array(vec![Value::Null; 3]);

        let encoded = registry.encode(&ok).unwrap();
        assert_eq!(registry.decode(encoded).unwrap(), ok);

        let encoded = registry.encode(&too_many).unwrap();
        assert!(matches!(
            registry.decode(encoded),
            Err(Error::InvalidLength(3))
        ));
    }

    #[test]
    fn test_read_values_from_stream() {
        let registry = Registry::new();
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&registry.encode(&Value::from("first")).unwrap());
        buf.extend_from_slice(&registry.encode(&Value::Array(vec![Value::Null])).unwrap());
        buf.extend_from_slice(&[200, 1, 2]);

        // Values are read one after another; an unrecognized tag consumes the rest
        let mut buf = buf.freeze();
        assert_eq!(
            Value::read_cfg(&mut buf, &registry).unwrap(),
            Value::from("first")
        );
        assert_eq!(
            Value::read_cfg(&mut buf, &registry).unwrap(),
            Value::Array(vec![Value::Null])
        );
        assert_eq!(Value::read_cfg(&mut buf, &registry).unwrap(), Value::Undefined);
        assert!(!buf.has_remaining());

        // Any buffer works, not only `Bytes`
        let encoded = registry.encode(&Value::BigInt(-3)).unwrap();
        let mut slice: &[u8] = &encoded;
        assert_eq!(
            Value::read_cfg(&mut slice, &registry).unwrap(),
            Value::BigInt(-3)
        );
        assert_eq!(
            Value::decode_cfg(encoded.clone(), &registry).unwrap(),
            registry.decode(encoded).unwrap()
        );
    }

    #[test]
    fn test_large_collections() {
        const ENTRIES: usize = 100_000;
        let registry = Registry::new();

        let object: Object = (0..ENTRIES).map(|i| (format!("k{i}"), Value::Null)).collect();
        let decoded = registry
            .decode(registry.encode(&Value::Object(object)).unwrap())
            .unwrap();
        let decoded = decoded.as_object().unwrap();
        assert_eq!(decoded.len(), ENTRIES);
        assert_eq!(decoded.keys().last(), Some("k99999"));
        assert_eq!(decoded.get("k4242"), Some(&Value::Null));

        let map: Map = (0..ENTRIES).map(|i| (i as u32, i as u32 % 7)).collect();
        let set: Set = (0..ENTRIES).map(|i| i as u32).collect();
        let decoded = registry
            .decode(registry.encode(&Value::Map(map)).unwrap())
            .unwrap();
        let decoded = decoded.as_map().unwrap();
        assert_eq!(decoded.len(), ENTRIES);
        assert_eq!(
            decoded.get(&Value::from(12345u32)),
            Some(&Value::from(12345u32 % 7))
        );

        let decoded = registry
            .decode(registry.encode(&Value::Set(set)).unwrap())
            .unwrap();
        let decoded = decoded.as_set().unwrap();
        assert_eq!(decoded.len(), ENTRIES);
        assert!(decoded.contains(&Value::from(99_999u32)));
        assert!(!decoded.contains(&Value::from("99999")));
    }

    #[test]
    fn test_duplicate_entries_keep_first_position() {
        let registry = Registry::new();

        // Hand-framed set of [1, 1]
        let mut bytes = vec![8, 2, 0, 0, 0];
        for _ in 0..2 {
            bytes.extend_from_slice(&[9, 0, 2]);
            bytes.extend_from_slice(&1.0f64.to_le_bytes());
        }
        let decoded = registry.decode(bytes).unwrap();
        assert_eq!(decoded.as_set().unwrap().len(), 1);
    }

    #[test]
    fn test_reviver_receives_fields_in_order() {
        #[derive(Debug)]
        struct Pair(String, f64);
        impl Instance for Pair {
            fn type_name(&self) -> &str {
                "Pair"
            }
            fn entries(&self) -> Object {
                [("0", Value::from(self.0.as_str())), ("1", Value::from(self.1))]
                    .into_iter()
                    .collect()
            }
            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
        }

        let mut registry = Registry::new();
        registry
            .register(
                "Pair",
                Some(CustomCodec::default().reviver(|fields| {
                    match <[Value; 2]>::try_from(fields) {
                        Ok([Value::String(a), Value::Number(b)]) => {
                            Ok(Arc::new(Pair(a, b)) as Arc<dyn Instance>)
                        }
                        _ => Err(Error::InvalidData("Pair", "unexpected fields")),
                    }
                })),
            )
            .unwrap();

        // Hand-framed fields: ["k", 2.0]
        let mut bytes = vec![11, 2, 0, 0, 0, 6, 0, 1, 1, 0, 0, 0, b'k', 9, 0, 2];
        bytes.extend_from_slice(&2.0f64.to_le_bytes());
        let decoded = registry.decode(bytes).unwrap();
        let pair = decoded.downcast_ref::<Pair>().unwrap();
        assert_eq!(pair.0, "k");
        assert_eq!(pair.1, 2.0);
    }
}
