//! Serialize self-describing values with an open-ended type registry.
//!
//! # Overview
//!
//! A binary serialization library that converts arbitrary [Value]s into bytes and back without
//! an external schema:
//! - Every encoded value starts with a one-byte [Tag] naming how to decode its payload
//! - Composites share one framing rule (see [frame]), so they nest to any depth
//! - New types are added at runtime by registering them with a [Registry]
//!
//! # Supported Values
//!
//! Natively supports:
//! - Scalars: booleans, strings, numbers (`f64`), big integers (`i64`), null, and undefined
//! - Collections: arrays, insertion-ordered [Map]s and [Set]s, and string-keyed [Object]s
//! - Regular expressions, carried as their source and flags ([Regex])
//! - Values of registered types ([Instance])
//!
//! # Registered Types
//!
//! A type is registered under a name and gets the next free tag (starting at `11`). Its values
//! identify themselves through [Instance::type_name]. Without a [CustomCodec], a value is
//! encoded as its [Instance::entries] and decodes to a [Record] with the same name, which
//! re-encodes to identical bytes. A [CustomCodec] instead supplies the ordered fields to encode
//! and a reviver that rebuilds the value from them.
//!
//! Tags are assigned in registration order and are not written alongside the data, so bytes
//! must be decoded by a registry with the same registrations in the same order.
//!
//! # Example
//!
//! ```
//! use std::any::Any;
//! use tagged_codec::{Instance, Named, Object, Record, Registry, Value};
//!
//! #[derive(Debug)]
//! struct User {
//!     email: String,
//!     password: String,
//! }
//!
//! impl Named for User {
//!     const NAME: &'static str = "User";
//! }
//!
//! impl Instance for User {
//!     fn type_name(&self) -> &str {
//!         Self::NAME
//!     }
//!
//!     fn entries(&self) -> Object {
//!         let mut fields = Object::new();
//!         fields.insert("email", self.email.as_str());
//!         fields.insert("password", self.password.as_str());
//!         fields
//!     }
//!
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//! }
//!
//! let mut registry = Registry::new();
//! let tag = registry.register_type::<User>(None).unwrap();
//! assert_eq!(tag.get(), 11);
//!
//! let user = Value::instance(User {
//!     email: "ada@example.com".into(),
//!     password: "hunter2".into(),
//! });
//! let encoded = registry.encode(&user).unwrap();
//! let decoded = registry.decode(encoded.clone()).unwrap();
//!
//! // Decodes to a record carrying the same identifier and fields
//! let record = decoded.downcast_ref::<Record>().unwrap();
//! assert_eq!(record.name(), "User");
//! assert_eq!(record.get("email"), Some(&Value::from("ada@example.com")));
//! assert_eq!(decoded, user);
//!
//! // And re-encodes identically
//! assert_eq!(registry.encode(&decoded).unwrap(), encoded);
//! ```

pub mod codec;
pub mod config;
mod decoder;
mod encoder;
pub mod error;
pub mod frame;
pub mod registry;
pub mod tag;
pub mod types;
pub mod util;
pub mod value;

// Re-export main types and traits
pub use codec::{Decode, Read, ReadExt, Write};
pub use config::{Config, RangeCfg};
pub use error::Error;
pub use registry::{CustomCodec, EncodeFn, Registry, ReviveFn};
pub use tag::Tag;
pub use types::primitives;
pub use value::{Instance, Map, Named, Object, Record, Regex, Set, Value};
