//! Type registry and registration API.
//!
//! A [Registry] maps type identifiers to tags and owns everything needed to encode and decode
//! values of the types registered with it. Built-in kinds occupy tags `0..=10` under their
//! canonical names; each registration takes the next tag from [Tag::FIRST_REGISTERED] upward.
//!
//! The registry only grows. Encoded bytes hold tags, not names, so a buffer is only guaranteed
//! to decode with a registry that registered the same types in the same order as the one that
//! produced it.
//!
//! Registration needs `&mut Registry` while encoding and decoding need only `&Registry`, so a
//! registry can be shared across threads once all types are registered.

use crate::{Config, Error, Instance, Named, Tag, Value};
use std::{collections::HashMap, fmt, sync::Arc};
use tracing::debug;

/// Splits an instance into an ordered list of fields.
pub type EncodeFn = Arc<dyn Fn(&dyn Instance) -> Result<Vec<Value>, Error> + Send + Sync>;

/// Rebuilds an instance from the fields produced by an [EncodeFn].
pub type ReviveFn = Arc<dyn Fn(Vec<Value>) -> Result<Arc<dyn Instance>, Error> + Send + Sync>;

/// Custom field decomposition and reconstruction for a registered type.
///
/// Either half may be omitted. A type registered with a pair lacking an encoder fails to encode
/// with [Error::InvalidCustomCodec]. A type without a reviver decodes its fields as `[name,
/// value]` entries into a [crate::Record].
#[derive(Clone, Default)]
pub struct CustomCodec {
    encode: Option<EncodeFn>,
    revive: Option<ReviveFn>,
}

impl CustomCodec {
    pub fn new<E, R>(encode: E, revive: R) -> Self
    where
        E: Fn(&dyn Instance) -> Result<Vec<Value>, Error> + Send + Sync + 'static,
        R: Fn(Vec<Value>) -> Result<Arc<dyn Instance>, Error> + Send + Sync + 'static,
    {
        Self {
            encode: Some(Arc::new(encode)),
            revive: Some(Arc::new(revive)),
        }
    }

    /// Builds a pair over a concrete type, downcasting instances before calling `encode`.
    pub fn for_type<T, E, R>(encode: E, revive: R) -> Self
    where
        T: Instance + Named,
        E: Fn(&T) -> Result<Vec<Value>, Error> + Send + Sync + 'static,
        R: Fn(Vec<Value>) -> Result<T, Error> + Send + Sync + 'static,
    {
        Self::new(
            move |instance| match instance.as_any().downcast_ref::<T>() {
                Some(value) => encode(value),
                None => Err(Error::InvalidCustomCodec(
                    T::NAME.to_string(),
                    "instance is not of the registered type",
                )),
            },
            move |fields| Ok(Arc::new(revive(fields)?) as Arc<dyn Instance>),
        )
    }

    pub fn encoder<E>(mut self, encode: E) -> Self
    where
        E: Fn(&dyn Instance) -> Result<Vec<Value>, Error> + Send + Sync + 'static,
    {
        self.encode = Some(Arc::new(encode));
        self
    }

    pub fn reviver<R>(mut self, revive: R) -> Self
    where
        R: Fn(Vec<Value>) -> Result<Arc<dyn Instance>, Error> + Send + Sync + 'static,
    {
        self.revive = Some(Arc::new(revive));
        self
    }
}

impl fmt::Debug for CustomCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomCodec")
            .field("encode", &self.encode.is_some())
            .field("revive", &self.revive.is_some())
            .finish()
    }
}

/// How a registered tag is encoded.
#[derive(Clone)]
pub(crate) enum Deconstruct {
    /// Write the instance's entries as `[name, value]` fields.
    Entries,
    /// Write the fields returned by a custom encoder.
    Custom(EncodeFn),
    /// A custom pair was registered without an encoder.
    Missing,
}

/// How a registered tag is decoded.
#[derive(Clone)]
pub(crate) enum Reconstruct {
    /// Pass the decoded fields to a reviver.
    Revive(ReviveFn),
    /// Rebuild a [crate::Record] carrying this identifier.
    Generic(String),
}

/// Position of a registered tag in the per-type tables.
fn slot(tag: Tag) -> Option<usize> {
    tag.get()
        .checked_sub(Tag::FIRST_REGISTERED.get())
        .map(usize::from)
}

/// An append-only table of types and the codec built on it.
#[derive(Clone)]
pub struct Registry {
    config: Config,

    /// Indexed by tag.
    names: Vec<String>,
    tags: HashMap<String, Tag>,

    /// Indexed by tag, starting at [Tag::FIRST_REGISTERED].
    encoders: Vec<Deconstruct>,

    /// Indexed like `encoders`, but kept apart from them.
    decoders: Vec<Reconstruct>,
}

impl Registry {
    /// Creates a registry holding only the built-in kinds.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let mut names = Vec::with_capacity(Tag::BUILTINS.len());
        let mut tags = HashMap::with_capacity(Tag::BUILTINS.len());
        for (tag, name) in Tag::BUILTINS {
            names.push(name.to_string());
            tags.insert(name.to_string(), tag);
        }
        Self {
            config,
            names,
            tags,
            encoders: Vec::new(),
            decoders: Vec::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Registers a type under `name`, returning its tag.
    ///
    /// Fails without modifying the registry if `name` is taken (including by a built-in kind)
    /// or if every tag has been handed out.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        custom: Option<CustomCodec>,
    ) -> Result<Tag, Error> {
        let name = name.into();
        if self.tags.contains_key(&name) {
            return Err(Error::DuplicateRegistration(name));
        }
        let tag = u8::try_from(self.names.len())
            .map(Tag::new)
            .map_err(|_| Error::TagSpaceExhausted)?;

        let has_custom = custom.is_some();
        let (deconstruct, reconstruct) = match custom {
            None => (Deconstruct::Entries, Reconstruct::Generic(name.clone())),
            Some(CustomCodec { encode, revive }) => (
                encode.map_or(Deconstruct::Missing, Deconstruct::Custom),
                revive.map_or_else(|| Reconstruct::Generic(name.clone()), Reconstruct::Revive),
            ),
        };
        self.encoders.push(deconstruct);
        self.decoders.push(reconstruct);
        self.tags.insert(name.clone(), tag);
        debug!(name = %name, %tag, custom = has_custom, "registered type");
        self.names.push(name);
        Ok(tag)
    }

    /// Registers `T` under [Named::NAME].
    pub fn register_type<T: Named>(&mut self, custom: Option<CustomCodec>) -> Result<Tag, Error> {
        self.register(T::NAME, custom)
    }

    pub(crate) fn encoder(&self, tag: Tag) -> Option<&Deconstruct> {
        self.encoders.get(slot(tag)?)
    }

    pub(crate) fn decoder(&self, tag: Tag) -> Option<&Reconstruct> {
        self.decoders.get(slot(tag)?)
    }

    /// Returns the tag of a built-in or registered identifier.
    pub fn tag(&self, name: &str) -> Option<Tag> {
        self.tags.get(name).copied()
    }

    /// Returns the identifier behind a tag.
    pub fn name(&self, tag: Tag) -> Option<&str> {
        self.names.get(tag.get() as usize).map(String::as_str)
    }

    /// Iterates over registered (non built-in) types in tag order.
    pub fn registered(&self) -> impl Iterator<Item = (Tag, &str)> {
        self.names
            .iter()
            .enumerate()
            .skip(Tag::FIRST_REGISTERED.get() as usize)
            .map(|(i, name)| (Tag::new(i as u8), name.as_str()))
    }

    /// Number of registered (non built-in) types.
    pub fn len(&self) -> usize {
        self.names.len() - Tag::BUILTINS.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("registered", &self.registered().collect::<Vec<_>>())
            .finish()
    }
}
