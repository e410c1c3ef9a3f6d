//! Type tags.
//!
//! Every encoded value starts with a single tag byte. Tags `0..=10` are fixed for the built-in
//! kinds and never renumbered. Tags from [Tag::FIRST_REGISTERED] upward are handed out by a
//! [crate::Registry] in registration order and are only meaningful to a registry that performed
//! the same registrations in the same order.

use crate::{Error, Read, ReadExt, Write};
use bytes::{Buf, BufMut};
use std::fmt;

/// Single-byte discriminator identifying how to decode the following payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(u8);

impl Tag {
    pub const BOOLEAN: Tag = Tag(0);
    pub const STRING: Tag = Tag(1);
    pub const NUMBER: Tag = Tag(2);
    pub const BIGINT: Tag = Tag(3);
    pub const NULL: Tag = Tag(4);
    pub const UNDEFINED: Tag = Tag(5);
    pub const ARRAY: Tag = Tag(6);
    pub const MAP: Tag = Tag(7);
    pub const SET: Tag = Tag(8);
    pub const REGEX: Tag = Tag(9);
    pub const OBJECT: Tag = Tag(10);

    /// First tag handed out to a registered type.
    pub const FIRST_REGISTERED: Tag = Tag(11);

    /// Built-in tags paired with their canonical names, in tag order.
    pub const BUILTINS: [(Tag, &'static str); 11] = [
        (Tag::BOOLEAN, "boolean"),
        (Tag::STRING, "string"),
        (Tag::NUMBER, "number"),
        (Tag::BIGINT, "bigint"),
        (Tag::NULL, "null"),
        (Tag::UNDEFINED, "undefined"),
        (Tag::ARRAY, "array"),
        (Tag::MAP, "map"),
        (Tag::SET, "set"),
        (Tag::REGEX, "regex"),
        (Tag::OBJECT, "object"),
    ];

    /// Creates a tag from its raw byte.
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Returns the raw byte.
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Returns true if the tag is reserved for a built-in kind.
    pub const fn is_builtin(self) -> bool {
        self.0 < Self::FIRST_REGISTERED.0
    }

    /// Returns the tag following this one, if the tag space is not exhausted.
    pub fn next(self) -> Option<Tag> {
        self.0.checked_add(1).map(Tag)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Tag> for u8 {
    fn from(tag: Tag) -> Self {
        tag.0
    }
}

impl Write for Tag {
    #[inline]
    fn write(&self, buf: &mut impl BufMut) {
        self.0.write(buf);
    }
}

impl Read for Tag {
    type Cfg = ();
    #[inline]
    fn read_cfg(buf: &mut impl Buf, _: &()) -> Result<Self, Error> {
        Ok(Self(u8::read(buf)?))
    }
}
