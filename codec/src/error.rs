//! Error types for codec operations

use std::string::FromUtf8Error;
use thiserror::Error;

/// Error type for codec operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("duplicate registration: {0}")]
    DuplicateRegistration(String),
    #[error("unknown type: {0}")]
    UnknownType(String),
    #[error("invalid custom codec for {0}: {1}")]
    InvalidCustomCodec(String, &'static str), // type, reason
    #[error("malformed buffer: needed {0} bytes, {1} remaining")]
    MalformedBuffer(usize, usize), // needed, remaining
    #[error("field too large: {0} > 65535 bytes")]
    FieldTooLarge(usize),
    #[error("extra data found: {0} bytes")]
    ExtraData(usize),
    #[error("invalid length: {0}")]
    InvalidLength(usize),
    #[error("length exceeded: {0} > {1}")]
    LengthExceeded(usize, usize), // found, max
    #[error("invalid bool: {0}")]
    InvalidBool(u8),
    #[error("invalid utf-8: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),
    #[error("invalid data in {0}: {1}")]
    InvalidData(&'static str, &'static str), // context, message
    #[error("tag space exhausted")]
    TagSpaceExhausted,
    #[error("nesting depth exceeded: {0}")]
    DepthExceeded(usize),
}
