//! Codec implementations for scalar types.

pub mod primitives;
