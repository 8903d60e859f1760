//! mediacompat - keep a media library playable
//!
//! Decides per file whether its container and codecs are acceptable and
//! re-encodes only the stream types that are not. The library crate exposes
//! the decision engine and the batch driver for integration testing.

pub mod compat;
pub mod config;
pub mod probe;
pub mod processor;
pub mod scanner;
