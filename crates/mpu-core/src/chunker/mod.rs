//! Part planning for multipart uploads.
//!
//! Splits a file of known size into numbered, fixed-size parts. Everything here
//! is pure range math so a plan can be re-derived at any time from
//! `(file_size, part_size)` alone.

mod part;

pub use part::{part_count, split, Part};
