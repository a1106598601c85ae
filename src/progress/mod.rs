//! Progress reporting module
//!
//! Persists the extraction percentage for an external consumer: a plain
//! decimal integer rewritten in place, so a concurrent reader polling a
//! fixed offset always observes the latest value.

mod reporter;

pub use reporter::*;
