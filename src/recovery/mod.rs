//! Heuristic recovery without structural decoding.
//!
//! The scanner here never walks directory records; it searches a flat buffer
//! for the byte pattern that surrounds single-file wrappers.  It is an
//! alternate strategy for damaged bundles and is only used when selected
//! explicitly.

pub mod scanner;

pub use scanner::{scan, LegacyBlock, COMBINED_MARKER};
