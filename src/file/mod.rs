//! Raw binary access for class-file decoding.
//!
//! This module holds the format-agnostic layer below the class decoder: endian-aware
//! primitive reads and a bounds-checked cursor. Nothing here knows about constant pools or
//! opcodes.
//!
//! # Key Components
//!
//! - [`crate::file::parser::Parser`] - Cursor over a byte slice with absolute error offsets
//! - [`crate::file::io`] - Big-endian primitive reads shared by the parser

pub mod io;
pub mod parser;

pub use parser::Parser;
