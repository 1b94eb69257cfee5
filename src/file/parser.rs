//! Cursor-based byte stream parser.
//!
//! This module provides the [`crate::file::parser::Parser`] type, a bounds-checked reader over a
//! byte slice. It has no knowledge of the class-file format; the class decoder, the
//! disassembler and the instruction scanner all build on it.
//!
//! # Architecture
//!
//! The parser maintains a position within a byte slice plus a `base` offset. The base is the
//! absolute position of the slice inside the original file, so a parser created over an
//! attribute body still reports errors against the whole file.
//!
//! # Usage Examples
//!
//! ```rust
//! use jarscope::Parser;
//!
//! let data = [0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x41];
//! let mut parser = Parser::new(&data);
//!
//! assert_eq!(parser.read_be::<u32>()?, 0xCAFE_BABE);
//! assert_eq!(parser.read_be::<u16>()?, 0x41);
//! assert!(!parser.has_more_data());
//! # Ok::<(), jarscope::Error>(())
//! ```

use crate::{
    file::io::{read_be_at, ClassIO},
    Result,
};

/// A generic binary data parser for reading big-endian structures.
///
/// Every read validates that enough data remains before consuming anything; a failed read
/// leaves the position unchanged.
pub struct Parser<'a> {
    data: &'a [u8],
    position: usize,
    base: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`Parser`] over the provided data.
    ///
    /// # Arguments
    /// * `data` - The byte slice to read from
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser {
            data,
            position: 0,
            base: 0,
        }
    }

    /// Create a new [`Parser`] over a slice that starts at `base` in the enclosing file.
    #[must_use]
    pub fn with_base(data: &'a [u8], base: usize) -> Self {
        Parser {
            data,
            position: 0,
            base,
        }
    }

    /// Returns the length of the data that is being parsed
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the parser has no data
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns true if there is more data to parse
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Number of bytes left after the current position.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Move the position to a specific location inside the slice.
    ///
    /// Seeking to exactly the end is allowed; nothing can be read from there.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `pos` is beyond the data length.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(out_of_bounds_error!(
                self.base + self.position,
                pos - self.position,
                self.remaining()
            ));
        }

        self.position = pos;
        Ok(())
    }

    /// Move the position forward by `step` bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if advancing would exceed the data length.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        self.ensure_remaining(step)?;
        self.position += step;
        Ok(())
    }

    /// Get the current position relative to the start of the slice.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Get the current position relative to the start of the enclosing file.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.base + self.position
    }

    /// Get access to the complete underlying slice.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Peek at the current byte without advancing.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if position is at the end of the data.
    pub fn peek_byte(&self) -> Result<u8> {
        match self.data.get(self.position) {
            Some(byte) => Ok(*byte),
            None => Err(out_of_bounds_error!(self.offset(), 1, 0)),
        }
    }

    /// Skip padding until the position is a multiple of `alignment`.
    ///
    /// Alignment is computed relative to the start of the slice, which for instruction
    /// streams is the start of the method's code array.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the padding runs past the end of the data.
    pub fn align(&mut self, alignment: usize) -> Result<()> {
        let padding = (alignment - (self.position % alignment)) % alignment;
        self.advance_by(padding)
    }

    /// Read a type `T` in big-endian byte order and advance past it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length.
    pub fn read_be<T: ClassIO>(&mut self) -> Result<T> {
        read_be_at::<T>(self.data, &mut self.position, self.base)
    }

    /// Read `length` raw bytes, borrowing them from the underlying slice.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `length` bytes remain.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        self.ensure_remaining(length)?;
        let bytes = &self.data[self.position..self.position + length];
        self.position += length;
        Ok(bytes)
    }

    /// Split off the next `length` bytes as a child parser and advance past them.
    ///
    /// The child keeps absolute offsets for error reporting.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `length` bytes remain.
    pub fn sub_parser(&mut self, length: usize) -> Result<Parser<'a>> {
        let base = self.offset();
        let bytes = self.read_bytes(length)?;
        Ok(Parser::with_base(bytes, base))
    }

    /// Verify that at least `needed` bytes remain.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `needed` bytes remain.
    pub fn ensure_remaining(&self, needed: usize) -> Result<()> {
        let available = self.remaining();
        if needed > available {
            return Err(out_of_bounds_error!(self.offset(), needed, available));
        }
        Ok(())
    }

    /// Capacity to reserve for `count` entries of at least `min_entry_size` bytes each.
    ///
    /// Counts come from the input, so the result never exceeds what the remaining bytes can
    /// actually hold.
    #[must_use]
    pub fn capacity_for(&self, count: usize, min_entry_size: usize) -> usize {
        count.min(self.remaining() / min_entry_size.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn read_sequence() {
        let data = [0x00, 0x01, 0xFF, 0xFF, 0xFF, 0xFE];
        let mut parser = Parser::new(&data);

        assert_eq!(parser.read_be::<u16>().unwrap(), 1);
        assert_eq!(parser.read_be::<i32>().unwrap(), -2);
        assert!(!parser.has_more_data());
        assert_eq!(parser.remaining(), 0);
    }

    #[test]
    fn failed_read_keeps_position() {
        let data = [0x01, 0x02, 0x03];
        let mut parser = Parser::new(&data);
        parser.advance_by(1).unwrap();

        let err = parser.read_be::<u32>().unwrap_err();
        assert!(matches!(
            err,
            Error::OutOfBounds {
                offset: 1,
                needed: 4,
                available: 2
            }
        ));
        assert_eq!(parser.pos(), 1);
    }

    #[test]
    fn seek_and_peek() {
        let data = [0x10, 0x20, 0x30];
        let mut parser = Parser::new(&data);

        parser.seek(2).unwrap();
        assert_eq!(parser.peek_byte().unwrap(), 0x30);
        parser.seek(3).unwrap();
        assert!(parser.peek_byte().is_err());
        assert!(parser.seek(4).is_err());
    }

    #[test]
    fn align_relative_to_slice() {
        let data = [0u8; 8];
        let mut parser = Parser::new(&data);

        parser.advance_by(1).unwrap();
        parser.align(4).unwrap();
        assert_eq!(parser.pos(), 4);

        parser.align(4).unwrap();
        assert_eq!(parser.pos(), 4);

        parser.advance_by(3).unwrap();
        assert!(parser.align(4).is_err());
    }

    #[test]
    fn sub_parser_reports_absolute_offsets() {
        let data = [0xAA, 0xBB, 0x00, 0x01, 0x02];
        let mut parser = Parser::new(&data);
        parser.advance_by(2).unwrap();

        let mut child = parser.sub_parser(2).unwrap();
        assert_eq!(parser.pos(), 4);
        assert_eq!(child.offset(), 2);
        assert_eq!(child.read_be::<u16>().unwrap(), 1);

        match child.read_be::<u8>() {
            Err(Error::OutOfBounds { offset, .. }) => assert_eq!(offset, 4),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn capacity_bounded_by_remaining_bytes() {
        let data = [0u8; 20];
        let mut parser = Parser::new(&data);

        assert_eq!(parser.capacity_for(0xFFFF, 8), 2);
        assert_eq!(parser.capacity_for(3, 2), 3);
        assert_eq!(parser.capacity_for(5, 0), 5);

        parser.advance_by(20).unwrap();
        assert_eq!(parser.capacity_for(0xFFFF, 1), 0);
    }

    #[test]
    fn read_bytes_borrows() {
        let data = [1, 2, 3, 4];
        let mut parser = Parser::new(&data);
        assert_eq!(parser.read_bytes(3).unwrap(), &[1, 2, 3]);
        assert!(parser.read_bytes(2).is_err());
        assert_eq!(parser.read_bytes(1).unwrap(), &[4]);
    }
}
