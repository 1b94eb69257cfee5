use crate::{
    descriptor::types::{BaseType, Descriptor},
    Error, Result,
};

/// Largest number of array dimensions a descriptor may declare.
pub const MAX_ARRAY_DIMENSIONS: usize = 255;

/// Character cursor shared by the descriptor and generic signature parsers.
///
/// Positions are byte offsets into the input string.
pub(crate) struct TextCursor<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> TextCursor<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        TextCursor { input, position: 0 }
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    pub(crate) fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += c.len_utf8();
        Some(c)
    }

    pub(crate) fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.position += expected.len_utf8();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, expected: char, what: &'static str) -> Result<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(what))
        }
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    pub(crate) fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn slice_from(&self, start: usize) -> &'a str {
        &self.input[start..self.position]
    }

    /// Fail unless the whole input has been consumed.
    pub(crate) fn finish(&self) -> Result<()> {
        if self.is_at_end() {
            Ok(())
        } else {
            Err(self.error("end of descriptor"))
        }
    }

    pub(crate) fn error(&self, expected: &'static str) -> Error {
        Error::DescriptorSyntax {
            descriptor: self.input.to_string(),
            position: self.position,
            found: self.peek(),
            expected,
        }
    }
}

/// Parser for field and method descriptors.
///
/// A parser instance handles exactly one descriptor string; use [`parse_field_descriptor`],
/// [`parse_method_descriptor`] or [`parse_descriptor`] unless you need to drive it by hand.
///
/// # Example
///
/// ```rust
/// use jarscope::descriptor::{DescriptorParser, Descriptor};
///
/// let mut parser = DescriptorParser::new("(ILjava/lang/String;)[J");
/// let desc = parser.parse_method()?;
/// assert_eq!(desc.parameters().len(), 2);
/// assert_eq!(desc.to_string(), "(ILjava/lang/String;)[J");
/// # Ok::<(), jarscope::Error>(())
/// ```
pub struct DescriptorParser<'a> {
    cursor: TextCursor<'a>,
}

impl<'a> DescriptorParser<'a> {
    /// Create a new `DescriptorParser` over a descriptor string
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        DescriptorParser {
            cursor: TextCursor::new(input),
        }
    }

    /// Parse a complete field descriptor.
    ///
    /// # Errors
    /// Returns [`crate::Error::DescriptorSyntax`] on any deviation from the grammar, including
    /// trailing characters.
    pub fn parse_field(&mut self) -> Result<Descriptor> {
        let desc = self.field_type()?;
        self.cursor.finish()?;
        Ok(desc)
    }

    /// Parse a complete method descriptor.
    ///
    /// # Errors
    /// Returns [`crate::Error::DescriptorSyntax`] on any deviation from the grammar, including
    /// trailing characters.
    pub fn parse_method(&mut self) -> Result<Descriptor> {
        self.cursor.expect('(', "'('")?;

        let mut params = Vec::new();
        while !self.cursor.eat(')') {
            if self.cursor.is_at_end() {
                return Err(self.cursor.error("')'"));
            }
            params.push(self.field_type()?);
        }

        let ret = if self.cursor.eat('V') {
            Descriptor::Primitive(BaseType::Void)
        } else {
            self.field_type()?
        };
        self.cursor.finish()?;

        Ok(Descriptor::MethodType(params, Box::new(ret)))
    }

    fn field_type(&mut self) -> Result<Descriptor> {
        let mut dimensions = 0usize;
        while self.cursor.peek() == Some('[') {
            dimensions += 1;
            if dimensions > MAX_ARRAY_DIMENSIONS {
                return Err(self.cursor.error("at most 255 array dimensions"));
            }
            self.cursor.bump();
        }

        let element = match self.cursor.peek() {
            Some('L') => {
                self.cursor.bump();
                Descriptor::ObjectType(self.internal_name()?)
            }
            Some(c) => match BaseType::from_code(c) {
                Some(base) if base != BaseType::Void => {
                    self.cursor.bump();
                    Descriptor::Primitive(base)
                }
                _ => return Err(self.cursor.error("a field type")),
            },
            None => return Err(self.cursor.error("a field type")),
        };

        if dimensions == 0 {
            Ok(element)
        } else {
            // dimensions is bounded by MAX_ARRAY_DIMENSIONS above
            Ok(Descriptor::ArrayOf(Box::new(element), dimensions as u8))
        }
    }

    /// Read `pkg/Name;` after the leading `L`, validating each path segment.
    fn internal_name(&mut self) -> Result<String> {
        let start = self.cursor.position();
        let mut segment_empty = true;
        loop {
            match self.cursor.peek() {
                Some(';') => {
                    if segment_empty {
                        return Err(self.cursor.error("a class name segment"));
                    }
                    let name = self.cursor.slice_from(start).to_string();
                    self.cursor.bump();
                    return Ok(name);
                }
                Some('/') => {
                    if segment_empty {
                        return Err(self.cursor.error("a class name segment"));
                    }
                    segment_empty = true;
                    self.cursor.bump();
                }
                Some('.' | '[') | None => return Err(self.cursor.error("';'")),
                Some(_) => {
                    segment_empty = false;
                    self.cursor.bump();
                }
            }
        }
    }
}

/// Parse a field descriptor such as `I`, `[J` or `Ljava/lang/String;`.
///
/// # Errors
/// Returns [`crate::Error::DescriptorSyntax`] if `input` is not a field descriptor.
pub fn parse_field_descriptor(input: &str) -> Result<Descriptor> {
    DescriptorParser::new(input).parse_field()
}

/// Parse a method descriptor such as `(ILjava/lang/String;)V`.
///
/// # Errors
/// Returns [`crate::Error::DescriptorSyntax`] if `input` is not a method descriptor.
pub fn parse_method_descriptor(input: &str) -> Result<Descriptor> {
    DescriptorParser::new(input).parse_method()
}

/// Parse either kind of descriptor, choosing by the leading character.
///
/// # Errors
/// Returns [`crate::Error::DescriptorSyntax`] if `input` is not a valid descriptor.
pub fn parse_descriptor(input: &str) -> Result<Descriptor> {
    if input.starts_with('(') {
        parse_method_descriptor(input)
    } else {
        parse_field_descriptor(input)
    }
}

/// Validate the parameter part of a method descriptor, e.g. `(ILjava/lang/String;)`.
///
/// # Errors
/// Returns [`crate::Error::DescriptorSyntax`] if `input` is not a parenthesized parameter list.
pub fn parse_parameter_list(input: &str) -> Result<Vec<Descriptor>> {
    let mut parser = DescriptorParser::new(input);
    parser.cursor.expect('(', "'('")?;
    let mut params = Vec::new();
    while !parser.cursor.eat(')') {
        if parser.cursor.is_at_end() {
            return Err(parser.cursor.error("')'"));
        }
        params.push(parser.field_type()?);
    }
    parser.cursor.finish()?;
    Ok(params)
}
