//! Generic signatures as stored in `Signature` attributes.
//!
//! Signatures extend descriptors with type parameters, type arguments, wildcards and type
//! variables. Three entry points cover the three places a `Signature` attribute can appear:
//! [`parse_class_signature`], [`parse_method_signature`] and [`parse_field_signature`].
//! Every parsed tree prints back to its source text through `Display`.
//!
//! ```rust
//! use jarscope::descriptor::parse_method_signature;
//!
//! let sig = parse_method_signature("<T:Ljava/lang/Object;>(Ljava/util/List<+TT;>;)TT;")?;
//! assert_eq!(sig.type_parameters[0].name, "T");
//! assert_eq!(sig.to_string(), "<T:Ljava/lang/Object;>(Ljava/util/List<+TT;>;)TT;");
//! # Ok::<(), jarscope::Error>(())
//! ```

use std::fmt;

use crate::{
    descriptor::{parser::TextCursor, types::BaseType},
    Error::RecursionLimit,
    Result,
};

/// Maximum nesting depth for type arguments and arrays
const MAX_RECURSION_DEPTH: usize = 50;

/// A Java type inside a generic signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeSignature {
    /// A primitive, never `void`
    Base(BaseType),
    /// A possibly parameterized class type
    Class(ClassTypeSignature),
    /// A reference to a type variable, e.g. `TT;`
    TypeVariable(String),
    /// An array of the component type
    Array(Box<TypeSignature>),
}

/// `Lpkg/Outer<..>.Inner<..>;`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassTypeSignature {
    /// Package prefix including the trailing `/`, empty for the default package
    pub package: String,
    /// The outermost class followed by inner class suffixes
    pub segments: Vec<SimpleClassTypeSignature>,
}

/// One class name and its type arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimpleClassTypeSignature {
    /// Simple name of the class
    pub name: String,
    /// Type arguments, empty when the class is used raw
    pub type_arguments: Vec<TypeArgument>,
}

/// A type argument between `<` and `>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeArgument {
    /// `*`
    Wildcard,
    /// A plain type argument
    Exact(TypeSignature),
    /// `+T`, an upper bounded wildcard
    Extends(TypeSignature),
    /// `-T`, a lower bounded wildcard
    Super(TypeSignature),
}

/// A formal type parameter such as `T:Ljava/lang/Object;`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeParameter {
    /// Name of the type variable
    pub name: String,
    /// Class bound, absent when only interface bounds are declared
    pub class_bound: Option<TypeSignature>,
    /// Interface bounds in declaration order
    pub interface_bounds: Vec<TypeSignature>,
}

/// Generic signature of a class or interface declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassSignature {
    /// Declared type parameters
    pub type_parameters: Vec<TypeParameter>,
    /// Generic superclass
    pub superclass: ClassTypeSignature,
    /// Generic superinterfaces
    pub interfaces: Vec<ClassTypeSignature>,
}

/// Generic signature of a method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    /// Declared type parameters
    pub type_parameters: Vec<TypeParameter>,
    /// Parameter types
    pub parameters: Vec<TypeSignature>,
    /// Return type, `None` for `void`
    pub result: Option<TypeSignature>,
    /// Declared thrown types, class types or type variables
    pub throws: Vec<TypeSignature>,
}

impl ClassTypeSignature {
    /// The erased internal name, inner classes joined with `$`.
    #[must_use]
    pub fn erasure(&self) -> String {
        let mut name = self.package.clone();
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                name.push('$');
            }
            name.push_str(&segment.name);
        }
        name
    }
}

struct SignatureParser<'a> {
    cursor: TextCursor<'a>,
    depth: usize,
}

impl<'a> SignatureParser<'a> {
    fn new(input: &'a str) -> Self {
        SignatureParser {
            cursor: TextCursor::new(input),
            depth: 0,
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth >= MAX_RECURSION_DEPTH {
            return Err(RecursionLimit(MAX_RECURSION_DEPTH));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn identifier(&mut self) -> Result<String> {
        let start = self.cursor.position();
        while let Some(c) = self.cursor.peek() {
            if matches!(c, '.' | ';' | '[' | '/' | '<' | '>' | ':') {
                break;
            }
            self.cursor.bump();
        }
        if self.cursor.position() == start {
            return Err(self.cursor.error("an identifier"));
        }
        Ok(self.cursor.slice_from(start).to_string())
    }

    fn java_type(&mut self) -> Result<TypeSignature> {
        if let Some(base) = self.cursor.peek().and_then(BaseType::from_code) {
            if base == BaseType::Void {
                return Err(self.cursor.error("a java type"));
            }
            self.cursor.bump();
            return Ok(TypeSignature::Base(base));
        }
        self.reference_type()
    }

    fn reference_type(&mut self) -> Result<TypeSignature> {
        self.enter()?;
        let result = match self.cursor.peek() {
            Some('L') => self.class_type().map(TypeSignature::Class),
            Some('T') => {
                self.cursor.bump();
                let name = self.identifier()?;
                self.cursor.expect(';', "';'")?;
                Ok(TypeSignature::TypeVariable(name))
            }
            Some('[') => {
                self.cursor.bump();
                self.java_type()
                    .map(|component| TypeSignature::Array(Box::new(component)))
            }
            _ => Err(self.cursor.error("a reference type")),
        };
        self.leave();
        result
    }

    fn class_type(&mut self) -> Result<ClassTypeSignature> {
        self.cursor.expect('L', "'L'")?;

        let mut package = String::new();
        let mut name = self.identifier()?;
        while self.cursor.eat('/') {
            package.push_str(&name);
            package.push('/');
            name = self.identifier()?;
        }

        let mut segments = vec![SimpleClassTypeSignature {
            name,
            type_arguments: self.type_arguments()?,
        }];
        while self.cursor.eat('.') {
            let name = self.identifier()?;
            segments.push(SimpleClassTypeSignature {
                name,
                type_arguments: self.type_arguments()?,
            });
        }
        self.cursor.expect(';', "';'")?;

        Ok(ClassTypeSignature { package, segments })
    }

    fn type_arguments(&mut self) -> Result<Vec<TypeArgument>> {
        let mut arguments = Vec::new();
        if !self.cursor.eat('<') {
            return Ok(arguments);
        }

        loop {
            let argument = match self.cursor.peek() {
                Some('*') => {
                    self.cursor.bump();
                    TypeArgument::Wildcard
                }
                Some('+') => {
                    self.cursor.bump();
                    TypeArgument::Extends(self.reference_type()?)
                }
                Some('-') => {
                    self.cursor.bump();
                    TypeArgument::Super(self.reference_type()?)
                }
                _ => TypeArgument::Exact(self.reference_type()?),
            };
            arguments.push(argument);

            if self.cursor.eat('>') {
                return Ok(arguments);
            }
        }
    }

    fn type_parameters(&mut self) -> Result<Vec<TypeParameter>> {
        let mut parameters = Vec::new();
        if !self.cursor.eat('<') {
            return Ok(parameters);
        }

        loop {
            let name = self.identifier()?;
            self.cursor.expect(':', "':'")?;
            let class_bound = match self.cursor.peek() {
                Some('L' | 'T' | '[') => Some(self.reference_type()?),
                _ => None,
            };
            let mut interface_bounds = Vec::new();
            while self.cursor.eat(':') {
                interface_bounds.push(self.reference_type()?);
            }
            parameters.push(TypeParameter {
                name,
                class_bound,
                interface_bounds,
            });

            if self.cursor.eat('>') {
                return Ok(parameters);
            }
        }
    }

    fn class_signature(&mut self) -> Result<ClassSignature> {
        let type_parameters = self.type_parameters()?;
        let superclass = self.class_type()?;
        let mut interfaces = Vec::new();
        while !self.cursor.is_at_end() {
            interfaces.push(self.class_type()?);
        }
        Ok(ClassSignature {
            type_parameters,
            superclass,
            interfaces,
        })
    }

    fn method_signature(&mut self) -> Result<MethodSignature> {
        let type_parameters = self.type_parameters()?;

        self.cursor.expect('(', "'('")?;
        let mut parameters = Vec::new();
        while !self.cursor.eat(')') {
            if self.cursor.is_at_end() {
                return Err(self.cursor.error("')'"));
            }
            parameters.push(self.java_type()?);
        }

        let result = if self.cursor.eat('V') {
            None
        } else {
            Some(self.java_type()?)
        };

        let mut throws = Vec::new();
        while self.cursor.eat('^') {
            let thrown = match self.cursor.peek() {
                Some('L' | 'T') => self.reference_type()?,
                _ => return Err(self.cursor.error("a class type or type variable")),
            };
            throws.push(thrown);
        }
        self.cursor.finish()?;

        Ok(MethodSignature {
            type_parameters,
            parameters,
            result,
            throws,
        })
    }
}

/// Parse the `Signature` attribute of a class.
///
/// # Errors
/// Returns [`crate::Error::DescriptorSyntax`] for malformed input and
/// [`crate::Error::RecursionLimit`] for pathologically nested type arguments.
pub fn parse_class_signature(input: &str) -> Result<ClassSignature> {
    SignatureParser::new(input).class_signature()
}

/// Parse the `Signature` attribute of a method.
///
/// # Errors
/// Returns [`crate::Error::DescriptorSyntax`] for malformed input and
/// [`crate::Error::RecursionLimit`] for pathologically nested type arguments.
pub fn parse_method_signature(input: &str) -> Result<MethodSignature> {
    SignatureParser::new(input).method_signature()
}

/// Parse the `Signature` attribute of a field, which is always a reference type.
///
/// # Errors
/// Returns [`crate::Error::DescriptorSyntax`] for malformed input and
/// [`crate::Error::RecursionLimit`] for pathologically nested type arguments.
pub fn parse_field_signature(input: &str) -> Result<TypeSignature> {
    let mut parser = SignatureParser::new(input);
    let sig = parser.reference_type()?;
    parser.cursor.finish()?;
    Ok(sig)
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSignature::Base(base) => write!(f, "{}", base.code()),
            TypeSignature::Class(class) => write!(f, "{class}"),
            TypeSignature::TypeVariable(name) => write!(f, "T{name};"),
            TypeSignature::Array(component) => write!(f, "[{component}"),
        }
    }
}

impl fmt::Display for ClassTypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.package)?;
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        f.write_str(";")
    }
}

impl fmt::Display for SimpleClassTypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.type_arguments.is_empty() {
            f.write_str("<")?;
            for argument in &self.type_arguments {
                write!(f, "{argument}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

impl fmt::Display for TypeArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeArgument::Wildcard => f.write_str("*"),
            TypeArgument::Exact(sig) => write!(f, "{sig}"),
            TypeArgument::Extends(sig) => write!(f, "+{sig}"),
            TypeArgument::Super(sig) => write!(f, "-{sig}"),
        }
    }
}

fn write_type_parameters(f: &mut fmt::Formatter<'_>, params: &[TypeParameter]) -> fmt::Result {
    if params.is_empty() {
        return Ok(());
    }
    f.write_str("<")?;
    for param in params {
        write!(f, "{}:", param.name)?;
        if let Some(bound) = &param.class_bound {
            write!(f, "{bound}")?;
        }
        for bound in &param.interface_bounds {
            write!(f, ":{bound}")?;
        }
    }
    f.write_str(">")
}

impl fmt::Display for ClassSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_type_parameters(f, &self.type_parameters)?;
        write!(f, "{}", self.superclass)?;
        for interface in &self.interfaces {
            write!(f, "{interface}")?;
        }
        Ok(())
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_type_parameters(f, &self.type_parameters)?;
        f.write_str("(")?;
        for param in &self.parameters {
            write!(f, "{param}")?;
        }
        f.write_str(")")?;
        match &self.result {
            Some(result) => write!(f, "{result}")?,
            None => f.write_str("V")?,
        }
        for thrown in &self.throws {
            write!(f, "^{thrown}")?;
        }
        Ok(())
    }
}
