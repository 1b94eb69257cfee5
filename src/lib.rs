// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # jarscope
//!
//! A static scanner for JVM class files. `jarscope` decodes class files without a JVM, walks
//! every method body and reports each place where code refers to a member or type named by a
//! rule catalog. A run over thousands of classes is spread over a worker pool and still yields
//! a byte-for-byte deterministic report.
//!
//! ## Features
//!
//! - **Strict decoding** - Constant pool, fields, methods and known attributes are validated;
//!   malformed input is rejected with the byte offset of the problem
//! - **Descriptor and signature parsing** - Field and method descriptors plus generic
//!   signatures, with explicit recursion limits
//! - **Bytecode disassembly** - Every opcode of the JVM instruction set, including `wide`,
//!   `tableswitch` and `lookupswitch` with their alignment padding
//! - **Reference extraction** - Invokes, field accesses, type uses, method handles and
//!   `invokedynamic` call sites, each at its bytecode offset
//! - **Rule matching** - Exact owners, package prefixes, wildcard members and descriptors, and
//!   reference-kind filters
//! - **Deterministic aggregation** - Findings sorted by location regardless of thread count
//! - **Instrumentation profiling** - Per-method call, branch and client-call statistics for
//!   planning profiler include lists
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jarscope::prelude::*;
//!
//! let catalog = RuleCatalog::new([
//!     SignaturePattern::method("http", "okhttp3/Call", "execute", "()Lokhttp3/Response;"),
//!     SignaturePattern::package("reflection", "java/lang/reflect"),
//! ])?;
//!
//! let inputs = vec![ClassInput::new(
//!     "app.jar!/com/acme/Fetcher.class",
//!     std::fs::read("Fetcher.class")?,
//! )];
//! let report = ScanEngine::new(&catalog).run(&inputs)?;
//!
//! for finding in report.findings.values().flatten() {
//!     println!("{finding}");
//! }
//! for failure in &report.errors {
//!     eprintln!("{failure}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - [`classfile`] - Class-file decoding into a [`classfile::DecodedClass`]
//! - [`descriptor`] - Descriptor and generic signature grammars
//! - [`disassembler`] - JVM instruction decoding
//! - [`scanner`] - Symbolic references used by method bodies
//! - [`rules`] - Rule patterns and the catalog index
//! - [`report`] - Findings, per-file errors and deterministic aggregation
//! - [`profile`] - Method statistics and instrumentation include lists
//! - [`engine`] - Parallel scan runs with cancellation
//! - [`Error`] and [`Result`] - Error handling shared by every module
//!
//! ## Error Handling
//!
//! A malformed class file fails on its own: the engine records it in
//! [`report::ScanReport::errors`] and keeps scanning the rest of the batch.
//!
//! ```rust
//! use jarscope::{classfile::decode_class, Error};
//!
//! match decode_class(&[0xCA, 0xFE, 0xBA, 0xBE]) {
//!     Ok(class) => println!("{}", class.this_class),
//!     Err(Error::MalformedClass { offset, message }) => println!("{offset}: {message}"),
//!     Err(e) => println!("{e}"),
//! }
//! ```
//!
//! ## References
//!
//! - [The Java Virtual Machine Specification, Chapter 4](https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html) - The class file format
//! - [The Java Virtual Machine Specification, Chapter 6](https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-6.html) - The instruction set

#[macro_use]
pub(crate) mod error;
pub(crate) mod file;

/// Shared functionality which is used in unit- and integration-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types.
///
/// # Example
///
/// ```rust
/// use jarscope::prelude::*;
///
/// let catalog = RuleCatalog::new([SignaturePattern::new("reflection", "java/lang/reflect/*")])?;
/// assert_eq!(catalog.len(), 1);
/// # Ok::<(), jarscope::Error>(())
/// ```
pub mod prelude;

/// Class-file decoding.
///
/// # Key Types
///
/// - [`classfile::DecodedClass`] - A validated class with its constant pool and members
/// - [`classfile::ConstantPool`] - Typed, index-checked access to pool entries
/// - [`classfile::DecoderConfig`] - Accepted versions and optional checks
///
/// # Examples
///
/// ```rust,no_run
/// use jarscope::classfile::decode_class;
///
/// let class = decode_class(&std::fs::read("Foo.class")?)?;
/// println!("{} extends {:?}", class.java_name(), class.super_class);
/// for method in &class.methods {
///     println!("  {}{}", method.name, method.descriptor);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub mod classfile;

/// Field and method descriptors and generic signatures.
pub mod descriptor;

/// JVM instruction decoding.
///
/// # Examples
///
/// ```rust
/// use jarscope::disassembler::decode_stream;
///
/// // aload_0, invokevirtual #7, return
/// let code = [0x2A, 0xB6, 0x00, 0x07, 0xB1];
/// let instructions = decode_stream(&code, 0)?;
///
/// assert_eq!(instructions[1].mnemonic, "invokevirtual");
/// assert_eq!(instructions[1].pool_index(), Some(7));
/// assert_eq!(instructions[2].offset, 4);
/// # Ok::<(), jarscope::Error>(())
/// ```
pub mod disassembler;

/// Symbolic references extracted from method bodies.
pub mod scanner;

/// Rule patterns and the catalog that matches references against them.
pub mod rules;

/// Findings and their deterministic aggregation.
pub mod report;

/// Per-method statistics for instrumentation planning.
pub mod profile;

/// Parallel scan runs.
pub mod engine;

/// `jarscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `jarscope` Error type
///
/// The error type of every fallible operation in this crate. Decode errors carry the byte
/// offset they were detected at.
pub use error::Error;

/// Bounds-checked big-endian cursor over a byte slice.
///
/// # Example
///
/// ```rust
/// use jarscope::Parser;
///
/// let mut parser = Parser::new(&[0xCA, 0xFE, 0xBA, 0xBE]);
/// assert_eq!(parser.read_be::<u32>()?, 0xCAFE_BABE);
/// assert!(!parser.has_more_data());
/// # Ok::<(), jarscope::Error>(())
/// ```
pub use file::Parser;
