//! JVM bytecode instruction decoding.
//!
//! This module walks a method's code array opcode by opcode. Every opcode is looked up in a
//! closed table that fixes its mnemonic, operand shape and control-flow class; the decoder
//! then reads the operand with a single exhaustive match over the operand shape. Variable
//! width instructions (`tableswitch`, `lookupswitch` and anything behind a `wide` prefix) are
//! handled there as well.
//!
//! # Key Types
//! - [`Instruction`] - A decoded instruction with offset, size and operand
//! - [`Operand`] - Decoded operand values (locals, immediates, pool indices, branch offsets)
//! - [`FlowType`] - How instructions affect control flow
//!
//! # Main Functions
//! - [`decode_instruction`] - Decode a single instruction
//! - [`decode_stream`] - Decode a whole code array
//! - [`instructions`] - Lazily iterate over a code array
//!
//! # Example
//! ```rust
//! use jarscope::disassembler::instructions;
//!
//! // aload_0 ; invokevirtual #2 ; return
//! let code = [0x2A, 0xB6, 0x00, 0x02, 0xB1];
//! let mnemonics = instructions(&code)
//!     .map(|insn| insn.map(|insn| insn.mnemonic))
//!     .collect::<Result<Vec<_>, _>>()?;
//! assert_eq!(mnemonics, ["aload_0", "invokevirtual", "return"]);
//! # Ok::<(), jarscope::Error>(())
//! ```

mod decoder;
mod instruction;
mod instructions;
pub mod opcodes;

pub use decoder::{decode_instruction, decode_stream, instructions, InstructionIter};
pub use instruction::{FlowType, Instruction, Operand, OperandType};
pub use instructions::{flow_type, is_widenable, lookup, operand_type, JvmInstruction, MNEMONICS};
