use crate::{
    disassembler::{
        instruction::{Instruction, Operand, OperandType},
        instructions::{is_widenable, lookup},
    },
    file::parser::Parser,
    Result,
};

/// Decodes a single JVM instruction at the parser's current position.
///
/// The parser must span exactly one method's code array: offsets, branch origins and the
/// 4-byte alignment of `tableswitch`/`lookupswitch` are all taken relative to its start.
///
/// # Arguments
/// * `parser` - Parser positioned at the opcode; advanced past the whole instruction
///
/// # Errors
/// Returns [`crate::Error::MalformedClass`] for undefined opcodes, an invalid `wide` target
/// or an impossible switch table, and [`crate::Error::OutOfBounds`] if the instruction runs
/// past the end of the code.
///
/// # Examples
///
/// ```rust
/// use jarscope::{disassembler::{decode_instruction, Operand}, Parser};
///
/// // invokevirtual #7
/// let mut parser = Parser::new(&[0xB6, 0x00, 0x07]);
/// let instruction = decode_instruction(&mut parser)?;
/// assert_eq!(instruction.mnemonic, "invokevirtual");
/// assert_eq!(instruction.operand, Operand::Constant(7));
/// assert_eq!(instruction.size, 3);
/// # Ok::<(), jarscope::Error>(())
/// ```
pub fn decode_instruction(parser: &mut Parser) -> Result<Instruction> {
    let start = parser.pos();
    let start_offset = parser.offset();
    let first_byte = parser.read_be::<u8>()?;

    let Some(mut info) = lookup(first_byte) else {
        return Err(malformed_error!(
            start_offset,
            "invalid opcode 0x{:02X}",
            first_byte
        ));
    };

    let mut wide = false;
    if info.op_type == OperandType::Wide {
        let widened = parser.read_be::<u8>()?;
        info = match lookup(widened) {
            Some(target) if is_widenable(widened) => target,
            _ => {
                return Err(malformed_error!(
                    start_offset,
                    "opcode 0x{:02X} cannot follow wide",
                    widened
                ))
            }
        };
        wide = true;
    }

    let operand = match info.op_type {
        OperandType::None => Operand::None,
        OperandType::Local if wide => Operand::Local(parser.read_be::<u16>()?),
        OperandType::Local => Operand::Local(u16::from(parser.read_be::<u8>()?)),
        OperandType::Byte => Operand::Immediate(i32::from(parser.read_be::<i8>()?)),
        OperandType::Short => Operand::Immediate(i32::from(parser.read_be::<i16>()?)),
        OperandType::PoolIndex8 => Operand::Constant(u16::from(parser.read_be::<u8>()?)),
        OperandType::PoolIndex16 => Operand::Constant(parser.read_be::<u16>()?),
        OperandType::Branch16 => Operand::Branch(i32::from(parser.read_be::<i16>()?)),
        OperandType::Branch32 => Operand::Branch(parser.read_be::<i32>()?),
        OperandType::Iinc if wide => Operand::Iinc {
            local: parser.read_be::<u16>()?,
            delta: parser.read_be::<i16>()?,
        },
        OperandType::Iinc => Operand::Iinc {
            local: u16::from(parser.read_be::<u8>()?),
            delta: i16::from(parser.read_be::<i8>()?),
        },
        OperandType::InvokeInterface => {
            let index = parser.read_be::<u16>()?;
            let count = parser.read_be::<u8>()?;
            parser.advance_by(1)?;
            Operand::InvokeInterface { index, count }
        }
        OperandType::InvokeDynamic => {
            let index = parser.read_be::<u16>()?;
            parser.advance_by(2)?;
            Operand::InvokeDynamic(index)
        }
        OperandType::MultiANewArray => Operand::MultiANewArray {
            index: parser.read_be::<u16>()?,
            dimensions: parser.read_be::<u8>()?,
        },
        OperandType::ArrayType => Operand::ArrayType(parser.read_be::<u8>()?),
        OperandType::TableSwitch => {
            parser.align(4)?;
            let default = parser.read_be::<i32>()?;
            let low = parser.read_be::<i32>()?;
            let high = parser.read_be::<i32>()?;
            if low > high {
                return Err(malformed_error!(
                    start_offset,
                    "tableswitch low {} exceeds high {}",
                    low,
                    high
                ));
            }

            let count = (i64::from(high) - i64::from(low) + 1) as usize;
            parser.ensure_remaining(count.saturating_mul(4))?;
            let mut offsets = Vec::with_capacity(count);
            for _ in 0..count {
                offsets.push(parser.read_be::<i32>()?);
            }
            Operand::TableSwitch {
                default,
                low,
                offsets,
            }
        }
        OperandType::LookupSwitch => {
            parser.align(4)?;
            let default = parser.read_be::<i32>()?;
            let npairs = parser.read_be::<i32>()?;
            let Ok(count) = usize::try_from(npairs) else {
                return Err(malformed_error!(
                    start_offset,
                    "lookupswitch with negative pair count {}",
                    npairs
                ));
            };

            parser.ensure_remaining(count.saturating_mul(8))?;
            let mut pairs = Vec::with_capacity(count);
            for _ in 0..count {
                pairs.push((parser.read_be::<i32>()?, parser.read_be::<i32>()?));
            }
            Operand::LookupSwitch { default, pairs }
        }
        // a widened target is never itself `wide`
        OperandType::Wide => {
            return Err(malformed_error!(start_offset, "nested wide prefix"));
        }
    };

    let offset =
        u32::try_from(start).map_err(|_| malformed_error!(start_offset, "code too large"))?;
    let size = u32::try_from(parser.pos() - start)
        .map_err(|_| malformed_error!(start_offset, "instruction too large"))?;

    Ok(Instruction {
        offset,
        size,
        opcode: info.opcode,
        wide,
        mnemonic: info.mnemonic,
        flow_type: info.flow,
        operand,
    })
}

/// Lazily decodes the instructions of one code array.
///
/// Yields `Err` at most once; the iterator is exhausted afterwards.
pub struct InstructionIter<'a> {
    parser: Parser<'a>,
    failed: bool,
}

impl<'a> InstructionIter<'a> {
    /// Iterate over `code`, reporting error offsets relative to `base` in the enclosing file.
    #[must_use]
    pub fn new(code: &'a [u8], base: usize) -> Self {
        InstructionIter {
            parser: Parser::with_base(code, base),
            failed: false,
        }
    }
}

impl Iterator for InstructionIter<'_> {
    type Item = Result<Instruction>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || !self.parser.has_more_data() {
            return None;
        }

        let result = decode_instruction(&mut self.parser);
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

/// Iterate over the instructions of a code array that starts at offset 0.
#[must_use]
pub fn instructions(code: &[u8]) -> InstructionIter<'_> {
    InstructionIter::new(code, 0)
}

/// Decodes a complete code array into a vector of instructions.
///
/// # Errors
/// Returns the first decoding error encountered.
pub fn decode_stream(code: &[u8], base: usize) -> Result<Vec<Instruction>> {
    InstructionIter::new(code, base).collect()
}
