//! Decoded instruction representation.

use std::fmt;

use strum::Display;

/// Shape of the operand bytes that follow an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum OperandType {
    /// No operand bytes
    None,
    /// Unsigned 8-bit local variable index, 16-bit after `wide`
    Local,
    /// Signed 8-bit immediate (`bipush`)
    Byte,
    /// Signed 16-bit immediate (`sipush`)
    Short,
    /// Unsigned 8-bit constant pool index (`ldc`)
    PoolIndex8,
    /// Unsigned 16-bit constant pool index
    PoolIndex16,
    /// Signed 16-bit branch offset
    Branch16,
    /// Signed 32-bit branch offset
    Branch32,
    /// Local index and signed increment (`iinc`)
    Iinc,
    /// Pool index, argument count and a zero byte
    InvokeInterface,
    /// Pool index and two zero bytes
    InvokeDynamic,
    /// Pool index and dimension count
    MultiANewArray,
    /// Primitive array type code (`newarray`)
    ArrayType,
    /// Alignment padding, default, low, high and jump table
    TableSwitch,
    /// Alignment padding, default, pair count and match/offset pairs
    LookupSwitch,
    /// Prefix widening the next instruction's local index
    Wide,
}

/// How an instruction affects control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum FlowType {
    /// Normal execution continues to next instruction
    Sequential,
    /// Conditional branch to another location
    ConditionalBranch,
    /// Always branches to another location (unconditional jump)
    UnconditionalBranch,
    /// Jump to a local subroutine (`jsr`, `jsr_w`)
    Subroutine,
    /// Call to another method
    Call,
    /// Returns from current method or subroutine
    Return,
    /// Multi-way branch (switch statement)
    Switch,
    /// Exception throwing
    Throw,
}

/// Decoded operand of an instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// No operand
    None,
    /// Local variable slot
    Local(u16),
    /// Immediate integer pushed by `bipush`/`sipush`
    Immediate(i32),
    /// Constant pool index
    Constant(u16),
    /// Branch offset relative to the instruction's own offset
    Branch(i32),
    /// `iinc` operands
    Iinc {
        /// Local variable slot
        local: u16,
        /// Signed increment
        delta: i16,
    },
    /// `invokeinterface` operands
    InvokeInterface {
        /// InterfaceMethodref pool index
        index: u16,
        /// Argument slot count
        count: u8,
    },
    /// `invokedynamic` pool index
    InvokeDynamic(u16),
    /// `multianewarray` operands
    MultiANewArray {
        /// Class pool index
        index: u16,
        /// Number of dimensions to create
        dimensions: u8,
    },
    /// `newarray` primitive type code
    ArrayType(u8),
    /// `tableswitch` jump table
    TableSwitch {
        /// Default branch offset
        default: i32,
        /// Key of the first jump table entry
        low: i32,
        /// Branch offsets for keys `low..=high`
        offsets: Vec<i32>,
    },
    /// `lookupswitch` match table
    LookupSwitch {
        /// Default branch offset
        default: i32,
        /// `(match, offset)` pairs
        pairs: Vec<(i32, i32)>,
    },
}

/// A single decoded JVM instruction.
///
/// `offset` is relative to the start of the method's code array, which is also the origin
/// for branch offsets and switch padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Offset of the opcode byte (the `wide` prefix, if any) within the code array
    pub offset: u32,
    /// Total encoded size in bytes, including any `wide` prefix and padding
    pub size: u32,
    /// The opcode; for widened instructions this is the opcode after the prefix
    pub opcode: u8,
    /// Whether the instruction was prefixed by `wide`
    pub wide: bool,
    /// Mnemonic name of the opcode
    pub mnemonic: &'static str,
    /// Control flow classification
    pub flow_type: FlowType,
    /// The decoded operand
    pub operand: Operand,
}

impl Instruction {
    /// Offset of the next instruction.
    #[must_use]
    pub fn next_offset(&self) -> u32 {
        self.offset + self.size
    }

    /// Constant pool index referenced by the operand, if any.
    #[must_use]
    pub fn pool_index(&self) -> Option<u16> {
        match self.operand {
            Operand::Constant(index)
            | Operand::InvokeInterface { index, .. }
            | Operand::InvokeDynamic(index)
            | Operand::MultiANewArray { index, .. } => Some(index),
            _ => None,
        }
    }

    /// Absolute code offsets this instruction may branch to.
    ///
    /// Targets are not validated against the code length; a target before the start of the
    /// code array shows up as a negative value.
    #[must_use]
    pub fn branch_targets(&self) -> Vec<i64> {
        let base = i64::from(self.offset);
        match &self.operand {
            Operand::Branch(rel) => vec![base + i64::from(*rel)],
            Operand::TableSwitch {
                default, offsets, ..
            } => std::iter::once(default)
                .chain(offsets.iter())
                .map(|rel| base + i64::from(*rel))
                .collect(),
            Operand::LookupSwitch { default, pairs } => std::iter::once(*default)
                .chain(pairs.iter().map(|(_, rel)| *rel))
                .map(|rel| base + i64::from(rel))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Returns `true` for jumps and switches.
    #[must_use]
    pub fn is_branch(&self) -> bool {
        matches!(
            self.flow_type,
            FlowType::ConditionalBranch
                | FlowType::UnconditionalBranch
                | FlowType::Subroutine
                | FlowType::Switch
        )
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>5}: ", self.offset)?;
        if self.wide {
            f.write_str("wide ")?;
        }
        f.write_str(self.mnemonic)?;
        match &self.operand {
            Operand::None => Ok(()),
            Operand::Local(index) => write!(f, " {index}"),
            Operand::Immediate(value) => write!(f, " {value}"),
            Operand::Constant(index) | Operand::InvokeDynamic(index) => write!(f, " #{index}"),
            Operand::Branch(rel) => write!(f, " {}", i64::from(self.offset) + i64::from(*rel)),
            Operand::Iinc { local, delta } => write!(f, " {local}, {delta}"),
            Operand::InvokeInterface { index, count } => write!(f, " #{index}, {count}"),
            Operand::MultiANewArray { index, dimensions } => write!(f, " #{index}, {dimensions}"),
            Operand::ArrayType(code) => write!(f, " {code}"),
            Operand::TableSwitch { low, offsets, .. } => {
                write!(f, " {low}..{}", i64::from(*low) + offsets.len() as i64 - 1)
            }
            Operand::LookupSwitch { pairs, .. } => write!(f, " {} pairs", pairs.len()),
        }
    }
}
