//! Closed opcode table: mnemonic, operand shape and control flow for every opcode.
//!
//! Opcodes outside `0x00..=0xC9` are not valid in class files and map to `None`.

use crate::disassembler::{
    instruction::{FlowType, OperandType},
    opcodes,
};

/// Mnemonics for opcodes `0x00..=0xC9`, indexed by opcode.
pub const MNEMONICS: [&str; 202] = [
    // 0x00
    "nop", "aconst_null", "iconst_m1", "iconst_0", "iconst_1", "iconst_2", "iconst_3", "iconst_4",
    // 0x08
    "iconst_5", "lconst_0", "lconst_1", "fconst_0", "fconst_1", "fconst_2", "dconst_0", "dconst_1",
    // 0x10
    "bipush", "sipush", "ldc", "ldc_w", "ldc2_w", "iload", "lload", "fload",
    // 0x18
    "dload", "aload", "iload_0", "iload_1", "iload_2", "iload_3", "lload_0", "lload_1",
    // 0x20
    "lload_2", "lload_3", "fload_0", "fload_1", "fload_2", "fload_3", "dload_0", "dload_1",
    // 0x28
    "dload_2", "dload_3", "aload_0", "aload_1", "aload_2", "aload_3", "iaload", "laload",
    // 0x30
    "faload", "daload", "aaload", "baload", "caload", "saload", "istore", "lstore",
    // 0x38
    "fstore", "dstore", "astore", "istore_0", "istore_1", "istore_2", "istore_3", "lstore_0",
    // 0x40
    "lstore_1", "lstore_2", "lstore_3", "fstore_0", "fstore_1", "fstore_2", "fstore_3", "dstore_0",
    // 0x48
    "dstore_1", "dstore_2", "dstore_3", "astore_0", "astore_1", "astore_2", "astore_3", "iastore",
    // 0x50
    "lastore", "fastore", "dastore", "aastore", "bastore", "castore", "sastore", "pop",
    // 0x58
    "pop2", "dup", "dup_x1", "dup_x2", "dup2", "dup2_x1", "dup2_x2", "swap",
    // 0x60
    "iadd", "ladd", "fadd", "dadd", "isub", "lsub", "fsub", "dsub",
    // 0x68
    "imul", "lmul", "fmul", "dmul", "idiv", "ldiv", "fdiv", "ddiv",
    // 0x70
    "irem", "lrem", "frem", "drem", "ineg", "lneg", "fneg", "dneg",
    // 0x78
    "ishl", "lshl", "ishr", "lshr", "iushr", "lushr", "iand", "land",
    // 0x80
    "ior", "lor", "ixor", "lxor", "iinc", "i2l", "i2f", "i2d",
    // 0x88
    "l2i", "l2f", "l2d", "f2i", "f2l", "f2d", "d2i", "d2l",
    // 0x90
    "d2f", "i2b", "i2c", "i2s", "lcmp", "fcmpl", "fcmpg", "dcmpl",
    // 0x98
    "dcmpg", "ifeq", "ifne", "iflt", "ifge", "ifgt", "ifle", "if_icmpeq",
    // 0xA0
    "if_icmpne", "if_icmplt", "if_icmpge", "if_icmpgt", "if_icmple", "if_acmpeq", "if_acmpne", "goto",
    // 0xA8
    "jsr", "ret", "tableswitch", "lookupswitch", "ireturn", "lreturn", "freturn", "dreturn",
    // 0xB0
    "areturn", "return", "getstatic", "putstatic", "getfield", "putfield", "invokevirtual", "invokespecial",
    // 0xB8
    "invokestatic", "invokeinterface", "invokedynamic", "new", "newarray", "anewarray", "arraylength", "athrow",
    // 0xC0
    "checkcast", "instanceof", "monitorenter", "monitorexit", "wide", "multianewarray", "ifnull", "ifnonnull",
    // 0xC8
    "goto_w", "jsr_w",
];

/// Static description of one opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JvmInstruction {
    /// The opcode byte
    pub opcode: u8,
    /// Mnemonic name
    pub mnemonic: &'static str,
    /// Operand bytes following the opcode
    pub op_type: OperandType,
    /// Control flow classification
    pub flow: FlowType,
}

/// Look up an opcode in the table.
///
/// Returns `None` for reserved and undefined opcodes.
#[must_use]
pub fn lookup(opcode: u8) -> Option<JvmInstruction> {
    let mnemonic = *MNEMONICS.get(usize::from(opcode))?;
    let op_type = operand_type(opcode)?;
    Some(JvmInstruction {
        opcode,
        mnemonic,
        op_type,
        flow: flow_type(opcode),
    })
}

/// Operand shape of an opcode.
#[must_use]
pub fn operand_type(opcode: u8) -> Option<OperandType> {
    Some(match opcode {
        opcodes::NOP..=opcodes::DCONST_1 => OperandType::None,
        opcodes::BIPUSH => OperandType::Byte,
        opcodes::SIPUSH => OperandType::Short,
        opcodes::LDC => OperandType::PoolIndex8,
        opcodes::LDC_W | opcodes::LDC2_W => OperandType::PoolIndex16,
        opcodes::ILOAD..=opcodes::ALOAD => OperandType::Local,
        opcodes::ILOAD_0..=opcodes::SALOAD => OperandType::None,
        opcodes::ISTORE..=opcodes::ASTORE => OperandType::Local,
        opcodes::ISTORE_0..=opcodes::LXOR => OperandType::None,
        opcodes::IINC => OperandType::Iinc,
        opcodes::I2L..=opcodes::DCMPG => OperandType::None,
        opcodes::IFEQ..=opcodes::JSR => OperandType::Branch16,
        opcodes::RET => OperandType::Local,
        opcodes::TABLESWITCH => OperandType::TableSwitch,
        opcodes::LOOKUPSWITCH => OperandType::LookupSwitch,
        opcodes::IRETURN..=opcodes::RETURN => OperandType::None,
        opcodes::GETSTATIC..=opcodes::INVOKESTATIC => OperandType::PoolIndex16,
        opcodes::INVOKEINTERFACE => OperandType::InvokeInterface,
        opcodes::INVOKEDYNAMIC => OperandType::InvokeDynamic,
        opcodes::NEW => OperandType::PoolIndex16,
        opcodes::NEWARRAY => OperandType::ArrayType,
        opcodes::ANEWARRAY => OperandType::PoolIndex16,
        opcodes::ARRAYLENGTH | opcodes::ATHROW => OperandType::None,
        opcodes::CHECKCAST | opcodes::INSTANCEOF => OperandType::PoolIndex16,
        opcodes::MONITORENTER | opcodes::MONITOREXIT => OperandType::None,
        opcodes::WIDE => OperandType::Wide,
        opcodes::MULTIANEWARRAY => OperandType::MultiANewArray,
        opcodes::IFNULL | opcodes::IFNONNULL => OperandType::Branch16,
        opcodes::GOTO_W | opcodes::JSR_W => OperandType::Branch32,
        0xCA..=0xFF => return None,
    })
}

/// Control flow classification of an opcode.
#[must_use]
pub fn flow_type(opcode: u8) -> FlowType {
    match opcode {
        opcodes::IFEQ..=opcodes::IF_ACMPNE | opcodes::IFNULL | opcodes::IFNONNULL => {
            FlowType::ConditionalBranch
        }
        opcodes::GOTO | opcodes::GOTO_W => FlowType::UnconditionalBranch,
        opcodes::JSR | opcodes::JSR_W => FlowType::Subroutine,
        opcodes::RET | opcodes::IRETURN..=opcodes::RETURN => FlowType::Return,
        opcodes::TABLESWITCH | opcodes::LOOKUPSWITCH => FlowType::Switch,
        opcodes::INVOKEVIRTUAL..=opcodes::INVOKEDYNAMIC => FlowType::Call,
        opcodes::ATHROW => FlowType::Throw,
        _ => FlowType::Sequential,
    }
}

/// Whether `opcode` may follow a `wide` prefix.
#[must_use]
pub fn is_widenable(opcode: u8) -> bool {
    matches!(
        opcode,
        opcodes::ILOAD..=opcodes::ALOAD
            | opcodes::ISTORE..=opcodes::ASTORE
            | opcodes::RET
            | opcodes::IINC
    )
}
