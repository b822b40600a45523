/// The fixed instruction set of the tape machine.
///
/// Every tape cell holds one byte. Bytes 0-4 are the empty cell and the
/// arithmetic group, 250-255 are the control group. Everything in between is
/// inert filler: it executes as a no-op but still counts as occupied, since
/// only `NOP` (0) marks an empty cell.
pub const NOP: u8 = 0;
pub const ADD: u8 = 1;
pub const SUB: u8 = 2;
pub const MUL: u8 = 3;
pub const DIV: u8 = 4;
pub const MARK_START: u8 = 250;
pub const MARK_END: u8 = 251;
pub const COPY: u8 = 252;
pub const FIND_EMPTY: u8 = 253;
pub const SENSE: u8 = 254;
pub const HARVEST: u8 = 255;

/// Largest opcode a mutation can draw. Random opcodes are uniform over `0..=MAX_OP`.
pub const MAX_OP: u8 = HARVEST;

/// A decoded tape byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Nop,
    Add,
    Sub,
    Mul,
    Div,
    MarkStart,
    MarkEnd,
    Copy,
    FindEmpty,
    Sense,
    Harvest,
    /// Any byte outside the table. Executes as a no-op.
    Inert(u8),
}

impl Op {
    #[inline(always)]
    pub fn decode(byte: u8) -> Op {
        match byte {
            NOP => Op::Nop,
            ADD => Op::Add,
            SUB => Op::Sub,
            MUL => Op::Mul,
            DIV => Op::Div,
            MARK_START => Op::MarkStart,
            MARK_END => Op::MarkEnd,
            COPY => Op::Copy,
            FIND_EMPTY => Op::FindEmpty,
            SENSE => Op::Sense,
            HARVEST => Op::Harvest,
            other => Op::Inert(other),
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Op::Nop => "nop",
            Op::Add => "add",
            Op::Sub => "sub",
            Op::Mul => "mul",
            Op::Div => "div",
            Op::MarkStart => "mark_start",
            Op::MarkEnd => "mark_end",
            Op::Copy => "copy",
            Op::FindEmpty => "find_empty",
            Op::Sense => "sense",
            Op::Harvest => "harvest",
            Op::Inert(_) => "inert",
        }
    }
}

/// Pretty-print a genome, one instruction per line with its offset.
pub fn disassemble(genome: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::new();
    for (offset, &byte) in genome.iter().enumerate() {
        let op = Op::decode(byte);
        let _ = match op {
            Op::Inert(b) => writeln!(out, "{offset:4}: {b:02X}  inert"),
            _ => writeln!(out, "{offset:4}: {byte:02X}  {}", op.mnemonic()),
        };
    }
    out
}
