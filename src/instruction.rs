use std::fmt;

/// A decoded opcode.
///
/// `x` and `y` name registers (`0x0..=0xF`), `nn` is an immediate byte, `n` the
/// height of a sprite and the `u16` payloads are 12-bit addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Clear,
    Return,
    Jump(u16),
    Call(u16),
    SkipEq { x: u8, nn: u8 },
    SkipNe { x: u8, nn: u8 },
    SkipRegEq { x: u8, y: u8 },
    Load { x: u8, nn: u8 },
    Add { x: u8, nn: u8 },
    Move { x: u8, y: u8 },
    Or { x: u8, y: u8 },
    And { x: u8, y: u8 },
    Xor { x: u8, y: u8 },
    AddReg { x: u8, y: u8 },
    Sub { x: u8, y: u8 },
    ShiftRight { x: u8 },
    SubN { x: u8, y: u8 },
    ShiftLeft { x: u8 },
    SkipRegNe { x: u8, y: u8 },
    SetIndex(u16),
    JumpOffset(u16),
    Random { x: u8, nn: u8 },
    Draw { x: u8, y: u8, n: u8 },
    SkipKey { x: u8 },
    SkipNotKey { x: u8 },
    GetDelay { x: u8 },
    WaitKey { x: u8 },
    SetDelay { x: u8 },
    SetSound { x: u8 },
    AddIndex { x: u8 },
    Glyph { x: u8 },
    Bcd { x: u8 },
    Store { x: u8 },
    Restore { x: u8 },
}

impl Instruction {
    /// Decodes an opcode, or `None` if it is not part of the instruction set.
    ///
    /// A family whose trailing nibbles match no known suffix is rejected as a
    /// whole; it never falls through into another family.
    pub fn decode(opcode: u16) -> Option<Self> {
        use Instruction::*;

        let [hi, lo] = opcode.to_be_bytes();
        let nibbles = [hi >> 4, hi & 0xF, lo >> 4, lo & 0xF];
        let addr = opcode & 0x0FFF;
        let (x, y, nn) = (nibbles[1], nibbles[2], lo);

        let inst = match nibbles {
            [0x0, 0x0, 0xE, 0x0] => Clear,
            [0x0, 0x0, 0xE, 0xE] => Return,
            [0x1, ..] => Jump(addr),
            [0x2, ..] => Call(addr),
            [0x3, ..] => SkipEq { x, nn },
            [0x4, ..] => SkipNe { x, nn },
            [0x5, .., 0x0] => SkipRegEq { x, y },
            [0x6, ..] => Load { x, nn },
            [0x7, ..] => Add { x, nn },
            [0x8, .., 0x0] => Move { x, y },
            [0x8, .., 0x1] => Or { x, y },
            [0x8, .., 0x2] => And { x, y },
            [0x8, .., 0x3] => Xor { x, y },
            [0x8, .., 0x4] => AddReg { x, y },
            [0x8, .., 0x5] => Sub { x, y },
            [0x8, .., 0x6] => ShiftRight { x },
            [0x8, .., 0x7] => SubN { x, y },
            [0x8, .., 0xE] => ShiftLeft { x },
            [0x9, .., 0x0] => SkipRegNe { x, y },
            [0xA, ..] => SetIndex(addr),
            [0xB, ..] => JumpOffset(addr),
            [0xC, ..] => Random { x, nn },
            [0xD, _, _, n] => Draw { x, y, n },
            [0xE, _, 0x9, 0xE] => SkipKey { x },
            [0xE, _, 0xA, 0x1] => SkipNotKey { x },
            [0xF, _, 0x0, 0x7] => GetDelay { x },
            [0xF, _, 0x0, 0xA] => WaitKey { x },
            [0xF, _, 0x1, 0x5] => SetDelay { x },
            [0xF, _, 0x1, 0x8] => SetSound { x },
            [0xF, _, 0x1, 0xE] => AddIndex { x },
            [0xF, _, 0x2, 0x9] => Glyph { x },
            [0xF, _, 0x3, 0x3] => Bcd { x },
            [0xF, _, 0x5, 0x5] => Store { x },
            [0xF, _, 0x6, 0x5] => Restore { x },
            _ => return None,
        };
        Some(inst)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        match *self {
            Clear => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump(addr) => write!(f, "JP {addr:#05X}"),
            Call(addr) => write!(f, "CALL {addr:#05X}"),
            SkipEq { x, nn } => write!(f, "SE V{x:X}, {nn:#04X}"),
            SkipNe { x, nn } => write!(f, "SNE V{x:X}, {nn:#04X}"),
            SkipRegEq { x, y } => write!(f, "SE V{x:X}, V{y:X}"),
            Load { x, nn } => write!(f, "LD V{x:X}, {nn:#04X}"),
            Add { x, nn } => write!(f, "ADD V{x:X}, {nn:#04X}"),
            Move { x, y } => write!(f, "LD V{x:X}, V{y:X}"),
            Or { x, y } => write!(f, "OR V{x:X}, V{y:X}"),
            And { x, y } => write!(f, "AND V{x:X}, V{y:X}"),
            Xor { x, y } => write!(f, "XOR V{x:X}, V{y:X}"),
            AddReg { x, y } => write!(f, "ADD V{x:X}, V{y:X}"),
            Sub { x, y } => write!(f, "SUB V{x:X}, V{y:X}"),
            ShiftRight { x } => write!(f, "SHR V{x:X}"),
            SubN { x, y } => write!(f, "SUBN V{x:X}, V{y:X}"),
            ShiftLeft { x } => write!(f, "SHL V{x:X}"),
            SkipRegNe { x, y } => write!(f, "SNE V{x:X}, V{y:X}"),
            SetIndex(addr) => write!(f, "LD I, {addr:#05X}"),
            JumpOffset(addr) => write!(f, "JP V0, {addr:#05X}"),
            Random { x, nn } => write!(f, "RND V{x:X}, {nn:#04X}"),
            Draw { x, y, n } => write!(f, "DRW V{x:X}, V{y:X}, {n}"),
            SkipKey { x } => write!(f, "SKP V{x:X}"),
            SkipNotKey { x } => write!(f, "SKNP V{x:X}"),
            GetDelay { x } => write!(f, "LD V{x:X}, DT"),
            WaitKey { x } => write!(f, "LD V{x:X}, K"),
            SetDelay { x } => write!(f, "LD DT, V{x:X}"),
            SetSound { x } => write!(f, "LD ST, V{x:X}"),
            AddIndex { x } => write!(f, "ADD I, V{x:X}"),
            Glyph { x } => write!(f, "LD F, V{x:X}"),
            Bcd { x } => write!(f, "LD B, V{x:X}"),
            Store { x } => write!(f, "LD [I], V{x:X}"),
            Restore { x } => write!(f, "LD V{x:X}, [I]"),
        }
    }
}
