use crate::u4;

/// A decoded CHIP-8 instruction.
///
/// The fields (x, y, n, nn, nnn) are the operands carried in the instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// 00E0 - Clear the display.
    ClearScreen,
    /// 00EE - Return from a subroutine.
    Return,

    /// 1nnn - Jump to nnn.
    Jump { nnn: u16 },
    /// 2nnn - Call subroutine at nnn.
    Call { nnn: u16 },
    /// Bnnn - Jump to nnn + V0.
    JumpOffset { x: u4, nnn: u16 },

    /// 3xnn - Skip next instruction if Vx == nn.
    SkipEqImm { x: u4, nn: u8 },
    /// 4xnn - Skip next instruction if Vx != nn.
    SkipNeImm { x: u4, nn: u8 },
    /// 5xy0 - Skip next instruction if Vx == Vy.
    SkipEqReg { x: u4, y: u4 },
    /// 9xy0 - Skip next instruction if Vx != Vy.
    SkipNeReg { x: u4, y: u4 },

    /// 6xnn - Vx = nn.
    LoadImm { x: u4, nn: u8 },
    /// 7xnn - Vx = Vx + nn, VF untouched.
    AddImm { x: u4, nn: u8 },
    /// 8xyN - Register to register arithmetic and logic.
    Alu { x: u4, y: u4, op: AluOp },
    /// Cxnn - Vx = random byte AND nn.
    Random { x: u4, nn: u8 },

    /// Annn - I = nnn.
    LoadIndex { nnn: u16 },
    /// Fx1E - I = I + Vx.
    AddIndex { x: u4 },
    /// Fx29 - I = address of the font glyph for Vx.
    FontAddr { x: u4 },

    /// Dxyn - Draw an n-row sprite from I at (Vx, Vy).
    Draw { x: u4, y: u4, n: u4 },

    /// Ex9E - Skip next instruction if key Vx is down.
    SkipKeyDown { x: u4 },
    /// ExA1 - Skip next instruction if key Vx is up.
    SkipKeyUp { x: u4 },
    /// Fx0A - Block until a key is down, store it in Vx.
    WaitKey { x: u4 },

    /// Fx07 - Vx = delay timer.
    ReadDelay { x: u4 },
    /// Fx15 - delay timer = Vx.
    SetDelay { x: u4 },
    /// Fx18 - sound timer = Vx.
    SetSound { x: u4 },

    /// Fx33 - Store the decimal digits of Vx at I, I+1, I+2.
    Bcd { x: u4 },
    /// Fx55 - Store V0..=Vx at I.
    StoreRegs { x: u4 },
    /// Fx65 - Load V0..=Vx from I.
    LoadRegs { x: u4 },

    /// Any word that is not one of the above.
    Unknown(u16),
}

/// Operations of the 8xyN family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    /// 8xy0 - Vx = Vy
    Copy,
    /// 8xy1 - Vx = Vx OR Vy
    Or,
    /// 8xy2 - Vx = Vx AND Vy
    And,
    /// 8xy3 - Vx = Vx XOR Vy
    Xor,
    /// 8xy4 - Vx = Vx + Vy, VF = carry
    Add,
    /// 8xy5 - Vx = Vx - Vy, VF = no borrow
    Sub,
    /// 8xy6 - Vx = Vy >> 1, VF = shifted out bit
    ShiftRight,
    /// 8xy7 - Vx = Vy - Vx, VF = no borrow
    SubReverse,
    /// 8xyE - Vx = Vy << 1, VF = shifted out bit
    ShiftLeft,
}

impl Opcode {
    /// Decode a 16-bit instruction word.
    pub fn decode(word: u16) -> Self {
        let nibble = (
            ((word & 0xF000) >> 12) as u8,
            ((word & 0x0F00) >> 8) as u8,
            ((word & 0x00F0) >> 4) as u8,
            (word & 0x000F) as u8,
        );

        let x = u4::new(nibble.1);
        let y = u4::new(nibble.2);
        let n = u4::new(nibble.3);
        let nn = (word & 0x00FF) as u8;
        let nnn = word & 0x0FFF;

        match nibble {
            (0x0, 0x0, 0xE, 0x0) => Opcode::ClearScreen,
            (0x0, 0x0, 0xE, 0xE) => Opcode::Return,
            (0x1, _, _, _) => Opcode::Jump { nnn },
            (0x2, _, _, _) => Opcode::Call { nnn },
            (0x3, _, _, _) => Opcode::SkipEqImm { x, nn },
            (0x4, _, _, _) => Opcode::SkipNeImm { x, nn },
            (0x5, _, _, 0x0) => Opcode::SkipEqReg { x, y },
            (0x6, _, _, _) => Opcode::LoadImm { x, nn },
            (0x7, _, _, _) => Opcode::AddImm { x, nn },
            (0x8, _, _, sub) => match AluOp::from_nibble(sub) {
                Some(op) => Opcode::Alu { x, y, op },
                None => Opcode::Unknown(word),
            },
            (0x9, _, _, 0x0) => Opcode::SkipNeReg { x, y },
            (0xA, _, _, _) => Opcode::LoadIndex { nnn },
            (0xB, _, _, _) => Opcode::JumpOffset { x, nnn },
            (0xC, _, _, _) => Opcode::Random { x, nn },
            (0xD, _, _, _) => Opcode::Draw { x, y, n },
            (0xE, _, 0x9, 0xE) => Opcode::SkipKeyDown { x },
            (0xE, _, 0xA, 0x1) => Opcode::SkipKeyUp { x },
            (0xF, _, 0x0, 0x7) => Opcode::ReadDelay { x },
            (0xF, _, 0x0, 0xA) => Opcode::WaitKey { x },
            (0xF, _, 0x1, 0x5) => Opcode::SetDelay { x },
            (0xF, _, 0x1, 0x8) => Opcode::SetSound { x },
            (0xF, _, 0x1, 0xE) => Opcode::AddIndex { x },
            (0xF, _, 0x2, 0x9) => Opcode::FontAddr { x },
            (0xF, _, 0x3, 0x3) => Opcode::Bcd { x },
            (0xF, _, 0x5, 0x5) => Opcode::StoreRegs { x },
            (0xF, _, 0x6, 0x5) => Opcode::LoadRegs { x },

            _ => Opcode::Unknown(word),
        }
    }
}

impl AluOp {
    fn from_nibble(n: u8) -> Option<Self> {
        Some(match n {
            0x0 => AluOp::Copy,
            0x1 => AluOp::Or,
            0x2 => AluOp::And,
            0x3 => AluOp::Xor,
            0x4 => AluOp::Add,
            0x5 => AluOp::Sub,
            0x6 => AluOp::ShiftRight,
            0x7 => AluOp::SubReverse,
            0xE => AluOp::ShiftLeft,
            _ => return None,
        })
    }
}
