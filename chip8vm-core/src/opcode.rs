use std::fmt;

/// A 16-bit instruction word, fetched big-endian from memory.
///
/// Field naming follows the usual CHIP-8 convention:
/// `NNN` is the low 12 bits, `NN` the low byte, `N` the low nibble,
/// `X` bits 8-11 and `Y` bits 4-7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Opcode(pub u16);

impl Opcode {
    pub fn from_bytes(high: u8, low: u8) -> Self {
        Self(u16::from_be_bytes([high, low]))
    }

    /// The four nibbles, most significant first.
    pub fn nibbles(self) -> [u8; 4] {
        [
            (self.0 >> 12) as u8 & 0xF,
            (self.0 >> 8) as u8 & 0xF,
            (self.0 >> 4) as u8 & 0xF,
            self.0 as u8 & 0xF,
        ]
    }

    /// `NNN`
    pub fn address(self) -> u16 {
        self.0 & 0x0FFF
    }

    /// `NN`
    pub fn immediate(self) -> u8 {
        (self.0 & 0x00FF) as u8
    }

    pub fn x(self) -> u8 {
        self.nibbles()[1]
    }

    pub fn y(self) -> u8 {
        self.nibbles()[2]
    }

    pub fn n(self) -> u8 {
        self.nibbles()[3]
    }
}

impl fmt::UpperHex for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.0, f)
    }
}

/// Disassembles into the conventional mnemonics. Words that are not
/// instructions are shown as data (`DW`).
impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nnn = self.address();
        let nn = self.immediate();
        match self.nibbles() {
            [0x0, 0x0, 0xE, 0x0] => write!(f, "CLS"),
            [0x0, 0x0, 0xE, 0xE] => write!(f, "RET"),
            [0x1, _, _, _] => write!(f, "JP 0x{nnn:03X}"),
            [0x2, _, _, _] => write!(f, "CALL 0x{nnn:03X}"),
            [0x3, x, _, _] => write!(f, "SE V{x:X}, 0x{nn:02X}"),
            [0x4, x, _, _] => write!(f, "SNE V{x:X}, 0x{nn:02X}"),
            [0x5, x, y, 0x0] => write!(f, "SE V{x:X}, V{y:X}"),
            [0x6, x, _, _] => write!(f, "LD V{x:X}, 0x{nn:02X}"),
            [0x7, x, _, _] => write!(f, "ADD V{x:X}, 0x{nn:02X}"),
            [0x8, x, y, 0x0] => write!(f, "LD V{x:X}, V{y:X}"),
            [0x8, x, y, 0x1] => write!(f, "OR V{x:X}, V{y:X}"),
            [0x8, x, y, 0x2] => write!(f, "AND V{x:X}, V{y:X}"),
            [0x8, x, y, 0x3] => write!(f, "XOR V{x:X}, V{y:X}"),
            [0x8, x, y, 0x4] => write!(f, "ADD V{x:X}, V{y:X}"),
            [0x8, x, y, 0x5] => write!(f, "SUB V{x:X}, V{y:X}"),
            [0x8, x, _, 0x6] => write!(f, "SHR V{x:X}"),
            [0x8, x, y, 0x7] => write!(f, "SUBN V{x:X}, V{y:X}"),
            [0x8, x, _, 0xE] => write!(f, "SHL V{x:X}"),
            [0x9, x, y, 0x0] => write!(f, "SNE V{x:X}, V{y:X}"),
            [0xA, _, _, _] => write!(f, "LD I, 0x{nnn:03X}"),
            [0xB, _, _, _] => write!(f, "JP V0, 0x{nnn:03X}"),
            [0xC, x, _, _] => write!(f, "RND V{x:X}, 0x{nn:02X}"),
            [0xD, x, y, n] => write!(f, "DRW V{x:X}, V{y:X}, {n}"),
            [0xE, x, 0x9, 0xE] => write!(f, "SKP V{x:X}"),
            [0xE, x, 0xA, 0x1] => write!(f, "SKNP V{x:X}"),
            [0xF, x, 0x0, 0x7] => write!(f, "LD V{x:X}, DT"),
            [0xF, x, 0x0, 0xA] => write!(f, "LD V{x:X}, K"),
            [0xF, x, 0x1, 0x5] => write!(f, "LD DT, V{x:X}"),
            [0xF, x, 0x1, 0x8] => write!(f, "LD ST, V{x:X}"),
            [0xF, x, 0x1, 0xE] => write!(f, "ADD I, V{x:X}"),
            [0xF, x, 0x2, 0x9] => write!(f, "LD F, V{x:X}"),
            [0xF, x, 0x3, 0x3] => write!(f, "LD B, V{x:X}"),
            [0xF, x, 0x5, 0x5] => write!(f, "LD [I], V{x:X}"),
            [0xF, x, 0x6, 0x5] => write!(f, "LD V{x:X}, [I]"),
            _ => write!(f, "DW 0x{:04X}", self.0),
        }
    }
}
