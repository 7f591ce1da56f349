/// # Opcodes
///
/// Opcodes are 16 bits, fetched big-endian from two consecutive bytes.
/// The first nibble selects one of 16 families; families 0x0, 0x8, 0xE and 0xF
/// further select an operation with their last nibble or last byte.
/// - `(n, _, _, _)` family
/// - `(_, _, _, n)` operation within 0x5, 0x8 and 0x9
/// - `(_, _, n, n)` operation within 0xE and 0xF
/// - `(_, n, n, n)` fixed operations in 0x0 (e.g. 00E0; clear screen)
///
/// Nibbles not used for selection carry operands.
/// - `(_, n, n, n)` NNN, a 12-bit address
/// - `(_, _, n, n)` NN, a byte assigned to and/or compared with Vx
/// - `(_, n, _, _)` X, the register Vx or the range V0..=Vx
/// - `(_, _, n, _)` Y, the register Vy
/// - `(_, _, _, n)` N, the sprite height for DXYN
pub trait Opcode {
    /// The raw 16-bit word.
    fn word(&self) -> u16;

    /// Returns the Opcode's component nibbles.
    fn nibbles(&self) -> (u8, u8, u8, u8) {
        (self.family(), self.x(), self.y(), self.n())
    }

    /// `[f___]`
    fn family(&self) -> u8 {
        ((self.word() & 0xF000) >> 12) as u8
    }

    /// `[_x__]`
    fn x(&self) -> u8 {
        ((self.word() & 0x0F00) >> 8) as u8
    }

    /// `[__y_]`
    fn y(&self) -> u8 {
        ((self.word() & 0x00F0) >> 4) as u8
    }

    /// `[___n]`
    fn n(&self) -> u8 {
        (self.word() & 0x000F) as u8
    }

    /// `[__nn]`
    fn nn(&self) -> u8 {
        (self.word() & 0x00FF) as u8
    }

    /// `[_nnn]`
    fn nnn(&self) -> u16 {
        self.word() & 0x0FFF
    }
}

impl Opcode for u16 {
    fn word(&self) -> u16 {
        *self
    }
}

/// Composes the word stored at `hi`, `lo`.
pub fn from_bytes(hi: u8, lo: u8) -> u16 {
    u16::from_be_bytes([hi, lo])
}

#[cfg(test)]
mod test_opcode {
    use super::*;

    #[test]
    fn test_nibbles() {
        let op: u16 = 0xD123;
        assert_eq!(op.nibbles(), (0xD, 0x1, 0x2, 0x3));
    }

    #[test]
    fn test_x_and_y() {
        let op: u16 = 0x8AB4;
        assert_eq!(op.x(), 0xA);
        assert_eq!(op.y(), 0xB);
    }

    #[test]
    fn test_nn() {
        let op: u16 = 0x6A3C;
        assert_eq!(op.nn(), 0x3C);
    }

    #[test]
    fn test_nnn() {
        let op: u16 = 0xA220;
        assert_eq!(op.nnn(), 0x220);
    }

    #[test]
    fn test_from_bytes_is_big_endian() {
        assert_eq!(from_bytes(0x00, 0xE0), 0x00E0);
        assert_eq!(from_bytes(0xF0, 0x29), 0xF029);
    }
}
