use crate::constants::{
    ADDRESS_MASK, DISPLAY_HEIGHT, DISPLAY_WIDTH, FONT, FONT_START, KEY_COUNT, MEMORY_SIZE,
    PROGRAM_START, STACK_DEPTH,
};

/// A snapshot of the machine's internal state
///
/// ## CPU
/// Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - the first 15 (V0..VE) are general purpose registers
///     - the 16th (VF) doubles as the carry/borrow/collision flag
/// - (i) a 16-bit address register, of which the low 12 bits address memory
///
/// Counter
/// - (pc) a 16-bit program counter
///
/// Pointer
/// - (sp) the number of occupied stack slots, `0..=16`
///
/// Timers
/// - 2 8-bit timers (delay & sound), decremented once per executed cycle
///
/// ## Memory
/// - 16 slot stack of return addresses
/// - 4096 bytes of addressable memory
///     - 0x050..0x0A0 holds the font
///     - 0x200.. holds the program
/// - 64x32 frame buffer of 0/1 cells
///
/// ## Input
/// - Emulation halts on FX0A until a key is pressed; `awaiting_key` names the
///   register that will receive it
#[derive(Copy, Clone)]
pub struct State {
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    pub sp: u8,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub stack: [u16; STACK_DEPTH],
    pub memory: [u8; MEMORY_SIZE],
    pub frame_buffer: FrameBuffer,
    pub draw_flag: bool,
    pub awaiting_key: Option<u8>,
}

impl State {
    pub fn new() -> Self {
        let mut memory = [0; MEMORY_SIZE];
        memory[FONT_START..FONT_START + FONT.len()].copy_from_slice(&FONT);

        State {
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START as u16,
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            stack: [0; STACK_DEPTH],
            memory,
            frame_buffer: [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            draw_flag: false,
            awaiting_key: None,
        }
    }

    /// Reads the byte at `addr`, wrapping past the end of memory.
    pub fn read(&self, addr: u16) -> u8 {
        self.memory[address(addr)]
    }

    /// Writes the byte at `addr`, wrapping past the end of memory.
    /// Writes landing in the font are dropped; the font never changes after `new`.
    pub fn write(&mut self, addr: u16, value: u8) {
        let addr = address(addr);
        if (FONT_START..FONT_START + FONT.len()).contains(&addr) {
            return;
        }
        self.memory[addr] = value;
    }

    /// The 16-bit word at the program counter.
    pub fn fetch(&self) -> u16 {
        crate::opcode::from_bytes(self.read(self.pc), self.read(self.pc.wrapping_add(1)))
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

/// Index into memory for a 16-bit address
fn address(addr: u16) -> usize {
    (addr & ADDRESS_MASK) as usize
}

/// The FrameBuffer is indexed as [y][x]
pub type FrameBuffer = [[u8; DISPLAY_WIDTH]; DISPLAY_HEIGHT];

/// Pressed status of keys 0..F
pub type Keys = [bool; KEY_COUNT];

/// Everything an operation may observe besides the machine state.
/// Drawing the random byte up front keeps operations pure.
#[derive(Copy, Clone, Debug, Default)]
pub struct Env {
    pub keys: Keys,
    pub random: u8,
}

#[cfg(test)]
mod test_state {
    use super::*;

    #[test]
    fn test_new_state_is_zeroed() {
        let state = State::new();
        assert_eq!(state.pc, 0x200);
        assert_eq!(state.i, 0);
        assert_eq!(state.sp, 0);
        assert_eq!(state.v, [0; 16]);
        assert_eq!(state.stack, [0; STACK_DEPTH]);
        assert_eq!(state.delay_timer, 0);
        assert_eq!(state.sound_timer, 0);
        assert!(state.frame_buffer.iter().all(|row| row.iter().all(|&p| p == 0)));
        assert!(!state.draw_flag);
        assert_eq!(state.awaiting_key, None);
    }

    #[test]
    fn test_new_state_installs_font() {
        let state = State::new();
        assert_eq!(state.memory[0x050..0x0A0], FONT[..]);
        assert!(state.memory[..0x050].iter().all(|&b| b == 0));
        assert!(state.memory[0x0A0..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_memory_access_wraps() {
        let mut state = State::new();
        state.write(0x1000, 0xAB);
        assert_eq!(state.memory[0x000], 0xAB);
        assert_eq!(state.read(0x1000), 0xAB);
    }

    #[test]
    fn test_writes_into_font_are_dropped() {
        let mut state = State::new();
        state.write(0x050, 0xAA);
        state.write(0x09F, 0xAA);
        state.write(0x1050, 0xAA);
        assert_eq!(state.memory[0x050..0x0A0], FONT[..]);
        state.write(0x04F, 0xAA);
        state.write(0x0A0, 0xBB);
        assert_eq!(state.memory[0x04F], 0xAA);
        assert_eq!(state.memory[0x0A0], 0xBB);
    }

    #[test]
    fn test_fetch_wraps_at_end_of_memory() {
        let mut state = State::new();
        state.memory[0xFFF] = 0x12;
        state.memory[0x000] = 0x34;
        state.pc = 0xFFF;
        assert_eq!(state.fetch(), 0x1234);
    }
}
