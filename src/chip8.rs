use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{debug, info, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::constants::{KEY_COUNT, MAX_PROGRAM_SIZE, PROGRAM_START};
use crate::error::{Fault, LoadError};
use crate::instruction::from_op;
use crate::state::{Env, FrameBuffer, Keys, State};

/// What a single call to `Chip8::run_cycle` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cycle {
    /// One instruction ran and the timers ticked
    Executed,
    /// FX0A found no key down; the same instruction runs again next cycle
    AwaitingKey,
    /// The instruction was stepped over without effect
    Faulted(Fault),
}

/// # Chip-8
/// Chip-8 is a virtual machine and corresponding interpreted language.
///
/// Tracks:
///  - current `state`
///  - `keys`, the input latch, with public interfaces for manipulating them
///  - a pending tone event raised by the sound timer
///
/// Supplies interfaces for:
/// - loading roms
/// - pressing and releasing keys
/// - advancing the CPU and its timers one cycle at a time
/// - inspecting its frame buffer for rendering by some display
///
/// Pacing is left to the host. The timers tick once per cycle, so a host
/// wanting the usual 60Hz timers has to call `run_cycle` at 60Hz.
pub struct Chip8 {
    state: State,
    keys: Keys,
    rng: StdRng,
    tone: bool,
}

impl Chip8 {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// A machine whose CXNN results are reproducible
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Chip8 {
            state: State::new(),
            keys: [false; KEY_COUNT],
            rng,
            tone: false,
        }
    }

    /// Returns the machine to its power-on state, discarding any loaded rom
    pub fn reset(&mut self) {
        self.state = State::new();
        self.keys = [false; KEY_COUNT];
        self.tone = false;
    }

    /// Load a rom from a source file
    ///
    /// # Arguments
    /// * `path` a file containing raw big-endian opcodes
    pub fn load_game<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let size = self.load_rom(file)?;
        info!("loaded {} bytes from {}", size, path.display());
        Ok(size)
    }

    /// Load a rom into the program region, returning its size in bytes.
    /// Whatever an earlier rom left in the program region is cleared.
    ///
    /// # Arguments
    /// * `reader` a source that contains a ROM of at most `MAX_PROGRAM_SIZE` bytes
    pub fn load_rom<R: Read>(&mut self, reader: R) -> Result<usize, LoadError> {
        // one byte past the limit is enough to tell an oversized rom apart
        let mut rom = Vec::with_capacity(MAX_PROGRAM_SIZE + 1);
        reader
            .take(MAX_PROGRAM_SIZE as u64 + 1)
            .read_to_end(&mut rom)?;
        if rom.len() > MAX_PROGRAM_SIZE {
            return Err(LoadError::TooLarge {
                max: MAX_PROGRAM_SIZE,
            });
        }
        let program = &mut self.state.memory[PROGRAM_START..];
        program.iter_mut().for_each(|byte| *byte = 0);
        program[..rom.len()].copy_from_slice(&rom);
        Ok(rom.len())
    }

    /// Advances the machine by a single cycle
    /// - gets and executes the opcode at pc
    /// - steps over it if it faulted
    /// - ticks the timers unless awaiting a keypress
    pub fn run_cycle(&mut self) -> Cycle {
        let pc = self.state.pc;
        let op = self.state.fetch();
        trace!(
            "{:04X} v{:02X?} i{:04X} pc{:04X}",
            op,
            self.state.v,
            self.state.i,
            pc
        );

        let env = Env {
            keys: self.keys,
            random: self.rng.gen(),
        };
        let was_waiting = self.state.awaiting_key.is_some();

        let cycle = match from_op(&op)(&op, &self.state, &env) {
            Ok(state) => {
                self.state = state;
                if let Some(register) = self.state.awaiting_key {
                    if !was_waiting {
                        debug!("waiting for a key to store in v{:X}", register);
                    }
                    return Cycle::AwaitingKey;
                }
                Cycle::Executed
            }
            Err(fault) => {
                warn!("{} at pc {:04X}, skipping", fault, pc);
                self.state.pc = pc.wrapping_add(0x2);
                Cycle::Faulted(fault)
            }
        };

        self.advance_timers();
        cycle
    }

    /// Decrements each nonzero timer, raising a tone as the sound timer runs out
    fn advance_timers(&mut self) {
        if self.state.delay_timer > 0 {
            self.state.delay_timer -= 1;
        }

        if self.state.sound_timer > 0 {
            if self.state.sound_timer == 1 {
                debug!("tone");
                self.tone = true;
            }
            self.state.sound_timer -= 1;
        }
    }

    /// Returns the FrameBuffer if the display should be redrawn
    pub fn get_frame(&self) -> Option<FrameBuffer> {
        if self.state.draw_flag {
            Some(self.state.frame_buffer)
        } else {
            None
        }
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.state.frame_buffer
    }

    pub fn draw_flag(&self) -> bool {
        self.state.draw_flag
    }

    /// Marks the current frame as consumed
    pub fn clear_draw_flag(&mut self) {
        self.state.draw_flag = false;
    }

    /// Set the pressed status of key
    ///
    /// # Arguments
    /// * `key` the 8-bit representation of the key that was pressed
    pub fn key_press(&mut self, key: u8) {
        self.set_key(key, true);
    }

    /// Unset the pressed status of key
    ///
    /// # Arguments
    /// * `key` the 8-bit representation of the key that was released
    pub fn key_release(&mut self, key: u8) {
        self.set_key(key, false);
    }

    fn set_key(&mut self, key: u8, pressed: bool) {
        match self.keys.get_mut(key as usize) {
            Some(slot) => *slot = pressed,
            None => warn!("ignoring key {:#04X} outside the keypad", key),
        }
    }

    /// Replace the whole input latch at once
    pub fn set_keys(&mut self, keys: Keys) {
        self.keys = keys;
    }

    pub fn keys(&self) -> &Keys {
        &self.keys
    }

    /// Returns true once per expiry of the sound timer
    pub fn take_tone(&mut self) -> bool {
        std::mem::replace(&mut self.tone, false)
    }

    pub fn sound_active(&self) -> bool {
        self.state.sound_timer > 0
    }

    pub fn state(&self) -> &State {
        &self.state
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}
