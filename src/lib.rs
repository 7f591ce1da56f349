pub use chip8::{Chip8, Cycle};
pub use error::{Fault, LoadError};
pub use state::{Env, FrameBuffer, Keys, State};

mod chip8;
pub mod constants;
mod error;
mod instruction;
pub mod opcode;
mod operations;
pub mod state;
