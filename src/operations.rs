use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH, FONT_GLYPH_SIZE, FONT_START, STACK_DEPTH};
use crate::error::Fault;
use crate::opcode::Opcode;
use crate::state::{Env, State};

/// A pure transition from one machine state to the next.
pub type Operation = fn(op: &dyn Opcode, state: &State, env: &Env) -> Result<State, Fault>;

/// The address of the following instruction
fn next(state: &State) -> u16 {
    state.pc.wrapping_add(0x2)
}

/// The address of the following instruction, or the one after it if `skip`
fn skip_if(skip: bool, state: &State) -> u16 {
    if skip {
        state.pc.wrapping_add(0x4)
    } else {
        next(state)
    }
}

/// clear
pub fn clr(_op: &dyn Opcode, state: &State, _env: &Env) -> Result<State, Fault> {
    Ok(State {
        pc: next(state),
        frame_buffer: [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
        draw_flag: true,
        ..*state
    })
}

/// PC = STACK.pop()
pub fn rts(_op: &dyn Opcode, state: &State, _env: &Env) -> Result<State, Fault> {
    if state.sp == 0 {
        return Err(Fault::StackUnderflow { pc: state.pc });
    }
    let sp = state.sp - 0x1;
    Ok(State {
        pc: state.stack[sp as usize].wrapping_add(0x2),
        sp,
        ..*state
    })
}

/// PC = addr
pub fn jump(op: &dyn Opcode, state: &State, _env: &Env) -> Result<State, Fault> {
    Ok(State {
        pc: op.nnn(),
        ..*state
    })
}

/// STACK.push(PC); PC = addr
pub fn call(op: &dyn Opcode, state: &State, _env: &Env) -> Result<State, Fault> {
    if state.sp as usize >= STACK_DEPTH {
        return Err(Fault::StackOverflow { pc: state.pc });
    }
    let mut stack = state.stack;
    stack[state.sp as usize] = state.pc;
    Ok(State {
        pc: op.nnn(),
        sp: state.sp + 0x1,
        stack,
        ..*state
    })
}

/// if Vx == nn then pc += 2
pub fn ske(op: &dyn Opcode, state: &State, _env: &Env) -> Result<State, Fault> {
    let pc = skip_if(state.v[op.x() as usize] == op.nn(), state);
    Ok(State { pc, ..*state })
}

/// if Vx != nn then pc += 2
pub fn skne(op: &dyn Opcode, state: &State, _env: &Env) -> Result<State, Fault> {
    let pc = skip_if(state.v[op.x() as usize] != op.nn(), state);
    Ok(State { pc, ..*state })
}

/// if Vx == Vy then pc += 2
pub fn skre(op: &dyn Opcode, state: &State, _env: &Env) -> Result<State, Fault> {
    let pc = skip_if(state.v[op.x() as usize] == state.v[op.y() as usize], state);
    Ok(State { pc, ..*state })
}

/// Vx = nn
pub fn load(op: &dyn Opcode, state: &State, _env: &Env) -> Result<State, Fault> {
    let mut v = state.v;
    v[op.x() as usize] = op.nn();
    Ok(State {
        pc: next(state),
        v,
        ..*state
    })
}

/// Vx += nn
/// Overflow is dropped and VF is left alone
pub fn add(op: &dyn Opcode, state: &State, _env: &Env) -> Result<State, Fault> {
    let mut v = state.v;
    v[op.x() as usize] = state.v[op.x() as usize].wrapping_add(op.nn());
    Ok(State {
        pc: next(state),
        v,
        ..*state
    })
}

/// Vx = Vy
pub fn mv(op: &dyn Opcode, state: &State, _env: &Env) -> Result<State, Fault> {
    let mut v = state.v;
    v[op.x() as usize] = v[op.y() as usize];
    Ok(State {
        pc: next(state),
        v,
        ..*state
    })
}

/// Vx |= Vy
pub fn or(op: &dyn Opcode, state: &State, _env: &Env) -> Result<State, Fault> {
    let mut v = state.v;
    v[op.x() as usize] |= v[op.y() as usize];
    Ok(State {
        pc: next(state),
        v,
        ..*state
    })
}

/// Vx &= Vy
pub fn and(op: &dyn Opcode, state: &State, _env: &Env) -> Result<State, Fault> {
    let mut v = state.v;
    v[op.x() as usize] &= v[op.y() as usize];
    Ok(State {
        pc: next(state),
        v,
        ..*state
    })
}

/// Vx ^= Vy
pub fn xor(op: &dyn Opcode, state: &State, _env: &Env) -> Result<State, Fault> {
    let mut v = state.v;
    v[op.x() as usize] ^= v[op.y() as usize];
    Ok(State {
        pc: next(state),
        v,
        ..*state
    })
}

/// Vx += Vy; VF = carry
pub fn addr(op: &dyn Opcode, state: &State, _env: &Env) -> Result<State, Fault> {
    let (res, over) = state.v[op.x() as usize].overflowing_add(state.v[op.y() as usize]);
    let mut v = state.v;
    v[op.x() as usize] = res;
    v[0xF] = if over { 0x1 } else { 0x0 };
    Ok(State {
        pc: next(state),
        v,
        ..*state
    })
}

/// Vx -= Vy; VF = !borrow
pub fn sub(op: &dyn Opcode, state: &State, _env: &Env) -> Result<State, Fault> {
    let (res, under) = state.v[op.x() as usize].overflowing_sub(state.v[op.y() as usize]);
    let mut v = state.v;
    v[op.x() as usize] = res;
    v[0xF] = if under { 0x0 } else { 0x1 };
    Ok(State {
        pc: next(state),
        v,
        ..*state
    })
}

/// Vx >>= 1; VF = lsb
pub fn shr(op: &dyn Opcode, state: &State, _env: &Env) -> Result<State, Fault> {
    let value = state.v[op.x() as usize];
    let mut v = state.v;
    v[op.x() as usize] = value >> 1;
    v[0xF] = value & 0x1;
    Ok(State {
        pc: next(state),
        v,
        ..*state
    })
}

/// Vx = Vy - Vx; VF = !borrow
pub fn subn(op: &dyn Opcode, state: &State, _env: &Env) -> Result<State, Fault> {
    let (res, under) = state.v[op.y() as usize].overflowing_sub(state.v[op.x() as usize]);
    let mut v = state.v;
    v[op.x() as usize] = res;
    v[0xF] = if under { 0x0 } else { 0x1 };
    Ok(State {
        pc: next(state),
        v,
        ..*state
    })
}

/// Vx <<= 1; VF = msb
pub fn shl(op: &dyn Opcode, state: &State, _env: &Env) -> Result<State, Fault> {
    let value = state.v[op.x() as usize];
    let mut v = state.v;
    v[op.x() as usize] = value << 1;
    v[0xF] = value >> 7;
    Ok(State {
        pc: next(state),
        v,
        ..*state
    })
}

/// if Vx != Vy then pc += 2
pub fn skrne(op: &dyn Opcode, state: &State, _env: &Env) -> Result<State, Fault> {
    let pc = skip_if(state.v[op.x() as usize] != state.v[op.y() as usize], state);
    Ok(State { pc, ..*state })
}

/// I = addr
pub fn loadi(op: &dyn Opcode, state: &State, _env: &Env) -> Result<State, Fault> {
    Ok(State {
        pc: next(state),
        i: op.nnn(),
        ..*state
    })
}

/// PC = V0 + addr
pub fn jumpi(op: &dyn Opcode, state: &State, _env: &Env) -> Result<State, Fault> {
    Ok(State {
        pc: u16::from(state.v[0x0]) + op.nnn(),
        ..*state
    })
}

/// Vx = random & nn
pub fn rand(op: &dyn Opcode, state: &State, env: &Env) -> Result<State, Fault> {
    let mut v = state.v;
    v[op.x() as usize] = env.random & op.nn();
    Ok(State {
        pc: next(state),
        v,
        ..*state
    })
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs a sprite from memory i..i+n at position x, y on the FrameBuffer.
/// Pixels falling off an edge wrap around to the opposite one.
/// Sets VF if any pixels were erased
pub fn draw(op: &dyn Opcode, state: &State, _env: &Env) -> Result<State, Fault> {
    let origin_x = state.v[op.x() as usize] as usize;
    let origin_y = state.v[op.y() as usize] as usize;
    let mut frame_buffer = state.frame_buffer;
    let mut collision = 0x0;

    for row in 0..u16::from(op.n()) {
        let sprite = state.read(state.i.wrapping_add(row));
        let y = (origin_y + row as usize) % DISPLAY_HEIGHT;
        for bit in 0..8 {
            let x = (origin_x + bit) % DISPLAY_WIDTH;
            let pixel = (sprite >> (7 - bit)) & 0x1;
            collision |= pixel & frame_buffer[y][x];
            frame_buffer[y][x] ^= pixel;
        }
    }

    let mut v = state.v;
    v[0xF] = collision;
    Ok(State {
        pc: next(state),
        draw_flag: true,
        v,
        frame_buffer,
        ..*state
    })
}

/// if Vx.pressed then pc += 2
pub fn skpr(op: &dyn Opcode, state: &State, env: &Env) -> Result<State, Fault> {
    let key = state.v[op.x() as usize] & 0xF;
    let pc = skip_if(env.keys[key as usize], state);
    Ok(State { pc, ..*state })
}

/// if !Vx.pressed then pc += 2
pub fn skup(op: &dyn Opcode, state: &State, env: &Env) -> Result<State, Fault> {
    let key = state.v[op.x() as usize] & 0xF;
    let pc = skip_if(!env.keys[key as usize], state);
    Ok(State { pc, ..*state })
}

/// Vx = DT
pub fn moved(op: &dyn Opcode, state: &State, _env: &Env) -> Result<State, Fault> {
    let mut v = state.v;
    v[op.x() as usize] = state.delay_timer;
    Ok(State {
        pc: next(state),
        v,
        ..*state
    })
}

/// await keypress for Vx
/// Leaves pc in place until a key is down, so the next cycle runs this again
pub fn keyd(op: &dyn Opcode, state: &State, env: &Env) -> Result<State, Fault> {
    match env.keys.iter().position(|&pressed| pressed) {
        Some(key) => {
            let mut v = state.v;
            v[op.x() as usize] = key as u8;
            Ok(State {
                pc: next(state),
                v,
                awaiting_key: None,
                ..*state
            })
        }
        None => Ok(State {
            awaiting_key: Some(op.x()),
            ..*state
        }),
    }
}

/// DT = Vx
pub fn loads(op: &dyn Opcode, state: &State, _env: &Env) -> Result<State, Fault> {
    Ok(State {
        pc: next(state),
        delay_timer: state.v[op.x() as usize],
        ..*state
    })
}

/// ST = Vx
pub fn ld(op: &dyn Opcode, state: &State, _env: &Env) -> Result<State, Fault> {
    Ok(State {
        pc: next(state),
        sound_timer: state.v[op.x() as usize],
        ..*state
    })
}

/// I += Vx
pub fn addi(op: &dyn Opcode, state: &State, _env: &Env) -> Result<State, Fault> {
    Ok(State {
        pc: next(state),
        i: state.i.wrapping_add(u16::from(state.v[op.x() as usize])),
        ..*state
    })
}

/// I = FONT_START + Vx * 5
/// Set I to the memory address of the glyph for the hex digit in Vx
pub fn ldspr(op: &dyn Opcode, state: &State, _env: &Env) -> Result<State, Fault> {
    let digit = state.v[op.x() as usize] & 0xF;
    Ok(State {
        pc: next(state),
        i: (FONT_START + digit as usize * FONT_GLYPH_SIZE) as u16,
        ..*state
    })
}

/// mem[I..I+3] = bcd(Vx)
/// Store BCD repr of Vx in memory starting at address i
pub fn bcd(op: &dyn Opcode, state: &State, _env: &Env) -> Result<State, Fault> {
    let value = state.v[op.x() as usize];
    let digits = [value / 100, value / 10 % 10, value % 10];
    let mut next_state = *state;
    for (offset, digit) in digits.iter().enumerate() {
        next_state.write(state.i.wrapping_add(offset as u16), *digit);
    }
    Ok(State {
        pc: next(state),
        ..next_state
    })
}

/// mem[I..=I+x] = V0..=Vx
/// I itself is left unchanged
pub fn stor(op: &dyn Opcode, state: &State, _env: &Env) -> Result<State, Fault> {
    let mut next_state = *state;
    for (offset, value) in state.v[..=op.x() as usize].iter().enumerate() {
        next_state.write(state.i.wrapping_add(offset as u16), *value);
    }
    Ok(State {
        pc: next(state),
        ..next_state
    })
}

/// V0..=Vx = mem[I..=I+x]
/// I itself is left unchanged
pub fn read(op: &dyn Opcode, state: &State, _env: &Env) -> Result<State, Fault> {
    let mut v = state.v;
    for (offset, register) in v[..=op.x() as usize].iter_mut().enumerate() {
        *register = state.read(state.i.wrapping_add(offset as u16));
    }
    Ok(State {
        pc: next(state),
        v,
        ..*state
    })
}

/// anything the decode table doesn't recognise
pub fn unknown(op: &dyn Opcode, _state: &State, _env: &Env) -> Result<State, Fault> {
    Err(Fault::UnknownOpcode(op.word()))
}
