use log::{debug, trace, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    config::{Quirks, ShiftFlag},
    error::Fault,
    keyboard::Keypad,
    opcode::Opcode,
    state::{Chip8State, FONT_GLYPH_SIZE},
};

/// What a single instruction did besides updating registers and memory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepEffect {
    /// The display bitmap was written.
    pub dirty: bool,
    pub fault: Option<Fault>,
}

/// Fetches, decodes and executes one instruction at a time. Owns the random
/// source for `CXNN` and the interpreter quirks; all machine state lives in
/// [`Chip8State`].
#[derive(Debug, Clone)]
pub struct Chip8Cpu {
    rng: StdRng,
    quirks: Quirks,
}

impl Chip8Cpu {
    pub fn new(quirks: Quirks, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng, quirks }
    }

    pub fn quirks(&self) -> Quirks {
        self.quirks
    }

    /// Executes the instruction at the program counter. Timers are left
    /// alone; they tick at frame granularity.
    pub fn step(&mut self, state: &mut Chip8State, keypad: &Keypad) -> StepEffect {
        let pc = state.program_counter;
        let opcode = state.fetch();
        state.program_counter = pc.wrapping_add(2);
        trace!("{pc:#05x}: {opcode:04X}  {opcode}");

        match self.execute(state, keypad, pc, opcode) {
            Ok(dirty) => StepEffect { dirty, fault: None },
            Err(fault) => {
                match fault {
                    Fault::UnimplementedOpcode { .. } => debug!("{fault}"),
                    _ => warn!("{fault}"),
                }
                StepEffect {
                    dirty: false,
                    fault: Some(fault),
                }
            }
        }
    }

    /// `pc` is the address the opcode was fetched from; the program counter
    /// already points past it. Returns whether the display was written.
    fn execute(
        &mut self,
        state: &mut Chip8State,
        keypad: &Keypad,
        pc: u16,
        opcode: Opcode,
    ) -> Result<bool, Fault> {
        let address = opcode.address();
        let immediate_value = opcode.immediate();
        let mut dirty = false;

        match opcode.nibbles() {
            //clear display
            [0x0, 0x0, 0xE, 0x0] => {
                state.display.clear();
                dirty = true;
            }
            //return
            [0x0, 0x0, 0xE, 0xE] => {
                state.program_counter = state.pop().ok_or(Fault::StackUnderflow { pc })?;
            }
            //jump to address
            [0x1, _, _, _] => state.program_counter = address,
            //call subroutine
            [0x2, _, _, _] => {
                state
                    .push(state.program_counter)
                    .ok_or(Fault::StackOverflow { pc })?;
                state.program_counter = address;
            }
            //skip if Vx == NN
            [0x3, vx, _, _] => {
                if state.register(vx) == immediate_value {
                    state.skip_next();
                }
            }
            //skip if Vx != NN
            [0x4, vx, _, _] => {
                if state.register(vx) != immediate_value {
                    state.skip_next();
                }
            }
            //skip if Vx == Vy
            [0x5, vx, vy, 0x0] => {
                if state.register(vx) == state.register(vy) {
                    state.skip_next();
                }
            }
            //Vx = value
            [0x6, vx, _, _] => state.set_register(vx, immediate_value),
            //Vx += value, VF untouched
            [0x7, vx, _, _] => {
                state.set_register(vx, state.register(vx).wrapping_add(immediate_value))
            }
            //Vx = Vy
            [0x8, vx, vy, 0x0] => state.set_register(vx, state.register(vy)),
            //Vx |= Vy
            [0x8, vx, vy, 0x1] => state.set_register(vx, state.register(vx) | state.register(vy)),
            //Vx &= Vy
            [0x8, vx, vy, 0x2] => state.set_register(vx, state.register(vx) & state.register(vy)),
            //Vx ^= Vy
            [0x8, vx, vy, 0x3] => state.set_register(vx, state.register(vx) ^ state.register(vy)),
            // The arithmetic forms below write VF first and Vx second, so
            // with X = F the result wins over the flag.
            //Vx += Vy
            [0x8, vx, vy, 0x4] => {
                let (result, carry) = state.register(vx).overflowing_add(state.register(vy));
                state.set_flag(carry);
                state.set_register(vx, result);
            }
            //Vx -= Vy
            [0x8, vx, vy, 0x5] => {
                let (a, b) = (state.register(vx), state.register(vy));
                state.set_flag(a > b);
                state.set_register(vx, a.wrapping_sub(b));
            }
            //Vx >>= 1
            [0x8, vx, _, 0x6] => {
                let value = state.register(vx);
                let flag = match self.quirks.shift_flag {
                    ShiftFlag::LeastSignificantBit => value & 0x1,
                    ShiftFlag::LowNibble => value & 0xF,
                };
                state.set_register(0xF, flag);
                state.set_register(vx, value >> 1);
            }
            //Vx = Vy - Vx
            [0x8, vx, vy, 0x7] => {
                let (a, b) = (state.register(vx), state.register(vy));
                state.set_flag(b > a);
                state.set_register(vx, b.wrapping_sub(a));
            }
            //Vx <<= 1
            [0x8, vx, _, 0xE] => {
                let value = state.register(vx);
                state.set_register(0xF, value >> 7);
                state.set_register(vx, value << 1);
            }
            // Skip if Vx != Vy
            [0x9, vx, vy, 0x0] => {
                if state.register(vx) != state.register(vy) {
                    state.skip_next();
                }
            }
            //I = address
            [0xA, _, _, _] => state.index_register = address,
            // Jump to NNN + v0
            [0xB, _, _, _] => {
                state.program_counter = address.wrapping_add(state.register(0x0) as u16)
            }
            // Vx = rand() & NN
            [0xC, vx, _, _] => state.set_register(vx, immediate_value & self.rng.gen::<u8>()),
            //Display sprite
            [0xD, vx, vy, rows] => {
                let x = state.register(vx);
                let y = state.register(vy);
                let mut sprite = [0u8; 15];
                for (i, byte) in sprite.iter_mut().enumerate().take(rows as usize) {
                    *byte = state.read_byte(state.index_register.wrapping_add(i as u16));
                }

                let collision = state.display.draw(x, y, &sprite[..rows as usize]);
                state.set_flag(collision);
                dirty = true;
            }
            // skip if key()
            [0xE, vx, 0x9, 0xE] => {
                if keypad.is_key_down(state.register(vx)) {
                    state.skip_next();
                }
            }
            // skip if !key()
            [0xE, vx, 0xA, 0x1] => {
                if !keypad.is_key_down(state.register(vx)) {
                    state.skip_next();
                }
            }
            // Vx = delay timer
            [0xF, vx, 0x0, 0x7] => state.set_register(vx, state.delay_timer),
            // Vx = get_key(), re-executed until a key goes down and up again
            [0xF, vx, 0x0, 0xA] => match state.key_wait.poll(keypad) {
                Some(key) => state.set_register(vx, key),
                None => state.program_counter = pc,
            },
            // Set delay timer to vx
            [0xF, vx, 0x1, 0x5] => state.delay_timer = state.register(vx),
            // Set sound timer to vx
            [0xF, vx, 0x1, 0x8] => state.sound_timer = state.register(vx),
            // I += Vx, VF untouched
            [0xF, vx, 0x1, 0xE] => {
                state.index_register = state
                    .index_register
                    .wrapping_add(state.register(vx) as u16);
            }
            // I = Vx'th character index
            [0xF, vx, 0x2, 0x9] => {
                state.index_register = state.register(vx) as u16 * FONT_GLYPH_SIZE;
            }
            // Convert and store Vx to decimal
            [0xF, vx, 0x3, 0x3] => {
                let value = state.register(vx);
                let i = state.index_register;
                state.write_byte(i, value / 100);
                state.write_byte(i.wrapping_add(1), value / 10 % 10);
                state.write_byte(i.wrapping_add(2), value % 10);
            }
            // Store everything up until Vx
            [0xF, vx, 0x5, 0x5] => {
                for i in 0..=vx {
                    let value = state.register(i);
                    state.write_byte(state.index_register.wrapping_add(i as u16), value);
                }
            }
            // Load everything up until Vx
            [0xF, vx, 0x6, 0x5] => {
                for i in 0..=vx {
                    let value = state.read_byte(state.index_register.wrapping_add(i as u16));
                    state.set_register(i, value);
                }
            }
            _ => return Err(Fault::UnimplementedOpcode { pc, opcode }),
        }

        Ok(dirty)
    }
}
