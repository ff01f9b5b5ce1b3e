use crate::{display::FrameBuffer, error::LoadError, keyboard::KeyWait, opcode::Opcode};

pub const RAM_SIZE: usize = 4096;
pub const PROGRAM_START: u16 = 0x200;
pub const MAX_ROM_SIZE: usize = RAM_SIZE - PROGRAM_START as usize;
pub const STACK_SIZE: usize = 16;
pub const FONT_GLYPH_SIZE: u16 = 5;

const FONT: [u8; 16 * FONT_GLYPH_SIZE as usize] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Everything the program can observe. Only the executor and the loader
/// mutate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chip8State {
    pub data_registers: [u8; 16],
    pub index_register: u16,
    pub program_counter: u16,
    pub stack_pointer: u8,
    pub ram: [u8; RAM_SIZE],
    pub stack: [u16; STACK_SIZE],
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub display: FrameBuffer,
    pub key_wait: KeyWait,
}

/// Power-on state: font in place, no program.
impl Default for Chip8State {
    fn default() -> Self {
        let mut state = Self {
            data_registers: [0; 16],
            index_register: 0,
            program_counter: PROGRAM_START,
            stack_pointer: 0,
            ram: [0; RAM_SIZE],
            stack: [0; STACK_SIZE],
            delay_timer: 0,
            sound_timer: 0,
            display: FrameBuffer::default(),
            key_wait: KeyWait::Idle,
        };
        state.load_font_data(&FONT);
        state
    }
}

impl Chip8State {
    pub fn load_font_data(&mut self, fonts: &[u8]) {
        self.ram[..fonts.len()].copy_from_slice(fonts);
    }

    /// Resets the whole machine and copies `program` to 0x200. An oversized
    /// program is rejected before anything is touched.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), LoadError> {
        if program.len() > MAX_ROM_SIZE {
            return Err(LoadError::RomTooLarge {
                size: program.len(),
                max_size: MAX_ROM_SIZE,
            });
        }
        *self = Self::default();
        let start = PROGRAM_START as usize;
        self.ram[start..start + program.len()].copy_from_slice(program);
        Ok(())
    }

    pub fn register(&self, register_index: u8) -> u8 {
        self.data_registers[register_index as usize & 0xF]
    }

    pub fn set_register(&mut self, register_index: u8, value: u8) {
        self.data_registers[register_index as usize & 0xF] = value;
    }

    pub fn set_flag(&mut self, flag: bool) {
        self.set_register(0xF, flag as u8);
    }

    /// Addresses wrap at the end of memory.
    pub fn read_byte(&self, address: u16) -> u8 {
        self.ram[address as usize % RAM_SIZE]
    }

    pub fn write_byte(&mut self, address: u16, value: u8) {
        self.ram[address as usize % RAM_SIZE] = value;
    }

    /// The instruction word at the program counter.
    pub fn fetch(&self) -> Opcode {
        Opcode::from_bytes(
            self.read_byte(self.program_counter),
            self.read_byte(self.program_counter.wrapping_add(1)),
        )
    }

    pub fn skip_next(&mut self) {
        self.program_counter = self.program_counter.wrapping_add(2);
    }

    /// `None` when every slot is in use; the stack is left as it was.
    pub fn push(&mut self, return_address: u16) -> Option<()> {
        let slot = self.stack.get_mut(self.stack_pointer as usize)?;
        *slot = return_address;
        self.stack_pointer += 1;
        Some(())
    }

    /// `None` on an empty stack.
    pub fn pop(&mut self) -> Option<u16> {
        self.stack_pointer = self.stack_pointer.checked_sub(1)?;
        Some(self.stack[self.stack_pointer as usize])
    }

    pub fn sound_active(&self) -> bool {
        self.sound_timer > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_power_on_state() {
        let state = Chip8State::default();
        assert_eq!(state.program_counter, 0x200);
        assert_eq!(&state.ram[..80], &FONT[..]);
        assert!(state.ram[80..].iter().all(|&byte| byte == 0));
        assert_eq!(state.stack_pointer, 0);
        assert_eq!(state.key_wait, KeyWait::Idle);
    }

    #[test]
    fn test_program_load_ok() -> Result<(), LoadError> {
        let mut state = Chip8State::default();
        state.load_program(&[0x00, 0xE0, 0x12, 0x00])?;
        assert_eq!(&state.ram[0x200..0x204], &[0x00, 0xE0, 0x12, 0x00]);
        assert_eq!(state.fetch(), Opcode(0x00E0));
        Ok(())
    }

    #[test]
    fn test_load_resets_everything() -> Result<(), LoadError> {
        let mut state = Chip8State::default();
        state.load_program(&[0xAA; 16])?;
        state.data_registers[3] = 9;
        state.index_register = 0x345;
        state.program_counter = 0x456;
        state.push(0x202).unwrap();
        state.delay_timer = 7;
        state.sound_timer = 8;
        state.display.draw(0, 0, &[0xFF]);
        state.key_wait = KeyWait::Latched(4);

        state.load_program(&[0x00, 0xE0])?;

        let mut expected = Chip8State::default();
        expected.ram[0x200] = 0x00;
        expected.ram[0x201] = 0xE0;
        assert_eq!(state, expected);
        Ok(())
    }

    #[test]
    fn test_rom_size_limit() {
        let mut state = Chip8State::default();
        assert!(state.load_program(&vec![0x11; MAX_ROM_SIZE]).is_ok());
        assert_eq!(state.ram[RAM_SIZE - 1], 0x11);

        state.data_registers[0] = 42;
        match state.load_program(&vec![0x22; MAX_ROM_SIZE + 1]) {
            Err(LoadError::RomTooLarge { size, max_size }) => {
                assert_eq!(size, 4096 - 0x200 + 1);
                assert_eq!(max_size, 4096 - 0x200);
            }
            other => panic!("expected RomTooLarge, got {other:?}"),
        }
        // a rejected load leaves the previous program running
        assert_eq!(state.data_registers[0], 42);
        assert_eq!(state.ram[0x200], 0x11);
    }

    #[test]
    fn test_stack_bounds() {
        let mut state = Chip8State::default();
        assert_eq!(state.pop(), None);
        assert_eq!(state.stack_pointer, 0);
        for i in 0..STACK_SIZE as u16 {
            assert_eq!(state.push(0x200 + i * 2), Some(()));
        }
        assert_eq!(state.push(0x300), None);
        assert_eq!(state.stack_pointer, 16);
        assert_eq!(state.pop(), Some(0x21E));
        assert_eq!(state.stack_pointer, 15);
    }

    #[test]
    fn test_memory_access_wraps() {
        let mut state = Chip8State::default();
        state.write_byte(0x1000, 0xAB);
        assert_eq!(state.ram[0], 0xAB);
        assert_eq!(state.read_byte(0xFFFF), state.ram[0xFFF]);
        state.program_counter = 0xFFF;
        state.ram[0xFFF] = 0x12;
        assert_eq!(state.fetch(), Opcode(0x12AB));
    }
}
