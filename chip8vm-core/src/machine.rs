use std::{fs, path::Path};

use log::info;

use crate::{
    config::Chip8Config,
    cpu::{Chip8Cpu, StepEffect},
    display::FrameBuffer,
    error::LoadError,
    keyboard::Keypad,
    scheduler::{self, TickReport},
    state::Chip8State,
};

/// One running program: machine state, the executor, and the ROM bytes
/// needed to start it over.
#[derive(Debug, Clone)]
pub struct Chip8Machine {
    state: Chip8State,
    cpu: Chip8Cpu,
    rom: Vec<u8>,
    instructions_per_second: u32,
}

impl Chip8Machine {
    pub fn new(config: &Chip8Config) -> Self {
        Self {
            state: Chip8State::default(),
            cpu: Chip8Cpu::new(config.quirks, config.seed),
            rom: Vec::new(),
            instructions_per_second: config.instructions_per_second,
        }
    }

    pub fn load(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        self.state.load_program(rom)?;
        self.rom = rom.to_vec();
        info!("loaded {} byte ROM", rom.len());
        Ok(())
    }

    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), LoadError> {
        let rom = fs::read(path.as_ref())?;
        info!("reading ROM from {}", path.as_ref().display());
        self.load(&rom)
    }

    /// Starts the current ROM over from a clean machine.
    pub fn reset(&mut self) -> Result<(), LoadError> {
        self.state.load_program(&self.rom)?;
        info!("reset");
        Ok(())
    }

    pub fn step(&mut self, keypad: &Keypad) -> StepEffect {
        self.cpu.step(&mut self.state, keypad)
    }

    pub fn run_tick(&mut self, keypad: &Keypad) -> TickReport {
        scheduler::run_tick(
            &mut self.cpu,
            &mut self.state,
            keypad,
            self.instructions_per_second,
        )
    }

    pub fn state(&self) -> &Chip8State {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut Chip8State {
        &mut self.state
    }

    pub fn display(&self) -> &FrameBuffer {
        &self.state.display
    }

    pub fn sound_active(&self) -> bool {
        self.state.sound_active()
    }

    pub fn instructions_per_second(&self) -> u32 {
        self.instructions_per_second
    }
}
