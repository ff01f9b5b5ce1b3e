//! Execution engine for CHIP-8 programs.
//!
//! [`Chip8Machine`] loads a ROM and runs it one instruction ([`Chip8Machine::step`])
//! or one 60 Hz tick ([`Chip8Machine::run_tick`]) at a time. Its outputs are a
//! 64x32 [`FrameBuffer`] with a per-tick dirty flag and a "tone active" boolean;
//! its input is a 16-key [`Keypad`]. [`Chip8Interpreter`] wires those to host
//! implementations of [`Chip8Display`], [`Chip8Keyboard`] and [`Chip8Beeper`]
//! and paces the ticks in real time.

mod beeper;
mod config;
mod cpu;
mod display;
mod error;
mod interpreter;
mod keyboard;
mod machine;
mod opcode;
mod scheduler;
mod state;

pub use beeper::Chip8Beeper;
pub use config::{Chip8Config, Quirks, ShiftFlag, DEFAULT_INSTRUCTIONS_PER_SECOND};
pub use cpu::{Chip8Cpu, StepEffect};
pub use display::{Chip8Display, FrameBuffer, DISPLAY_HEIGHT, DISPLAY_WIDTH};
pub use error::{Fault, HostError, LoadError};
pub use interpreter::{Chip8Interpreter, RunState};
pub use keyboard::{Chip8Keyboard, HostCommand, KeyWait, Keypad, KEY_COUNT};
pub use machine::Chip8Machine;
pub use opcode::Opcode;
pub use scheduler::{instructions_per_tick, run_tick, TickReport, TICKS_PER_SECOND};
pub use state::{Chip8State, MAX_ROM_SIZE, PROGRAM_START, RAM_SIZE, STACK_SIZE};
