use std::path::PathBuf;

use chip8vm_core::{Chip8Config, Quirks, ShiftFlag, DEFAULT_INSTRUCTIONS_PER_SECOND};
use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "chip8vm",
    about = "Run a CHIP-8 ROM in the terminal",
    long_about = "Runs a CHIP-8 ROM in the terminal.\n\
                  Keys 1234/qwer/asdf/zxcv map to the hex keypad. Space pauses, \
                  Backspace resets, Esc quits.\n\
                  Logs go to stderr (set RUST_LOG); redirect them, e.g. 2>chip8vm.log.",
    version
)]
pub struct Cli {
    /// ROM file to execute
    pub rom: PathBuf,

    /// Instructions executed per second, run in batches at 60 Hz
    #[arg(short = 'i', long = "ips", default_value_t = DEFAULT_INSTRUCTIONS_PER_SECOND)]
    pub instructions_per_second: u32,

    /// Seed for the random number instruction
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Where the shift-right instruction takes VF from
    #[arg(long, value_enum, default_value_t = ShiftQuirk::Lsb)]
    pub shift_quirk: ShiftQuirk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShiftQuirk {
    /// Least significant bit (historical behaviour)
    Lsb,
    /// Whole low nibble
    LowNibble,
}

impl Cli {
    pub fn config(&self) -> Chip8Config {
        let shift_flag = match self.shift_quirk {
            ShiftQuirk::Lsb => ShiftFlag::LeastSignificantBit,
            ShiftQuirk::LowNibble => ShiftFlag::LowNibble,
        };
        Chip8Config {
            instructions_per_second: self.instructions_per_second,
            quirks: Quirks { shift_flag },
            seed: self.seed,
        }
    }
}
