/// Where `8XY6` takes its VF value from.
///
/// Interpreters disagree here. The historical behaviour shifts out the least
/// significant bit; some implementations mask with `0xF` instead, leaving
/// the whole low nibble in VF.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShiftFlag {
    #[default]
    LeastSignificantBit,
    LowNibble,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Quirks {
    pub shift_flag: ShiftFlag,
}

pub const DEFAULT_INSTRUCTIONS_PER_SECOND: u32 = 700;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chip8Config {
    /// Batched into `instructions_per_second / 60` instructions per tick.
    pub instructions_per_second: u32,
    pub quirks: Quirks,
    /// Seed for `CXNN`; `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for Chip8Config {
    fn default() -> Self {
        Self {
            instructions_per_second: DEFAULT_INSTRUCTIONS_PER_SECOND,
            quirks: Quirks::default(),
            seed: None,
        }
    }
}
