use log::debug;

use crate::{cpu::Chip8Cpu, keyboard::Keypad, state::Chip8State};

pub const TICKS_PER_SECOND: u32 = 60;

/// Outcome of one 60 Hz tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Some instruction in the batch wrote the display.
    pub dirty: bool,
    /// The sound timer was non-zero when the batch finished, before this
    /// tick's decrement. The tone should play for this tick.
    pub sound_active: bool,
    pub instructions: u32,
    pub faults: u32,
}

/// Fixed instruction budget per tick. Rates below 60 give an empty batch;
/// timers still run.
pub fn instructions_per_tick(instructions_per_second: u32) -> u32 {
    instructions_per_second / TICKS_PER_SECOND
}

/// Runs one tick's batch of instructions, then counts both timers down by one.
/// Never sleeps; pacing against the wall clock is the host's job.
pub fn run_tick(
    cpu: &mut Chip8Cpu,
    state: &mut Chip8State,
    keypad: &Keypad,
    instructions_per_second: u32,
) -> TickReport {
    let mut report = TickReport {
        instructions: instructions_per_tick(instructions_per_second),
        ..TickReport::default()
    };

    for _ in 0..report.instructions {
        let effect = cpu.step(state, keypad);
        report.dirty |= effect.dirty;
        if effect.fault.is_some() {
            report.faults += 1;
        }
    }

    report.sound_active = state.sound_active();
    state.delay_timer = state.delay_timer.saturating_sub(1);
    state.sound_timer = state.sound_timer.saturating_sub(1);

    if report.faults > 0 {
        debug!(
            "tick ran {} instructions with {} faults",
            report.instructions, report.faults
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Quirks;

    fn machine(program: &[u8]) -> (Chip8Cpu, Chip8State) {
        let mut state = Chip8State::default();
        state.load_program(program).unwrap();
        (Chip8Cpu::new(Quirks::default(), Some(1)), state)
    }

    #[test]
    fn test_budget_is_floor_of_rate_over_60() {
        assert_eq!(instructions_per_tick(700), 11);
        assert_eq!(instructions_per_tick(600), 10);
        assert_eq!(instructions_per_tick(59), 0);
    }

    #[test]
    fn test_tick_runs_the_whole_batch() {
        // 200: ADD V0, 1; 202: JP 0x200
        let (mut cpu, mut state) = machine(&[0x70, 0x01, 0x12, 0x00]);
        let report = run_tick(&mut cpu, &mut state, &Keypad::new(), 600);
        assert_eq!(report.instructions, 10);
        assert_eq!(state.register(0), 5);
        assert!(!report.dirty);
    }

    #[test]
    fn test_dirty_is_ored_across_the_batch() {
        // 200: CLS; 202: JP 0x202
        let (mut cpu, mut state) = machine(&[0x00, 0xE0, 0x12, 0x02]);
        assert!(run_tick(&mut cpu, &mut state, &Keypad::new(), 600).dirty);
        assert!(!run_tick(&mut cpu, &mut state, &Keypad::new(), 600).dirty);
    }

    #[test]
    fn test_timers_count_down_once_per_tick() {
        // 200: JP 0x200
        let (mut cpu, mut state) = machine(&[0x12, 0x00]);
        state.delay_timer = 2;
        state.sound_timer = 1;

        let report = run_tick(&mut cpu, &mut state, &Keypad::new(), 700);
        assert!(report.sound_active);
        assert_eq!((state.delay_timer, state.sound_timer), (1, 0));

        let report = run_tick(&mut cpu, &mut state, &Keypad::new(), 700);
        assert!(!report.sound_active);
        assert_eq!((state.delay_timer, state.sound_timer), (0, 0));

        run_tick(&mut cpu, &mut state, &Keypad::new(), 700);
        assert_eq!((state.delay_timer, state.sound_timer), (0, 0));
    }

    #[test]
    fn test_sound_set_during_batch_is_reported() {
        // 200: LD V0, 3; 202: LD ST, V0; 204: JP 0x204
        let (mut cpu, mut state) = machine(&[0x60, 0x03, 0xF0, 0x18, 0x12, 0x04]);
        let report = run_tick(&mut cpu, &mut state, &Keypad::new(), 600);
        assert!(report.sound_active);
        assert_eq!(state.sound_timer, 2);
    }

    #[test]
    fn test_faults_are_counted_not_raised() {
        // 200: RET on an empty stack, then zeroed memory
        let (mut cpu, mut state) = machine(&[0x00, 0xEE]);
        let report = run_tick(&mut cpu, &mut state, &Keypad::new(), 120);
        assert_eq!(report.instructions, 2);
        assert_eq!(report.faults, 2);
        assert_eq!(state.program_counter, 0x204);
    }
}
