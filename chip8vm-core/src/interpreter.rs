use std::{
    thread,
    time::{Duration, Instant},
};

use log::info;

use crate::{
    error::HostError, scheduler::TICKS_PER_SECOND, Chip8Beeper, Chip8Display, Chip8Keyboard,
    Chip8Machine, HostCommand,
};

/// Fixed-rate deadline tracker for the frame loop.
struct Timer {
    interval: Duration,
    next_tick: Instant,
}

impl Timer {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_tick: Instant::now() + interval,
        }
    }

    fn time_left(&self) -> Duration {
        self.next_tick.saturating_duration_since(Instant::now())
    }

    /// Moves the deadline on by one interval. After a stall of more than a
    /// whole frame the schedule restarts from now instead of bursting.
    fn advance(&mut self) {
        let now = Instant::now();
        self.next_tick += self.interval;
        if self.next_tick + self.interval < now {
            self.next_tick = now + self.interval;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Paused,
    Quit,
}

/// Drives a [`Chip8Machine`] in real time against host collaborators: one
/// tick per frame, present when dirty, gate the tone, and spend the rest of
/// the frame collecting input.
pub struct Chip8Interpreter<D: Chip8Display, K: Chip8Keyboard, B: Chip8Beeper> {
    pub machine: Chip8Machine,
    pub display: D,
    pub keyboard: K,
    pub beeper: B,
    run_state: RunState,
    frame_interval: Duration,
}

impl<D: Chip8Display, K: Chip8Keyboard, B: Chip8Beeper> Chip8Interpreter<D, K, B> {
    pub fn new(machine: Chip8Machine, display: D, keyboard: K, beeper: B) -> Self {
        Self {
            machine,
            display,
            keyboard,
            beeper,
            run_state: RunState::Running,
            frame_interval: Duration::from_secs(1) / TICKS_PER_SECOND,
        }
    }

    /// Overrides the 1/60 s frame length.
    pub fn with_frame_interval(mut self, frame_interval: Duration) -> Self {
        self.frame_interval = frame_interval;
        self
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Runs frames until a quit command arrives.
    pub fn run(&mut self) -> Result<(), HostError> {
        let mut timer = Timer::new(self.frame_interval);
        self.display.present(self.machine.display())?;

        while self.run_state != RunState::Quit {
            self.frame(&mut timer)?;
        }
        self.beeper.pause();
        Ok(())
    }

    fn frame(&mut self, timer: &mut Timer) -> Result<(), HostError> {
        if self.run_state == RunState::Running {
            let keypad = self.keyboard.keypad();
            let report = self.machine.run_tick(&keypad);
            if report.dirty {
                self.display.present(self.machine.display())?;
            }
            if report.sound_active {
                self.beeper.play();
            } else {
                self.beeper.pause();
            }
        }

        if let Some(command) = self.keyboard.update_keystates(timer.time_left())? {
            self.handle_command(command)?;
        }

        let time_left = timer.time_left();
        if !time_left.is_zero() {
            thread::sleep(time_left);
        }
        timer.advance();
        Ok(())
    }

    pub fn handle_command(&mut self, command: HostCommand) -> Result<(), HostError> {
        match command {
            HostCommand::Quit => {
                info!("quit");
                self.run_state = RunState::Quit;
            }
            HostCommand::TogglePause => {
                self.run_state = match self.run_state {
                    RunState::Running => {
                        info!("paused");
                        self.beeper.pause();
                        RunState::Paused
                    }
                    RunState::Paused => {
                        info!("unpaused");
                        RunState::Running
                    }
                    RunState::Quit => RunState::Quit,
                };
            }
            HostCommand::Reset => {
                self.machine.reset()?;
                self.display.present(self.machine.display())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Chip8Config, FrameBuffer, Keypad};
    use std::{collections::VecDeque, io};

    #[derive(Default)]
    struct RecordingDisplay {
        frames: Vec<usize>,
    }

    impl Chip8Display for RecordingDisplay {
        fn present(&mut self, frame: &FrameBuffer) -> io::Result<()> {
            self.frames.push(frame.lit_count());
            Ok(())
        }
    }

    /// Plays back one scripted entry per frame, then quits.
    struct ScriptedKeyboard {
        script: VecDeque<(Keypad, Option<HostCommand>)>,
        current: Keypad,
    }

    impl ScriptedKeyboard {
        fn new(script: Vec<(Keypad, Option<HostCommand>)>) -> Self {
            Self {
                script: script.into(),
                current: Keypad::new(),
            }
        }
    }

    impl Chip8Keyboard for ScriptedKeyboard {
        fn update_keystates(&mut self, _max_wait: Duration) -> io::Result<Option<HostCommand>> {
            match self.script.pop_front() {
                Some((keypad, command)) => {
                    self.current = keypad;
                    Ok(command)
                }
                None => Ok(Some(HostCommand::Quit)),
            }
        }

        fn keypad(&self) -> Keypad {
            self.current
        }
    }

    #[derive(Default)]
    struct RecordingBeeper {
        log: Vec<bool>,
    }

    impl Chip8Beeper for RecordingBeeper {
        fn play(&mut self) {
            self.log.push(true);
        }

        fn pause(&mut self) {
            self.log.push(false);
        }
    }

    fn interpreter(
        program: &[u8],
        script: Vec<(Keypad, Option<HostCommand>)>,
    ) -> Chip8Interpreter<RecordingDisplay, ScriptedKeyboard, RecordingBeeper> {
        let config = Chip8Config {
            instructions_per_second: 600,
            seed: Some(0),
            ..Chip8Config::default()
        };
        let mut machine = Chip8Machine::new(&config);
        machine.load(program).unwrap();
        Chip8Interpreter::new(
            machine,
            RecordingDisplay::default(),
            ScriptedKeyboard::new(script),
            RecordingBeeper::default(),
        )
        .with_frame_interval(Duration::ZERO)
    }

    fn idle(frames: usize) -> Vec<(Keypad, Option<HostCommand>)> {
        vec![(Keypad::new(), None); frames]
    }

    #[test]
    fn test_presents_only_dirty_frames() -> Result<(), HostError> {
        // 200: LD F, V0; 202: DRW V0, V0, 5; 204: JP 0x204
        let mut i = interpreter(&[0xF0, 0x29, 0xD0, 0x05, 0x12, 0x04], idle(3));
        i.run()?;
        assert_eq!(i.display.frames, vec![0, 14]);
        assert_eq!(i.run_state(), RunState::Quit);
        Ok(())
    }

    #[test]
    fn test_beeper_follows_sound_timer() -> Result<(), HostError> {
        // 200: LD V0, 2; 202: LD ST, V0; 204: JP 0x204
        let mut i = interpreter(&[0x60, 0x02, 0xF0, 0x18, 0x12, 0x04], idle(3));
        i.run()?;
        // two frames of tone, then silence, then the final pause on quit
        assert_eq!(i.beeper.log, vec![true, true, false, false, false]);
        Ok(())
    }

    #[test]
    fn test_pause_stops_ticks() -> Result<(), HostError> {
        // 200: ADD V0, 1; 202: JP 0x200
        let script = vec![
            (Keypad::new(), Some(HostCommand::TogglePause)),
            (Keypad::new(), None),
            (Keypad::new(), None),
            (Keypad::new(), Some(HostCommand::TogglePause)),
        ];
        let mut i = interpreter(&[0x70, 0x01, 0x12, 0x00], script);
        i.run()?;
        // one tick before pausing, one after resuming; 10 instructions each
        assert_eq!(i.machine.state().register(0), 10);
        Ok(())
    }

    #[test]
    fn test_reset_command_restarts_program() -> Result<(), HostError> {
        // 200: ADD V0, 1; 202: JP 0x200
        let script = vec![
            (Keypad::new(), None),
            (Keypad::new(), Some(HostCommand::Reset)),
        ];
        let mut i = interpreter(&[0x70, 0x01, 0x12, 0x00], script);
        i.run()?;
        // two ticks, the reset, then the tick of the frame that quits
        assert_eq!(i.machine.state().register(0), 5);
        assert_eq!(i.display.frames, vec![0, 0]);
        Ok(())
    }

    #[test]
    fn test_key_wait_across_frames() -> Result<(), HostError> {
        // 200: LD V1, K; 202: JP 0x202
        let held = Keypad::with_keys_down(&[0x3]);
        let script = vec![
            (Keypad::new(), None),
            (held, None),
            (held, None),
            (held, None),
            (Keypad::new(), None),
        ];
        let mut i = interpreter(&[0xF1, 0x0A, 0x12, 0x02], script);
        i.run()?;
        assert_eq!(i.machine.state().register(1), 0x3);
        assert_eq!(i.machine.state().program_counter, 0x202);
        Ok(())
    }
}
