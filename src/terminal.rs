use std::{
    collections::HashMap,
    io::{self, Stdout, Write},
    time::{Duration, Instant},
};

use chip8vm_core::{
    Chip8Beeper, Chip8Display, Chip8Keyboard, FrameBuffer, HostCommand, Keypad, KEY_COUNT,
};
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{self, Stylize},
    terminal,
};
use log::{debug, warn};

/// hex keypad on the left-hand side of a qwerty keyboard:
///   1 2 3 C      1 2 3 4
///   4 5 6 D  <-  q w e r
///   7 8 9 E      a s d f
///   A 0 B F      z x c v
const KEYMAP: [(char, u8); KEY_COUNT] = [
    ('1', 0x1),
    ('2', 0x2),
    ('3', 0x3),
    ('4', 0xC),
    ('q', 0x4),
    ('w', 0x5),
    ('e', 0x6),
    ('r', 0xD),
    ('a', 0x7),
    ('s', 0x8),
    ('d', 0x9),
    ('f', 0xE),
    ('z', 0xA),
    ('x', 0x0),
    ('c', 0xB),
    ('v', 0xF),
];

/// Terminals that don't report key releases only send presses and repeats,
/// so a key counts as held for this long after the last one.
const KEY_HOLD: Duration = Duration::from_millis(150);

/// Raw mode plus alternate screen for as long as it lives.
pub struct TerminalSession {
    reports_key_release: bool,
}

impl TerminalSession {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut session = TerminalSession {
            reports_key_release: false,
        };

        let mut stdout = io::stdout();
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            terminal::Clear(terminal::ClearType::All),
            cursor::Hide
        )?;

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            session.reports_key_release = true;
        }
        debug!(
            "terminal reports key releases: {}",
            session.reports_key_release
        );
        Ok(session)
    }

    pub fn reports_key_release(&self) -> bool {
        self.reports_key_release
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        if self.reports_key_release {
            let _ = execute!(stdout, PopKeyboardEnhancementFlags);
        }
        let _ = execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Two terminal columns per pixel.
pub struct TerminalDisplay {
    stdout: Stdout,
}

impl TerminalDisplay {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
        }
    }
}

impl Chip8Display for TerminalDisplay {
    fn present(&mut self, frame: &FrameBuffer) -> io::Result<()> {
        for (y, row) in frame.rows().enumerate() {
            let line: String = row
                .iter()
                .map(|&lit| if lit { "██" } else { "  " })
                .collect();
            queue!(
                self.stdout,
                cursor::MoveTo(0, y as u16),
                style::PrintStyledContent(line.as_str().yellow().on_black())
            )?;
        }
        self.stdout.flush()
    }
}

pub struct TerminalKeyboard {
    keymap: HashMap<char, u8>,
    last_down: [Option<Instant>; KEY_COUNT],
    reports_key_release: bool,
}

impl TerminalKeyboard {
    pub fn new(reports_key_release: bool) -> Self {
        Self {
            keymap: HashMap::from(KEYMAP),
            last_down: [None; KEY_COUNT],
            reports_key_release,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<HostCommand> {
        if key.kind == KeyEventKind::Press {
            match key.code {
                KeyCode::Esc => return Some(HostCommand::Quit),
                // raw mode swallows SIGINT
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Some(HostCommand::Quit)
                }
                KeyCode::Char(' ') => return Some(HostCommand::TogglePause),
                KeyCode::Backspace => return Some(HostCommand::Reset),
                _ => {}
            }
        }

        if let KeyCode::Char(c) = key.code {
            match self.keymap.get(&c.to_ascii_lowercase()) {
                Some(&hex) => {
                    self.last_down[hex as usize] = match key.kind {
                        KeyEventKind::Release => None,
                        _ => Some(Instant::now()),
                    };
                }
                None => debug!("can't map {c:?} to a CHIP-8 key"),
            }
        }
        None
    }
}

impl Chip8Keyboard for TerminalKeyboard {
    fn update_keystates(&mut self, max_wait: Duration) -> io::Result<Option<HostCommand>> {
        let deadline = Instant::now() + max_wait;
        loop {
            let timeout = deadline.saturating_duration_since(Instant::now());
            if !event::poll(timeout)? {
                return Ok(None);
            }
            if let Event::Key(key) = event::read()? {
                if let Some(command) = self.handle_key(key) {
                    return Ok(Some(command));
                }
            }
        }
    }

    fn keypad(&self) -> Keypad {
        let now = Instant::now();
        let mut keypad = Keypad::new();
        for (key, last_down) in self.last_down.iter().enumerate() {
            let down = match last_down {
                Some(at) => self.reports_key_release || now.duration_since(*at) < KEY_HOLD,
                None => false,
            };
            keypad.set_key(key as u8, down);
        }
        keypad
    }
}

/// Rings the terminal bell once each time the tone starts.
#[derive(Default)]
pub struct TerminalBeeper {
    playing: bool,
}

impl Chip8Beeper for TerminalBeeper {
    fn play(&mut self) {
        if !self.playing {
            let mut stdout = io::stdout();
            if let Err(err) = stdout.write_all(b"\x07").and_then(|_| stdout.flush()) {
                warn!("could not ring the terminal bell: {err}");
            }
            self.playing = true;
        }
    }

    fn pause(&mut self) {
        self.playing = false;
    }
}
