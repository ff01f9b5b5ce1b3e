use std::{io, time::Duration};

pub const KEY_COUNT: usize = 16;

/// The input latch: current up/down state of the sixteen hex keys, already
/// mapped from whatever physical keys the host uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Keypad {
    keys: [bool; KEY_COUNT],
}

impl Keypad {
    pub fn new() -> Self {
        Self::default()
    }

    /// A keypad with the given keys held down.
    pub fn with_keys_down(keys: &[u8]) -> Self {
        let mut keypad = Self::new();
        for &key in keys {
            keypad.set_key(key, true);
        }
        keypad
    }

    /// Keys outside 0x0-0xF are ignored.
    pub fn set_key(&mut self, key: u8, down: bool) {
        if let Some(slot) = self.keys.get_mut(key as usize) {
            *slot = down;
        }
    }

    /// Keys outside 0x0-0xF always read as up.
    pub fn is_key_down(&self, key: u8) -> bool {
        self.keys.get(key as usize).copied().unwrap_or(false)
    }

    /// Lowest-numbered key that is down.
    pub fn first_key_down(&self) -> Option<u8> {
        self.keys.iter().position(|&down| down).map(|key| key as u8)
    }
}

/// Progress of an `FX0A` wait. Lives in the machine state so it survives
/// the instruction being re-executed on every step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyWait {
    #[default]
    Idle,
    Latched(u8),
}

impl KeyWait {
    /// Advances the wait by one poll of the keypad. Yields the key once it
    /// has been pressed and then fully released.
    pub fn poll(&mut self, keypad: &Keypad) -> Option<u8> {
        match *self {
            KeyWait::Idle => {
                if let Some(key) = keypad.first_key_down() {
                    *self = KeyWait::Latched(key);
                }
                None
            }
            KeyWait::Latched(key) if keypad.is_key_down(key) => None,
            KeyWait::Latched(key) => {
                *self = KeyWait::Idle;
                Some(key)
            }
        }
    }
}

/// Requests from the input side that are about the host, not the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    Quit,
    TogglePause,
    Reset,
}

/// Input collaborator.
pub trait Chip8Keyboard {
    /// Collects input for at most `max_wait`, returning early with a host
    /// command if one arrives.
    fn update_keystates(&mut self, max_wait: Duration) -> io::Result<Option<HostCommand>>;

    fn keypad(&self) -> Keypad;
}
