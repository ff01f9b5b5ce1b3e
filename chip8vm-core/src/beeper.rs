/// Audio collaborator. The tone is on while the sound timer is non-zero;
/// pitch, waveform and volume are up to the implementation.
pub trait Chip8Beeper {
    fn play(&mut self);
    fn pause(&mut self);
}
