use std::io;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// Monochrome 64x32 bitmap, row-major: pixel (x, y) lives at `y * 64 + x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pixels: [bool; DISPLAY_WIDTH * DISPLAY_HEIGHT],
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self {
            pixels: [false; DISPLAY_WIDTH * DISPLAY_HEIGHT],
        }
    }
}

impl FrameBuffer {
    pub fn clear(&mut self) {
        self.pixels = [false; DISPLAY_WIDTH * DISPLAY_HEIGHT];
    }

    /// XORs an 8-pixel-wide sprite onto the bitmap and reports whether any lit
    /// pixel was switched off.
    ///
    /// The origin wraps around the screen, the sprite itself does not: bits
    /// past the right edge and rows past the bottom edge are dropped.
    pub fn draw(&mut self, x: u8, y: u8, data: &[u8]) -> bool {
        let x0 = x as usize % DISPLAY_WIDTH;
        let y0 = y as usize % DISPLAY_HEIGHT;
        let mut collision = false;

        for (i, byte) in data.iter().enumerate() {
            let row = y0 + i;
            if row >= DISPLAY_HEIGHT {
                break;
            }
            for j in 0..8 {
                let col = x0 + j;
                if col >= DISPLAY_WIDTH {
                    break;
                }
                let flip = byte & (0x80 >> j) != 0;
                let index = row * DISPLAY_WIDTH + col;
                if flip && self.pixels[index] {
                    collision = true;
                }
                self.pixels[index] ^= flip;
            }
        }

        collision
    }

    /// Out-of-range coordinates read as unlit.
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        x < DISPLAY_WIDTH && y < DISPLAY_HEIGHT && self.pixels[y * DISPLAY_WIDTH + x]
    }

    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.pixels.chunks(DISPLAY_WIDTH)
    }

    pub fn lit_count(&self) -> usize {
        self.pixels.iter().filter(|&&lit| lit).count()
    }
}

/// Presentation collaborator. Receives the bitmap whenever a tick changed it;
/// colours, scaling and any animation are its own business.
pub trait Chip8Display {
    fn present(&mut self, frame: &FrameBuffer) -> io::Result<()>;
}
