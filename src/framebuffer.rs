pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;
pub const SIZE: usize = WIDTH * HEIGHT;

/// The logical 64x32 monochrome bitmap, row-major.
///
/// Only the machine writes to it; presenters read [`Framebuffer::pixels`] and
/// use [`Framebuffer::take_dirty`] to learn whether anything changed since the
/// last frame they painted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    cells: [bool; SIZE],
    dirty: bool,
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self {
            cells: [false; SIZE],
            dirty: true,
        }
    }
}

impl Framebuffer {
    pub fn new() -> Self {
        Default::default()
    }

    /// Turns every cell off and requests a repaint.
    pub fn clear(&mut self) {
        self.cells = [false; SIZE];
        self.dirty = true;
    }

    /// Reads the cell at a flattened index. Indices wrap modulo [`SIZE`].
    pub fn get(&self, index: usize) -> bool {
        self.cells[index % SIZE]
    }

    pub fn set(&mut self, index: usize, on: bool) {
        self.cells[index % SIZE] = on;
        self.dirty = true;
    }

    /// XORs a lit sprite pixel into the cell, returning whether a lit cell was
    /// turned off.
    pub fn toggle(&mut self, index: usize) -> bool {
        let cell = &mut self.cells[index % SIZE];
        let collided = *cell;
        *cell = !*cell;
        self.dirty = true;
        collided
    }

    pub fn pixels(&self) -> &[bool; SIZE] {
        &self.cells
    }

    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}
