//! The shared frame buffer: a row-major grid of packed pixels.
//!
//! Exactly one mutable `FrameBuffer` is shared between the IR command
//! path and the render loop (wrapped in the gate mutex by `render`); the
//! render loop additionally owns a private scratch buffer of the same
//! dimensions as the write target of the active effect. Everything here
//! is plain sequential code — the locking discipline lives in the caller.

use crate::{MatrixConfig, Pixel};

/// A `width × height` grid of pixels, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Pixel>,
}

impl FrameBuffer {
    /// Create an all-black buffer sized for the matrix.
    pub fn new(matrix: MatrixConfig) -> Self {
        Self {
            width: matrix.width,
            height: matrix.height,
            cells: vec![Pixel::BLACK; matrix.pixel_count()],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// All cells in row-major order, for staging to the hardware sink.
    pub fn cells(&self) -> &[Pixel] {
        &self.cells
    }

    pub fn get(&self, x: usize, y: usize) -> Pixel {
        self.cells[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, pixel: Pixel) {
        self.cells[y * self.width + x] = pixel;
    }

    /// Set every cell to black.
    pub fn clear(&mut self) {
        self.fill(Pixel::BLACK);
    }

    /// Set every cell to the given pixel.
    pub fn fill(&mut self, pixel: Pixel) {
        self.cells.fill(pixel);
    }

    /// Add the deltas to every cell, each channel clamped to [0, 255].
    ///
    /// Pure per-cell and order-independent, so holding a remote button
    /// down just ramps the color smoothly until it saturates.
    pub fn add_color(&mut self, dr: i16, dg: i16, db: i16) {
        for cell in &mut self.cells {
            *cell = cell.add(dr, dg, db);
        }
    }

    /// Copy `source` into this buffer, one-to-one by coordinate.
    ///
    /// Both buffers come from the same `MatrixConfig`, so the dimensions
    /// always agree; a mismatch is a programming error.
    pub fn copy_from(&mut self, source: &FrameBuffer) {
        debug_assert_eq!(self.cells.len(), source.cells.len());
        self.cells.copy_from_slice(&source.cells);
    }
}
