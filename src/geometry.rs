//! Buffer geometry: coordinates, buffer snapshots and bounds checking
//!
//! Every query here goes to the backend. Nothing is cached because the
//! buffer can be resized or written to by someone else between calls.

use crate::backend::Backend;
use crate::color::Pen;
use crate::error::{ConsoleError, Result};

/// Cell coordinate, 0-based with the origin at the top-left corner
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const ORIGIN: Coord = Coord { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Inclusive rectangle of cells
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

/// Snapshot of the screen buffer state
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ScreenBufferInfo {
    /// Buffer dimensions in cells (x = width, y = height)
    pub size: Coord,
    pub cursor: Coord,
    /// Attribute used for text written from now on
    pub attribute: Pen,
    /// Part of the buffer visible in the window
    pub window: Rect,
    pub max_window: Coord,
}

impl ScreenBufferInfo {
    pub fn width(&self) -> i32 {
        self.size.x
    }

    pub fn height(&self) -> i32 {
        self.size.y
    }

    pub fn cell_count(&self) -> usize {
        (self.size.x.max(0) as usize) * (self.size.y.max(0) as usize)
    }
}

/// Cursor shape and visibility; one record in the backend
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CursorInfo {
    /// Height as a percentage of the cell, 1 to 100
    pub size: u32,
    pub visible: bool,
}

impl Default for CursorInfo {
    fn default() -> Self {
        Self { size: 25, visible: true }
    }
}

/// Current buffer dimensions as (width, height)
pub fn buffer_size<B: Backend + ?Sized>(backend: &mut B) -> Result<(i32, i32)> {
    let info = backend.buffer_info()?;
    Ok((info.width(), info.height()))
}

/// Where the cursor is right now
pub fn cursor_position<B: Backend + ?Sized>(backend: &mut B) -> Result<Coord> {
    Ok(backend.cursor_position()?)
}

/// Check a coordinate against the current buffer size.
pub fn validate<B: Backend + ?Sized>(backend: &mut B, pos: Coord) -> Result<()> {
    let (width, height) = buffer_size(backend)?;
    check_bounds(pos, width, height)
}

pub(crate) fn check_bounds(pos: Coord, width: i32, height: i32) -> Result<()> {
    if pos.x < 0 || pos.x >= width {
        return Err(ConsoleError::out_of_range(
            "x",
            pos.x,
            format!("the co-ordinates must be within the buffer (0 to {})", width - 1),
        ));
    }
    if pos.y < 0 || pos.y >= height {
        return Err(ConsoleError::out_of_range(
            "y",
            pos.y,
            format!("the co-ordinates must be within the buffer (0 to {})", height - 1),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;

    #[test_log::test]
    fn test_buffer_size_reads_backend() {
        let mut backend = MemoryBackend::new(80, 25);
        assert_eq!(buffer_size(&mut backend).unwrap(), (80, 25));
    }

    #[test_log::test]
    fn test_cursor_position_follows_backend() {
        let mut backend = MemoryBackend::new(6, 4);
        assert_eq!(cursor_position(&mut backend).unwrap(), Coord::ORIGIN);
        backend.set_cursor_position(Coord::new(5, 2)).unwrap();
        assert_eq!(cursor_position(&mut backend).unwrap(), Coord::new(5, 2));
        backend.set_introspection(false);
        assert!(matches!(cursor_position(&mut backend), Err(ConsoleError::Io(_))));
    }

    #[test_log::test]
    fn test_validate_accepts_every_cell() {
        let mut backend = MemoryBackend::new(4, 3);
        for y in 0..3 {
            for x in 0..4 {
                assert!(validate(&mut backend, Coord::new(x, y)).is_ok(), "({x},{y})");
            }
        }
    }

    #[test_log::test]
    fn test_validate_rejects_edges() {
        let mut backend = MemoryBackend::new(4, 3);
        for pos in [Coord::new(-1, 0), Coord::new(4, 0), Coord::new(0, -1), Coord::new(0, 3)] {
            let err = validate(&mut backend, pos).unwrap_err();
            assert!(err.is_out_of_range(), "{pos:?}");
        }
    }

    #[test_log::test]
    fn test_validate_names_failing_axis() {
        let mut backend = MemoryBackend::new(4, 3);
        match validate(&mut backend, Coord::new(1, 7)) {
            Err(ConsoleError::OutOfRange { name, value, .. }) => {
                assert_eq!(name, "y");
                assert_eq!(value, 7);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test_log::test]
    fn test_validate_follows_resize() {
        let mut backend = MemoryBackend::new(4, 3);
        assert!(validate(&mut backend, Coord::new(6, 0)).is_err());
        backend.resize(10, 3);
        assert!(validate(&mut backend, Coord::new(6, 0)).is_ok());
    }

    #[test_log::test]
    fn test_validate_propagates_backend_failure() {
        let mut backend = MemoryBackend::new(4, 3);
        backend.set_introspection(false);
        assert!(matches!(validate(&mut backend, Coord::ORIGIN), Err(ConsoleError::Io(_))));
    }
}
