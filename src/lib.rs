//! Text-mode console helpers
//!
//! Cursor positioning, pen colors, screen clearing, rectangle drawing and
//! raw single-character input on top of a character-grid screen buffer.
//! The buffer has a character plane and an attribute (color) plane that can
//! be written independently, one cursor and one input stream.
//!
//! All operations go through a [`Console`], which owns a [`Backend`] and
//! the pen state. Create one with [`initialize`] for the process terminal,
//! or with [`Console::new`] over any backend such as [`MemoryBackend`].
//! A console has a single owner; callers on several threads must serialize
//! access themselves.

mod backend;
mod color;
mod console;
mod cursor;
mod draw;
mod error;
mod geometry;
mod input;
mod memory;
mod modes;
mod screen;
#[cfg(unix)]
mod terminal;

pub use backend::{Backend, TITLE_LENGTH};
pub use color::{Color, Pen};
pub use console::{Console, Options};
pub use draw::{BorderStyle, Frame};
pub use error::{ConsoleError, Result};
pub use geometry::{buffer_size, cursor_position, validate, Coord, CursorInfo, Rect, ScreenBufferInfo};
pub use memory::MemoryBackend;
pub use modes::{InputMode, OutputMode};
pub use screen::{Cell, ScreenBuffer};
#[cfg(unix)]
pub use terminal::{CursorStyle, UnixTerminal};

/// Open the process terminal and initialize a console on it.
///
/// Call once at start-up. Fails only when stdin or stdout cannot be used.
#[cfg(unix)]
pub fn initialize() -> Result<Console<UnixTerminal>> {
    let terminal = UnixTerminal::open()?;
    Ok(Console::new(terminal))
}
