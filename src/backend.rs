//! The terminal backend capability set
//!
//! A backend is a thin binding to a grid-addressable screen buffer with a
//! separate character plane and attribute plane, one cursor and one input
//! stream. The console layer talks to nothing else.

use std::io;

use crate::color::Pen;
use crate::geometry::{Coord, CursorInfo, ScreenBufferInfo};
use crate::modes::{InputMode, OutputMode};

/// Longest title (in characters, exclusive) a backend accepts by default
pub const TITLE_LENGTH: usize = 1024;

pub trait Backend {
    /// Fresh snapshot of size, cursor, attribute and window. Fails when the
    /// output does not support buffer introspection (e.g. it is redirected).
    fn buffer_info(&mut self) -> io::Result<ScreenBufferInfo>;

    fn cursor_position(&mut self) -> io::Result<Coord> {
        Ok(self.buffer_info()?.cursor)
    }

    fn set_cursor_position(&mut self, pos: Coord) -> io::Result<()>;

    fn cursor_info(&mut self) -> io::Result<CursorInfo>;

    fn set_cursor_info(&mut self, info: CursorInfo) -> io::Result<()>;

    /// Attribute applied to text written after this call
    fn set_text_attribute(&mut self, pen: Pen) -> io::Result<()>;

    /// Write `ch` into `count` cells of the character plane, row-major from
    /// `origin`. Attributes are untouched. Returns cells written.
    fn fill_characters(&mut self, origin: Coord, count: usize, ch: char) -> io::Result<usize>;

    /// Write `pen` into `count` cells of the attribute plane, row-major from
    /// `origin`. Characters are untouched. Returns cells written.
    fn fill_attributes(&mut self, origin: Coord, count: usize, pen: Pen) -> io::Result<usize>;

    /// Write text at the cursor with the active attribute, advancing the cursor.
    fn write_text(&mut self, text: &str) -> io::Result<()>;

    fn input_mode(&mut self) -> io::Result<InputMode>;

    fn set_input_mode(&mut self, mode: InputMode) -> io::Result<()>;

    fn output_mode(&mut self) -> io::Result<OutputMode>;

    fn set_output_mode(&mut self, mode: OutputMode) -> io::Result<()>;

    /// Block until one character is available and return it.
    fn read_char(&mut self) -> io::Result<char>;

    /// Current title, at most `max_len` characters
    fn title(&mut self, max_len: usize) -> io::Result<String>;

    fn set_title(&mut self, title: &str) -> io::Result<()>;

    fn max_title_len(&self) -> usize {
        TITLE_LENGTH
    }
}

impl<B: Backend + ?Sized> Backend for &mut B {
    fn buffer_info(&mut self) -> io::Result<ScreenBufferInfo> {
        (**self).buffer_info()
    }

    fn cursor_position(&mut self) -> io::Result<Coord> {
        (**self).cursor_position()
    }

    fn set_cursor_position(&mut self, pos: Coord) -> io::Result<()> {
        (**self).set_cursor_position(pos)
    }

    fn cursor_info(&mut self) -> io::Result<CursorInfo> {
        (**self).cursor_info()
    }

    fn set_cursor_info(&mut self, info: CursorInfo) -> io::Result<()> {
        (**self).set_cursor_info(info)
    }

    fn set_text_attribute(&mut self, pen: Pen) -> io::Result<()> {
        (**self).set_text_attribute(pen)
    }

    fn fill_characters(&mut self, origin: Coord, count: usize, ch: char) -> io::Result<usize> {
        (**self).fill_characters(origin, count, ch)
    }

    fn fill_attributes(&mut self, origin: Coord, count: usize, pen: Pen) -> io::Result<usize> {
        (**self).fill_attributes(origin, count, pen)
    }

    fn write_text(&mut self, text: &str) -> io::Result<()> {
        (**self).write_text(text)
    }

    fn input_mode(&mut self) -> io::Result<InputMode> {
        (**self).input_mode()
    }

    fn set_input_mode(&mut self, mode: InputMode) -> io::Result<()> {
        (**self).set_input_mode(mode)
    }

    fn output_mode(&mut self) -> io::Result<OutputMode> {
        (**self).output_mode()
    }

    fn set_output_mode(&mut self, mode: OutputMode) -> io::Result<()> {
        (**self).set_output_mode(mode)
    }

    fn read_char(&mut self) -> io::Result<char> {
        (**self).read_char()
    }

    fn title(&mut self, max_len: usize) -> io::Result<String> {
        (**self).title(max_len)
    }

    fn set_title(&mut self, title: &str) -> io::Result<()> {
        (**self).set_title(title)
    }

    fn max_title_len(&self) -> usize {
        (**self).max_title_len()
    }
}
