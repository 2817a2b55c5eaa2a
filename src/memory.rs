//! In-memory backend
//!
//! Holds a complete screen buffer, cursor record, modes, title and a queue of
//! pending input. Used headless and as the fixture for console tests.

use std::collections::VecDeque;
use std::io;

use log::trace;

use crate::backend::{Backend, TITLE_LENGTH};
use crate::color::Pen;
use crate::geometry::{Coord, CursorInfo, Rect, ScreenBufferInfo};
use crate::modes::{InputMode, OutputMode};
use crate::screen::{Cell, ScreenBuffer};

pub struct MemoryBackend {
    screen: ScreenBuffer,
    attribute: Pen,
    cursor_info: CursorInfo,
    input_mode: InputMode,
    output_mode: OutputMode,
    title: String,
    max_title_len: usize,
    pending_input: VecDeque<char>,
    /// When false, `buffer_info` fails as it does for redirected output
    introspection: bool,
    /// Text written while introspection is unavailable
    raw_output: String,
    /// Input mode in effect at each `read_char` call
    read_modes: Vec<InputMode>,
    /// Successful `set_input_mode` calls left before they start failing
    input_mode_changes: Option<usize>,
    write_failure: bool,
}

impl MemoryBackend {
    pub fn new(width: u16, height: u16) -> Self {
        Self::with_attribute(width, height, Pen::default())
    }

    /// Buffer whose cells and active attribute start out as `attribute`
    pub fn with_attribute(width: u16, height: u16, attribute: Pen) -> Self {
        Self {
            screen: ScreenBuffer::new(width, height, attribute),
            attribute,
            cursor_info: CursorInfo::default(),
            input_mode: InputMode::cooked(),
            output_mode: OutputMode::PROCESSED_OUTPUT | OutputMode::WRAP_AT_EOL_OUTPUT,
            title: String::new(),
            max_title_len: TITLE_LENGTH,
            pending_input: VecDeque::new(),
            introspection: true,
            raw_output: String::new(),
            read_modes: Vec::new(),
            input_mode_changes: None,
            write_failure: false,
        }
    }

    pub fn with_max_title_len(mut self, max: usize) -> Self {
        self.max_title_len = max;
        self
    }

    pub fn screen(&self) -> &ScreenBuffer {
        &self.screen
    }

    pub fn cell(&self, x: i32, y: i32) -> Option<Cell> {
        self.screen.get(Coord::new(x, y))
    }

    pub fn row_text(&self, y: i32) -> String {
        self.screen.row_text(y)
    }

    pub fn attribute(&self) -> Pen {
        self.attribute
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.screen.resize(width, height, self.attribute);
    }

    pub fn set_introspection(&mut self, enabled: bool) {
        self.introspection = enabled;
    }

    pub fn raw_output(&self) -> &str {
        &self.raw_output
    }

    /// Queue characters for `read_char`
    pub fn push_input(&mut self, text: &str) {
        self.pending_input.extend(text.chars());
    }

    pub fn read_modes(&self) -> &[InputMode] {
        &self.read_modes
    }

    /// Let `set_input_mode` succeed `count` more times, then fail
    pub fn limit_input_mode_changes(&mut self, count: usize) {
        self.input_mode_changes = Some(count);
    }

    /// Make every `write_text` fail
    pub fn set_write_failure(&mut self, failing: bool) {
        self.write_failure = failing;
    }

    fn unsupported() -> io::Error {
        io::Error::new(io::ErrorKind::Unsupported, "screen buffer introspection is not available")
    }
}

impl Backend for MemoryBackend {
    fn buffer_info(&mut self) -> io::Result<ScreenBufferInfo> {
        if !self.introspection {
            return Err(Self::unsupported());
        }
        let (width, height) = self.screen.size();
        let size = Coord::new(width as i32, height as i32);
        Ok(ScreenBufferInfo {
            size,
            cursor: self.screen.cursor(),
            attribute: self.attribute,
            window: Rect {
                left: 0,
                top: 0,
                right: size.x - 1,
                bottom: size.y - 1,
            },
            max_window: size,
        })
    }

    fn set_cursor_position(&mut self, pos: Coord) -> io::Result<()> {
        trace!("memory: cursor -> {:?}", pos);
        if self.screen.set_cursor(pos) {
            Ok(())
        } else {
            Err(io::Error::new(io::ErrorKind::InvalidInput, "cursor position outside the buffer"))
        }
    }

    fn cursor_info(&mut self) -> io::Result<CursorInfo> {
        Ok(self.cursor_info)
    }

    fn set_cursor_info(&mut self, info: CursorInfo) -> io::Result<()> {
        if !(1..=100).contains(&info.size) {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "cursor size must be 1 to 100"));
        }
        self.cursor_info = info;
        Ok(())
    }

    fn set_text_attribute(&mut self, pen: Pen) -> io::Result<()> {
        self.attribute = pen;
        Ok(())
    }

    fn fill_characters(&mut self, origin: Coord, count: usize, ch: char) -> io::Result<usize> {
        Ok(self.screen.fill_chars(origin, count, ch).len())
    }

    fn fill_attributes(&mut self, origin: Coord, count: usize, pen: Pen) -> io::Result<usize> {
        Ok(self.screen.fill_attrs(origin, count, pen).len())
    }

    fn write_text(&mut self, text: &str) -> io::Result<()> {
        if self.write_failure {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "output stream closed"));
        }
        if !self.introspection {
            self.raw_output.push_str(text);
            return Ok(());
        }
        let wrap = self.output_mode.contains(OutputMode::WRAP_AT_EOL_OUTPUT);
        self.screen.write_str(text, self.attribute, wrap);
        Ok(())
    }

    fn input_mode(&mut self) -> io::Result<InputMode> {
        Ok(self.input_mode)
    }

    fn set_input_mode(&mut self, mode: InputMode) -> io::Result<()> {
        if let Some(left) = self.input_mode_changes.as_mut() {
            if *left == 0 {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "input mode is locked"));
            }
            *left -= 1;
        }
        self.input_mode = mode;
        Ok(())
    }

    fn output_mode(&mut self) -> io::Result<OutputMode> {
        Ok(self.output_mode)
    }

    fn set_output_mode(&mut self, mode: OutputMode) -> io::Result<()> {
        self.output_mode = mode;
        Ok(())
    }

    fn read_char(&mut self) -> io::Result<char> {
        self.read_modes.push(self.input_mode);
        self.pending_input
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no input available"))
    }

    fn title(&mut self, max_len: usize) -> io::Result<String> {
        Ok(self.title.chars().take(max_len).collect())
    }

    fn set_title(&mut self, title: &str) -> io::Result<()> {
        self.title = title.to_string();
        Ok(())
    }

    fn max_title_len(&self) -> usize {
        self.max_title_len
    }
}
