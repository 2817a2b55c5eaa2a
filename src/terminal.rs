//! Unix terminal backend
//!
//! Talks ANSI escape sequences to stdout and termios to stdin. A terminal
//! cannot recolor a cell without redrawing its character, so this backend
//! keeps a shadow copy of both planes and repaints the cells a fill or
//! write touches from it.
//!
//! The screen is cleared when the terminal is opened so the shadow starts
//! out matching it. The cursor is asked for (DSR) on every buffer query,
//! but characters printed around the console (plain `print!`) never reach
//! the shadow: an attribute fill over them repaints what the shadow holds.

use std::io::{self, Read, Write};
use std::ops::Range;

use log::{debug, trace};

use crate::backend::Backend;
use crate::color::Pen;
use crate::error::ConsoleError;
use crate::geometry::{Coord, CursorInfo, Rect, ScreenBufferInfo};
use crate::modes::{InputMode, OutputMode};
use crate::screen::ScreenBuffer;

const CURSOR_SHOW: &str = "\x1b[?25h";
const CURSOR_HIDE: &str = "\x1b[?25l";
const WRAP_ON: &str = "\x1b[?7h";
const WRAP_OFF: &str = "\x1b[?7l";
const CURSOR_STYLE_DEFAULT: &str = "\x1b[0 q";
const SGR_RESET: &str = "\x1b[0m";
const CLEAR_SCREEN_AND_HOME: &str = "\x1b[2J\x1b[H";
const CURSOR_REPORT_REQUEST: &str = "\x1b[6n";
/// Wait for a cursor report, in deciseconds
const CURSOR_REPORT_TIMEOUT: libc::cc_t = 2;

/// Input flags that have no termios counterpart and are only remembered
const EVENT_INPUT: InputMode = InputMode::WINDOW_INPUT.union(InputMode::MOUSE_INPUT);

/// Cursor shape (DECSCUSR), steady variants only
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorStyle {
    SteadyBlock,
    SteadyUnderline,
}

impl CursorStyle {
    /// Closest shape for a cursor height given as a percentage of the cell
    pub fn from_height(percent: u32) -> Self {
        if percent < 50 {
            CursorStyle::SteadyUnderline
        } else {
            CursorStyle::SteadyBlock
        }
    }

    fn code(self) -> &'static str {
        match self {
            CursorStyle::SteadyBlock => "\x1b[2 q",
            CursorStyle::SteadyUnderline => "\x1b[4 q",
        }
    }
}

/// The process's controlling terminal on stdin/stdout
pub struct UnixTerminal {
    stdout: io::Stdout,
    shadow: ScreenBuffer,
    attribute: Pen,
    cursor_info: CursorInfo,
    output_mode: OutputMode,
    event_input: InputMode,
    title: String,
    /// Control characters in effect before line input was switched off
    cooked_cc: Option<[libc::cc_t; libc::NCCS]>,
    /// Input settings at open, put back on drop
    orig_termios: Option<libc::termios>,
    /// Output is an interactive terminal rather than a file or pipe
    is_tty: bool,
    /// Input can answer cursor reports
    input_is_tty: bool,
}

impl UnixTerminal {
    /// Acquire stdin and stdout. Fails only when a descriptor is unusable;
    /// a redirected stdout opens fine but reports no buffer.
    pub fn open() -> Result<Self, ConsoleError> {
        check_handle(libc::STDOUT_FILENO, "output")?;
        check_handle(libc::STDIN_FILENO, "input")?;

        let is_tty = unsafe { libc::isatty(libc::STDOUT_FILENO) } == 1;
        let input_is_tty = unsafe { libc::isatty(libc::STDIN_FILENO) } == 1;
        let orig_termios = get_termios(libc::STDIN_FILENO).ok();
        let (width, height) = window_size().unwrap_or((80, 25));
        let attribute = Pen::default();
        debug!("terminal: opened {}x{}, tty={}", width, height, is_tty);

        let mut stdout = io::stdout();
        if is_tty {
            stdout.write_all(startup_sequence(attribute).as_bytes())?;
            stdout.flush()?;
        }

        Ok(Self {
            stdout,
            shadow: ScreenBuffer::new(width, height, attribute),
            attribute,
            cursor_info: CursorInfo::default(),
            output_mode: OutputMode::PROCESSED_OUTPUT | OutputMode::WRAP_AT_EOL_OUTPUT,
            event_input: EVENT_INPUT,
            title: String::new(),
            cooked_cc: None,
            orig_termios,
            is_tty,
            input_is_tty,
        })
    }

    /// Move the cursor (0-based; ANSI is 1-based)
    fn goto(&mut self, pos: Coord) -> io::Result<()> {
        write!(self.stdout, "\x1b[{};{}H", pos.y + 1, pos.x + 1)
    }

    fn write_raw(&mut self, s: &str) -> io::Result<()> {
        self.stdout.write_all(s.as_bytes())
    }

    fn require_tty(&self) -> io::Result<()> {
        if self.is_tty {
            Ok(())
        } else {
            Err(io::Error::new(io::ErrorKind::Unsupported, "output is not a terminal"))
        }
    }

    /// Ask the terminal where its cursor is. Input is switched to
    /// non-canonical, no-echo reads with a short timeout for the reply.
    fn query_cursor(&mut self) -> io::Result<Coord> {
        if !self.input_is_tty {
            return Err(io::Error::new(io::ErrorKind::Unsupported, "input is not a terminal"));
        }
        let saved = get_termios(libc::STDIN_FILENO)?;
        let mut raw = saved;
        raw.c_lflag &= !(libc::ICANON | libc::ECHO);
        raw.c_cc[libc::VMIN] = 0;
        raw.c_cc[libc::VTIME] = CURSOR_REPORT_TIMEOUT;
        set_termios(libc::STDIN_FILENO, &raw)?;

        let reply = self.read_cursor_report();
        let restored = set_termios(libc::STDIN_FILENO, &saved);
        let reply = reply?;
        restored?;

        parse_cursor_report(&reply)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "malformed cursor position report"))
    }

    fn read_cursor_report(&mut self) -> io::Result<Vec<u8>> {
        self.write_raw(CURSOR_REPORT_REQUEST)?;
        self.stdout.flush()?;

        let mut stdin = io::stdin();
        let mut reply = Vec::new();
        let mut byte = [0u8; 1];
        while reply.len() < 32 {
            if stdin.read(&mut byte)? == 0 {
                return Err(io::Error::new(io::ErrorKind::TimedOut, "no cursor position report"));
            }
            reply.push(byte[0]);
            if byte[0] == b'R' {
                break;
            }
        }
        Ok(reply)
    }

    /// Redraw `span` of the shadow buffer, then put back the active
    /// attribute and the cursor.
    fn repaint(&mut self, span: Range<usize>) -> io::Result<()> {
        let mut last_attr = None;
        let mut last_row = -1;

        for idx in span {
            let pos = self.shadow.coord_of(idx);
            if pos.y != last_row {
                self.goto(pos)?;
                last_row = pos.y;
            }
            let cell = self.shadow.cell(idx);
            if last_attr != Some(cell.attr) {
                self.write_raw(&cell.attr.to_sgr())?;
                last_attr = Some(cell.attr);
            }
            write!(self.stdout, "{}", cell.ch)?;
        }

        let sgr = self.attribute.to_sgr();
        self.write_raw(&sgr)?;
        self.goto(self.shadow.cursor())?;
        self.stdout.flush()
    }
}

impl Backend for UnixTerminal {
    fn buffer_info(&mut self) -> io::Result<ScreenBufferInfo> {
        self.require_tty()?;
        let (width, height) = window_size()?;
        self.shadow.resize(width, height, self.attribute);
        match self.query_cursor() {
            Ok(pos) => {
                self.shadow.set_cursor(pos);
            }
            Err(e) => trace!("terminal: cursor report unavailable ({}), using last known position", e),
        }

        let size = Coord::new(width as i32, height as i32);
        Ok(ScreenBufferInfo {
            size,
            cursor: self.shadow.cursor(),
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
        if !self.shadow.set_cursor(pos) {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "cursor position outside the buffer"));
        }
        self.goto(pos)?;
        self.stdout.flush()
    }

    fn cursor_info(&mut self) -> io::Result<CursorInfo> {
        Ok(self.cursor_info)
    }

    fn set_cursor_info(&mut self, info: CursorInfo) -> io::Result<()> {
        if !(1..=100).contains(&info.size) {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "cursor size must be 1 to 100"));
        }
        self.write_raw(CursorStyle::from_height(info.size).code())?;
        self.write_raw(if info.visible { CURSOR_SHOW } else { CURSOR_HIDE })?;
        self.stdout.flush()?;
        self.cursor_info = info;
        Ok(())
    }

    fn set_text_attribute(&mut self, pen: Pen) -> io::Result<()> {
        self.attribute = pen;
        if self.is_tty {
            self.write_raw(&pen.to_sgr())?;
            self.stdout.flush()?;
        }
        Ok(())
    }

    fn fill_characters(&mut self, origin: Coord, count: usize, ch: char) -> io::Result<usize> {
        self.require_tty()?;
        let span = self.shadow.fill_chars(origin, count, ch);
        let written = span.len();
        self.repaint(span)?;
        Ok(written)
    }

    fn fill_attributes(&mut self, origin: Coord, count: usize, pen: Pen) -> io::Result<usize> {
        self.require_tty()?;
        let span = self.shadow.fill_attrs(origin, count, pen);
        let written = span.len();
        self.repaint(span)?;
        Ok(written)
    }

    fn write_text(&mut self, text: &str) -> io::Result<()> {
        if !self.is_tty {
            self.write_raw(text)?;
            return self.stdout.flush();
        }
        let wrap = self.output_mode.contains(OutputMode::WRAP_AT_EOL_OUTPUT);
        match self.shadow.write_str(text, self.attribute, wrap) {
            Some(span) => self.repaint(*span.start()..*span.end() + 1),
            None => {
                self.goto(self.shadow.cursor())?;
                self.stdout.flush()
            }
        }
    }

    fn input_mode(&mut self) -> io::Result<InputMode> {
        let termios = get_termios(libc::STDIN_FILENO)?;
        Ok(input_mode_from_lflag(termios.c_lflag) | self.event_input)
    }

    fn set_input_mode(&mut self, mode: InputMode) -> io::Result<()> {
        let mut termios = get_termios(libc::STDIN_FILENO)?;
        let line_input = termios.c_lflag & libc::ICANON != 0;
        if line_input && !mode.contains(InputMode::LINE_INPUT) {
            self.cooked_cc = Some(termios.c_cc);
        }
        apply_input_mode(&mut termios, mode);
        if mode.contains(InputMode::LINE_INPUT) {
            // VMIN/VTIME may share slots with VEOF/VEOL
            if let Some(cc) = self.cooked_cc.take() {
                termios.c_cc = cc;
            }
        }
        set_termios(libc::STDIN_FILENO, &termios)?;
        self.event_input = mode & EVENT_INPUT;
        trace!("terminal: input mode {:?}", mode);
        Ok(())
    }

    fn output_mode(&mut self) -> io::Result<OutputMode> {
        let mut mode = self.output_mode;
        if let Ok(termios) = get_termios(libc::STDOUT_FILENO) {
            mode.set(OutputMode::PROCESSED_OUTPUT, termios.c_oflag & libc::OPOST != 0);
        }
        Ok(mode)
    }

    fn set_output_mode(&mut self, mode: OutputMode) -> io::Result<()> {
        if self.is_tty {
            let mut termios = get_termios(libc::STDOUT_FILENO)?;
            if mode.contains(OutputMode::PROCESSED_OUTPUT) {
                termios.c_oflag |= libc::OPOST;
            } else {
                termios.c_oflag &= !libc::OPOST;
            }
            set_termios(libc::STDOUT_FILENO, &termios)?;

            let wrap = mode.contains(OutputMode::WRAP_AT_EOL_OUTPUT);
            self.write_raw(if wrap { WRAP_ON } else { WRAP_OFF })?;
            self.stdout.flush()?;
        }
        self.output_mode = mode;
        trace!("terminal: output mode {:?}", mode);
        Ok(())
    }

    fn read_char(&mut self) -> io::Result<char> {
        let mut stdin = io::stdin();
        let mut buf = [0u8; 4];
        stdin.read_exact(&mut buf[..1])?;

        let len = utf8_len(buf[0])
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "invalid UTF-8 lead byte"))?;
        stdin.read_exact(&mut buf[1..len])?;

        std::str::from_utf8(&buf[..len])
            .ok()
            .and_then(|s| s.chars().next())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "invalid UTF-8 sequence"))
    }

    fn title(&mut self, max_len: usize) -> io::Result<String> {
        Ok(self.title.chars().take(max_len).collect())
    }

    fn set_title(&mut self, title: &str) -> io::Result<()> {
        if self.is_tty {
            write!(self.stdout, "\x1b]0;{}\x07", title)?;
            self.stdout.flush()?;
        }
        self.title = title.to_string();
        Ok(())
    }
}

impl Drop for UnixTerminal {
    fn drop(&mut self) {
        if let Some(orig) = self.orig_termios {
            let _ = set_termios(libc::STDIN_FILENO, &orig);
        }
        if self.is_tty {
            let _ = self.write_raw(WRAP_ON);
            let _ = self.write_raw(CURSOR_STYLE_DEFAULT);
            let _ = self.write_raw(CURSOR_SHOW);
            let _ = self.write_raw(SGR_RESET);
            let _ = self.stdout.flush();
        }
    }
}

/// Clear in `pen` and home, so a blank shadow buffer matches the screen
fn startup_sequence(pen: Pen) -> String {
    format!("{}{}", pen.to_sgr(), CLEAR_SCREEN_AND_HOME)
}

/// Parse a `CSI row ; col R` reply (1-based) into a 0-based coordinate.
/// Bytes typed ahead of the reply are skipped.
fn parse_cursor_report(reply: &[u8]) -> Option<Coord> {
    let start = reply.windows(2).rposition(|w| w == b"\x1b[")?;
    let body = std::str::from_utf8(&reply[start + 2..]).ok()?;
    let body = body.strip_suffix('R')?;
    let (row, col) = body.split_once(';')?;
    let row: i32 = row.parse().ok()?;
    let col: i32 = col.parse().ok()?;
    if row < 1 || col < 1 {
        return None;
    }
    Some(Coord::new(col - 1, row - 1))
}

fn check_handle(fd: libc::c_int, stream: &'static str) -> Result<(), ConsoleError> {
    if unsafe { libc::fcntl(fd, libc::F_GETFD) } == -1 {
        return Err(ConsoleError::Init {
            stream,
            source: io::Error::last_os_error(),
        });
    }
    Ok(())
}

/// Terminal size in cells from ioctl
fn window_size() -> io::Result<(u16, u16)> {
    unsafe {
        let mut ws: libc::winsize = std::mem::zeroed();
        if libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) != 0 {
            return Err(io::Error::last_os_error());
        }
        if ws.ws_col == 0 || ws.ws_row == 0 {
            return Err(io::Error::new(io::ErrorKind::Unsupported, "terminal reports no size"));
        }
        Ok((ws.ws_col, ws.ws_row))
    }
}

fn get_termios(fd: libc::c_int) -> io::Result<libc::termios> {
    unsafe {
        let mut termios: libc::termios = std::mem::zeroed();
        if libc::tcgetattr(fd, &mut termios) != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(termios)
    }
}

fn set_termios(fd: libc::c_int, termios: &libc::termios) -> io::Result<()> {
    if unsafe { libc::tcsetattr(fd, libc::TCSANOW, termios) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

fn input_mode_from_lflag(lflag: libc::tcflag_t) -> InputMode {
    let mut mode = InputMode::empty();
    mode.set(InputMode::PROCESSED_INPUT, lflag & libc::ISIG != 0);
    mode.set(InputMode::LINE_INPUT, lflag & libc::ICANON != 0);
    mode.set(InputMode::ECHO_INPUT, lflag & libc::ECHO != 0);
    mode
}

fn apply_input_mode(termios: &mut libc::termios, mode: InputMode) {
    let pairs = [
        (InputMode::PROCESSED_INPUT, libc::ISIG),
        (InputMode::LINE_INPUT, libc::ICANON),
        (InputMode::ECHO_INPUT, libc::ECHO),
    ];
    for (flag, bit) in pairs {
        if mode.contains(flag) {
            termios.c_lflag |= bit;
        } else {
            termios.c_lflag &= !bit;
        }
    }
    if !mode.contains(InputMode::LINE_INPUT) {
        // Block until exactly one byte is available
        termios.c_cc[libc::VMIN] = 1;
        termios.c_cc[libc::VTIME] = 0;
    }
}

/// Encoded length of a UTF-8 sequence from its first byte
fn utf8_len(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7F => Some(1),
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_termios() -> libc::termios {
        unsafe { std::mem::zeroed() }
    }

    #[test]
    fn test_lflag_mapping() {
        let mode = input_mode_from_lflag(libc::ICANON | libc::ECHO | libc::ISIG);
        assert_eq!(mode, InputMode::PROCESSED_INPUT | InputMode::LINE_INPUT | InputMode::ECHO_INPUT);
        assert_eq!(input_mode_from_lflag(libc::ISIG), InputMode::PROCESSED_INPUT);
    }

    #[test]
    fn test_raw_mode_blocks_for_one_byte() {
        let mut termios = blank_termios();
        termios.c_lflag = libc::ICANON | libc::ECHO | libc::ISIG | libc::IEXTEN;
        apply_input_mode(&mut termios, InputMode::cooked().raw());

        assert_eq!(termios.c_lflag & libc::ICANON, 0);
        assert_eq!(termios.c_lflag & libc::ECHO, 0);
        assert_ne!(termios.c_lflag & libc::ISIG, 0);
        assert_ne!(termios.c_lflag & libc::IEXTEN, 0);
        assert_eq!(termios.c_cc[libc::VMIN], 1);
        assert_eq!(termios.c_cc[libc::VTIME], 0);
    }

    #[test]
    fn test_cooked_round_trip() {
        let mut termios = blank_termios();
        apply_input_mode(&mut termios, InputMode::cooked());
        assert_eq!(
            input_mode_from_lflag(termios.c_lflag),
            InputMode::PROCESSED_INPUT | InputMode::LINE_INPUT | InputMode::ECHO_INPUT
        );
    }

    #[test]
    fn test_cursor_style_from_height() {
        assert_eq!(CursorStyle::from_height(1), CursorStyle::SteadyUnderline);
        assert_eq!(CursorStyle::from_height(25), CursorStyle::SteadyUnderline);
        assert_eq!(CursorStyle::from_height(50), CursorStyle::SteadyBlock);
        assert_eq!(CursorStyle::from_height(100), CursorStyle::SteadyBlock);
    }

    #[test]
    fn test_cursor_report_parsing() {
        assert_eq!(parse_cursor_report(b"\x1b[1;7R"), Some(Coord::new(6, 0)));
        assert_eq!(parse_cursor_report(b"\x1b[25;80R"), Some(Coord::new(79, 24)));
        assert_eq!(parse_cursor_report(b"ab\x1b[3;4R"), Some(Coord::new(3, 2)));
    }

    #[test]
    fn test_cursor_report_rejects_garbage() {
        assert_eq!(parse_cursor_report(b""), None);
        assert_eq!(parse_cursor_report(b"\x1b[3;4"), None);
        assert_eq!(parse_cursor_report(b"\x1b[0;4R"), None);
        assert_eq!(parse_cursor_report(b"\x1b[x;4R"), None);
    }

    #[test]
    fn test_startup_clears_in_default_pen() {
        let seq = startup_sequence(Pen::default());
        assert!(seq.starts_with(&Pen::default().to_sgr()));
        assert!(seq.ends_with("\x1b[2J\x1b[H"));
    }

    #[test]
    fn test_utf8_len() {
        assert_eq!(utf8_len(b'c'), Some(1));
        assert_eq!(utf8_len("é".as_bytes()[0]), Some(2));
        assert_eq!(utf8_len("─".as_bytes()[0]), Some(3));
        assert_eq!(utf8_len("🦀".as_bytes()[0]), Some(4));
        assert_eq!(utf8_len(0x80), None);
    }
}
