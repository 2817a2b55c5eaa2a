//! Character plane and attribute plane of a screen buffer
//!
//! Both backends keep one of these: the memory backend as its whole state,
//! the unix terminal as a shadow of what it has painted so attribute-only
//! fills can be repainted with the characters already on screen.

use std::ops::RangeInclusive;

use crate::color::Pen;
use crate::geometry::Coord;

/// A single cell on the screen
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Cell {
    pub ch: char,
    pub attr: Pen,
}

impl Cell {
    pub fn new(ch: char, attr: Pen) -> Self {
        Self { ch, attr }
    }

    fn blank(attr: Pen) -> Self {
        Self::new(' ', attr)
    }
}

/// Grid of cells plus the output cursor
#[derive(Clone, Debug)]
pub struct ScreenBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
    cursor: Coord,
    /// Set once a write has run off the last column with nowhere to go.
    /// Further printable characters are dropped until the cursor moves.
    parked: bool,
}

impl ScreenBuffer {
    /// Create a blank buffer with every cell painted in `attr`
    pub fn new(width: u16, height: u16, attr: Pen) -> Self {
        let size = (width as usize) * (height as usize);
        Self {
            width,
            height,
            cells: vec![Cell::blank(attr); size],
            cursor: Coord::ORIGIN,
            parked: false,
        }
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Resize, keeping the overlapping top-left region
    pub fn resize(&mut self, width: u16, height: u16, attr: Pen) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        let mut resized = ScreenBuffer::new(width, height, attr);
        for y in 0..self.height.min(height) as i32 {
            for x in 0..self.width.min(width) as i32 {
                let pos = Coord::new(x, y);
                if let (Some(from), Some(to)) = (self.index(pos), resized.index(pos)) {
                    resized.cells[to] = self.cells[from];
                }
            }
        }
        resized.cursor = Coord::new(
            self.cursor.x.min(width as i32 - 1).max(0),
            self.cursor.y.min(height as i32 - 1).max(0),
        );
        *self = resized;
    }

    /// Convert a coordinate to a buffer index
    pub fn index(&self, pos: Coord) -> Option<usize> {
        if pos.x >= 0 && pos.x < self.width as i32 && pos.y >= 0 && pos.y < self.height as i32 {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }

    pub fn coord_of(&self, index: usize) -> Coord {
        let width = (self.width as usize).max(1);
        Coord::new((index % width) as i32, (index / width) as i32)
    }

    pub fn get(&self, pos: Coord) -> Option<Cell> {
        self.index(pos).map(|idx| self.cells[idx])
    }

    pub fn cell(&self, index: usize) -> Cell {
        self.cells[index]
    }

    pub fn cursor(&self) -> Coord {
        self.cursor
    }

    /// Move the cursor; returns false (and leaves it alone) when out of bounds
    pub fn set_cursor(&mut self, pos: Coord) -> bool {
        if self.index(pos).is_none() {
            return false;
        }
        self.cursor = pos;
        self.parked = false;
        true
    }

    /// Characters of row `y`, for inspection
    pub fn row_text(&self, y: i32) -> String {
        (0..self.width as i32)
            .filter_map(|x| self.get(Coord::new(x, y)))
            .map(|cell| cell.ch)
            .collect()
    }

    /// Fill the character plane row-major from `origin`. Returns the
    /// indexes written (empty when `origin` is off the buffer).
    pub fn fill_chars(&mut self, origin: Coord, count: usize, ch: char) -> std::ops::Range<usize> {
        let span = self.span(origin, count);
        for cell in &mut self.cells[span.clone()] {
            cell.ch = ch;
        }
        span
    }

    /// Fill the attribute plane row-major from `origin`
    pub fn fill_attrs(&mut self, origin: Coord, count: usize, attr: Pen) -> std::ops::Range<usize> {
        let span = self.span(origin, count);
        for cell in &mut self.cells[span.clone()] {
            cell.attr = attr;
        }
        span
    }

    fn span(&self, origin: Coord, count: usize) -> std::ops::Range<usize> {
        match self.index(origin) {
            Some(start) => start..start + count.min(self.cells.len() - start),
            None => 0..0,
        }
    }

    /// Write text at the cursor in `attr`, advancing the cursor.
    ///
    /// `\n` goes to the start of the next row and `\r` to the start of the
    /// current one; other control characters are not drawn. Without `wrap`
    /// the cursor stops on the last column and the rest of the line is
    /// dropped. Nothing scrolls: at the last cell the cursor stays put.
    /// Returns the first and last index written, if any.
    pub fn write_str(&mut self, text: &str, attr: Pen, wrap: bool) -> Option<RangeInclusive<usize>> {
        if self.cells.is_empty() {
            return None;
        }
        let last_col = self.width as i32 - 1;
        let last_row = self.height as i32 - 1;
        let mut touched: Option<(usize, usize)> = None;

        for ch in text.chars() {
            match ch {
                '\n' => {
                    self.cursor.x = 0;
                    if self.cursor.y < last_row {
                        self.cursor.y += 1;
                    }
                    self.parked = false;
                }
                '\r' => {
                    self.cursor.x = 0;
                    self.parked = false;
                }
                c if c.is_control() => {}
                c => {
                    if self.parked {
                        continue;
                    }
                    if let Some(idx) = self.index(self.cursor) {
                        self.cells[idx] = Cell::new(c, attr);
                        touched = Some(match touched {
                            Some((lo, hi)) => (lo.min(idx), hi.max(idx)),
                            None => (idx, idx),
                        });
                    }
                    if self.cursor.x < last_col {
                        self.cursor.x += 1;
                    } else if wrap && self.cursor.y < last_row {
                        self.cursor.x = 0;
                        self.cursor.y += 1;
                    } else {
                        self.parked = true;
                    }
                }
            }
        }

        touched.map(|(lo, hi)| lo..=hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    fn pen() -> Pen {
        Pen::default()
    }

    #[test]
    fn test_new_buffer_is_blank() {
        let buf = ScreenBuffer::new(3, 2, pen());
        assert_eq!(buf.row_text(0), "   ");
        assert_eq!(buf.row_text(1), "   ");
        assert_eq!(buf.cursor(), Coord::ORIGIN);
    }

    #[test]
    fn test_fill_chars_wraps_rows_and_clips() {
        let mut buf = ScreenBuffer::new(3, 2, pen());
        let span = buf.fill_chars(Coord::new(2, 0), 10, '#');
        assert_eq!(span, 2..6);
        assert_eq!(buf.row_text(0), "  #");
        assert_eq!(buf.row_text(1), "###");
    }

    #[test]
    fn test_fill_off_buffer_writes_nothing() {
        let mut buf = ScreenBuffer::new(3, 2, pen());
        assert!(buf.fill_chars(Coord::new(3, 0), 4, '#').is_empty());
        assert!(buf.fill_attrs(Coord::new(0, -1), 4, pen()).is_empty());
    }

    #[test]
    fn test_fill_attrs_keeps_characters() {
        let mut buf = ScreenBuffer::new(3, 1, pen());
        buf.write_str("abc", pen(), false);
        let red = Pen::new(Color::White, Color::Red);
        buf.fill_attrs(Coord::new(1, 0), 2, red);
        assert_eq!(buf.row_text(0), "abc");
        assert_eq!(buf.get(Coord::new(0, 0)).unwrap().attr, pen());
        assert_eq!(buf.get(Coord::new(2, 0)).unwrap().attr, red);
    }

    #[test]
    fn test_write_advances_cursor() {
        let mut buf = ScreenBuffer::new(10, 2, pen());
        buf.set_cursor(Coord::new(2, 1));
        let span = buf.write_str("hi", pen(), false);
        assert_eq!(span, Some(12..=13));
        assert_eq!(buf.cursor(), Coord::new(4, 1));
        assert_eq!(buf.row_text(1), "  hi      ");
    }

    #[test]
    fn test_write_without_wrap_drops_overflow() {
        let mut buf = ScreenBuffer::new(4, 2, pen());
        buf.set_cursor(Coord::new(2, 0));
        buf.write_str("wxyz", pen(), false);
        assert_eq!(buf.row_text(0), "  wx");
        assert_eq!(buf.row_text(1), "    ");
        assert_eq!(buf.cursor(), Coord::new(3, 0));
    }

    #[test]
    fn test_write_with_wrap_continues_on_next_row() {
        let mut buf = ScreenBuffer::new(4, 2, pen());
        buf.set_cursor(Coord::new(2, 0));
        buf.write_str("wxyz", pen(), true);
        assert_eq!(buf.row_text(0), "  wx");
        assert_eq!(buf.row_text(1), "yz  ");
        assert_eq!(buf.cursor(), Coord::new(2, 1));
    }

    #[test]
    fn test_newline_unparks() {
        let mut buf = ScreenBuffer::new(2, 2, pen());
        buf.write_str("abc\nd", pen(), false);
        assert_eq!(buf.row_text(0), "ab");
        assert_eq!(buf.row_text(1), "d ");
    }

    #[test]
    fn test_resize_keeps_overlap() {
        let mut buf = ScreenBuffer::new(3, 2, pen());
        buf.write_str("abc", pen(), false);
        buf.set_cursor(Coord::new(2, 1));
        buf.resize(2, 3, pen());
        assert_eq!(buf.size(), (2, 3));
        assert_eq!(buf.row_text(0), "ab");
        assert_eq!(buf.row_text(2), "  ");
        assert_eq!(buf.cursor(), Coord::new(1, 1));
    }

    #[test]
    fn test_set_cursor_rejects_out_of_bounds() {
        let mut buf = ScreenBuffer::new(3, 2, pen());
        assert!(!buf.set_cursor(Coord::new(3, 0)));
        assert_eq!(buf.cursor(), Coord::ORIGIN);
    }
}
