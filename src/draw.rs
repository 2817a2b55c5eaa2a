//! Screen operations: clear, move, write and rectangles
//!
//! Fills always use the console's current pen. To clear or fill in another
//! color, select it with `text_color` first.

use log::{trace, warn};

use crate::backend::Backend;
use crate::console::Console;
use crate::error::{ConsoleError, Result};
use crate::geometry::{self, Coord};

/// ASCII form feed, understood as "clear" by most dumb terminals
const FORM_FEED: &str = "\x0c";

/// Border styles for `draw_rectangle`
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BorderStyle {
    /// No border; only useful together with `fill`
    None,
    /// 7-bit ASCII approximation
    Text,
    LineSingle,
    LineDouble,
}

/// Border glyphs of one style
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Frame {
    pub horizontal: char,
    pub vertical: char,
    pub nw: char,
    pub ne: char,
    pub sw: char,
    pub se: char,
}

impl BorderStyle {
    pub fn frame(self) -> Option<Frame> {
        let frame = match self {
            BorderStyle::None => return None,
            BorderStyle::LineSingle => Frame {
                horizontal: '─',
                vertical: '│',
                nw: '┌',
                ne: '┐',
                sw: '└',
                se: '┘',
            },
            BorderStyle::LineDouble => Frame {
                horizontal: '═',
                vertical: '║',
                nw: '╔',
                ne: '╗',
                sw: '╚',
                se: '╝',
            },
            BorderStyle::Text => Frame {
                horizontal: '-',
                vertical: '|',
                nw: '/',
                ne: '\\',
                sw: '\\',
                se: '/',
            },
        };
        Some(frame)
    }
}

impl<B: Backend> Console<B> {
    /// Blank the whole buffer in the current pen and home the cursor.
    ///
    /// Output that cannot report its buffer (redirected, remote) gets a form
    /// feed instead, and the call still succeeds.
    pub fn clear(&mut self) -> Result<()> {
        let info = match self.backend.buffer_info() {
            Ok(info) => info,
            Err(e) => {
                warn!("clear: buffer introspection failed ({}), sending form feed", e);
                self.backend.write_text(FORM_FEED)?;
                return Ok(());
            }
        };

        let cells = info.cell_count();
        self.backend.fill_characters(Coord::ORIGIN, cells, ' ')?;
        self.backend.fill_attributes(Coord::ORIGIN, cells, self.pen)?;
        self.backend.set_cursor_position(Coord::ORIGIN)?;
        Ok(())
    }

    /// Move the cursor. Every positioning operation goes through here.
    pub fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        let pos = Coord::new(x, y);
        geometry::validate(&mut self.backend, pos)?;
        self.backend.set_cursor_position(pos)?;
        Ok(())
    }

    /// Write `text` starting at (x, y); the cursor ends just after it.
    pub fn write_at(&mut self, x: i32, y: i32, text: &str) -> Result<()> {
        self.move_to(x, y)?;
        self.backend.write_text(text)?;
        Ok(())
    }

    /// Draw a rectangle from (x, y) to (x + cx, y + cy) inclusive.
    ///
    /// `cx` and `cy` are offsets to the far edge, so `cx = cy = 2` covers
    /// 3 by 3 cells. With `fill`, the attribute plane of the whole box is
    /// set to the current pen without touching the characters, border
    /// included.
    pub fn draw_rectangle(
        &mut self,
        style: BorderStyle,
        x: i32,
        y: i32,
        cx: i32,
        cy: i32,
        fill: bool,
    ) -> Result<()> {
        if cx < 0 {
            return Err(ConsoleError::out_of_range("cx", cx, "rectangle width must not be negative"));
        }
        if cy < 0 {
            return Err(ConsoleError::out_of_range("cy", cy, "rectangle height must not be negative"));
        }
        let (width, height) = geometry::buffer_size(&mut self.backend)?;
        geometry::check_bounds(Coord::new(x, y), width, height)?;
        geometry::check_bounds(Coord::new(x.saturating_add(cx), y.saturating_add(cy)), width, height)?;
        trace!("rectangle {:?} at ({},{}) +({},{}) fill={}", style, x, y, cx, cy, fill);

        if let Some(frame) = style.frame() {
            let far = cx as usize;

            let mut line = vec![frame.horizontal; far + 1];
            line[0] = frame.nw;
            line[far] = frame.ne;
            self.move_to(x, y)?;
            self.backend.write_text(&line.iter().collect::<String>())?;

            let side = frame.vertical.to_string();
            for i in 1..cy {
                self.move_to(x, y + i)?;
                self.backend.write_text(&side)?;
                self.move_to(x + cx, y + i)?;
                self.backend.write_text(&side)?;
            }

            line[0] = frame.sw;
            line[far] = frame.se;
            self.move_to(x, y + cy)?;
            self.backend.write_text(&line.iter().collect::<String>())?;
        }

        if fill {
            for i in 0..=cy {
                self.backend
                    .fill_attributes(Coord::new(x, y + i), cx as usize + 1, self.pen)?;
            }
        }

        Ok(())
    }
}
