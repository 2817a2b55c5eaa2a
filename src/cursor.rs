//! Cursor position, visibility and height

use crate::backend::Backend;
use crate::console::Console;
use crate::error::{ConsoleError, Result};
use crate::geometry::{self, Coord};

impl<B: Backend> Console<B> {
    pub fn cursor_position(&mut self) -> Result<Coord> {
        geometry::cursor_position(&mut self.backend)
    }

    pub fn cursor_x(&mut self) -> Result<i32> {
        Ok(self.cursor_position()?.x)
    }

    pub fn cursor_y(&mut self) -> Result<i32> {
        Ok(self.cursor_position()?.y)
    }

    /// Move horizontally, keeping the current row. Bounds are checked by `move_to`.
    pub fn set_cursor_x(&mut self, x: i32) -> Result<()> {
        let y = self.cursor_y()?;
        self.move_to(x, y)
    }

    pub fn set_cursor_y(&mut self, y: i32) -> Result<()> {
        let x = self.cursor_x()?;
        self.move_to(x, y)
    }

    pub fn cursor_visible(&mut self) -> Result<bool> {
        Ok(self.backend.cursor_info()?.visible)
    }

    pub fn set_cursor_visible(&mut self, visible: bool) -> Result<()> {
        // Height lives in the same record; read it so it survives.
        let mut info = self.backend.cursor_info()?;
        info.visible = visible;
        self.backend.set_cursor_info(info)?;
        Ok(())
    }

    /// Cursor height as a percentage of the character cell
    pub fn cursor_height(&mut self) -> Result<u32> {
        Ok(self.backend.cursor_info()?.size)
    }

    pub fn set_cursor_height(&mut self, percent: u32) -> Result<()> {
        if !(1..=100).contains(&percent) {
            return Err(ConsoleError::out_of_range(
                "cursor height",
                percent,
                "cursor height must be a percentage of the character cell between 1 and 100",
            ));
        }
        let mut info = self.backend.cursor_info()?;
        info.size = percent;
        self.backend.set_cursor_info(info)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::console::Console;
    use crate::geometry::Coord;
    use crate::memory::MemoryBackend;

    fn console() -> Console<MemoryBackend> {
        Console::new(MemoryBackend::new(20, 10))
    }

    #[test_log::test]
    fn test_set_cursor_x_keeps_row() {
        let mut console = console();
        console.move_to(3, 7).unwrap();
        console.set_cursor_x(12).unwrap();
        assert_eq!(console.cursor_position().unwrap(), Coord::new(12, 7));
    }

    #[test_log::test]
    fn test_set_cursor_y_keeps_column() {
        let mut console = console();
        console.move_to(3, 7).unwrap();
        console.set_cursor_y(0).unwrap();
        assert_eq!(console.cursor_x().unwrap(), 3);
        assert_eq!(console.cursor_y().unwrap(), 0);
    }

    #[test_log::test]
    fn test_set_cursor_x_out_of_range() {
        let mut console = console();
        console.move_to(3, 7).unwrap();
        assert!(console.set_cursor_x(20).unwrap_err().is_out_of_range());
        assert!(console.set_cursor_y(-1).unwrap_err().is_out_of_range());
        assert_eq!(console.cursor_position().unwrap(), Coord::new(3, 7));
    }

    #[test_log::test]
    fn test_height_round_trip_keeps_visibility() {
        let mut console = console();
        console.set_cursor_visible(false).unwrap();
        for h in 1..=100 {
            console.set_cursor_height(h).unwrap();
            assert_eq!(console.cursor_height().unwrap(), h);
            assert!(!console.cursor_visible().unwrap());
        }
    }

    #[test_log::test]
    fn test_height_out_of_range_changes_nothing() {
        let mut console = console();
        console.set_cursor_height(40).unwrap();
        console.set_cursor_visible(false).unwrap();
        for h in [0, 101, 1000] {
            assert!(console.set_cursor_height(h).unwrap_err().is_out_of_range());
        }
        assert_eq!(console.cursor_height().unwrap(), 40);
        assert!(!console.cursor_visible().unwrap());
    }

    #[test_log::test]
    fn test_visibility_keeps_height() {
        let mut console = console();
        console.set_cursor_height(100).unwrap();
        console.set_cursor_visible(false).unwrap();
        assert_eq!(console.cursor_height().unwrap(), 100);
        console.set_cursor_visible(true).unwrap();
        assert!(console.cursor_visible().unwrap());
        assert_eq!(console.cursor_height().unwrap(), 100);
    }
}
