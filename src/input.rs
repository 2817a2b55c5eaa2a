//! Raw single-character input
//!
//! `read_char` switches off line buffering and echo for exactly one read.
//! The previous input mode is put back however the read ends.

use std::io;

use log::{debug, warn};

use crate::backend::Backend;
use crate::console::Console;
use crate::error::Result;
use crate::modes::InputMode;

/// Restores the saved input mode when dropped
struct RawInput<'a, B: Backend> {
    backend: &'a mut B,
    saved: InputMode,
    restored: bool,
}

impl<'a, B: Backend> RawInput<'a, B> {
    fn enter(backend: &'a mut B) -> io::Result<Self> {
        let saved = backend.input_mode()?;
        backend.set_input_mode(saved.raw())?;
        debug!("input mode {:?} -> {:?}", saved, saved.raw());
        Ok(Self {
            backend,
            saved,
            restored: false,
        })
    }

    fn read_char(&mut self) -> io::Result<char> {
        self.backend.read_char()
    }

    fn restore(mut self) -> io::Result<()> {
        self.restored = true;
        self.backend.set_input_mode(self.saved)
    }
}

impl<B: Backend> Drop for RawInput<'_, B> {
    fn drop(&mut self) {
        if !self.restored {
            if let Err(e) = self.backend.set_input_mode(self.saved) {
                warn!("failed to restore input mode {:?}: {}", self.saved, e);
            }
        }
    }
}

impl<B: Backend> Console<B> {
    /// Read one character as soon as it is typed, without echo.
    ///
    /// Blocks until a character arrives. There is no timeout.
    pub fn read_char(&mut self) -> Result<char> {
        let mut raw = RawInput::enter(&mut self.backend)?;
        let read = raw.read_char();
        let restored = raw.restore();
        let ch = read?;
        restored?;
        Ok(ch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConsoleError;
    use crate::memory::MemoryBackend;

    fn console() -> Console<MemoryBackend> {
        Console::new(MemoryBackend::new(10, 4))
    }

    #[test_log::test]
    fn test_reads_in_raw_mode_and_restores() {
        let mut console = console();
        console.backend_mut().push_input("c");
        let before = console.backend_mut().input_mode().unwrap();

        assert_eq!(console.read_char().unwrap(), 'c');

        let seen = console.backend().read_modes()[0];
        assert!(!seen.contains(InputMode::LINE_INPUT));
        assert!(!seen.contains(InputMode::ECHO_INPUT));
        assert!(seen.contains(InputMode::PROCESSED_INPUT | InputMode::WINDOW_INPUT | InputMode::MOUSE_INPUT));
        assert_eq!(console.backend_mut().input_mode().unwrap(), before);
    }

    #[test_log::test]
    fn test_failed_read_still_restores() {
        let mut console = console();
        let before = InputMode::PROCESSED_INPUT | InputMode::LINE_INPUT | InputMode::ECHO_INPUT;
        console.backend_mut().set_input_mode(before).unwrap();

        let err = console.read_char().unwrap_err();
        assert!(matches!(err, ConsoleError::Io(ref e) if e.kind() == io::ErrorKind::UnexpectedEof));
        assert_eq!(console.backend_mut().input_mode().unwrap(), before);
    }

    #[test_log::test]
    fn test_restores_exact_prior_flags() {
        let mut console = console();
        let before = InputMode::ECHO_INPUT | InputMode::MOUSE_INPUT;
        console.backend_mut().set_input_mode(before).unwrap();
        console.backend_mut().push_input("é");

        assert_eq!(console.read_char().unwrap(), 'é');
        assert_eq!(console.backend().read_modes(), &[InputMode::MOUSE_INPUT]);
        assert_eq!(console.backend_mut().input_mode().unwrap(), before);
    }

    #[test_log::test]
    fn test_successive_reads() {
        let mut console = console();
        console.backend_mut().push_input("xyc");
        let mut got = String::new();
        loop {
            let ch = console.read_char().unwrap();
            got.push(ch);
            if ch == 'c' {
                break;
            }
        }
        assert_eq!(got, "xyc");
        assert_eq!(console.backend_mut().input_mode().unwrap(), InputMode::cooked());
    }

    #[test_log::test]
    fn test_restore_failure_after_read_is_reported() {
        let mut console = console();
        console.backend_mut().push_input("q");
        console.backend_mut().limit_input_mode_changes(1);

        let err = console.read_char().unwrap_err();
        assert!(matches!(err, ConsoleError::Io(ref e) if e.kind() == io::ErrorKind::PermissionDenied));
        assert_eq!(console.backend().read_modes().len(), 1);
    }

    #[test_log::test]
    fn test_read_error_wins_over_restore_error() {
        let mut console = console();
        console.backend_mut().limit_input_mode_changes(1);

        let err = console.read_char().unwrap_err();
        assert!(matches!(err, ConsoleError::Io(ref e) if e.kind() == io::ErrorKind::UnexpectedEof));
    }

    #[test_log::test]
    fn test_guard_restores_on_drop() {
        let mut backend = MemoryBackend::new(4, 2);
        {
            let _raw = RawInput::enter(&mut backend).unwrap();
        }
        assert_eq!(backend.input_mode().unwrap(), InputMode::cooked());
    }
}
