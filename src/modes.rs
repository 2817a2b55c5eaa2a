//! Input and output mode flags

use bitflags::bitflags;

bitflags! {
    /// Input stream behavior
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InputMode: u32 {
        /// Control keys are handled by the system (Ctrl-C and friends)
        const PROCESSED_INPUT = 0x01;
        /// Reads return only once a whole line has been entered
        const LINE_INPUT = 0x02;
        /// Typed characters are echoed to the output
        const ECHO_INPUT = 0x04;
        const WINDOW_INPUT = 0x08;
        const MOUSE_INPUT = 0x10;
    }
}

bitflags! {
    /// Output stream behavior
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OutputMode: u32 {
        const PROCESSED_OUTPUT = 0x01;
        /// Writing past the last column continues on the next row
        const WRAP_AT_EOL_OUTPUT = 0x02;
    }
}

impl InputMode {
    /// Flags a freshly opened interactive console starts with
    pub fn cooked() -> Self {
        InputMode::PROCESSED_INPUT
            | InputMode::LINE_INPUT
            | InputMode::ECHO_INPUT
            | InputMode::WINDOW_INPUT
            | InputMode::MOUSE_INPUT
    }

    /// Same flags with line buffering and echo removed
    pub fn raw(self) -> Self {
        self - (InputMode::LINE_INPUT | InputMode::ECHO_INPUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_keeps_other_flags() {
        let raw = InputMode::cooked().raw();
        assert!(!raw.contains(InputMode::LINE_INPUT));
        assert!(!raw.contains(InputMode::ECHO_INPUT));
        assert!(raw.contains(InputMode::PROCESSED_INPUT | InputMode::WINDOW_INPUT | InputMode::MOUSE_INPUT));
    }

    #[test]
    fn test_raw_of_empty_is_empty() {
        assert_eq!(InputMode::empty().raw(), InputMode::empty());
    }
}
