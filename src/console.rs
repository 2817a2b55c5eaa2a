//! The console context: initialization, pen state and window title
//!
//! A `Console` owns its backend plus the two pieces of state the backend
//! cannot be asked for: the pen captured at start-up and the pen currently
//! selected for fills. Every operation takes `&mut self`, so one owner
//! drives the console at a time.

use log::{debug, warn};

use crate::backend::Backend;
use crate::color::{Color, Pen};
use crate::error::{ConsoleError, Result};
use crate::modes::OutputMode;

/// Start-up settings
#[derive(Clone, Copy, Debug)]
pub struct Options {
    /// Leave line wrap on. Off by default so a rectangle reaching the last
    /// column or row does not scroll the buffer.
    pub wrap_at_eol: bool,
    /// Original pen to assume when the backend cannot report its attribute
    pub fallback_pen: Pen,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            wrap_at_eol: false,
            fallback_pen: Pen::default(),
        }
    }
}

pub struct Console<B: Backend> {
    pub(crate) backend: B,
    original_pen: Pen,
    pub(crate) pen: Pen,
}

impl<B: Backend> Console<B> {
    pub fn new(backend: B) -> Self {
        Self::with_options(backend, Options::default())
    }

    /// Capture the original pen and put the output into its working mode.
    pub fn with_options(mut backend: B, options: Options) -> Self {
        let original_pen = match backend.buffer_info() {
            Ok(info) => info.attribute,
            Err(e) => {
                warn!("console: no buffer introspection ({}), assuming {:?}", e, options.fallback_pen);
                options.fallback_pen
            }
        };

        let mut mode = OutputMode::PROCESSED_OUTPUT;
        if options.wrap_at_eol {
            mode |= OutputMode::WRAP_AT_EOL_OUTPUT;
        }
        if let Err(e) = backend.set_output_mode(mode) {
            warn!("console: could not set output mode {:?}: {}", mode, e);
        }

        debug!("console: initialized with pen {:?}, output mode {:?}", original_pen, mode);
        Self {
            backend,
            original_pen,
            pen: original_pen,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Pen used by `clear` and rectangle fills
    pub fn pen(&self) -> Pen {
        self.pen
    }

    pub fn original_pen(&self) -> Pen {
        self.original_pen
    }

    /// Select the pen for subsequent output and fills.
    pub fn text_color(&mut self, foreground: Color, background: Color) -> Result<()> {
        self.set_pen(Pen::new(foreground, background))
    }

    pub fn set_pen(&mut self, pen: Pen) -> Result<()> {
        self.backend.set_text_attribute(pen)?;
        self.pen = pen;
        Ok(())
    }

    /// Write text in the attribute the console started with again.
    ///
    /// Only the backend attribute changes; fills keep using the pen last
    /// chosen with `text_color`.
    pub fn reset_color(&mut self) -> Result<()> {
        self.backend.set_text_attribute(self.original_pen)?;
        Ok(())
    }

    pub fn title(&mut self) -> Result<String> {
        let max = self.backend.max_title_len();
        let mut title = self.backend.title(max)?;
        if let Some((cut, _)) = title.char_indices().nth(max) {
            title.truncate(cut);
        }
        Ok(title)
    }

    /// Set the window title. Titles of `max_title_len` characters or more are refused.
    pub fn set_title(&mut self, title: &str) -> Result<()> {
        let max = self.backend.max_title_len();
        let len = title.chars().count();
        if len >= max {
            return Err(ConsoleError::out_of_range(
                "title",
                i64::try_from(len).unwrap_or(i64::MAX),
                format!("window title must be fewer than {} characters", max),
            ));
        }
        self.backend.set_title(title)?;
        Ok(())
    }
}
