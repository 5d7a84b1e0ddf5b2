//! Output sink for `print` statements and top-level error reports.
//!
//! - `Stdout`: the default for hosts running programs
//! - `Buffer`: captures output for tests and embedders
//! - `Silent`: discards everything
//!
//! Enum dispatch rather than a trait object; the set is closed.

use parking_lot::Mutex;

/// Writes lines to stdout.
#[derive(Default)]
pub struct StdoutPrintHandler;

impl StdoutPrintHandler {
    pub fn println(&self, msg: &str) {
        println!("{msg}");
    }
}

/// Captures lines into a string buffer.
#[derive(Default)]
pub struct BufferPrintHandler {
    buffer: Mutex<String>,
}

impl BufferPrintHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn println(&self, msg: &str) {
        let mut buf = self.buffer.lock();
        buf.push_str(msg);
        buf.push('\n');
    }

    /// Everything printed so far.
    pub fn get_output(&self) -> String {
        self.buffer.lock().clone()
    }

    /// Captured output split into lines.
    pub fn lines(&self) -> Vec<String> {
        self.buffer.lock().lines().map(str::to_owned).collect()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

pub enum PrintHandlerImpl {
    Stdout(StdoutPrintHandler),
    Buffer(BufferPrintHandler),
    Silent,
}

impl PrintHandlerImpl {
    /// Emit one line.
    pub fn println(&self, msg: &str) {
        match self {
            Self::Stdout(h) => h.println(msg),
            Self::Buffer(h) => h.println(msg),
            Self::Silent => {}
        }
    }

    /// Captured output; empty for handlers that don't capture.
    pub fn get_output(&self) -> String {
        match self {
            Self::Buffer(h) => h.get_output(),
            Self::Stdout(_) | Self::Silent => String::new(),
        }
    }

    /// Captured output as lines; empty for handlers that don't capture.
    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::Buffer(h) => h.lines(),
            Self::Stdout(_) | Self::Silent => Vec::new(),
        }
    }

    pub fn clear(&self) {
        if let Self::Buffer(h) = self {
            h.clear();
        }
    }
}

/// Print handler shared between the host and an interpreter.
#[expect(
    clippy::disallowed_types,
    reason = "Arc lets the host keep a handle to read captured output"
)]
pub type SharedPrintHandler = std::sync::Arc<PrintHandlerImpl>;

#[expect(clippy::disallowed_types, reason = "Arc required for SharedPrintHandler")]
pub fn stdout_handler() -> SharedPrintHandler {
    std::sync::Arc::new(PrintHandlerImpl::Stdout(StdoutPrintHandler))
}

#[expect(clippy::disallowed_types, reason = "Arc required for SharedPrintHandler")]
pub fn buffer_handler() -> SharedPrintHandler {
    std::sync::Arc::new(PrintHandlerImpl::Buffer(BufferPrintHandler::new()))
}

#[expect(clippy::disallowed_types, reason = "Arc required for SharedPrintHandler")]
pub fn silent_handler() -> SharedPrintHandler {
    std::sync::Arc::new(PrintHandlerImpl::Silent)
}
