/*++

Licensed under the Apache-2.0 license.

File Name:

    log.rs

Abstract:

    File contains a shared text log for recording calls in unit tests.

--*/
use std::{cell::RefCell, fmt::Write, rc::Rc};

/// A text log that can be appended to without `&mut self`. Clones share the
/// same buffer, so a test can keep one handle while a fake peripheral writes
/// through another.
///
/// # Example
///
/// ```
/// use histogram_emu_bus::testing::Log;
/// use std::fmt::Write;
///
/// let log = Log::new();
/// writeln!(log.w(), "poll()").unwrap();
/// assert_eq!(log.take(), "poll()\n");
/// assert_eq!(log.take(), "");
/// ```
#[derive(Clone, Default)]
pub struct Log {
    log: Rc<RefCell<String>>,
}
impl Log {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the log contents without clearing it.
    pub fn contents(&self) -> String {
        self.log.borrow().clone()
    }

    /// Clears the log and returns what it held.
    pub fn take(&self) -> String {
        std::mem::take(&mut *self.log.borrow_mut())
    }

    /// Returns a writer for use with write!() or writeln!().
    pub fn w(&self) -> impl Write + '_ {
        LogWriter { log: &self.log }
    }
}

struct LogWriter<'a> {
    log: &'a RefCell<String>,
}
impl Write for LogWriter<'_> {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        self.log.borrow_mut().push_str(s);
        Ok(())
    }
}
