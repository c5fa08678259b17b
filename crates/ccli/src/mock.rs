//! Scripted console for tests.
//!
//! [`MockConsole`] plays a fixed byte script as keyboard input and
//! captures everything the engine writes. The handles are reference
//! counted so a test can keep feeding input and inspecting output after
//! the console has been handed to the shell. Single-threaded by design,
//! like the engine itself.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use crate::console::Console;

/// Console over an in-memory byte script.
pub struct MockConsole {
    input: Rc<RefCell<VecDeque<u8>>>,
    output: Rc<RefCell<Vec<u8>>>,
    window_size: Option<(u16, u16)>,
    tty: bool,
    raw: Rc<RefCell<bool>>,
}

impl MockConsole {
    pub fn new() -> Self {
        Self {
            input: Rc::new(RefCell::new(VecDeque::new())),
            output: Rc::new(RefCell::new(Vec::new())),
            window_size: Some((80, 24)),
            tty: true,
            raw: Rc::new(RefCell::new(true)),
        }
    }

    /// A console whose input starts out holding `script`. Reading past
    /// the script reports end of input.
    pub fn with_script(script: &[u8]) -> Self {
        let console = Self::new();
        console.push_input(script);
        console
    }

    /// Append bytes to the pending input.
    pub fn push_input(&self, bytes: &[u8]) {
        self.input.borrow_mut().extend(bytes.iter().copied());
    }

    /// Handle for appending input after the console has been moved into
    /// a shell.
    pub fn input_handle(&self) -> Rc<RefCell<VecDeque<u8>>> {
        Rc::clone(&self.input)
    }

    /// Handle on everything written so far.
    pub fn output_handle(&self) -> Rc<RefCell<Vec<u8>>> {
        Rc::clone(&self.output)
    }

    /// Handle on the raw-mode flag, toggled by acquire/release.
    pub fn raw_mode_handle(&self) -> Rc<RefCell<bool>> {
        Rc::clone(&self.raw)
    }

    /// Report a fixed window size, or `None` to behave like an endpoint
    /// without one (forces flat completion listings).
    pub fn set_window_size(&mut self, size: Option<(u16, u16)>) {
        self.window_size = size;
    }

    pub fn set_tty(&mut self, tty: bool) {
        self.tty = tty;
    }
}

impl Default for MockConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for MockConsole {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.input.borrow_mut().pop_front())
    }

    fn poll_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.input.borrow_mut().pop_front())
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.output.borrow_mut().extend_from_slice(bytes);
        Ok(())
    }

    fn window_size(&self) -> Option<(u16, u16)> {
        self.window_size
    }

    fn is_tty(&self) -> bool {
        self.tty
    }

    fn release(&mut self) -> io::Result<()> {
        *self.raw.borrow_mut() = false;
        Ok(())
    }

    fn acquire(&mut self) -> io::Result<()> {
        *self.raw.borrow_mut() = true;
        Ok(())
    }
}
