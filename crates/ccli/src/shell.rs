//! The shell instance: construction, output, paging, and the line and
//! history surfaces exposed to command callbacks.
//!
//! A [`Shell`] owns its console exclusively from construction to drop.
//! Callbacks receive `&mut Shell`, so anything the host can do between
//! prompts — print, inject text into the line, walk history, register
//! more commands — is equally available while a command is running.

use std::collections::VecDeque;
use std::fmt;
use std::os::unix::io::RawFd;

use ccli_core::{History, KeyParser, LineBuffer};

use crate::console::{Console, TermConsole};
use crate::debug_log;
use crate::error::{Error, Result};
use crate::registry::{
    CommandRequest, CompletionRequest, InterruptCallback, Registry,
};
use crate::complete::Completions;

/// History entries stepped over by PageUp/PageDown, and the fallback
/// page height when the window size is unknown.
pub(crate) const PAGE_SCROLL: usize = 24;

/// Capacity of the pushback queue that preserves keystrokes consumed
/// while peeking for Ctrl-C.
const PUSHBACK_MAX: usize = 256;

const PAGE_PROMPT: &str = "--Type <RET> for more, q to quit, c to continue without paging--";

/// An interactive command-line shell over an exclusive console.
pub struct Shell {
    pub(crate) console: Box<dyn Console>,
    pub(crate) prompt: String,
    pub(crate) line: LineBuffer,
    pub(crate) history: History,
    pub(crate) registry: Registry,
    pub(crate) parser: KeyParser,
    pub(crate) pushback: VecDeque<u8>,
    pub(crate) chain_delimiter: Option<String>,
}

impl Shell {
    /// A shell over stdin/stdout, switched into raw mode.
    pub fn new(prompt: &str) -> Result<Self> {
        Ok(Self::with_console(
            prompt,
            Box::new(TermConsole::stdio()?),
        ))
    }

    /// A shell over an arbitrary pair of file descriptors.
    pub fn from_fds(prompt: &str, input: RawFd, output: RawFd) -> Result<Self> {
        Ok(Self::with_console(
            prompt,
            Box::new(TermConsole::new(input, output)?),
        ))
    }

    /// A shell over any [`Console`] implementation.
    pub fn with_console(prompt: &str, console: Box<dyn Console>) -> Self {
        let mut shell = Self {
            console,
            prompt: prompt.to_string(),
            line: LineBuffer::new(),
            history: History::new(),
            registry: Registry::new(),
            parser: KeyParser::new(),
            pushback: VecDeque::new(),
            chain_delimiter: None,
        };
        shell.register_builtins();
        shell
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Read-only view of the line being composed. Mutation goes through
    /// [`Shell::line_inject`] and [`Shell::line_clear`] so the cursor
    /// invariants hold.
    pub fn line(&self) -> &LineBuffer {
        &self.line
    }

    pub fn input_fd(&self) -> Option<RawFd> {
        self.console.input_fd()
    }

    pub fn output_fd(&self) -> Option<RawFd> {
        self.console.output_fd()
    }

    /// Restore the console's original attributes, e.g. before spawning a
    /// child process that expects cooked mode.
    pub fn console_release(&mut self) -> Result<()> {
        Ok(self.console.release()?)
    }

    /// Reclaim the console after [`Shell::console_release`].
    pub fn console_acquire(&mut self) -> Result<()> {
        Ok(self.console.acquire()?)
    }

    // -- output -----------------------------------------------------------

    /// Write raw bytes to the output endpoint. Display-path write errors
    /// are dropped on the floor: reporting them would have to go through
    /// the same failing endpoint.
    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        if let Err(err) = self.console.write_all(bytes) {
            debug_log!("dropped write error: {err}");
        }
    }

    /// Write text to the output endpoint.
    pub fn print(&mut self, text: &str) {
        self.write_bytes(text.as_bytes());
    }

    /// Paginated output. `count` is the running line counter, starting
    /// at 1 on the first call. Every screenful the user is asked to
    /// continue; the updated counter is returned, `0` after the user
    /// chose to continue without paging (further calls stop counting),
    /// and `-1` once the user quit (further calls print nothing).
    pub fn page(&mut self, count: i32, text: &str) -> i32 {
        if count < 0 {
            return -1;
        }
        if count == 0 {
            self.print(text);
            return 0;
        }
        let rows = self
            .console
            .window_size()
            .map(|(_, rows)| rows as i32)
            .unwrap_or(PAGE_SCROLL as i32);
        let mut count = count;
        for piece in text.split_inclusive('\n') {
            self.print(piece);
            if piece.ends_with('\n') {
                count += 1;
                if rows > 1 && count % (rows - 1) == 0 {
                    match self.page_stop() {
                        b'q' => return -1,
                        b'c' => return 0,
                        _ => {}
                    }
                }
            }
        }
        count
    }

    /// Print the pagination prompt and read the user's answer.
    pub(crate) fn page_stop(&mut self) -> u8 {
        self.print(PAGE_PROMPT);
        let answer = self.next_byte().unwrap_or(b'q');
        self.write_bytes(b"\n");
        answer
    }

    // -- input ------------------------------------------------------------

    /// Next input byte, draining the pushback queue before the console.
    /// Read errors end input: there is nothing useful to do with them
    /// mid-keystroke.
    pub(crate) fn next_byte(&mut self) -> Option<u8> {
        if let Some(byte) = self.pushback.pop_front() {
            return Some(byte);
        }
        match self.console.read_byte() {
            Ok(byte) => byte,
            Err(err) => {
                debug_log!("read error on input: {err}");
                None
            }
        }
    }

    /// Read a single byte of input, blocking. `None` at end of input.
    pub fn read_char(&mut self) -> Option<u8> {
        self.next_byte()
    }

    /// Drain pending input looking for Ctrl-C. Unrelated bytes are
    /// parked in the pushback queue so no keystroke is lost.
    pub(crate) fn check_for_ctrl_c(&mut self) -> bool {
        while let Ok(Some(byte)) = self.console.poll_byte() {
            if byte == 0x03 {
                return true;
            }
            if self.pushback.len() < PUSHBACK_MAX {
                self.pushback.push_back(byte);
            }
        }
        false
    }

    // -- display ----------------------------------------------------------

    /// The prompt as painted right now: the continuation prompt replaces
    /// the configured one while a continuation is open.
    pub(crate) fn shown_prompt(&self) -> &str {
        if self.line.start() > 0 {
            "> "
        } else {
            &self.prompt
        }
    }

    pub(crate) fn echo_prompt(&mut self) {
        let prompt = self.shown_prompt().to_string();
        self.print(&prompt);
    }

    /// Width of the painted prompt-plus-line, for erasing.
    pub(crate) fn painted_width(&self) -> usize {
        self.shown_prompt().len() + self.line.visible_bytes().len()
    }

    /// Blank the painted line with spaces, leaving the cursor at column
    /// zero for the next repaint.
    pub(crate) fn clear_painted_line(&mut self) {
        let width = self.painted_width();
        self.clear_columns(width);
    }

    pub(crate) fn clear_columns(&mut self, width: usize) {
        self.write_bytes(b"\r");
        self.write_repeat(b' ', width);
        self.write_bytes(b"\r");
    }

    /// Repaint the prompt and the visible part of the line, erase `pad`
    /// stale trailing columns, and park the cursor at the line position.
    pub(crate) fn refresh(&mut self, pad: usize) {
        self.write_bytes(b"\r");
        self.echo_prompt();
        let visible = self.line.visible_bytes().to_vec();
        self.write_bytes(&visible);
        self.write_repeat(b' ', pad + 2);
        self.write_repeat(0x08, pad + 2);
        self.write_repeat(0x08, self.line.len() - self.line.pos());
    }

    pub(crate) fn write_repeat(&mut self, byte: u8, count: usize) {
        let chunk = [byte; 64];
        let mut rest = count;
        while rest > 0 {
            let n = rest.min(chunk.len());
            self.write_bytes(&chunk[..n]);
            rest -= n;
        }
    }

    // -- line access for callbacks ----------------------------------------

    /// Clear the internal line. The display is untouched; pair with
    /// [`Shell::line_refresh`] to repaint.
    pub fn line_clear(&mut self) {
        self.line.reset();
    }

    /// Insert `text` into the line at `pos` (clamped to the line), or at
    /// the cursor when `pos` is `None`.
    pub fn line_inject(&mut self, text: &str, pos: Option<usize>) {
        if let Some(pos) = pos {
            self.line.set_pos(pos);
        }
        for byte in text.bytes() {
            self.line.insert(byte);
        }
    }

    /// Repaint the line, e.g. after an interrupt callback edited it.
    pub fn line_refresh(&mut self) {
        self.refresh(0);
    }

    // -- history ----------------------------------------------------------

    /// The line submitted `past` commands ago (1 = most recent), when it
    /// is still within the retained window.
    pub fn history(&self, past: usize) -> Option<&str> {
        self.history.at(past)
    }

    // -- registration ------------------------------------------------------

    /// Register `name` to run `callback`. Registering an existing name
    /// replaces its callback; completions attached to the name survive.
    pub fn register_command(
        &mut self,
        name: &str,
        callback: impl Fn(&mut Shell, &CommandRequest<'_>) -> i32 + 'static,
    ) -> Result<()> {
        if name.is_empty() {
            return Err(Error::InvalidArgument("empty command name".into()));
        }
        self.registry.register(name, std::rc::Rc::new(callback));
        Ok(())
    }

    /// Remove a registered command.
    pub fn unregister_command(&mut self, name: &str) -> Result<()> {
        self.registry.unregister(name)
    }

    /// Replace the hook run when an empty line is submitted.
    pub fn register_default(
        &mut self,
        callback: impl Fn(&mut Shell, &CommandRequest<'_>) -> i32 + 'static,
    ) {
        self.registry.enter = std::rc::Rc::new(callback);
    }

    /// Replace the hook run when the first word matches no command.
    pub fn register_unknown(
        &mut self,
        callback: impl Fn(&mut Shell, &CommandRequest<'_>) -> i32 + 'static,
    ) {
        self.registry.unknown = std::rc::Rc::new(callback);
    }

    /// Replace the Ctrl-C hook. The default prints `^C` and ends the
    /// loop.
    pub fn register_interrupt(
        &mut self,
        callback: impl Fn(&mut Shell, &str, usize) -> i32 + 'static,
    ) {
        self.registry.interrupt = std::rc::Rc::new(callback) as InterruptCallback;
    }

    /// Attach a completion callback to a registered command.
    pub fn register_completion(
        &mut self,
        name: &str,
        callback: impl Fn(&mut Shell, &CompletionRequest<'_>, &mut Completions) + 'static,
    ) -> Result<()> {
        self.registry.set_completion(name, std::rc::Rc::new(callback))
    }

    /// Completion consulted when the command has none of its own.
    pub fn register_default_completion(
        &mut self,
        callback: impl Fn(&mut Shell, &CompletionRequest<'_>, &mut Completions) + 'static,
    ) {
        self.registry.default_completion = Some(std::rc::Rc::new(callback));
    }

    /// Register (or, with an empty `expansion`, remove) an alias. The
    /// alias applies to the first word of a submitted line only.
    pub fn register_alias(&mut self, name: &str, expansion: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::InvalidArgument("empty alias name".into()));
        }
        self.registry.register_alias(name, expansion)
    }

    /// Remove an alias.
    pub fn unregister_alias(&mut self, name: &str) -> Result<()> {
        self.registry.remove_alias(name)
    }

    /// The expansion of `name`, if aliased.
    pub fn alias_expansion(&self, name: &str) -> Option<&str> {
        self.registry
            .alias_index(name)
            .map(|i| self.registry.aliases[i].expansion.as_str())
    }

    /// Iterate registered aliases as `(name, expansion)` pairs.
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.registry
            .aliases
            .iter()
            .map(|a| (a.name.as_str(), a.expansion.as_str()))
    }

    /// Configure the statement separator (e.g. `;`). Submitted lines are
    /// then split into statements dispatched in order. `None` disables
    /// chaining.
    pub fn set_chain_delimiter(&mut self, delimiter: Option<&str>) {
        self.chain_delimiter = delimiter.map(str::to_string);
    }
}

impl fmt::Write for Shell {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.print(s);
        Ok(())
    }
}
