//! The interactive keystroke loop.
//!
//! One blocking read per keystroke: bytes go through the decoder, the
//! resulting intent mutates the line, traverses history, triggers
//! completion, or submits, and the line is repainted. The loop ends on
//! end of input or on a non-zero status from a command or the interrupt
//! hook.

use ccli_core::Key;

use crate::debug_log;
use crate::shell::{Shell, PAGE_SCROLL};

impl Shell {
    /// Run the interactive loop until a callback returns non-zero or
    /// input ends (including a read error on the input endpoint). The
    /// prompt is painted immediately.
    pub fn run(&mut self) {
        self.line.reset();
        let mut tab_count = 0u32;

        self.echo_prompt();
        loop {
            let Some(byte) = self.next_byte() else {
                break;
            };
            if byte != b'\t' {
                tab_count = 0;
            }
            let Some(key) = self.parser.feed(byte) else {
                continue;
            };

            let key = if key == Key::ReverseSearch {
                self.clear_painted_line();
                let (committed, pad) = self.reverse_search();
                self.refresh(pad);
                match committed {
                    Some(key) => key,
                    None => continue,
                }
            } else {
                key
            };

            if key == Key::Tab {
                self.complete(tab_count > 0);
                tab_count += 1;
                continue;
            }

            if self.dispatch_key(key) {
                break;
            }
        }
    }

    /// Apply one decoded keystroke. Returns true when the loop must end.
    fn dispatch_key(&mut self, key: Key) -> bool {
        // Enter on a line whose last editable byte is an unescaped
        // backslash opens a continuation instead of submitting.
        let key = if key == Key::Enter && self.line.ends_with_escape() {
            Key::Continuation
        } else {
            key
        };

        match key {
            Key::Enter => {
                self.write_bytes(b"\n");
                let raw = self.line.text().into_owned();
                let status = self.execute_line(&raw, true);
                if status != 0 {
                    return true;
                }
                self.line.reset();
                self.echo_prompt();
            }
            Key::Continuation => {
                self.line.continue_line();
                self.write_bytes(b"\n> ");
            }
            Key::Interrupt => {
                let interrupt = self.registry.interrupt.clone();
                let text = self.line.text().into_owned();
                let pos = self.line.pos();
                if interrupt(self, &text, pos) != 0 {
                    return true;
                }
            }
            Key::Backspace => {
                self.line.backspace();
                self.refresh(0);
            }
            Key::Delete => {
                self.line.delete();
                self.refresh(0);
            }
            Key::DeleteWord => {
                let pad = self.line.delete_word();
                self.refresh(pad);
            }
            Key::DeleteToStart => {
                let pad = self.line.delete_to_start();
                self.refresh(pad);
            }
            Key::Up => self.history_move(true, 1),
            Key::Down => self.history_move(false, 1),
            Key::PageUp => self.history_move(true, PAGE_SCROLL),
            Key::PageDown => self.history_move(false, PAGE_SCROLL),
            Key::Left => {
                self.line.left();
                self.refresh(0);
            }
            Key::Right => {
                self.line.right();
                self.refresh(0);
            }
            Key::Home => {
                self.line.home();
                self.refresh(0);
            }
            Key::End => {
                self.line.end();
                self.refresh(0);
            }
            Key::LeftWord => {
                self.line.left_word();
                self.refresh(0);
            }
            Key::RightWord => {
                self.line.right_word();
                self.refresh(0);
            }
            Key::Char(byte) => {
                self.line.insert(byte);
                self.refresh(0);
            }
            // Tab and Ctrl-R are intercepted by the loop before they
            // reach here; Insert is recognised but unused.
            Key::Tab | Key::Insert | Key::Ignore | Key::ReverseSearch => {
                debug_log!("ignored key {key:?}");
            }
        }
        false
    }

    fn history_move(&mut self, up: bool, step: usize) {
        let width = self.painted_width();
        let replaced = if up {
            self.history.up(&mut self.line, step)
        } else {
            self.history.down(&mut self.line, step)
        };
        if replaced {
            self.clear_columns(width);
        }
        self.refresh(0);
    }

    /// Reverse incremental search sub-loop (Ctrl-R).
    ///
    /// Paints `(reverse-i-search)\`needle': line` frames while the user
    /// types. Ctrl-R steps to an earlier match, Backspace shrinks the
    /// needle, Ctrl-C aborts and restores the view; any other
    /// non-printable key commits the shown match and is handed back for
    /// normal dispatch. Returns the committing key (`None` on abort or
    /// end of input) and the padding the next repaint needs to erase the
    /// last frame.
    fn reverse_search(&mut self) -> (Option<Key>, usize) {
        let saved_current = self.history.current();
        let mut needle = String::new();
        let mut matched: Option<usize> = None;
        let mut failed = false;
        let mut frame_len = 0usize;

        loop {
            frame_len = self.paint_search_frame(&needle, failed, frame_len);

            let Some(byte) = self.next_byte() else {
                return (None, self.erase_pad(frame_len));
            };
            let Some(key) = self.parser.feed(byte) else {
                continue;
            };

            match key {
                Key::Interrupt => {
                    self.history.set_current(saved_current);
                    self.line.reset();
                    return (None, self.erase_pad(frame_len));
                }
                Key::Char(byte) if byte.is_ascii() => {
                    needle.push(byte as char);
                    // Re-check the current entry first: a longer needle
                    // may still match right here.
                    let from = self.history.current() + 1;
                    self.search_step(&needle, from, None, &mut matched, &mut failed);
                }
                Key::Backspace => {
                    needle.pop();
                    let from = self.history.current() + 1;
                    self.search_step(&needle, from, None, &mut matched, &mut failed);
                }
                Key::ReverseSearch => {
                    // Strictly earlier than the current match, passing
                    // over entries identical to it.
                    let from = self.history.current();
                    let last = matched;
                    self.search_step(&needle, from, last, &mut matched, &mut failed);
                }
                key if key.ends_search() => {
                    return (Some(key), self.erase_pad(frame_len));
                }
                _ => {}
            }
        }
    }

    /// One search pass: walk history below `from` for the needle,
    /// recall a hit into the line with the cursor at the end of the
    /// matched substring, or flag failure and leave the line alone.
    fn search_step(
        &mut self,
        needle: &str,
        from: usize,
        skip_match: Option<usize>,
        matched: &mut Option<usize>,
        failed: &mut bool,
    ) {
        let skip = skip_match
            .and_then(|i| self.history.get(i))
            .map(str::to_string);
        match self.history.search_backwards(needle, from, skip.as_deref()) {
            Some(index) => {
                let text = self.history.get(index).unwrap_or_default().to_string();
                self.line.replace(&text);
                if let Some(at) = text.find(needle) {
                    self.line.set_pos(at + needle.len());
                }
                self.history.set_current(index);
                *matched = Some(index);
                *failed = false;
            }
            None => {
                *failed = true;
            }
        }
    }

    /// Paint one search frame and return its width. The previous frame
    /// is erased by trailing padding; the cursor ends up just right of
    /// the matched substring.
    fn paint_search_frame(&mut self, needle: &str, failed: bool, previous: usize) -> usize {
        let mut frame = String::new();
        if failed {
            frame.push_str("failed ");
        }
        frame.push_str("(reverse-i-search)`");
        frame.push_str(needle);
        frame.push_str("': ");
        frame.push_str(&self.line.text());

        let pad = previous.saturating_sub(frame.len());
        let back = pad + (self.line.len() - self.line.pos());
        self.write_bytes(b"\r");
        self.print(&frame);
        self.write_repeat(b' ', pad);
        self.write_repeat(0x08, back);
        frame.len()
    }

    /// Columns the next `refresh` must blank to cover a search frame.
    fn erase_pad(&self, frame_len: usize) -> usize {
        frame_len.saturating_sub(self.painted_width())
    }
}
