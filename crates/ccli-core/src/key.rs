//! Key definitions for decoded terminal input.
//!
//! A [`Key`] is an editing *intent*: the decoder collapses raw bytes and
//! multi-byte escape sequences into one of these variants, and the event
//! loop dispatches on them without caring what bytes produced them.

/// A single decoded keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable byte to insert at the cursor. Bytes above 0x7F pass
    /// through so multi-byte encodings survive, one column per byte.
    Char(u8),

    /// Line submission (LF).
    Enter,
    /// Completion request.
    Tab,
    /// Delete the byte before the cursor (DEL, 0x7F).
    Backspace,
    /// Delete the byte under the cursor (CSI 3~).
    Delete,
    /// Delete the word before the cursor (ESC DEL).
    DeleteWord,
    /// Delete back to the start of the editable region (Ctrl-U).
    DeleteToStart,

    // Cursor movement
    Home,
    End,
    Left,
    Right,
    LeftWord,
    RightWord,

    // History traversal
    Up,
    Down,
    PageUp,
    PageDown,

    /// Ctrl-C, delivered as a byte because the terminal has signals off.
    Interrupt,
    /// Ctrl-R, reverse incremental history search.
    ReverseSearch,
    /// Insert key (CSI 2~). Recognised, currently ignored by the loop.
    Insert,

    /// Synthesized by the event loop when Enter lands on a line whose
    /// last editable byte is an unescaped backslash. Never produced by
    /// the decoder itself.
    Continuation,

    /// An unknown or deliberately swallowed sequence.
    Ignore,
}

impl Key {
    /// True for keys that commit a pending reverse search and should be
    /// re-dispatched by the outer loop.
    pub fn ends_search(self) -> bool {
        !matches!(
            self,
            Key::Char(_) | Key::Backspace | Key::ReverseSearch | Key::Ignore
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ends_search() {
        assert!(Key::Enter.ends_search());
        assert!(Key::Up.ends_search());
        assert!(Key::Interrupt.ends_search());
        assert!(!Key::Char(b'a').ends_search());
        assert!(!Key::Backspace.ends_search());
        assert!(!Key::ReverseSearch.ends_search());
    }
}
