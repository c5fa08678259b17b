//! Core primitives for interactive command-line editing.
//!
//! This crate provides the platform-independent pieces of the ccli shell
//! engine: the keystroke decoder, the line buffer, the history ring, the
//! shell-style argument tokeniser, and the tagged-section cache codec.
//! Everything here is pure data manipulation over bytes and strings; the
//! terminal itself lives in the `ccli` crate.

pub mod cache;
pub mod history;
pub mod key;
pub mod key_parser;
pub mod line;
pub mod tokenizer;

// Re-export commonly used types for convenience
pub use history::History;
pub use key::Key;
pub use key_parser::{KeyParser, ParserState};
pub use line::LineBuffer;
pub use tokenizer::{tokenize, tokenize_statement};
