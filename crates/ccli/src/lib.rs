//! Embeddable interactive command-line shell engine.
//!
//! `ccli` gives a host application a shell-like surface over a pair of
//! byte-oriented endpoints (normally the terminal): a prompt, line
//! editing with history and reverse search, shell-style tokenisation
//! with quoting, Tab completion from several sources, and dispatch of
//! submitted lines to registered callbacks — with aliases, command
//! chaining, hierarchical command tables, and persisted history.
//!
//! # Examples
//!
//! ```no_run
//! use ccli::Shell;
//!
//! let mut shell = Shell::new("myapp> ").unwrap();
//! shell
//!     .register_command("hello", |shell, req| {
//!         shell.print("hello ");
//!         shell.print(req.argv.get(1).map(String::as_str).unwrap_or("world"));
//!         shell.print("\n");
//!         0
//!     })
//!     .unwrap();
//! shell.run();
//! ```
//!
//! The engine is single-threaded and owns its endpoints exclusively
//! from construction to drop; the only blocking points are the reads
//! for the next keystroke.

pub mod console;
pub mod debug;
pub mod mock;

mod cache;
mod complete;
mod dispatch;
mod error;
mod event_loop;
mod file;
mod registry;
mod shell;
mod table;

// Core primitives, re-exported for hosts that want them directly.
pub use ccli_core::{tokenize, tokenize_statement, History, Key, KeyParser, LineBuffer};

pub use complete::{Completions, NOSPACE};
pub use console::{Console, TermConsole};
pub use error::{Error, Result};
pub use file::file_completion;
pub use mock::MockConsole;
pub use registry::{
    CommandCallback, CommandRequest, CompletionCallback, CompletionRequest, InterruptCallback,
};
pub use shell::Shell;
pub use table::{CommandTable, CompletionTable};
