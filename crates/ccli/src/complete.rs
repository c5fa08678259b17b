//! Completion candidates and the Tab engine.
//!
//! Candidates are gathered from, in order: the command's own completion
//! callback, the default completion (only when no command completion
//! fired), the hierarchical completion table, and — when the first word
//! itself is being completed — the names of every registered command.
//! The merged list is sorted and deduplicated, filtered down to entries
//! matching the in-progress word, and resolved: a unique match is
//! inserted with its terminator, several matches extend the line by
//! their longest common prefix, and a second consecutive Tab paints the
//! whole set in columns.

use std::fmt;

use ccli_core::tokenize;

use crate::registry::CompletionRequest;
use crate::shell::Shell;

/// Terminator byte meaning "append nothing after a unique match". Used
/// by sources whose candidates are prefixes of longer input, such as
/// directories in a path.
pub const NOSPACE: u8 = 1;

/// The candidate list a completion callback appends to.
#[derive(Default)]
pub struct Completions {
    words: Vec<String>,
    terminator: Option<u8>,
    display_index: usize,
}

impl Completions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a copy of `word`.
    pub fn add(&mut self, word: &str) {
        self.words.push(word.to_string());
    }

    /// Add an already-owned word.
    pub fn push(&mut self, word: String) {
        self.words.push(word);
    }

    /// Add a formatted word: `comps.add_fmt(format_args!("{base}.{ext}"))`.
    pub fn add_fmt(&mut self, args: fmt::Arguments<'_>) {
        self.words.push(args.to_string());
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// After a unique match, append `byte` instead of the default space.
    pub fn set_terminator(&mut self, byte: u8) {
        self.terminator = Some(byte);
    }

    /// After a unique match, append nothing.
    pub fn no_space(&mut self) {
        self.terminator = Some(NOSPACE);
    }

    /// When listing candidates, skip this many leading bytes of every
    /// entry — used by file completion to hide a common directory
    /// prefix.
    pub fn set_display_index(&mut self, index: usize) {
        self.display_index = index;
    }

    fn into_parts(self) -> (Vec<String>, Option<u8>, usize) {
        (self.words, self.terminator, self.display_index)
    }
}

impl Shell {
    /// Run one Tab press. `list` is true on the second consecutive Tab,
    /// which paints the candidate set.
    pub(crate) fn complete(&mut self, list: bool) {
        let copy = self.line.copy_prefix(self.line.pos());
        let text = copy.text().into_owned();
        let argv = tokenize(&text);

        // When the cursor sits on whitespace (or the line is empty) the
        // in-progress match is the empty string one word further along.
        let on_space = text
            .as_bytes()
            .last()
            .map_or(true, |b| b.is_ascii_whitespace());
        let (word, match_text) = if argv.is_empty() || on_space {
            (argv.len(), String::new())
        } else {
            (argv.len() - 1, argv[argv.len() - 1].clone())
        };

        let mut comps = Completions::new();
        let mut command_completed = false;

        if word > 0 {
            let command = self
                .registry
                .find(&argv[0])
                .and_then(|c| c.completion.clone().map(|cb| (c.name.clone(), cb)));
            if let Some((name, callback)) = command {
                command_completed = true;
                let req = CompletionRequest {
                    command: &name,
                    line: &text,
                    word,
                    prefix: &match_text,
                };
                callback(self, &req, &mut comps);
            }
        }

        if !command_completed {
            if let Some(callback) = self.registry.default_completion.clone() {
                let req = CompletionRequest {
                    command: "",
                    line: &text,
                    word,
                    prefix: &match_text,
                };
                callback(self, &req, &mut comps);
            }
        }

        if let Some(table) = self.registry.completion_table.clone() {
            if let Some(node) = table.descend(&argv[..word]) {
                if let Some(callback) = node.callback.clone() {
                    let req = CompletionRequest {
                        command: &node.name,
                        line: &text,
                        word,
                        prefix: &match_text,
                    };
                    callback(self, &req, &mut comps);
                }
                for child in &node.options {
                    comps.add(&child.name);
                }
            }
        }

        if word == 0 {
            for command in &self.registry.commands {
                comps.words.push(command.name.clone());
            }
        }

        let (mut words, terminator, display_index) = comps.into_parts();
        words.sort();
        words.dedup();

        let matched: Vec<&String> = words
            .iter()
            .filter(|w| w.starts_with(&match_text))
            .collect();
        let match_len = match_text.len();

        match matched.len() {
            0 => {}
            1 => {
                let insert = matched[0].as_bytes()[match_len..].to_vec();
                for byte in insert {
                    self.line.insert(byte);
                }
                match terminator {
                    Some(NOSPACE) => {}
                    Some(byte) => self.line.insert(byte),
                    None => self.line.insert(b' '),
                }
            }
            _ => {
                let prefix_len = common_prefix_len(&matched);
                if prefix_len > match_len {
                    let insert = matched[0].as_bytes()[match_len..prefix_len].to_vec();
                    for byte in insert {
                        self.line.insert(byte);
                    }
                }
                if list {
                    self.write_bytes(b"\n");
                    let index = display_index.min(match_len);
                    let entries: Vec<String> =
                        matched.iter().map(|w| w.to_string()).collect();
                    self.print_candidates(&entries, index);
                }
            }
        }

        self.refresh(0);
    }

    /// Paint candidates in columns sized from the window, paging every
    /// screenful, or one per line when the endpoint has no usable
    /// window. `index` bytes of every entry are skipped.
    fn print_candidates(&mut self, entries: &[String], index: usize) {
        let window = if self.console.is_tty() {
            self.console.window_size()
        } else {
            None
        };
        let Some((term_cols, term_rows)) = window else {
            for entry in entries {
                let visible = entry[index..].to_string();
                self.print(&visible);
                self.write_bytes(b"\n");
            }
            return;
        };

        let width = entries
            .iter()
            .map(|e| e.len() - index)
            .max()
            .unwrap_or(0);
        if width == 0 {
            return;
        }

        let cols = (term_cols as usize / (width + 2)).max(1);
        let rows = (entries.len() + cols - 1) / cols;
        let mut paging = true;

        for row in 0..rows {
            if self.check_for_ctrl_c() {
                break;
            }
            if paging && row > 0 && term_rows > 1 && row % (term_rows as usize - 1) == 0 {
                match self.page_stop() {
                    b'q' => break,
                    b'c' => paging = false,
                    _ => {}
                }
            }
            for col in 0..cols {
                let slot = col * rows + row;
                if slot >= entries.len() {
                    continue;
                }
                if col > 0 {
                    self.write_bytes(b"  ");
                }
                let visible = entries[slot][index..].to_string();
                self.print(&visible);
                if visible.len() < width {
                    self.write_repeat(b' ', width - visible.len());
                }
            }
            self.write_bytes(b"\n");
        }
    }
}

/// Length of the byte prefix shared by every entry.
fn common_prefix_len(words: &[&String]) -> usize {
    let first = words[0].as_bytes();
    let mut len = first.len();
    for word in &words[1..] {
        let shared = first
            .iter()
            .zip(word.as_bytes())
            .take_while(|(a, b)| a == b)
            .count();
        len = len.min(shared);
    }
    len
}
